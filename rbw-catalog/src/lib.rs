pub mod catalog;
pub mod error;
#[cfg(feature = "api")]
pub mod gbif;
pub mod occurrence;
pub mod signal;
pub mod species;
pub mod station;
pub mod stretch;

pub(crate) mod record;
