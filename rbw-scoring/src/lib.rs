//! Environmental risk and biodiversity scoring.
//!
//! Four analyzers turn already-fetched raw inputs into scores:
//!
//! - [`image_stats`] + [`water_quality`]: photo pixels and a regulatory
//!   station reading become a Good / Average / Poor water status.
//! - [`richness`]: a stretch's baseline species are partitioned by how
//!   likely they are to persist under that status.
//! - [`occurrence_risk`]: recent vs. historical occurrence counts, the
//!   endangered watch list and human proximity become a risk level.
//! - [`buffer_zone`]: occurrence records inside a corridor around the river
//!   are bucketed by conservation status.
//!
//! Everything is synchronous and pure except the concurrent recent/historical
//! fetch in [`occurrence_risk::gather_sample`] and the optional offloaded
//! image decode.

pub mod analysis;
pub mod buffer_zone;
pub mod config;
pub mod error;
pub mod image_stats;
pub mod occurrence_risk;
pub mod richness;
pub mod water_quality;

pub(crate) mod round;
