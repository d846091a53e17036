//! Field access helpers shared by the catalogue CSV parsers.

use crate::error::{CatalogError, Result};
use csv::StringRecord;
use std::str::FromStr;

/// Trimmed text of column `index`, or an `InvalidFormat` naming the column.
pub(crate) fn text<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| CatalogError::InvalidFormat(format!("Missing {} field", name)))
}

/// Parse column `index` into `T`.
pub(crate) fn parse<T: FromStr>(record: &StringRecord, index: usize, name: &str) -> Result<T> {
    let raw = text(record, index, name)?;
    raw.parse::<T>()
        .map_err(|_| CatalogError::InvalidFormat(format!("Invalid {}: {}", name, raw)))
}
