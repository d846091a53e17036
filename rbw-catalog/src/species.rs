use crate::{
    error::{CatalogError, Result},
    record::text,
};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Catalogue used when a stretch has no survey of its own.
pub const DEFAULT_CATALOGUE_ID: &str = "upper";

/// Sensitivity of a species to water pollution.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    /// Requires clean water
    Clean,
    /// Tolerates some pollution
    Moderate,
    /// Thrives in polluted water
    Polluted,
}

impl FromStr for Tolerance {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clean" => Ok(Tolerance::Clean),
            "moderate" => Ok(Tolerance::Moderate),
            "polluted" => Ok(Tolerance::Polluted),
            other => Err(CatalogError::InvalidFormat(format!(
                "Invalid tolerance: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tolerance::Clean => "clean",
            Tolerance::Moderate => "moderate",
            Tolerance::Polluted => "polluted",
        };
        write!(f, "{}", s)
    }
}

/// A species record in a river-stretch baseline survey.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSpecies {
    pub name: String,
    pub scientific_name: String,
    pub tolerance: Tolerance,
    pub category: String,
    /// Conservation status as surveyed (e.g. "Endangered", "Indicator")
    pub status: String,
}

impl BaselineSpecies {
    /// Parse a CSV string of baseline surveys into catalogues keyed by id.
    ///
    /// Expected CSV columns: catalogue, name, scientific_name, tolerance, category, status
    pub fn parse_baseline_csv(csv_object: &str) -> Result<BTreeMap<String, Vec<BaselineSpecies>>> {
        let mut catalogues: BTreeMap<String, Vec<BaselineSpecies>> = BTreeMap::new();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let catalogue = text(&record, 0, "catalogue")?.to_string();
            let species = BaselineSpecies {
                name: text(&record, 1, "name")?.to_string(),
                scientific_name: text(&record, 2, "scientific_name")?.to_string(),
                tolerance: text(&record, 3, "tolerance")?.parse()?,
                category: text(&record, 4, "category")?.to_string(),
                status: text(&record, 5, "status")?.to_string(),
            };
            catalogues.entry(catalogue).or_default().push(species);
        }
        Ok(catalogues)
    }
}

/// Parse the endangered watch list.
///
/// Expected CSV columns: scientific_name, common_name
pub fn parse_endangered_csv(csv_object: &str) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_object.as_bytes());
    let mut names = Vec::new();
    for row in rdr.records() {
        let record = row?;
        names.push(text(&record, 0, "scientific_name")?.to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = include_str!("../../fixtures/baseline_species.csv");

    #[test]
    fn test_parse_baseline_csv() {
        let catalogues = BaselineSpecies::parse_baseline_csv(CSV).unwrap();
        assert_eq!(catalogues.len(), 3);
        assert_eq!(catalogues["upper"].len(), 21);
        assert_eq!(catalogues["middle"].len(), 23);
        assert_eq!(catalogues["lower"].len(), 22);
        let dolphin = &catalogues["upper"][0];
        assert_eq!(dolphin.scientific_name, "Platanista gangetica");
        assert_eq!(dolphin.tolerance, Tolerance::Clean);
    }

    #[test]
    fn test_tolerance_from_str() {
        assert_eq!("Polluted".parse::<Tolerance>().unwrap(), Tolerance::Polluted);
        assert!("filthy".parse::<Tolerance>().is_err());
        assert_eq!(Tolerance::Moderate.to_string(), "moderate");
    }

    #[test]
    fn test_parse_endangered_csv() {
        let names = parse_endangered_csv(include_str!("../../fixtures/endangered_species.csv")).unwrap();
        assert!(names.iter().any(|n| n == "Panthera tigris"));
        assert_eq!(names.len(), 14);
    }
}
