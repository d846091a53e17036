//! The load-once reference catalogue.
//!
//! All tables are parsed from CSV at startup and are read-only afterwards;
//! analyzers receive a `&Catalog` rather than reaching for globals.

use crate::{
    error::Result,
    record::parse,
    species::{parse_endangered_csv, BaselineSpecies, DEFAULT_CATALOGUE_ID},
    station::{nearest_station, MonitoringStation, NearestStation, StationReading, DEFAULT_READING},
    stretch::RiverStretch,
};
use csv::ReaderBuilder;
use log::{info, warn};
use rbw_utils::location::Location;
use std::collections::{BTreeMap, BTreeSet};

/// Embedded CSV data for the river stretches.
pub static STRETCHES_CSV: &str = include_str!("../../fixtures/stretches.csv");

/// Embedded CSV data for the baseline species surveys.
pub static BASELINE_SPECIES_CSV: &str = include_str!("../../fixtures/baseline_species.csv");

/// Embedded CSV data for the regulatory monitoring stations.
pub static STATIONS_CSV: &str = include_str!("../../fixtures/stations.csv");

/// Embedded CSV data for the river centerline, source to mouth.
pub static CENTERLINE_CSV: &str = include_str!("../../fixtures/centerline.csv");

/// Embedded CSV data for the endangered-species watch list.
pub static ENDANGERED_CSV: &str = include_str!("../../fixtures/endangered_species.csv");

/// Source CSV text for each catalogue table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub stretches: &'a str,
    pub baseline_species: &'a str,
    pub stations: &'a str,
    pub centerline: &'a str,
    pub endangered: &'a str,
}

impl Default for CatalogSources<'static> {
    fn default() -> Self {
        CatalogSources {
            stretches: STRETCHES_CSV,
            baseline_species: BASELINE_SPECIES_CSV,
            stations: STATIONS_CSV,
            centerline: CENTERLINE_CSV,
            endangered: ENDANGERED_CSV,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    stretches: Vec<RiverStretch>,
    baselines: BTreeMap<String, Vec<BaselineSpecies>>,
    stations: Vec<MonitoringStation>,
    centerline: Vec<Location>,
    endangered: BTreeSet<String>,
}

impl Catalog {
    /// Parse the catalogue compiled into the binary.
    pub fn embedded() -> Result<Catalog> {
        Catalog::from_sources(CatalogSources::default())
    }

    pub fn from_sources(sources: CatalogSources<'_>) -> Result<Catalog> {
        let catalog = Catalog {
            stretches: RiverStretch::parse_stretch_csv(sources.stretches)?,
            baselines: BaselineSpecies::parse_baseline_csv(sources.baseline_species)?,
            stations: MonitoringStation::parse_station_csv(sources.stations)?,
            centerline: parse_centerline_csv(sources.centerline)?,
            endangered: parse_endangered_csv(sources.endangered)?.into_iter().collect(),
        };
        info!(
            "Catalogue loaded: {} stretches, {} species catalogues, {} stations, {} centerline vertices",
            catalog.stretches.len(),
            catalog.baselines.len(),
            catalog.stations.len(),
            catalog.centerline.len()
        );
        Ok(catalog)
    }

    pub fn stretches(&self) -> &[RiverStretch] {
        &self.stretches
    }

    pub fn stretch(&self, id: &str) -> Option<&RiverStretch> {
        self.stretches.iter().find(|s| s.id == id)
    }

    /// Resolve a stretch id to its baseline catalogue.
    ///
    /// Unknown ids resolve to the default catalogue; the returned id says
    /// which catalogue was actually used.
    pub fn baseline_species(&self, stretch_id: &str) -> (&str, &[BaselineSpecies]) {
        if let Some((id, species)) = self.baselines.get_key_value(stretch_id) {
            return (id.as_str(), species.as_slice());
        }
        warn!(
            "No baseline catalogue for stretch '{}', using '{}'",
            stretch_id, DEFAULT_CATALOGUE_ID
        );
        self.baselines
            .get_key_value(DEFAULT_CATALOGUE_ID)
            .map(|(id, species)| (id.as_str(), species.as_slice()))
            .unwrap_or((DEFAULT_CATALOGUE_ID, &[] as &[BaselineSpecies]))
    }

    pub fn species_by_category(&self, stretch_id: &str, category: &str) -> Vec<&BaselineSpecies> {
        let (_, baseline) = self.baseline_species(stretch_id);
        baseline.iter().filter(|s| s.category == category).collect()
    }

    /// Every baseline catalogue keyed by id.
    pub fn tolerance_profiles(&self) -> &BTreeMap<String, Vec<BaselineSpecies>> {
        &self.baselines
    }

    pub fn stations(&self) -> &[MonitoringStation] {
        &self.stations
    }

    pub fn nearest_station(&self, location: &Location) -> Option<NearestStation<'_>> {
        nearest_station(&self.stations, location)
    }

    /// Published reading for a station, or the default reading.
    pub fn station_reading(&self, name: &str) -> StationReading {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.reading)
            .unwrap_or(DEFAULT_READING)
    }

    /// River centerline vertices, source to mouth.
    pub fn centerline(&self) -> &[Location] {
        &self.centerline
    }

    /// Exact match against the endangered watch list.
    pub fn is_endangered(&self, scientific_name: &str) -> bool {
        self.endangered.contains(scientific_name.trim())
    }
}

/// Parse centerline vertices.
///
/// Expected CSV columns: lat, lon
pub fn parse_centerline_csv(csv_object: &str) -> Result<Vec<Location>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_object.as_bytes());
    let mut vertices = Vec::new();
    for row in rdr.records() {
        let record = row?;
        vertices.push(Location::new(parse(&record, 0, "lat")?, parse(&record, 1, "lon")?)?);
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.stretches().len(), 6);
        assert_eq!(catalog.stations().len(), 6);
        assert_eq!(catalog.centerline().len(), 8);
        assert_eq!(catalog.tolerance_profiles().len(), 3);
        assert!(catalog.stretch("delta").is_some());
        assert!(catalog.stretch("nile").is_none());
    }

    #[test]
    fn test_unknown_stretch_falls_back_to_default() {
        let catalog = Catalog::embedded().unwrap();
        let (id, species) = catalog.baseline_species("middle-upper");
        assert_eq!(id, DEFAULT_CATALOGUE_ID);
        assert_eq!(species.len(), 21);
        let (id, species) = catalog.baseline_species("lower");
        assert_eq!(id, "lower");
        assert_eq!(species.len(), 22);
    }

    #[test]
    fn test_species_by_category() {
        let catalog = Catalog::embedded().unwrap();
        let turtles = catalog.species_by_category("upper", "turtle");
        assert_eq!(turtles.len(), 3);
        assert!(catalog.species_by_category("upper", "bird").is_empty());
    }

    #[test]
    fn test_station_reading_fallback() {
        let catalog = Catalog::embedded().unwrap();
        assert!((catalog.station_reading("Patna").dissolved_oxygen - 7.4).abs() < f64::EPSILON);
        assert_eq!(catalog.station_reading("Nowhere"), DEFAULT_READING);
    }

    #[test]
    fn test_is_endangered() {
        let catalog = Catalog::embedded().unwrap();
        assert!(catalog.is_endangered("Panthera tigris"));
        assert!(!catalog.is_endangered("panthera tigris"));
        assert!(!catalog.is_endangered("Labeo rohita"));
    }

    #[test]
    fn test_centerline_rejects_bad_coordinates() {
        assert!(parse_centerline_csv("lat,lon\n95.0,80.0\n").is_err());
    }
}
