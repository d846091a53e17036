/// Occurrence records and the query seam used to count them upstream.
use crate::error::Result;
use chrono::NaiveDate;
use rbw_utils::location::Location;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Default number of records requested for the recent-activity count.
pub const RECENT_LIMIT: u32 = 300;

/// Default number of records requested for the historical count.
pub const HISTORICAL_LIMIT: u32 = 100;

/// One species-location record from a biodiversity occurrence service.
///
/// Field names follow the GBIF occurrence payload; the aliases accept the
/// shorter names used in locally prepared record files.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceRecord {
    #[serde(default, alias = "key")]
    pub gbif_id: Option<u64>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default, alias = "vernacularName")]
    pub common_name: Option<String>,
    #[serde(default, alias = "lat")]
    pub decimal_latitude: Option<f64>,
    #[serde(default, alias = "lon")]
    pub decimal_longitude: Option<f64>,
    #[serde(default, alias = "iucnRedListCategory", alias = "conservationStatus")]
    pub iucn_status: Option<String>,
    #[serde(default)]
    pub individual_count: Option<u32>,
    #[serde(default)]
    pub basis_of_record: Option<String>,
}

impl OccurrenceRecord {
    /// The record's position, if it has a complete and valid one.
    pub fn location(&self) -> Option<Location> {
        match (self.decimal_latitude, self.decimal_longitude) {
            (Some(lat), Some(lon)) => Location::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Common name when present, otherwise the scientific name.
    pub fn display_name(&self) -> Option<&str> {
        self.common_name
            .as_deref()
            .or(self.scientific_name.as_deref())
    }

    /// Individuals observed; a record with no count stands for one.
    pub fn individuals(&self) -> u32 {
        self.individual_count.unwrap_or(1)
    }

    /// Parse a JSON array of records.
    pub fn parse_json_records(json: &str) -> Result<Vec<OccurrenceRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A page of results from the occurrence search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrencePage {
    #[serde(default)]
    pub results: Vec<OccurrenceRecord>,
}

/// Axis-aligned search window in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// WKT polygon in GBIF's counter-clockwise (lon lat) order.
    pub fn to_wkt(&self) -> String {
        format!(
            "POLYGON(({min_lon} {min_lat}, {max_lon} {min_lat}, {max_lon} {max_lat}, {min_lon} {max_lat}, {min_lon} {min_lat}))",
            min_lon = self.min_lon,
            min_lat = self.min_lat,
            max_lon = self.max_lon,
            max_lat = self.max_lat,
        )
    }
}

/// What to count: a species around a point.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceQuery {
    pub species: String,
    pub location: Location,
    pub radius_km: f64,
    pub recent_limit: u32,
    pub historical_limit: u32,
}

impl OccurrenceQuery {
    pub fn new(species: impl Into<String>, location: Location, radius_km: f64) -> Self {
        OccurrenceQuery {
            species: species.into(),
            location,
            radius_km,
            recent_limit: RECENT_LIMIT,
            historical_limit: HISTORICAL_LIMIT,
        }
    }
}

/// Upstream occurrence counts. The two counts are independent, so callers
/// are free to request them concurrently.
pub trait OccurrenceSource {
    /// Occurrences recorded up to now.
    fn recent_count(&self, query: &OccurrenceQuery) -> impl Future<Output = Result<u32>> + Send;

    /// Occurrences recorded on or before `cutoff`.
    fn historical_count(
        &self,
        query: &OccurrenceQuery,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<u32>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed from https://api.gbif.org/v1/occurrence/search?scientificName=Platanista%20gangetica&limit=2
    const GBIF_PAGE: &str = r#"{
        "offset": 0, "limit": 2, "endOfRecords": false, "count": 1875,
        "results": [
            {"key": 4011254837, "scientificName": "Platanista gangetica (Roxburgh, 1801)",
             "vernacularName": "Ganges River Dolphin", "decimalLatitude": 25.435,
             "decimalLongitude": 81.846, "iucnRedListCategory": "EN",
             "individualCount": 2, "basisOfRecord": "HUMAN_OBSERVATION"},
            {"key": 4011254838, "scientificName": "Platanista gangetica (Roxburgh, 1801)",
             "basisOfRecord": "HUMAN_OBSERVATION"}
        ]
    }"#;

    #[test]
    fn test_parse_gbif_page() {
        let page: OccurrencePage = serde_json::from_str(GBIF_PAGE).unwrap();
        assert_eq!(page.results.len(), 2);
        let first = &page.results[0];
        assert_eq!(first.gbif_id, Some(4011254837));
        assert_eq!(first.iucn_status.as_deref(), Some("EN"));
        assert_eq!(first.display_name(), Some("Ganges River Dolphin"));
        assert_eq!(first.individuals(), 2);
        assert!(first.location().is_some());

        let second = &page.results[1];
        assert!(second.location().is_none());
        assert_eq!(second.individuals(), 1);
        assert_eq!(
            second.display_name(),
            Some("Platanista gangetica (Roxburgh, 1801)")
        );
    }

    #[test]
    fn test_parse_local_records() {
        let json = r#"[{"scientificName": "Gavialis gangeticus", "lat": 26.95, "lon": 78.17,
                        "conservationStatus": "CR"}]"#;
        let records = OccurrenceRecord::parse_json_records(json).unwrap();
        assert_eq!(records[0].iucn_status.as_deref(), Some("CR"));
        let location = records[0].location().unwrap();
        assert_eq!(location.lat, 26.95);
    }

    #[test]
    fn test_bbox_wkt() {
        let bbox = BoundingBox {
            min_lat: 22.0,
            min_lon: 78.0,
            max_lat: 31.0,
            max_lon: 90.0,
        };
        assert_eq!(
            bbox.to_wkt(),
            "POLYGON((78 22, 90 22, 90 31, 78 31, 78 22))"
        );
    }

    #[test]
    fn test_invalid_coordinates_have_no_location() {
        let record = OccurrenceRecord {
            decimal_latitude: Some(120.0),
            decimal_longitude: Some(80.0),
            ..Default::default()
        };
        assert!(record.location().is_none());
    }
}
