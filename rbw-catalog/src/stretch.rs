use crate::{
    error::Result,
    record::{parse, text},
};
use csv::ReaderBuilder;
use rbw_utils::location::Location;
use serde::{Deserialize, Serialize};

/// Stretch id used when a location falls outside every boundary.
pub const DEFAULT_STRETCH_ID: &str = "middle";

/// A monitored segment of the river with its biodiversity context.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverStretch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub state: String,
    pub start: Location,
    pub end: Location,
    /// Approximate length in km
    pub length_km: u32,
    /// Number of species recorded in the baseline surveys
    pub baseline_species: u32,
    pub conservation_status: String,
    pub pollution_level: String,
    pub key_species: Vec<String>,
}

/// Map-facing summary of a stretch.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub state: String,
    pub length_km: u32,
    pub baseline_species: u32,
    pub conservation_status: String,
    pub pollution_level: String,
    pub pollution_color: &'static str,
    pub key_species: Vec<String>,
    pub center: Location,
}

impl RiverStretch {
    /// Parse a CSV string of stretch data.
    ///
    /// Expected CSV columns: id, name, description, state, start_lat, start_lon,
    /// end_lat, end_lon, length_km, baseline_species, conservation_status,
    /// pollution_level, key_species (`;` separated)
    pub fn parse_stretch_csv(csv_object: &str) -> Result<Vec<RiverStretch>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        let mut stretches = Vec::new();
        for row in rdr.records() {
            let record = row?;
            let start = Location::new(
                parse(&record, 4, "start_lat")?,
                parse(&record, 5, "start_lon")?,
            )?;
            let end = Location::new(parse(&record, 6, "end_lat")?, parse(&record, 7, "end_lon")?)?;
            let key_species = text(&record, 12, "key_species")?
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            stretches.push(RiverStretch {
                id: text(&record, 0, "id")?.to_string(),
                name: text(&record, 1, "name")?.to_string(),
                description: text(&record, 2, "description")?.to_string(),
                state: text(&record, 3, "state")?.to_string(),
                start,
                end,
                length_km: parse(&record, 8, "length_km")?,
                baseline_species: parse(&record, 9, "baseline_species")?,
                conservation_status: text(&record, 10, "conservation_status")?.to_string(),
                pollution_level: text(&record, 11, "pollution_level")?.to_string(),
                key_species,
            });
        }
        Ok(stretches)
    }

    /// Midpoint of the stretch's start and end.
    pub fn center(&self) -> Location {
        self.start.midpoint(&self.end)
    }

    pub fn info(&self) -> StretchInfo {
        StretchInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            state: self.state.clone(),
            length_km: self.length_km,
            baseline_species: self.baseline_species,
            conservation_status: self.conservation_status.clone(),
            pollution_level: self.pollution_level.clone(),
            pollution_color: pollution_color(&self.pollution_level),
            key_species: self.key_species.clone(),
            center: self.center(),
        }
    }
}

/// Rough (max latitude, max longitude) boundaries, checked in order.
const STRETCH_BOUNDARIES: [(f64, Option<f64>, &str); 6] = [
    (31.0, Some(79.0), "upper"),
    (29.95, Some(81.0), "middle-upper"),
    (26.5, Some(82.0), "middle"),
    (25.6, Some(87.0), "middle-lower"),
    (25.6, Some(90.0), "lower"),
    (22.5, None, "delta"),
];

/// Resolve the stretch id that covers a location.
pub fn stretch_for_location(location: &Location) -> &'static str {
    STRETCH_BOUNDARIES
        .iter()
        .find(|(max_lat, max_lon, _)| {
            location.lat <= *max_lat && max_lon.map_or(true, |max_lon| location.lon <= max_lon)
        })
        .map(|(_, _, id)| *id)
        .unwrap_or(DEFAULT_STRETCH_ID)
}

/// Map colour (hex) for a pollution level; grey when unknown.
pub fn pollution_color(pollution_level: &str) -> &'static str {
    match pollution_level {
        "Low" => "#22c55e",
        "Moderate" => "#84cc16",
        "High" => "#eab308",
        "Very High" => "#f97316",
        "Critical" => "#ef4444",
        _ => "#6b7280",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = include_str!("../../fixtures/stretches.csv");

    #[test]
    fn test_parse_stretch_csv() {
        let stretches = RiverStretch::parse_stretch_csv(CSV).unwrap();
        assert_eq!(stretches.len(), 6);
        assert_eq!(stretches[0].id, "upper");
        assert_eq!(stretches[1].state, "Uttarakhand, Uttar Pradesh");
        assert_eq!(stretches[4].key_species.len(), 4);
        assert_eq!(stretches[5].pollution_level, "Critical");
    }

    #[test]
    fn test_center_is_midpoint() {
        let stretches = RiverStretch::parse_stretch_csv(CSV).unwrap();
        let delta = &stretches[5];
        let center = delta.center();
        assert!((center.lat - (22.5726 + 21.5) / 2.0).abs() < 1e-9);
        assert!((center.lon - (88.3639 + 89.5) / 2.0).abs() < 1e-9);
        assert_eq!(delta.info().pollution_color, "#ef4444");
    }

    #[test]
    fn test_stretch_for_location() {
        let haridwar = Location::new(29.9457, 78.1642).unwrap();
        assert_eq!(stretch_for_location(&haridwar), "upper");
        let kanpur = Location::new(26.4475, 80.4456).unwrap();
        assert_eq!(stretch_for_location(&kanpur), "middle-upper");
        let patna = Location::new(25.5941, 85.1376).unwrap();
        assert_eq!(stretch_for_location(&patna), "middle-lower");
        let far_north = Location::new(45.0, 95.0).unwrap();
        assert_eq!(stretch_for_location(&far_north), DEFAULT_STRETCH_ID);
    }

    #[test]
    fn test_rejects_bad_row() {
        let csv = "id,name,description,state,start_lat,start_lon,end_lat,end_lon,length_km,baseline_species,conservation_status,pollution_level,key_species\n\
x,X,d,s,not-a-number,78.0,29.0,78.0,10,1,c,Low,a\n";
        assert!(RiverStretch::parse_stretch_csv(csv).is_err());
    }
}
