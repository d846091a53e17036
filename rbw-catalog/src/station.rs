use crate::{
    error::Result,
    record::{parse, text},
};
use csv::ReaderBuilder;
use rbw_utils::location::Location;
use serde::{Deserialize, Serialize};

/// Regulatory water-quality reading at a monitoring station.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReading {
    /// Dissolved oxygen, mg/L
    pub dissolved_oxygen: f64,
    /// Biochemical oxygen demand, mg/L
    pub biochemical_oxygen_demand: f64,
    /// Total coliform, MPN/100mL
    pub total_coliform: f64,
    pub ph: f64,
}

/// Reading used when a station has no published data.
pub const DEFAULT_READING: StationReading = StationReading {
    dissolved_oxygen: 7.0,
    biochemical_oxygen_demand: 3.0,
    total_coliform: 5000.0,
    ph: 7.3,
};

/// A regulatory monitoring point along the river.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStation {
    pub name: String,
    pub location: Location,
    pub reading: StationReading,
}

/// The station closest to a query point.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestStation<'a> {
    pub station: &'a MonitoringStation,
    /// Great-circle distance, rounded to whole km
    pub distance_km: f64,
}

impl MonitoringStation {
    /// Parse a CSV string of monitoring stations.
    ///
    /// Expected CSV columns: name, lat, lon, dissolved_oxygen,
    /// biochemical_oxygen_demand, total_coliform, ph
    pub fn parse_station_csv(csv_object: &str) -> Result<Vec<MonitoringStation>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        let mut stations = Vec::new();
        for row in rdr.records() {
            let record = row?;
            stations.push(MonitoringStation {
                name: text(&record, 0, "name")?.to_string(),
                location: Location::new(parse(&record, 1, "lat")?, parse(&record, 2, "lon")?)?,
                reading: StationReading {
                    dissolved_oxygen: parse(&record, 3, "dissolved_oxygen")?,
                    biochemical_oxygen_demand: parse(&record, 4, "biochemical_oxygen_demand")?,
                    total_coliform: parse(&record, 5, "total_coliform")?,
                    ph: parse(&record, 6, "ph")?,
                },
            });
        }
        Ok(stations)
    }
}

/// Closest station by haversine distance; ties go to the first listed.
pub fn nearest_station<'a>(
    stations: &'a [MonitoringStation],
    location: &Location,
) -> Option<NearestStation<'a>> {
    let mut nearest: Option<(&MonitoringStation, f64)> = None;
    for station in stations {
        let distance = location.distance_km(&station.location);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((station, distance)),
        }
    }
    nearest.map(|(station, distance)| NearestStation {
        station,
        distance_km: distance.round(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = include_str!("../../fixtures/stations.csv");

    #[test]
    fn test_parse_station_csv() {
        let stations = MonitoringStation::parse_station_csv(CSV).unwrap();
        assert_eq!(stations.len(), 6);
        assert_eq!(stations[1].name, "Kanpur");
        assert!((stations[1].reading.total_coliform - 8500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nearest_station() {
        let stations = MonitoringStation::parse_station_csv(CSV).unwrap();
        let near_varanasi = Location::new(25.30, 83.05).unwrap();
        let nearest = nearest_station(&stations, &near_varanasi).unwrap();
        assert_eq!(nearest.station.name, "Varanasi");
        assert!(nearest.distance_km < 10.0);
    }

    #[test]
    fn test_nearest_station_tie_goes_to_first() {
        let here = Location::new(25.0, 80.0).unwrap();
        let twin = |name: &str| MonitoringStation {
            name: name.to_string(),
            location: Location::new(26.0, 80.0).unwrap(),
            reading: DEFAULT_READING,
        };
        let stations = vec![twin("first"), twin("second")];
        assert_eq!(nearest_station(&stations, &here).unwrap().station.name, "first");
    }

    #[test]
    fn test_nearest_station_empty() {
        let here = Location::new(25.0, 80.0).unwrap();
        assert!(nearest_station(&[], &here).is_none());
    }
}
