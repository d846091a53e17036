//! Shared utility functions for RBW crates.

/// Geographic location helpers
pub mod location {
    use crate::error::ValidationError;
    use geo::{HaversineDistance, Point};
    use serde::{Deserialize, Serialize};

    /// A WGS84 position. Latitude always comes first; conversion to the
    /// (x = lon, y = lat) convention happens only in [`Location::to_point`].
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Location {
        pub lat: f64,
        pub lon: f64,
    }

    impl Location {
        /// Build a location, rejecting non-finite or out-of-range coordinates.
        pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::Latitude(lat));
            }
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(ValidationError::Longitude(lon));
            }
            Ok(Location { lat, lon })
        }

        /// Build a location from optional request fields.
        ///
        /// A missing coordinate is an error; it is never replaced with 0.
        pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Self, ValidationError> {
            match (lat, lon) {
                (Some(lat), Some(lon)) => Location::new(lat, lon),
                (None, _) => Err(ValidationError::MissingField("lat")),
                (_, None) => Err(ValidationError::MissingField("lon")),
            }
        }

        /// Convert to a `geo` point (x = longitude, y = latitude).
        pub fn to_point(&self) -> Point<f64> {
            Point::new(self.lon, self.lat)
        }

        /// Great-circle distance in kilometres.
        pub fn distance_km(&self, other: &Location) -> f64 {
            self.to_point().haversine_distance(&other.to_point()) / 1000.0
        }

        /// Midpoint of two locations in coordinate space.
        pub fn midpoint(&self, other: &Location) -> Location {
            Location {
                lat: (self.lat + other.lat) / 2.0,
                lon: (self.lon + other.lon) / 2.0,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_rejects_out_of_range() {
            assert!(Location::new(91.0, 10.0).is_err());
            assert!(Location::new(10.0, -181.0).is_err());
            assert!(Location::new(f64::NAN, 10.0).is_err());
            assert!(Location::new(25.3, 83.0).is_ok());
        }

        #[test]
        fn test_missing_coordinate_is_an_error() {
            assert_eq!(
                Location::from_parts(None, Some(80.0)),
                Err(ValidationError::MissingField("lat"))
            );
            assert_eq!(
                Location::from_parts(Some(25.0), None),
                Err(ValidationError::MissingField("lon"))
            );
        }

        #[test]
        fn test_distance_km() {
            let varanasi = Location::new(25.3176, 83.0103).unwrap();
            let patna = Location::new(25.5941, 85.1376).unwrap();
            let d = varanasi.distance_km(&patna);
            assert!(d > 205.0 && d < 220.0, "got {d}");
            assert!(varanasi.distance_km(&varanasi).abs() < 1e-9);
        }

        #[test]
        fn test_point_is_lon_lat() {
            let p = Location::new(25.0, 80.0).unwrap().to_point();
            assert_eq!(p.x(), 80.0);
            assert_eq!(p.y(), 25.0);
        }
    }
}

/// Date utility functions
pub mod dates {
    use chrono::{Duration, NaiveDate};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
    }

    /// The last day included in a backward-dated (historical) query.
    pub fn historical_cutoff(today: &NaiveDate, lookback_days: i64) -> NaiveDate {
        *today - Duration::days(lookback_days)
    }

}

/// Error types
pub mod error {
    use thiserror::Error;

    /// Malformed or missing domain input.
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum ValidationError {
        #[error("missing required field: {0}")]
        MissingField(&'static str),

        #[error("latitude out of range: {0}")]
        Latitude(f64),

        #[error("longitude out of range: {0}")]
        Longitude(f64),

        #[error("{field} must be a finite value >= 0, got {value}")]
        NegativeOrNonFinite { field: &'static str, value: f64 },

        #[error("{field} must be within [0, 1], got {value}")]
        OutOfUnitRange { field: &'static str, value: f64 },

        #[error("buffer radius must be a positive distance in km, got {0}")]
        Radius(f64),

        #[error("river centerline has no vertices")]
        EmptyCenterline,

        #[error("unknown water status: {0}")]
        UnknownWaterStatus(String),
    }

    /// Reject NaN, infinities and negatives.
    pub fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ValidationError::NegativeOrNonFinite { field, value })
        }
    }

    /// Reject anything outside [0, 1].
    pub fn unit_interval(field: &'static str, value: f64) -> Result<f64, ValidationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfUnitRange { field, value })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_non_negative() {
            assert_eq!(non_negative("bod", 0.0), Ok(0.0));
            assert!(non_negative("bod", -0.1).is_err());
            assert!(non_negative("bod", f64::INFINITY).is_err());
        }

        #[test]
        fn test_unit_interval() {
            assert_eq!(unit_interval("humanProximity", 1.0), Ok(1.0));
            assert!(unit_interval("humanProximity", 1.01).is_err());
        }
    }
}
