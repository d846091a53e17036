//! Runtime knobs for the analyzers.

use crate::occurrence_risk::ProximityModel;
use rbw_catalog::occurrence::{HISTORICAL_LIMIT, RECENT_LIMIT};
use std::time::Duration;

/// Upper bound on any single upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Historical queries only count events at least this many days old.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Corridor half-width and occurrence search radius, km.
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Records requested per bounding-box search.
pub const DEFAULT_BBOX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub fetch_timeout: Duration,
    pub lookback_days: i64,
    pub radius_km: f64,
    pub recent_limit: u32,
    pub historical_limit: u32,
    pub bbox_limit: u32,
    pub proximity: ProximityModel,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            radius_km: DEFAULT_RADIUS_KM,
            recent_limit: RECENT_LIMIT,
            historical_limit: HISTORICAL_LIMIT,
            bbox_limit: DEFAULT_BBOX_LIMIT,
            proximity: ProximityModel::default(),
        }
    }
}
