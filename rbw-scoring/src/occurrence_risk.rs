//! Risk from occurrence trends, endangerment and human proximity.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::round::{round2, serialize_round2};
use chrono::NaiveDate;
use log::{info, warn};
use rbw_catalog::catalog::Catalog;
use rbw_catalog::error::CatalogError;
use rbw_catalog::occurrence::{OccurrenceQuery, OccurrenceSource};
use rbw_catalog::signal::Signal;
use rbw_utils::dates::historical_cutoff;
use rbw_utils::error::{non_negative, unit_interval, ValidationError};
use rbw_utils::location::Location;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::{error::Elapsed, timeout};

/// Recent count used when the live query fails.
pub const RECENT_FALLBACK: u32 = 0;
/// Historical average used when the backward-dated query fails.
pub const HISTORICAL_FALLBACK: u32 = 4;

// Rule weights in tenths of a point, so thresholds compare exactly.
const ENDANGERED_WEIGHT: u32 = 15;
const SURGE_WEIGHT: u32 = 15;
const INCREASE_WEIGHT: u32 = 12;
const DECLINE_WEIGHT: u32 = 10;
const NEAR_WEIGHT: u32 = 8;
const MODERATE_PROXIMITY_WEIGHT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Positive,
    #[serde(rename = "At Risk")]
    AtRisk,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> RiskLevel {
        if score >= 3.0 {
            RiskLevel::Critical
        } else if score >= 2.0 {
            RiskLevel::High
        } else if score >= 1.0 {
            RiskLevel::AtRisk
        } else {
            RiskLevel::Positive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Positive => "Positive",
            RiskLevel::AtRisk => "At Risk",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub score: f64,
    pub level: RiskLevel,
    /// One entry per triggered rule: endangerment, trend, then proximity
    pub reasons: Vec<String>,
    #[serde(serialize_with = "serialize_round2")]
    pub trend_ratio: f64,
    pub observations: u32,
}

/// `recent / max(historical, 1)`.
pub fn trend_ratio(recent_count: u32, historical_avg: f64) -> f64 {
    recent_count as f64 / historical_avg.max(1.0)
}

/// Additive risk score.
///
/// Fails only for a non-finite or negative `historical_avg` or a
/// `human_proximity` outside [0, 1].
pub fn score_risk(
    recent_count: u32,
    historical_avg: f64,
    endangered: bool,
    human_proximity: f64,
) -> std::result::Result<RiskScore, ValidationError> {
    let historical_avg = non_negative("historicalAvg", historical_avg)?;
    let human_proximity = unit_interval("humanProximity", human_proximity)?;
    let ratio = trend_ratio(recent_count, historical_avg);

    let mut tenths = 0;
    let mut reasons = Vec::new();

    if endangered {
        tenths += ENDANGERED_WEIGHT;
        reasons.push("Endangered species detected".to_string());
    }

    if ratio >= 3.0 {
        tenths += SURGE_WEIGHT;
        reasons.push(format!("Major surge ({:.1}x average)", ratio));
    } else if ratio >= 2.0 {
        tenths += INCREASE_WEIGHT;
        reasons.push(format!("Unusual increase ({:.1}x average)", ratio));
    } else if ratio < 0.5 {
        tenths += DECLINE_WEIGHT;
        reasons.push(format!("Decline in sightings ({:.1}x average)", ratio));
    }

    if human_proximity >= 0.7 {
        tenths += NEAR_WEIGHT;
        reasons.push("Near human areas".to_string());
    } else if human_proximity >= 0.4 {
        tenths += MODERATE_PROXIMITY_WEIGHT;
        reasons.push("Moderate proximity".to_string());
    }

    let score = tenths as f64 / 10.0;
    Ok(RiskScore {
        score,
        level: RiskLevel::from_score(score),
        reasons,
        trend_ratio: ratio,
        observations: recent_count,
    })
}

/// How close a site is to people, 0 (remote) to 1 (in town).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProximityModel {
    /// Same value everywhere
    Fixed(f64),
    /// `1 - d / reach_km` to the nearest monitoring-station town, clamped
    NearestSettlement { reach_km: f64 },
}

impl Default for ProximityModel {
    fn default() -> Self {
        ProximityModel::Fixed(0.7)
    }
}

impl ProximityModel {
    pub fn human_proximity(&self, catalog: &Catalog, location: &Location) -> f64 {
        match *self {
            ProximityModel::Fixed(value) => value,
            ProximityModel::NearestSettlement { reach_km } => {
                if !(reach_km.is_finite() && reach_km > 0.0) {
                    return 0.0;
                }
                catalog
                    .stations()
                    .iter()
                    .map(|s| s.location.distance_km(location))
                    .min_by(f64::total_cmp)
                    .map(|d| (1.0 - d / reach_km).clamp(0.0, 1.0))
                    .unwrap_or(0.0)
            }
        }
    }
}

/// Occurrence counts around a site, each either live or a fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceSample {
    pub species: String,
    pub location: Location,
    pub radius_km: f64,
    pub recent_count: Signal<u32>,
    pub historical_avg: Signal<u32>,
}

fn settle(
    label: &str,
    outcome: std::result::Result<std::result::Result<u32, CatalogError>, Elapsed>,
    fallback: u32,
    limit: Duration,
) -> Signal<u32> {
    match outcome {
        Ok(Ok(count)) => Signal::Live(count),
        Ok(Err(e)) => {
            warn!("{} occurrence fetch failed, using {}: {}", label, fallback, e);
            Signal::degraded(fallback, format!("{} fetch failed: {}", label, e))
        }
        Err(_) => {
            warn!("{} occurrence fetch timed out after {:?}, using {}", label, limit, fallback);
            Signal::degraded(fallback, format!("{} fetch timed out after {:?}", label, limit))
        }
    }
}

/// Fetch the recent and historical counts concurrently.
///
/// Each fetch is bounded by `config.fetch_timeout`; a failure or timeout on
/// either side resolves to its fallback instead of aborting the other.
pub async fn gather_sample<S: OccurrenceSource>(
    source: &S,
    query: &OccurrenceQuery,
    config: &ScoringConfig,
    today: NaiveDate,
) -> OccurrenceSample {
    let cutoff = historical_cutoff(&today, config.lookback_days);
    let (recent, historical) = tokio::join!(
        timeout(config.fetch_timeout, source.recent_count(query)),
        timeout(config.fetch_timeout, source.historical_count(query, cutoff)),
    );

    OccurrenceSample {
        species: query.species.clone(),
        location: query.location,
        radius_km: query.radius_km,
        recent_count: settle("recent", recent, RECENT_FALLBACK, config.fetch_timeout),
        historical_avg: settle("historical", historical, HISTORICAL_FALLBACK, config.fetch_timeout),
    }
}

/// An alert worth raising for a scored species.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCandidate {
    pub title: String,
    pub level: RiskLevel,
    pub description: String,
    /// Percent, capped at 99
    pub confidence: f64,
    pub location: Location,
    pub observations: u32,
    #[serde(serialize_with = "serialize_round2")]
    pub trend_ratio: f64,
}

/// An alert for any score of at least 1.0.
pub fn alert_candidate(species: &str, location: Location, risk: &RiskScore) -> Option<AlertCandidate> {
    if risk.score < 1.0 {
        return None;
    }
    Some(AlertCandidate {
        title: format!("{} Activity Alert", species),
        level: risk.level,
        description: risk.reasons.join(". "),
        confidence: round2((risk.score * 30.0).min(99.0)),
        location,
        observations: risk.observations,
        trend_ratio: risk.trend_ratio,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesClassification {
    #[serde(flatten)]
    pub risk: RiskScore,
    pub endangered: bool,
    pub human_proximity: f64,
    pub sample: OccurrenceSample,
    pub alert: Option<AlertCandidate>,
}

/// Fetch, then score, one species at one site.
pub async fn classify_species<S: OccurrenceSource>(
    source: &S,
    catalog: &Catalog,
    config: &ScoringConfig,
    species: &str,
    location: Location,
    today: NaiveDate,
) -> Result<SpeciesClassification> {
    if !(config.radius_km.is_finite() && config.radius_km > 0.0) {
        return Err(ValidationError::Radius(config.radius_km).into());
    }
    let query = OccurrenceQuery {
        species: species.to_string(),
        location,
        radius_km: config.radius_km,
        recent_limit: config.recent_limit,
        historical_limit: config.historical_limit,
    };
    let sample = gather_sample(source, &query, config, today).await;
    let endangered = catalog.is_endangered(species);
    let human_proximity = config.proximity.human_proximity(catalog, &location);
    let risk = score_risk(
        *sample.recent_count.value(),
        *sample.historical_avg.value() as f64,
        endangered,
        human_proximity,
    )?;
    info!(
        "{} at ({:.4}, {:.4}): {} ({:.1})",
        species, location.lat, location.lon, risk.level, risk.score
    );

    Ok(SpeciesClassification {
        alert: alert_candidate(species, location, &risk),
        risk,
        endangered,
        human_proximity,
        sample,
    })
}
