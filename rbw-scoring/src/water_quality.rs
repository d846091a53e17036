//! Water status from photo colour statistics and a regulatory station reading.

use crate::error::{Result, ScoringError};
use crate::image_stats::{ColorProfile, ExtractedProfile, ProfileSource};
use crate::round::{round2, serialize_round2};
use chrono::{DateTime, Utc};
use log::info;
use rbw_catalog::catalog::Catalog;
use rbw_catalog::station::StationReading;
use rbw_catalog::stretch::stretch_for_location;
use rbw_utils::error::{non_negative, ValidationError};
use rbw_utils::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scores at or above this are Good.
pub const GOOD_THRESHOLD: f64 = 70.0;
/// Scores at or above this (and below Good) are Average.
pub const AVERAGE_THRESHOLD: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WaterStatus {
    Good,
    Average,
    Poor,
}

impl WaterStatus {
    pub fn from_score(score: f64) -> WaterStatus {
        if score >= GOOD_THRESHOLD {
            WaterStatus::Good
        } else if score >= AVERAGE_THRESHOLD {
            WaterStatus::Average
        } else {
            WaterStatus::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterStatus::Good => "Good",
            WaterStatus::Average => "Average",
            WaterStatus::Poor => "Poor",
        }
    }

    /// Suggested actions for observers at a site with this status.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            WaterStatus::Good => &[
                "Continue monitoring activities",
                "Report any changes in water quality",
                "Support conservation efforts in the area",
            ],
            WaterStatus::Average => &[
                "Regular monitoring recommended",
                "Check for upstream pollution sources",
                "Report to local pollution control board if conditions worsen",
            ],
            WaterStatus::Poor => &[
                "Urgent attention required",
                "Report to CPCB/SPC immediately",
                "Avoid direct contact with water",
                "Document pollution sources for authorities",
            ],
        }
    }
}

impl fmt::Display for WaterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaterStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(WaterStatus::Good),
            "average" => Ok(WaterStatus::Average),
            "poor" => Ok(WaterStatus::Poor),
            _ => Err(ValidationError::UnknownWaterStatus(s.to_string())),
        }
    }
}

/// Turbidity estimate, 0-100, higher is murkier.
pub fn turbidity_indicator(color_variance: f64) -> f64 {
    (color_variance / 50.0 * 100.0).min(100.0)
}

/// Foam and algae estimate, 0-100, higher is worse.
pub fn foam_algae_indicator(color_variance: f64) -> f64 {
    let mut score: f64 = 0.0;
    if color_variance > 60.0 {
        score += 40.0;
    }
    if color_variance > 40.0 {
        score += 30.0;
    }
    if color_variance > 25.0 {
        score += 15.0;
    }
    score.min(100.0)
}

/// Colour goodness, 0-100: penalises brown/grey casts, darkness and
/// green-dominant bright water.
pub fn water_color_score(profile: &ColorProfile) -> f64 {
    let [r, g, b] = profile.dominant_color.map(f64::from);
    let brown_ratio = (r + b) / (2.0 * g + 0.001);
    let mean_brightness = (r + g + b) / 3.0;
    let green_ratio = g / (r + g + b + 0.001);

    let mut score: f64 = 100.0;
    if brown_ratio > 1.2 {
        score -= 30.0;
    } else if brown_ratio > 1.0 {
        score -= 15.0;
    }
    if mean_brightness < 50.0 {
        score -= 20.0;
    }
    if green_ratio > 0.4 && mean_brightness > 100.0 {
        score -= 15.0;
    }
    score.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageScores {
    pub color: f64,
    pub turbidity: f64,
    pub foam_algae: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub composite: f64,
}

pub fn image_scores(profile: &ColorProfile) -> ImageScores {
    let color = water_color_score(profile);
    let turbidity = turbidity_indicator(profile.color_variance);
    let foam_algae = foam_algae_indicator(profile.color_variance);
    ImageScores {
        color,
        turbidity,
        foam_algae,
        composite: (color + (100.0 - turbidity) + (100.0 - foam_algae)) / 3.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationScores {
    #[serde(serialize_with = "serialize_round2")]
    pub dissolved_oxygen: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub biochemical_oxygen_demand: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub total_coliform: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub composite: f64,
}

pub fn station_scores(reading: &StationReading) -> Result<StationScores> {
    let dissolved_oxygen = non_negative("dissolvedOxygen", reading.dissolved_oxygen)?;
    let bod = non_negative("biochemicalOxygenDemand", reading.biochemical_oxygen_demand)?;
    let coliform = non_negative("totalColiform", reading.total_coliform)?;

    let do_score = (dissolved_oxygen / 10.0 * 100.0).min(100.0);
    let bod_score = (5.0 / bod.max(0.1) * 100.0).min(100.0);
    let coliform_score = (5000.0 / coliform.max(100.0) * 100.0).min(100.0);
    Ok(StationScores {
        dissolved_oxygen: do_score,
        biochemical_oxygen_demand: bod_score,
        total_coliform: coliform_score,
        composite: (do_score + bod_score + coliform_score) / 3.0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterQualityResult {
    pub water_status: WaterStatus,
    #[serde(serialize_with = "serialize_round2")]
    pub water_quality_score: f64,
    pub image: ImageScores,
    pub station: StationScores,
}

/// Equal-weight blend of the image and station composites.
pub fn analyze(profile: &ColorProfile, reading: &StationReading) -> Result<WaterQualityResult> {
    let image = image_scores(profile);
    let station = station_scores(reading)?;
    let score = (0.5 * image.composite + 0.5 * station.composite).clamp(0.0, 100.0);
    Ok(WaterQualityResult {
        water_status: WaterStatus::from_score(score),
        water_quality_score: score,
        image,
        station,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRef {
    pub name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndicators {
    pub dominant_color: [u8; 3],
    pub brightness: f64,
    pub turbidity: f64,
    pub foam_algae: f64,
    pub profile_source: ProfileSource,
}

/// Water analysis with everything an observer's report needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterQualityReport {
    pub location: Location,
    pub stretch_id: String,
    pub nearest_station: StationRef,
    pub station_reading: StationReading,
    pub indicators: ImageIndicators,
    #[serde(flatten)]
    pub result: WaterQualityResult,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Score a site against its nearest monitoring station.
///
/// `stretch_id` overrides the coordinate lookup when the caller already
/// knows which stretch the photo belongs to.
pub fn report(
    catalog: &Catalog,
    location: Location,
    stretch_id: Option<&str>,
    extracted: &ExtractedProfile,
) -> Result<WaterQualityReport> {
    let nearest = catalog
        .nearest_station(&location)
        .ok_or(ScoringError::NoStations)?;
    let reading = nearest.station.reading;
    let result = analyze(&extracted.profile, &reading)?;
    info!(
        "Water at ({:.4}, {:.4}) scored {:.2} ({}) against {}",
        location.lat,
        location.lon,
        result.water_quality_score,
        result.water_status,
        nearest.station.name
    );

    Ok(WaterQualityReport {
        location,
        stretch_id: stretch_id
            .map(str::to_string)
            .unwrap_or_else(|| stretch_for_location(&location).to_string()),
        nearest_station: StationRef {
            name: nearest.station.name.clone(),
            distance_km: nearest.distance_km,
        },
        station_reading: reading,
        indicators: ImageIndicators {
            dominant_color: extracted.profile.dominant_color,
            brightness: extracted.profile.brightness,
            turbidity: round2(result.image.turbidity),
            foam_algae: result.image.foam_algae,
            profile_source: extracted.source.clone(),
        },
        recommendations: result
            .water_status
            .recommendations()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        result,
        timestamp: Utc::now(),
    })
}
