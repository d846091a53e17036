//! Command implementations for the RBW CLI.
//!
//! Each subcommand loads the embedded catalogue, runs one analyzer and prints
//! its result as JSON on stdout.

use clap::{Args, Subcommand};
use rbw_scoring::config::{
    ScoringConfig, DEFAULT_BBOX_LIMIT, DEFAULT_FETCH_TIMEOUT, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_RADIUS_KM,
};
use rbw_scoring::occurrence_risk::ProximityModel;
use rbw_utils::location::Location;
use std::time::Duration;

pub mod buffer;
pub mod classify;
pub mod output;
pub mod stretches;
pub mod water;

/// A site given on the command line. Both coordinates are required; they
/// are optional here so a missing one is reported as a validation error.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl SiteArgs {
    pub fn location(&self) -> anyhow::Result<Location> {
        Ok(Location::from_parts(self.lat, self.lon)?)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScoringArgs {
    /// Timeout for each upstream request, in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Historical counts only include records at least this many days old
    #[arg(
        long,
        default_value_t = DEFAULT_LOOKBACK_DAYS,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub lookback_days: i64,

    /// Search radius / buffer half-width in km
    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    pub radius_km: f64,

    /// Records requested per bounding-box search
    #[arg(long, default_value_t = DEFAULT_BBOX_LIMIT)]
    pub bbox_limit: u32,

    /// Fixed human-proximity value in [0, 1]
    #[arg(long, conflicts_with = "settlement_reach_km")]
    pub proximity: Option<f64>,

    /// Derive proximity from the distance to the nearest station town
    /// (1 at the town, 0 at this many km)
    #[arg(long)]
    pub settlement_reach_km: Option<f64>,
}

impl ScoringArgs {
    pub fn config(&self) -> ScoringConfig {
        let defaults = ScoringConfig::default();
        let proximity = match (self.proximity, self.settlement_reach_km) {
            (_, Some(reach_km)) => ProximityModel::NearestSettlement { reach_km },
            (Some(value), None) => ProximityModel::Fixed(value),
            (None, None) => defaults.proximity,
        };
        ScoringConfig {
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            lookback_days: self.lookback_days,
            radius_km: self.radius_km,
            bbox_limit: self.bbox_limit,
            proximity,
            ..defaults
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Score water quality from a photo and the nearest monitoring station
    WaterStatus {
        /// Path to the photo
        #[arg(short, long)]
        image: String,

        #[command(flatten)]
        site: SiteArgs,

        /// River stretch id (resolved from the coordinates when omitted)
        #[arg(short, long)]
        stretch: Option<String>,
    },

    /// Expected species for a stretch under a water status
    SpeciesEstimate {
        /// River stretch id
        #[arg(short, long)]
        stretch: String,

        /// Good, Average or Poor
        #[arg(short = 'w', long)]
        status: String,
    },

    /// Water status followed by the species estimate it implies
    FullAnalysis {
        /// Path to the photo
        #[arg(short, long)]
        image: String,

        #[command(flatten)]
        site: SiteArgs,

        /// River stretch id (resolved from the coordinates when omitted)
        #[arg(short, long)]
        stretch: Option<String>,
    },

    /// Occurrence-trend risk for one or more species around a site (queries GBIF)
    Classify {
        /// Scientific names to score
        #[arg(short = 'n', long = "species", required = true, num_args = 1..)]
        species: Vec<String>,

        #[command(flatten)]
        site: SiteArgs,

        /// Score as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        as_of: Option<String>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Conservation-status breakdown of occurrences inside the river buffer
    Buffer {
        /// JSON array of occurrence records; GBIF is queried when omitted
        #[arg(short, long)]
        records: Option<String>,

        /// Keep only watch-list species and large groups
        #[arg(long)]
        major_species_only: bool,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// List river stretches, or show the one containing a site
    Stretches {
        /// Show a single stretch
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        site: SiteArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::WaterStatus {
            image,
            site,
            stretch,
        } => water::run_water_status(&image, &site, stretch.as_deref()).await,
        Command::SpeciesEstimate { stretch, status } => {
            water::run_species_estimate(&stretch, &status)
        }
        Command::FullAnalysis {
            image,
            site,
            stretch,
        } => water::run_full_analysis(&image, &site, stretch.as_deref()).await,
        Command::Classify {
            species,
            site,
            as_of,
            scoring,
        } => classify::run_classify(&species, &site, as_of.as_deref(), &scoring.config()).await,
        Command::Buffer {
            records,
            major_species_only,
            scoring,
        } => buffer::run_buffer(records.as_deref(), major_species_only, &scoring.config()).await,
        Command::Stretches { id, site } => stretches::run_stretches(id.as_deref(), &site),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct ScoringCli {
        #[command(flatten)]
        scoring: ScoringArgs,
    }

    fn scoring_args() -> ScoringArgs {
        ScoringArgs {
            timeout_secs: 5,
            lookback_days: 30,
            radius_km: 40.0,
            bbox_limit: 50,
            proximity: None,
            settlement_reach_km: None,
        }
    }

    #[test]
    fn test_scoring_args_config() {
        let config = scoring_args().config();
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.bbox_limit, 50);
        assert_eq!(config.proximity, ProximityModel::default());
        assert_eq!(config.recent_limit, ScoringConfig::default().recent_limit);
    }

    #[test]
    fn test_scoring_flag_ranges() {
        let parsed = ScoringCli::try_parse_from(["rbw"]).unwrap();
        assert_eq!(parsed.scoring.timeout_secs, DEFAULT_FETCH_TIMEOUT.as_secs());
        assert_eq!(parsed.scoring.lookback_days, DEFAULT_LOOKBACK_DAYS);

        let parsed =
            ScoringCli::try_parse_from(["rbw", "--timeout-secs", "1", "--lookback-days", "0"])
                .unwrap();
        assert_eq!(parsed.scoring.timeout_secs, 1);
        assert_eq!(parsed.scoring.lookback_days, 0);

        assert!(ScoringCli::try_parse_from(["rbw", "--timeout-secs", "0"]).is_err());
        assert!(ScoringCli::try_parse_from(["rbw", "--lookback-days=-7"]).is_err());
    }

    #[test]
    fn test_proximity_flags() {
        let fixed = ScoringArgs {
            proximity: Some(0.2),
            ..scoring_args()
        };
        assert_eq!(fixed.config().proximity, ProximityModel::Fixed(0.2));

        let settlement = ScoringArgs {
            settlement_reach_km: Some(30.0),
            ..scoring_args()
        };
        assert_eq!(
            settlement.config().proximity,
            ProximityModel::NearestSettlement { reach_km: 30.0 }
        );
    }

    #[test]
    fn test_site_requires_both_coordinates() {
        let site = SiteArgs {
            lat: Some(25.3),
            lon: None,
        };
        let err = site.location().unwrap_err();
        assert_eq!(err.to_string(), "missing required field: lon");

        let site = SiteArgs {
            lat: Some(25.3),
            lon: Some(83.0),
        };
        assert!(site.location().is_ok());
    }
}
