//! Conservation-status breakdown inside the river buffer.

use crate::output::print_json;
use anyhow::Context;
use log::info;
use rbw_catalog::catalog::Catalog;
use rbw_catalog::gbif::GbifClient;
use rbw_catalog::occurrence::OccurrenceRecord;
use rbw_scoring::buffer_zone::{analyze_buffer, BufferCache, BufferZone};
use rbw_scoring::config::ScoringConfig;

async fn fetch_records(zone: &BufferZone, config: &ScoringConfig) -> anyhow::Result<Vec<OccurrenceRecord>> {
    let bbox = zone
        .bounding_box()
        .context("Buffer polygon has no extent")?;
    let client = GbifClient::new(config.fetch_timeout)?;
    info!("Searching GBIF inside {}", bbox.to_wkt());
    client
        .occurrences_in_bbox(&bbox, config.bbox_limit)
        .await
        .context("GBIF bounding-box search failed")
}

pub async fn run_buffer(
    records: Option<&str>,
    major_species_only: bool,
    config: &ScoringConfig,
) -> anyhow::Result<()> {
    let catalog = Catalog::embedded()?;
    let cache = BufferCache::new(catalog.centerline().to_vec());
    let zone = cache.zone(config.radius_km)?;

    let records = match records {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read records file {}", path))?;
            OccurrenceRecord::parse_json_records(&json)
                .with_context(|| format!("Failed to parse records file {}", path))?
        }
        None => fetch_records(&zone, config).await?,
    };

    print_json(&analyze_buffer(&zone, &records, major_species_only))
}
