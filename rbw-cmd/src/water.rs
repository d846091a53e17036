//! Water-quality and species-richness commands.

use crate::output::print_json;
use crate::SiteArgs;
use anyhow::Context;
use log::info;
use rbw_catalog::catalog::Catalog;
use rbw_scoring::analysis::full_analysis;
use rbw_scoring::image_stats::{extract_profile_offloaded, ExtractedProfile};
use rbw_scoring::richness::estimate;
use rbw_scoring::water_quality::{report, WaterStatus};

async fn load_profile(image: &str) -> anyhow::Result<ExtractedProfile> {
    let bytes = std::fs::read(image).with_context(|| format!("Failed to read image {}", image))?;
    info!("Read {} bytes from {}", bytes.len(), image);
    Ok(extract_profile_offloaded(bytes).await)
}

pub async fn run_water_status(
    image: &str,
    site: &SiteArgs,
    stretch: Option<&str>,
) -> anyhow::Result<()> {
    let location = site.location()?;
    let catalog = Catalog::embedded()?;
    let extracted = load_profile(image).await?;
    let report = report(&catalog, location, stretch, &extracted)?;
    print_json(&report)
}

pub fn run_species_estimate(stretch: &str, status: &str) -> anyhow::Result<()> {
    let status: WaterStatus = status.parse()?;
    let catalog = Catalog::embedded()?;
    print_json(&estimate(&catalog, stretch, status))
}

pub async fn run_full_analysis(
    image: &str,
    site: &SiteArgs,
    stretch: Option<&str>,
) -> anyhow::Result<()> {
    let location = site.location()?;
    let catalog = Catalog::embedded()?;
    let extracted = load_profile(image).await?;
    let analysis = full_analysis(&catalog, location, stretch, &extracted)?;
    info!(
        "{}: {} with {} of {} baseline species expected",
        analysis.species.stretch_id,
        analysis.water_quality.result.water_status,
        analysis.species.total_likely,
        analysis.species.baseline_size
    );
    print_json(&analysis)
}
