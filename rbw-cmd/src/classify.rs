//! Occurrence-trend risk for species around a site.

use crate::output::print_json;
use crate::SiteArgs;
use anyhow::Context;
use chrono::Local;
use futures::future::join_all;
use log::info;
use rbw_catalog::catalog::Catalog;
use rbw_catalog::gbif::GbifClient;
use rbw_scoring::config::ScoringConfig;
use rbw_scoring::occurrence_risk::{classify_species, SpeciesClassification};
use rbw_utils::dates::parse_date;

/// Score every species concurrently against GBIF and print the results.
pub async fn run_classify(
    species: &[String],
    site: &SiteArgs,
    as_of: Option<&str>,
    config: &ScoringConfig,
) -> anyhow::Result<()> {
    let location = site.location()?;
    let today = match as_of {
        Some(date) => parse_date(date).with_context(|| format!("Invalid --as-of date: {}", date))?,
        None => Local::now().naive_local().date(),
    };
    let catalog = Catalog::embedded()?;
    let client = GbifClient::new(config.fetch_timeout).context("Failed to build GBIF client")?;

    info!(
        "Classifying {} species around ({}, {}) within {} km",
        species.len(),
        location.lat,
        location.lon,
        config.radius_km
    );

    let futures = species
        .iter()
        .map(|name| classify_species(&client, &catalog, config, name, location, today));
    let results: Vec<SpeciesClassification> = join_all(futures)
        .await
        .into_iter()
        .collect::<Result<_, _>>()?;

    let alerts = results.iter().filter(|r| r.alert.is_some()).count();
    info!("{} of {} species warrant an alert", alerts, results.len());

    if let [single] = results.as_slice() {
        print_json(single)
    } else {
        print_json(&results)
    }
}
