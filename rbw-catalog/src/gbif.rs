/// GBIF occurrence search client
use crate::{
    error::Result,
    occurrence::{BoundingBox, OccurrencePage, OccurrenceQuery, OccurrenceRecord, OccurrenceSource},
};
use chrono::NaiveDate;
use log::{debug, info};
use rbw_utils::dates::format_date;
use reqwest::Client;
use std::time::Duration;

/// Public GBIF occurrence search endpoint
pub const GBIF_OCCURRENCE_URL: &str = "https://api.gbif.org/v1/occurrence/search";

/// Thin client over the GBIF occurrence search API.
///
/// Every request is bounded by the timeout given at construction.
#[derive(Debug, Clone)]
pub struct GbifClient {
    client: Client,
    base_url: String,
}

impl GbifClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(GBIF_OCCURRENCE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(GbifClient {
            client,
            base_url: base_url.to_string(),
        })
    }

    async fn search(&self, params: &[(&str, String)]) -> Result<OccurrencePage> {
        debug!("GBIF search {} {:?}", self.base_url, params);
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<OccurrencePage>().await?)
    }

    /// Observed occurrences whose coordinates fall inside `bbox`.
    pub async fn occurrences_in_bbox(
        &self,
        bbox: &BoundingBox,
        limit: u32,
    ) -> Result<Vec<OccurrenceRecord>> {
        let params = [
            ("geometry", bbox.to_wkt()),
            ("limit", limit.to_string()),
            ("hasCoordinate", "true".to_string()),
            ("basisOfRecord", "HUMAN_OBSERVATION".to_string()),
        ];
        let page = self.search(&params).await?;
        info!("GBIF returned {} records inside {:?}", page.results.len(), bbox);
        Ok(page.results)
    }
}

fn species_params(query: &OccurrenceQuery, limit: u32) -> Vec<(&'static str, String)> {
    vec![
        ("scientificName", query.species.clone()),
        (
            "geoDistance",
            format!(
                "{},{},{}km",
                query.location.lat, query.location.lon, query.radius_km
            ),
        ),
        ("limit", limit.to_string()),
    ]
}

impl OccurrenceSource for GbifClient {
    async fn recent_count(&self, query: &OccurrenceQuery) -> Result<u32> {
        let params = species_params(query, query.recent_limit);
        let page = self.search(&params).await?;
        Ok(page.results.len() as u32)
    }

    async fn historical_count(&self, query: &OccurrenceQuery, cutoff: NaiveDate) -> Result<u32> {
        let mut params = species_params(query, query.historical_limit);
        params.push(("eventDate", format!("*,{}", format_date(&cutoff))));
        let page = self.search(&params).await?;
        Ok(page.results.len() as u32)
    }
}
