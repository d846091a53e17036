//! Water status and the species expectation that follows from it.

use crate::error::Result;
use crate::image_stats::ExtractedProfile;
use crate::richness::{estimate, RichnessEstimate};
use crate::water_quality::{report, WaterQualityReport};
use rbw_catalog::catalog::Catalog;
use rbw_utils::location::Location;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullAnalysis {
    pub water_quality: WaterQualityReport,
    pub species: RichnessEstimate,
}

/// Score the water, then estimate richness for the same stretch under the
/// resulting status.
pub fn full_analysis(
    catalog: &Catalog,
    location: Location,
    stretch_id: Option<&str>,
    extracted: &ExtractedProfile,
) -> Result<FullAnalysis> {
    let water_quality = report(catalog, location, stretch_id, extracted)?;
    let species = estimate(catalog, &water_quality.stretch_id, water_quality.result.water_status);
    Ok(FullAnalysis {
        water_quality,
        species,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_stats::{extract_profile, tests::png_bytes};
    use image::{Rgb, RgbImage};

    #[test]
    fn test_richness_follows_water_status() {
        let catalog = Catalog::embedded().unwrap();
        let location = Location::new(26.4499, 80.3319).unwrap();
        let extracted = extract_profile(&png_bytes(RgbImage::from_pixel(16, 16, Rgb([150, 120, 90]))));
        let analysis = full_analysis(&catalog, location, Some("middle"), &extracted).unwrap();

        assert_eq!(analysis.water_quality.nearest_station.name, "Kanpur");
        assert_eq!(analysis.species.stretch_id, "middle");
        assert_eq!(analysis.species.water_status, analysis.water_quality.result.water_status);
        assert_eq!(
            analysis.species.likely.len() + analysis.species.moderate.len() + analysis.species.unlikely.len(),
            analysis.species.baseline_size
        );
    }
}
