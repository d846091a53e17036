//! Which baseline species a stretch can be expected to hold under a water status.

use crate::round::round2;
use crate::water_quality::WaterStatus;
use rbw_catalog::catalog::Catalog;
use rbw_catalog::species::{BaselineSpecies, Tolerance};
use serde::Serialize;
use std::collections::HashMap;

/// Expected presence of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Likely,
    Moderate,
    Unlikely,
}

/// Presence of a species with `tolerance` in water of `status`.
pub fn suitability(tolerance: Tolerance, status: WaterStatus) -> Presence {
    use Presence::*;
    use Tolerance::{Clean, Moderate as Tolerant, Polluted};
    match (status, tolerance) {
        (WaterStatus::Good, Clean | Tolerant) => Likely,
        (WaterStatus::Good, Polluted) => Moderate,
        (WaterStatus::Average, Clean) => Moderate,
        (WaterStatus::Average, Tolerant | Polluted) => Likely,
        (WaterStatus::Poor, Clean) => Unlikely,
        (WaterStatus::Poor, Tolerant) => Moderate,
        (WaterStatus::Poor, Polluted) => Likely,
    }
}

/// Share of the baseline expected to persist, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PercentageRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RichnessProfile {
    pub percentage: PercentageRange,
    pub description: &'static str,
    pub ecosystem: &'static str,
}

pub fn richness_profile(status: WaterStatus) -> RichnessProfile {
    match status {
        WaterStatus::Good => RichnessProfile {
            percentage: PercentageRange { min: 70, max: 100 },
            description: "70-100% of baseline species likely present",
            ecosystem: "Healthy ecosystem with full species diversity",
        },
        WaterStatus::Average => RichnessProfile {
            percentage: PercentageRange { min: 40, max: 70 },
            description: "40-70% of baseline species likely present",
            ecosystem: "Stressed ecosystem, some sensitive species missing",
        },
        WaterStatus::Poor => RichnessProfile {
            percentage: PercentageRange { min: 10, max: 40 },
            description: "10-40% of baseline species likely present",
            ecosystem: "Degraded ecosystem, only pollution-tolerant species",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichnessEstimate {
    pub stretch_id: String,
    /// Baseline catalogue actually used; differs from `stretch_id` on fallback
    pub catalogue_id: String,
    pub water_status: WaterStatus,
    pub percentage: PercentageRange,
    pub description: &'static str,
    pub ecosystem: &'static str,
    pub baseline_size: usize,
    pub likely: Vec<BaselineSpecies>,
    pub moderate: Vec<BaselineSpecies>,
    pub unlikely: Vec<BaselineSpecies>,
    /// `likely` plus `moderate`
    pub total_likely: usize,
    pub diversity_index: f64,
}

/// Partition `baseline` by expected presence under `status`.
pub fn partition(
    baseline: &[BaselineSpecies],
    status: WaterStatus,
) -> (Vec<BaselineSpecies>, Vec<BaselineSpecies>, Vec<BaselineSpecies>) {
    let mut likely = Vec::new();
    let mut moderate = Vec::new();
    let mut unlikely = Vec::new();
    for species in baseline {
        match suitability(species.tolerance, status) {
            Presence::Likely => likely.push(species.clone()),
            Presence::Moderate => moderate.push(species.clone()),
            Presence::Unlikely => unlikely.push(species.clone()),
        }
    }
    (likely, moderate, unlikely)
}

/// Estimate richness for a stretch. Unknown stretch ids use the default
/// catalogue.
pub fn estimate(catalog: &Catalog, stretch_id: &str, status: WaterStatus) -> RichnessEstimate {
    let (catalogue_id, baseline) = catalog.baseline_species(stretch_id);
    let (likely, moderate, unlikely) = partition(baseline, status);
    let profile = richness_profile(status);
    let mut present: Vec<&BaselineSpecies> = likely.iter().collect();
    present.extend(moderate.iter());

    RichnessEstimate {
        stretch_id: stretch_id.to_string(),
        catalogue_id: catalogue_id.to_string(),
        water_status: status,
        percentage: profile.percentage,
        description: profile.description,
        ecosystem: profile.ecosystem,
        baseline_size: baseline.len(),
        total_likely: likely.len() + moderate.len(),
        diversity_index: diversity_index(present),
        likely,
        moderate,
        unlikely,
    }
}

/// Simpson's diversity over species categories, rounded to 2 decimals.
/// An empty list scores 0.
pub fn diversity_index<'a, I>(species: I) -> f64
where
    I: IntoIterator<Item = &'a BaselineSpecies>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for s in species {
        *counts.entry(s.category.as_str()).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let sum_squares: f64 = counts
        .values()
        .map(|&count| (count as f64 / total as f64).powi(2))
        .sum();
    round2(1.0 - sum_squares)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: [WaterStatus; 3] = [WaterStatus::Good, WaterStatus::Average, WaterStatus::Poor];

    fn species(name: &str, tolerance: Tolerance, category: &str) -> BaselineSpecies {
        BaselineSpecies {
            name: name.to_string(),
            scientific_name: format!("{} sp.", name),
            tolerance,
            category: category.to_string(),
            status: "Common".to_string(),
        }
    }

    #[test]
    fn test_suitability_table() {
        use Tolerance::*;
        assert_eq!(suitability(Clean, WaterStatus::Good), Presence::Likely);
        assert_eq!(suitability(Moderate, WaterStatus::Good), Presence::Likely);
        assert_eq!(suitability(Polluted, WaterStatus::Good), Presence::Moderate);
        assert_eq!(suitability(Clean, WaterStatus::Average), Presence::Moderate);
        assert_eq!(suitability(Moderate, WaterStatus::Average), Presence::Likely);
        assert_eq!(suitability(Polluted, WaterStatus::Average), Presence::Likely);
        assert_eq!(suitability(Clean, WaterStatus::Poor), Presence::Unlikely);
        assert_eq!(suitability(Moderate, WaterStatus::Poor), Presence::Moderate);
        assert_eq!(suitability(Polluted, WaterStatus::Poor), Presence::Likely);
    }

    #[test]
    fn test_partition_is_complete_for_every_catalogue() {
        let catalog = Catalog::embedded().unwrap();
        for (id, baseline) in catalog.tolerance_profiles() {
            for status in STATUSES {
                let estimate = estimate(&catalog, id, status);
                assert_eq!(estimate.catalogue_id, *id);
                let mut seen: Vec<&str> = estimate
                    .likely
                    .iter()
                    .chain(&estimate.moderate)
                    .chain(&estimate.unlikely)
                    .map(|s| s.scientific_name.as_str())
                    .collect();
                seen.sort_unstable();
                let mut expected: Vec<&str> =
                    baseline.iter().map(|s| s.scientific_name.as_str()).collect();
                expected.sort_unstable();
                assert_eq!(seen, expected, "{} under {}", id, status);
                assert_eq!(estimate.total_likely, estimate.likely.len() + estimate.moderate.len());
            }
        }
    }

    #[test]
    fn test_upper_counts() {
        let catalog = Catalog::embedded().unwrap();
        let good = estimate(&catalog, "upper", WaterStatus::Good);
        assert_eq!(good.baseline_size, 21);
        assert_eq!((good.likely.len(), good.moderate.len(), good.unlikely.len()), (18, 3, 0));

        let poor = estimate(&catalog, "upper", WaterStatus::Poor);
        assert_eq!((poor.likely.len(), poor.moderate.len(), poor.unlikely.len()), (3, 10, 8));
        assert_eq!(poor.percentage, PercentageRange { min: 10, max: 40 });
    }

    #[test]
    fn test_unknown_stretch_uses_default_catalogue() {
        let catalog = Catalog::embedded().unwrap();
        let estimate = estimate(&catalog, "atlantis", WaterStatus::Average);
        assert_eq!(estimate.stretch_id, "atlantis");
        assert_eq!(estimate.catalogue_id, "upper");
        assert_eq!(estimate.baseline_size, 21);
        assert_eq!(estimate.ecosystem, "Stressed ecosystem, some sensitive species missing");
    }

    #[test]
    fn test_estimate_json_keys() {
        let catalog = Catalog::embedded().unwrap();
        let json = serde_json::to_value(estimate(&catalog, "middle", WaterStatus::Good)).unwrap();
        assert_eq!(json["percentage"]["min"], 70);
        assert_eq!(json["percentage"]["max"], 100);
        assert!(json["totalLikely"].is_u64());
        assert!(json["likely"][0]["scientificName"].is_string());
        assert_eq!(json["waterStatus"], "Good");
    }

    #[test]
    fn test_diversity_empty_and_single_category() {
        assert!((diversity_index(&[]) - 0.0).abs() < f64::EPSILON);
        let fish: Vec<_> = (0..7)
            .map(|i| species(&format!("fish{}", i), Tolerance::Clean, "fish"))
            .collect();
        assert!((diversity_index(&fish) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diversity_approaches_one_minus_one_over_k() {
        let categories = ["fish", "bird", "mammal", "reptile", "plant"];
        for k in 1..=categories.len() {
            let list: Vec<_> = categories[..k]
                .iter()
                .flat_map(|c| (0..4).map(move |i| species(&format!("{}{}", c, i), Tolerance::Moderate, c)))
                .collect();
            let expected = round2(1.0 - 1.0 / k as f64);
            assert!((diversity_index(&list) - expected).abs() < f64::EPSILON, "k = {}", k);
        }
    }

    #[test]
    fn test_diversity_uneven() {
        let list = vec![
            species("a", Tolerance::Clean, "fish"),
            species("b", Tolerance::Clean, "fish"),
            species("c", Tolerance::Clean, "fish"),
            species("d", Tolerance::Clean, "bird"),
        ];
        // 1 - (0.75^2 + 0.25^2) = 0.375
        assert!((diversity_index(&list) - 0.38).abs() < f64::EPSILON);
    }
}
