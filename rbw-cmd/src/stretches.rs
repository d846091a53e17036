//! River stretch catalogue.

use crate::output::print_json;
use crate::SiteArgs;
use anyhow::anyhow;
use rbw_catalog::catalog::Catalog;
use rbw_catalog::stretch::{stretch_for_location, StretchInfo};

pub fn run_stretches(id: Option<&str>, site: &SiteArgs) -> anyhow::Result<()> {
    let catalog = Catalog::embedded()?;

    let id = match (id, site.lat.is_some() || site.lon.is_some()) {
        (Some(id), _) => Some(id),
        (None, true) => Some(stretch_for_location(&site.location()?)),
        (None, false) => None,
    };

    match id {
        Some(id) => {
            let stretch = catalog
                .stretch(id)
                .ok_or_else(|| anyhow!("Unknown river stretch: {}", id))?;
            print_json(&stretch.info())
        }
        None => {
            let all: Vec<StretchInfo> = catalog.stretches().iter().map(|s| s.info()).collect();
            print_json(&all)
        }
    }
}
