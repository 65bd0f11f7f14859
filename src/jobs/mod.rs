//! One function per command, wiring the analysis core to the store, the
//! API client and the batch runner.
//!
//! Every job returns the [`BatchSummary`](crate::batch::BatchSummary) of the
//! units it processed. An `Err` means the job could not start at all.

pub mod collect;
pub mod links;
pub mod opportunities;
pub mod overlap;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::results::Site;
use crate::store;

/// Customer sites resolved by the site lookup
pub const SITES_FILE: &str = "customer-sites-ids.json";
/// Ahrefs top pages of every customer site
pub const AHREFS_FILE: &str = "ahrefs-top-200-pages.json";
/// RUM top pages of every customer site
pub const RUM_FILE: &str = "rum-top-200-pages.json";
/// Opportunity links of every customer site
pub const OPPORTUNITY_LINKS_FILE: &str = "all-opportunities-top-pages.json";
/// Raw per-site opportunity downloads
pub const OPPORTUNITIES_DIR: &str = "opportunities";
/// Per-site opportunity type → URLs files
pub const GROUPED_LINKS_DIR: &str = "opportunities-links";
/// Per-site URL → opportunity types files
pub const RESHAPED_DIR: &str = "links-opportunities";

pub const STATS_JSON_FILE: &str = "stats.json";
pub const STATS_CSV_FILE: &str = "stats.csv";
pub const RUM_FINAL_FILE: &str = "rum-data-list-final.json";
pub const MISSING_SITES_FILE: &str = "missing-sites-from-rum.json";
pub const PAGE_COUNT_FILE: &str = "top-pages-count-summary.json";
pub const SPREADSHEET_FILE: &str = "opportunities-spreadsheet.csv";
pub const SPREADSHEET_SUMMARY_FILE: &str = "opportunities-summary.json";

/// `given` if set, else `default_name` inside `output_dir`
pub fn resolve(output_dir: &Path, given: Option<&Path>, default_name: &str) -> PathBuf {
    given
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_dir.join(default_name))
}

/// Read the customer site list
pub fn read_sites(path: &Path) -> Result<Vec<Site>> {
    let sites: Vec<Site> = store::read_json(path)?;
    ::log::info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Fail early when an input directory is missing
fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
        ))
    }
}
