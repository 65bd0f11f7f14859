//! Whole-dataset housekeeping for top-pages lists: merging two RUM
//! collections, finding customer sites RUM has no entry for, and counting
//! pages per site.

use indexmap::IndexMap;
use serde::Serialize;

use crate::filter::clean_domain;
use crate::results::{Site, TopPagesRecord};

/// Result of [`merge_rum`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged records, sorted by `siteBaseURL`
    pub merged: Vec<TopPagesRecord>,
    /// Fields filled in on records that already existed
    pub updated: usize,
    /// Records only the secondary list had
    pub added: usize,
}

impl MergeOutcome {
    /// Sites that still have no top pages after the merge
    pub fn without_pages(&self) -> Vec<&TopPagesRecord> {
        self.merged
            .iter()
            .filter(|record| record.top_pages.is_empty())
            .collect()
    }
}

/// Merge a secondary RUM list into a primary one, keyed by `siteBaseURL`.
///
/// A secondary record fills in an existing record's `topPages` or `siteId`
/// only where the existing one is empty; records unknown to the primary
/// list are added.
pub fn merge_rum(primary: Vec<TopPagesRecord>, secondary: Vec<TopPagesRecord>) -> MergeOutcome {
    let mut by_base_url: IndexMap<String, TopPagesRecord> = IndexMap::new();
    for record in primary {
        by_base_url.insert(record.site_base_url.clone(), record);
    }

    let mut updated = 0;
    let mut added = 0;
    for record in secondary {
        match by_base_url.get_mut(&record.site_base_url) {
            Some(existing) => {
                if !record.top_pages.is_empty() && existing.top_pages.is_empty() {
                    ::log::info!(
                        "Updating {}: adding {} top pages",
                        record.site_base_url,
                        record.top_pages.len()
                    );
                    existing.top_pages = record.top_pages;
                    updated += 1;
                }
                if !record.site_id.is_empty() && existing.site_id.is_empty() {
                    existing.site_id = record.site_id;
                    updated += 1;
                }
            }
            None => {
                ::log::debug!("Adding {}", record.site_base_url);
                by_base_url.insert(record.site_base_url.clone(), record);
                added += 1;
            }
        }
    }

    let mut merged: Vec<TopPagesRecord> = by_base_url.into_values().collect();
    merged.sort_by(|a, b| a.site_base_url.cmp(&b.site_base_url));

    MergeOutcome {
        merged,
        updated,
        added,
    }
}

/// Split customer sites into those missing from RUM data and those present.
///
/// Base URLs are compared by their cleaned domain, so `www.`-prefixed and
/// bare forms are the same site.
pub fn missing_sites(sites: &[Site], rum: &[TopPagesRecord]) -> (Vec<Site>, Vec<Site>) {
    let known: std::collections::HashSet<String> = rum
        .iter()
        .map(|record| clean_domain(&record.site_base_url))
        .collect();

    sites
        .iter()
        .cloned()
        .partition(|site| !known.contains(&clean_domain(&site.base_url)))
}

/// Mean rounded to two decimals; 0 for no items
fn average(total: usize, items: usize) -> f64 {
    if items == 0 {
        return 0.0;
    }
    (total as f64 / items as f64 * 100.0).round() / 100.0
}

/// Per-site line of a [`PageCountSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePageCount {
    pub site_number: usize,
    pub site_id: String,
    #[serde(rename = "siteBaseURL")]
    pub site_base_url: String,
    pub top_pages_count: usize,
}

/// Page counts across a top-pages dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCountSummary {
    pub total_sites: usize,
    pub total_pages: usize,
    pub average_pages_per_site: f64,
    pub min_pages: usize,
    pub max_pages: usize,
    pub sites_with_top_pages: usize,
    pub sites_without_top_pages: usize,
    pub site_details: Vec<SitePageCount>,
}

impl PageCountSummary {
    /// Create a new summary of a dataset; an empty dataset has all-zero figures
    pub fn new(records: &[TopPagesRecord]) -> Self {
        let counts: Vec<usize> = records.iter().map(|record| record.top_pages.len()).collect();
        let total_pages: usize = counts.iter().sum();
        let with_pages = counts.iter().filter(|count| **count > 0).count();

        Self {
            total_sites: records.len(),
            total_pages,
            average_pages_per_site: average(total_pages, records.len()),
            min_pages: counts.iter().copied().min().unwrap_or(0),
            max_pages: counts.iter().copied().max().unwrap_or(0),
            sites_with_top_pages: with_pages,
            sites_without_top_pages: records.len() - with_pages,
            site_details: records
                .iter()
                .enumerate()
                .map(|(index, record)| SitePageCount {
                    site_number: index + 1,
                    site_id: record.site_id.clone(),
                    site_base_url: record.site_base_url.trim().to_string(),
                    top_pages_count: record.top_pages.len(),
                })
                .collect(),
        }
    }
}
