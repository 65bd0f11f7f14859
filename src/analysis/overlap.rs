use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::results::{ExtractedLinksRecord, Site, TopPagesRecord};

/// Size of the "top N" universe the percentages are expressed against
pub const DEFAULT_TOP_N: usize = 200;

/// The three datasets that get cross-referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    Ahrefs,
    Rum,
    Opportunities,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Ahrefs => "ahrefs",
            SourceName::Rum => "rum",
            SourceName::Opportunities => "opportunities",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicate while keeping first-insertion order
fn ordered_set<S: AsRef<str>>(values: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| seen.insert(*value))
        .collect()
}

/// Members of `a` (deduplicated, in `a`'s order) that also appear in `b`
pub fn intersection<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T]) -> Vec<String> {
    let a: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: Vec<&str> = b.iter().map(AsRef::as_ref).collect();
    intersection_all(&[a.as_slice(), b.as_slice()])
}

/// N-way intersection; order follows the first collection
pub fn intersection_all(collections: &[&[&str]]) -> Vec<String> {
    let Some((first, rest)) = collections.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&str>> = rest
        .iter()
        .map(|values| values.iter().copied().collect())
        .collect();

    ordered_set(*first)
        .into_iter()
        .filter(|value| others.iter().all(|set| set.contains(value)))
        .map(str::to_string)
        .collect()
}

/// `round(count / denominator * 100, 2)`; a zero denominator yields 0
pub fn percentage(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let raw = count as f64 / denominator as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Pages shared between the sources for one site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapResult {
    /// In all three sources
    pub overlap_all: Vec<String>,

    /// In Ahrefs and opportunities, regardless of RUM
    pub overlap_ahrefs_opportunities: Vec<String>,

    /// In RUM and opportunities, regardless of Ahrefs
    pub overlap_rum_opportunities: Vec<String>,
}

impl OverlapResult {
    /// Summarise the overlap as counts and percentages of `top_n`
    pub fn stats(&self, site: &Site, top_n: usize) -> OverlapStats {
        let all = self.overlap_all.len();
        let ahrefs = self.overlap_ahrefs_opportunities.len();
        let rum = self.overlap_rum_opportunities.len();

        OverlapStats {
            site_id: site.id.clone(),
            site_base_url: site.base_url.clone(),
            overlap_all: all,
            overlap_all_percentage: percentage(all, top_n),
            overlap_ahrefs_opportunities: ahrefs,
            overlap_ahrefs_opportunities_percentage: percentage(ahrefs, top_n),
            overlap_rum_opportunities: rum,
            overlap_rum_opportunities_percentage: percentage(rum, top_n),
        }
    }
}

/// Cross-reference the three sources of one site
pub fn compute_overlap<A, R, O>(ahrefs: &[A], rum: &[R], opportunities: &[O]) -> OverlapResult
where
    A: AsRef<str>,
    R: AsRef<str>,
    O: AsRef<str>,
{
    let ahrefs: Vec<&str> = ahrefs.iter().map(AsRef::as_ref).collect();
    let rum: Vec<&str> = rum.iter().map(AsRef::as_ref).collect();
    let opportunities: Vec<&str> = opportunities.iter().map(AsRef::as_ref).collect();

    OverlapResult {
        overlap_all: intersection_all(&[
            ahrefs.as_slice(),
            rum.as_slice(),
            opportunities.as_slice(),
        ]),
        overlap_ahrefs_opportunities: intersection_all(&[
            ahrefs.as_slice(),
            opportunities.as_slice(),
        ]),
        overlap_rum_opportunities: intersection_all(&[rum.as_slice(), opportunities.as_slice()]),
    }
}

/// Flat per-site overlap summary written to `stats.json` and `stats.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapStats {
    #[serde(rename = "siteId")]
    pub site_id: String,

    #[serde(rename = "siteBaseURL")]
    pub site_base_url: String,

    #[serde(rename = "overlapAll")]
    pub overlap_all: usize,

    #[serde(rename = "overLapAllPercentage")]
    pub overlap_all_percentage: f64,

    #[serde(rename = "overlapAhrefsOpportunities")]
    pub overlap_ahrefs_opportunities: usize,

    #[serde(rename = "overlapAhrefsOpportunitiesPercentage")]
    pub overlap_ahrefs_opportunities_percentage: f64,

    #[serde(rename = "overlapRumOpportunities")]
    pub overlap_rum_opportunities: usize,

    #[serde(rename = "overlapRumOpportunitiesPercentage")]
    pub overlap_rum_opportunities_percentage: f64,
}

/// The three per-site datasets, joined on site id
#[derive(Debug, Clone, Default)]
pub struct SourceDatasets {
    pub ahrefs: Vec<TopPagesRecord>,
    pub rum: Vec<TopPagesRecord>,
    pub opportunities: Vec<ExtractedLinksRecord>,
}

impl SourceDatasets {
    fn top_pages<'a>(
        records: &'a [TopPagesRecord],
        source: SourceName,
        site_id: &str,
    ) -> Result<&'a [String]> {
        records
            .iter()
            .find(|record| record.site_id == site_id)
            .map(|record| record.top_pages.as_slice())
            .ok_or_else(|| Error::site_not_found(source.as_str(), site_id))
    }

    fn opportunity_links(&self, site_id: &str) -> Result<&[String]> {
        let record = self
            .opportunities
            .iter()
            .find(|record| record.site_id == site_id)
            .ok_or_else(|| Error::site_not_found(SourceName::Opportunities.as_str(), site_id))?;

        record.extracted_links.as_deref().ok_or_else(|| {
            Error::malformed(
                record.file_path.clone().unwrap_or_else(|| site_id.to_string()),
                record
                    .error
                    .clone()
                    .unwrap_or_else(|| "no extracted links".to_string()),
            )
        })
    }

    /// Overlap for one site; fails if any dataset lacks the site
    pub fn overlap_for_site(&self, site_id: &str) -> Result<OverlapResult> {
        let ahrefs = Self::top_pages(&self.ahrefs, SourceName::Ahrefs, site_id)?;
        let rum = Self::top_pages(&self.rum, SourceName::Rum, site_id)?;
        let opportunities = self.opportunity_links(site_id)?;

        Ok(compute_overlap(ahrefs, rum, opportunities))
    }

    /// Overlap summary for one site against a `top_n` universe
    pub fn stats_for_site(&self, site: &Site, top_n: usize) -> Result<OverlapStats> {
        let overlap = self.overlap_for_site(&site.id)?;
        ::log::debug!(
            "Site {} overlap: all={}, ahrefs={}, rum={}",
            site.id,
            overlap.overlap_all.len(),
            overlap.overlap_ahrefs_opportunities.len(),
            overlap.overlap_rum_opportunities.len()
        );
        Ok(overlap.stats(site, top_n))
    }
}
