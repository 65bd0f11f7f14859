//! Flat spreadsheet of per-site opportunity links, plus its summary.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::analysis::reshape::OpportunitiesByType;
use crate::csv;

/// Opportunity types in the order their rows are emitted, with display names
const KNOWN_TYPES: [(&str, &str, Priority); 7] = [
    ("broken-backlinks", "Broken Backlinks", Priority::High),
    ("broken-internal-links", "Broken Internal Links", Priority::High),
    ("cwv", "Core Web Vitals Issues", Priority::High),
    ("sitemap", "Missing from Sitemap", Priority::Medium),
    (
        "high-page-views-low-form-views",
        "High Page Views, Low Form Views",
        Priority::Medium,
    ),
    ("alt-text", "Missing Alt Text", Priority::Low),
    ("meta-tags", "Meta Tags Issues", Priority::Low),
];

/// Spreadsheet header row
pub const HEADERS: [&str; 5] = ["Site", "Opportunity Type", "Priority", "URL", "Full URL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority of an opportunity type; unknown types are Medium
    pub fn of(opportunity_type: &str) -> Self {
        KNOWN_TYPES
            .iter()
            .find(|(name, _, _)| *name == opportunity_type)
            .map_or(Priority::Medium, |(_, _, priority)| *priority)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable name of an opportunity type
pub fn display_name(opportunity_type: &str) -> &str {
    KNOWN_TYPES
        .iter()
        .find(|(name, _, _)| *name == opportunity_type)
        .map_or(opportunity_type, |(_, display, _)| *display)
}

/// One spreadsheet line: a URL flagged with one opportunity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRow {
    pub site: String,
    pub opportunity_type: String,
    pub priority: Priority,
    pub url: String,
    pub full_url: String,
}

impl SpreadsheetRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.site.clone(),
            self.opportunity_type.clone(),
            self.priority.to_string(),
            self.url.clone(),
            self.full_url.clone(),
        ]
    }
}

/// Rows for one site's grouped links.
///
/// Known types come first in their fixed order, followed by any other
/// types in document order.
pub fn rows_for_site(site: &str, by_type: &OpportunitiesByType) -> Vec<SpreadsheetRow> {
    let mut order: Vec<&str> = KNOWN_TYPES.iter().map(|(name, _, _)| *name).collect();
    order.extend(
        by_type
            .keys()
            .map(String::as_str)
            .filter(|name| KNOWN_TYPES.iter().all(|(known, _, _)| known != name)),
    );

    let mut rows = Vec::new();
    for opportunity_type in order {
        let Some(urls) = by_type.get(opportunity_type) else {
            continue;
        };
        for url in urls {
            let full_url = if url.starts_with("http") {
                url.clone()
            } else {
                format!("https://{}", url)
            };
            rows.push(SpreadsheetRow {
                site: site.to_string(),
                opportunity_type: display_name(opportunity_type).to_string(),
                priority: Priority::of(opportunity_type),
                url: url.clone(),
                full_url,
            });
        }
    }
    rows
}

/// Order rows by priority, then site; ties keep their input order
pub fn sort_rows(rows: &mut [SpreadsheetRow]) {
    rows.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.site.cmp(&b.site)));
}

/// Render rows as CSV with every cell quoted
pub fn rows_to_csv(rows: &[SpreadsheetRow]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(SpreadsheetRow::cells).collect();
    csv::quoted_table(&HEADERS, &cells)
}

/// Row counts by site, opportunity type and priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetSummary {
    pub total_urls: usize,
    pub by_site: IndexMap<String, usize>,
    pub by_opportunity_type: IndexMap<String, usize>,
    pub by_priority: IndexMap<String, usize>,
}

impl SpreadsheetSummary {
    /// Create a new summary of the given rows
    pub fn new(rows: &[SpreadsheetRow]) -> Self {
        let mut summary = Self {
            total_urls: rows.len(),
            ..Self::default()
        };
        for row in rows {
            *summary.by_site.entry(row.site.clone()).or_default() += 1;
            *summary
                .by_opportunity_type
                .entry(row.opportunity_type.clone())
                .or_default() += 1;
            *summary
                .by_priority
                .entry(row.priority.to_string())
                .or_default() += 1;
        }
        summary
    }
}
