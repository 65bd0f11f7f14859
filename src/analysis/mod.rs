pub mod extract;
pub mod overlap;
pub mod reshape;
pub mod stats;


use serde_json::Value;

use crate::filter::DomainFilter;
use extract::ExtractedValue;

/// Field names that hold page URLs in opportunity and suggestion payloads
pub const DEFAULT_TARGET_KEYS: [&str; 5] = ["pageUrl", "urlFrom", "url", "url_from", "page"];

/// Result of pulling one site's links out of a raw document
#[derive(Debug, Clone)]
pub struct LinkExtraction {
    /// Every target-key occurrence, before value-level dedup
    pub extracted: Vec<ExtractedValue>,
    /// Distinct values across all keys
    pub unique: Vec<Value>,
    /// Normalized values that mention the site's domain
    pub links: Vec<String>,
}

impl LinkExtraction {
    /// Share of distinct values that mention the domain, in percent
    pub fn match_percentage(&self) -> f64 {
        overlap::percentage(self.links.len(), self.unique.len())
    }
}

/// Extract, consolidate and domain-filter the links of one document
pub fn extract_links<S: AsRef<str>>(
    document: &Value,
    target_keys: &[S],
    filter: &DomainFilter,
) -> LinkExtraction {
    let extracted = extract::extract(document, target_keys);
    let unique = extract::unique_values(&extracted);
    let links = filter.apply_values(&unique);

    ::log::debug!(
        "Extracted {} occurrences, {} unique values, {} matching '{}'",
        extracted.len(),
        unique.len(),
        links.len(),
        filter.domain()
    );

    LinkExtraction {
        extracted,
        unique,
        links,
    }
}

/// Group items of an opportunity download by their `type` field.
///
/// Items without a string `type` land in the `"undefined"` group. Groups
/// keep first-seen order.
pub fn group_by_type(items: &[Value]) -> Vec<(String, Vec<Value>)> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for item in items {
        let kind = item
            .get("type")
            .and_then(Value::as_str)
            .filter(|kind| !kind.is_empty())
            .unwrap_or("undefined");

        match groups.iter_mut().find(|(name, _)| name == kind) {
            Some((_, members)) => members.push(item.clone()),
            None => groups.push((kind.to_string(), vec![item.clone()])),
        }
    }
    groups
}

/// Per-type domain links for one site's opportunity download
pub fn links_by_type<S: AsRef<str>>(
    items: &[Value],
    target_keys: &[S],
    filter: &DomainFilter,
) -> reshape::OpportunitiesByType {
    group_by_type(items)
        .into_iter()
        .map(|(kind, members)| {
            let extracted = extract::extract(&Value::Array(members), target_keys);
            let unique = extract::unique_values(&extracted);
            let as_strings: Vec<String> =
                unique.iter().filter_map(extract::value_to_string).collect();
            let links = filter.apply_unique(&as_strings);
            ::log::debug!("Type {}: {} links", kind, links.len());
            (kind, links)
        })
        .collect()
}
