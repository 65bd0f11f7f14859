use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::analysis::extract::value_to_string;

/// Opportunity type → URLs flagged with it
pub type OpportunitiesByType = IndexMap<String, Vec<String>>;

/// URL → opportunity types, each type at most once per URL
pub type OpportunityMap = IndexMap<String, Vec<String>>;

/// Number of duplicate examples kept in a [`VerifyReport`]
pub const MAX_DUPLICATE_EXAMPLES: usize = 5;

/// Read an opportunity-by-type document.
///
/// Only array-valued entries are opportunity groups; anything else (such as
/// a `stats` preamble) is skipped. Non-string array items are coerced to
/// their string form and object items are dropped.
pub fn opportunities_from_value(document: &serde_json::Map<String, Value>) -> OpportunitiesByType {
    document
        .iter()
        .filter_map(|(name, urls)| match urls {
            Value::Array(items) => Some((
                name.clone(),
                items.iter().filter_map(value_to_string).collect::<Vec<_>>(),
            )),
            _ => {
                ::log::debug!("Skipping non-list entry '{}'", name);
                None
            }
        })
        .collect()
}

/// Invert an opportunity-centric mapping into a URL-centric one.
///
/// URLs appear in order of first sighting and each URL's types in order of
/// first insertion, without repeats.
pub fn reshape(by_type: &OpportunitiesByType) -> OpportunityMap {
    let mut by_url = OpportunityMap::new();

    for (opportunity, urls) in by_type {
        for url in urls {
            let types = by_url.entry(url.clone()).or_default();
            if !types.contains(opportunity) {
                types.push(opportunity.clone());
            }
        }
    }

    by_url
}

/// Figures reported for each reshaped file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReshapeSummary {
    pub total_urls: usize,
    pub total_opportunity_types: usize,
    pub urls_with_multiple_opportunities: usize,
}

impl ReshapeSummary {
    pub fn new(by_type: &OpportunitiesByType, by_url: &OpportunityMap) -> Self {
        Self {
            total_urls: by_url.len(),
            total_opportunity_types: by_type.len(),
            urls_with_multiple_opportunities: by_url
                .values()
                .filter(|types| types.len() > 1)
                .count(),
        }
    }
}

/// One URL whose type list contained repeats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateExample {
    pub url: String,
    pub duplicates: Vec<String>,
    pub original_count: usize,
    pub cleaned_count: usize,
}

/// Outcome of a duplicate-verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Same shape as the input, each type list deduplicated
    pub cleaned: OpportunityMap,
    pub urls_affected: usize,
    pub duplicates_removed: usize,
    /// At most [`MAX_DUPLICATE_EXAMPLES`] entries
    pub examples: Vec<DuplicateExample>,
}

impl VerifyReport {
    pub fn has_duplicates(&self) -> bool {
        self.duplicates_removed > 0
    }

    /// Write the cleaned type lists back into the document they were read
    /// from. Lists that lost no entries and non-list entries stay as they are.
    pub fn apply_to(&self, document: &mut serde_json::Map<String, Value>) {
        for (url, types) in &self.cleaned {
            let shrunk = document
                .get(url)
                .and_then(Value::as_array)
                .is_some_and(|items| items.len() != types.len());
            if shrunk {
                document.insert(url.clone(), Value::from(types.clone()));
            }
        }
    }
}

/// Values that occur more than once, listed once each in first-repeat order
fn find_duplicates(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for value in values {
        if !seen.insert(value.as_str()) && !repeated.contains(value) {
            repeated.push(value.clone());
        }
    }
    repeated
}

fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}

/// Remove repeated types per URL, keeping first occurrences.
///
/// Running it on its own `cleaned` output always reports nothing removed.
pub fn verify(map: &OpportunityMap) -> VerifyReport {
    let mut report = VerifyReport::default();

    for (url, types) in map {
        let cleaned = dedup_preserving_order(types);

        if cleaned.len() != types.len() {
            report.urls_affected += 1;
            report.duplicates_removed += types.len() - cleaned.len();

            if report.examples.len() < MAX_DUPLICATE_EXAMPLES {
                report.examples.push(DuplicateExample {
                    url: url.clone(),
                    duplicates: find_duplicates(types),
                    original_count: types.len(),
                    cleaned_count: cleaned.len(),
                });
            }
        }

        report.cleaned.insert(url.clone(), cleaned);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn by_type(entries: &[(&str, &[&str])]) -> OpportunitiesByType {
        entries
            .iter()
            .map(|(name, urls)| {
                (
                    name.to_string(),
                    urls.iter().map(|url| url.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_reshape_inverts_mapping() {
        let input = by_type(&[
            ("broken-backlinks", &["sunstar.com/p1", "sunstar.com/p2"]),
            ("cwv", &["sunstar.com/p1"]),
        ]);
        let output = reshape(&input);

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "sunstar.com/p1": ["broken-backlinks", "cwv"],
                "sunstar.com/p2": ["broken-backlinks"]
            })
        );
    }

    #[test]
    fn test_reshape_collapses_repeated_urls_within_a_type() {
        let input = by_type(&[("cwv", &["a", "a", "b"])]);
        let output = reshape(&input);
        assert_eq!(output["a"], vec!["cwv"]);
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let input = by_type(&[("x", &["a", "b"]), ("y", &["a"]), ("z", &[])]);
        let summary = ReshapeSummary::new(&input, &reshape(&input));
        assert_eq!(
            summary,
            ReshapeSummary {
                total_urls: 2,
                total_opportunity_types: 3,
                urls_with_multiple_opportunities: 1,
            }
        );
    }

    #[test]
    fn test_opportunities_from_value_skips_non_lists() {
        let document = json!({
            "stats": { "totalUrls": 1 },
            "cwv": ["a.com/1", 3],
        });
        let parsed = opportunities_from_value(document.as_object().unwrap());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["cwv"], vec!["a.com/1", "3"]);
    }

    #[test]
    fn test_verify_removes_duplicates_and_reports_them() {
        let mut map = OpportunityMap::new();
        map.insert(
            "a".into(),
            vec!["cwv".into(), "alt-text".into(), "cwv".into(), "cwv".into()],
        );
        map.insert("b".into(), vec!["cwv".into()]);

        let report = verify(&map);
        assert_eq!(report.cleaned["a"], vec!["cwv", "alt-text"]);
        assert_eq!(report.cleaned["b"], vec!["cwv"]);
        assert_eq!(report.urls_affected, 1);
        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(
            report.examples,
            vec![DuplicateExample {
                url: "a".into(),
                duplicates: vec!["cwv".into()],
                original_count: 4,
                cleaned_count: 2,
            }]
        );
    }

    #[test]
    fn test_verify_reaches_fixed_point() {
        let mut map = OpportunityMap::new();
        map.insert("a".into(), vec!["x".into(), "x".into()]);
        let first = verify(&map);
        assert!(first.has_duplicates());
        let second = verify(&first.cleaned);
        assert_eq!(second.duplicates_removed, 0);
        assert_eq!(second.urls_affected, 0);
        assert_eq!(second.cleaned, first.cleaned);
    }

    #[test]
    fn test_apply_keeps_non_list_entries_in_place() {
        let mut document = json!({
            "stats": { "totalUrls": 1 },
            "a.com/x": ["cwv", "cwv"],
            "a.com/y": ["sitemap"]
        })
        .as_object()
        .cloned()
        .unwrap();

        let report = verify(&opportunities_from_value(&document));
        report.apply_to(&mut document);

        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys, vec!["stats", "a.com/x", "a.com/y"]);
        assert_eq!(document["stats"], json!({ "totalUrls": 1 }));
        assert_eq!(document["a.com/x"], json!(["cwv"]));
    }

    #[test]
    fn test_verify_caps_examples() {
        let map: OpportunityMap = (0..8)
            .map(|i| (format!("u{}", i), vec!["t".to_string(), "t".to_string()]))
            .collect();
        let report = verify(&map);
        assert_eq!(report.urls_affected, 8);
        assert_eq!(report.examples.len(), MAX_DUPLICATE_EXAMPLES);
    }
}
