use serde_json::{Map, Value};

/// Key the statistics object is stored under
pub const STATS_KEY: &str = "stats";

/// Key holding the sum of all group counts
pub const TOTAL_KEY: &str = "totalUrls";

/// Per-group member counts plus their total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCounts {
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

impl GroupCounts {
    /// Count members of each group; non-list groups count 0.
    ///
    /// An existing `stats` entry is not a group and is left out.
    pub fn of(groups: &Map<String, Value>) -> Self {
        let mut result = GroupCounts::default();
        for (name, members) in groups {
            if name == STATS_KEY {
                continue;
            }
            let count = members.as_array().map_or(0, Vec::len);
            result.total += count;
            result.counts.push((name.clone(), count));
        }
        result
    }

    /// Render as the `stats` object, `totalUrls` first
    pub fn to_value(&self) -> Value {
        let mut stats = Map::new();
        stats.insert(TOTAL_KEY.to_string(), Value::from(self.total));
        for (name, count) in &self.counts {
            stats.insert(name.clone(), Value::from(*count));
        }
        Value::Object(stats)
    }
}

/// Prepend a `stats` object to a group mapping.
///
/// The result serializes with `stats` as its first key, followed by every
/// original group unchanged. Re-annotating replaces the previous `stats`.
pub fn annotate(groups: &Map<String, Value>) -> Map<String, Value> {
    let counts = GroupCounts::of(groups);

    let mut envelope = Map::new();
    envelope.insert(STATS_KEY.to_string(), counts.to_value());
    for (name, members) in groups {
        if name != STATS_KEY {
            envelope.insert(name.clone(), members.clone());
        }
    }
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_annotate_counts_groups() {
        let groups = object(json!({ "a": [1, 2], "b": [3] }));
        let annotated = annotate(&groups);
        assert_eq!(annotated["stats"], json!({ "a": 2, "b": 1, "totalUrls": 3 }));
    }

    #[test]
    fn test_stats_is_serialized_first() {
        let groups = object(json!({ "cwv": ["x"], "alt-text": [] }));
        let text = serde_json::to_string(&annotate(&groups)).unwrap();
        assert!(text.starts_with(r#"{"stats":{"totalUrls":1,"cwv":1,"alt-text":0}"#));
        assert!(text.ends_with(r#""cwv":["x"],"alt-text":[]}"#));
    }

    #[test]
    fn test_non_list_groups_count_zero() {
        let groups = object(json!({ "a": "oops", "b": null, "c": [1] }));
        let annotated = annotate(&groups);
        assert_eq!(annotated["stats"]["a"], json!(0));
        assert_eq!(annotated["stats"]["b"], json!(0));
        assert_eq!(annotated["stats"]["totalUrls"], json!(1));
        assert_eq!(annotated["a"], json!("oops"));
    }

    #[test]
    fn test_reannotating_replaces_stats() {
        let groups = object(json!({ "a": [1, 2] }));
        let once = annotate(&groups);
        let twice = annotate(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 2);
    }

    #[test]
    fn test_empty_groups() {
        let annotated = annotate(&Map::new());
        assert_eq!(Value::Object(annotated), json!({ "stats": { "totalUrls": 0 } }));
    }
}
