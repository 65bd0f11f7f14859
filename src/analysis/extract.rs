use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Path prefix given to the top of every traversal
pub const ROOT_PATH: &str = "root";

/// One occurrence of a target field inside a JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    /// Field name that matched one of the target keys
    pub key: String,

    /// Value stored under the field (never null)
    pub value: Value,

    /// Diagnostic locator such as `root[0].suggestions[2].url`
    pub path: String,
}

/// All occurrences of a single key, in traversal order
#[derive(Debug, Clone)]
pub struct KeyGroup {
    pub key: String,
    pub occurrences: Vec<ExtractedValue>,
}

impl KeyGroup {
    /// Number of distinct values among the occurrences
    pub fn unique_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.occurrences
            .iter()
            .filter(|item| seen.insert(item.value.to_string()))
            .count()
    }
}

/// Collects every non-null value stored under one of `target_keys`.
///
/// Arrays are walked element by element and objects field by field. A
/// matching field is emitted and, when it holds an object or array, also
/// descended into. Records are deduplicated on `(key, value, path)` so the
/// same value reached through two paths yields two records.
///
/// The output order follows document order and is stable for a given input.
pub fn extract<S: AsRef<str>>(tree: &Value, target_keys: &[S]) -> Vec<ExtractedValue> {
    let keys: HashSet<&str> = target_keys.iter().map(AsRef::as_ref).collect();
    let mut walker = Walker {
        keys,
        seen: HashSet::new(),
        results: Vec::new(),
    };
    walker.visit(tree, ROOT_PATH.to_string());
    walker.results
}

struct Walker<'k> {
    keys: HashSet<&'k str>,
    seen: HashSet<(String, String, String)>,
    results: Vec<ExtractedValue>,
}

impl Walker<'_> {
    fn visit(&mut self, node: &Value, path: String) {
        match node {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(item, format!("{}[{}]", path, index));
                }
            }
            Value::Object(fields) => {
                for (key, value) in fields {
                    let field_path = format!("{}.{}", path, key);

                    if self.keys.contains(key.as_str()) && !value.is_null() {
                        self.record(key, value, &field_path);
                    }

                    if value.is_object() || value.is_array() {
                        self.visit(value, field_path);
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    fn record(&mut self, key: &str, value: &Value, path: &str) {
        let identity = (key.to_string(), value.to_string(), path.to_string());
        if self.seen.insert(identity) {
            self.results.push(ExtractedValue {
                key: key.to_string(),
                value: value.clone(),
                path: path.to_string(),
            });
        }
    }
}

/// Value-level dedup across all keys, first occurrence wins
pub fn unique_values(extracted: &[ExtractedValue]) -> Vec<Value> {
    let mut seen = HashSet::new();
    extracted
        .iter()
        .filter(|item| seen.insert(item.value.to_string()))
        .map(|item| item.value.clone())
        .collect()
}

/// Group occurrences by key in first-seen key order
pub fn group_by_key(extracted: &[ExtractedValue]) -> Vec<KeyGroup> {
    let mut groups: Vec<KeyGroup> = Vec::new();
    for item in extracted {
        match groups.iter_mut().find(|group| group.key == item.key) {
            Some(group) => group.occurrences.push(item.clone()),
            None => groups.push(KeyGroup {
                key: item.key.clone(),
                occurrences: vec![item.clone()],
            }),
        }
    }
    groups
}

/// Text of an extracted value as a link candidate.
///
/// Strings are kept verbatim, numbers and booleans use their JSON text and
/// arrays join their elements with `,`. Objects are not links and yield
/// `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => None,
        other => Some(element_text(other)),
    }
}

/// Text of a value nested in an array; objects collapse to a placeholder
/// that never looks like a URL
fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items.iter().map(element_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
