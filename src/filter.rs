use serde_json::Value;

use crate::analysis::extract::value_to_string;

/// Scheme prefixes stripped by [`normalize_url`], checked in this order
const SCHEME_PREFIXES: [&str; 2] = ["https://", "http://"];

/// Host label stripped by [`normalize_url`] after the scheme
const WWW_PREFIX: &str = "www.";

/// Case-insensitive `starts_with` that never splits a multi-byte character
fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// Create the canonical comparison key for a URL.
///
/// Strips one leading `https://` (or, failing that, one `http://`) and then
/// one leading `www.`, all case-insensitively. The remainder is returned
/// untouched: no case folding, trailing-slash or query handling.
pub fn normalize_url(raw: &str) -> String {
    let mut rest = raw;

    for scheme in SCHEME_PREFIXES {
        if let Some(stripped) = strip_prefix_ignore_case(rest, scheme) {
            rest = stripped;
            break;
        }
    }

    if let Some(stripped) = strip_prefix_ignore_case(rest, WWW_PREFIX) {
        rest = stripped;
    }

    rest.to_string()
}

/// Derive the filter domain for a site from its `baseURL`
pub fn clean_domain(base_url: &str) -> String {
    normalize_url(base_url.trim()).to_lowercase()
}

/// Keeps values that mention a domain and normalizes the survivors.
///
/// Containment is a case-insensitive substring test, not anchored to a host
/// boundary: `a.com` also matches `xa.com`.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    domain: String,
    needle: String,
}

impl DomainFilter {
    /// Create a filter for the given domain
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            needle: domain.to_lowercase(),
        }
    }

    /// The domain this filter was created with
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Check whether a raw value mentions the domain
    pub fn matches(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }

    /// Filter and normalize, keeping input order and duplicates
    pub fn apply<S: AsRef<str>>(&self, values: &[S]) -> Vec<String> {
        values
            .iter()
            .map(AsRef::as_ref)
            .filter(|value| self.matches(value))
            .map(normalize_url)
            .collect()
    }

    /// Filter and normalize, then drop repeated normalized values
    pub fn apply_unique<S: AsRef<str>>(&self, values: &[S]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.apply(values)
            .into_iter()
            .filter(|value| seen.insert(value.clone()))
            .collect()
    }

    /// Filter extracted JSON values, coercing them to strings first.
    ///
    /// Object values never match.
    pub fn apply_values(&self, values: &[Value]) -> Vec<String> {
        let as_strings: Vec<String> = values.iter().filter_map(value_to_string).collect();
        self.apply(&as_strings)
    }
}

/// Retain values containing `domain` (case-insensitive) and normalize them
pub fn filter_by_domain<S: AsRef<str>>(values: &[S], domain: &str) -> Vec<String> {
    DomainFilter::new(domain).apply(values)
}
