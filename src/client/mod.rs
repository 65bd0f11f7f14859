//! Access to the analytics REST API.
//!
//! [`JsonSource`] is the seam between the jobs and the network: the jobs
//! talk to any source, [`ApiClient`] is the HTTP one.

mod http;
mod source;

pub use http::ApiClient;
pub use source::JsonSource;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use serde_json::Value;

use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::filter::normalize_url;
use crate::results::{Site, TopPagesRecord};

/// Site lookup by registered base URL
pub fn site_by_base_url_path(base_url: &str) -> String {
    format!("sites/by-base-url/{}", STANDARD.encode(base_url))
}

/// Ahrefs global top pages of a site
pub fn ahrefs_top_pages_path(site_id: &str) -> String {
    format!("sites/{}/top-pages/ahrefs/global", site_id)
}

/// Opportunity list of a site
pub fn opportunities_path(site_id: &str) -> String {
    format!("sites/{}/opportunities/", site_id)
}

/// Suggestions attached to one opportunity
pub fn suggestions_path(site_id: &str, opportunity_id: &str) -> String {
    format!("sites/{}/opportunities/{}/suggestions/", site_id, opportunity_id)
}

/// Issue every request at once and wait for all of them, in input order
pub async fn fetch_all<S: JsonSource>(source: &S, paths: &[String]) -> Vec<Result<Value>> {
    join_all(paths.iter().map(|path| source.get_json(path))).await
}

/// Apply the failure policy to the response of a list endpoint
fn with_policy(result: Result<Value>, policy: FailurePolicy, path: &str) -> Result<Value> {
    match (result, policy) {
        (Err(e), FailurePolicy::EmptyOnError) => {
            ::log::warn!("Fetch of {} failed, using an empty list: {}", path, e);
            Ok(Value::Array(Vec::new()))
        }
        (result, _) => result,
    }
}

fn into_list(value: Value, path: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::malformed(
            path,
            format!("expected a list, got {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Resolve customer base URLs to sites, one result per input
pub async fn lookup_sites<S: JsonSource>(source: &S, base_urls: &[String]) -> Vec<Result<Site>> {
    let paths: Vec<String> = base_urls
        .iter()
        .map(|base_url| site_by_base_url_path(base_url.trim()))
        .collect();

    fetch_all(source, &paths)
        .await
        .into_iter()
        .zip(&paths)
        .map(|(response, path)| {
            let value = response?;
            serde_json::from_value::<Site>(value)
                .map_err(|e| Error::malformed(path.as_str(), e.to_string()))
        })
        .collect()
}

/// Ahrefs top pages of each site, normalized, one result per site
pub async fn ahrefs_top_pages<S: JsonSource>(
    source: &S,
    sites: &[Site],
    policy: FailurePolicy,
) -> Vec<Result<TopPagesRecord>> {
    let paths: Vec<String> = sites
        .iter()
        .map(|site| ahrefs_top_pages_path(&site.id))
        .collect();

    fetch_all(source, &paths)
        .await
        .into_iter()
        .zip(sites.iter().zip(&paths))
        .map(|(response, (site, path))| {
            let pages = into_list(with_policy(response, policy, path)?, path)?;
            let top_pages = pages
                .iter()
                .filter_map(|page| page.get("url").and_then(Value::as_str))
                .map(normalize_url)
                .collect();
            Ok(TopPagesRecord::new(&site.id, &site.base_url, top_pages))
        })
        .collect()
}

/// Opportunities of one site, each carrying its suggestions' `data` payloads
/// under `suggestions`
pub async fn site_opportunities<S: JsonSource>(
    source: &S,
    site: &Site,
    policy: FailurePolicy,
) -> Result<Vec<Value>> {
    let path = opportunities_path(&site.id);
    let response = with_policy(source.get_json(&path).await, policy, &path)?;
    let mut opportunities = into_list(response, &path)?;

    let ids: Vec<Option<String>> = opportunities
        .iter()
        .map(|opportunity| {
            opportunity
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect();
    let paths: Vec<String> = ids
        .iter()
        .flatten()
        .map(|id| suggestions_path(&site.id, id))
        .collect();
    let mut responses = fetch_all(source, &paths).await.into_iter().zip(&paths);

    for (opportunity, id) in opportunities.iter_mut().zip(&ids) {
        let Some(object) = opportunity.as_object_mut() else {
            continue;
        };
        let suggestions = match id {
            Some(_) => match responses.next() {
                Some((response, path)) => into_list(with_policy(response, policy, path)?, path)?
                    .into_iter()
                    .map(|mut suggestion| {
                        suggestion
                            .get_mut("data")
                            .map(Value::take)
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
                None => Vec::new(),
            },
            None => {
                ::log::warn!("Opportunity without id on site {}", site.id);
                Vec::new()
            }
        };
        object.insert("suggestions".to_string(), Value::Array(suggestions));
    }

    ::log::debug!(
        "Site {}: {} opportunities downloaded",
        site.id,
        opportunities.len()
    );
    Ok(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    /// Canned responses keyed by endpoint path; unknown paths answer 404
    struct Fixture {
        responses: HashMap<String, Value>,
    }

    impl Fixture {
        fn new(entries: Vec<(String, Value)>) -> Self {
            Self {
                responses: entries.into_iter().collect(),
            }
        }
    }

    impl JsonSource for Fixture {
        async fn get_json(&self, path: &str) -> Result<Value> {
            self.responses.get(path).cloned().ok_or_else(|| Error::Status {
                url: path.to_string(),
                status: 404,
            })
        }
    }

    #[test]
    fn test_site_lookup_path_is_base64() {
        assert_eq!(
            site_by_base_url_path("https://qualcomm.com"),
            "sites/by-base-url/aHR0cHM6Ly9xdWFsY29tbS5jb20="
        );
    }

    #[test]
    fn test_suggestions_path() {
        assert_eq!(
            suggestions_path("s1", "o1"),
            "sites/s1/opportunities/o1/suggestions/"
        );
    }

    #[tokio::test]
    async fn test_lookup_sites_keeps_input_order_and_failures() {
        let fixture = Fixture::new(vec![(
            site_by_base_url_path("https://b.com"),
            json!({ "id": "id-b", "baseURL": "https://b.com", "deliveryType": "aem_edge" }),
        )]);

        let sites = lookup_sites(
            &fixture,
            &["https://a.com".to_string(), " https://b.com ".to_string()],
        )
        .await;

        assert!(matches!(sites[0], Err(Error::Status { status: 404, .. })));
        assert_eq!(sites[1].as_ref().unwrap(), &Site::new("id-b", "https://b.com"));
    }

    #[tokio::test]
    async fn test_ahrefs_pages_are_normalized() {
        let fixture = Fixture::new(vec![(
            ahrefs_top_pages_path("s1"),
            json!([
                { "url": "https://www.a.com/x", "traffic": 10 },
                { "url": "http://a.com/y" },
                { "nourl": 1 }
            ]),
        )]);

        let records = ahrefs_top_pages(
            &fixture,
            &[Site::new("s1", "https://a.com")],
            FailurePolicy::RecordError,
        )
        .await;

        let record = records[0].as_ref().unwrap();
        assert_eq!(record.site_id, "s1");
        assert_eq!(record.top_pages, vec!["a.com/x", "a.com/y"]);
    }

    #[tokio::test]
    async fn test_failure_policy_for_list_endpoints() {
        let fixture = Fixture::new(vec![]);
        let sites = [Site::new("s1", "https://a.com")];

        let recorded = ahrefs_top_pages(&fixture, &sites, FailurePolicy::RecordError).await;
        assert!(recorded[0].is_err());

        let emptied = ahrefs_top_pages(&fixture, &sites, FailurePolicy::EmptyOnError).await;
        assert!(emptied[0].as_ref().unwrap().top_pages.is_empty());
    }

    #[tokio::test]
    async fn test_non_list_response_is_malformed() {
        let fixture = Fixture::new(vec![(ahrefs_top_pages_path("s1"), json!({ "error": "x" }))]);
        let records = ahrefs_top_pages(
            &fixture,
            &[Site::new("s1", "https://a.com")],
            FailurePolicy::EmptyOnError,
        )
        .await;
        assert!(matches!(records[0], Err(Error::MalformedInput { .. })));
    }

    #[tokio::test]
    async fn test_site_opportunities_attach_suggestion_data() {
        let fixture = Fixture::new(vec![
            (
                opportunities_path("s1"),
                json!([{ "id": "o1", "type": "cwv" }, { "id": "o2", "type": "sitemap" }]),
            ),
            (
                suggestions_path("s1", "o1"),
                json!([{ "id": "g1", "data": { "url": "https://a.com/p" } }]),
            ),
            (suggestions_path("s1", "o2"), json!([])),
        ]);

        let site = Site::new("s1", "https://a.com");
        let opportunities = site_opportunities(&fixture, &site, FailurePolicy::RecordError)
            .await
            .unwrap();

        assert_eq!(opportunities.len(), 2);
        assert_eq!(
            opportunities[0]["suggestions"],
            json!([{ "url": "https://a.com/p" }])
        );
        assert_eq!(opportunities[1]["suggestions"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_suggestions_fail_the_site_unless_emptied() {
        let fixture = Fixture::new(vec![(
            opportunities_path("s1"),
            json!([{ "id": "o1", "type": "cwv" }]),
        )]);
        let site = Site::new("s1", "https://a.com");

        assert!(
            site_opportunities(&fixture, &site, FailurePolicy::RecordError)
                .await
                .is_err()
        );
        let emptied = site_opportunities(&fixture, &site, FailurePolicy::EmptyOnError)
            .await
            .unwrap();
        assert_eq!(emptied[0]["suggestions"], json!([]));
    }
}
