use serde_json::Value;
use std::future::Future;

use crate::error::Result;

/// Anything that can answer a GET for a JSON resource under the API base
pub trait JsonSource {
    /// Fetch and decode the resource at `path`, relative to the API base URL
    fn get_json(&self, path: &str) -> impl Future<Output = Result<Value>>;
}
