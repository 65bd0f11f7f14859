use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::client::source::JsonSource;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// HTTP client for the analytics REST API
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a new client with the headers, token and timeout of `config`
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = config.base()?;
        let headers = default_headers(config)?;

        let timeout = match config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            timeout,
        })
    }

    /// Absolute URL of an endpoint path
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint path '{}': {}", path, e)))
    }
}

impl JsonSource for ApiClient {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        ::log::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.request_error(&url, e))
    }
}

impl ApiClient {
    fn request_error(&self, url: &Url, error: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if error.is_timeout() => Error::Timeout {
                url: url.to_string(),
                timeout,
            },
            _ => Error::Http(error),
        }
    }
}

/// Configured headers plus the bearer token
fn default_headers(config: &ApiConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
        headers.insert(name, value);
    }

    if let Some(token) = &config.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Config(format!("invalid token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
