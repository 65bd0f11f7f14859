use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

use crate::analysis::DEFAULT_TARGET_KEYS;
use crate::analysis::overlap::DEFAULT_TOP_N;
use crate::error::{Error, Result};

/// Environment variable that overrides the configured bearer token
pub const TOKEN_ENV_VAR: &str = "PAGE_OVERLAP_TOKEN";

/// What a batch fetch does with a request that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep an explicit per-item error entry
    #[default]
    RecordError,
    /// Treat the failed response as an empty list
    EmptyOnError,
}

/// Connection settings for the analytics REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent in the `Authorization` header
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Extra headers sent with every request
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// Per-request timeout in seconds (0 disables it)
    #[serde(default)]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Top-level configuration shared by every command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Directory artifacts are read from and written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Size of the "top N" universe overlap percentages are computed against
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Field names whose values are collected as links
    #[serde(default = "default_target_keys")]
    pub target_keys: Vec<String>,
}

/// Default value for base_url
fn default_base_url() -> String {
    "https://spacecat.experiencecloud.live/api/v1/".to_string()
}

/// Default value for headers
fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("accept".to_string(), "*/*".to_string()),
        (
            "x-client-type".to_string(),
            "sites-optimizer-backoffice".to_string(),
        ),
    ])
}

/// Default value for output_dir
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Default value for top_n
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Default value for target_keys
fn default_target_keys() -> Vec<String> {
    DEFAULT_TARGET_KEYS.iter().map(|key| key.to_string()).collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            headers: default_headers(),
            request_timeout_secs: 0,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Parsed base URL, with a trailing slash so relative paths append to it
    pub fn base(&self) -> Result<Url> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|e| Error::Config(format!("invalid base_url '{}': {}", base, e)))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output_dir: default_output_dir(),
            top_n: default_top_n(),
            target_keys: default_target_keys(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::io(path, e))?;

        serde_json::from_str(&contents)
            .map_err(|e| Error::malformed(path.display().to_string(), e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::malformed("<config>", e.to_string()))
    }

    /// Override the token with `PAGE_OVERLAP_TOKEN` when it is set and non-empty
    pub fn with_env_token(mut self) -> Self {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                self.api.token = Some(token.trim().to_string());
            }
        }
        self
    }

    /// Reject settings no command can work with
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be greater than zero".to_string()));
        }
        if self.target_keys.is_empty() {
            return Err(Error::Config("target_keys must not be empty".to_string()));
        }
        self.api.base()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.top_n, 200);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(
            config.target_keys,
            vec!["pageUrl", "urlFrom", "url", "url_from", "page"]
        );
        assert_eq!(config.api.failure_policy, FailurePolicy::RecordError);
        assert!(config.api.token.is_none());
        assert_eq!(config.api.headers["accept"], "*/*");
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = AppConfig::from_json(
            r#"{
                "top_n": 100,
                "api": {
                    "base_url": "http://localhost:8080/api",
                    "failure_policy": "empty-on-error"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.top_n, 100);
        assert_eq!(config.api.failure_policy, FailurePolicy::EmptyOnError);
        assert_eq!(
            config.api.base().unwrap().as_str(),
            "http://localhost:8080/api/"
        );
        assert!(config.api.headers.contains_key("x-client-type"));
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let config = AppConfig {
            top_n: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_is_never_serialized() {
        let mut config = AppConfig::default();
        config.api.token = Some("secret".to_string());
        let text = serde_json::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output_dir": "snapshots" }"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("snapshots"));
    }

    #[test]
    fn test_from_file_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(Error::MalformedInput { .. })
        ));
    }
}
