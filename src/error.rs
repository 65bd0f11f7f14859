use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading, analysing or writing snapshot artifacts
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed input in {path}: {message}")]
    MalformedInput { path: String, message: String },

    #[error("Site {site_id} not found in {source_name} data")]
    SiteNotFoundInSource {
        source_name: String,
        site_id: String,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error for {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("Timeout after {timeout:?} fetching {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn site_not_found(source_name: impl Into<String>, site_id: impl Into<String>) -> Self {
        Error::SiteNotFoundInSource {
            source_name: source_name.into(),
            site_id: site_id.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
