use serde::{Deserialize, Deserializer, Serialize};

/// One customer property as returned by the site lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Opaque site identifier, the join key across datasets
    pub id: String,

    /// Base URL the site was registered with
    #[serde(rename = "baseURL")]
    pub base_url: String,
}

impl Site {
    /// Create a new site
    pub fn new(id: &str, base_url: &str) -> Self {
        Self {
            id: id.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

/// Top pages of one site according to a single source (Ahrefs or RUM)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPagesRecord {
    #[serde(rename = "siteBaseURL")]
    pub site_base_url: String,

    /// Empty when the site could not be matched to an id
    #[serde(rename = "siteId", default, deserialize_with = "null_as_default")]
    pub site_id: String,

    /// Empty when the source had no pages (`null` in some collections)
    #[serde(rename = "topPages", default, deserialize_with = "null_as_default")]
    pub top_pages: Vec<String>,
}

/// Read an explicit `null` as the field's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TopPagesRecord {
    /// Create a new top pages record
    pub fn new(site_id: &str, site_base_url: &str, top_pages: Vec<String>) -> Self {
        Self {
            site_base_url: site_base_url.to_string(),
            site_id: site_id.to_string(),
            top_pages,
        }
    }
}

/// Opportunity links extracted from one site's opportunity download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLinksRecord {
    pub domain: String,

    #[serde(rename = "siteId")]
    pub site_id: String,

    /// Artifact the links were extracted from
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Set only on failed extractions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Set only on failed extractions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// `None` when extraction failed
    #[serde(rename = "extractedLinks", default)]
    pub extracted_links: Option<Vec<String>>,
}

impl ExtractedLinksRecord {
    /// Record for a successful extraction
    pub fn extracted(domain: &str, site_id: &str, file_path: &str, links: Vec<String>) -> Self {
        Self {
            domain: domain.to_string(),
            site_id: site_id.to_string(),
            file_path: Some(file_path.to_string()),
            timestamp: None,
            error: None,
            extracted_links: Some(links),
        }
    }

    /// Record for a file that could not be read or parsed
    pub fn failed(domain: &str, site_id: &str, file_path: &str, error: &str) -> Self {
        Self {
            domain: domain.to_string(),
            site_id: site_id.to_string(),
            file_path: Some(file_path.to_string()),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            error: Some(error.to_string()),
            extracted_links: None,
        }
    }
}
