//! Sidecar `manifest.json` recording which site each artifact belongs to.
//!
//! Artifact directories carry one manifest, so jobs look site ids and
//! domains up by file name instead of parsing them out of it.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::filter::clean_domain;
use crate::results::Site;
use crate::store;

/// File name of the manifest inside an artifact directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// File names produced by the opportunity download before manifests existed
const LEGACY_OPPORTUNITY_FILE: &str = r"^site_copportunities_([a-f0-9-]+)\.json$";

/// The site an artifact belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "siteId")]
    pub site_id: String,

    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl ManifestEntry {
    /// Create a new entry for a known site
    pub fn for_site(site: &Site) -> Self {
        Self {
            site_id: site.id.clone(),
            base_url: Some(site.base_url.clone()),
            domain: Some(clean_domain(&site.base_url)),
        }
    }

    /// Domain of the site, derived from the base URL when not stored
    pub fn domain(&self) -> Option<String> {
        self.domain
            .clone()
            .filter(|domain| !domain.is_empty())
            .or_else(|| self.base_url.as_deref().map(clean_domain))
    }
}

/// Artifact file name → owning site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub entries: IndexMap<String, ManifestEntry>,
}

impl Manifest {
    /// Load the manifest of `dir`; a directory without one has an empty manifest
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            ::log::debug!("No manifest in {}", dir.display());
            return Ok(Self::default());
        }
        store::read_json(&path)
    }

    /// Write the manifest into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        store::write_json(&dir.join(MANIFEST_FILE), self)
    }

    /// Record (or replace) the owner of `file_name`
    pub fn insert(&mut self, file_name: &str, entry: ManifestEntry) {
        self.entries.insert(file_name.to_string(), entry);
    }

    pub fn get(&self, file_name: &str) -> Option<&ManifestEntry> {
        self.entries.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a manifest for a directory of legacy opportunity downloads.
    ///
    /// Only `site_copportunities_<hex-uuid>.json` names are recognised. Base
    /// URLs come from `sites` when the id is listed there.
    pub fn from_legacy_filenames(dir: &Path, sites: &[Site]) -> Result<Self> {
        let pattern = Regex::new(LEGACY_OPPORTUNITY_FILE)
            .map_err(|e| Error::Config(format!("invalid legacy file pattern: {}", e)))?;

        let mut manifest = Self::default();
        for path in store::list_json_files(dir)? {
            let name = store::file_name(&path);
            let Some(site_id) = pattern.captures(&name).map(|caps| caps[1].to_string()) else {
                ::log::debug!("Skipping {}: not a legacy opportunity file", name);
                continue;
            };

            let entry = match sites.iter().find(|site| site.id == site_id) {
                Some(site) => ManifestEntry::for_site(site),
                None => {
                    ::log::warn!("Site {} from {} is not in the site list", site_id, name);
                    ManifestEntry {
                        site_id,
                        base_url: None,
                        domain: None,
                    }
                }
            };
            manifest.insert(&name, entry);
        }
        Ok(manifest)
    }
}
