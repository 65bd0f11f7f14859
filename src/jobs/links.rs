//! Commands that pull domain links out of raw opportunity downloads.

use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::analysis::{self, links_by_type};
use crate::batch::BatchSummary;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::filter::DomainFilter;
use crate::jobs::{read_sites, require_dir};
use crate::manifest::{Manifest, ManifestEntry};
use crate::results::ExtractedLinksRecord;
use crate::store;
use crate::utils::{grouped_links_file_name, timestamp_slug};

/// An artifact of a directory paired with the site the manifest assigns it
struct Artifact {
    path: PathBuf,
    name: String,
    entry: Option<ManifestEntry>,
}

impl Artifact {
    /// Owning site id and filter domain, or why they are unknown
    fn site(&self) -> Result<(String, String)> {
        let entry = self.entry.as_ref().ok_or_else(|| {
            Error::malformed(self.name.as_str(), "file is not listed in the manifest")
        })?;
        let domain = entry.domain().ok_or_else(|| {
            Error::malformed(
                self.name.as_str(),
                format!("no domain known for site {}", entry.site_id),
            )
        })?;
        Ok((entry.site_id.clone(), domain))
    }
}

fn artifacts(dir: &Path) -> Result<Vec<Artifact>> {
    require_dir(dir)?;
    let manifest = Manifest::load(dir)?;
    let files = store::list_json_files(dir)?;
    ::log::info!("Found {} JSON files in {}", files.len(), dir.display());

    Ok(files
        .into_iter()
        .map(|path| {
            let name = store::file_name(&path);
            let entry = manifest.get(&name).cloned();
            Artifact { path, name, entry }
        })
        .collect())
}

/// Extract the domain links of every download in `dir` into one
/// consolidated, timestamped file.
///
/// A download that cannot be parsed still gets a record, carrying the error
/// and no links, and counts as failed.
pub fn extract_links(config: &AppConfig, dir: &Path) -> Result<(PathBuf, BatchSummary)> {
    let mut summary = BatchSummary::default();
    let mut records = Vec::new();

    for artifact in artifacts(dir)? {
        let (site_id, domain) = match artifact.site() {
            Ok(site) => site,
            Err(e) => {
                summary.record::<()>(&artifact.name, Err(e));
                continue;
            }
        };
        let file_path = artifact.path.display().to_string();

        match store::read_json::<Value>(&artifact.path) {
            Ok(document) => {
                let filter = DomainFilter::new(&domain);
                let extraction = analysis::extract_links(&document, &config.target_keys, &filter);
                ::log::info!(
                    "{}: {} of {} unique values match ({:.2}%)",
                    domain,
                    extraction.links.len(),
                    extraction.unique.len(),
                    extraction.match_percentage()
                );
                records.push(ExtractedLinksRecord::extracted(
                    &domain,
                    &site_id,
                    &file_path,
                    extraction.links,
                ));
                summary.record(&artifact.name, Ok(()));
            }
            Err(e) => {
                records.push(ExtractedLinksRecord::failed(
                    &domain,
                    &site_id,
                    &file_path,
                    &e.to_string(),
                ));
                summary.record::<()>(&artifact.name, Err(e));
            }
        }
    }

    let output = config.output_dir.join(format!(
        "extracted-links-consolidated_{}.json",
        timestamp_slug(Utc::now())
    ));
    store::write_json(&output, &records)?;
    Ok((output, summary))
}

/// Group each download in `dir` by opportunity type and write one
/// type → links file per site into `out_dir`, with its own manifest
pub fn group_links(config: &AppConfig, dir: &Path, out_dir: &Path) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut out_manifest = Manifest::load(out_dir)?;

    for artifact in artifacts(dir)? {
        let result = artifact.site().and_then(|(site_id, domain)| {
            let items = store::read_list(&artifact.path)?;
            let by_type = links_by_type(&items, &config.target_keys, &DomainFilter::new(&domain));

            let file_name = grouped_links_file_name(&domain, &site_id);
            store::write_json(&out_dir.join(&file_name), &by_type)?;
            Ok((file_name, by_type.len()))
        });

        if let Some((file_name, types)) = summary.record(&artifact.name, result) {
            ::log::debug!("{}: {} opportunity types", file_name, types);
            if let Some(entry) = artifact.entry {
                out_manifest.insert(&file_name, entry);
            }
        }
    }

    if !out_manifest.is_empty() {
        out_manifest.save(out_dir)?;
    }
    Ok(summary)
}

/// Write a manifest for a directory of downloads named after site ids
pub fn import_legacy(dir: &Path, sites_path: &Path) -> Result<BatchSummary> {
    require_dir(dir)?;
    let sites = if sites_path.exists() {
        read_sites(sites_path)?
    } else {
        ::log::warn!(
            "{} not found, entries will have no domain",
            sites_path.display()
        );
        Vec::new()
    };

    let manifest = Manifest::from_legacy_filenames(dir, &sites)?;
    manifest.save(dir)?;

    let mut summary = BatchSummary::default();
    for (name, entry) in &manifest.entries {
        let result = match entry.domain() {
            Some(_) => Ok(()),
            None => Err(Error::site_not_found("site list", entry.site_id.as_str())),
        };
        summary.record(name, result);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Site;
    use serde_json::json;
    use std::fs;

    fn setup() -> (tempfile::TempDir, AppConfig, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_dir: root.path().to_path_buf(),
            ..AppConfig::default()
        };
        let dir = root.path().join("opportunities");

        store::write_json(
            &dir.join("site_copportunities_s1.json"),
            &json!([
                { "type": "cwv", "suggestions": [{ "url": "https://www.a.com/slow" }] },
                {
                    "type": "sitemap",
                    "suggestions": [
                        { "pageUrl": "https://a.com/missing" },
                        { "pageUrl": "https://b.com/x" }
                    ]
                }
            ]),
        )
        .unwrap();
        fs::write(dir.join("site_copportunities_s2.json"), "{ broken").unwrap();

        let mut manifest = Manifest::default();
        manifest.insert(
            "site_copportunities_s1.json",
            ManifestEntry::for_site(&Site::new("s1", "https://a.com")),
        );
        manifest.insert(
            "site_copportunities_s2.json",
            ManifestEntry::for_site(&Site::new("s2", "https://b.com")),
        );
        manifest.save(&dir).unwrap();

        (root, config, dir)
    }

    #[test]
    fn test_extract_links_records_failures_inline() {
        let (_root, config, dir) = setup();
        let (output, summary) = extract_links(&config, &dir).unwrap();

        assert_eq!((summary.succeeded, summary.failed), (1, 1));
        let records: Vec<ExtractedLinksRecord> = store::read_json(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].extracted_links,
            Some(vec!["a.com/slow".to_string(), "a.com/missing".to_string()])
        );
        assert_eq!(records[1].site_id, "s2");
        assert!(records[1].extracted_links.is_none());
        assert!(records[1].error.is_some());
    }

    #[test]
    fn test_unlisted_file_fails_its_unit() {
        let (_root, config, dir) = setup();
        store::write_json(&dir.join("stray.json"), &json!([])).unwrap();

        let (_, summary) = extract_links(&config, &dir).unwrap();
        assert_eq!(summary.failed, 2);
        assert!(summary.errors.iter().any(|e| e.unit == "stray.json"));
    }

    #[test]
    fn test_group_links_writes_per_site_files() {
        let (root, config, dir) = setup();
        let out = root.path().join("opportunities-links");

        let summary = group_links(&config, &dir, &out).unwrap();
        assert_eq!((summary.succeeded, summary.failed), (1, 1));

        let grouped = store::read_object(&out.join("a.com_s1_opportunities.json")).unwrap();
        assert_eq!(
            serde_json::Value::Object(grouped),
            json!({ "cwv": ["a.com/slow"], "sitemap": ["a.com/missing"] })
        );
        let manifest = Manifest::load(&out).unwrap();
        assert_eq!(manifest.get("a.com_s1_opportunities.json").unwrap().site_id, "s1");
    }

    #[test]
    fn test_import_legacy_writes_manifest() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("legacy");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("site_copportunities_ab12.json"), "[]").unwrap();
        fs::write(dir.join("site_copportunities_cd34.json"), "[]").unwrap();
        let sites_path = root.path().join("sites.json");
        store::write_json(&sites_path, &vec![Site::new("ab12", "https://a.com")]).unwrap();

        let summary = import_legacy(&dir, &sites_path).unwrap();
        assert_eq!((summary.succeeded, summary.failed), (1, 1));
        assert_eq!(Manifest::load(&dir).unwrap().len(), 2);
    }
}
