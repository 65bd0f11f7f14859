//! Commands that download data from the REST API.

use std::path::Path;

use crate::batch::BatchSummary;
use crate::client::{self, JsonSource};
use crate::config::AppConfig;
use crate::error::Result;
use crate::jobs::{AHREFS_FILE, OPPORTUNITIES_DIR, SITES_FILE, read_sites};
use crate::manifest::{Manifest, ManifestEntry};
use crate::store;
use crate::utils::opportunities_file_name;

/// Resolve customer base URLs to sites and write the site list
pub async fn sites<S: JsonSource>(
    source: &S,
    config: &AppConfig,
    base_urls: &[String],
) -> Result<BatchSummary> {
    ::log::info!("Processing {} customer URLs", base_urls.len());

    let mut summary = BatchSummary::default();
    let mut sites = Vec::new();
    for (base_url, result) in base_urls.iter().zip(client::lookup_sites(source, base_urls).await) {
        if let Some(site) = summary.record(base_url.trim(), result) {
            sites.push(site);
        }
    }

    store::write_json(&config.output_dir.join(SITES_FILE), &sites)?;
    Ok(summary)
}

/// Fetch the Ahrefs top pages of every listed site
pub async fn ahrefs<S: JsonSource>(
    source: &S,
    config: &AppConfig,
    sites_path: &Path,
) -> Result<BatchSummary> {
    let sites = read_sites(sites_path)?;

    let mut summary = BatchSummary::default();
    let mut records = Vec::new();
    let fetched = client::ahrefs_top_pages(source, &sites, config.api.failure_policy).await;
    for (site, result) in sites.iter().zip(fetched) {
        if let Some(record) = summary.record(&site.base_url, result) {
            ::log::debug!("{}: {} top pages", site.base_url, record.top_pages.len());
            records.push(record);
        }
    }

    store::write_json(&config.output_dir.join(AHREFS_FILE), &records)?;
    Ok(summary)
}

/// Download every site's opportunities with their suggestions, one file per
/// site, and record the files in the directory manifest
pub async fn opportunities<S: JsonSource>(
    source: &S,
    config: &AppConfig,
    sites_path: &Path,
) -> Result<BatchSummary> {
    let sites = read_sites(sites_path)?;
    let dir = config.output_dir.join(OPPORTUNITIES_DIR);
    let mut manifest = Manifest::load(&dir)?;

    let mut summary = BatchSummary::default();
    for site in &sites {
        ::log::info!("Site: {}, ID: {}", site.base_url, site.id);
        let file_name = opportunities_file_name(&site.id);

        let fetched = client::site_opportunities(source, site, config.api.failure_policy).await;
        let result = fetched.and_then(|items| {
            store::write_json(&dir.join(&file_name), &items)?;
            Ok(items.len())
        });
        if let Some(count) = summary.record(&site.base_url, result) {
            ::log::debug!("{}: {} opportunities", site.base_url, count);
            manifest.insert(&file_name, ManifestEntry::for_site(site));
        }
    }

    if !manifest.is_empty() {
        manifest.save(&dir)?;
    }
    Ok(summary)
}
