//! Commands over the per-site top-pages datasets.

use std::path::{Path, PathBuf};

use crate::analysis::overlap::SourceDatasets;
use crate::batch::BatchSummary;
use crate::csv::to_csv;
use crate::datasets::{PageCountSummary, merge_rum, missing_sites};
use crate::error::{Error, Result};
use crate::filter::normalize_url;
use crate::jobs::{
    MISSING_SITES_FILE, PAGE_COUNT_FILE, RUM_FINAL_FILE, STATS_CSV_FILE, STATS_JSON_FILE,
    read_sites,
};
use crate::results::{ExtractedLinksRecord, TopPagesRecord};
use crate::store;

/// Input files of the overlap command
#[derive(Debug, Clone)]
pub struct OverlapInputs {
    pub ahrefs: PathBuf,
    pub rum: PathBuf,
    pub opportunities: PathBuf,
    pub sites: PathBuf,
}

/// Read a top-pages dataset with its pages normalized
fn read_top_pages(path: &Path) -> Result<Vec<TopPagesRecord>> {
    let mut records: Vec<TopPagesRecord> = store::read_json(path)?;
    for record in &mut records {
        record.top_pages = record.top_pages.iter().map(|page| normalize_url(page)).collect();
    }
    Ok(records)
}

/// Overlap statistics for every customer site, as `stats.json` and
/// `stats.csv` in `output_dir`
pub fn overlap(inputs: &OverlapInputs, top_n: usize, output_dir: &Path) -> Result<BatchSummary> {
    let sites = read_sites(&inputs.sites)?;
    let datasets = SourceDatasets {
        ahrefs: read_top_pages(&inputs.ahrefs)?,
        rum: read_top_pages(&inputs.rum)?,
        opportunities: store::read_json::<Vec<ExtractedLinksRecord>>(&inputs.opportunities)?,
    };

    let mut summary = BatchSummary::default();
    let mut rows = Vec::new();
    for site in &sites {
        if let Some(stats) = summary.record(&site.base_url, datasets.stats_for_site(site, top_n)) {
            println!(
                "{}: all {} ({}%), ahrefs {} ({}%), rum {} ({}%)",
                stats.site_base_url,
                stats.overlap_all,
                stats.overlap_all_percentage,
                stats.overlap_ahrefs_opportunities,
                stats.overlap_ahrefs_opportunities_percentage,
                stats.overlap_rum_opportunities,
                stats.overlap_rum_opportunities_percentage
            );
            rows.push(stats);
        }
    }

    store::write_json(&output_dir.join(STATS_JSON_FILE), &rows)?;
    let values = serde_json::to_value(&rows)
        .map_err(|e| Error::malformed(STATS_CSV_FILE, e.to_string()))?;
    let records = values.as_array().cloned().unwrap_or_default();
    store::write_text(&output_dir.join(STATS_CSV_FILE), &to_csv(&records))?;
    Ok(summary)
}

/// Merge two RUM lists into `rum-data-list-final.json`
pub fn merge_rum_files(
    primary: &Path,
    secondary: &Path,
    output_dir: &Path,
) -> Result<BatchSummary> {
    let outcome = merge_rum(store::read_json(primary)?, store::read_json(secondary)?);
    store::write_json(&output_dir.join(RUM_FINAL_FILE), &outcome.merged)?;

    println!(
        "Merged {} sites: {} fields updated, {} sites added",
        outcome.merged.len(),
        outcome.updated,
        outcome.added
    );
    let empty = outcome.without_pages();
    for record in &empty {
        ::log::warn!("{} has no top pages", record.site_base_url);
    }

    let mut summary = BatchSummary::default();
    summary.record(RUM_FINAL_FILE, Ok(()));
    Ok(summary)
}

/// Write the customer sites RUM has no entry for
pub fn find_missing_sites(
    sites_path: &Path,
    rum_path: &Path,
    output_dir: &Path,
) -> Result<BatchSummary> {
    let sites = read_sites(sites_path)?;
    let rum: Vec<TopPagesRecord> = store::read_json(rum_path)?;

    let (missing, found) = missing_sites(&sites, &rum);
    println!("{} sites found in RUM data, {} missing", found.len(), missing.len());
    for site in &missing {
        println!("  {} ({})", site.base_url, site.id);
    }
    store::write_json(&output_dir.join(MISSING_SITES_FILE), &missing)?;

    let mut summary = BatchSummary::default();
    summary.record(MISSING_SITES_FILE, Ok(()));
    Ok(summary)
}

/// Count the top pages of every site of a dataset
pub fn count_pages(path: &Path, output_dir: &Path) -> Result<BatchSummary> {
    let records: Vec<TopPagesRecord> = store::read_json(path)?;
    let counts = PageCountSummary::new(&records);

    println!("Total sites: {}", counts.total_sites);
    println!("Total pages: {}", counts.total_pages);
    println!("Average pages per site: {:.2}", counts.average_pages_per_site);
    println!("Minimum pages: {}", counts.min_pages);
    println!("Maximum pages: {}", counts.max_pages);
    store::write_json(&output_dir.join(PAGE_COUNT_FILE), &counts)?;

    let mut summary = BatchSummary::default();
    summary.record(PAGE_COUNT_FILE, Ok(()));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Site;
    use serde_json::{Value, json};
    use std::fs;

    fn write(dir: &Path, name: &str, value: Value) -> PathBuf {
        let path = dir.join(name);
        store::write_json(&path, &value).unwrap();
        path
    }

    #[test]
    fn test_overlap_writes_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let inputs = OverlapInputs {
            sites: write(root, "sites.json", json!([
                { "id": "s1", "baseURL": "https://a.com" },
                { "id": "s2", "baseURL": "https://b.com" }
            ])),
            ahrefs: write(root, "ahrefs.json", json!([
                {
                    "siteBaseURL": "https://a.com",
                    "siteId": "s1",
                    "topPages": ["https://www.a.com/1", "a.com/2"]
                },
                { "siteBaseURL": "https://b.com", "siteId": "s2", "topPages": [] }
            ])),
            rum: write(root, "rum.json", json!([
                { "siteBaseURL": "https://a.com", "siteId": "s1", "topPages": ["a.com/1"] }
            ])),
            opportunities: write(root, "opps.json", json!([
                { "domain": "a.com", "siteId": "s1", "extractedLinks": ["a.com/1", "a.com/2"] },
                { "domain": "b.com", "siteId": "s2", "extractedLinks": [] }
            ])),
        };

        let summary = overlap(&inputs, 200, root).unwrap();
        assert_eq!((summary.succeeded, summary.failed), (1, 1));
        assert!(summary.errors[0].message.contains("not found in rum data"));

        let stats: Value = store::read_json(&root.join("stats.json")).unwrap();
        assert_eq!(
            stats,
            json!([{
                "siteId": "s1",
                "siteBaseURL": "https://a.com",
                "overlapAll": 1,
                "overLapAllPercentage": 0.5,
                "overlapAhrefsOpportunities": 2,
                "overlapAhrefsOpportunitiesPercentage": 1.0,
                "overlapRumOpportunities": 1,
                "overlapRumOpportunitiesPercentage": 0.5
            }])
        );

        let csv = fs::read_to_string(root.join("stats.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                concat!(
                    "siteId,siteBaseURL,overlapAll,overLapAllPercentage,",
                    "overlapAhrefsOpportunities,overlapAhrefsOpportunitiesPercentage,",
                    "overlapRumOpportunities,overlapRumOpportunitiesPercentage"
                ),
                "\"s1\",\"https://a.com\",1,0.5,2,1,1,0.5",
            ]
        );
    }

    #[test]
    fn test_missing_sites_file() {
        let dir = tempfile::tempdir().unwrap();
        let sites = write(dir.path(), "sites.json", json!([
            { "id": "1", "baseURL": "https://www.a.com" },
            { "id": "2", "baseURL": "https://z.com" }
        ]));
        let rum = write(dir.path(), "rum.json", json!([
            { "siteBaseURL": "https://a.com", "siteId": "1", "topPages": [] }
        ]));

        find_missing_sites(&sites, &rum, dir.path()).unwrap();
        let missing: Vec<Site> = store::read_json(&dir.path().join(MISSING_SITES_FILE)).unwrap();
        assert_eq!(missing, vec![Site::new("2", "https://z.com")]);
    }

    #[test]
    fn test_count_pages_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ahrefs.json", json!([
            { "siteBaseURL": "https://a.com", "siteId": "1", "topPages": ["a", "b"] }
        ]));

        count_pages(&path, dir.path()).unwrap();
        let counts: Value = store::read_json(&dir.path().join(PAGE_COUNT_FILE)).unwrap();
        assert_eq!(counts["totalPages"], json!(2));
        assert_eq!(counts["siteDetails"][0]["siteBaseURL"], json!("https://a.com"));
    }

    #[test]
    fn test_count_pages_treats_null_pages_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "rum.json", json!([
            { "siteBaseURL": "https://a.com", "siteId": "1", "topPages": null },
            { "siteBaseURL": "https://b.com", "siteId": "2", "topPages": ["b.com/1"] }
        ]));

        count_pages(&path, dir.path()).unwrap();
        let counts: Value = store::read_json(&dir.path().join(PAGE_COUNT_FILE)).unwrap();
        assert_eq!(counts["totalPages"], json!(1));
        assert_eq!(counts["sitesWithoutTopPages"], json!(1));
    }

    #[test]
    fn test_merge_rum_files() {
        let dir = tempfile::tempdir().unwrap();
        let primary = write(dir.path(), "rum-data-list.json", json!([
            { "siteBaseURL": "https://b.com", "siteId": "", "topPages": [] }
        ]));
        let secondary = write(dir.path(), "rum-data-list-missing.json", json!([
            { "siteBaseURL": "https://b.com", "siteId": "2", "topPages": ["b.com/1"] },
            { "siteBaseURL": "https://a.com", "siteId": "1", "topPages": [] }
        ]));

        merge_rum_files(&primary, &secondary, dir.path()).unwrap();
        let merged: Vec<TopPagesRecord> =
            store::read_json(&dir.path().join(RUM_FINAL_FILE)).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].site_base_url, "https://a.com");
        assert_eq!(merged[1].site_id, "2");
    }
}
