//! Commands over per-site opportunity link files.

use serde_json::Value;
use std::path::Path;

use crate::analysis::reshape::{ReshapeSummary, opportunities_from_value, reshape, verify};
use crate::analysis::stats::annotate;
use crate::batch::BatchSummary;
use crate::error::Result;
use crate::jobs::require_dir;
use crate::manifest::Manifest;
use crate::report::{self, SpreadsheetSummary};
use crate::store;

/// Turn every type → URLs file of `input` into a URL → types file of the
/// same name in `output`
pub fn reshape_dir(input: &Path, output: &Path) -> Result<BatchSummary> {
    require_dir(input)?;
    let files = store::list_json_files(input)?;
    ::log::info!("Transforming {} files into {}", files.len(), output.display());

    let mut summary = BatchSummary::default();
    let mut totals = ReshapeSummary::default();
    for path in &files {
        let name = store::file_name(path);
        let result = store::read_object(path).and_then(|document| {
            let by_type = opportunities_from_value(&document);
            let by_url = reshape(&by_type);
            store::write_json(&output.join(&name), &by_url)?;
            Ok(ReshapeSummary::new(&by_type, &by_url))
        });

        if let Some(file_summary) = summary.record(&name, result) {
            ::log::info!(
                "  {} URLs, {} opportunity types, {} URLs with several",
                file_summary.total_urls,
                file_summary.total_opportunity_types,
                file_summary.urls_with_multiple_opportunities
            );
            totals.total_urls += file_summary.total_urls;
            totals.urls_with_multiple_opportunities +=
                file_summary.urls_with_multiple_opportunities;
        }
    }

    let manifest = Manifest::load(input)?;
    if !manifest.is_empty() {
        manifest.save(output)?;
    }

    ::log::info!(
        "Total: {} URLs, {} with more than one opportunity",
        totals.total_urls,
        totals.urls_with_multiple_opportunities
    );
    Ok(summary)
}

/// Remove repeated types from every URL → types file of `dir`, rewriting
/// only files that had any
pub fn verify_dir(dir: &Path) -> Result<BatchSummary> {
    require_dir(dir)?;

    let mut summary = BatchSummary::default();
    let mut files_fixed = 0;
    let mut removed = 0;
    for path in store::list_json_files(dir)? {
        let name = store::file_name(&path);
        let result = store::read_object(&path).and_then(|mut document| {
            let report = verify(&opportunities_from_value(&document));
            if report.has_duplicates() {
                report.apply_to(&mut document);
                store::write_json(&path, &document)?;
            }
            Ok(report)
        });

        if let Some(report) = summary.record(&name, result) {
            if report.has_duplicates() {
                files_fixed += 1;
                removed += report.duplicates_removed;
                ::log::warn!(
                    "{}: removed {} duplicates from {} URLs",
                    name,
                    report.duplicates_removed,
                    report.urls_affected
                );
                for example in &report.examples {
                    ::log::debug!(
                        "  {}: {:?} ({} → {})",
                        example.url,
                        example.duplicates,
                        example.original_count,
                        example.cleaned_count
                    );
                }
            }
        }
    }

    ::log::info!("{} files fixed, {} duplicates removed", files_fixed, removed);
    Ok(summary)
}

/// Prepend `stats` to one file, or to every file of a directory
pub fn add_stats(path: &Path) -> Result<BatchSummary> {
    let files = if path.is_dir() {
        store::list_json_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut summary = BatchSummary::default();
    for file in files {
        let name = store::file_name(&file);
        let result = store::read_object(&file).and_then(|groups| {
            let annotated = annotate(&groups);
            store::write_json(&file, &annotated)?;
            Ok(annotated)
        });
        if let Some(annotated) = summary.record(&name, result) {
            if let Some(Value::Object(stats)) = annotated.get(crate::analysis::stats::STATS_KEY) {
                ::log::debug!("{}: {:?}", name, stats);
            }
        }
    }
    Ok(summary)
}

/// Flatten every grouped links file of `dir` into one spreadsheet plus a
/// summary, written into `output_dir`
pub fn spreadsheet(dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
    require_dir(dir)?;
    let manifest = Manifest::load(dir)?;

    let mut summary = BatchSummary::default();
    let mut rows = Vec::new();
    for path in store::list_json_files(dir)? {
        let name = store::file_name(&path);
        let site = manifest
            .get(&name)
            .and_then(|entry| entry.domain())
            .unwrap_or_else(|| {
                ::log::warn!("{} is not in the manifest, site shown as Unknown", name);
                "Unknown".to_string()
            });

        let result = store::read_object(&path)
            .map(|document| report::rows_for_site(&site, &opportunities_from_value(&document)));
        if let Some(site_rows) = summary.record(&name, result) {
            ::log::info!("  Processed {}: {} opportunities", name, site_rows.len());
            rows.extend(site_rows);
        }
    }

    report::sort_rows(&mut rows);
    store::write_text(
        &output_dir.join(super::SPREADSHEET_FILE),
        &report::rows_to_csv(&rows),
    )?;

    let totals = SpreadsheetSummary::new(&rows);
    store::write_json(&output_dir.join(super::SPREADSHEET_SUMMARY_FILE), &totals)?;
    println!("Total opportunities: {}", totals.total_urls);
    for (priority, count) in &totals.by_priority {
        println!("  {}: {}", priority, count);
    }
    Ok(summary)
}
