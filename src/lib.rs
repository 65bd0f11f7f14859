//! Cross-references the top pages of customer sites (Ahrefs, RUM) with the
//! pages flagged by site optimization opportunities.
//!
//! The [`analysis`] modules are pure functions over JSON trees and URL
//! lists; everything else moves data between them, the REST API and the
//! artifact directory.

// Re-export modules
pub mod analysis;
pub mod batch;
pub mod client;
pub mod config;
pub mod csv;
pub mod datasets;
pub mod error;
pub mod filter;
pub mod jobs;
pub mod manifest;
pub mod report;
pub mod results;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::overlap::{OverlapResult, OverlapStats, SourceDatasets, compute_overlap};
pub use analysis::reshape::{OpportunityMap, VerifyReport, reshape, verify};
pub use analysis::stats::annotate;
pub use error::{Error, Result};
pub use filter::{DomainFilter, normalize_url};
pub use results::{ExtractedLinksRecord, Site, TopPagesRecord};
