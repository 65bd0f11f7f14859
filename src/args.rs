use clap::{Parser, Subcommand, ValueEnum};
use page_overlap::config::FailurePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-overlap")]
#[command(about = "Cross-references top pages with site optimization opportunities")]
#[command(version)]
pub struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory artifacts are read from and written to [default: output]
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// What a failed fetch turns into
    #[arg(long, value_enum, global = true)]
    pub on_fetch_error: Option<FailurePolicyArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve customer base URLs to site ids
    Sites {
        /// Customer base URLs, e.g. https://sunstar.com
        #[arg(required = true)]
        base_urls: Vec<String>,
    },

    /// Fetch the Ahrefs top pages of every site
    Ahrefs {
        /// Site list [default: <output-dir>/customer-sites-ids.json]
        #[arg(long)]
        sites: Option<PathBuf>,
    },

    /// Download every site's opportunities and suggestions
    Opportunities {
        /// Site list [default: <output-dir>/customer-sites-ids.json]
        #[arg(long)]
        sites: Option<PathBuf>,
    },

    /// Extract each site's domain links into one consolidated file
    ExtractLinks {
        /// Opportunity downloads [default: <output-dir>/opportunities]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Group each site's domain links by opportunity type
    GroupLinks {
        /// Opportunity downloads [default: <output-dir>/opportunities]
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Destination [default: <output-dir>/opportunities-links]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Turn type → URLs files into URL → types files
    Reshape {
        /// [default: <output-dir>/opportunities-links]
        #[arg(long)]
        input: Option<PathBuf>,

        /// [default: <output-dir>/links-opportunities]
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Remove repeated opportunity types from URL → types files in place
    Verify {
        /// [default: <output-dir>/links-opportunities]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Prepend per-group counts to a file or every file of a directory
    AddStats { path: PathBuf },

    /// Compute per-site overlap between Ahrefs, RUM and opportunity pages
    Overlap {
        #[arg(long)]
        ahrefs: Option<PathBuf>,

        #[arg(long)]
        rum: Option<PathBuf>,

        /// Consolidated opportunity links
        #[arg(long)]
        opportunities: Option<PathBuf>,

        #[arg(long)]
        sites: Option<PathBuf>,

        /// Denominator of the overlap percentages
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Merge a secondary RUM list into a primary one
    MergeRum { primary: PathBuf, secondary: PathBuf },

    /// List customer sites missing from RUM data
    MissingSites {
        /// [default: <output-dir>/rum-data-list-final.json]
        #[arg(long)]
        rum: Option<PathBuf>,

        #[arg(long)]
        sites: Option<PathBuf>,
    },

    /// Count the top pages of every site of a dataset
    CountPages { file: PathBuf },

    /// Flatten grouped links into a spreadsheet
    Spreadsheet {
        /// [default: <output-dir>/opportunities-links]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Maintain artifact manifests
    Manifest {
        #[command(subcommand)]
        action: ManifestCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ManifestCommand {
    /// Build a manifest from site ids embedded in download file names
    ImportLegacy {
        dir: PathBuf,

        #[arg(long)]
        sites: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicyArg {
    /// Keep an error entry for the failed item
    Record,
    /// Treat the failed response as an empty list
    Empty,
}

/// Convert from CLI argument failure policy to the configured one
pub fn convert_failure_policy(arg: FailurePolicyArg) -> FailurePolicy {
    match arg {
        FailurePolicyArg::Record => FailurePolicy::RecordError,
        FailurePolicyArg::Empty => FailurePolicy::EmptyOnError,
    }
}
