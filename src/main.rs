use clap::Parser;
use page_overlap::batch::BatchSummary;
use page_overlap::client::ApiClient;
use page_overlap::config::{AppConfig, TOKEN_ENV_VAR};
use page_overlap::error::{Error, Result};
use page_overlap::jobs::{self, collect, links, opportunities, overlap, resolve};
use std::process::ExitCode;

mod args;
use args::{Args, Command, ManifestCommand, convert_failure_policy};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start_time = std::time::Instant::now();
    match run(args.command, &config).await {
        Ok(summary) => {
            summary.log("Finished");
            ::log::info!("Took {:.2} seconds", start_time.elapsed().as_secs_f64());
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Configuration file (or defaults), then the token variable, then flags
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_token();

    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(policy) = args.on_fetch_error {
        config.api.failure_policy = convert_failure_policy(policy);
    }

    config.validate()?;
    Ok(config)
}

fn api_client(config: &AppConfig) -> Result<ApiClient> {
    if config.api.token.is_none() {
        println!("Note: no API token configured.");
        println!("Set the {} environment variable or api.token in the config file", TOKEN_ENV_VAR);
    }
    ApiClient::new(&config.api)
}

async fn run(command: Command, config: &AppConfig) -> Result<BatchSummary> {
    let out = config.output_dir.as_path();

    match command {
        Command::Sites { base_urls } => {
            let client = api_client(config)?;
            collect::sites(&client, config, &base_urls).await
        }
        Command::Ahrefs { sites } => {
            let client = api_client(config)?;
            let sites = resolve(out, sites.as_deref(), jobs::SITES_FILE);
            collect::ahrefs(&client, config, &sites).await
        }
        Command::Opportunities { sites } => {
            let client = api_client(config)?;
            let sites = resolve(out, sites.as_deref(), jobs::SITES_FILE);
            collect::opportunities(&client, config, &sites).await
        }
        Command::ExtractLinks { dir } => {
            let dir = resolve(out, dir.as_deref(), jobs::OPPORTUNITIES_DIR);
            let (path, summary) = links::extract_links(config, &dir)?;
            println!("Consolidated results written to {}", path.display());
            Ok(summary)
        }
        Command::GroupLinks { dir, out: destination } => {
            let dir = resolve(out, dir.as_deref(), jobs::OPPORTUNITIES_DIR);
            let destination = resolve(out, destination.as_deref(), jobs::GROUPED_LINKS_DIR);
            links::group_links(config, &dir, &destination)
        }
        Command::Reshape { input, output } => {
            let input = resolve(out, input.as_deref(), jobs::GROUPED_LINKS_DIR);
            let output = resolve(out, output.as_deref(), jobs::RESHAPED_DIR);
            opportunities::reshape_dir(&input, &output)
        }
        Command::Verify { dir } => {
            let dir = resolve(out, dir.as_deref(), jobs::RESHAPED_DIR);
            opportunities::verify_dir(&dir)
        }
        Command::AddStats { path } => opportunities::add_stats(&path),
        Command::Overlap {
            ahrefs,
            rum,
            opportunities: opportunity_links,
            sites,
            top_n,
        } => {
            let top_n = top_n.unwrap_or(config.top_n);
            if top_n == 0 {
                return Err(Error::Config("--top-n must be greater than zero".to_string()));
            }
            let inputs = overlap::OverlapInputs {
                ahrefs: resolve(out, ahrefs.as_deref(), jobs::AHREFS_FILE),
                rum: resolve(out, rum.as_deref(), jobs::RUM_FILE),
                opportunities: resolve(
                    out,
                    opportunity_links.as_deref(),
                    jobs::OPPORTUNITY_LINKS_FILE,
                ),
                sites: resolve(out, sites.as_deref(), jobs::SITES_FILE),
            };
            overlap::overlap(&inputs, top_n, out)
        }
        Command::MergeRum { primary, secondary } => {
            overlap::merge_rum_files(&primary, &secondary, out)
        }
        Command::MissingSites { rum, sites } => {
            let rum = resolve(out, rum.as_deref(), jobs::RUM_FINAL_FILE);
            let sites = resolve(out, sites.as_deref(), jobs::SITES_FILE);
            overlap::find_missing_sites(&sites, &rum, out)
        }
        Command::CountPages { file } => overlap::count_pages(&file, out),
        Command::Spreadsheet { dir } => {
            let dir = resolve(out, dir.as_deref(), jobs::GROUPED_LINKS_DIR);
            opportunities::spreadsheet(&dir, out)
        }
        Command::Manifest {
            action: ManifestCommand::ImportLegacy { dir, sites },
        } => {
            let sites = resolve(out, sites.as_deref(), jobs::SITES_FILE);
            links::import_legacy(&dir, &sites)
        }
    }
}
