//! Procurement tracker CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use procurement_tracker::{
    error::Result,
    models::{Config, FileId, group_by_category},
    pipeline::SyncRunner,
    services::{PlanDiscovery, SpreadsheetDecoder, extract_bytes},
    storage::{LocalStorage, TrackerStorage},
    utils::http::HttpFetcher,
};

/// Procurement plan tracker
#[derive(Parser, Debug)]
#[command(
    name = "procurement-tracker",
    version,
    about = "Downloads AGH procurement plans and converts them to JSON"
)]
struct Cli {
    /// Page listing the plan spreadsheets (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    /// Output directory for JSON files and state (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Discover, download and convert new or updated plans
    #[default]
    Sync,

    /// Convert a local spreadsheet to JSON
    Extract {
        /// Spreadsheet file to convert
        file: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show tracked plans
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(url) = cli.url {
        config.tracker.source_url = url;
    }
    if let Some(output) = cli.output {
        config.tracker.output_dir = output;
    }

    match cli.command.unwrap_or_default() {
        Command::Sync => sync(&config).await?,

        Command::Extract { file, out } => extract_file(&file, out.as_deref()).await?,

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({})", cli.config.display());
        }

        Command::Info => {
            let storage = storage_for(&config);
            log::info!("Output directory: {}", storage.root_dir().display());

            let state = storage.load_state().await?;
            if state.is_empty() {
                log::info!("No plans downloaded yet.");
            }
            for (file_id, entry) in &state.downloaded {
                log::info!(
                    "{}: v{} -> {} (downloaded {}{})",
                    file_id,
                    entry.version,
                    entry.output_path,
                    entry.downloaded_at.to_rfc3339(),
                    if entry.available { "" } else { ", unavailable" }
                );
            }
        }
    }

    Ok(())
}

fn storage_for(config: &Config) -> LocalStorage {
    LocalStorage::new(&config.tracker.output_dir, &config.tracker.state_file)
}

async fn sync(config: &Config) -> Result<()> {
    log::info!("Procurement tracker starting...");

    tokio::fs::create_dir_all(&config.tracker.output_dir).await?;
    let storage = storage_for(config);
    let mut state = storage.load_state().await?;

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let discovery = PlanDiscovery::new(&config.tracker.extensions);
    let candidates = discovery
        .discover(&fetcher, &config.tracker.source_url)
        .await?;
    log::info!(
        "Found {} plan files at {}",
        candidates.len(),
        config.tracker.source_url
    );

    let runner = SyncRunner::new(&fetcher, &SpreadsheetDecoder, &storage, FileId::current())
        .with_delay(Duration::from_millis(config.crawler.request_delay_ms));

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match runner.run_until(&candidates, &mut state, interrupt).await? {
        Some(summary) => {
            log::info!("Sync complete:");
            for (label, count) in summary.items() {
                log::info!("  {}: {}", label, count);
            }
        }
        None => log::warn!("Sync interrupted; state saved"),
    }

    Ok(())
}

async fn extract_file(file: &Path, out: Option<&Path>) -> Result<()> {
    let bytes = tokio::fs::read(file).await?;
    let extraction = extract_bytes(&SpreadsheetDecoder, &bytes)?;
    log::info!(
        "Extracted {} items from {} ({:?})",
        extraction.items.len(),
        file.display(),
        extraction.stats
    );

    let json = serde_json::to_string_pretty(&group_by_category(&extraction.items))?;
    match out {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            log::info!("Saved to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
