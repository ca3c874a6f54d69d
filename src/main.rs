//! quarry main entry point
//!
//! One entry point per site variant; resume is implicit (the checkpoint
//! file's presence alone decides resume vs fresh start). Exit codes:
//! 0 = completed cleanly, 130 = interrupted (state flushed), 1 = fatal.

use clap::{Parser, ValueEnum};
use quarry::browser::{BrowserSession, ChromiumFetcher};
use quarry::checkpoint::CheckpointStore;
use quarry::config::{load_config_with_hash, Config};
use quarry::pipeline::{CancelFlag, Orchestrator, RunOutcome};
use quarry::record::header_row;
use quarry::sink::CsvSink;
use quarry::site;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Supported site variants
#[derive(Copy, Clone, Debug, ValueEnum)]
enum SiteArg {
    /// topovi.com.ua — engineered & natural stone
    Topovi,
    /// sapienstone.com — porcelain kitchen tops
    Sapienstone,
    /// ascale.es — large-format porcelain collections
    Ascale,
}

impl SiteArg {
    fn name(self) -> &'static str {
        match self {
            Self::Topovi => "topovi",
            Self::Sapienstone => "sapienstone",
            Self::Ascale => "ascale",
        }
    }
}

/// quarry: a resumable catalog harvester for stone & tile sites
///
/// Drives a headless browser through the chosen site's product listings,
/// enriches every product from its detail page, and appends rows to a CSV
/// file. Interrupt at any time; the next run picks up where this one
/// stopped.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version = "1.0.0")]
#[command(about = "A resumable stone & tile catalog harvester", long_about = None)]
struct Cli {
    /// Site variant to crawl
    #[arg(value_enum)]
    site: SiteArg,

    /// Path to TOML configuration file (defaults apply without one)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Delete the checkpoint and results file before starting
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("configuration loaded (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("failed to load configuration: {}", e);
                    return ExitCode::from(1);
                }
            }
        }
        None => {
            tracing::info!("no configuration file given, using defaults");
            Config::default()
        }
    };

    let Some(site) = site::by_name(cli.site.name()) else {
        tracing::error!("unknown site: {}", cli.site.name());
        return ExitCode::from(1);
    };

    let output_dir = PathBuf::from(&config.output.directory);
    let results_path = output_dir.join(format!("{}_products.csv", site.name()));
    let checkpoint_path = output_dir.join(format!("progress_{}.json", site.name()));

    if cli.fresh {
        tracing::info!("--fresh: discarding previous checkpoint and results");
        let _ = std::fs::remove_file(&checkpoint_path);
        let _ = std::fs::remove_file(&results_path);
    }

    // The browser starts before any output file is touched, so a fatal
    // launch failure aborts with no partial output risk.
    let session = match BrowserSession::launch(&config.browser).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("cannot start browser session: {}", e);
            return ExitCode::from(1);
        }
    };
    let fetcher = ChromiumFetcher::new(
        session,
        Duration::from_millis(config.browser.nav_timeout_ms),
        Duration::from_millis(config.browser.scroll_settle_ms),
    );

    let checkpoint = match CheckpointStore::load(&checkpoint_path, config.crawl.checkpoint_every) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("cannot load checkpoint: {}", e);
            return ExitCode::from(1);
        }
    };

    let header = header_row(site.fields(), site.gallery_arity());
    let sink = match CsvSink::open(&results_path, &header) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("cannot open results file: {}", e);
            return ExitCode::from(1);
        }
    };

    // Interrupts cancel cooperatively: the current fetch completes, then
    // no further work starts and both stores are flushed.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, finishing current item and flushing");
                cancel.cancel();
            }
        });
    }

    let mut orchestrator = Orchestrator::new(site, fetcher, checkpoint, sink, &config, cancel);

    match orchestrator.run().await {
        Ok(RunOutcome::Completed) => {
            tracing::info!("crawl completed successfully");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Interrupted) => {
            tracing::info!("crawl interrupted, progress saved — rerun to resume");
            ExitCode::from(130)
        }
        Err(e) => {
            tracing::error!("crawl failed: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quarry=info,warn"),
            1 => EnvFilter::new("quarry=debug,info"),
            2 => EnvFilter::new("quarry=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
