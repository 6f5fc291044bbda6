//! Noon-Harvest main entry point
//!
//! This is the command-line interface for the Noon-Harvest product scraper.

use clap::Parser;
use noon_harvest::config::load_config;
use noon_harvest::output::write_records;
use noon_harvest::search::search;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Noon-Harvest: a concurrent product search scraper
///
/// Fetches every result page for a search query, extracts the product
/// records, and writes them to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "noon-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Search for products and save results to a CSV file", long_about = None)]
struct Cli {
    /// Search query (can be Arabic)
    #[arg(value_name = "QUERY")]
    query: String,

    /// Output CSV file path
    #[arg(long, default_value = "output.csv")]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let start = Instant::now();

    let config = load_config(&cli.config)?;
    tracing::info!(
        "Starting search with query: '{}', output path: '{}'",
        cli.query,
        cli.output.display()
    );
    tracing::debug!(
        "Configuration loaded: connection-limiter={}, max-pages={}, max-workers={}",
        config.connection_limiter,
        config.max_pages,
        config.max_workers
    );

    let records = match search(&config, &cli.query).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            return Err(e.into());
        }
    };

    write_records(&cli.output, &records)?;

    let taken = start.elapsed();
    tracing::info!(
        "Search completed: {} record(s). Time taken: {:.2}s",
        records.len(),
        taken.as_secs_f64()
    );
    println!("Time Taken: {:.2}s", taken.as_secs_f64());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("noon_harvest=info,warn"),
            1 => EnvFilter::new("noon_harvest=debug,info"),
            2 => EnvFilter::new("noon_harvest=trace,debug"),
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
