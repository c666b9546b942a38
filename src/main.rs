//! Sumi-Trail main entry point
//!
//! This is the command-line interface for the Sumi-Trail traversal engine.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use sumi_trail::config::{load_config_with_hash, validate_request, Config, CrawlRequest, SearchType};
use sumi_trail::crawler::{spawn_crawl, Crawler, HttpFetcher};
use sumi_trail::output::{
    print_statistics, ConsoleFormat, ConsoleSink, CrawlStatistics, EventSink, RecordLog, SseSink,
};
use sumi_trail::state::RunStatus;
use tracing_subscriber::EnvFilter;

/// Sumi-Trail: follows links from a seed page
///
/// Sumi-Trail walks the hyperlink graph breadth-first or depth-first,
/// printing one line per visited page. It stops at the depth limit, the
/// page cap, or the first page containing the keyword.
#[derive(Parser, Debug)]
#[command(name = "sumi-trail")]
#[command(version = "1.0.0")]
#[command(about = "A web-graph traversal engine", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Traversal discipline: breadth or depth
    #[arg(short = 't', long, default_value = "breadth")]
    search_type: SearchType,

    /// Depth limit (breadth) or step limit (depth)
    #[arg(short, long, default_value_t = 2)]
    limit: u32,

    /// Stop at the first page whose body contains this word
    #[arg(short, long)]
    keyword: Option<String>,

    /// Cap on pages visited (defaults to the configured max-total-pages)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Event output format on stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directory for the record log (overrides the configuration)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Sse,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let mut request = CrawlRequest::new(&cli.seed, cli.search_type, cli.limit, &config.crawler)
        .with_keyword(cli.keyword.clone());
    if let Some(max_pages) = cli.max_pages {
        request = request.with_max_total_pages(max_pages);
    }
    validate_request(&request, &config.crawler)?;

    let mut sinks = build_sinks(&cli, &config)?;

    let fetcher = HttpFetcher::new(&config)?;
    let crawler = Arc::new(Crawler::new(fetcher, config.crawler.clone()));

    let start_time = Instant::now();
    let mut handle = spawn_crawl(crawler, request);

    // Ctrl-C ends the run with a partial result
    let cancel = handle.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next_event().await {
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.handle(&event) {
                tracing::error!("Failed to write event: {}", e);
            }
        }
    }

    let outcome = handle.join().await?;

    if !cli.quiet {
        let stats = CrawlStatistics::from_outcome(&outcome, start_time.elapsed());
        print_statistics(&stats);
    }

    if outcome.status == RunStatus::Failed {
        return Err(format!("Crawl failed: no page could be visited ({})", outcome.reason).into());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the event stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_trail=info,warn"),
            1 => EnvFilter::new("sumi_trail=debug,info"),
            2 => EnvFilter::new("sumi_trail=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the stdout sink for the chosen format plus the optional record log
fn build_sinks(cli: &Cli, config: &Config) -> anyhow::Result<Vec<Box<dyn EventSink>>> {
    let mut sinks: Vec<Box<dyn EventSink>> = Vec::new();

    match cli.format {
        OutputFormat::Text => sinks.push(Box::new(ConsoleSink::new(
            std::io::stdout(),
            ConsoleFormat::Text,
        ))),
        OutputFormat::Json => sinks.push(Box::new(ConsoleSink::new(
            std::io::stdout(),
            ConsoleFormat::Json,
        ))),
        OutputFormat::Sse => sinks.push(Box::new(SseSink::new(std::io::stdout()))),
    }

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.output.log_directory.as_ref().map(PathBuf::from));

    if let Some(dir) = log_dir {
        let (log, _path) = RecordLog::create(&dir, Utc::now())
            .with_context(|| format!("Failed to create record log in {}", dir.display()))?;
        sinks.push(Box::new(log));
    }

    Ok(sinks)
}
