//! SiteScout main entry point
//!
//! This is the command-line interface for the SiteScout company extractor.

use anyhow::{bail, Context};
use clap::Parser;
use sitescout::config::{load_config_with_hash, Config};
use sitescout::output::{format_report_json, print_report, print_responses, write_report_markdown};
use sitescout::pipeline::{Pipeline, PipelineReport, PipelineRequest};
use sitescout::progress::{NdjsonSink, NullSink, ProgressEvent, ProgressSink, WireEvent};
use sitescout::storage::{open_storage, ResponseStore};
use sitescout::{ConfigError, PipelineError};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// SiteScout: a bounded same-domain crawler that extracts companies and addresses
///
/// SiteScout walks a website breadth-first from the given URL, sends the text
/// of every page it visits to a language model, and reports the distinct
/// companies (name and physical address) it finds.
#[derive(Parser, Debug)]
#[command(name = "sitescout")]
#[command(version)]
#[command(about = "Crawl a website and extract company names and addresses", long_about = None)]
struct Cli {
    /// Start URL to crawl
    #[arg(value_name = "URL", required_unless_present = "responses")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum link depth from the start URL (0-3)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to fetch (1-50)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Stream progress events to stdout as newline-delimited JSON
    #[arg(long, conflicts_with = "json")]
    stream: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Write a Markdown report to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Store the request and its events in the configured database
    #[arg(long)]
    save: bool,

    /// List stored responses from the configured database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stream", "json", "save", "summary"])]
    responses: bool,

    /// Validate config and request and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    let (config, config_hash) =
        load_configuration(cli.config.as_deref()).context("failed to load configuration")?;

    if cli.responses {
        return Ok(handle_responses(&config)?);
    }

    let Some(url) = cli.url.clone() else {
        bail!("a start URL is required");
    };

    let mut request = PipelineRequest::from_config(url, &config.crawler);
    if let Some(max_depth) = cli.max_depth {
        request.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        request.max_pages = max_pages;
    }

    if cli.dry_run {
        return handle_dry_run(&config, &request);
    }

    Ok(handle_run(&cli, &config, config_hash.as_deref(), request).await?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that `--stream` and `--json` output on stdout stays
/// machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitescout=info,warn"),
            1 => EnvFilter::new("sitescout=debug,info"),
            2 => EnvFilter::new("sitescout=trace,debug"),
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

/// Loads the configuration file if one was given, along with its content hash
fn load_configuration(path: Option<&Path>) -> sitescout::Result<(Config, Option<String>)> {
    let Some(path) = path else {
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok((config, Some(hash)))
}

/// Handles the --dry-run mode: validates the request and shows the effective settings
fn handle_dry_run(config: &Config, request: &PipelineRequest) -> anyhow::Result<()> {
    let seed = request.validate().context("invalid request")?;

    println!("=== SiteScout Dry Run ===\n");

    println!("Request:");
    println!("  Start URL: {}", seed);
    println!("  Max depth: {}", request.max_depth);
    println!("  Max pages: {}", request.max_pages);

    println!("\nCrawler:");
    println!(
        "  Max links per page: {}",
        config.crawler.max_links_per_page
    );
    println!("  Max text chars: {}", config.crawler.max_text_chars);
    println!(
        "  Treat www as same domain: {}",
        config.crawler.treat_www_as_same_domain
    );

    println!("\nFetcher:");
    println!("  User agent: {}", config.user_agent.header_value());
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nOracle:");
    println!("  Endpoint: {}", config.oracle.api_url);
    println!("  Model: {}", config.oracle.model);
    println!("  Max tokens: {}", config.oracle.max_tokens);
    let key_present = std::env::var(&config.oracle.api_key_env)
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false);
    println!(
        "  API key ({}): {}",
        config.oracle.api_key_env,
        if key_present { "set" } else { "missing" }
    );

    println!("\nOutput:");
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (not configured)"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl up to {} pages from {}", request.max_pages, seed);

    Ok(())
}

/// Handles the --responses mode: lists stored responses
fn handle_responses(config: &Config) -> sitescout::Result<()> {
    let database_path = require_database(config, "--responses")?;

    println!("Database: {}\n", database_path);

    let storage = open_storage(Path::new(database_path))?;
    let records = storage.list_responses()?;
    print_responses(&records);

    Ok(())
}

/// Handles the main crawl-and-extract operation
async fn handle_run(
    cli: &Cli,
    config: &Config,
    config_hash: Option<&str>,
    request: PipelineRequest,
) -> sitescout::Result<()> {
    let pipeline = build_pipeline(config, &request)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            interrupt.cancel();
        }
    });

    let mut live: Box<dyn ProgressSink> = if cli.stream {
        Box::new(NdjsonSink::new(std::io::stdout()))
    } else {
        Box::new(NullSink)
    };
    let mut events: Vec<ProgressEvent> = Vec::new();

    let result = pipeline
        .run(&request, (&mut *live, &mut events), &cancel)
        .await;

    if cli.save {
        let wire: Vec<WireEvent> = events.iter().map(ProgressEvent::to_wire).collect();
        save_response(config, &request, &wire, config_hash)?;
    }

    let report = result?;
    write_outputs(cli, &report)
}

/// Checks the request, then builds the pipeline
///
/// Request errors are reported ahead of collaborator setup errors such as a
/// missing API key.
fn build_pipeline(config: &Config, request: &PipelineRequest) -> sitescout::Result<Pipeline> {
    request.validate().map_err(PipelineError::from)?;
    Pipeline::from_config(config)
}

/// Prints or writes the report in the formats requested on the command line
fn write_outputs(cli: &Cli, report: &PipelineReport) -> sitescout::Result<()> {
    if cli.json {
        println!("{}", format_report_json(report)?);
    } else if !cli.stream {
        print_report(report);
    }

    if let Some(path) = &cli.summary {
        write_report_markdown(report, path)?;
        tracing::info!("Wrote summary to {}", path.display());
    }

    Ok(())
}

/// Persists one invocation when a database is configured
fn save_response(
    config: &Config,
    request: &PipelineRequest,
    events: &[WireEvent],
    config_hash: Option<&str>,
) -> sitescout::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        tracing::warn!("--save ignored: no [output] database-path configured");
        return Ok(());
    };

    let mut storage = open_storage(Path::new(database_path))?;
    let id = storage.save_response(request, events, config_hash)?;
    tracing::info!("Saved response #{} to {}", id, database_path);

    Ok(())
}

fn require_database<'a>(config: &'a Config, flag: &str) -> sitescout::Result<&'a str> {
    config.output.database_path.as_deref().ok_or_else(|| {
        ConfigError::Validation(format!(
            "{} needs [output] database-path in the configuration",
            flag
        ))
        .into()
    })
}
