//! Feedcast crawler main entry point
//!
//! This is the command-line interface for the feedcast crawler: run a single
//! crawl and write its records, or serve the HTTP crawl endpoint.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use feedcast_crawler::config::{load_config_with_hash, Config};
use feedcast_crawler::output::{print_statistics, write_record, write_records, OutputFormat};
use feedcast_crawler::{Crawler, Scheme};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Feedcast crawler: a bounded, same-origin content snapshotter
///
/// Crawls one domain from its root, follows same-domain links within a
/// page, depth and time budget, and extracts title, meta description, meta
/// keywords and sanitized body text for every page it reaches.
#[derive(Parser, Debug)]
#[command(name = "feedcast-crawler")]
#[command(version)]
#[command(about = "A bounded, same-origin content snapshotter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a domain and write its page records
    Crawl(CrawlArgs),

    /// Serve the HTTP crawl endpoint
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Domain to crawl, e.g. www.example.com (overrides the config file)
    #[arg(value_name = "DOMAIN")]
    domain: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to reserve, root included (0 = default)
    #[arg(long)]
    max_pages: Option<u16>,

    /// Wall-clock budget in seconds (0 = default)
    #[arg(long)]
    max_duration: Option<u8>,

    /// Maximum hop count from the root (0 = default)
    #[arg(long)]
    max_depth: Option<u8>,

    /// Follow links inside <header> and <footer>
    #[arg(long)]
    keep_header_links: bool,

    /// Crawl over plain HTTP instead of HTTPS
    #[arg(long)]
    http: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::JsonLines)]
    format: OutputFormat,

    /// Write records to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print crawl statistics to stderr when the crawl ends
    #[arg(long)]
    stats: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "FEEDCAST_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Path to TOML configuration file (only the [engine] table is used)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args).await,
        Command::Serve(args) => handle_serve(args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only records.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feedcast_crawler=info,warn"),
            1 => EnvFilter::new("feedcast_crawler=debug,info"),
            2 => EnvFilter::new("feedcast_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given
fn load_file_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the crawl command: runs one crawl and writes its records
async fn handle_crawl(args: CrawlArgs) -> Result<()> {
    let Config {
        crawl: mut crawl_config,
        engine,
    } = load_file_config(args.config.as_deref())?;

    if let Some(domain) = args.domain {
        crawl_config.domain = domain;
    }
    if crawl_config.domain.trim().is_empty() {
        return Err(anyhow!(
            "no domain given: pass DOMAIN or set domain in the [crawl] table"
        ));
    }
    if let Some(max_pages) = args.max_pages {
        crawl_config.max_pages = max_pages;
    }
    if let Some(max_duration) = args.max_duration {
        crawl_config.max_duration = max_duration;
    }
    if let Some(max_depth) = args.max_depth {
        crawl_config.max_depth = max_depth;
    }
    if args.keep_header_links {
        crawl_config.keep_header_footer_links = true;
    }
    if args.http {
        crawl_config.scheme = Scheme::Http;
    }

    let mut stream = Crawler::new(crawl_config)
        .with_engine_config(engine)
        .run()
        .await
        .context("crawl could not start")?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        if args.format.is_streaming() {
            write_record(&mut writer, args.format, &record)?;
            writer.flush()?;
        } else {
            records.push(record);
        }
    }

    let stats = stream.statistics();

    if !args.format.is_streaming() {
        write_records(&mut writer, args.format, &records, Some(&stats))?;
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Records written to: {}", path.display());
    }

    if args.stats {
        print_statistics(&stats);
    }

    Ok(())
}

/// Handles the serve command: runs the HTTP endpoint until shutdown
async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = load_file_config(args.config.as_deref())?;

    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", args.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    feedcast_crawler::server::serve(listener, config.engine)
        .await
        .context("server shutdown")?;

    Ok(())
}
