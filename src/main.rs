//! Faqsmith main entry point
//!
//! This is the command-line interface for crawling a site and generating its FAQ.

use anyhow::{bail, Context};
use clap::Parser;
use faqsmith::config::{load_config_with_hash, Config, LocalEngine};
use faqsmith::generation::{GenerationOptions, OpenAiClient, TextGenerator};
use faqsmith::output::{run_pipeline, write_json, write_markdown, PipelineReport, PipelineRequest};
use faqsmith::render::{DefaultConnector, RenderProfile};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Faqsmith: turn a website into a validated FAQ
///
/// Faqsmith crawls a single site breadth-first, extracts the main content of
/// each page, and asks a text-generation model for question/answer pairs
/// that are validated and filtered by confidence.
#[derive(Parser, Debug)]
#[command(name = "faqsmith")]
#[command(version)]
#[command(about = "Crawl a website and generate a validated FAQ", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL of the site to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Page budget for this run (defaults to crawler.max-pages)
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// The site belongs to you: render it locally instead of via the proxy-broker
    #[arg(long)]
    site_owner: bool,

    /// Drop FAQs below this confidence (defaults to generation.min-confidence)
    #[arg(long, value_name = "F")]
    min_confidence: Option<f64>,

    /// Write the scrape and FAQ records as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Write the FAQ as a Markdown document
    #[arg(long, value_name = "PATH")]
    markdown: Option<PathBuf>,

    /// Stop after crawling; no generation call is made
    #[arg(long)]
    crawl_only: bool,

    /// Validate config and show what would be done without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Access credential for the remote rendering broker
    #[arg(long, env = "FAQSMITH_PROXY_TOKEN", hide_env_values = true)]
    proxy_token: Option<String>,

    /// API key for the text-generation backend
    #[arg(long, env = "FAQSMITH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Secrets never come from the file
    config.renderer.proxy_credential = cli.proxy_token.clone();
    config.generation.api_key = cli.api_key.clone();

    let mut options = GenerationOptions::from(&config.generation);
    if let Some(min_confidence) = cli.min_confidence {
        if !(0.0..=1.0).contains(&min_confidence) {
            bail!(
                "--min-confidence must be between 0 and 1, got {}",
                min_confidence
            );
        }
        options.min_confidence = min_confidence;
    }

    let request = PipelineRequest {
        url: cli.url.clone(),
        max_pages: cli.max_pages,
        site_owner: cli.site_owner,
        options,
        config_hash: Some(config_hash),
    };

    if cli.dry_run {
        print_dry_run(&config, &request, cli.crawl_only);
        return Ok(());
    }

    let generator = if cli.crawl_only {
        None
    } else {
        Some(OpenAiClient::new(&config.generation).context("cannot generate FAQs")?)
    };

    let connector = DefaultConnector::new(config.renderer.clone(), config.user_agent.clone());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            interrupt.cancel();
        }
    });

    let report = run_pipeline(
        &config,
        &connector,
        generator.as_ref().map(|g| g as &dyn TextGenerator),
        &request,
        &cancel,
        |progress| {
            tracing::info!(
                "Progress: {}/{} pages ({})",
                progress.pages_scraped,
                progress.max_pages,
                progress.url
            );
        },
    )
    .await;

    if let Some(path) = &cli.json {
        write_json(&report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote JSON report to {}", path.display());
    }

    if let Some(path) = &cli.markdown {
        write_markdown(&report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote Markdown FAQ to {}", path.display());
    }

    if !cli.quiet {
        print_summary(&report);
    }

    if !report.success() {
        let error = report
            .faq
            .as_ref()
            .and_then(|faq| faq.error.clone())
            .or_else(|| report.scrape.metadata.error.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("run failed: {}", error);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("faqsmith=info,warn"),
            1 => EnvFilter::new("faqsmith=debug,info"),
            2 => EnvFilter::new("faqsmith=trace,debug"),
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

/// Handles the --dry-run mode: shows what a run would do
fn print_dry_run(config: &Config, request: &PipelineRequest, crawl_only: bool) {
    println!("=== Faqsmith Dry Run ===\n");

    println!("Target: {}", request.url);
    let profile = RenderProfile::for_site_owner(request.site_owner);
    let renderer = match profile {
        RenderProfile::Trusted => match config.renderer.local_engine {
            LocalEngine::Chromium => "local headless Chromium",
            LocalEngine::Http => "plain HTTP",
        },
        RenderProfile::Proxied => "remote proxy-broker",
    };
    println!("  Renderer: {}", renderer);
    if profile == RenderProfile::Proxied {
        println!(
            "  Broker endpoint: {}",
            config.renderer.remote_endpoint.as_deref().unwrap_or("(not configured)")
        );
        println!(
            "  Broker credential: {}",
            if config.renderer.proxy_credential.is_some() {
                "provided"
            } else {
                "missing"
            }
        );
    }

    println!("\nCrawler:");
    println!(
        "  Max pages: {}",
        request.max_pages.unwrap_or(config.crawler.max_pages)
    );
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    if !config.crawler.path_prefixes.is_empty() {
        println!("  Path prefixes: {}", config.crawler.path_prefixes.join(", "));
    }
    if !config.crawler.exclude_paths.is_empty() {
        println!("  Excluded paths: {}", config.crawler.exclude_paths.join(", "));
    }

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Base delay: {}ms", config.retry.base_delay_ms);

    if crawl_only {
        println!("\nGeneration: skipped (--crawl-only)");
    } else {
        println!("\nGeneration:");
        println!("  Endpoint: {}", config.generation.base_url);
        println!("  Model: {}", config.generation.model);
        println!("  Min confidence: {}", request.options.min_confidence);
        println!("  Max FAQs: {}", request.options.max_faqs);
        println!(
            "  API key: {}",
            if config.generation.api_key.is_some() {
                "provided"
            } else {
                "missing"
            }
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Prints a short run summary to stdout
fn print_summary(report: &PipelineReport) {
    let scrape = &report.scrape;

    println!("\n=== Faqsmith Run {} ===\n", scrape.id);
    println!("Status: {}", scrape.status.as_str());
    println!(
        "Pages scraped: {} / {} ({} failed, {} left in frontier)",
        scrape.metadata.pages_scraped,
        scrape.metadata.max_pages,
        scrape.metadata.failed_pages.len(),
        scrape.metadata.pending_urls
    );

    if let Some(faq) = &report.faq {
        println!(
            "FAQs: {} accepted, {} below confidence threshold",
            faq.faqs.len(),
            faq.metadata.filtered_low_confidence
        );
        println!(
            "Average confidence: {:.2}",
            faq.metadata.average_confidence
        );
        println!("Model: {}", faq.metadata.model);

        for record in &faq.faqs {
            println!("\nQ: {}\nA: {}", record.question, record.answer);
        }
    }
}
