use anyhow::{anyhow, Result};
use clap::Parser;
use rangefetch::{
    config::{CrawlConfig, SourceFormat, DEFAULT_OUTPUT_DIR},
    fetch::{FileSink, TracingSink, WorkerContext},
    proxy::{HttpTransport, ProxyHarvester},
    validate_id_range, Orchestrator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fetch a range of numbered documents in parallel through rotating proxies
#[derive(Parser)]
#[command(name = "rangefetch")]
#[command(about = "Fetch a range of numbered documents in parallel through rotating proxies")]
struct Cli {
    /// ID of the first document to fetch
    #[arg(long, allow_negative_numbers = true)]
    first: i64,

    /// ID after the last document to fetch
    #[arg(long, allow_negative_numbers = true)]
    last: i64,

    /// Maximum number of parallel workers, recommended <= 8
    #[arg(short = 'p', long = "processes_number", alias = "processes-number", default_value = "1")]
    processes_number: usize,

    /// Directory where documents are saved
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    path: PathBuf,

    /// Set the log level to DEBUG
    #[arg(short = 'D', long)]
    debug: bool,

    /// Base URL; documents are fetched from {base_url}/{id}/
    #[arg(long)]
    base_url: Option<String>,

    /// Page listing candidate proxies
    #[arg(long)]
    proxy_source: Option<String>,

    /// Layout of the proxy page (table, plain)
    #[arg(long, default_value = "table")]
    source_format: String,

    /// URL used to check that a proxy works
    #[arg(long)]
    checked_url: Option<String>,

    /// Timeout in seconds for document requests
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Timeout in seconds for proxy checks
    #[arg(long, default_value = "10")]
    check_timeout: u64,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Hide the per-worker progress bars
    #[arg(long)]
    no_progress: bool,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_format, cli.debug);

    validate_id_range(cli.first, cli.last)?;
    let config = build_config(&cli)?;

    let documents = FileSink::create(&config.output_dir)?;
    let transport = HttpTransport::from_config(&config);
    let supply = ProxyHarvester::from_config(transport.clone(), &config);
    let context = WorkerContext::from_config(
        transport,
        &config,
        Arc::new(documents),
        Arc::new(TracingSink),
    )?;

    info!(
        "Fetching [{}, {}) into {:?} with up to {} workers",
        cli.first, cli.last, config.output_dir, cli.processes_number
    );
    let report = Orchestrator::new(context, supply)
        .with_progress(!cli.no_progress)
        .run(cli.first, cli.last, cli.processes_number)
        .await?;

    for worker in &report.completed {
        info!(
            "Worker {} [{}, {}): {} saved, {} not found, {} proxy rejections, {} network errors, {} save failures",
            worker.index,
            worker.range.start,
            worker.range.end,
            worker.saved,
            worker.not_found,
            worker.proxy_rejected,
            worker.network_errors,
            worker.save_failures
        );
    }
    for failure in &report.failed {
        warn!(
            "Worker {} [{}, {}) stopped early: {}",
            failure.index, failure.range.start, failure.range.end, failure.error
        );
    }

    if let Some(path) = &cli.report {
        report.write_json(path)?;
        info!("Run report written to {:?}", path);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<CrawlConfig> {
    let mut config = CrawlConfig::new()
        .with_output_dir(cli.path.clone())
        .with_request_timeout(Duration::from_secs(cli.timeout))
        .with_check_timeout(Duration::from_secs(cli.check_timeout));

    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    let format = parse_source_format(&cli.source_format)?;
    let source = cli
        .proxy_source
        .clone()
        .unwrap_or_else(|| config.proxy_source_url.clone());
    config = config.with_proxy_source(source, format);
    if let Some(checked_url) = &cli.checked_url {
        config = config.with_checked_url(checked_url.clone());
    }

    Ok(config)
}

fn parse_source_format(s: &str) -> Result<SourceFormat> {
    match s.to_lowercase().as_str() {
        "table" => Ok(SourceFormat::Table),
        "plain" => Ok(SourceFormat::PlainList),
        _ => Err(anyhow!("Invalid source format: {}. Use: table, plain", s)),
    }
}

fn setup_tracing(format: &str, debug: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("rangefetch=debug,info")
        } else {
            EnvFilter::new("rangefetch=info,warn")
        }
    });

    match format {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}
