//! `netprobe` command-line interface.
//!
//! ```text
//! netprobe check   [--url U]                         one attempt
//! netprobe retry   [--url U] [--retries N] ...       retry chain
//! netprobe monitor                                   periodic chains until SIGINT/SIGTERM
//! ```
//!
//! Exit status is 0 when the target is reachable, 1 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde::Serialize;
use url::Url;

use netprobe::config::validation::validate_monitor_config;
use netprobe::config::{load_config, ConfigError, ProbeSettings};
use netprobe::lifecycle::{wait_for_signal, Shutdown};
use netprobe::monitor::{Reachability, ReachabilityMonitor};
use netprobe::observability::{logging, metrics};
use netprobe::probe::{Prober, ProbeRequest};

#[derive(Parser)]
#[command(name = "netprobe")]
#[command(about = "Check network reachability by loading a small remote resource", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit JSON logs and a JSON report.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single attempt with the configured timeout
    Check {
        #[arg(short, long)]
        url: Option<Url>,
    },
    /// Sequential attempts with a pause between failures
    Retry {
        #[arg(short, long)]
        url: Option<Url>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(short, long)]
        retries: Option<u32>,
        #[arg(short, long)]
        pause_ms: Option<u64>,
    },
    /// Probe periodically until interrupted
    Monitor,
}

#[derive(Serialize)]
struct Report {
    url: String,
    reachable: bool,
    elapsed_ms: u128,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProbeSettings::default(),
    };
    logging::init_logging(&settings.observability.log_level, cli.json);

    let configured_url = settings.probe.url.as_deref().map(Url::parse).transpose()?;

    match cli.command {
        Commands::Check { url } => {
            let prober = Prober::new(settings.probe.clone())?;
            let url = url.or(configured_url).unwrap_or_else(|| prober.default_url());

            let start = Instant::now();
            let reachable = prober.check(Some(url.clone())).await;
            report(&url, reachable, start, cli.json)
        }
        Commands::Retry {
            url,
            timeout_ms,
            retries,
            pause_ms,
        } => {
            let mut probe_config = settings.probe.clone();
            if let Some(ms) = timeout_ms {
                probe_config.timeout_ms = ms;
            }
            let prober = Prober::new(probe_config)?;
            let url = url.or(configured_url).unwrap_or_else(|| prober.default_url());

            let mut request = ProbeRequest::from_config(url.clone(), prober.config(), &settings.retry);
            if let Some(n) = retries {
                request = request.with_retries(n);
            }
            if let Some(ms) = pause_ms {
                request = request.with_pause(Duration::from_millis(ms));
            }

            let start = Instant::now();
            let reachable = prober.check_with_retries(request).await;
            report(&url, reachable, start, cli.json)
        }
        Commands::Monitor => run_monitor(settings, configured_url).await,
    }
}

async fn run_monitor(
    settings: ProbeSettings,
    target: Option<Url>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    validate_monitor_config(&settings).map_err(ConfigError::Validation)?;

    if settings.observability.metrics_enabled {
        let addr = settings.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let prober = Prober::new(settings.probe.clone())?;
    let monitor = ReachabilityMonitor::new(prober, target, settings.retry, settings.monitor);
    let tracker = monitor.tracker();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(monitor.run(shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();
    task.await?;

    tracing::info!(state = %tracker.state(), "Shutdown complete");
    Ok(if tracker.state() == Reachability::Offline {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn report(
    url: &Url,
    reachable: bool,
    start: Instant,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let report = Report {
        url: url.to_string(),
        reachable,
        elapsed_ms: start.elapsed().as_millis(),
    };

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        let verdict = if reachable { "reachable" } else { "unreachable" };
        println!("{} {} ({} ms)", report.url, verdict, report.elapsed_ms);
    }

    Ok(if reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
