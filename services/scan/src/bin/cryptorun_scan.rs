//! CLI shell around [`cryptorun_scan::orchestrator::ScanRun`] (spec §6 "CLI
//! surface (collaborator, listed for completeness)"). The menu, report
//! rendering, and dashboard surfaces named in the spec are external
//! collaborators; this binary exists only to drive the core pipeline this
//! crate actually implements end to end for `scan`, with `monitor`,
//! `selftest`, and `digest` as thin stand-ins for their real counterparts.

use clap::{Parser, Subcommand};
use cryptorun_scan::{ScanRunConfig, ScanRun};
use cryptorun_transport::{BudgetTracker, CircuitBreakerConfig, Guard, TokenBucket};
use cryptorun_types::VenueId;
use cryptorun_venues::VenueRegistry;
use cryptorun_venues_binance::BinanceAdapter;
use cryptorun_venues_coinbase::CoinbaseAdapter;
use cryptorun_venues_kraken::KrakenAdapter;
use cryptorun_venues_okx::OkxAdapter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cryptorun-scan", about = "CryptoRun momentum scanner")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding regime_weights/guards/quality_policies/universe config files.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scan cycle and emit candidates.jsonl/ledger.jsonl/manifest.json.
    Scan {
        #[arg(long, default_value = "binance")]
        exchange: String,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Long-running venue health/freshness watch (external collaborator surface).
    Monitor,
    /// Config validation and adapter connectivity smoke test.
    Selftest,
    /// Historical-ingest digest for a single date (external collaborator surface).
    Digest {
        #[arg(long)]
        date: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).json().init();
}

fn build_registry() -> Arc<VenueRegistry> {
    let tokens = TokenBucket::default();
    let budget = BudgetTracker::new();
    let guard = Arc::new(Guard::new(tokens, budget, CircuitBreakerConfig::default()));

    let mut registry = VenueRegistry::new();
    registry.register(Arc::new(BinanceAdapter::new(Default::default(), guard.clone())));
    registry.register(Arc::new(OkxAdapter::new(Default::default(), guard.clone())));
    registry.register(Arc::new(CoinbaseAdapter::new(Default::default(), guard.clone())));
    registry.register(Arc::new(KrakenAdapter::new(Default::default(), guard)));
    Arc::new(registry)
}

async fn run_scan(config_dir: PathBuf, exchange: String, out_dir: PathBuf) -> ExitCode {
    let app_config = match cryptorun_config::load(Some(&config_dir.join("app.yaml"))) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("config invalid: {err}");
            return ExitCode::FAILURE;
        }
    };
    let exchange = match VenueId::from_str(&exchange) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("unknown exchange: {err}");
            return ExitCode::FAILURE;
        }
    };

    let run_config = ScanRunConfig::new(exchange, config_dir, out_dir);
    let registry = build_registry();
    let scan = ScanRun::new(run_config, app_config, registry);

    match scan.execute(chrono::Utc::now().timestamp_millis()).await {
        Ok((written, metrics)) => {
            println!(
                "scan complete: {} passed, {} failed, manifest={}",
                metrics.candidates_passed,
                metrics.candidates_failed,
                written.manifest_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("scan failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_selftest(config_dir: PathBuf) -> ExitCode {
    match cryptorun_config::load(Some(&config_dir.join("app.yaml"))) {
        Ok(app_config) => match app_config.validate() {
            Ok(()) => {
                println!("selftest passed: config is valid, {} venues registered", build_registry().len());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("selftest failed: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("selftest failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan { exchange, out_dir } => run_scan(cli.config_dir, exchange, out_dir).await,
        Command::Selftest => run_selftest(cli.config_dir),
        Command::Monitor => {
            eprintln!("monitor is a dashboard/WebSocket-server collaborator, out of scope for this core (spec §1)");
            ExitCode::FAILURE
        }
        Command::Digest { date } => {
            eprintln!("digest --date {date} is a report-rendering collaborator, out of scope for this core (spec §1)");
            ExitCode::FAILURE
        }
    }
}
