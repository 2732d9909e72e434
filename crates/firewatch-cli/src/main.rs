//! `firewatch` – hazard-monitoring collector daemon.
//!
//! Polls a remote sensor store on a fixed interval, derives a hazard level
//! per room (thresholds + escalation vote, with a predictive-model
//! override), and writes levels and location alarms back to the store.
//!
//! Startup order:
//!
//! 1. Initialise tracing (console by default; `FIREWATCH_LOG_FORMAT=json`
//!    for JSON; `OTEL_EXPORTER_OTLP_ENDPOINT` for span export).
//! 2. Load `~/.firewatch/config.toml` (defaults when absent) and apply
//!    `FIREWATCH_*` env overrides.
//! 3. Load the risk-model artifacts — **fatal** when missing or malformed:
//!    the process exits immediately rather than starting degraded.
//! 4. Spawn the liveness endpoint, install the Ctrl-C handler, and run the
//!    collector loop until shut down.

mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tracing::{error, info, warn};

use firewatch_model::ForestClassifier;
use firewatch_runtime::Collector;
use firewatch_runtime::telemetry;
use firewatch_status::StatusServer;
use firewatch_store::RtdbClient;

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = telemetry::init_tracing("firewatch");

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            info!("no config file found; using defaults with env overrides");
            let mut cfg = config::CollectorConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::CollectorConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    info!(
        store_url = %cfg.store_url,
        poll_interval_secs = cfg.poll_interval_secs,
        status_port = cfg.status_port,
        "starting firewatch collector"
    );

    // ── Risk model (fatal when absent) ────────────────────────────────────
    let classifier = match ForestClassifier::load(&cfg.forest_path(), &cfg.scaler_path()) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            error!(error = %e, "risk-model artifacts missing or malformed; refusing to start");
            println!(
                "{} {}",
                "✗ Cannot start:".red().bold(),
                "risk-model artifacts are required (see model_dir in config)."
            );
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(RtdbClient::new(cfg.store_url.clone()));

    // ── Liveness endpoint ─────────────────────────────────────────────────
    let status = StatusServer::new().with_port(cfg.status_port);
    tokio::spawn(async move {
        if let Err(e) = status.run().await {
            error!(error = %e, "status endpoint failed");
        }
    });

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!(
                "{}",
                "⚠  Ctrl-C received – finishing current cycle …"
                    .yellow()
                    .bold()
            );
            flag.store(true, Ordering::SeqCst);
        }) {
            warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown unavailable");
        }
    }

    // ── Collector loop ────────────────────────────────────────────────────
    let collector = Collector::new(
        store,
        classifier,
        Duration::from_secs(cfg.poll_interval_secs),
    )
    .with_shutdown(shutdown);

    collector.run().await;

    println!("{}", "  ✓ Collector stopped cleanly.".green());
    ExitCode::SUCCESS
}

fn print_banner() {
    println!();
    println!("  {}", "firewatch".bold());
    println!("  {}", "room hazard monitoring collector".dimmed());
    println!();
}
