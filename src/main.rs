//! consent-guard server binary.
//!
//! ```text
//!   browser widget ──▶ /api/public/*  ─┐
//!   dashboard      ──▶ /api/auth/login ├─▶ throttle ─▶ handler ─▶ login guard / DSAR book
//!   operator CLI   ──▶ /admin/*        ─┘
//!
//!   sweepers (throttle, login_guard) ── tick ──▶ drop expired records
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use consent_guard::config::{load_config, GuardConfig};
use consent_guard::lifecycle::signals::shutdown_signal;
use consent_guard::observability::{logging, metrics};
use consent_guard::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "consent-guard")]
#[command(about = "Consent widget API with request throttling and sign-in lockout")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "CONSENT_GUARD_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("consent-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        app_origin = %config.listener.app_origin,
        rate_limit_enabled = config.rate_limit.enabled,
        max_login_attempts = config.login_guard.max_attempts,
        "Configuration loaded"
    );
    if config.admin.enabled && config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
        tracing::warn!("Admin API is enabled with the placeholder API key");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
