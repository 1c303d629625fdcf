// # ddns-sync - one-shot Cloudflare DDNS updater
//
// This binary is a THIN integration layer only:
// - DO NOT add reconciliation or DNS logic here (it lives in ddns-core)
// - Configuration is via environment variables ONLY
//
// It is responsible for:
// 1. Initializing logging
// 2. Reading configuration from environment variables
// 3. Building the runtime, the Cloudflare provider and the HTTP IP source
// 4. Running one reconciliation and mapping the result to an exit code
//
// ## Configuration
//
// ### Required
// - `DDNS_CLOUDFLARE_API_TOKEN`: Cloudflare API token
// - `DDNS_CLOUDFLARE_ZONE_NAME`: Zone name (e.g. example.com)
// - `DDNS_CLOUDFLARE_SUBDOMAIN`: Record label within the zone (e.g. home)
// - `DDNS_CLOUDFLARE_COMMENT`: Comment stored on the record
//
// ### Optional
// - `DDNS_PUBLIC_IP_ENDPOINT`: IP-echo URL (default https://ipinfo.io/ip)
// - `DDNS_CLOUDFLARE_API_BASE`: API base URL (default https://api.cloudflare.com/client/v4)
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout, 1-300 (default 30)
// - `DDNS_MODE`: `live` or `dry-run` (default live)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DDNS_CLOUDFLARE_API_TOKEN=your_token
// export DDNS_CLOUDFLARE_ZONE_NAME=example.com
// export DDNS_CLOUDFLARE_SUBDOMAIN=home
// export DDNS_CLOUDFLARE_COMMENT="managed by ddns-sync"
//
// ddns-sync
// ```

use anyhow::{Context, Result};
use ddns_core::{Config, ReconcileOutcome, Reconciler};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const LOG_LEVEL_VAR: &str = "DDNS_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Record created or updated
/// - 1: Configuration or startup error (no DNS call made)
/// - 2: Reconciliation failed
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let (log_level, unknown_level) = parse_log_level(env::var(LOG_LEVEL_VAR).ok().as_deref());

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Some(level) = unknown_level {
        warn!("{} '{}' is not valid, falling back to info", LOG_LEVEL_VAR, level);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    log_parameters(&config);

    let reconciler = match build_reconciler(&config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // One sequential pass; no worker threads needed
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(reconciler.run()) {
        Ok(outcome) => {
            if config.mode.is_dry_run() {
                info!("Dry-run complete, no DNS changes were made");
            }
            log_outcome(&outcome);
            DdnsExitCode::Success.into()
        }
        Err(e) => {
            error!("{}", e);
            DdnsExitCode::RuntimeError.into()
        }
    }
}

fn build_reconciler(config: &Config) -> Result<Reconciler> {
    let provider = CloudflareProvider::new(
        config.api_token.clone(),
        config.api_base.clone(),
        config.http_timeout,
        config.mode.is_dry_run(),
    )
    .context("Failed to create Cloudflare client")?;

    let ip_source = HttpIpSource::new(config.public_ip_endpoint.clone(), config.http_timeout)
        .context("Failed to create public IP source")?;

    Ok(Reconciler::new(
        Box::new(ip_source),
        Box::new(provider),
        config.target(),
    ))
}

fn log_parameters(config: &Config) {
    info!("Running Cloudflare DDNS with the following parameters:");
    info!("- API Token: REDACTED");
    info!("- Zone Name: {}", config.zone_name);
    info!("- Subdomain: {}", config.subdomain);
    info!("- Comment: {}", config.comment);
    info!("- Public IP Endpoint: {}", config.public_ip_endpoint);
    info!("- HTTP Timeout: {:?}", config.http_timeout);
    info!("- Mode: {}", config.mode);
}

fn log_outcome(outcome: &ReconcileOutcome) {
    if let ReconcileOutcome::Updated { previous, record } = outcome {
        if previous.content == record.content {
            info!("Record content was already {}", record.content);
        } else {
            info!("Record content changed: {} -> {}", previous.content, record.content);
        }
    }
}

/// Map `DDNS_LOG_LEVEL` to a tracing level
///
/// Returns the unrecognized value alongside the fallback so it can be
/// reported once logging is up.
fn parse_log_level(value: Option<&str>) -> (Level, Option<String>) {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return (Level::INFO, None);
    };

    match raw.to_lowercase().as_str() {
        "trace" => (Level::TRACE, None),
        "debug" => (Level::DEBUG, None),
        "info" => (Level::INFO, None),
        "warn" => (Level::WARN, None),
        "error" => (Level::ERROR, None),
        _ => (Level::INFO, Some(raw.to_string())),
    }
}
