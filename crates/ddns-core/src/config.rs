//! Configuration types for the DDNS reconciler
//!
//! All configuration comes from environment variables and is read exactly once,
//! at startup, into an immutable [`Config`]. Nothing downstream of this module
//! reads the process environment.

use crate::error::{Error, Result};
use crate::record::RecordTarget;
use std::fmt;
use std::time::Duration;

/// Cloudflare API token (required, secret)
pub const API_TOKEN_VAR: &str = "DDNS_CLOUDFLARE_API_TOKEN";
/// Zone to operate on, e.g. `example.com` (required)
pub const ZONE_NAME_VAR: &str = "DDNS_CLOUDFLARE_ZONE_NAME";
/// Label within the zone, e.g. `home` (required)
pub const SUBDOMAIN_VAR: &str = "DDNS_CLOUDFLARE_SUBDOMAIN";
/// Free-text comment stored on the record (required)
pub const COMMENT_VAR: &str = "DDNS_CLOUDFLARE_COMMENT";
/// IP-echo endpoint (optional)
pub const PUBLIC_IP_ENDPOINT_VAR: &str = "DDNS_PUBLIC_IP_ENDPOINT";
/// Cloudflare API base URL (optional)
pub const API_BASE_VAR: &str = "DDNS_CLOUDFLARE_API_BASE";
/// Per-request HTTP timeout in seconds (optional)
pub const HTTP_TIMEOUT_VAR: &str = "DDNS_HTTP_TIMEOUT_SECS";
/// `live` or `dry-run` (optional)
pub const MODE_VAR: &str = "DDNS_MODE";

/// Endpoint used when `DDNS_PUBLIC_IP_ENDPOINT` is unset
pub const DEFAULT_PUBLIC_IP_ENDPOINT: &str = "https://ipinfo.io/ip";
/// Base URL used when `DDNS_CLOUDFLARE_API_BASE` is unset
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Timeout used when `DDNS_HTTP_TIMEOUT_SECS` is unset
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const HTTP_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Whether provider mutations are actually sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Create and update calls are sent to the provider
    #[default]
    Live,
    /// Lookups run, mutations are only logged
    DryRun,
}

impl RunMode {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(Error::config(format!(
                "{} '{}' is not valid. Valid modes: live, dry-run",
                MODE_VAR, other
            ))),
        }
    }

    /// Returns true in dry-run mode
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => f.write_str("LIVE"),
            RunMode::DryRun => f.write_str("DRY-RUN"),
        }
    }
}

/// Immutable runtime configuration
#[derive(Clone)]
pub struct Config {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Human-readable zone name
    pub zone_name: String,

    /// Hostname label within the zone
    pub subdomain: String,

    /// Comment written onto the record
    pub comment: String,

    /// Source of the observed public IP
    pub public_ip_endpoint: String,

    /// Cloudflare API base URL, without a trailing slash
    pub api_base: String,

    /// Timeout applied to every outbound request
    pub http_timeout: Duration,

    /// Live or dry-run
    pub mode: RunMode,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("subdomain", &self.subdomain)
            .field("comment", &self.comment)
            .field("public_ip_endpoint", &self.public_ip_endpoint)
            .field("api_base", &self.api_base)
            .field("http_timeout", &self.http_timeout)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated exactly like unset ones. Required variables are
    /// checked in a fixed order (token, zone, subdomain, comment) and the first
    /// missing one is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| {
                Error::config(format!(
                    "Expected environment variable {} not found or not set",
                    name
                ))
            })
        };

        let api_token = required(API_TOKEN_VAR)?;
        let zone_name = required(ZONE_NAME_VAR)?;
        let subdomain = required(SUBDOMAIN_VAR)?;
        let comment = required(COMMENT_VAR)?;

        let public_ip_endpoint = get(PUBLIC_IP_ENDPOINT_VAR)
            .unwrap_or_else(|| DEFAULT_PUBLIC_IP_ENDPOINT.to_string());
        validate_url(PUBLIC_IP_ENDPOINT_VAR, &public_ip_endpoint)?;

        let api_base = get(API_BASE_VAR)
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        validate_url(API_BASE_VAR, &api_base)?;

        let http_timeout = match get(HTTP_TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::config(format!(
                        "{} must be a whole number of seconds. Got: {}",
                        HTTP_TIMEOUT_VAR, raw
                    ))
                })?;
                if !HTTP_TIMEOUT_RANGE.contains(&secs) {
                    return Err(Error::config(format!(
                        "{} must be between 1 and 300 seconds. Got: {}",
                        HTTP_TIMEOUT_VAR, secs
                    )));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let mode = match get(MODE_VAR) {
            Some(raw) => RunMode::parse(&raw)?,
            None => RunMode::default(),
        };

        Ok(Self {
            api_token,
            zone_name,
            subdomain,
            comment,
            public_ip_endpoint,
            api_base,
            http_timeout,
            mode,
        })
    }

    /// The record this configuration reconciles
    pub fn target(&self) -> RecordTarget {
        RecordTarget::new(&self.zone_name, &self.subdomain, &self.comment)
    }
}

fn validate_url(var: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            var, url
        )));
    }

    if url.starts_with("http://") {
        tracing::warn!("{} uses HTTP (not HTTPS): {}", var, url);
    }

    Ok(())
}
