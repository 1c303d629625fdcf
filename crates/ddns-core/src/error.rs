//! Error types for the DDNS reconciler
//!
//! This module defines all error types used throughout the workspace.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Step of a reconciliation run that talks to the DNS provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Translating the zone name into the provider's zone identifier
    ZoneResolution,
    /// Listing existing address records for the target name
    RecordListing,
    /// Creating a new address record
    RecordCreate,
    /// Updating the single existing address record
    RecordUpdate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ZoneResolution => "Zone resolution",
            Stage::RecordListing => "Record listing",
            Stage::RecordCreate => "Record creation",
            Stage::RecordUpdate => "Record update",
        };
        f.write_str(name)
    }
}

/// Core error type for the DDNS reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or malformed environment variables)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors (rejected or empty credential)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// IP discovery errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// HTTP transport or client construction errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// More than one address record matches the target name
    #[error("Found {count} A records named {name}; refusing to guess which one to update")]
    AmbiguousRecords {
        /// Fully qualified record name that was searched
        name: String,
        /// Number of matching records
        count: usize,
    },

    /// A provider failure, tagged with the reconciliation step it occurred in
    #[error("{stage} failed: {source}")]
    Stage {
        /// Step that failed
        stage: Stage,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Tag this error with the reconciliation step it occurred in
    pub fn during(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The reconciliation step this error was raised in, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the error originated from configuration loading
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
