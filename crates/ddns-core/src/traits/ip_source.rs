// # IP Source Trait
//
// Defines the interface for discovering the caller's current public IP.
//
// ## Implementations
//
// - HTTP echo endpoint: `ddns-ip-http` crate
//
// The value is opaque text. Sources do not parse, trim, or validate it; the
// body of the echo endpoint is exactly what ends up in the DNS record.

use async_trait::async_trait;

/// Trait for IP source implementations
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public IP as raw text
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Whatever the source reported, verbatim
    /// - `Err(Error)`: The source could not be reached or read
    async fn current(&self) -> Result<String, crate::Error>;

    /// Short description for logs, e.g. the endpoint URL
    fn describe(&self) -> String;
}
