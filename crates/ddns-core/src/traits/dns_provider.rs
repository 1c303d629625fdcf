// # DNS Provider Trait
//
// Defines the narrow interface the reconciler needs from a DNS provider:
// resolve a zone, list address records, create one, update one.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordChange};
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zone = provider.resolve_zone("example.com").await?;
//     let records = provider.list_address_records(&zone, "home.example.com").await?;
//     if records.is_empty() {
//         let change = RecordChange::create("home.example.com", "203.0.113.5", "ddns");
//         provider.create_record(&zone, &change).await?;
//     }
//
//     Ok(())
// }
// ```

use crate::record::{AddressRecord, RecordChange, Zone};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Implementations must be usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// DNS providers are **untrusted** components with strict limitations:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide which record to mutate (owned by `Reconciler`)
/// - ❌ Cache state beyond single request
///
/// Every method performs the provider call(s) for one step and reports the
/// outcome; the reconciler tags failures with the step they belong to.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Translate a zone name into the provider's zone
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: Exactly one zone matched
    /// - `Err(Error)`: Zone not found, ambiguous, or the request failed
    async fn resolve_zone(&self, zone_name: &str) -> Result<Zone, crate::Error>;

    /// List `A` records in `zone` whose name is exactly `record_name`
    ///
    /// Filtering happens on the provider side.
    async fn list_address_records(
        &self,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>, crate::Error>;

    /// Create a new record in `zone`
    async fn create_record(
        &self,
        zone: &Zone,
        change: &RecordChange,
    ) -> Result<AddressRecord, crate::Error>;

    /// Replace content and comment of the record identified by `record_id`
    async fn update_record(
        &self,
        zone: &Zone,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<AddressRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
