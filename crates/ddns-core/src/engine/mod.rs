//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving the configured zone
//! - Discovering the current public IP via IpSource
//! - Looking up the existing address record via DnsProvider
//! - Creating or updating that record so it carries the observed IP
//!
//! ## Flow
//!
//! ```text
//! resolve_zone ──▶ IpSource::current ──▶ list_address_records
//!                                                │
//!                   ┌────────────────────────────┼──────────────────────┐
//!                   ▼                            ▼                      ▼
//!              0 matches                    1 match               2+ matches
//!            create_record              update_record       AmbiguousRecords
//! ```
//!
//! One pass, no retries. Every provider failure aborts the run. A failing IP
//! source does not: its error text becomes the record content (see
//! [`Reconciler::discover_ip`]).

use crate::error::{Error, Result, Stage};
use crate::record::{AddressRecord, RecordChange, RecordTarget};
use crate::traits::{DnsProvider, IpSource};
use tracing::{debug, info, warn};

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No record existed; one was created
    Created {
        /// The record as returned by the provider
        record: AddressRecord,
    },
    /// Exactly one record existed; it was updated in place
    Updated {
        /// The record before the update
        previous: AddressRecord,
        /// The record as returned by the provider
        record: AddressRecord,
    },
}

impl ReconcileOutcome {
    /// The record as it now exists at the provider
    pub fn record(&self) -> &AddressRecord {
        match self {
            ReconcileOutcome::Created { record } => record,
            ReconcileOutcome::Updated { record, .. } => record,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            ReconcileOutcome::Created { .. } => "created",
            ReconcileOutcome::Updated { .. } => "updated",
        }
    }
}

/// Single-record reconciler
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run()`] once
/// 3. Drop
pub struct Reconciler {
    /// IP source for discovering the public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and mutating records
    provider: Box<dyn DnsProvider>,

    /// The record to reconcile
    target: RecordTarget,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `target`: Zone, subdomain and comment of the managed record
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        target: RecordTarget,
    ) -> Self {
        Self {
            ip_source,
            provider,
            target,
        }
    }

    /// Run one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileOutcome)`: Exactly one create or update call succeeded
    /// - `Err(Error)`: The run stopped before or during the single mutation
    pub async fn run(&self) -> Result<ReconcileOutcome> {
        let provider_name = self.provider.provider_name();
        let record_name = self.target.fqdn();

        let zone = self
            .provider
            .resolve_zone(&self.target.zone_name)
            .await
            .map_err(|e| e.during(Stage::ZoneResolution))?;
        debug!("Resolved zone {} to {} via {}", zone.name, zone.id, provider_name);

        let public_ip = self.discover_ip().await;
        info!("Current public IP address is: {}", public_ip);

        info!("Searching existing records...");
        let mut records = self
            .provider
            .list_address_records(&zone, &record_name)
            .await
            .map_err(|e| e.during(Stage::RecordListing))?;

        let outcome = match records.len() {
            0 => {
                info!("Record doesn't exist yet. Will create...");
                let change = RecordChange::create(&record_name, public_ip, &self.target.comment);
                let record = self
                    .provider
                    .create_record(&zone, &change)
                    .await
                    .map_err(|e| e.during(Stage::RecordCreate))?;
                ReconcileOutcome::Created { record }
            }
            1 => {
                let previous = records.remove(0);
                info!(
                    "Found existing record: {} {} -> {}. Will update...",
                    previous.record_type, previous.name, previous.content
                );
                let change = RecordChange::update(&previous, public_ip, &self.target.comment);
                let record = self
                    .provider
                    .update_record(&zone, &previous.id, &change)
                    .await
                    .map_err(|e| e.during(Stage::RecordUpdate))?;
                ReconcileOutcome::Updated { previous, record }
            }
            count => {
                return Err(Error::AmbiguousRecords {
                    name: record_name,
                    count,
                });
            }
        };

        let record = outcome.record();
        info!(
            "Successfully {} record: {} {} -> {}",
            outcome.verb(),
            record.record_type,
            record.name,
            record.content
        );

        Ok(outcome)
    }

    /// Ask the IP source for the current address
    ///
    /// A failure here does not abort the run: the error's text is used as the
    /// observed IP and flows into the create/update call unchanged. For an
    /// `IpSource` error that is the source's own message, without our prefix.
    async fn discover_ip(&self) -> String {
        match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(
                    "Public IP lookup via {} failed, using error text as record content: {}",
                    self.ip_source.describe(),
                    e
                );
                match e {
                    Error::IpSource(message) => message,
                    other => other.to_string(),
                }
            }
        }
    }
}
