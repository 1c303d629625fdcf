//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles record every call so tests can assert not only on the outcome
//! but on exactly which provider operations were (and were not) invoked.

#![allow(dead_code)]

use ddns_core::error::{Error, Result, Stage};
use ddns_core::traits::{DnsProvider, IpSource};
use ddns_core::{AddressRecord, RecordChange, RecordTarget, Zone};
use std::sync::{Arc, Mutex};

pub const ZONE_NAME: &str = "example.com";
pub const ZONE_ID: &str = "zone-123";
pub const SUBDOMAIN: &str = "home";
pub const FQDN: &str = "home.example.com";
pub const COMMENT: &str = "managed by ddns-sync";

/// A provider call as observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ResolveZone(String),
    List {
        zone_id: String,
        record_name: String,
    },
    Create {
        zone_id: String,
        change: RecordChange,
    },
    Update {
        zone_id: String,
        record_id: String,
        change: RecordChange,
    },
}

/// A mock DnsProvider that serves canned records and tracks calls
pub struct MockDnsProvider {
    /// Records returned by list_address_records()
    existing: Vec<AddressRecord>,
    /// Step at which every call fails, if any
    fail_at: Option<Stage>,
    /// Recorded calls, shared between clones made via sharing_calls_with()
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockDnsProvider {
    pub fn new(existing: Vec<AddressRecord>) -> Self {
        Self {
            existing,
            fail_at: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the provider fail at the given step
    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Create a new MockDnsProvider that shares canned data and call log with an existing one
    pub fn sharing_calls_with(other: &Self) -> Self {
        Self {
            existing: other.existing.clone(),
            fail_at: other.fail_at,
            calls: Arc::clone(&other.calls),
        }
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<RecordChange> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Create { change, .. } => Some(change),
                _ => None,
            })
            .collect()
    }

    pub fn update_calls(&self) -> Vec<(String, RecordChange)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Update {
                    record_id, change, ..
                } => Some((record_id, change)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, stage: Stage) -> Result<()> {
        if self.fail_at == Some(stage) {
            Err(Error::provider("mock", format!("{} rejected", stage)))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, zone_name: &str) -> Result<Zone> {
        self.record(ProviderCall::ResolveZone(zone_name.to_string()));
        self.check(Stage::ZoneResolution)?;
        Ok(Zone {
            id: ZONE_ID.to_string(),
            name: zone_name.to_string(),
        })
    }

    async fn list_address_records(
        &self,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>> {
        self.record(ProviderCall::List {
            zone_id: zone.id.clone(),
            record_name: record_name.to_string(),
        });
        self.check(Stage::RecordListing)?;
        Ok(self.existing.clone())
    }

    async fn create_record(&self, zone: &Zone, change: &RecordChange) -> Result<AddressRecord> {
        self.record(ProviderCall::Create {
            zone_id: zone.id.clone(),
            change: change.clone(),
        });
        self.check(Stage::RecordCreate)?;
        Ok(change.clone().into_record("created-id"))
    }

    async fn update_record(
        &self,
        zone: &Zone,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<AddressRecord> {
        self.record(ProviderCall::Update {
            zone_id: zone.id.clone(),
            record_id: record_id.to_string(),
            change: change.clone(),
        });
        self.check(Stage::RecordUpdate)?;
        Ok(change.clone().into_record(record_id))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IP source that always reports the same text
pub struct StaticIpSource {
    ip: String,
}

impl StaticIpSource {
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into() }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<String> {
        Ok(self.ip.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// An IP source whose transport always fails
pub struct FailingIpSource {
    message: String,
}

impl FailingIpSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn current(&self) -> Result<String> {
        Err(Error::ip_source(self.message.clone()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// An existing `A` record for the test target
pub fn existing_record(id: &str, content: &str) -> AddressRecord {
    AddressRecord {
        id: id.to_string(),
        record_type: "A".to_string(),
        name: FQDN.to_string(),
        content: content.to_string(),
        comment: Some("old comment".to_string()),
    }
}

/// The target used by all contract tests
pub fn target() -> RecordTarget {
    RecordTarget::new(ZONE_NAME, SUBDOMAIN, COMMENT)
}
