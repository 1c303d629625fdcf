//! DNS record model shared by the reconciler and provider implementations

use serde::{Deserialize, Serialize};

/// DNS record type managed by this system
pub const ADDRESS_RECORD_TYPE: &str = "A";

/// A DNS zone as resolved by the provider
///
/// The id is opaque and only meaningful to the provider that returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-internal zone identifier
    pub id: String,
    /// Human-readable zone name
    pub name: String,
}

/// An address ("A") record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Record type, always `A` for records this system touches
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// Record content (the IP address as text)
    pub content: String,
    /// Optional free-text comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Payload for creating or updating an address record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    /// Record type to write; `A` for new records, unchanged on update
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// New content, written exactly as observed
    pub content: String,
    /// Comment to store; omitted from the payload when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RecordChange {
    /// A brand new `A` record
    pub fn create(name: impl Into<String>, content: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            record_type: ADDRESS_RECORD_TYPE.to_string(),
            name: name.into(),
            content: content.into(),
            comment: Some(comment.into()),
        }
    }

    /// New content and comment for an existing record, keeping its type and name
    pub fn update(existing: &AddressRecord, content: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            record_type: existing.record_type.clone(),
            name: existing.name.clone(),
            content: content.into(),
            comment: Some(comment.into()),
        }
    }

    /// The record that results from applying this change under `id`
    pub fn into_record(self, id: impl Into<String>) -> AddressRecord {
        AddressRecord {
            id: id.into(),
            record_type: self.record_type,
            name: self.name,
            content: self.content,
            comment: self.comment,
        }
    }
}

/// The single record a run is responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    /// Zone the record lives in
    pub zone_name: String,
    /// Label within the zone
    pub subdomain: String,
    /// Comment written onto the record
    pub comment: String,
}

impl RecordTarget {
    /// Create a new record target
    pub fn new(
        zone_name: impl Into<String>,
        subdomain: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            zone_name: zone_name.into(),
            subdomain: subdomain.into(),
            comment: comment.into(),
        }
    }

    /// `<subdomain>.<zone_name>`
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.subdomain, self.zone_name)
    }
}
