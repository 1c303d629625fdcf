//! Core traits for the DDNS reconciler
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Read and mutate address records via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::DnsProvider;
