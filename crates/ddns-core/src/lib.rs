// # ddns-core
//
// Core library for the Cloudflare dynamic DNS reconciler.
//
// ## Architecture Overview
//
// This library provides everything except network I/O:
// - **Config**: Immutable configuration loaded once from the environment
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for reading and mutating address records
// - **Reconciler**: Zero/one/many branch that creates or updates the record
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Library-First**: The reconciler can be driven with any provider/source
// 3. **Fail Closed**: Ambiguous state is never resolved by guessing
// 4. **No Hidden Exits**: Errors propagate to the caller, which owns the exit code

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider};
pub use engine::{Reconciler, ReconcileOutcome};
pub use config::{Config, RunMode};
pub use error::{Error, Result, Stage};
pub use record::{AddressRecord, RecordChange, RecordTarget, Zone, ADDRESS_RECORD_TYPE};
