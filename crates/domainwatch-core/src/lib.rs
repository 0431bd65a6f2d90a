// # domainwatch-core
//
// Core library for the domain data reconciliation engine.
//
// ## Architecture Overview
//
// This library periodically re-fetches live signals for tracked domains
// (expiry date, registrar, EPP statuses, WHOIS contact, SSL certificate,
// DNS records) and reconciles them against stored state, producing an
// append-only change log and preference-gated notifications.
//
// - **SnapshotResolver**: trait for fetching the live view of a domain
// - **DomainGateway**: trait for the persistence read/write contract
// - **compare**: six pure field comparators, one per category
// - **HistoryRecorder** / **NotificationDispatcher**: audit and notify
// - **DomainReconciler**: per-domain orchestration with category-level
//   failure isolation
// - **ReconcileEngine**: batch orchestration with domain-level failure
//   isolation and bounded concurrency
//
// ## Design Principles
//
// 1. **Separation of Concerns**: probing and storage transports live
//    behind traits; the engine owns all reconciliation policy
// 2. **Audit before state**: a stored field changes only together with
//    its change event, never without
// 3. **Failure isolation**: one category's failure never stops its
//    siblings; one domain's failure never stops the batch
// 4. **Idempotency**: re-running against an unchanged snapshot records
//    nothing

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod history;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod traits;

// Re-export core types for convenience
pub use config::{DomainwatchConfig, EngineConfig, GatewayConfig, ResolverConfig};
pub use engine::{AbortHandle, DomainReconciler, EngineEvent, ReconcileEngine};
pub use error::{Error, Result};
pub use gateway::{FileGateway, MemoryGateway};
pub use history::{HistoryRecorder, RecordedChange};
pub use model::{
    Category, CategoryKind, ChangeEvent, DnsEntry, DnsSnapshot, DomainRecord, DomainReport,
    LiveSnapshot, Notification, NotificationPreference, Registrar, RunSummary, SslCertificate,
    SslField, WhoisContact, WhoisField,
};
pub use notify::NotificationDispatcher;
pub use traits::{DomainGateway, SnapshotResolver};
