//! External boundaries of the reconciliation engine
//!
//! This module defines the abstract interfaces the engine consumes.
//!
//! - [`SnapshotResolver`]: fetch the live external view of a domain
//! - [`DomainGateway`]: read/write contract of the persistence layer

pub mod gateway;
pub mod resolver;

pub use gateway::DomainGateway;
pub use resolver::SnapshotResolver;
