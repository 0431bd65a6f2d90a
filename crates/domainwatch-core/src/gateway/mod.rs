//! Persistence gateway implementations
//!
//! Two gateways ship with the engine:
//!
//! - [`MemoryGateway`]: fast, non-persistent; for tests and embedders
//!   that bring their own durability
//! - [`FileGateway`]: JSON file with atomic write-then-rename persistence
//!   and corruption fallback
//!
//! Both share the same in-memory [`store::StoreState`] and differ only in
//! durability.

mod store;

pub mod file;
pub mod memory;

pub use file::FileGateway;
pub use memory::MemoryGateway;
