// # Snapshot Resolver Trait
//
// Defines the interface for fetching the live external view of a domain.
//
// ## Implementations
//
// - Fixture resolver (daemon crate): reads snapshot JSON from a directory
// - Real deployments plug in a WHOIS/DNS/TLS prober behind this trait
//
// The probing mechanics (WHOIS text parsing, DNS queries, TLS handshakes)
// are deliberately outside this crate; the engine only sees the structured
// snapshot.

use crate::model::LiveSnapshot;
use async_trait::async_trait;

/// Trait for snapshot resolver implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks; the
/// engine fetches several domains concurrently.
///
/// # Trust Level: Untrusted
///
/// Resolvers are external integrations with strict limitations:
///
/// - Single-shot: one probe per `fetch` call, no internal retry or backoff
///   (timeout and failure policy are owned by the engine)
/// - Stateless: no persistent state between requests
/// - Isolated: no access to the persistence gateway
///
/// ## Unknown vs empty
///
/// A resolver that could not determine a category must return `None` for
/// that category of [`LiveSnapshot`], never an empty collection. An empty
/// answer means "the domain really has nothing there" and will cause the
/// engine to record removals.
#[async_trait]
pub trait SnapshotResolver: Send + Sync {
    /// Fetch the live snapshot for a domain
    ///
    /// # Returns
    ///
    /// - `Ok(LiveSnapshot)`: the structured external view (possibly with
    ///   unknown categories)
    /// - `Err(Error)`: the resolver was unreachable or returned malformed
    ///   data; the engine treats this as a domain-level failure
    async fn fetch(&self, domain_name: &str) -> Result<LiveSnapshot, crate::Error>;

    /// Resolver name for logging/debugging
    fn resolver_name(&self) -> &'static str;
}
