// # Fixture Resolver
//
// A SnapshotResolver that reads pre-captured snapshots from disk.
//
// Each tracked domain gets one JSON file named `<domain>.json` in the
// fixture directory, holding a serialized LiveSnapshot. Useful for
// smoke-testing a deployment, replaying captured probe output, and
// feeding the daemon from an external capture pipeline.

use async_trait::async_trait;
use std::path::PathBuf;

use domainwatch_core::error::Result;
use domainwatch_core::model::LiveSnapshot;
use domainwatch_core::{Error, SnapshotResolver};

/// Resolver backed by `<domain>.json` files in a directory
pub struct FixtureResolver {
    dir: PathBuf,
}

impl FixtureResolver {
    /// Create a resolver reading from the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SnapshotResolver for FixtureResolver {
    async fn fetch(&self, domain_name: &str) -> Result<LiveSnapshot> {
        let path = self.dir.join(format!("{domain_name}.json"));

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::resolver(format!("no fixture for {domain_name} at {}: {e}", path.display()))
        })?;

        let mut snapshot: LiveSnapshot = serde_json::from_str(&raw).map_err(|e| {
            Error::resolver(format!("invalid fixture for {domain_name}: {e}"))
        })?;

        // The filename is authoritative; fixtures often omit the name.
        if snapshot.domain_name.is_empty() {
            snapshot.domain_name = domain_name.to_string();
        }

        Ok(snapshot)
    }

    fn resolver_name(&self) -> &'static str {
        "fixture"
    }
}
