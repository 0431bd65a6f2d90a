//! Configuration types for the reconciliation engine
//!
//! Configuration is always an explicit struct constructed once at startup
//! and passed into the engine and resolver constructors. Engine logic never
//! reads ambient global state.

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainwatchConfig {
    /// Resolver backend selection
    pub resolver: ResolverConfig,

    /// Persistence gateway backend selection
    pub gateway: GatewayConfig,

    /// Engine tuning knobs
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DomainwatchConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            gateway: GatewayConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.gateway.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

impl Default for DomainwatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolver backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Fixture resolver reading snapshot JSON files from a directory
    Fixture {
        /// Directory holding `<domain>.json` snapshot files
        dir: String,
    },

    /// Custom resolver injected by the embedding application
    Custom {
        /// Identifier for logs
        name: String,
        /// Backend-specific configuration data
        config: serde_json::Value,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Fixture { dir } => {
                if dir.is_empty() {
                    return Err(crate::Error::config("fixture resolver dir cannot be empty"));
                }
                Ok(())
            }
            ResolverConfig::Custom { name, .. } => {
                if name.is_empty() {
                    return Err(crate::Error::config("custom resolver name cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Fixture {
            dir: String::new(),
        }
    }
}

/// Persistence gateway backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayConfig {
    /// File-backed gateway (JSON snapshot with atomic writes)
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory gateway (not persistent)
    #[default]
    Memory,
}

impl GatewayConfig {
    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GatewayConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("file gateway path cannot be empty"));
                }
                Ok(())
            }
            GatewayConfig::Memory => Ok(()),
        }
    }
}

/// Engine tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Day-granularity tolerance for expiry date drift
    ///
    /// Re-fetching WHOIS data across registrars produces timezone and
    /// representation jitter of a few days; only drift beyond this many
    /// days is treated as a real renewal or change.
    #[serde(default = "default_expiry_tolerance_days")]
    pub expiry_tolerance_days: i64,

    /// Per-domain snapshot fetch timeout, in seconds
    ///
    /// A timed-out fetch is a fetch failure for that domain only.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of domains reconciled concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log. This bounds
    /// memory growth when no consumer is attached.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.expiry_tolerance_days < 0 {
            return Err(crate::Error::config("expiry_tolerance_days must be >= 0"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(crate::Error::config("fetch_timeout_secs must be > 0"));
        }
        if self.concurrency == 0 {
            return Err(crate::Error::config("concurrency must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expiry_tolerance_days: default_expiry_tolerance_days(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            concurrency: default_concurrency(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_expiry_tolerance_days() -> i64 {
    7
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().expiry_tolerance_days, 7);
    }

    #[test]
    fn zero_concurrency_rejected() {
        let cfg = EngineConfig {
            concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_file_gateway_path_rejected() {
        let cfg = GatewayConfig::File {
            path: String::new(),
        };
        assert!(cfg.validate().is_err());
    }
}
