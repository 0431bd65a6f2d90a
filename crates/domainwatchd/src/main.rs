// # domainwatchd - Domain Reconciliation Daemon
//
// Thin integration layer over domainwatch-core. The daemon is responsible
// for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and tracing
// 3. Wiring a resolver and a gateway into the engine
// 4. Running reconciliation once, or on an interval
//
// All reconciliation logic lives in domainwatch-core; nothing here
// compares, records, or notifies.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Resolver
// - `DW_RESOLVER_DIR`: Directory of `<domain>.json` snapshot fixtures
//
// ### Gateway
// - `DW_GATEWAY_TYPE`: Type of gateway (file, memory; default memory)
// - `DW_GATEWAY_PATH`: Path to state file (for file gateway)
//
// ### Engine
// - `DW_EXPIRY_TOLERANCE_DAYS`: Expiry drift tolerance in days
// - `DW_CONCURRENCY`: Max domains reconciled concurrently
// - `DW_FETCH_TIMEOUT_SECS`: Per-domain fetch timeout
//
// ### Daemon
// - `DW_INTERVAL_SECS`: Seconds between runs; 0 runs once and exits
// - `DW_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DW_RESOLVER_DIR=/var/lib/domainwatch/snapshots
// export DW_GATEWAY_TYPE=file
// export DW_GATEWAY_PATH=/var/lib/domainwatch/state.json
// export DW_INTERVAL_SECS=3600
//
// domainwatchd
// ```

mod fixture;

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use domainwatch_core::{
    DomainGateway, EngineConfig, EngineEvent, FileGateway, MemoryGateway, ReconcileEngine,
    SnapshotResolver,
};
use fixture::FixtureResolver;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    resolver_dir: String,
    gateway_type: String,
    gateway_path: Option<String>,
    expiry_tolerance_days: Option<i64>,
    concurrency: Option<usize>,
    fetch_timeout_secs: Option<u64>,
    interval_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            resolver_dir: env::var("DW_RESOLVER_DIR").unwrap_or_default(),
            gateway_type: env::var("DW_GATEWAY_TYPE").unwrap_or_else(|_| "memory".to_string()),
            gateway_path: env::var("DW_GATEWAY_PATH").ok(),
            expiry_tolerance_days: env::var("DW_EXPIRY_TOLERANCE_DAYS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("DW_EXPIRY_TOLERANCE_DAYS is not a number: {e}"))?,
            concurrency: env::var("DW_CONCURRENCY")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("DW_CONCURRENCY is not a number: {e}"))?,
            fetch_timeout_secs: env::var("DW_FETCH_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("DW_FETCH_TIMEOUT_SECS is not a number: {e}"))?,
            interval_secs: env::var("DW_INTERVAL_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("DW_INTERVAL_SECS is not a number: {e}"))?
                .unwrap_or(0),
            log_level: env::var("DW_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.resolver_dir.is_empty() {
            anyhow::bail!(
                "DW_RESOLVER_DIR is required. \
                Set it via: export DW_RESOLVER_DIR=/var/lib/domainwatch/snapshots"
            );
        }

        if !std::path::Path::new(&self.resolver_dir).is_dir() {
            anyhow::bail!(
                "DW_RESOLVER_DIR is not a directory: {}",
                self.resolver_dir
            );
        }

        match self.gateway_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "DW_GATEWAY_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.gateway_type
            ),
        }

        if self.gateway_type == "file" {
            match self.gateway_path.as_deref() {
                None | Some("") => anyhow::bail!(
                    "DW_GATEWAY_PATH is required when DW_GATEWAY_TYPE=file. \
                    Set it via: export DW_GATEWAY_PATH=/var/lib/domainwatch/state.json"
                ),
                Some(path) => {
                    if let Some(parent) = std::path::Path::new(path).parent()
                        && !parent.as_os_str().is_empty()
                        && !parent.exists()
                    {
                        anyhow::bail!(
                            "DW_GATEWAY_PATH parent directory does not exist: {}. \
                            Create it first: mkdir -p {}",
                            parent.display(),
                            parent.display()
                        );
                    }
                }
            }
        }

        if let Some(tolerance) = self.expiry_tolerance_days
            && tolerance < 0
        {
            anyhow::bail!(
                "DW_EXPIRY_TOLERANCE_DAYS must be >= 0. Got: {}",
                tolerance
            );
        }

        if let Some(concurrency) = self.concurrency
            && !(1..=64).contains(&concurrency)
        {
            anyhow::bail!(
                "DW_CONCURRENCY must be between 1 and 64. Got: {}",
                concurrency
            );
        }

        if let Some(timeout) = self.fetch_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "DW_FETCH_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        if self.interval_secs != 0 && !(10..=86400).contains(&self.interval_secs) {
            anyhow::bail!(
                "DW_INTERVAL_SECS must be 0 (run once) or between 10 and 86400. Got: {}",
                self.interval_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DW_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Engine configuration with daemon overrides applied
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(tolerance) = self.expiry_tolerance_days {
            config.expiry_tolerance_days = tolerance;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.fetch_timeout_secs {
            config.fetch_timeout_secs = timeout;
        }
        config
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting domainwatchd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let resolver: Arc<dyn SnapshotResolver> =
        Arc::new(FixtureResolver::new(config.resolver_dir.clone()));

    let gateway: Arc<dyn DomainGateway> = match config.gateway_type.as_str() {
        "file" => {
            // Validated above; the path is present for the file gateway.
            let path = config.gateway_path.clone().unwrap_or_default();
            info!("Using file gateway at {}", path);
            Arc::new(FileGateway::new(path).await?)
        }
        _ => {
            info!("Using memory gateway (state is not persisted)");
            Arc::new(MemoryGateway::new())
        }
    };

    let (engine, event_rx) =
        ReconcileEngine::new(resolver, gateway, config.engine_config())?;

    // Forward engine events into the log
    tokio::spawn(log_engine_events(event_rx));

    if config.interval_secs == 0 {
        // One-shot mode: run, print the summary, exit.
        let summary = engine.run_once().await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    info!(
        "Reconciling every {} second(s); send SIGTERM or SIGINT to stop",
        config.interval_secs
    );

    let abort = engine.abort_handle();
    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match engine.run_once().await {
                    Ok(summary) => info!("{}", summary.note),
                    Err(e) => error!("Reconciliation run failed: {}", e),
                }
            }
            signal_name = wait_for_shutdown() => {
                info!("Received shutdown signal: {}", signal_name?);
                abort.abort();
                break;
            }
        }
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Log engine events as they arrive
async fn log_engine_events(mut event_rx: tokio::sync::mpsc::Receiver<EngineEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            EngineEvent::RunStarted { domains_count } => {
                info!(domains = domains_count, "run started");
            }
            EngineEvent::ChangeDetected {
                domain_name,
                description,
            } => {
                info!(domain = %domain_name, "{}", description);
            }
            EngineEvent::DomainCompleted {
                domain_name,
                changes_count,
            } => {
                info!(domain = %domain_name, changes = changes_count, "domain reconciled");
            }
            EngineEvent::DomainFailed { domain_name, error } => {
                warn!(domain = %domain_name, "domain failed: {}", error);
            }
            EngineEvent::RunCompleted {
                domains_count,
                changes_count,
                failures_count,
            } => {
                info!(
                    domains = domains_count,
                    changes = changes_count,
                    failures = failures_count,
                    "run completed"
                );
            }
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
