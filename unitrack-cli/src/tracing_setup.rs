//! Tracing setup for the unitrack CLI
//!
//! Usage:
//!   unitrack --debug ...                # Debug logging to stderr
//!   RUST_LOG=unitrack_db=debug unitrack # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG      # Log filter, wins over everything else
//!   UNITRACK_LOG  # Default level when RUST_LOG is unset (config: logging.level)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Enable debug logging (used unless RUST_LOG is explicitly set)
    pub debug: bool,
    /// Fallback filter directive
    pub level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: "info".to_string(),
        }
    }
}

impl TracingConfig {
    fn filter(&self) -> EnvFilter {
        let fallback = if self.debug { "debug" } else { self.level.as_str() };
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize console tracing on stderr. Stdout stays reserved for JSON output.
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
