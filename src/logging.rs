//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so log output goes to a file. `RUST_LOG`
//! overrides the configured level.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Result;

/// Build the filter: `RUST_LOG` if set, else `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber writing to `log_file`.
///
/// Fails if the file cannot be created or a subscriber is already installed.
pub fn init(log_file: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(log_file)?;
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter(default_level))
        .try_init()
        .map_err(|e| crate::error::BrowserError::Config(format!("logging: {}", e)))
}
