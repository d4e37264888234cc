//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--url`, `--timeout`, `--mouse`, etc.), then the `--config` file
//! 2. `$RFB_CONFIG` environment variable (path to config file)
//! 3. Project-local `.rfb.toml` in the current working directory
//! 4. Global `~/.config/rfb/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::browser::model::{SortColumn, SortDirection, ViewMode};
use crate::browser::sort_view::SortViewState;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Folder shown on startup (overridden by CLI positional arg).
    pub start_path: Option<String>,
    /// Confirm before delete operations.
    pub confirm_delete: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Listing service connection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Listing pane settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListingConfig {
    /// Sort column: "name", "size", "date".
    pub sort_by: Option<String>,
    /// Sort order: "asc", "desc".
    pub sort_order: Option<String>,
    /// Presentation: "grid", "list", "compact".
    pub view_mode: Option<String>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path.
    pub file: Option<String>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub service: ServiceConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default listing service URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. $RFB_CONFIG environment variable
    if let Ok(env_path) = std::env::var("RFB_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. Project-local `.rfb.toml` in CWD
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".rfb.toml"));
    }

    // 3. Global `~/.config/rfb/config.toml`
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("rfb").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            // Logging may not be up yet, so warn on stderr too.
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            warn!(path = %path.display(), error = %e, "failed to parse config file");
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: other
                    .general
                    .start_path
                    .clone()
                    .or(self.general.start_path),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            service: ServiceConfig {
                base_url: other.service.base_url.clone().or(self.service.base_url),
                timeout_secs: other.service.timeout_secs.or(self.service.timeout_secs),
            },
            listing: ListingConfig {
                sort_by: other.listing.sort_by.clone().or(self.listing.sort_by),
                sort_order: other.listing.sort_order.clone().or(self.listing.sort_order),
                view_mode: other.listing.view_mode.clone().or(self.listing.view_mode),
            },
            logging: LoggingConfig {
                file: other.logging.file.clone().or(self.logging.file),
                level: other.logging.level.clone().or(self.logging.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn start_path(&self) -> Option<&str> {
        self.general.start_path.as_deref()
    }

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(false)
    }

    pub fn base_url(&self) -> &str {
        self.service.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn sort_column(&self) -> SortColumn {
        SortColumn::from_str(self.listing.sort_by.as_deref().unwrap_or("name"))
    }

    pub fn sort_direction(&self) -> SortDirection {
        SortDirection::from_str(self.listing.sort_order.as_deref().unwrap_or("asc"))
    }

    pub fn view_mode(&self) -> ViewMode {
        ViewMode::from_str(self.listing.view_mode.as_deref().unwrap_or("list"))
    }

    /// Initial sort/view state for the listing pane.
    pub fn sort_view_state(&self) -> SortViewState {
        SortViewState::new(self.sort_column(), self.sort_direction(), self.view_mode())
    }

    /// Log file path: configured, or `<data dir>/rfb/rfb.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        match &self.logging.file {
            Some(file) => Some(PathBuf::from(file)),
            None => dirs::data_dir().map(|d| d.join("rfb").join("rfb.log")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
