//! Application settings and logging setup.
//!
//! Settings live in `youcoder.json` under the platform config dir (or the
//! `--config-dir` / `YOUCODER_CONFIG_DIR` override). Unknown or missing
//! fields fall back to defaults, so old config files keep loading.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::paths::{self, PathConfig};
use crate::storage::DEFAULT_MAX_RETRIES;

/// Settings file name under the config dir
const SETTINGS_FILE: &str = "youcoder.json";

/// File name of the primary timeline store under the data dir
pub const TIMELINE_STORE_FILE: &str = "timelines.json";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // Persistence
    pub save_max_retries: usize,   // Fallible tiers attempted before memory fallback
    pub persist_debounce_ms: u64,  // Coalescing window for fire-and-forget saves

    // Export
    pub default_export_file: String, // Default CSV file name for --export without a path
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            save_max_retries: DEFAULT_MAX_RETRIES,
            persist_debounce_ms: 500,
            default_export_file: "actions.csv".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable (a broken settings file should never block a session).
    pub fn load(path_config: &PathConfig) -> Self {
        let path = paths::config_file(SETTINGS_FILE, path_config);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Malformed settings at {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to the config dir.
    pub fn save(&self, path_config: &PathConfig) -> Result<()> {
        paths::ensure_dirs(path_config)?;
        let path = paths::config_file(SETTINGS_FILE, path_config);
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Initialize logging from the CLI verbosity count and optional log file.
///
/// Default level is warn; -v: info, -vv: debug, -vvv+: trace. RUST_LOG
/// overrides the flag when set.
pub fn init_logging(verbosity: u8, log_file: Option<PathBuf>) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();

    if let Some(path) = log_file {
        match fs::File::create(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Cannot open log file {}: {} - logging to stderr", path.display(), e);
            }
        }
    }

    // try_init: tests may initialize more than once
    let _ = builder.try_init();
}
