//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TALLYSYNC_PRACTICE_URL`: Practice-management API base URL (required)
//! - `TALLYSYNC_PRACTICE_TIMEOUT`: Request timeout in seconds
//! - `TALLYSYNC_PRACTICE_RETRIES`: Maximum request attempts
//! - `TALLYSYNC_STORE_URL`: Relational store API base URL (required)
//! - `TALLYSYNC_STORE_API_KEY`: Store API key (optional)
//! - `TALLYSYNC_STORE_TIMEOUT`: Request timeout in seconds
//! - `TALLYSYNC_STORE_RETRIES`: Maximum request attempts
//! - `TALLYSYNC_DELETE_ORPHANED`: Delete orphaned sales rows by default
//!   (true/false, defaults to false)

use std::path::{Path, PathBuf};

use tallysync_domain::{
    Config, PracticeConfig, Result, StoreConfig, SyncSettings, TallySyncError,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: usize = 3;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TallySyncError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The two base-URL variables are required; timeouts, retry counts, and the
/// orphan-deletion default fall back to built-in values.
///
/// # Errors
/// Returns `TallySyncError::Config` if a required variable is missing or a
/// numeric variable fails to parse.
pub fn load_from_env() -> Result<Config> {
    let practice_url = env_var("TALLYSYNC_PRACTICE_URL")?;
    let practice_timeout = env_u64("TALLYSYNC_PRACTICE_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
    let practice_retries = env_usize("TALLYSYNC_PRACTICE_RETRIES", DEFAULT_MAX_RETRIES)?;

    let store_url = env_var("TALLYSYNC_STORE_URL")?;
    let store_api_key = std::env::var("TALLYSYNC_STORE_API_KEY").ok();
    let store_timeout = env_u64("TALLYSYNC_STORE_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
    let store_retries = env_usize("TALLYSYNC_STORE_RETRIES", DEFAULT_MAX_RETRIES)?;

    let delete_orphaned = env_bool("TALLYSYNC_DELETE_ORPHANED", false);

    Ok(Config {
        practice: PracticeConfig {
            base_url: practice_url,
            timeout_secs: practice_timeout,
            max_retries: practice_retries,
        },
        store: StoreConfig {
            base_url: store_url,
            api_key: store_api_key,
            timeout_secs: store_timeout,
            max_retries: store_retries,
        },
        sync: SyncSettings { delete_orphaned },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TallySyncError::Config` if no file is found, the format is
/// invalid, or required fields are missing.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TallySyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TallySyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TallySyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TallySyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TallySyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TallySyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory (and up to two parents), then the
/// executable's directory, for `config.{json,toml}` or
/// `tallysync.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.json", "config.toml", "tallysync.json", "tallysync.toml"];
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for prefix in ["", "../", "../../"] {
            candidates.extend(names.iter().map(|name| cwd.join(format!("{prefix}{name}"))));
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(names.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TallySyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| TallySyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map_err(|e| TallySyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
