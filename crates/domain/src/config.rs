//! Configuration structures
//!
//! Plain data; loading lives in the infra layer.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub practice: PracticeConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Legacy practice-management backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeConfig {
    /// Base URL of the practice-management API
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

/// Relational store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Base URL of the relational store REST API
    pub base_url: String,
    /// Optional API key sent in the `x-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

/// Synchronizer defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    /// Whether orphaned sales records are deleted by default
    pub delete_orphaned: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { delete_orphaned: false }
    }
}
