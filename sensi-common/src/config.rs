//! Configuration management for Sensi services.
//!
//! The API server and the CLI share one configuration file at
//! `~/.sensi/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (SENSI_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SENSI_BIND_ADDRESS` → network.bind
//! - `SENSI_PORT` → server.port
//! - `SENSI_LOG_LEVEL` → observability.log_level
//! - `SENSI_LOG_FORMAT` → observability.log_format
//! - `SENSI_PRESETS_PATH` → presets.path
//! - `SENSI_DEVICE_CACHE_PATH` → devices.cache_path
//! - `SENSI_LLM_BASE_URL` → llm.base_url
//! - `SENSI_LLM_MODEL` → llm.model
//! - `SENSI_LLM_API_KEY` (fallback `OPENAI_API_KEY`) → llm.api_key

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".sensi"),
        |dirs| dirs.home_dir().join(".sensi"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Expand `~` and `$VARS` in a configured path.
///
/// Falls back to the raw string when expansion fails (undefined variable).
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}

// ============================================================================
// Network / Server
// ============================================================================

/// Network configuration.
///
/// Default bind is `127.0.0.1` (local only). Set to `0.0.0.0` for remote access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds (covers the device lookup AI call)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_port() -> u16 {
    4460
}

fn default_request_timeout() -> u64 {
    45
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Presets / Devices
// ============================================================================

/// Preset store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetsConfig {
    /// Path of the presets JSON file (default: `~/.sensi/presets.json`)
    #[serde(default)]
    pub path: Option<String>,
}

/// Device lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    /// Path of the device cache JSON file (default: `~/.sensi/devices.json`)
    #[serde(default)]
    pub cache_path: Option<String>,

    /// Minimum similarity ratio (0, 1] for a fuzzy cache hit
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f32,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            fuzzy_cutoff: default_fuzzy_cutoff(),
        }
    }
}

fn default_fuzzy_cutoff() -> f32 {
    0.75
}

/// Completion provider used for device lookups that miss the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible base URL (without `/v1/...`)
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_llm_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            max_retries: default_llm_retries(),
        }
    }
}

impl LlmConfig {
    /// Whether lookups may fall through to the completion provider.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".into()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_llm_retries() -> u32 {
    1
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration structure for all Sensi services.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub presets: PresetsConfig,

    #[serde(default)]
    pub devices: DevicesConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides applied.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("SENSI_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Some(port) = var("SENSI_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(level) = var("SENSI_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = var("SENSI_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(path) = var("SENSI_PRESETS_PATH") {
            self.presets.path = Some(path);
        }
        if let Some(path) = var("SENSI_DEVICE_CACHE_PATH") {
            self.devices.cache_path = Some(path);
        }
        if let Some(url) = var("SENSI_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = var("SENSI_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = var("SENSI_LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
    }

    // =========================================================================
    // Convenience accessors
    // =========================================================================

    /// Socket address string the API server binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.network.bind, self.server.port)
    }

    /// Effective presets file path.
    pub fn presets_path(&self) -> PathBuf {
        self.presets
            .path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| config_dir().join("presets.json"))
    }

    /// Effective device cache file path.
    pub fn device_cache_path(&self) -> PathBuf {
        self.devices
            .cache_path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| config_dir().join("devices.json"))
    }
}
