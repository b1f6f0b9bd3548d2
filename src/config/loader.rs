//! Configuration file loading with precedence handling.

use super::ResolvedConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CCX_CONFIG";

/// Environment variable overriding the assistant's home directory.
pub const CLAUDE_HOME_ENV_VAR: &str = "CLAUDE_CODE_HOME";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/ccx/config.toml`.
///
/// ```toml
/// claude_home = "~/.claude"
/// poll_interval_ms = 250
/// progressive_threshold = 800
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Assistant home directory (contains `projects/`). `~` is expanded.
    #[serde(default)]
    pub claude_home: Option<PathBuf>,

    /// Live tail poll interval in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    /// Maximum bytes read per tail tick.
    #[serde(default)]
    pub max_tail_chunk_bytes: Option<u64>,

    /// Maximum accepted line length in bytes.
    #[serde(default)]
    pub max_line_bytes: Option<usize>,

    /// Message count above which transcripts are shown progressively.
    #[serde(default)]
    pub progressive_threshold: Option<usize>,

    /// Target messages per size-based section.
    #[serde(default)]
    pub section_target_size: Option<usize>,

    /// Sections visible initially.
    #[serde(default)]
    pub visible_sections: Option<usize>,

    /// Path to log file for tracing output. `~` is expanded.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/ccx/ccx.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("ccx").join("ccx.log"),
        None => PathBuf::from("ccx.log"),
    }
}

/// Resolve the default assistant home, `~/.claude`.
///
/// Falls back to a relative `.claude` when the home directory is unknown.
pub fn default_claude_home() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".claude"))
        .unwrap_or_else(|| PathBuf::from(".claude"))
}

/// Expand a leading `~` to the home directory.
///
/// Paths without a leading `~` (and all paths when the home directory is
/// unknown) are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/ccx/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ccx").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CCX_CONFIG` environment variable
/// 3. Default path `~/.config/ccx/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        claude_home: config
            .claude_home
            .map(|p| expand_home(&p))
            .unwrap_or(defaults.claude_home),
        poll_interval: config
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        max_tail_chunk_bytes: config
            .max_tail_chunk_bytes
            .unwrap_or(defaults.max_tail_chunk_bytes),
        max_line_bytes: config.max_line_bytes.unwrap_or(defaults.max_line_bytes),
        progressive_threshold: config
            .progressive_threshold
            .unwrap_or(defaults.progressive_threshold),
        section_target_size: config
            .section_target_size
            .unwrap_or(defaults.section_target_size),
        visible_sections: config.visible_sections.unwrap_or(defaults.visible_sections),
        log_file_path: config
            .log_file_path
            .map(|p| expand_home(&p))
            .unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CLAUDE_CODE_HOME`: Override the assistant home directory (empty is ignored)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(home) = std::env::var(CLAUDE_HOME_ENV_VAR) {
        if !home.is_empty() {
            config.claude_home = expand_home(Path::new(&home));
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `claude_home_override` - Optional home from `--claude-home`
/// * `poll_interval_ms_override` - Optional interval from `--poll-interval-ms`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    claude_home_override: Option<PathBuf>,
    poll_interval_ms_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(home) = claude_home_override {
        config.claude_home = expand_home(&home);
    }

    if let Some(ms) = poll_interval_ms_override {
        config.poll_interval = Duration::from_millis(ms);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
