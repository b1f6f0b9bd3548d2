//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

// ===== Paths =====

#[test]
fn default_config_path_ends_with_ccx_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("ccx") && path_str.ends_with("config.toml"),
        "Path should contain 'ccx' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_ccx_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("ccx.log"),
        "Default log path should end with 'ccx.log', got: {:?}",
        path
    );
}

#[test]
fn default_claude_home_ends_with_dot_claude() {
    assert!(default_claude_home().ends_with(".claude"));
}

#[test]
fn expand_home_replaces_leading_tilde_only() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    assert_eq!(expand_home(Path::new("~/.claude")), home.join(".claude"));
    assert_eq!(expand_home(Path::new("~")), home);
    assert_eq!(
        expand_home(Path::new("/abs/~/x")),
        PathBuf::from("/abs/~/x"),
        "tilde in the middle is literal"
    );
    assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
}

// ===== File loading =====

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "config.toml",
        r#"
claude_home = "/data/claude"
poll_interval_ms = 250
max_tail_chunk_bytes = 4096
max_line_bytes = 2048
progressive_threshold = 800
section_target_size = 25
visible_sections = 2
log_file_path = "/var/log/ccx.log"
"#,
    );

    let config = load_config_file(&path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.claude_home, Some(PathBuf::from("/data/claude")));
    assert_eq!(config.poll_interval_ms, Some(250));
    assert_eq!(config.max_tail_chunk_bytes, Some(4096));
    assert_eq!(config.max_line_bytes, Some(2048));
    assert_eq!(config.progressive_threshold, Some(800));
    assert_eq!(config.section_target_size, Some(25));
    assert_eq!(config.visible_sections, Some(2));
    assert_eq!(config.log_file_path, Some(PathBuf::from("/var/log/ccx.log")));
}

#[test]
fn load_config_file_accepts_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "empty.toml", "");
    assert_eq!(load_config_file(&path), Ok(Some(ConfigFile::default())));
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "bad.toml", "poll_interval_ms = [not valid");

    let result = load_config_file(&path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a ParseError, got {:?}",
        result
    );
}

#[test]
fn load_config_file_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "unknown.toml", "theme = \"dark\"\n");

    let result = load_config_file(&path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Unknown keys should be rejected, got {:?}",
        result
    );
}

#[test]
fn load_config_file_rejects_wrong_value_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "typed.toml", "visible_sections = \"three\"\n");
    assert!(load_config_file(&path).is_err());
}

#[test]
fn load_config_file_reports_read_error_for_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config_file(dir.path());
    assert!(
        matches!(result, Err(ConfigError::ReadError { .. })),
        "A directory exists but cannot be read as a file, got {:?}",
        result
    );
}

// ===== Merging =====

#[test]
fn merge_config_none_returns_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_partial_file_keeps_other_defaults() {
    let defaults = ResolvedConfig::default();
    let file = ConfigFile {
        poll_interval_ms: Some(100),
        visible_sections: Some(5),
        ..Default::default()
    };

    let resolved = merge_config(Some(file));

    assert_eq!(resolved.poll_interval, Duration::from_millis(100));
    assert_eq!(resolved.visible_sections, 5);
    assert_eq!(resolved.claude_home, defaults.claude_home);
    assert_eq!(resolved.max_line_bytes, defaults.max_line_bytes);
    assert_eq!(resolved.progressive_threshold, defaults.progressive_threshold);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn merge_config_expands_tilde_paths() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let file = ConfigFile {
        claude_home: Some(PathBuf::from("~/alt-claude")),
        log_file_path: Some(PathBuf::from("~/logs/ccx.log")),
        ..Default::default()
    };

    let resolved = merge_config(Some(file));

    assert_eq!(resolved.claude_home, home.join("alt-claude"));
    assert_eq!(resolved.log_file_path, home.join("logs/ccx.log"));
}

// ===== Environment =====

#[test]
#[serial(claude_code_home)]
fn apply_env_overrides_respects_claude_code_home() {
    let _guard = EnvGuard::new(CLAUDE_HOME_ENV_VAR);
    env::set_var(CLAUDE_HOME_ENV_VAR, "/env/claude");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(
        result.claude_home,
        PathBuf::from("/env/claude"),
        "CLAUDE_CODE_HOME should override claude_home"
    );
}

#[test]
#[serial(claude_code_home)]
fn apply_env_overrides_ignores_empty_value() {
    let _guard = EnvGuard::new(CLAUDE_HOME_ENV_VAR);
    env::set_var(CLAUDE_HOME_ENV_VAR, "");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(claude_code_home)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard = EnvGuard::new(CLAUDE_HOME_ENV_VAR);

    let base = ResolvedConfig {
        claude_home: PathBuf::from("/from/file"),
        ..Default::default()
    };
    assert_eq!(
        apply_env_overrides(base.clone()),
        base,
        "Config should be unchanged when CLAUDE_CODE_HOME not set"
    );
}

// ===== Config path precedence =====

#[test]
#[serial(ccx_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let explicit = write_config(&dir, "explicit.toml", "visible_sections = 1\n");
    let from_env = write_config(&dir, "env.toml", "visible_sections = 2\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(Some(explicit))
        .unwrap()
        .expect("explicit file exists");

    assert_eq!(
        config.visible_sections,
        Some(1),
        "Explicit path should take precedence over CCX_CONFIG"
    );
}

#[test]
#[serial(ccx_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let from_env = write_config(&dir, "env.toml", "section_target_size = 7\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(None)
        .unwrap()
        .expect("env file exists");

    assert_eq!(config.section_target_size, Some(7));
}

#[test]
#[serial(ccx_config)]
fn load_config_with_precedence_missing_env_file_is_not_an_error() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    env::set_var(CONFIG_ENV_VAR, dir.path().join("absent.toml"));

    assert_eq!(load_config_with_precedence(None), Ok(None));
}

// ===== CLI =====

#[test]
fn apply_cli_overrides_none_leaves_config_unchanged() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}

#[test]
fn apply_cli_overrides_wins_over_everything() {
    // GIVEN a config already merged from file and env
    let base = ResolvedConfig {
        claude_home: PathBuf::from("/from/env"),
        poll_interval: Duration::from_millis(900),
        ..Default::default()
    };

    // WHEN CLI flags are applied
    let result = apply_cli_overrides(base, Some(PathBuf::from("/from/cli")), Some(50));

    // THEN the CLI values win
    assert_eq!(result.claude_home, PathBuf::from("/from/cli"));
    assert_eq!(result.poll_interval, Duration::from_millis(50));
}

#[test]
#[serial(claude_code_home)]
fn full_precedence_chain_file_then_env_then_cli() {
    let _guard = EnvGuard::new(CLAUDE_HOME_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "chain.toml",
        "claude_home = \"/from/file\"\npoll_interval_ms = 300\n",
    );

    let file = load_config_file(&path).unwrap();
    let merged = merge_config(file);
    assert_eq!(merged.claude_home, PathBuf::from("/from/file"));

    env::set_var(CLAUDE_HOME_ENV_VAR, "/from/env");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.claude_home, PathBuf::from("/from/env"));
    assert_eq!(with_env.poll_interval, Duration::from_millis(300));

    let with_cli = apply_cli_overrides(with_env, None, Some(10));
    assert_eq!(with_cli.claude_home, PathBuf::from("/from/env"));
    assert_eq!(with_cli.poll_interval, Duration::from_millis(10));
}
