//! Configuration module.
//!
//! Resolution order: defaults → config file → environment → CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_claude_home, default_config_path,
    default_log_path, expand_home, load_config_file, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, CLAUDE_HOME_ENV_VAR, CONFIG_ENV_VAR,
};

use crate::parser::{ParseOptions, DEFAULT_MAX_LINE_BYTES};
use crate::sections::{
    SectionSplitter, DEFAULT_PROGRESSIVE_THRESHOLD, DEFAULT_SECTION_TARGET_SIZE,
    DEFAULT_VISIBLE_SECTIONS,
};
use crate::source::{TailOptions, TailStart, DEFAULT_MAX_CHUNK_BYTES, DEFAULT_POLL_INTERVAL};
use std::path::PathBuf;
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Assistant home directory.
    pub claude_home: PathBuf,
    /// Live tail poll interval.
    pub poll_interval: Duration,
    /// Maximum bytes read per tail tick.
    pub max_tail_chunk_bytes: u64,
    /// Maximum accepted line length in bytes.
    pub max_line_bytes: usize,
    /// Progressive display threshold.
    pub progressive_threshold: usize,
    /// Target messages per size-based section.
    pub section_target_size: usize,
    /// Sections visible initially.
    pub visible_sections: usize,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            claude_home: default_claude_home(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_tail_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            progressive_threshold: DEFAULT_PROGRESSIVE_THRESHOLD,
            section_target_size: DEFAULT_SECTION_TARGET_SIZE,
            visible_sections: DEFAULT_VISIBLE_SECTIONS,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// `<claude_home>/projects`.
    pub fn projects_dir(&self) -> PathBuf {
        self.claude_home.join("projects")
    }

    /// Options for full-session parsing.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_line_bytes: self.max_line_bytes,
        }
    }

    /// Options for live tailing.
    ///
    /// A zero poll interval is raised to 1ms.
    pub fn tail_options(&self, start: TailStart) -> TailOptions {
        TailOptions {
            poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
            max_chunk_bytes: self.max_tail_chunk_bytes,
            max_line_bytes: self.max_line_bytes,
            start,
        }
    }

    /// Section splitter settings.
    pub fn section_splitter(&self) -> SectionSplitter {
        SectionSplitter {
            threshold: self.progressive_threshold,
            target_size: self.section_target_size,
            visible_sections: self.visible_sections,
        }
    }
}
