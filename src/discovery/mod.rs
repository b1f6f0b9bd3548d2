//! Project and session discovery.
//!
//! Layout consumed:
//!
//! ```text
//! <claude_home>/projects/
//!   -Users-eric-src-app/        one directory per project (encoded path)
//!     3f2a....jsonl             one file per session
//!     agent-a7b2877.jsonl       sub-agent transcripts (skipped)
//! ```
//!
//! Bulk discovery parses every session; sessions that fail to parse are logged and
//! skipped rather than failing the listing.

pub mod encoding;

pub use encoding::{decode_project_path, encode_project_path, project_display_name};

use crate::model::{InputError, Session, SessionId, SessionStats, NO_SUMMARY};
use crate::parser::{parse_session, ParseOptions};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SESSION_EXTENSION: &str = "jsonl";
const AGENT_FILE_PREFIX: &str = "agent-";
const WARMUP_SUMMARY: &str = "warmup";

/// One listed session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    /// Session id (file stem).
    pub id: SessionId,
    /// Session file.
    pub path: PathBuf,
    /// Encoded name of the owning project directory.
    pub project: String,
    /// Session summary.
    pub summary: String,
    /// First message timestamp.
    pub start_time: Option<DateTime<Utc>>,
    /// Last message timestamp.
    pub end_time: Option<DateTime<Utc>>,
    /// Counters.
    pub stats: SessionStats,
}

impl SessionEntry {
    fn from_session(session: &Session, project: &str) -> Self {
        Self {
            id: session.id().clone(),
            path: session.path().to_path_buf(),
            project: project.to_string(),
            summary: session.summary().to_string(),
            start_time: session.start_time(),
            end_time: session.end_time(),
            stats: session.stats().clone(),
        }
    }

    /// Exact id match or id prefix match (an exact id is its own prefix).
    pub fn matches(&self, query: &str) -> bool {
        self.id.as_str().starts_with(query)
    }
}

/// One project directory with its sessions, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// Display name.
    pub name: String,
    /// Directory name as found on disk.
    pub encoded_name: String,
    /// Project directory.
    pub path: PathBuf,
    /// Sessions, newest end time first.
    pub sessions: Vec<SessionEntry>,
    /// End time of the newest session, or the directory mtime.
    pub last_modified: Option<DateTime<Utc>>,
}

impl Project {
    /// Decoded original project path.
    pub fn full_path(&self) -> String {
        decode_project_path(&self.encoded_name)
    }

    fn matches(&self, query_lower: &str) -> bool {
        let name = self.name.to_lowercase();
        name == query_lower
            || self.encoded_name.to_lowercase() == query_lower
            || name.contains(query_lower)
    }
}

/// List every project under `projects_dir`, newest first.
///
/// A missing directory is an empty list. Project directories without listable
/// sessions are omitted.
///
/// # Errors
///
/// [`InputError::Io`] when `projects_dir` exists but cannot be read.
pub fn discover_projects(
    projects_dir: &Path,
    options: &ParseOptions,
) -> Result<Vec<Project>, InputError> {
    let entries = match fs::read_dir(projects_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %projects_dir.display(), "Projects directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(InputError::Io(e)),
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let mut projects: Vec<Project> = dirs
        .into_iter()
        .filter_map(|dir| load_project(&dir, options))
        .collect();

    projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    Ok(projects)
}

fn load_project(dir: &Path, options: &ParseOptions) -> Option<Project> {
    let encoded_name = dir.file_name()?.to_string_lossy().into_owned();

    let sessions = match discover_sessions(dir, &encoded_name, options) {
        Ok(sessions) => sessions,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "Skipping unreadable project directory");
            return None;
        }
    };
    if sessions.is_empty() {
        return None;
    }

    let last_modified = sessions[0].end_time.or_else(|| directory_mtime(dir));
    Some(Project {
        name: project_display_name(&encoded_name),
        encoded_name,
        path: dir.to_path_buf(),
        sessions,
        last_modified,
    })
}

fn directory_mtime(dir: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(dir)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

fn is_session_file(path: &Path) -> bool {
    let is_jsonl = path.extension().and_then(|e| e.to_str()) == Some(SESSION_EXTENSION);
    let is_agent = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(AGENT_FILE_PREFIX));
    is_jsonl && !is_agent && path.is_file()
}

fn is_listable_summary(summary: &str) -> bool {
    !summary.is_empty() && summary != NO_SUMMARY && !summary.eq_ignore_ascii_case(WARMUP_SUMMARY)
}

fn discover_sessions(
    dir: &Path,
    project: &str,
    options: &ParseOptions,
) -> io::Result<Vec<SessionEntry>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| is_session_file(p))
        .collect();
    paths.sort();

    let mut sessions = Vec::new();
    for path in paths {
        match parse_session(&path, options) {
            Ok(session) if is_listable_summary(session.summary()) => {
                sessions.push(SessionEntry::from_session(&session, project));
            }
            Ok(session) => {
                debug!(path = %path.display(), summary = session.summary(), "Skipping session without a usable summary");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping session that failed to parse");
            }
        }
    }

    sessions.sort_by(|a, b| b.end_time.cmp(&a.end_time));
    Ok(sessions)
}

/// Find a project by display or encoded name (case-insensitive), falling back to
/// the first project whose display name contains `name`.
///
/// # Errors
///
/// See [`discover_projects`].
pub fn find_project(
    projects_dir: &Path,
    name: &str,
    options: &ParseOptions,
) -> Result<Option<Project>, InputError> {
    let query = name.to_lowercase();
    let projects = discover_projects(projects_dir, options)?;
    Ok(projects.into_iter().find(|p| p.matches(&query)))
}

/// Find a session by exact id or id prefix, optionally within one project.
///
/// When `project` is given and does not match any project, the result is `None`.
///
/// # Errors
///
/// See [`discover_projects`].
pub fn find_session(
    projects_dir: &Path,
    project: Option<&str>,
    id_or_prefix: &str,
    options: &ParseOptions,
) -> Result<Option<SessionEntry>, InputError> {
    let projects = match project {
        Some(name) => match find_project(projects_dir, name, options)? {
            Some(p) => vec![p],
            None => return Ok(None),
        },
        None => discover_projects(projects_dir, options)?,
    };

    Ok(projects
        .into_iter()
        .flat_map(|p| p.sessions)
        .find(|s| s.matches(id_or_prefix)))
}
