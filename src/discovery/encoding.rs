//! Project directory name encoding.
//!
//! Session logs live under `<claude_home>/projects/<encoded>/`, where `<encoded>` is
//! the project's absolute path with every `/` replaced by `-`. The encoding is
//! lossy (dashes in the original path are indistinguishable), so decoding is a
//! best-effort display aid only.

const USER_ROOTS: &[&str] = &["users", "home", "mnt"];
const WORKSPACE_DIRS: &[&str] = &["wrk", "src", "work", "dev", "code", "projects", "repos"];
const FORGE_HOSTS: &[&str] = &["github", "gitlab", "bitbucket"];
const FORGE_TLDS: &[&str] = &["com", "org", "io"];
const MAX_NAME_PARTS: usize = 4;

/// Turn an encoded directory name back into a path: dashes become slashes and
/// the result is rooted.
///
/// # Examples
///
/// ```
/// use ccx::discovery::decode_project_path;
///
/// assert_eq!(decode_project_path("-Users-eric-projects-app"), "/Users/eric/projects/app");
/// assert_eq!(decode_project_path(""), "");
/// ```
pub fn decode_project_path(encoded: &str) -> String {
    if encoded.is_empty() {
        return String::new();
    }
    let decoded = encoded.replace('-', "/");
    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

/// Encode a path the way the session producer names project directories.
pub fn encode_project_path(path: &str) -> String {
    let encoded = path.replace('/', "-");
    match encoded.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => encoded,
    }
}

/// Short human-readable project name from an encoded directory name.
///
/// Drops the `Users/<name>` (or `home`/`mnt`) prefix, leading workspace folders,
/// and a `github.com`-style host pair, then keeps at most the last four parts.
///
/// # Examples
///
/// ```
/// use ccx::discovery::project_display_name;
///
/// assert_eq!(project_display_name("-Users-eric-wrk-src-github-com-org-repo"), "org-repo");
/// ```
pub fn project_display_name(encoded: &str) -> String {
    let parts: Vec<&str> = encoded.split('-').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return encoded.to_string();
    }

    let is = |idx: usize, set: &[&str]| {
        parts
            .get(idx)
            .is_some_and(|p| set.contains(&p.to_lowercase().as_str()))
    };

    let mut start = 0;
    if parts.len() > 1 && is(0, USER_ROOTS) {
        start += 2;
    }
    while start < parts.len() && is(start, WORKSPACE_DIRS) {
        start += 1;
    }
    if start + 1 < parts.len() && is(start, FORGE_HOSTS) && is(start + 1, FORGE_TLDS) {
        start += 2;
    }

    if start >= parts.len() {
        return parts[parts.len() - 1].to_string();
    }

    let rest = &parts[start..];
    let keep = &rest[rest.len().saturating_sub(MAX_NAME_PARTS)..];
    keep.join("-")
}
