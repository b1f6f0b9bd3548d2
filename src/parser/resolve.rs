//! Logical parent resolver.
//!
//! Compaction inserts a synthetic `compact_boundary` record whose
//! `logicalParentUuid` names the real continuation point. Messages parented on a
//! boundary are re-parented by walking boundary → target mappings until a
//! non-boundary uuid is reached.
//!
//! The walk is capped at [`MAX_HOPS`]. A chain that is still going when the
//! budget runs out resolves to the frontier reached, is logged at `warn`, and
//! is counted in the session diagnostics.

use crate::model::{EntryUuid, Message};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Hop budget for one resolution.
pub const MAX_HOPS: usize = 16;

/// Outcome of resolving one parent reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved uuid (the frontier when `exhausted`).
    pub uuid: String,
    /// The chain still continued after [`MAX_HOPS`] hops.
    pub exhausted: bool,
}

/// Registered compaction boundaries.
#[derive(Debug, Clone, Default)]
pub struct LogicalParents {
    targets: HashMap<String, String>,
    boundaries: HashSet<String>,
}

impl LogicalParents {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a boundary record.
    ///
    /// The target is trimmed; an empty or missing target registers the boundary
    /// without a mapping.
    pub fn register(&mut self, boundary_uuid: &str, logical_parent: Option<&str>) {
        if boundary_uuid.is_empty() {
            return;
        }
        self.boundaries.insert(boundary_uuid.to_string());
        if let Some(target) = logical_parent.map(str::trim).filter(|t| !t.is_empty()) {
            self.targets
                .insert(boundary_uuid.to_string(), target.to_string());
        }
    }

    /// Whether `uuid` was registered as a boundary.
    pub fn is_boundary(&self, uuid: &str) -> bool {
        self.boundaries.contains(uuid)
    }

    /// Number of registered boundaries.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// True when no boundary was registered.
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    fn next(&self, current: &str) -> Option<&str> {
        self.targets
            .get(current)
            .map(String::as_str)
            .filter(|next| !next.is_empty() && *next != current)
    }

    /// Walk the mapping chain starting at `parent`.
    ///
    /// Stops when there is no mapping, the mapping is empty, or it points back at
    /// the current node. Always terminates.
    pub fn resolve(&self, parent: &str) -> Resolution {
        let mut current = parent;
        for _ in 0..MAX_HOPS {
            match self.next(current) {
                Some(next) => current = next,
                None => {
                    return Resolution {
                        uuid: current.to_string(),
                        exhausted: false,
                    }
                }
            }
        }
        Resolution {
            uuid: current.to_string(),
            exhausted: self.next(current).is_some(),
        }
    }
}

/// Rewrite every message's parent through the boundary registry.
///
/// A parent still naming a boundary after resolution (boundary without a target,
/// or an exhausted chain ending on a boundary) is cleared, so the message becomes
/// a root instead of pointing at a synthetic marker.
///
/// Returns the number of exhausted chains.
pub fn resolve_parents(messages: &mut [Message], parents: &LogicalParents) -> usize {
    if parents.is_empty() {
        return 0;
    }

    let mut exhausted = 0;
    for msg in messages.iter_mut() {
        let Some(parent) = msg.parent_uuid() else {
            continue;
        };
        if !parents.is_boundary(parent.as_str()) {
            continue;
        }

        let resolution = parents.resolve(parent.as_str());
        if resolution.exhausted {
            exhausted += 1;
            warn!(
                message = ?msg.uuid().map(EntryUuid::as_str),
                start = parent.as_str(),
                frontier = %resolution.uuid,
                max_hops = MAX_HOPS,
                "Logical parent chain exceeded hop budget; using frontier"
            );
        }

        let resolved = if parents.is_boundary(&resolution.uuid) {
            None
        } else {
            EntryUuid::new(resolution.uuid).ok()
        };
        msg.set_parent_uuid(resolved);
    }
    exhausted
}
