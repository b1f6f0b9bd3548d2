//! Message tree builder.
//!
//! Two passes over the arena: index uuids, then link each message to its parent.
//! Messages without a usable parent become roots. A parent is unusable when it is
//! empty, absent from the file (truncated or rotated logs), the message itself, or
//! a descendant of the message (a cycle in the parent data).

use crate::model::{Message, MessageId};
use std::collections::HashMap;

/// Link `messages` into a forest and return the root ids in input order.
///
/// Each message is placed exactly once, as a root or as one parent's child.
/// Sibling lists keep input order. When a uuid repeats, the last occurrence is
/// the one children attach to.
pub fn build_tree(messages: &mut [Message]) -> Vec<MessageId> {
    let by_uuid: HashMap<String, usize> = messages
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.uuid().map(|u| (u.as_str().to_string(), i)))
        .collect();

    let mut components = Components::new(messages.len());
    let mut roots = Vec::new();

    for i in 0..messages.len() {
        let parent = messages[i]
            .parent_uuid()
            .and_then(|p| by_uuid.get(p.as_str()).copied());

        match parent {
            Some(p) if components.attach(i, p) => messages[p].push_child(MessageId(i)),
            _ => roots.push(MessageId(i)),
        }
    }

    roots
}

/// Union-find over attached subtrees. The representative of a set is the top of
/// that subtree, so `find(p) == i` means `p` already hangs below `i`.
struct Components {
    up: Vec<usize>,
}

impl Components {
    fn new(len: usize) -> Self {
        Self {
            up: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.up[x] != x {
            self.up[x] = self.up[self.up[x]];
            x = self.up[x];
        }
        x
    }

    /// Attach `child` (not yet attached anywhere) below `parent`.
    /// Returns false when that would close a cycle.
    fn attach(&mut self, child: usize, parent: usize) -> bool {
        let top = self.find(parent);
        if top == child {
            return false;
        }
        self.up[child] = top;
        true
    }
}
