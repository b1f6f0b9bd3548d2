//! Property-based tests for the tree builder, parent resolver, and section splitter.
//!
//! Tests validate:
//! 1. Every message is placed exactly once and siblings keep input order
//! 2. Boundary chains within the hop budget resolve fully; longer chains terminate at the frontier
//! 3. Sections cover the flat list exactly once, in order, without empty sections

use ccx::model::{AgentId, EntryUuid, Message, MessageKind, MessageType, SessionId};
use ccx::parser::{build_tree, LogicalParents, MAX_HOPS};
use ccx::sections::SectionSplitter;
use proptest::prelude::*;

fn make_message(uuid: usize, parent: Option<usize>) -> Message {
    Message::new(MessageType::User, MessageKind::UserPrompt)
        .with_uuid(EntryUuid::new(format!("m{uuid}")).ok())
        .with_parent(parent.and_then(|p| EntryUuid::new(format!("m{p}")).ok()))
}

/// Arbitrary parent references: none, any index (including self, later
/// messages, and cycles), or a uuid that is not in the list.
fn parent_refs(len: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::of(0..len + 3), len)
}

fn kind_from_code(code: u8) -> MessageKind {
    match code % 4 {
        0 => MessageKind::UserPrompt,
        1 => MessageKind::Assistant,
        2 => MessageKind::ToolResult,
        _ => MessageKind::CompactSummary,
    }
}

// ===== Property 1: Tree placement =====

proptest! {
    #[test]
    fn tree_places_every_message_exactly_once(
        refs in (1usize..40).prop_flat_map(parent_refs)
    ) {
        let mut messages: Vec<Message> = refs
            .iter()
            .enumerate()
            .map(|(i, p)| make_message(i, *p))
            .collect();

        let roots = build_tree(&mut messages);

        let mut placed = vec![0usize; messages.len()];
        for root in &roots {
            placed[root.index()] += 1;
        }
        for msg in &messages {
            for child in msg.children() {
                placed[child.index()] += 1;
            }
        }
        prop_assert!(
            placed.iter().all(|&n| n == 1),
            "placement counts {:?}",
            placed
        );

        // Every placement is reachable from a root (no detached cycles)
        let mut reached = vec![false; messages.len()];
        let mut stack: Vec<usize> = roots.iter().map(|r| r.index()).collect();
        while let Some(i) = stack.pop() {
            prop_assert!(!reached[i], "visited {} twice", i);
            reached[i] = true;
            stack.extend(messages[i].children().iter().map(|c| c.index()));
        }
        prop_assert!(reached.iter().all(|&r| r));
    }

    #[test]
    fn tree_siblings_and_roots_keep_input_order(
        refs in (1usize..40).prop_flat_map(parent_refs)
    ) {
        let mut messages: Vec<Message> = refs
            .iter()
            .enumerate()
            .map(|(i, p)| make_message(i, *p))
            .collect();

        let roots = build_tree(&mut messages);

        let root_indices: Vec<usize> = roots.iter().map(|r| r.index()).collect();
        prop_assert!(root_indices.windows(2).all(|w| w[0] < w[1]));
        for msg in &messages {
            let children: Vec<usize> = msg.children().iter().map(|c| c.index()).collect();
            prop_assert!(children.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn acyclic_earlier_parents_are_always_honoured(
        refs in (1usize..40).prop_flat_map(|len| {
            prop::collection::vec(prop::option::of(0..len), len)
        })
    ) {
        // Only point at strictly earlier messages: no cycles, no dangling refs
        let refs: Vec<Option<usize>> = refs
            .iter()
            .enumerate()
            .map(|(i, p)| p.filter(|p| *p < i))
            .collect();
        let mut messages: Vec<Message> = refs
            .iter()
            .enumerate()
            .map(|(i, p)| make_message(i, *p))
            .collect();

        let roots = build_tree(&mut messages);

        let expected_roots: Vec<usize> = refs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect();
        let roots: Vec<usize> = roots.iter().map(|r| r.index()).collect();
        prop_assert_eq!(roots, expected_roots);
    }
}

// ===== Property 2: Resolver termination =====

proptest! {
    #[test]
    fn chains_within_budget_resolve_to_target(len in 1usize..=MAX_HOPS) {
        // b0 -> b1 -> ... -> b{len-1} -> real
        let mut parents = LogicalParents::new();
        for i in 0..len {
            let next = if i + 1 == len { "real".to_string() } else { format!("b{}", i + 1) };
            parents.register(&format!("b{i}"), Some(next.as_str()));
        }

        let resolution = parents.resolve("b0");

        prop_assert_eq!(resolution.uuid, "real");
        prop_assert!(!resolution.exhausted);
    }

    #[test]
    fn longer_chains_stop_at_the_frontier(extra in 1usize..50) {
        let len = MAX_HOPS + extra;
        let mut parents = LogicalParents::new();
        for i in 0..len {
            parents.register(&format!("b{i}"), Some(format!("b{}", i + 1).as_str()));
        }

        let resolution = parents.resolve("b0");

        prop_assert_eq!(resolution.uuid, format!("b{MAX_HOPS}"));
        prop_assert!(resolution.exhausted);
    }

    #[test]
    fn arbitrary_mappings_always_terminate(
        edges in prop::collection::vec((0usize..8, prop::option::of(0usize..8)), 0..32),
        start in 0usize..8
    ) {
        let mut parents = LogicalParents::new();
        for (from, to) in &edges {
            let to = to.map(|t| format!("n{t}"));
            parents.register(&format!("n{from}"), to.as_deref());
        }

        // Cycles are fine: the walk is bounded either way
        let resolution = parents.resolve(&format!("n{start}"));
        prop_assert!(resolution.uuid.starts_with('n'));
    }
}

// ===== Property 3: Splitter coverage =====

proptest! {
    #[test]
    fn sections_cover_every_message_once(
        codes in prop::collection::vec(any::<u8>(), 0..300),
        threshold in 0usize..200,
        target_size in 0usize..40,
        visible_sections in 0usize..6
    ) {
        let messages: Vec<Message> = codes
            .iter()
            .map(|c| Message::new(MessageType::User, kind_from_code(*c)))
            .collect();
        let splitter = SectionSplitter { threshold, target_size, visible_sections };

        let sections = splitter.split(&messages);

        let mut next = 0;
        for section in &sections {
            prop_assert!(!section.is_empty(), "empty section {:?}", section);
            prop_assert_eq!(section.range.start, next);
            next = section.range.end;
        }
        prop_assert_eq!(next, messages.len());

        let window = splitter.window(&sections);
        let hidden: usize = sections[..window.hidden_sections].iter().map(|s| s.len()).sum();
        prop_assert_eq!(window.hidden_messages, hidden);
        prop_assert_eq!(window.messages.end, messages.len());
        prop_assert!(window.sections.len() <= visible_sections);
    }

    #[test]
    fn size_fallback_sections_start_at_prompts(
        codes in prop::collection::vec(0u8..3, 1..400),
        target_size in 1usize..60
    ) {
        let messages: Vec<Message> = codes
            .iter()
            .map(|c| Message::new(MessageType::User, kind_from_code(*c)))
            .collect();
        let splitter = SectionSplitter { threshold: 0, target_size, visible_sections: 3 };

        let sections = splitter.split(&messages);

        for section in sections.iter().skip(1) {
            prop_assert_eq!(messages[section.range.start].kind(), MessageKind::UserPrompt);
            prop_assert!(section.range.start >= target_size);
        }
    }
}

// ===== Identifier constructors =====

proptest! {
    #[test]
    fn identifiers_accept_exactly_non_empty_strings(s in any::<String>()) {
        prop_assert_eq!(EntryUuid::new(s.clone()).is_ok(), !s.is_empty());
        prop_assert_eq!(SessionId::new(s.clone()).is_ok(), !s.is_empty());
        prop_assert_eq!(AgentId::new(s.clone()).is_ok(), !s.is_empty());
    }
}
