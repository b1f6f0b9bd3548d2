//! Progressive section splitter.
//!
//! Very large transcripts are shown a few sections at a time. Sections are cut at
//! compaction points (each `CompactSummary` message opens a new section). A long
//! transcript without compactions falls back to size-based chunks that only break
//! right before a `UserPrompt`, so a turn is never split.
//!
//! The visible window exposes the last K sections; everything before it is reported
//! as hidden section and message counts for deferred loading.

use crate::model::{Message, MessageKind};
use std::borrow::Borrow;
use std::ops::Range;

/// Message count above which a transcript is shown progressively.
pub const DEFAULT_PROGRESSIVE_THRESHOLD: usize = 500;

/// Target messages per size-based section.
pub const DEFAULT_SECTION_TARGET_SIZE: usize = 50;

/// Sections visible initially.
pub const DEFAULT_VISIBLE_SECTIONS: usize = 3;

/// A contiguous run of the flat message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Message indices covered.
    pub range: Range<usize>,
}

impl Section {
    /// Messages in the section.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// True for an empty section (never produced by the splitter).
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Which sections are shown and what is deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleWindow {
    /// Sections before the window.
    pub hidden_sections: usize,
    /// Messages in those sections.
    pub hidden_messages: usize,
    /// Section indices inside the window.
    pub sections: Range<usize>,
    /// Message indices inside the window.
    pub messages: Range<usize>,
}

impl VisibleWindow {
    /// Whether anything is deferred.
    pub fn has_hidden(&self) -> bool {
        self.hidden_sections > 0
    }
}

/// Sections plus the initial window for one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    /// Whether the transcript is over the progressive threshold.
    pub progressive: bool,
    /// All sections in order.
    pub sections: Vec<Section>,
    /// Initial window.
    pub window: VisibleWindow,
}

/// Splitter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSplitter {
    /// Message count above which progressive display kicks in, and above which
    /// the size-based fallback is used.
    pub threshold: usize,
    /// Messages per size-based section before the next prompt starts a new one.
    pub target_size: usize,
    /// Sections in the visible window.
    pub visible_sections: usize,
}

impl Default for SectionSplitter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PROGRESSIVE_THRESHOLD,
            target_size: DEFAULT_SECTION_TARGET_SIZE,
            visible_sections: DEFAULT_VISIBLE_SECTIONS,
        }
    }
}

impl SectionSplitter {
    /// Whether `total` messages should be shown progressively.
    pub fn needs_progressive(&self, total: usize) -> bool {
        total > self.threshold
    }

    /// Split the flat message list into sections.
    ///
    /// Sections cover every message exactly once, in order, and are never empty.
    pub fn split<M: Borrow<Message>>(&self, messages: &[M]) -> Vec<Section> {
        let sections = split_by_compactions(messages);
        if sections.len() <= 1 && messages.len() > self.threshold {
            return split_by_prompts(messages, self.target_size);
        }
        sections
    }

    /// Window over the last `visible_sections` sections.
    pub fn window(&self, sections: &[Section]) -> VisibleWindow {
        let hidden_sections = sections.len().saturating_sub(self.visible_sections);
        let hidden_messages = sections[..hidden_sections].iter().map(Section::len).sum();
        let total = sections.last().map_or(0, |s| s.range.end);

        VisibleWindow {
            hidden_sections,
            hidden_messages,
            sections: hidden_sections..sections.len(),
            messages: hidden_messages..total,
        }
    }

    /// Split and window in one step.
    ///
    /// Below the threshold the whole transcript is one visible section.
    pub fn layout<M: Borrow<Message>>(&self, messages: &[M]) -> SectionLayout {
        if !self.needs_progressive(messages.len()) {
            let sections = if messages.is_empty() {
                Vec::new()
            } else {
                vec![Section {
                    range: 0..messages.len(),
                }]
            };
            let window = VisibleWindow {
                hidden_sections: 0,
                hidden_messages: 0,
                sections: 0..sections.len(),
                messages: 0..messages.len(),
            };
            return SectionLayout {
                progressive: false,
                sections,
                window,
            };
        }

        let sections = self.split(messages);
        let window = self.window(&sections);
        SectionLayout {
            progressive: true,
            sections,
            window,
        }
    }
}

fn kind_of<M: Borrow<Message>>(m: &M) -> MessageKind {
    m.borrow().kind()
}

/// New section at every `CompactSummary` (inclusive).
fn split_by_compactions<M: Borrow<Message>>(messages: &[M]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut start = 0;
    for (i, msg) in messages.iter().enumerate() {
        if kind_of(msg) == MessageKind::CompactSummary && i > start {
            sections.push(Section { range: start..i });
            start = i;
        }
    }
    if start < messages.len() {
        sections.push(Section {
            range: start..messages.len(),
        });
    }
    sections
}

/// Break right before a `UserPrompt` once the current section holds `target` messages.
fn split_by_prompts<M: Borrow<Message>>(messages: &[M], target: usize) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut start = 0;
    for (i, msg) in messages.iter().enumerate() {
        let current = i - start;
        if kind_of(msg) == MessageKind::UserPrompt && current > 0 && current >= target {
            sections.push(Section { range: start..i });
            start = i;
        }
    }
    if start < messages.len() {
        sections.push(Section {
            range: start..messages.len(),
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageType;

    fn make(kind: MessageKind) -> Message {
        Message::new(MessageType::User, kind)
    }

    /// `P` prompt, `A` assistant, `C` compact summary, `T` tool result.
    fn transcript(codes: &str) -> Vec<Message> {
        codes.chars()
            .map(|c| match c {
                'P' => make(MessageKind::UserPrompt),
                'A' => make(MessageKind::Assistant),
                'C' => make(MessageKind::CompactSummary),
                'T' => make(MessageKind::ToolResult),
                other => panic!("unknown kind code {other}"),
            })
            .collect()
    }

    fn lens(sections: &[Section]) -> Vec<usize> {
        sections.iter().map(Section::len).collect()
    }

    #[test]
    fn three_compactions_make_four_sections_and_one_hidden() {
        // GIVEN a transcript with 3 compaction summaries
        let messages = transcript("PAPACAPACAACPA");
        let splitter = SectionSplitter::default();

        // WHEN split and windowed with K = 3
        let sections = splitter.split(&messages);
        let window = splitter.window(&sections);

        // THEN
        assert_eq!(lens(&sections), vec![4, 4, 3, 3]);
        assert_eq!(window.hidden_sections, 1);
        assert_eq!(window.hidden_messages, 4);
        assert_eq!(window.messages, 4..14);
        assert_eq!(window.sections, 1..4);
    }

    #[test]
    fn compaction_at_start_does_not_create_empty_section() {
        let sections = SectionSplitter::default().split(&transcript("CAPA"));
        assert_eq!(lens(&sections), vec![4]);
    }

    #[test]
    fn small_transcript_without_compactions_is_one_section() {
        let sections = SectionSplitter::default().split(&transcript("PAPAPA"));
        assert_eq!(lens(&sections), vec![6]);
    }

    #[test]
    fn size_fallback_breaks_only_before_prompts() {
        let splitter = SectionSplitter {
            threshold: 5,
            target_size: 3,
            visible_sections: 3,
        };
        // turns: PAT A | PAAAA | PA
        let messages = transcript("PATAPAAAAPA");
        let sections = splitter.split(&messages);
        assert_eq!(lens(&sections), vec![4, 5, 2]);
        for s in &sections {
            assert_eq!(
                messages[s.range.start].kind(),
                MessageKind::UserPrompt,
                "each chunk starts at a prompt"
            );
        }
    }

    #[test]
    fn fallback_not_used_at_or_below_threshold() {
        let splitter = SectionSplitter {
            threshold: 6,
            target_size: 1,
            visible_sections: 3,
        };
        assert_eq!(lens(&splitter.split(&transcript("PAPAPA"))), vec![6]);
    }

    #[test]
    fn window_with_fewer_sections_than_k_hides_nothing() {
        let splitter = SectionSplitter::default();
        let sections = splitter.split(&transcript("PACA"));
        let window = splitter.window(&sections);
        assert!(!window.has_hidden());
        assert_eq!(window.messages, 0..4);
    }

    #[test]
    fn empty_transcript_has_no_sections() {
        let splitter = SectionSplitter::default();
        let messages: Vec<Message> = Vec::new();
        assert!(splitter.split(&messages).is_empty());
        let window = splitter.window(&[]);
        assert_eq!(window.hidden_messages, 0);
        assert_eq!(window.messages, 0..0);
    }

    #[test]
    fn layout_below_threshold_is_single_visible_section() {
        let splitter = SectionSplitter {
            threshold: 10,
            ..Default::default()
        };
        let layout = splitter.layout(&transcript("PACAPACA"));
        assert!(!layout.progressive);
        assert_eq!(lens(&layout.sections), vec![8]);
        assert!(!layout.window.has_hidden());
    }

    #[test]
    fn layout_accepts_borrowed_messages() {
        let owned = transcript("PACAPACAPACA");
        let borrowed: Vec<&Message> = owned.iter().collect();
        let splitter = SectionSplitter {
            threshold: 4,
            target_size: 50,
            visible_sections: 2,
        };
        let layout = splitter.layout(&borrowed);
        assert!(layout.progressive);
        assert_eq!(lens(&layout.sections), vec![2, 4, 4, 2]);
        assert_eq!(layout.window.hidden_sections, 2);
        assert_eq!(layout.window.hidden_messages, 6);
    }
}
