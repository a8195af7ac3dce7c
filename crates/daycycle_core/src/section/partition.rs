//! Header location and section range computation.
//!
//! # Responsibility
//! - Match header blocks by recognized text prefix.
//! - Compute `[start, end)` content ranges per section from one ordered
//!   snapshot.
//!
//! # Invariants
//! - A section's content runs from its header (exclusive) to the nearest
//!   following header among sections of later precedence, or end of list.
//! - Matching is case-insensitive, ignores trailing colons and accepts
//!   any text that *starts with* the section name.

use crate::model::block::{Block, BlockId, BlockKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// The four named document sections, in conventional document order.
///
/// `Ord` follows that convention: `Daily < Today < Tomorrow < Backlog`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Daily,
    Today,
    Tomorrow,
    Backlog,
}

impl Section {
    /// All sections in conventional order.
    pub const ALL: [Section; 4] = [
        Section::Daily,
        Section::Today,
        Section::Tomorrow,
        Section::Backlog,
    ];

    /// The recognized header text prefix for this section.
    pub fn title(self) -> &'static str {
        match self {
            Section::Daily => "Daily",
            Section::Today => "Today",
            Section::Tomorrow => "Tomorrow",
            Section::Backlog => "Backlog",
        }
    }

    /// Sections that conventionally follow this one in the document.
    ///
    /// Their headers delimit the end of this section's content range.
    pub fn followers(self) -> &'static [Section] {
        match self {
            Section::Daily => &[Section::Today, Section::Tomorrow, Section::Backlog],
            Section::Today => &[Section::Tomorrow, Section::Backlog],
            Section::Tomorrow => &[Section::Backlog],
            Section::Backlog => &[],
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// First-occurrence header position per section, if present at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    pub daily: Option<usize>,
    pub today: Option<usize>,
    pub tomorrow: Option<usize>,
    pub backlog: Option<usize>,
}

impl HeaderIndex {
    /// Returns the header position recorded for `section`.
    pub fn get(&self, section: Section) -> Option<usize> {
        match section {
            Section::Daily => self.daily,
            Section::Today => self.today,
            Section::Tomorrow => self.tomorrow,
            Section::Backlog => self.backlog,
        }
    }

    fn slot(&mut self, section: Section) -> &mut Option<usize> {
        match section {
            Section::Daily => &mut self.daily,
            Section::Today => &mut self.today,
            Section::Tomorrow => &mut self.tomorrow,
            Section::Backlog => &mut self.backlog,
        }
    }
}

/// Returns whether `block` is the header of `section`.
///
/// Headers are headings or paragraphs whose text, trimmed and stripped of
/// trailing colons, case-insensitively *starts with* the section name.
/// "Today: (3 tasks)" matches Today; so does "Todayish" (intentional
/// prefix semantics, tolerated rather than remediated).
pub fn matches_header(block: &Block, section: Section) -> bool {
    if !matches!(block.kind, BlockKind::Heading | BlockKind::Paragraph) {
        return false;
    }
    let text = block.text.trim().trim_end_matches(':').trim().to_lowercase();
    text.starts_with(&section.title().to_lowercase())
}

/// Scans the snapshot once and records the first header occurrence per
/// section. Later duplicates are ignored.
pub fn locate_headers(blocks: &[Block]) -> HeaderIndex {
    let mut headers = HeaderIndex::default();
    for (position, block) in blocks.iter().enumerate() {
        for section in Section::ALL {
            let slot = headers.slot(section);
            if slot.is_none() && matches_header(block, section) {
                *slot = Some(position);
            }
        }
    }
    headers
}

/// Computes the `[start, end)` content range of `section`.
///
/// `start` is the header position plus one; `end` is the minimum present
/// header position among the section's followers, or the list length.
/// Returns `None` when the section's header is absent.
pub fn section_range(blocks: &[Block], section: Section) -> Option<Range<usize>> {
    let headers = locate_headers(blocks);
    let start = headers.get(section)? + 1;
    let end = section
        .followers()
        .iter()
        .filter_map(|follower| headers.get(*follower))
        .min()
        .unwrap_or(blocks.len());
    Some(start..end.max(start))
}

/// Returns the id of the first block recognized as `section`'s header.
pub fn header_block_id(blocks: &[Block], section: Section) -> Option<&BlockId> {
    let headers = locate_headers(blocks);
    headers.get(section).map(|position| &blocks[position].id)
}

#[cfg(test)]
mod tests {
    use super::{matches_header, Section};
    use crate::model::block::Block;

    #[test]
    fn header_match_strips_colons_and_case() {
        assert!(matches_header(&Block::heading("h", "TODAY:"), Section::Today));
        assert!(matches_header(&Block::heading("h", "  backlog  "), Section::Backlog));
        assert!(matches_header(&Block::paragraph("p", "Daily::"), Section::Daily));
    }

    #[test]
    fn header_match_is_prefix_based() {
        assert!(matches_header(&Block::heading("h", "Today: (2/5)"), Section::Today));
        assert!(matches_header(&Block::heading("h", "Todayish"), Section::Today));
        assert!(!matches_header(&Block::heading("h", "Not today"), Section::Today));
    }

    #[test]
    fn only_headings_and_paragraphs_match() {
        assert!(!matches_header(&Block::todo("t", "Today", false), Section::Today));
        assert!(!matches_header(&Block::other("o"), Section::Today));
    }

    #[test]
    fn followers_respect_conventional_order() {
        assert_eq!(Section::Daily.followers().len(), 3);
        assert_eq!(Section::Backlog.followers(), &[]);
        assert!(Section::Daily < Section::Backlog);
    }
}
