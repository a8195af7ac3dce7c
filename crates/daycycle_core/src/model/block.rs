//! Block snapshot model.
//!
//! # Responsibility
//! - Represent one top-level page block with identity, kind, plain text
//!   and checkbox state.
//! - Provide the `NewTodo` creation payload for migration copies and
//!   placeholders.
//!
//! # Invariants
//! - `id` is an opaque, stable identifier assigned by the document store.
//! - A block is never mutated in place; copies carry `checked = false`.

use serde::{Deserialize, Serialize};

/// Opaque, stable block identifier assigned by the document store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BlockId = String;

/// Default visual style for freshly created checklist items.
pub const DEFAULT_COLOR: &str = "default";

/// Kind discriminant for top-level page blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Section header candidate (any heading level).
    Heading,
    /// Plain paragraph. Also a section header candidate; an empty one is
    /// a visual separator between checklist groups.
    Paragraph,
    /// Checklist item with a checkbox.
    Todo,
    /// Any block type this core does not act on (toggle, divider, ...).
    ///
    /// Kept in the list so index arithmetic stays aligned with the
    /// remote page; never matched as header, todo or separator.
    Other,
}

/// Immutable snapshot of one top-level page block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Stable store-assigned identifier.
    pub id: BlockId,
    pub kind: BlockKind,
    /// Plain text joined from the block's rich-text spans, trimmed.
    pub text: String,
    /// Checkbox state; meaningful only when `kind == BlockKind::Todo`.
    pub checked: bool,
    /// Visual style carried over when the block is cloned.
    pub color: String,
}

impl Block {
    /// Creates a heading snapshot.
    pub fn heading(id: impl Into<BlockId>, text: impl Into<String>) -> Self {
        Self::of_kind(id, BlockKind::Heading, text)
    }

    /// Creates a paragraph snapshot.
    pub fn paragraph(id: impl Into<BlockId>, text: impl Into<String>) -> Self {
        Self::of_kind(id, BlockKind::Paragraph, text)
    }

    /// Creates a checklist item snapshot.
    pub fn todo(id: impl Into<BlockId>, text: impl Into<String>, checked: bool) -> Self {
        let mut block = Self::of_kind(id, BlockKind::Todo, text);
        block.checked = checked;
        block
    }

    /// Creates a snapshot for a block type the core does not act on.
    pub fn other(id: impl Into<BlockId>) -> Self {
        Self::of_kind(id, BlockKind::Other, "")
    }

    fn of_kind(id: impl Into<BlockId>, kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            checked: false,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Returns whether this block is a checklist item.
    pub fn is_todo(&self) -> bool {
        self.kind == BlockKind::Todo
    }

    /// Returns whether this block is an empty paragraph separator.
    ///
    /// Only genuine paragraphs qualify; `Other` blocks with empty text do
    /// not, so contiguity repair never deletes blocks it cannot decode.
    pub fn is_empty_paragraph(&self) -> bool {
        self.kind == BlockKind::Paragraph && self.text.trim().is_empty()
    }

    /// Prepares an unchecked copy payload of this checklist item.
    ///
    /// # Invariants
    /// - Text and visual style are preserved; `checked` is always false.
    pub fn as_new_todo(&self) -> NewTodo {
        NewTodo {
            text: self.text.clone(),
            color: self.color.clone(),
        }
    }
}

/// Creation payload for a checklist item: always inserted unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,
    pub color: String,
}

impl NewTodo {
    /// Payload for an empty placeholder item that keeps a section from
    /// rendering empty.
    pub fn placeholder() -> Self {
        Self {
            text: String::new(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}
