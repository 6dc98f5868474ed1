//! Block types: what a note is made of.
//!
//! A note is an ordered sequence of [`Block`]s. Each block is one of four
//! kinds (text, card, grid-card, image) with a plain string payload:
//! typed text for the first three, a resource URI for images.
//!
//! ## Design: BlockKind + Placement
//!
//! `BlockKind` says what a block *is*. Where it sits on screen is a separate
//! concern carried by [`Placement`]: either full width, or one half of a
//! side-by-side grid pair. A grid placement always names its [`GroupId`].
//! A pair is only laid out as one when its left half sits directly before
//! its right half; the editor turns any half that loses its partner back
//! into a full-width block.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::format::FormatRecord;
use crate::ids::{BlockId, GroupId};

/// What a block *is* (content type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Plain typed text. One paragraph per block.
    #[default]
    Text,
    /// Boxed text. Enter inserts a line break instead of a new block.
    Card,
    /// Card laid out in a two-column grid pair.
    #[strum(serialize = "grid-card", serialize = "grid_card", serialize = "gridcard")]
    GridCard,
    /// Image; content is the resource URI.
    Image,
}

impl BlockKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Card => "card",
            BlockKind::GridCard => "grid-card",
            BlockKind::Image => "image",
        }
    }

    /// Whether the block accepts typed text at all.
    pub fn is_editable_text(&self) -> bool {
        match self {
            BlockKind::Text | BlockKind::Card | BlockKind::GridCard => true,
            BlockKind::Image => false,
        }
    }

    /// Whether a dragged block may be dropped *onto* this block.
    ///
    /// Text blocks are only ever before/after anchors.
    pub fn accepts_replace_drop(&self) -> bool {
        match self {
            BlockKind::Text => false,
            BlockKind::Card | BlockKind::GridCard | BlockKind::Image => true,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which half of a grid pair a block occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSide {
    Left,
    Right,
}

/// Flat rendering-width mode, as screens consume it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Full,
    GridLeft,
    GridRight,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Full => "full",
            LayoutMode::GridLeft => "grid-left",
            LayoutMode::GridRight => "grid-right",
        }
    }
}

/// Where a block sits horizontally. Affects rendering width only, never order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Full,
    Grid { side: GridSide, group: GroupId },
}

impl Placement {
    pub fn layout_mode(&self) -> LayoutMode {
        match self {
            Placement::Full => LayoutMode::Full,
            Placement::Grid {
                side: GridSide::Left,
                ..
            } => LayoutMode::GridLeft,
            Placement::Grid {
                side: GridSide::Right,
                ..
            } => LayoutMode::GridRight,
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Placement::Full => None,
            Placement::Grid { group, .. } => Some(*group),
        }
    }
}

/// One atomic unit of note content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identity; survives reorders, never reused.
    pub id: BlockId,
    /// Content type.
    pub kind: BlockKind,
    /// Text for text/card/grid-card, resource URI for image.
    pub content: String,
    /// Full width or one half of a grid pair.
    #[serde(default)]
    pub placement: Placement,
    /// Last committed formatting, used when the block is not focused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_formats: Option<FormatRecord>,
}

impl Block {
    /// Create a block of any kind with a fresh id.
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
            placement: Placement::Full,
            saved_formats: None,
        }
    }

    /// Create a new text block.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, content)
    }

    /// Create a new card block.
    pub fn card(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Card, content)
    }

    /// Create a new image block from a resource URI.
    pub fn image(uri: impl Into<String>) -> Self {
        Self::new(BlockKind::Image, uri)
    }

    /// Create a linked left/right grid-card pair sharing a fresh group id.
    pub fn grid_pair(left: impl Into<String>, right: impl Into<String>) -> (Self, Self) {
        let group = GroupId::new();
        let mut l = Self::new(BlockKind::GridCard, left);
        l.placement = Placement::Grid {
            side: GridSide::Left,
            group,
        };
        let mut r = Self::new(BlockKind::GridCard, right);
        r.placement = Placement::Grid {
            side: GridSide::Right,
            group,
        };
        (l, r)
    }

    /// The default block the editor seeds into an empty document.
    pub fn empty_text() -> Self {
        Self::text("")
    }

    /// Builder-style saved format.
    pub fn with_formats(mut self, formats: FormatRecord) -> Self {
        self.saved_formats = Some(formats);
        self
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.placement.layout_mode()
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.placement.group_id()
    }

    /// Content with surrounding whitespace removed is empty.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Content length in chars (cursor offsets are char offsets).
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

// ============================================================================
// Tests
// ============================================================================
