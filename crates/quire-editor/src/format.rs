//! Formatting state: what applies to the text being typed, and what each
//! unfocused block should look like.
//!
//! Three layers, in lookup order:
//!
//! 1. `active`: the record for the focused block; toggles edit it live.
//! 2. `per_block`: an index-keyed render cache.
//! 3. `Block::saved_formats`: the durable copy that travels with the block.
//!
//! Toggles write through all three at once, so formatting survives focus
//! loss without an explicit commit. Because the cache is keyed by index it
//! must be re-keyed after every structural change; see [`FormatStateStore::rekey`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use quire_types::{Block, BlockId, FormatRecord, HeadingLevel};

/// Font weight buckets a renderer maps onto its own font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Semibold,
    Bold,
}

/// Resolved text style for one block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    pub italic: bool,
}

/// Body text size.
pub const BODY_FONT_SIZE: f32 = 16.0;

impl DisplayStyle {
    /// Style for a format record. Heading sizes and weights are fixed per
    /// level; bold only ever raises the weight; italic is independent.
    pub fn for_format(format: FormatRecord) -> Self {
        let (font_size, heading_weight) = match format.heading {
            Some(HeadingLevel::H1) => (28.0, FontWeight::Bold),
            Some(HeadingLevel::H2) => (24.0, FontWeight::Bold),
            Some(HeadingLevel::H3) => (20.0, FontWeight::Semibold),
            None => (BODY_FONT_SIZE, FontWeight::Regular),
        };
        let weight = if format.bold {
            FontWeight::Bold
        } else {
            heading_weight
        };
        Self {
            font_size,
            weight,
            italic: format.italic,
        }
    }
}

/// Serializable snapshot for views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatView {
    pub active: FormatRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_index: Option<usize>,
}

/// Active format, focused index, and the per-block render cache.
#[derive(Debug, Default)]
pub struct FormatStateStore {
    active: FormatRecord,
    focused_index: Option<usize>,
    per_block: HashMap<usize, FormatRecord>,
}

impl FormatStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> FormatRecord {
        self.active
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    pub fn cached(&self, index: usize) -> Option<FormatRecord> {
        self.per_block.get(&index).copied()
    }

    pub fn view(&self) -> FormatView {
        FormatView {
            active: self.active,
            focused_index: self.focused_index,
        }
    }

    // =========================================================================
    // Toggles
    // =========================================================================

    /// Flip bold; headings untouched.
    pub fn toggle_bold(&mut self, blocks: &mut [Block]) {
        self.active.bold = !self.active.bold;
        self.write_through(blocks);
    }

    /// Flip italic; headings untouched.
    pub fn toggle_italic(&mut self, blocks: &mut [Block]) {
        self.active.italic = !self.active.italic;
        self.write_through(blocks);
    }

    /// Toggle a heading level.
    ///
    /// Headings are a block-level style that overrides inline emphasis:
    /// setting one clears bold, italic, and the other levels; toggling the
    /// current level off leaves the all-clear record.
    pub fn toggle_heading(&mut self, level: HeadingLevel, blocks: &mut [Block]) {
        self.active = if self.active.is_heading(level) {
            FormatRecord::CLEAR
        } else {
            FormatRecord::heading(level)
        };
        self.write_through(blocks);
    }

    /// Persist the active record onto the focused block without changing it.
    pub fn persist_active(&mut self, blocks: &mut [Block]) {
        self.write_through(blocks);
    }

    fn write_through(&mut self, blocks: &mut [Block]) {
        let Some(index) = self.focused_index else {
            return;
        };
        self.per_block.insert(index, self.active);
        match blocks.get_mut(index) {
            Some(block) => block.saved_formats = Some(self.active),
            None => tracing::warn!("focused index {index} has no block to persist formats onto"),
        }
    }

    // =========================================================================
    // Focus and content
    // =========================================================================

    /// Load the newly focused block's format into `active`.
    ///
    /// Precedence: render cache, then the block's saved formats, then clear.
    pub fn on_focus_change(&mut self, new_index: Option<usize>, blocks: &[Block]) {
        self.focused_index = new_index;
        self.active = match new_index {
            Some(index) => self
                .per_block
                .get(&index)
                .copied()
                .or_else(|| blocks.get(index).and_then(|b| b.saved_formats))
                .unwrap_or(FormatRecord::CLEAR),
            None => FormatRecord::CLEAR,
        };
    }

    /// An emptied block forgets its formatting so the next character typed
    /// into it starts clear.
    pub fn reset_if_empty(&mut self, index: usize, text: &str) {
        if !text.trim().is_empty() {
            return;
        }
        self.per_block.insert(index, FormatRecord::CLEAR);
        if self.focused_index == Some(index) {
            self.active = FormatRecord::CLEAR;
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// The record a block renders with: live `active` when focused.
    pub fn effective_format(&self, index: usize, block: &Block) -> FormatRecord {
        if self.focused_index == Some(index) {
            return self.active;
        }
        self.per_block
            .get(&index)
            .copied()
            .or(block.saved_formats)
            .unwrap_or(FormatRecord::CLEAR)
    }

    pub fn display_style(&self, index: usize, block: &Block) -> DisplayStyle {
        DisplayStyle::for_format(self.effective_format(index, block))
    }

    // =========================================================================
    // Structural changes
    // =========================================================================

    /// Re-key the index cache and focused index after the block array changed.
    ///
    /// Entries follow their block by id; entries for removed blocks are
    /// dropped. If the focused block was removed, focus is cleared and
    /// `active` reset.
    pub fn rekey(&mut self, before: &[Block], after: &[Block]) {
        let new_index: HashMap<BlockId, usize> =
            after.iter().enumerate().map(|(ix, b)| (b.id, ix)).collect();
        let lookup = |old: usize| before.get(old).and_then(|b| new_index.get(&b.id).copied());

        self.per_block = self
            .per_block
            .drain()
            .filter_map(|(old, rec)| lookup(old).map(|new| (new, rec)))
            .collect();

        if let Some(old) = self.focused_index {
            match lookup(old) {
                Some(new) => self.focused_index = Some(new),
                None => {
                    self.focused_index = None;
                    self.active = FormatRecord::CLEAR;
                }
            }
        }
    }

    /// Forget everything (document replaced).
    pub fn clear(&mut self) {
        self.active = FormatRecord::CLEAR;
        self.focused_index = None;
        self.per_block.clear();
    }
}
