//! A stand-in for a phone screen.
//!
//! `StackedHost` lays blocks out top to bottom in one column, with grid
//! pairs sharing a row, and reports what a real view layer would: which
//! blocks just mounted, which changed size, where each one sits. Focus only
//! succeeds on blocks that have been rendered at least once, so a block the
//! editor has just inserted cannot take focus until the next frame.

use std::collections::{HashMap, HashSet};

use quire_editor::{EditorHost, EditorIntent};
use quire_types::{Block, BlockId, BlockKind, LayoutMode, LayoutRect, Point};

/// Screen width in points.
pub const SCREEN_WIDTH: f32 = 360.0;
/// Vertical gap between rows and horizontal gap inside a grid row.
pub const GAP: f32 = 8.0;
pub const LINE_HEIGHT: f32 = 24.0;
pub const CARD_PADDING: f32 = 16.0;
pub const IMAGE_HEIGHT: f32 = 200.0;

fn content_height(block: &Block) -> f32 {
    let lines = block.content.split('\n').count().max(1) as f32;
    match block.kind {
        BlockKind::Text => lines * LINE_HEIGHT,
        BlockKind::Card | BlockKind::GridCard => lines * LINE_HEIGHT + 2.0 * CARD_PADDING,
        BlockKind::Image => IMAGE_HEIGHT,
    }
}

/// Compute the rect of every block for a single-column layout.
pub fn layout(blocks: &[Block]) -> HashMap<BlockId, LayoutRect> {
    let mut rects = HashMap::with_capacity(blocks.len());
    let half = (SCREEN_WIDTH - GAP) / 2.0;
    let mut y = 0.0;
    let mut ix = 0;

    while ix < blocks.len() {
        let block = &blocks[ix];
        let partner = blocks
            .get(ix + 1)
            .filter(|next| block.layout_mode() == LayoutMode::GridLeft && next.group_id() == block.group_id());

        match partner {
            Some(right) => {
                let height = content_height(block).max(content_height(right));
                rects.insert(block.id, LayoutRect::new(0.0, y, half, height));
                rects.insert(right.id, LayoutRect::new(half + GAP, y, half, height));
                y += height + GAP;
                ix += 2;
            }
            None => {
                let height = content_height(block);
                rects.insert(block.id, LayoutRect::new(0.0, y, SCREEN_WIDTH, height));
                y += height + GAP;
                ix += 1;
            }
        }
    }
    rects
}

#[derive(Debug, Default)]
pub struct StackedHost {
    rects: HashMap<BlockId, LayoutRect>,
    rendered: HashSet<BlockId>,
    focused: Option<BlockId>,
    focus_calls: usize,
}

impl StackedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render `blocks`. Returns the events a view layer would emit:
    /// `BlockMounted` for new blocks, `ContentResized` for blocks whose
    /// rect moved or changed size.
    pub fn render(&mut self, blocks: &[Block]) -> Vec<EditorIntent> {
        let next = layout(blocks);
        let mut events = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            if !self.rendered.contains(&block.id) {
                events.push(EditorIntent::BlockMounted { index });
            } else if self.rects.get(&block.id) != next.get(&block.id) {
                events.push(EditorIntent::ContentResized { index });
            }
        }

        self.rendered = blocks.iter().map(|b| b.id).collect();
        if self.focused.is_some_and(|id| !self.rendered.contains(&id)) {
            self.focused = None;
        }
        self.rects = next;
        events
    }

    pub fn rect(&self, id: BlockId) -> Option<LayoutRect> {
        self.rects.get(&id).copied()
    }

    /// Index of the block under a point, for taps.
    pub fn block_at(&self, blocks: &[Block], point: Point) -> Option<usize> {
        blocks
            .iter()
            .position(|b| self.rects.get(&b.id).is_some_and(|r| r.contains(point)))
    }

    pub fn focused(&self) -> Option<BlockId> {
        self.focused
    }

    pub fn focus_calls(&self) -> usize {
        self.focus_calls
    }
}

impl EditorHost for StackedHost {
    fn measure(&mut self, id: BlockId, _index: usize) -> Option<LayoutRect> {
        if !self.rendered.contains(&id) {
            return None;
        }
        self.rects.get(&id).copied()
    }

    fn focus(&mut self, id: BlockId, cursor: Option<usize>) -> bool {
        self.focus_calls += 1;
        if !self.rendered.contains(&id) {
            tracing::trace!("host: {id:?} not rendered yet, focus refused");
            return false;
        }
        tracing::debug!("host: focus {id:?} at {cursor:?}");
        self.focused = Some(id);
        true
    }
}
