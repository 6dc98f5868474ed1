//! Last-measured on-screen geometry of mounted blocks.
//!
//! The registry is the drag engine's only view of the screen. Entries are
//! best-effort: measurement is asynchronous and repeated, so a block that
//! just mounted may have no rect yet, and a rect may be a frame stale. A
//! missing entry means "not a drop target", never an error.

use std::collections::{HashMap, HashSet};

use quire_types::{Block, BlockId, BlockKind, LayoutRect};

use crate::host::EditorHost;

/// One drop candidate: a block that has a measured rect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutEntry {
    pub id: BlockId,
    pub kind: BlockKind,
    pub rect: LayoutRect,
}

/// Map of block id → last measured rect, plus the set of mounted ids.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    rects: HashMap<BlockId, LayoutRect>,
    mounted: HashSet<BlockId>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Mark a block's element as mounted; it becomes measurable.
    pub fn mount(&mut self, id: BlockId) {
        self.mounted.insert(id);
    }

    pub fn is_mounted(&self, id: BlockId) -> bool {
        self.mounted.contains(&id)
    }

    /// Forget a block entirely (unmount or removal). Returns whether it had a rect.
    pub fn release(&mut self, id: BlockId) -> bool {
        self.mounted.remove(&id);
        self.rects.remove(&id).is_some()
    }

    /// Drop every entry whose id is not kept by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(BlockId) -> bool) {
        self.rects.retain(|id, _| keep(*id));
        self.mounted.retain(|id| keep(*id));
    }

    pub fn clear(&mut self) {
        self.rects.clear();
        self.mounted.clear();
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Ask the host for a block's current rect and upsert it.
    ///
    /// Ignored for blocks that are not mounted. Returns `true` only when the
    /// stored rect actually changed, so repeated passes over a settled layout
    /// are no-ops.
    pub fn measure(&mut self, id: BlockId, index: usize, host: &mut dyn EditorHost) -> bool {
        if !self.is_mounted(id) {
            tracing::trace!("skip measure for unmounted block {id:?}");
            return false;
        }
        match host.measure(id, index) {
            Some(rect) => self.record(id, rect),
            None => {
                tracing::trace!("host has no layout for block {id:?} yet");
                false
            }
        }
    }

    /// Store a rect for a mounted block. Returns whether anything changed.
    pub fn record(&mut self, id: BlockId, rect: LayoutRect) -> bool {
        if !self.is_mounted(id) {
            return false;
        }
        match self.rects.insert(id, rect) {
            Some(previous) => previous != rect,
            None => true,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: BlockId) -> Option<LayoutRect> {
        self.rects.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Drop candidates sorted top to bottom, excluding one id (the dragged block).
    ///
    /// Walks `blocks` in document order so equal `y` values keep document
    /// order after the stable sort.
    pub fn snapshot(&self, blocks: &[Block], excluding: Option<BlockId>) -> Vec<LayoutEntry> {
        let mut entries: Vec<LayoutEntry> = blocks
            .iter()
            .filter(|b| Some(b.id) != excluding)
            .filter_map(|b| {
                self.rects.get(&b.id).map(|rect| LayoutEntry {
                    id: b.id,
                    kind: b.kind,
                    rect: *rect,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.rect.y.total_cmp(&b.rect.y));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHost(Option<LayoutRect>);

    impl EditorHost for FixedHost {
        fn measure(&mut self, _id: BlockId, _index: usize) -> Option<LayoutRect> {
            self.0
        }

        fn focus(&mut self, _id: BlockId, _cursor: Option<usize>) -> bool {
            true
        }
    }

    fn rect(y: f32) -> LayoutRect {
        LayoutRect::new(0.0, y, 320.0, 40.0)
    }

    #[test]
    fn test_measure_requires_mount() {
        let mut reg = LayoutRegistry::new();
        let id = BlockId::new();
        let mut host = FixedHost(Some(rect(10.0)));
        assert!(!reg.measure(id, 0, &mut host));
        assert!(reg.get(id).is_none());

        reg.mount(id);
        assert!(reg.measure(id, 0, &mut host));
        assert_eq!(reg.get(id), Some(rect(10.0)));
    }

    #[test]
    fn test_measure_is_idempotent() {
        let mut reg = LayoutRegistry::new();
        let id = BlockId::new();
        reg.mount(id);
        let mut host = FixedHost(Some(rect(10.0)));
        assert!(reg.measure(id, 0, &mut host));
        assert!(!reg.measure(id, 0, &mut host));
        assert!(!reg.measure(id, 0, &mut host));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_measure_without_layout_keeps_previous() {
        let mut reg = LayoutRegistry::new();
        let id = BlockId::new();
        reg.mount(id);
        reg.record(id, rect(5.0));
        assert!(!reg.measure(id, 0, &mut FixedHost(None)));
        assert_eq!(reg.get(id), Some(rect(5.0)));
    }

    #[test]
    fn test_release_removes_entry() {
        let mut reg = LayoutRegistry::new();
        let id = BlockId::new();
        reg.mount(id);
        reg.record(id, rect(0.0));
        assert!(reg.release(id));
        assert!(reg.get(id).is_none());
        assert!(!reg.is_mounted(id));
        assert!(!reg.record(id, rect(0.0)));
    }

    #[test]
    fn test_snapshot_sorted_and_excluding() {
        let blocks = vec![Block::text("a"), Block::card("b"), Block::text("c")];
        let mut reg = LayoutRegistry::new();
        for b in &blocks {
            reg.mount(b.id);
        }
        reg.record(blocks[0].id, rect(300.0));
        reg.record(blocks[1].id, rect(100.0));
        reg.record(blocks[2].id, rect(200.0));

        let snap = reg.snapshot(&blocks, Some(blocks[2].id));
        let ids: Vec<_> = snap.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![blocks[1].id, blocks[0].id]);
        assert_eq!(snap[0].kind, BlockKind::Card);
    }

    #[test]
    fn test_snapshot_skips_unmeasured_blocks() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let mut reg = LayoutRegistry::new();
        reg.mount(blocks[0].id);
        reg.mount(blocks[1].id);
        reg.record(blocks[1].id, rect(0.0));
        assert_eq!(reg.snapshot(&blocks, None).len(), 1);
    }

    #[test]
    fn test_snapshot_ties_keep_document_order() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let mut reg = LayoutRegistry::new();
        for b in &blocks {
            reg.mount(b.id);
            reg.record(b.id, rect(50.0));
        }
        let snap = reg.snapshot(&blocks, None);
        assert_eq!(snap[0].id, blocks[0].id);
        assert_eq!(snap[1].id, blocks[1].id);
    }
}
