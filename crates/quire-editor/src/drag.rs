//! Drag-and-drop block reordering.
//!
//! Turns a continuous pointer stream into one committed move. A gesture runs
//! `Idle → Armed → Dragging → Idle`:
//!
//! ```text
//!   grant ──► Armed ──(travel > threshold)──► Dragging ──release──► commit
//!     │          │                               │
//!     │          └────────release/terminate──────┴──► Idle (state cleared)
//!     └─ on text input: rejected
//! ```
//!
//! While dragging, every pointer move re-resolves a drop target against the
//! latest [`LayoutRegistry`] snapshot. Geometry is best-effort: a block
//! without a measured rect is simply not a candidate, and a target that
//! disappears before release turns the commit into a silent no-op.

use serde::{Deserialize, Serialize};

use quire_types::{Block, BlockId, Point};

use crate::config::DragTuning;
use crate::layout::{LayoutEntry, LayoutRegistry};
use crate::model;

/// Where the dragged block lands relative to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    /// Dropped onto the target; takes the target's slot. Never offered by text blocks.
    Replace,
}

/// The block a drop is positioned against, or one of the list ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DropTarget {
    First,
    Last,
    Block(BlockId),
}

/// Live hover state shown while dragging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropHover {
    pub target: DropTarget,
    pub position: DropPosition,
}

/// Per-gesture state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed, but not yet moved past the activation threshold.
    Armed { block: BlockId, origin: Point },
    Dragging {
        block: BlockId,
        origin: Point,
        current: Point,
    },
}

impl GestureState {
    /// The pressed or dragged block, if a gesture is in flight.
    pub fn block(&self) -> Option<BlockId> {
        match self {
            GestureState::Idle => None,
            GestureState::Armed { block, .. } | GestureState::Dragging { block, .. } => Some(*block),
        }
    }
}

/// Coarse phase for views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    #[default]
    Idle,
    Armed,
    Dragging,
}

/// Result of a grant request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    Armed,
    /// Press landed on a text input; caret placement wins.
    RejectedTextInput,
    /// Another gesture was in flight; everything was reset and this grant dropped.
    ForcedReset,
}

/// A resolved reorder, ready for [`model::move_within`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveCommit {
    pub block: BlockId,
    pub from: usize,
    pub to: usize,
}

/// Serializable drag state for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragView {
    pub phase: DragPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging: Option<BlockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<DropHover>,
}

/// The one drag-and-drop engine. At most one gesture exists at a time.
#[derive(Debug, Default)]
pub struct DragReorderEngine {
    tuning: DragTuning,
    gesture: GestureState,
    hover: Option<DropHover>,
}

impl DragReorderEngine {
    pub fn new(tuning: DragTuning) -> Self {
        Self {
            tuning,
            gesture: GestureState::Idle,
            hover: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn hover(&self) -> Option<DropHover> {
        self.hover
    }

    pub fn phase(&self) -> DragPhase {
        match self.gesture {
            GestureState::Idle => DragPhase::Idle,
            GestureState::Armed { .. } => DragPhase::Armed,
            GestureState::Dragging { .. } => DragPhase::Dragging,
        }
    }

    /// The block being dragged (only once past the threshold).
    pub fn dragging(&self) -> Option<BlockId> {
        match self.gesture {
            GestureState::Dragging { block, .. } => Some(block),
            _ => None,
        }
    }

    pub fn view(&self) -> DragView {
        DragView {
            phase: self.phase(),
            dragging: self.dragging(),
            hover: self.hover,
        }
    }

    // =========================================================================
    // Gesture lifecycle
    // =========================================================================

    /// Pointer went down on a block's drag handle.
    pub fn grant(&mut self, block: BlockId, origin: Point, on_text_input: bool) -> GrantOutcome {
        if self.gesture != GestureState::Idle {
            tracing::debug!("drag grant for {block:?} while a gesture is active, resetting");
            self.reset();
            return GrantOutcome::ForcedReset;
        }
        if on_text_input {
            tracing::trace!("drag grant for {block:?} rejected: press on text input");
            return GrantOutcome::RejectedTextInput;
        }
        self.gesture = GestureState::Armed { block, origin };
        tracing::debug!("drag armed for {block:?}");
        GrantOutcome::Armed
    }

    /// Pointer moved. Returns the new hover only when it changed.
    pub fn pointer_move(
        &mut self,
        point: Point,
        registry: &LayoutRegistry,
        blocks: &[Block],
    ) -> Option<DropHover> {
        let block = match self.gesture {
            GestureState::Idle => return None,
            GestureState::Armed { block, origin } => {
                if origin.distance(point) <= self.tuning.activation_threshold {
                    return None;
                }
                tracing::debug!("drag started for {block:?}");
                self.gesture = GestureState::Dragging {
                    block,
                    origin,
                    current: point,
                };
                block
            }
            GestureState::Dragging { block, origin, .. } => {
                self.gesture = GestureState::Dragging {
                    block,
                    origin,
                    current: point,
                };
                block
            }
        };

        let entries = registry.snapshot(blocks, Some(block));
        let next = resolve_drop(&entries, point.y, &self.tuning);
        if self.hover == Some(next) {
            return None;
        }
        self.hover = Some(next);
        Some(next)
    }

    /// Pointer released. Clears all drag state and returns the move to apply,
    /// if the gesture was a real drag with a still-valid target.
    pub fn release(&mut self, blocks: &[Block]) -> Option<MoveCommit> {
        let gesture = self.gesture;
        let hover = self.hover;
        self.reset();

        let GestureState::Dragging { block, .. } = gesture else {
            return None;
        };
        let hover = hover?;
        let (from, to) = final_index(blocks, block, hover)?;
        Some(MoveCommit { block, from, to })
    }

    /// `id` lost its layout entry or left the document. If it was the hover
    /// target, there is no target until the next pointer move re-resolves.
    pub fn forget(&mut self, id: BlockId) -> bool {
        if self.hover.is_some_and(|h| h.target == DropTarget::Block(id)) {
            tracing::debug!("drop target {id:?} went away mid-gesture");
            self.hover = None;
            return true;
        }
        false
    }

    /// Host took the gesture away (system gesture, cancel). Never commits.
    pub fn terminate(&mut self) {
        if self.gesture != GestureState::Idle {
            tracing::debug!("drag terminated by host");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.gesture = GestureState::Idle;
        self.hover = None;
    }
}

// ============================================================================
// Drop resolution
// ============================================================================

/// Pick the drop target for a pointer at `y` among sorted candidates.
///
/// Above the first block (beyond the margin) snaps before it, below the last
/// snaps after it. In between, the closest edge across all candidates wins:
/// top → before, center → replace (non-text only), bottom → after. Candidates
/// are visited top to bottom and a later one wins an exact tie.
pub fn resolve_drop(entries: &[LayoutEntry], y: f32, tuning: &DragTuning) -> DropHover {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return DropHover {
            target: DropTarget::First,
            position: DropPosition::Before,
        };
    };

    if y < first.rect.top() - tuning.edge_margin {
        return DropHover {
            target: DropTarget::Block(first.id),
            position: DropPosition::Before,
        };
    }
    if y > last.rect.bottom() + tuning.edge_margin {
        return DropHover {
            target: DropTarget::Block(last.id),
            position: DropPosition::After,
        };
    }

    let mut best: Option<(f32, DropHover)> = None;
    for entry in entries {
        let edges = [
            (entry.rect.top(), DropPosition::Before),
            (entry.rect.center_y(), DropPosition::Replace),
            (entry.rect.bottom(), DropPosition::After),
        ];
        for (edge_y, position) in edges {
            if position == DropPosition::Replace && !entry.kind.accepts_replace_drop() {
                continue;
            }
            let distance = (y - edge_y).abs();
            if best.is_none_or(|(d, _)| distance <= d) {
                best = Some((
                    distance,
                    DropHover {
                        target: DropTarget::Block(entry.id),
                        position,
                    },
                ));
            }
        }
    }

    // entries is non-empty and every entry offers top/bottom, so best is set
    best.map(|(_, hover)| hover).unwrap_or(DropHover {
        target: DropTarget::Block(last.id),
        position: DropPosition::After,
    })
}

/// Compute `(from, to)` for moving `dragged` to `hover`, with `to` in
/// post-removal coordinates. `None` if either block is gone.
pub fn final_index(blocks: &[Block], dragged: BlockId, hover: DropHover) -> Option<(usize, usize)> {
    let Some(from) = model::index_of(blocks, dragged) else {
        tracing::debug!("drag commit aborted: dragged block {dragged:?} no longer present");
        return None;
    };
    let last = blocks.len().saturating_sub(1);

    let to = match hover.target {
        DropTarget::First => 0,
        DropTarget::Last => last,
        DropTarget::Block(target) => {
            let Some(target_ix) = model::index_of(blocks, target) else {
                tracing::debug!("drag commit aborted: target {target:?} no longer present");
                return None;
            };
            let mut ix = match hover.position {
                DropPosition::Before | DropPosition::Replace => target_ix,
                DropPosition::After => target_ix + 1,
            };
            if from < target_ix {
                ix -= 1;
            }
            ix.min(last)
        }
    };
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::{BlockKind, LayoutRect};

    fn rect(y: f32, h: f32) -> LayoutRect {
        LayoutRect::new(0.0, y, 320.0, h)
    }

    fn measured(blocks: &[Block], rects: &[(usize, LayoutRect)]) -> LayoutRegistry {
        let mut reg = LayoutRegistry::new();
        for (ix, r) in rects {
            reg.mount(blocks[*ix].id);
            reg.record(blocks[*ix].id, *r);
        }
        reg
    }

    fn entry(block: &Block, r: LayoutRect) -> LayoutEntry {
        LayoutEntry {
            id: block.id,
            kind: block.kind,
            rect: r,
        }
    }

    fn drag_to(engine: &mut DragReorderEngine, reg: &LayoutRegistry, blocks: &[Block], y: f32) -> Option<DropHover> {
        engine.pointer_move(Point::new(10.0, y), reg, blocks)
    }

    // ── Scenario: reorder ───────────────────────────────────────────────

    #[test]
    fn test_scenario_drag_text_below_last_text() {
        let blocks = vec![Block::text("a"), Block::card("b"), Block::text("c")];
        let reg = measured(&blocks, &[(0, rect(0.0, 50.0)), (1, rect(100.0, 50.0)), (2, rect(200.0, 50.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());

        assert_eq!(engine.grant(blocks[0].id, Point::new(10.0, 25.0), false), GrantOutcome::Armed);
        let hover = drag_to(&mut engine, &reg, &blocks, 225.0).unwrap();
        assert_eq!(hover.target, DropTarget::Block(blocks[2].id));
        assert_eq!(hover.position, DropPosition::After);

        let commit = engine.release(&blocks).unwrap();
        let out = model::move_within(&blocks, commit.from, commit.to);
        let order: Vec<_> = out.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
        assert_eq!(engine.phase(), DragPhase::Idle);
        assert!(engine.hover().is_none());
    }

    // ── Resolution ──────────────────────────────────────────────────────

    #[test]
    fn test_empty_snapshot_targets_first() {
        let hover = resolve_drop(&[], 500.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::First);
        assert_eq!(hover.position, DropPosition::Before);
    }

    #[test]
    fn test_above_first_margin_goes_before_first() {
        let a = Block::text("a");
        let b = Block::text("b");
        let entries = [entry(&a, rect(100.0, 40.0)), entry(&b, rect(150.0, 40.0))];
        let hover = resolve_drop(&entries, 79.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(a.id));
        assert_eq!(hover.position, DropPosition::Before);
    }

    #[test]
    fn test_below_last_margin_goes_after_last() {
        let a = Block::text("a");
        let b = Block::card("b");
        let entries = [entry(&a, rect(100.0, 40.0)), entry(&b, rect(150.0, 40.0))];
        let hover = resolve_drop(&entries, 211.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(b.id));
        assert_eq!(hover.position, DropPosition::After);
    }

    #[test]
    fn test_card_center_is_replace() {
        let card = Block::card("c");
        let entries = [entry(&card, rect(100.0, 60.0))];
        let hover = resolve_drop(&entries, 131.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(card.id));
        assert_eq!(hover.position, DropPosition::Replace);
    }

    #[test]
    fn test_image_center_is_replace() {
        let img = Block::image("file:///a.png");
        let entries = [entry(&img, rect(0.0, 200.0))];
        let hover = resolve_drop(&entries, 95.0, &DragTuning::default());
        assert_eq!(hover.position, DropPosition::Replace);
    }

    #[test]
    fn test_text_center_is_never_replace() {
        let text = Block::text("t");
        let entries = [entry(&text, rect(100.0, 60.0))];
        let above_center = resolve_drop(&entries, 128.0, &DragTuning::default());
        assert_eq!(above_center.position, DropPosition::Before);
        let below_center = resolve_drop(&entries, 132.0, &DragTuning::default());
        assert_eq!(below_center.position, DropPosition::After);
    }

    #[test]
    fn test_equal_distance_prefers_later_edge() {
        let a = Block::text("a");
        let b = Block::text("b");
        // a.bottom == 140, b.top == 160; pointer at 150 is equidistant.
        let entries = [entry(&a, rect(100.0, 40.0)), entry(&b, rect(160.0, 40.0))];
        let hover = resolve_drop(&entries, 150.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(b.id));
        assert_eq!(hover.position, DropPosition::Before);
    }

    #[test]
    fn test_closest_edge_across_all_candidates() {
        let a = Block::card("a");
        let b = Block::card("b");
        let entries = [entry(&a, rect(0.0, 100.0)), entry(&b, rect(100.0, 100.0))];
        // 97 is 3 from both a.bottom and b.top (100); the later edge wins
        let hover = resolve_drop(&entries, 97.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(b.id));
        assert_eq!(hover.position, DropPosition::Before);
        let hover = resolve_drop(&entries, 52.0, &DragTuning::default());
        assert_eq!(hover.target, DropTarget::Block(a.id));
        assert_eq!(hover.position, DropPosition::Replace);
    }

    #[test]
    fn test_custom_margin_is_honored() {
        let a = Block::text("a");
        let entries = [entry(&a, rect(100.0, 40.0))];
        let tuning = DragTuning {
            edge_margin: 0.0,
            ..DragTuning::default()
        };
        let hover = resolve_drop(&entries, 99.0, &tuning);
        assert_eq!(hover.position, DropPosition::Before);
    }

    // ── Gesture state machine ───────────────────────────────────────────

    #[test]
    fn test_threshold_must_be_exceeded() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let reg = measured(&blocks, &[(1, rect(100.0, 40.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);

        // 3-4-5 triangle: exactly 5 px is not enough
        assert!(engine.pointer_move(Point::new(3.0, 4.0), &reg, &blocks).is_none());
        assert_eq!(engine.phase(), DragPhase::Armed);

        assert!(engine.pointer_move(Point::new(3.0, 4.5), &reg, &blocks).is_some());
        assert_eq!(engine.phase(), DragPhase::Dragging);
        assert_eq!(engine.dragging(), Some(blocks[0].id));
    }

    #[test]
    fn test_grant_on_text_input_is_rejected() {
        let mut engine = DragReorderEngine::default();
        let outcome = engine.grant(BlockId::new(), Point::default(), true);
        assert_eq!(outcome, GrantOutcome::RejectedTextInput);
        assert_eq!(engine.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_second_grant_forces_reset() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let reg = measured(&blocks, &[(1, rect(100.0, 40.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);
        engine.pointer_move(Point::new(0.0, 90.0), &reg, &blocks);
        assert!(engine.hover().is_some());

        let outcome = engine.grant(blocks[1].id, Point::new(0.0, 0.0), false);
        assert_eq!(outcome, GrantOutcome::ForcedReset);
        assert_eq!(engine.phase(), DragPhase::Idle);
        assert!(engine.hover().is_none());
    }

    #[test]
    fn test_hover_reported_only_on_change() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let reg = measured(&blocks, &[(1, rect(100.0, 40.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);
        assert!(drag_to(&mut engine, &reg, &blocks, 95.0).is_some());
        assert!(drag_to(&mut engine, &reg, &blocks, 96.0).is_none());
        assert!(drag_to(&mut engine, &reg, &blocks, 139.0).is_some());
    }

    #[test]
    fn test_tap_without_drag_commits_nothing() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let mut engine = DragReorderEngine::default();
        engine.grant(blocks[0].id, Point::default(), false);
        assert!(engine.release(&blocks).is_none());
        assert_eq!(engine.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_terminate_clears_everything() {
        let blocks = vec![Block::text("a"), Block::text("b")];
        let reg = measured(&blocks, &[(1, rect(100.0, 40.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);
        drag_to(&mut engine, &reg, &blocks, 200.0);
        engine.terminate();
        assert_eq!(engine.view(), DragView::default());
        assert!(engine.release(&blocks).is_none());
    }

    #[test]
    fn test_target_vanishing_mid_gesture_is_silent() {
        let blocks = vec![Block::text("a"), Block::card("b"), Block::text("c")];
        let reg = measured(&blocks, &[(1, rect(100.0, 50.0)), (2, rect(200.0, 50.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);
        drag_to(&mut engine, &reg, &blocks, 260.0);

        let after_delete = model::remove_at(&blocks, 2);
        assert!(engine.release(&after_delete).is_none());
        assert_eq!(engine.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_forgotten_target_is_no_target() {
        let blocks = vec![Block::text("a"), Block::card("b"), Block::text("c")];
        let reg = measured(&blocks, &[(1, rect(100.0, 50.0)), (2, rect(200.0, 50.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 0.0), false);
        drag_to(&mut engine, &reg, &blocks, 225.0);

        assert!(!engine.forget(blocks[1].id));
        assert!(engine.hover().is_some());
        assert!(engine.forget(blocks[2].id));
        assert!(engine.view().hover.is_none());
        assert_eq!(engine.phase(), DragPhase::Dragging);
        assert!(engine.release(&blocks).is_none());
    }

    #[test]
    fn test_gesture_block() {
        let block = Block::text("a");
        let mut engine = DragReorderEngine::new(DragTuning::default());
        assert_eq!(engine.gesture().block(), None);
        engine.grant(block.id, Point::new(0.0, 0.0), false);
        assert_eq!(engine.gesture().block(), Some(block.id));
    }

    #[test]
    fn test_dragged_block_not_a_candidate() {
        let blocks = vec![Block::card("a")];
        let reg = measured(&blocks, &[(0, rect(0.0, 100.0))]);
        let mut engine = DragReorderEngine::new(DragTuning::default());
        engine.grant(blocks[0].id, Point::new(0.0, 50.0), false);
        let hover = drag_to(&mut engine, &reg, &blocks, 20.0).unwrap();
        assert_eq!(hover.target, DropTarget::First);
    }

    // ── Final index ─────────────────────────────────────────────────────

    fn five() -> Vec<Block> {
        ["a", "b", "c", "d", "e"].iter().map(|t| Block::text(*t)).collect()
    }

    fn hover(target: DropTarget, position: DropPosition) -> DropHover {
        DropHover { target, position }
    }

    #[test]
    fn test_final_index_sentinels() {
        let blocks = five();
        let dragged = blocks[2].id;
        assert_eq!(final_index(&blocks, dragged, hover(DropTarget::First, DropPosition::Before)), Some((2, 0)));
        assert_eq!(final_index(&blocks, dragged, hover(DropTarget::Last, DropPosition::After)), Some((2, 4)));
    }

    #[test]
    fn test_final_index_forward_compensates_removal() {
        let blocks = five();
        let target = DropTarget::Block(blocks[3].id);
        assert_eq!(final_index(&blocks, blocks[0].id, hover(target, DropPosition::Before)), Some((0, 2)));
        assert_eq!(final_index(&blocks, blocks[0].id, hover(target, DropPosition::After)), Some((0, 3)));
        assert_eq!(final_index(&blocks, blocks[0].id, hover(target, DropPosition::Replace)), Some((0, 2)));
    }

    #[test]
    fn test_final_index_backward() {
        let blocks = five();
        let target = DropTarget::Block(blocks[1].id);
        assert_eq!(final_index(&blocks, blocks[4].id, hover(target, DropPosition::Before)), Some((4, 1)));
        assert_eq!(final_index(&blocks, blocks[4].id, hover(target, DropPosition::After)), Some((4, 2)));
    }

    #[test]
    fn test_final_index_clamps_to_last() {
        let blocks = five();
        let target = DropTarget::Block(blocks[4].id);
        assert_eq!(final_index(&blocks, blocks[4].id, hover(target, DropPosition::After)), Some((4, 4)));
    }

    #[test]
    fn test_final_index_unknown_ids() {
        let blocks = five();
        let stray = hover(DropTarget::Block(BlockId::new()), DropPosition::Before);
        assert_eq!(final_index(&blocks, blocks[0].id, stray), None);
        assert_eq!(final_index(&blocks, BlockId::new(), hover(DropTarget::First, DropPosition::Before)), None);
    }

    #[test]
    fn test_kind_of_entry_comes_from_block() {
        let blocks = vec![Block::new(BlockKind::GridCard, "g")];
        let reg = measured(&blocks, &[(0, rect(0.0, 10.0))]);
        assert_eq!(reg.snapshot(&blocks, None)[0].kind, BlockKind::GridCard);
    }
}
