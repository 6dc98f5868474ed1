//! Pure operations over the ordered block sequence.
//!
//! Every function returns a new `Vec`; a borrowed input is never mutated. None of them panic on a stale index: inserts clamp, the rest log
//! a warning and return an unchanged copy. Re-seeding an emptied document is
//! the session's job, not this module's.

use quire_types::{Block, BlockId, LayoutMode, Placement};

/// Splice `new_blocks` in at `index`, clamped to `[0, len]`.
pub fn insert_at(blocks: &[Block], index: usize, new_blocks: impl IntoIterator<Item = Block>) -> Vec<Block> {
    let at = if index > blocks.len() {
        tracing::warn!("insert_at({index}) past end of {} blocks, clamping", blocks.len());
        blocks.len()
    } else {
        index
    };
    let mut out = Vec::with_capacity(blocks.len() + 1);
    out.extend_from_slice(&blocks[..at]);
    out.extend(new_blocks);
    out.extend_from_slice(&blocks[at..]);
    out
}

/// Remove the block at `index`. May return an empty vec.
pub fn remove_at(blocks: &[Block], index: usize) -> Vec<Block> {
    if index >= blocks.len() {
        tracing::warn!("remove_at({index}) out of range for {} blocks, ignoring", blocks.len());
        return blocks.to_vec();
    }
    let mut out = blocks.to_vec();
    out.remove(index);
    out
}

/// Move the block at `from` so it ends up at `to`.
///
/// `to` is interpreted against the array with the moved block already
/// removed, and is clamped to that array's end.
pub fn move_within(blocks: &[Block], from: usize, to: usize) -> Vec<Block> {
    if from >= blocks.len() {
        tracing::warn!("move_within from {from} out of range for {} blocks, ignoring", blocks.len());
        return blocks.to_vec();
    }
    if from == to {
        return blocks.to_vec();
    }
    let mut out = blocks.to_vec();
    let moved = out.remove(from);
    let to = if to > out.len() {
        tracing::warn!("move_within to {to} past end of {} blocks, clamping", out.len());
        out.len()
    } else {
        to
    };
    out.insert(to, moved);
    out
}

/// Replace only the content of the block at `index`.
pub fn update_content_at(blocks: &[Block], index: usize, content: impl Into<String>) -> Vec<Block> {
    let mut out = blocks.to_vec();
    match out.get_mut(index) {
        Some(block) => block.content = content.into(),
        None => {
            tracing::warn!("update_content_at({index}) out of range for {} blocks, ignoring", blocks.len());
        }
    }
    out
}

fn is_pair(left: &Block, right: &Block) -> bool {
    left.layout_mode() == LayoutMode::GridLeft
        && right.layout_mode() == LayoutMode::GridRight
        && left.group_id() == right.group_id()
}

/// Turn grid halves that are not directly beside their partner back into
/// full-width blocks. A pair survives only as adjacent left then right.
pub fn unpair_orphans(mut blocks: Vec<Block>) -> Vec<Block> {
    let orphans: Vec<usize> = (0..blocks.len())
        .filter(|&ix| match blocks[ix].layout_mode() {
            LayoutMode::Full => false,
            LayoutMode::GridLeft => !blocks.get(ix + 1).is_some_and(|right| is_pair(&blocks[ix], right)),
            LayoutMode::GridRight => ix == 0 || !is_pair(&blocks[ix - 1], &blocks[ix]),
        })
        .collect();
    for ix in orphans {
        tracing::debug!("grid half {:?} lost its partner, now full width", blocks[ix].id);
        blocks[ix].placement = Placement::Full;
    }
    blocks
}

/// The block an empty document is re-seeded with.
pub fn default_block() -> Block {
    Block::empty_text()
}

/// Current index of a block, if it is still in the sequence.
pub fn index_of(blocks: &[Block], id: BlockId) -> Option<usize> {
    blocks.iter().position(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> Vec<Block> {
        texts.iter().map(|t| Block::text(*t)).collect()
    }

    fn contents(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    #[test]
    fn test_insert_at_middle() {
        let blocks = doc(&["a", "c"]);
        let out = insert_at(&blocks, 1, [Block::text("b")]);
        assert_eq!(contents(&out), ["a", "b", "c"]);
        assert_eq!(contents(&blocks), ["a", "c"]);
    }

    #[test]
    fn test_insert_at_clamps_past_end() {
        let blocks = doc(&["a"]);
        let out = insert_at(&blocks, 99, [Block::text("z")]);
        assert_eq!(contents(&out), ["a", "z"]);
    }

    #[test]
    fn test_insert_many() {
        let blocks = doc(&["a", "d"]);
        let out = insert_at(&blocks, 1, doc(&["b", "c"]));
        assert_eq!(contents(&out), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_remove_at() {
        let blocks = doc(&["a", "b", "c"]);
        assert_eq!(contents(&remove_at(&blocks, 1)), ["a", "c"]);
        assert_eq!(contents(&remove_at(&blocks, 7)), ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_last_block_may_empty() {
        let blocks = doc(&["only"]);
        assert!(remove_at(&blocks, 0).is_empty());
    }

    #[test]
    fn test_move_within_forward_is_post_removal() {
        let blocks = doc(&["a", "b", "c"]);
        // Remove "a" → [b, c]; insert at 2 → [b, c, a]
        assert_eq!(contents(&move_within(&blocks, 0, 2)), ["b", "c", "a"]);
        // Insert at 1 → [b, a, c]
        assert_eq!(contents(&move_within(&blocks, 0, 1)), ["b", "a", "c"]);
    }

    #[test]
    fn test_move_within_backward() {
        let blocks = doc(&["a", "b", "c"]);
        assert_eq!(contents(&move_within(&blocks, 2, 0)), ["c", "a", "b"]);
    }

    #[test]
    fn test_move_within_same_index_is_noop() {
        let blocks = doc(&["a", "b"]);
        assert_eq!(move_within(&blocks, 1, 1), blocks);
    }

    #[test]
    fn test_move_within_clamps_and_ignores_bad_source() {
        let blocks = doc(&["a", "b", "c"]);
        assert_eq!(contents(&move_within(&blocks, 0, 50)), ["b", "c", "a"]);
        assert_eq!(move_within(&blocks, 9, 0), blocks);
    }

    #[test]
    fn test_move_preserves_ids() {
        let blocks = doc(&["a", "b"]);
        let out = move_within(&blocks, 0, 1);
        assert_eq!(out[1].id, blocks[0].id);
        assert_eq!(out[0].id, blocks[1].id);
    }

    #[test]
    fn test_update_content_at_keeps_other_fields() {
        let blocks = vec![Block::card("old")];
        let out = update_content_at(&blocks, 0, "new");
        assert_eq!(out[0].content, "new");
        assert_eq!(out[0].id, blocks[0].id);
        assert_eq!(out[0].kind, blocks[0].kind);
        assert_eq!(update_content_at(&blocks, 3, "x"), blocks);
    }

    #[test]
    fn test_index_of() {
        let blocks = doc(&["a", "b"]);
        assert_eq!(index_of(&blocks, blocks[1].id), Some(1));
        assert_eq!(index_of(&blocks, quire_types::BlockId::new()), None);
    }

    #[test]
    fn test_unpair_orphans_keeps_adjacent_pairs() {
        let (l, r) = Block::grid_pair("l", "r");
        let blocks = unpair_orphans(vec![Block::text("a"), l, r]);
        assert_eq!(blocks[1].layout_mode(), LayoutMode::GridLeft);
        assert_eq!(blocks[2].layout_mode(), LayoutMode::GridRight);
    }

    #[test]
    fn test_unpair_orphans_after_remove_and_split() {
        let (l, r) = Block::grid_pair("l", "r");
        let pair = vec![l, r, Block::text("a")];

        let lone = unpair_orphans(remove_at(&pair, 0));
        assert_eq!(lone[0].placement, Placement::Full);

        let apart = unpair_orphans(move_within(&pair, 0, 2));
        assert_eq!(contents(&apart), ["r", "a", "l"]);
        assert!(apart.iter().all(|b| b.placement == Placement::Full));
    }

    #[test]
    fn test_unpair_orphans_swapped_halves() {
        let (l, r) = Block::grid_pair("l", "r");
        let blocks = unpair_orphans(vec![r, l]);
        assert!(blocks.iter().all(|b| b.group_id().is_none()));
    }

    #[test]
    fn test_default_block_is_empty_text() {
        let block = default_block();
        assert_eq!(block.kind, quire_types::BlockKind::Text);
        assert!(block.content.is_empty());
        assert_ne!(block.id, default_block().id);
    }
}
