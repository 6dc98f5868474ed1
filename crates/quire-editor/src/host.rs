//! The seam between the editor core and whatever renders it.
//!
//! The core never touches views. It asks the host two questions: "where is
//! this block on screen right now?" and "can you put the caret in this
//! block?" Both may legitimately fail while native layout is still settling.

use quire_types::{BlockId, LayoutRect};

/// Rendering-side collaborator consumed by [`EditorSession`](crate::EditorSession).
pub trait EditorHost {
    /// Current global rectangle of a mounted block, or `None` if the block
    /// has no laid-out element yet.
    fn measure(&mut self, id: BlockId, index: usize) -> Option<LayoutRect>;

    /// Give keyboard focus to a block, placing the caret at `cursor` (char
    /// offset) when provided. Returns `false` if the block has no live
    /// element to focus yet; the session will retry.
    fn focus(&mut self, id: BlockId, cursor: Option<usize>) -> bool;
}
