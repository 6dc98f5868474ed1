//! Shared block, format, and geometry types for Quire.
//!
//! This crate is the leaf of the workspace: typed IDs, the block record,
//! formatting records, and the screen-space rectangles used for drag-and-drop.
//! It has **no internal quire dependencies** and no behavior beyond
//! construction and small queries. Editing logic lives in `quire-editor`.
//!
//! # Key Types
//!
//! | Type             | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | [`Block`]        | One content unit (text, card, grid-card, image)|
//! | [`BlockKind`]    | What a block is                                |
//! | [`Placement`]    | Full width or half of a grid pair              |
//! | [`FormatRecord`] | Bold/italic plus at most one heading           |
//! | [`BlockId`]      | Stable block identity                          |
//! | [`GroupId`]      | Links the two halves of a grid pair            |
//! | [`LayoutRect`]   | Last measured on-screen rectangle              |

pub mod block;
pub mod format;
pub mod geometry;
pub mod ids;

// Re-export primary types at crate root for convenience.
pub use block::{Block, BlockKind, GridSide, LayoutMode, Placement};
pub use format::{FormatFlags, FormatRecord, HeadingLevel};
pub use geometry::{LayoutRect, Point};
pub use ids::{BlockId, GroupId};
