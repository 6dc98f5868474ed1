//! Block editor core for Quire notes.
//!
//! A note is an ordered sequence of blocks. This crate owns everything that
//! happens to that sequence while a user edits it: inserting and removing
//! blocks, drag-and-drop reordering against live screen geometry, per-block
//! rich-text formatting, and the Enter/Backspace protocol that splits and
//! merges blocks. It never renders anything; a host implements
//! [`EditorHost`] and talks to an [`EditorSession`] through typed
//! [`EditorIntent`]s.
//!
//! # Design Philosophy
//!
//! - **One owner.** All state lives in one `EditorSession`. There are no
//!   globals; every component is a field and every event is a method call.
//! - **Pure model.** [`model`] functions take a slice and return a new `Vec`.
//!   The session swaps the result in through a single commit step.
//! - **Ids across time.** Anything deferred (measurement, debounced inserts,
//!   focus retries) refers to blocks by [`BlockId`](quire_types::BlockId),
//!   and re-reads the array when it runs.
//! - **Total operations.** Stale indices clamp or no-op with a warning. A
//!   drag whose target vanished aborts silently. The only `Result`s are for
//!   loading config and strict content parsing.
//!
//! # Modules
//!
//! - [`model`]: BlockModel, pure sequence operations
//! - [`layout`]: LayoutRegistry, measured rects of mounted blocks
//! - [`drag`]: DragReorderEngine, gesture → drop target → move
//! - [`format`]: FormatStateStore, active/per-block formats and display style
//! - [`focus`]: FocusKeyboardController, key protocol and focus retry
//! - [`session`]: the facade tying them together
//! - [`content`]: stored note text ⇄ blocks

pub mod config;
pub mod content;
pub mod drag;
mod error;
pub mod focus;
pub mod format;
mod host;
mod intent;
pub mod layout;
pub mod model;
pub mod session;
pub mod timers;

pub use config::{DragTuning, EditorConfig, FocusRetry, MeasureSchedule};
pub use content::{blocks_to_content, parse_content, parse_content_strict};
pub use drag::{DragPhase, DragReorderEngine, DragView, DropHover, DropPosition, DropTarget};
pub use error::{ConfigError, ContentError};
pub use focus::{EditorKey, FocusKeyboardController, KeyOutcome};
pub use format::{DisplayStyle, FontWeight, FormatStateStore, FormatView};
pub use host::EditorHost;
pub use intent::EditorIntent;
pub use layout::{LayoutEntry, LayoutRegistry};
pub use session::{EditorSession, EditorView};
