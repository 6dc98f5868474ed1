//! Scripted replay for the Quire editor core.
//!
//! Runs an [`EditorSession`](quire_editor::EditorSession) against a
//! simulated single-column screen ([`host::StackedHost`]) from a RON script
//! ([`script::ReplayScript`]). Used to reproduce editing sessions and as an
//! end-to-end test bed.

pub mod host;
pub mod output;
pub mod script;

pub use host::StackedHost;
pub use output::{OutputFormat, render_output};
pub use script::{Replay, ReplayScript, Step};
