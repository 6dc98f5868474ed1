//! Typed events the host sends into an [`EditorSession`](crate::EditorSession).
//!
//! Indices refer to the block array as of the last [`EditorView`](crate::EditorView)
//! the host rendered. They are resolved to block ids at dispatch time; any
//! work deferred past that point carries ids.

use serde::{Deserialize, Serialize};

use quire_types::{BlockKind, HeadingLevel};

use crate::focus::EditorKey;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EditorIntent {
    // ── Document ────────────────────────────────────────────────────────
    /// Replace the whole document with parsed content.
    Load { content: String },
    /// Add a block after the focused block (or at the end).
    AddBlock {
        kind: BlockKind,
        #[serde(default)]
        content: String,
    },
    /// Add an image picked by the host's media picker.
    AddImage { uri: String },
    /// Add a linked left/right grid-card pair.
    AddGridPair {
        #[serde(default)]
        left: String,
        #[serde(default)]
        right: String,
    },
    /// Paste or template insertion: content in the stored note format.
    InsertContent { content: String },
    DeleteBlock { index: usize },
    MoveBlock { from: usize, to: usize },

    // ── Typing and focus ────────────────────────────────────────────────
    TextChanged { index: usize, text: String },
    KeyPressed {
        index: usize,
        key: EditorKey,
        /// Caret char offset; absent means end of content.
        #[serde(default)]
        cursor: Option<usize>,
    },
    Focus { index: usize },
    Blur,

    // ── Formatting ──────────────────────────────────────────────────────
    ToggleBold,
    ToggleItalic,
    ToggleHeading { level: HeadingLevel },

    // ── Layout ──────────────────────────────────────────────────────────
    BlockMounted { index: usize },
    BlockUnmounted { index: usize },
    ContentResized { index: usize },

    // ── Drag gesture ────────────────────────────────────────────────────
    DragGrant {
        index: usize,
        x: f32,
        y: f32,
        #[serde(default)]
        on_text_input: bool,
    },
    DragMove { x: f32, y: f32 },
    DragRelease,
    DragTerminate,
}

impl EditorIntent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EditorIntent::Load { .. } => "load",
            EditorIntent::AddBlock { .. } => "add_block",
            EditorIntent::AddImage { .. } => "add_image",
            EditorIntent::AddGridPair { .. } => "add_grid_pair",
            EditorIntent::InsertContent { .. } => "insert_content",
            EditorIntent::DeleteBlock { .. } => "delete_block",
            EditorIntent::MoveBlock { .. } => "move_block",
            EditorIntent::TextChanged { .. } => "text_changed",
            EditorIntent::KeyPressed { .. } => "key_pressed",
            EditorIntent::Focus { .. } => "focus",
            EditorIntent::Blur => "blur",
            EditorIntent::ToggleBold => "toggle_bold",
            EditorIntent::ToggleItalic => "toggle_italic",
            EditorIntent::ToggleHeading { .. } => "toggle_heading",
            EditorIntent::BlockMounted { .. } => "block_mounted",
            EditorIntent::BlockUnmounted { .. } => "block_unmounted",
            EditorIntent::ContentResized { .. } => "content_resized",
            EditorIntent::DragGrant { .. } => "drag_grant",
            EditorIntent::DragMove { .. } => "drag_move",
            EditorIntent::DragRelease => "drag_release",
            EditorIntent::DragTerminate => "drag_terminate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_parse_from_ron() {
        let intents: Vec<EditorIntent> = ron::from_str(
            r#"[
                AddBlock(kind: card, content: "hi"),
                KeyPressed(index: 0, key: enter),
                KeyPressed(index: 1, key: backspace, cursor: Some(0)),
                ToggleHeading(level: h2),
                DragGrant(index: 0, x: 1.0, y: 2.0),
                Blur,
            ]"#,
        )
        .unwrap();
        assert_eq!(
            intents[0],
            EditorIntent::AddBlock {
                kind: BlockKind::Card,
                content: "hi".into()
            }
        );
        assert_eq!(
            intents[1],
            EditorIntent::KeyPressed {
                index: 0,
                key: EditorKey::Enter,
                cursor: None
            }
        );
        assert_eq!(
            intents[3],
            EditorIntent::ToggleHeading {
                level: HeadingLevel::H2
            }
        );
        assert_eq!(intents[5], EditorIntent::Blur);
    }

    #[test]
    fn test_intent_json_shape() {
        let json = serde_json::to_value(EditorIntent::MoveBlock { from: 0, to: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"MoveBlock": {"from": 0, "to": 2}}));
        assert_eq!(EditorIntent::DragRelease.name(), "drag_release");
    }
}
