//! Cross-block keyboard protocol and focus tracking.
//!
//! Only two keys are structurally meaningful. Enter either splits a text
//! block, inserts a line break inside a card, or opens a text block after an
//! image. Backspace on an empty text block merges it into the block above.
//! Everything else belongs to the platform text input.
//!
//! Focus requests go through the host and can fail while a freshly inserted
//! block is still mounting. Failed requests come back as
//! [`FocusAttempt::Retry`] with a backoff delay for the caller to schedule;
//! a newer request supersedes any retry still in flight.

use serde::{Deserialize, Serialize};

use quire_types::{Block, BlockId, BlockKind};

use crate::config::FocusRetry;
use crate::host::EditorHost;
use crate::model;

/// Keys the editor distinguishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKey {
    Enter,
    Backspace,
    #[default]
    Other,
}

/// What a key press means for the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Split the text block at char offset `at`; the tail opens a new block.
    SplitBlock { at: usize },
    /// Insert `'\n'` at char offset `at` inside a card.
    LineBreak { at: usize },
    /// Open an empty text block after an image.
    InsertAfterImage,
    /// Focus `target` (caret at `cursor`), then remove the current block.
    MergeIntoPrevious { target: usize, cursor: Option<usize> },
    /// Platform default; no structural change.
    PassThrough,
}

/// Decide what `key` does on `blocks[index]` with the caret at `cursor`
/// (char offset; `None` means end of content).
pub fn classify_key(blocks: &[Block], index: usize, key: EditorKey, cursor: Option<usize>) -> KeyOutcome {
    let Some(block) = blocks.get(index) else {
        tracing::warn!("key {key:?} for index {index} out of range for {} blocks", blocks.len());
        return KeyOutcome::PassThrough;
    };
    let len = block.char_len();
    let at = cursor.map_or(len, |c| c.min(len));

    match key {
        EditorKey::Enter => match block.kind {
            BlockKind::Text => KeyOutcome::SplitBlock { at },
            BlockKind::Card | BlockKind::GridCard => KeyOutcome::LineBreak { at },
            BlockKind::Image => KeyOutcome::InsertAfterImage,
        },
        EditorKey::Backspace => {
            if index == 0 || block.kind != BlockKind::Text || !block.is_blank() {
                return KeyOutcome::PassThrough;
            }
            let previous = &blocks[index - 1];
            let cursor = match previous.kind {
                BlockKind::Image => None,
                BlockKind::Text | BlockKind::Card | BlockKind::GridCard => Some(previous.char_len()),
            };
            KeyOutcome::MergeIntoPrevious {
                target: index - 1,
                cursor,
            }
        }
        EditorKey::Other => KeyOutcome::PassThrough,
    }
}

// ============================================================================
// Char-offset string helpers
// ============================================================================

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(ix, _)| ix)
}

/// Split `s` at a char offset (clamped).
pub fn split_at_char(s: &str, at: usize) -> (String, String) {
    let (head, tail) = s.split_at(byte_offset(s, at));
    (head.to_string(), tail.to_string())
}

/// Insert `ch` at a char offset (clamped).
pub fn insert_char_at(s: &str, at: usize, ch: char) -> String {
    let mut out = String::with_capacity(s.len() + ch.len_utf8());
    let (head, tail) = s.split_at(byte_offset(s, at));
    out.push_str(head);
    out.push(ch);
    out.push_str(tail);
    out
}

// ============================================================================
// Focus controller
// ============================================================================

/// An outstanding focus request. Carries the block id, never an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub block: BlockId,
    pub cursor: Option<usize>,
    /// Retries already spent.
    pub attempt: u32,
    generation: u64,
}

/// Result of asking the host to focus a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusAttempt {
    Focused(usize),
    /// Host had no element yet; try again after `after_ms`.
    Retry { after_ms: u64, request: FocusRequest },
    /// Out of retries; focus dropped.
    Exhausted,
    /// Superseded by a newer request, or the block is gone.
    Stale,
}

#[derive(Debug, Default)]
pub struct FocusKeyboardController {
    focused: Option<usize>,
    retry: FocusRetry,
    generation: u64,
}

impl FocusKeyboardController {
    pub fn new(retry: FocusRetry) -> Self {
        Self {
            focused: None,
            retry,
            generation: 0,
        }
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// The host reports focus landed somewhere (user tap, platform blur).
    /// Cancels any request still retrying.
    pub fn set_focused(&mut self, index: Option<usize>) {
        self.generation += 1;
        self.focused = index;
    }

    /// Start a fresh focus request, superseding older ones.
    pub fn request(
        &mut self,
        block: BlockId,
        cursor: Option<usize>,
        blocks: &[Block],
        host: &mut dyn EditorHost,
    ) -> FocusAttempt {
        self.generation += 1;
        let request = FocusRequest {
            block,
            cursor,
            attempt: 0,
            generation: self.generation,
        };
        self.attempt(request, blocks, host)
    }

    /// Run a scheduled retry.
    pub fn retry(&mut self, request: FocusRequest, blocks: &[Block], host: &mut dyn EditorHost) -> FocusAttempt {
        if request.generation != self.generation {
            tracing::trace!("focus retry for {:?} superseded", request.block);
            return FocusAttempt::Stale;
        }
        self.attempt(request, blocks, host)
    }

    fn attempt(&mut self, request: FocusRequest, blocks: &[Block], host: &mut dyn EditorHost) -> FocusAttempt {
        let Some(index) = model::index_of(blocks, request.block) else {
            tracing::debug!("focus target {:?} no longer present", request.block);
            return FocusAttempt::Stale;
        };
        if host.focus(request.block, request.cursor) {
            self.focused = Some(index);
            return FocusAttempt::Focused(index);
        }
        if request.attempt >= self.retry.attempts {
            tracing::warn!(
                "giving up focusing {:?} after {} retries",
                request.block,
                request.attempt
            );
            self.focused = None;
            return FocusAttempt::Exhausted;
        }
        let next = FocusRequest {
            attempt: request.attempt + 1,
            ..request
        };
        let after_ms = self.retry.delay_for(next.attempt);
        tracing::trace!("focus {:?} not ready, retry {} in {after_ms}ms", request.block, next.attempt);
        FocusAttempt::Retry { after_ms, request: next }
    }

    /// Follow the focused block to its new index after a structural change.
    pub fn rekey(&mut self, before: &[Block], after: &[Block]) {
        if let Some(old) = self.focused {
            self.focused = before.get(old).and_then(|b| model::index_of(after, b.id));
        }
    }

    pub fn clear(&mut self) {
        self.set_focused(None);
    }
}
