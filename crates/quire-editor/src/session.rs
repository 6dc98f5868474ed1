//! The editor session: one owner for all editor state, one entry point for
//! every event.
//!
//! `EditorSession` holds the block array and every component that reads or
//! writes it. Hosts feed it [`EditorIntent`]s through [`dispatch`] and drive
//! its virtual clock through [`advance`]; they read back an [`EditorView`].
//! Because every intent goes through `&mut self`, focus changes and format
//! toggles apply strictly in the order they were dispatched.
//!
//! ## The commit step
//!
//! Every change to the block array goes through [`EditorSession::commit`]:
//!
//! 1. re-seed a default block if the new array came out empty,
//! 2. return grid halves that lost their partner to full width,
//! 3. re-key the format cache and focused index by block id,
//! 4. release layout entries and drop targets for blocks that no longer exist,
//! 5. bump the revision.
//!
//! ## Deferred work
//!
//! Inserts from Enter and the add-block actions wait `structural_debounce_ms`
//! and then read the array as it is *at that moment*. Tasks carry block ids,
//! never indices; an anchor that vanished in the meantime falls back to
//! appending at the end.
//!
//! [`dispatch`]: EditorSession::dispatch
//! [`advance`]: EditorSession::advance

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use quire_types::{Block, BlockId, FormatRecord, Point};

use crate::config::EditorConfig;
use crate::content;
use crate::drag::{DragReorderEngine, DragView, GrantOutcome};
use crate::focus::{self, EditorKey, FocusAttempt, FocusKeyboardController, FocusRequest, KeyOutcome};
use crate::format::{DisplayStyle, FormatStateStore, FormatView};
use crate::host::EditorHost;
use crate::intent::EditorIntent;
use crate::layout::LayoutRegistry;
use crate::model;
use crate::timers::TimerQueue;

/// Everything a host needs to render one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorView {
    pub blocks: Vec<Block>,
    pub focused_index: Option<usize>,
    pub drag: DragView,
    pub format: FormatView,
    pub revision: u64,
}

#[derive(Debug)]
enum Task {
    Measure {
        block: BlockId,
    },
    /// Insert `blocks` after `after` (end of document when `None`).
    Insert {
        after: Option<BlockId>,
        blocks: Vec<Block>,
        focus: bool,
    },
    /// Enter on a text block: split at `at`, new block gets `carry`.
    Split {
        block: BlockId,
        at: usize,
        carry: FormatRecord,
    },
    Focus(FocusRequest),
}

pub struct EditorSession {
    config: EditorConfig,
    blocks: Vec<Block>,
    layout: LayoutRegistry,
    drag: DragReorderEngine,
    format: FormatStateStore,
    focus: FocusKeyboardController,
    timers: TimerQueue<Task>,
    revision: u64,
}

impl EditorSession {
    /// A session holding a single empty text block.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_blocks(config, Vec::new())
    }

    pub fn with_blocks(config: EditorConfig, blocks: Vec<Block>) -> Self {
        let mut session = Self {
            drag: DragReorderEngine::new(config.drag),
            focus: FocusKeyboardController::new(config.focus_retry),
            config,
            blocks: Vec::new(),
            layout: LayoutRegistry::new(),
            format: FormatStateStore::new(),
            timers: TimerQueue::new(),
            revision: 0,
        };
        session.replace_document(blocks);
        session
    }

    /// A session over parsed note content.
    pub fn from_content(config: EditorConfig, raw: &str) -> Self {
        Self::with_blocks(config, content::parse_content(raw))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Virtual clock, in milliseconds since the session started.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focus.focused()
    }

    pub fn layout(&self) -> &LayoutRegistry {
        &self.layout
    }

    pub fn drag(&self) -> &DragReorderEngine {
        &self.drag
    }

    pub fn format(&self) -> &FormatStateStore {
        &self.format
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            blocks: self.blocks.clone(),
            focused_index: self.focus.focused(),
            drag: self.drag.view(),
            format: self.format.view(),
            revision: self.revision,
        }
    }

    pub fn display_style(&self, index: usize) -> Option<DisplayStyle> {
        let block = self.blocks.get(index)?;
        Some(self.format.display_style(index, block))
    }

    /// Serialize the document to stored note content.
    pub fn to_content(&self) -> String {
        content::blocks_to_content(&self.blocks)
    }

    /// Replace the document with parsed content, dropping all transient state.
    pub fn load(&mut self, raw: &str) {
        self.replace_document(content::parse_content(raw));
    }

    // =========================================================================
    // Event entry points
    // =========================================================================

    /// Apply one intent.
    pub fn dispatch(&mut self, intent: EditorIntent, host: &mut dyn EditorHost) {
        tracing::trace!("dispatch {} at {}ms", intent.name(), self.now());
        match intent {
            EditorIntent::Load { content } => self.load(&content),
            EditorIntent::AddBlock { kind, content } => {
                self.schedule_insert(vec![Block::new(kind, content)], kind.is_editable_text());
            }
            EditorIntent::AddImage { uri } => self.schedule_insert(vec![Block::image(uri)], false),
            EditorIntent::AddGridPair { left, right } => {
                let (l, r) = Block::grid_pair(left, right);
                self.schedule_insert(vec![l, r], true);
            }
            EditorIntent::InsertContent { content } => {
                self.schedule_insert(content::parse_content(&content), false);
            }
            EditorIntent::DeleteBlock { index } => self.commit(model::remove_at(&self.blocks, index)),
            EditorIntent::MoveBlock { from, to } => {
                if from != to {
                    self.commit(model::move_within(&self.blocks, from, to));
                    self.schedule_measure_all();
                }
            }
            EditorIntent::TextChanged { index, text } => self.text_changed(index, text),
            EditorIntent::KeyPressed { index, key, cursor } => self.key_pressed(index, key, cursor, host),
            EditorIntent::Focus { index } => {
                if index < self.blocks.len() {
                    self.set_focus(Some(index));
                } else {
                    tracing::warn!("focus on index {index} out of range for {} blocks", self.blocks.len());
                }
            }
            EditorIntent::Blur => self.set_focus(None),
            EditorIntent::ToggleBold => {
                self.format.toggle_bold(&mut self.blocks);
                self.revision += 1;
            }
            EditorIntent::ToggleItalic => {
                self.format.toggle_italic(&mut self.blocks);
                self.revision += 1;
            }
            EditorIntent::ToggleHeading { level } => {
                self.format.toggle_heading(level, &mut self.blocks);
                self.revision += 1;
            }
            EditorIntent::BlockMounted { index } => {
                if let Some(id) = self.id_at(index) {
                    self.layout.mount(id);
                    self.schedule_measure(id);
                }
            }
            EditorIntent::BlockUnmounted { index } => {
                if let Some(id) = self.id_at(index) {
                    self.layout.release(id);
                    self.drag.forget(id);
                }
            }
            EditorIntent::ContentResized { index } => {
                if let Some(id) = self.id_at(index) {
                    self.schedule_measure(id);
                }
            }
            EditorIntent::DragGrant {
                index,
                x,
                y,
                on_text_input,
            } => {
                if let Some(id) = self.id_at(index)
                    && self.drag.grant(id, Point::new(x, y), on_text_input) == GrantOutcome::ForcedReset
                {
                    tracing::debug!("second drag grant on index {index} dropped");
                }
            }
            EditorIntent::DragMove { x, y } => {
                if let Some(hover) = self.drag.pointer_move(Point::new(x, y), &self.layout, &self.blocks) {
                    tracing::trace!("drop hover {:?} {:?}", hover.target, hover.position);
                }
            }
            EditorIntent::DragRelease => {
                if let Some(commit) = self.drag.release(&self.blocks) {
                    tracing::debug!("drag commit {:?}: {} -> {}", commit.block, commit.from, commit.to);
                    if commit.from != commit.to {
                        self.commit(model::move_within(&self.blocks, commit.from, commit.to));
                        self.schedule_measure_all();
                    }
                }
            }
            EditorIntent::DragTerminate => self.drag.terminate(),
        }
    }

    /// Advance the virtual clock, running every task that comes due.
    pub fn advance(&mut self, elapsed_ms: u64, host: &mut dyn EditorHost) {
        let until = self.timers.now().saturating_add(elapsed_ms);
        while let Some(task) = self.timers.pop_due(until) {
            self.run_task(task, host);
        }
        self.timers.advance_to(until);
    }

    /// Run the clock forward until nothing is pending.
    pub fn settle(&mut self, host: &mut dyn EditorHost) {
        while let Some(due) = self.timers.next_due() {
            let elapsed = due.saturating_sub(self.timers.now());
            self.advance(elapsed, host);
        }
    }

    // =========================================================================
    // Typing and keys
    // =========================================================================

    fn text_changed(&mut self, index: usize, text: String) {
        let Some(block) = self.blocks.get(index) else {
            tracing::warn!("text change for index {index} out of range for {} blocks", self.blocks.len());
            return;
        };
        if block.content == text {
            return;
        }
        let next = model::update_content_at(&self.blocks, index, text.as_str());
        self.commit(next);
        self.format.reset_if_empty(index, &text);
    }

    fn key_pressed(&mut self, index: usize, key: EditorKey, cursor: Option<usize>, host: &mut dyn EditorHost) {
        match focus::classify_key(&self.blocks, index, key, cursor) {
            KeyOutcome::PassThrough => {}
            KeyOutcome::LineBreak { at } => {
                let text = focus::insert_char_at(&self.blocks[index].content, at, '\n');
                self.commit(model::update_content_at(&self.blocks, index, text));
            }
            KeyOutcome::SplitBlock { at } => {
                let carry = if self.format.focused_index() == Some(index) {
                    self.format.persist_active(&mut self.blocks);
                    self.revision += 1;
                    self.format.active().inline_only()
                } else {
                    self.format.effective_format(index, &self.blocks[index]).inline_only()
                };
                let block = self.blocks[index].id;
                self.timers
                    .schedule(self.config.structural_debounce_ms, Task::Split { block, at, carry });
            }
            KeyOutcome::InsertAfterImage => {
                let task = Task::Insert {
                    after: Some(self.blocks[index].id),
                    blocks: vec![Block::empty_text()],
                    focus: true,
                };
                self.timers.schedule(self.config.structural_debounce_ms, task);
            }
            KeyOutcome::MergeIntoPrevious { target, cursor } => {
                // Focus moves before the removal.
                let target_id = self.blocks[target].id;
                self.request_focus(target_id, cursor, host);
                self.commit(model::remove_at(&self.blocks, index));
            }
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    fn set_focus(&mut self, index: Option<usize>) {
        self.focus.set_focused(index);
        self.format.on_focus_change(index, &self.blocks);
    }

    fn request_focus(&mut self, block: BlockId, cursor: Option<usize>, host: &mut dyn EditorHost) {
        let attempt = self.focus.request(block, cursor, &self.blocks, host);
        self.apply_focus_attempt(attempt);
    }

    fn apply_focus_attempt(&mut self, attempt: FocusAttempt) {
        match attempt {
            FocusAttempt::Focused(index) => self.format.on_focus_change(Some(index), &self.blocks),
            FocusAttempt::Retry { after_ms, request } => self.timers.schedule(after_ms, Task::Focus(request)),
            FocusAttempt::Exhausted => self.format.on_focus_change(None, &self.blocks),
            FocusAttempt::Stale => {}
        }
    }

    // =========================================================================
    // Deferred tasks
    // =========================================================================

    fn schedule_insert(&mut self, blocks: Vec<Block>, focus: bool) {
        let after = self.focus.focused().and_then(|ix| self.blocks.get(ix)).map(|b| b.id);
        self.timers.schedule(
            self.config.structural_debounce_ms,
            Task::Insert { after, blocks, focus },
        );
    }

    fn schedule_measure(&mut self, block: BlockId) {
        for &delay in &self.config.measure.delays_ms {
            self.timers.schedule(delay, Task::Measure { block });
        }
    }

    fn schedule_measure_all(&mut self) {
        let mounted: Vec<BlockId> = self
            .blocks
            .iter()
            .map(|b| b.id)
            .filter(|id| self.layout.is_mounted(*id))
            .collect();
        for id in mounted {
            self.schedule_measure(id);
        }
    }

    /// Index right after `anchor`, or the end if there is none.
    fn insertion_point(&self, anchor: Option<BlockId>) -> usize {
        match anchor {
            None => self.blocks.len(),
            Some(id) => match model::index_of(&self.blocks, id) {
                Some(ix) => ix + 1,
                None => {
                    tracing::debug!("insert anchor {id:?} is gone, appending at end");
                    self.blocks.len()
                }
            },
        }
    }

    fn run_task(&mut self, task: Task, host: &mut dyn EditorHost) {
        match task {
            Task::Measure { block } => {
                if let Some(index) = model::index_of(&self.blocks, block) {
                    self.layout.measure(block, index, host);
                }
            }
            Task::Insert { after, blocks, focus } => {
                let at = self.insertion_point(after);
                let first = blocks.first().filter(|b| b.kind.is_editable_text()).map(|b| b.id);
                self.commit(model::insert_at(&self.blocks, at, blocks));
                if focus && let Some(id) = first {
                    self.request_focus(id, None, host);
                }
            }
            Task::Split { block, at, carry } => {
                let new_id = match model::index_of(&self.blocks, block) {
                    Some(index) => {
                        let (head, tail) = focus::split_at_char(&self.blocks[index].content, at);
                        let new_block = Block::text(tail).with_formats(carry);
                        let new_id = new_block.id;
                        let truncated = model::update_content_at(&self.blocks, index, head);
                        self.commit(model::insert_at(&truncated, index + 1, [new_block]));
                        new_id
                    }
                    None => {
                        tracing::debug!("split anchor {block:?} is gone, appending at end");
                        let new_block = Block::empty_text().with_formats(carry);
                        let new_id = new_block.id;
                        self.commit(model::insert_at(&self.blocks, self.blocks.len(), [new_block]));
                        new_id
                    }
                };
                self.request_focus(new_id, Some(0), host);
            }
            Task::Focus(request) => {
                let attempt = self.focus.retry(request, &self.blocks, host);
                self.apply_focus_attempt(attempt);
            }
        }
    }

    // =========================================================================
    // Commit
    // =========================================================================

    fn id_at(&self, index: usize) -> Option<BlockId> {
        let id = self.blocks.get(index).map(|b| b.id);
        if id.is_none() {
            tracing::warn!("index {index} out of range for {} blocks", self.blocks.len());
        }
        id
    }

    fn commit(&mut self, mut next: Vec<Block>) {
        if next.is_empty() {
            tracing::debug!("document emptied, re-seeding default block");
            next.push(model::default_block());
        }
        let before = std::mem::replace(&mut self.blocks, model::unpair_orphans(next));
        self.format.rekey(&before, &self.blocks);
        self.focus.rekey(&before, &self.blocks);

        let live: HashSet<BlockId> = self.blocks.iter().map(|b| b.id).collect();
        self.layout.retain(|id| live.contains(&id));
        for removed in before.iter().map(|b| b.id).filter(|id| !live.contains(id)) {
            self.drag.forget(removed);
        }
        if let Some(pressed) = self.drag.gesture().block()
            && !live.contains(&pressed)
        {
            tracing::debug!("dragged block {pressed:?} was removed, ending gesture");
            self.drag.terminate();
        }
        self.revision += 1;
    }

    fn replace_document(&mut self, mut blocks: Vec<Block>) {
        self.timers.clear();
        self.drag.terminate();
        self.layout.clear();
        self.format.clear();
        self.focus.clear();

        if blocks.is_empty() {
            blocks.push(model::default_block());
        }
        let mut seen = HashSet::new();
        for block in &mut blocks {
            if !seen.insert(block.id) {
                let fresh = BlockId::new();
                tracing::warn!("duplicate block id {:?} in loaded document, reassigned {fresh:?}", block.id);
                block.id = fresh;
                seen.insert(fresh);
            }
        }
        self.blocks = model::unpair_orphans(blocks);
        self.revision += 1;
    }
}
