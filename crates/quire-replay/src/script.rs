//! Replay scripts and the frame loop that runs them.
//!
//! A script is RON: optional starting content plus a list of steps.
//!
//! ```ron
//! (
//!     content: "hello world\n::card:: notes",
//!     steps: [
//!         Tap(x: 10.0, y: 10.0),
//!         Intent(KeyPressed(index: 0, key: enter, cursor: Some(5))),
//!         Settle,
//!     ],
//! )
//! ```
//!
//! Time only moves in whole frames. After every intent and every frame the
//! simulated host re-renders and feeds its mount/resize events back into the
//! session, the way a view layer would.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use quire_editor::{EditorConfig, EditorIntent, EditorSession, parse_content, parse_content_strict};
use quire_types::Point;

use crate::host::StackedHost;

/// One frame at 60 Hz, rounded down.
pub const FRAME_MS: u64 = 16;

/// Upper bound on frames [`Step::Settle`] will run.
pub const MAX_SETTLE_FRAMES: usize = 1_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Dispatch one intent.
    Intent(EditorIntent),
    /// Let this many milliseconds pass, frame by frame.
    Advance(u64),
    /// Run frames until no deferred work is left.
    Settle,
    /// Focus whatever block is under a screen point.
    Tap { x: f32, y: f32 },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Starting note content; empty means a single empty text block.
    #[serde(default)]
    pub content: String,
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).context("invalid replay script")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("in {}", path.display()))
    }
}

/// A session plus the simulated screen it renders to.
pub struct Replay {
    session: EditorSession,
    host: StackedHost,
    frames: usize,
}

impl Replay {
    /// Start from `content`. With `strict`, unknown block markers are an error.
    pub fn new(config: EditorConfig, content: &str, strict: bool) -> Result<Self> {
        let blocks = if strict {
            parse_content_strict(content).context("script content")?
        } else {
            parse_content(content)
        };
        let mut replay = Self {
            session: EditorSession::with_blocks(config, blocks),
            host: StackedHost::new(),
            frames: 0,
        };
        replay.render();
        Ok(replay)
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn host(&self) -> &StackedHost {
        &self.host
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (ix, step) in steps.iter().enumerate() {
            tracing::debug!("step {ix}: {step:?}");
            self.step(step).with_context(|| format!("step {ix}"))?;
        }
        Ok(())
    }

    pub fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Intent(intent) => self.dispatch(intent.clone()),
            Step::Advance(ms) => {
                let mut remaining = *ms;
                while remaining > 0 {
                    let dt = remaining.min(FRAME_MS);
                    self.frame(dt);
                    remaining -= dt;
                }
            }
            Step::Settle => {
                let mut frames = 0;
                while self.session.pending_tasks() > 0 {
                    if frames == MAX_SETTLE_FRAMES {
                        bail!(
                            "session did not settle within {MAX_SETTLE_FRAMES} frames ({} tasks pending)",
                            self.session.pending_tasks()
                        );
                    }
                    self.frame(FRAME_MS);
                    frames += 1;
                }
            }
            Step::Tap { x, y } => {
                let point = Point::new(*x, *y);
                match self.host.block_at(self.session.blocks(), point) {
                    Some(index) => self.dispatch(EditorIntent::Focus { index }),
                    None => tracing::info!("tap at ({x}, {y}) hit no block"),
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, intent: EditorIntent) {
        self.session.dispatch(intent, &mut self.host);
        self.render();
    }

    fn frame(&mut self, dt: u64) {
        self.session.advance(dt, &mut self.host);
        self.frames += 1;
        self.render();
    }

    fn render(&mut self) {
        for event in self.host.render(self.session.blocks()) {
            self.session.dispatch(event, &mut self.host);
        }
    }
}
