//! Editor tuning, loadable from RON.
//!
//! Every pixel threshold and delay the editor uses lives here as a named
//! default. Hosts override any subset from a RON file; omitted fields keep
//! their defaults.
//!
//! ```ron
//! (
//!     drag: (activation_threshold: 8.0),
//!     measure: (delays_ms: [40, 120]),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pointer travel (px) before an armed press becomes a drag.
pub const DEFAULT_ACTIVATION_THRESHOLD: f32 = 5.0;

/// Margin (px) above the first / below the last block that snaps to the ends.
pub const DEFAULT_EDGE_MARGIN: f32 = 20.0;

/// Staggered measurement passes after mount or resize (ms).
pub const DEFAULT_MEASURE_DELAYS_MS: [u64; 3] = [50, 150, 300];

/// Delay before deferred structural inserts read state and apply (ms).
pub const DEFAULT_STRUCTURAL_DEBOUNCE_MS: u64 = 30;

/// Focus retry defaults.
pub const DEFAULT_FOCUS_RETRY_ATTEMPTS: u32 = 4;
pub const DEFAULT_FOCUS_RETRY_DELAY_MS: u64 = 16;
pub const DEFAULT_FOCUS_RETRY_BACKOFF: u32 = 2;

/// Drag-and-drop geometry constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragTuning {
    pub activation_threshold: f32,
    pub edge_margin: f32,
}

impl Default for DragTuning {
    fn default() -> Self {
        Self {
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            edge_margin: DEFAULT_EDGE_MARGIN,
        }
    }
}

/// When to (re)measure a block after it mounts or changes size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureSchedule {
    pub delays_ms: Vec<u64>,
}

impl Default for MeasureSchedule {
    fn default() -> Self {
        Self {
            delays_ms: DEFAULT_MEASURE_DELAYS_MS.to_vec(),
        }
    }
}

/// Bounded retry with exponential backoff for focus requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusRetry {
    /// Retries after the first failed attempt.
    pub attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff: u32,
}

impl FocusRetry {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> u64 {
        let factor = u64::from(self.backoff.max(1)).saturating_pow(attempt.saturating_sub(1));
        self.initial_delay_ms.saturating_mul(factor)
    }
}

impl Default for FocusRetry {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_FOCUS_RETRY_ATTEMPTS,
            initial_delay_ms: DEFAULT_FOCUS_RETRY_DELAY_MS,
            backoff: DEFAULT_FOCUS_RETRY_BACKOFF,
        }
    }
}

/// Complete editor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub drag: DragTuning,
    pub measure: MeasureSchedule,
    pub structural_debounce_ms: u64,
    pub focus_retry: FocusRetry,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag: DragTuning::default(),
            measure: MeasureSchedule::default(),
            structural_debounce_ms: DEFAULT_STRUCTURAL_DEBOUNCE_MS,
            focus_retry: FocusRetry::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drag.activation_threshold.is_nan() || self.drag.activation_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "drag.activation_threshold",
                reason: format!("must be > 0 (got {})", self.drag.activation_threshold),
            });
        }
        if self.drag.edge_margin.is_nan() || self.drag.edge_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "drag.edge_margin",
                reason: format!("must be >= 0 (got {})", self.drag.edge_margin),
            });
        }
        if self.measure.delays_ms.is_empty() {
            return Err(ConfigError::Invalid {
                field: "measure.delays_ms",
                reason: "at least one measurement pass is required".to_string(),
            });
        }
        Ok(())
    }
}
