//! Inline formatting records.
//!
//! A [`FormatRecord`] is the formatting applied to one block's text: bold,
//! italic and at most one heading level. Storing the heading as
//! `Option<HeadingLevel>` makes "two headings at once" unrepresentable; the
//! serde form is still the flat five-flag record the persistence layer and
//! screens expect.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Heading level for block-level heading styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum HeadingLevel {
    #[strum(serialize = "h1", serialize = "1")]
    H1,
    #[strum(serialize = "h2", serialize = "2")]
    H2,
    #[strum(serialize = "h3", serialize = "3")]
    H3,
}

impl HeadingLevel {
    /// All levels, highest priority first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Parse from string (`"h2"`, `"2"`, case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formatting for one block: inline emphasis plus an optional heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FormatFlags", into = "FormatFlags")]
pub struct FormatRecord {
    pub bold: bool,
    pub italic: bool,
    pub heading: Option<HeadingLevel>,
}

impl FormatRecord {
    /// The all-clear record.
    pub const CLEAR: FormatRecord = FormatRecord {
        bold: false,
        italic: false,
        heading: None,
    };

    /// A record with only the given heading set.
    pub fn heading(level: HeadingLevel) -> Self {
        Self {
            heading: Some(level),
            ..Self::CLEAR
        }
    }

    /// Inline emphasis only; headings dropped.
    ///
    /// This is what carries across a line break: a new block keeps bold and
    /// italic but never inherits a heading.
    pub fn inline_only(&self) -> Self {
        Self {
            bold: self.bold,
            italic: self.italic,
            heading: None,
        }
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::CLEAR
    }

    pub fn is_heading(&self, level: HeadingLevel) -> bool {
        self.heading == Some(level)
    }

    pub fn heading1(&self) -> bool {
        self.is_heading(HeadingLevel::H1)
    }

    pub fn heading2(&self) -> bool {
        self.is_heading(HeadingLevel::H2)
    }

    pub fn heading3(&self) -> bool {
        self.is_heading(HeadingLevel::H3)
    }
}

/// Flat wire form: `{bold, italic, heading1, heading2, heading3}`.
///
/// Records with more than one heading flag set are normalized to the
/// highest-priority level (h1 > h2 > h3) on the way in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatFlags {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub heading1: bool,
    #[serde(default)]
    pub heading2: bool,
    #[serde(default)]
    pub heading3: bool,
}

impl From<FormatFlags> for FormatRecord {
    fn from(flags: FormatFlags) -> Self {
        let heading = if flags.heading1 {
            Some(HeadingLevel::H1)
        } else if flags.heading2 {
            Some(HeadingLevel::H2)
        } else if flags.heading3 {
            Some(HeadingLevel::H3)
        } else {
            None
        };
        Self {
            bold: flags.bold,
            italic: flags.italic,
            heading,
        }
    }
}

impl From<FormatRecord> for FormatFlags {
    fn from(record: FormatRecord) -> Self {
        Self {
            bold: record.bold,
            italic: record.italic,
            heading1: record.heading1(),
            heading2: record.heading2(),
            heading3: record.heading3(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_parse() {
        assert_eq!(HeadingLevel::from_str("h2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_str("H3"), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_str("1"), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::from_str("h4"), None);
    }

    #[test]
    fn test_inline_only_drops_heading() {
        let rec = FormatRecord {
            bold: true,
            italic: true,
            heading: Some(HeadingLevel::H1),
        };
        let carried = rec.inline_only();
        assert!(carried.bold && carried.italic);
        assert_eq!(carried.heading, None);
    }

    #[test]
    fn test_serializes_as_flat_flags() {
        let rec = FormatRecord {
            bold: true,
            ..FormatRecord::heading(HeadingLevel::H2)
        };
        let json = serde_json::to_value(rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bold": true,
                "italic": false,
                "heading1": false,
                "heading2": true,
                "heading3": false,
            })
        );
    }

    #[test]
    fn test_conflicting_headings_normalize_to_highest() {
        let json = r#"{"bold":false,"italic":true,"heading1":false,"heading2":true,"heading3":true}"#;
        let rec: FormatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.heading, Some(HeadingLevel::H2));
        assert!(rec.italic);
        assert!(!rec.heading3());
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let rec: FormatRecord = serde_json::from_str(r#"{"bold":true}"#).unwrap();
        assert_eq!(
            rec,
            FormatRecord {
                bold: true,
                ..FormatRecord::CLEAR
            }
        );
    }

    #[test]
    fn test_at_most_one_heading_flag_after_roundtrip() {
        for level in HeadingLevel::ALL {
            let flags = FormatFlags::from(FormatRecord::heading(level));
            let set = [flags.heading1, flags.heading2, flags.heading3]
                .iter()
                .filter(|f| **f)
                .count();
            assert_eq!(set, 1);
        }
        assert!(FormatRecord::CLEAR.is_clear());
    }
}
