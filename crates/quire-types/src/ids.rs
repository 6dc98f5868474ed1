//! Typed identifiers for blocks and grid groups.
//!
//! Both wrap a UUIDv7. The editor only compares and hashes them; indices
//! go stale across edits, ids do not. `short()` is for logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a single block. Survives reorders and is never reused.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

/// Shared by the two halves of a side-by-side grid-card pair.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(uuid::Uuid);

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex digits.
            pub fn short(&self) -> String {
                let mut hex = self.0.as_simple().to_string();
                hex.truncate(8);
                hex
            }

            /// Accepts both hyphenated and bare-hex forms.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        // Block ids show up in most trace lines; keep them short there.
        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(BlockId, "BlockId");
impl_typed_id!(GroupId, "GroupId");
