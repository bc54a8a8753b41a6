//! Canonical label set and the normalization policy applied to raw labels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::labels::{ABSENT_RAW_LABEL, ALL_LABELS};

/// Canonical sample categories.
///
/// `N` doubles as the catch-all for every raw label that is not `O` or `W`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalLabel {
    /// `O` gesture samples.
    O,
    /// `W` gesture samples.
    W,
    /// Noise, explicit `N`, and anything unrecognized.
    N,
}

impl CanonicalLabel {
    /// Fixed processing order: `O`, `W`, `N`.
    pub const ALL: [CanonicalLabel; 3] = ALL_LABELS;

    /// Canonical spelling, also used for directory and unit names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CanonicalLabel::O => "O",
            CanonicalLabel::W => "W",
            CanonicalLabel::N => "N",
        }
    }

    /// Position of this label within [`CanonicalLabel::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            CanonicalLabel::O => 0,
            CanonicalLabel::W => 1,
            CanonicalLabel::N => 2,
        }
    }

    /// Map a raw label onto the canonical set.
    ///
    /// Comparison is made on the upper-cased value with no trimming. An
    /// absent label is read as `"N"`. Never fails.
    pub fn normalize(raw_label: Option<&str>) -> Self {
        let upper = raw_label.unwrap_or(ABSENT_RAW_LABEL).to_uppercase();
        match upper.as_str() {
            "O" => CanonicalLabel::O,
            "W" => CanonicalLabel::W,
            _ => CanonicalLabel::N,
        }
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`CanonicalLabel::normalize`].
pub fn normalize(raw_label: Option<&str>) -> CanonicalLabel {
    CanonicalLabel::normalize(raw_label)
}
