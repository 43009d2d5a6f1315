//! Outcome labels derived from the quality score.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BoxOfficeError;

/// Number of outcome classes.
pub const N_CLASSES: usize = 3;

/// Upper bound (inclusive) of the Flop bin.
pub const FLOP_UPPER: f64 = 3.0;

/// Upper bound (inclusive) of the Average bin.
pub const AVERAGE_UPPER: f64 = 6.0;

/// Ordinal outcome category of a film.
///
/// The declaration order is the class order used everywhere else:
/// probability vectors, vote tallies, confusion matrices and tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Flop,
    Average,
    Hit,
}

impl Label {
    /// All labels in class order.
    pub const ALL: [Label; N_CLASSES] = [Label::Flop, Label::Average, Label::Hit];

    /// Derive the label of a quality score.
    ///
    /// Bins are half-open on the left: `(0, 3]` is Flop, `(3, 6]` is Average
    /// and `(6, 10]` is Hit. Scores outside `(0, 10]` clamp to the nearest bin.
    pub fn from_score(score: f64) -> Self {
        if score <= FLOP_UPPER {
            Label::Flop
        } else if score <= AVERAGE_UPPER {
            Label::Average
        } else {
            Label::Hit
        }
    }

    /// Class index of this label.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label of a class index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Flop => "Flop",
            Label::Average => "Average",
            Label::Hit => "Hit",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Label {
    type Err = BoxOfficeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flop" => Ok(Label::Flop),
            "average" => Ok(Label::Average),
            "hit" => Ok(Label::Hit),
            other => Err(BoxOfficeError::data_load(format!("unknown label `{other}`"))),
        }
    }
}

/// Derive the label of a quality score. See [`Label::from_score`].
pub fn derive_label(score: f64) -> Label {
    Label::from_score(score)
}

/// Index of the largest value; the lowest index wins an exact tie.
pub(crate) fn argmax(values: &[f64; N_CLASSES]) -> usize {
    let mut best = 0;
    for i in 1..N_CLASSES {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}
