//! Shared vocabulary: sources, panes, picks and leaf statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two source documents. Also used as the "truth" selector that
/// wins path-level conflicts during auto-merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::A => "A",
            Side::B => "B",
        })
    }
}

/// One of the three synchronized views: source A, source B, or the Result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pane {
    A,
    B,
    R,
}

impl From<Side> for Pane {
    fn from(side: Side) -> Self {
        match side {
            Side::A => Pane::A,
            Side::B => Pane::B,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pane::A => "A",
            Pane::B => "B",
            Pane::R => "R",
        })
    }
}

/// Per-leaf override state. A path without an entry is `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pick {
    #[default]
    Auto,
    A,
    B,
    Edited,
    Added,
}

impl Pick {
    /// `A` or `B` picks made explicitly by the operator.
    pub fn is_side(self) -> bool {
        matches!(self, Pick::A | Pick::B)
    }
}

impl From<Side> for Pick {
    fn from(side: Side) -> Self {
        match side {
            Side::A => Pick::A,
            Side::B => Pick::B,
        }
    }
}

/// Classification of one leaf path across A and B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeafStatus {
    Same,
    Diff,
    OnlyA,
    OnlyB,
}

impl LeafStatus {
    /// The only source holding the path, for `OnlyA`/`OnlyB`.
    pub fn single_source(self) -> Option<Side> {
        match self {
            LeafStatus::OnlyA => Some(Side::A),
            LeafStatus::OnlyB => Some(Side::B),
            _ => None,
        }
    }
}

impl fmt::Display for LeafStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LeafStatus::Same => "same",
            LeafStatus::Diff => "diff",
            LeafStatus::OnlyA => "onlyA",
            LeafStatus::OnlyB => "onlyB",
        })
    }
}
