use serde::{Deserialize, Serialize};
use std::fmt;

/// Timed conditions a creature can carry. At most one of each kind is active.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poison,
    Burn,
    Regeneration,
    Sleep,
    Paralysis,
    Frozen,
}

impl StatusKind {
    /// Conditions that keep the holder from acting on its turn.
    pub fn prevents_action(self) -> bool {
        matches!(self, StatusKind::Sleep | StatusKind::Frozen)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatusKind::Poison => "poison",
            StatusKind::Burn => "burn",
            StatusKind::Regeneration => "regeneration",
            StatusKind::Sleep => "sleep",
            StatusKind::Paralysis => "paralysis",
            StatusKind::Frozen => "frozen",
        };
        write!(f, "{}", display_name)
    }
}

/// Which team a combat participant fights for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ally,
    Opponent,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Ally => Side::Opponent,
            Side::Opponent => Side::Ally,
        }
    }
}
