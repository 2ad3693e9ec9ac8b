use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::GemId;

pub const BOARD_SIZE: usize = 8;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;
pub const GEM_TYPE_COUNT: usize = 7;
pub const MIN_MATCH_LENGTH: usize = 3;

pub const SCORE_MATCH_3: u64 = 50;
pub const SCORE_MATCH_4: u64 = 150;
pub const SCORE_MATCH_5_PLUS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GemType {
    Ruby,
    Sapphire,
    Emerald,
    Diamond,
    Amethyst,
    Bracelet,
    Earring,
}

impl GemType {
    pub const ALL: [GemType; GEM_TYPE_COUNT] = [
        GemType::Ruby,
        GemType::Sapphire,
        GemType::Emerald,
        GemType::Diamond,
        GemType::Amethyst,
        GemType::Bracelet,
        GemType::Earring,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GemType::Ruby => "ruby",
            GemType::Sapphire => "sapphire",
            GemType::Emerald => "emerald",
            GemType::Diamond => "diamond",
            GemType::Amethyst => "amethyst",
            GemType::Bracelet => "bracelet",
            GemType::Earring => "earring",
        }
    }
}

impl fmt::Display for GemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerupTag {
    #[default]
    None,
    /// Clears its row and column when matched.
    Star,
    /// Clears every gem of its color when matched.
    Rainbow,
}

impl PowerupTag {
    /// Powerup earned by a match of the given length, if any.
    pub fn for_match_length(length: usize) -> PowerupTag {
        match length {
            0..=3 => PowerupTag::None,
            4 => PowerupTag::Star,
            _ => PowerupTag::Rainbow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    pub fn to_index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    pub fn from_index(index: usize) -> Self {
        Self {
            row: index / BOARD_SIZE,
            col: index % BOARD_SIZE,
        }
    }

    pub fn manhattan_distance(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).map(Position::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gem {
    pub id: GemId,
    pub gem_type: GemType,
    pub position: Position,
    pub powerup: PowerupTag,
}

impl Gem {
    pub fn is_special(&self) -> bool {
        self.powerup == PowerupTag::Star
    }

    pub fn is_super(&self) -> bool {
        self.powerup == PowerupTag::Rainbow
    }
}

/// A connected group of same-run gems found by one scan. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub gems: Vec<Gem>,
    pub gem_type: GemType,
    pub length: usize,
    pub is_horizontal: bool,
    pub is_vertical: bool,
}

impl Match {
    pub fn contains(&self, position: Position) -> bool {
        self.gems.iter().any(|gem| gem.position == position)
    }

    pub fn base_score(&self) -> u64 {
        match_score(self.length)
    }

    /// Cell where a powerup born from this match is placed.
    pub fn center(&self) -> Option<Position> {
        self.gems.get(self.gems.len() / 2).map(|gem| gem.position)
    }
}

pub fn match_score(length: usize) -> u64 {
    match length {
        0..=2 => 0,
        3 => SCORE_MATCH_3,
        4 => SCORE_MATCH_4,
        _ => SCORE_MATCH_5_PLUS,
    }
}
