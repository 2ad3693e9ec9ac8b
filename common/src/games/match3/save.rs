use std::path::Path;

use serde::{Deserialize, Serialize};

use super::board::{Board, TypeGrid};
use super::collection::Collection;
use super::types::{BOARD_SIZE, Position, PowerupTag};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Yaml(serde_yaml_ng::Error),
    UnsupportedVersion { found: u32, expected: u32 },
    InvalidBoard(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Yaml(e) => write!(f, "YAML error: {}", e),
            SaveError::UnsupportedVersion { found, expected } => {
                write!(f, "Unsupported save version: found {}, expected {}", found, expected)
            }
            SaveError::InvalidBoard(reason) => write!(f, "Invalid board: {}", reason),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for SaveError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        SaveError::Yaml(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPowerup {
    pub position: Position,
    pub powerup: PowerupTag,
}

/// Everything needed to resume a game. The type grid alone drops powerups, so
/// they are stored next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub board: TypeGrid,
    #[serde(default)]
    pub powerups: Vec<SavedPowerup>,
    #[serde(default)]
    pub collection: Collection,
    #[serde(default)]
    pub threat: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub total_stolen: u64,
}

impl SaveState {
    pub fn capture_board(board: &Board) -> (TypeGrid, Vec<SavedPowerup>) {
        let powerups = board
            .gems()
            .filter(|gem| gem.powerup != PowerupTag::None)
            .map(|gem| SavedPowerup {
                position: gem.position,
                powerup: gem.powerup,
            })
            .collect();
        (board.to_array(), powerups)
    }

    /// Rebuilds the board, rejecting grids that are not a full 8x8.
    pub fn to_board(&self) -> Result<Board, SaveError> {
        if self.board.len() != BOARD_SIZE {
            return Err(SaveError::InvalidBoard(format!(
                "expected {} rows, found {}",
                BOARD_SIZE,
                self.board.len()
            )));
        }
        for (row, line) in self.board.iter().enumerate() {
            if line.len() != BOARD_SIZE {
                return Err(SaveError::InvalidBoard(format!(
                    "row {} has {} cells",
                    row,
                    line.len()
                )));
            }
            if let Some(col) = line.iter().position(|cell| cell.is_none()) {
                return Err(SaveError::InvalidBoard(format!("empty cell at ({}, {})", row, col)));
            }
        }

        let mut board = Board::from_array(&self.board);
        for saved in &self.powerups {
            if !board.set_powerup(saved.position, saved.powerup) {
                return Err(SaveError::InvalidBoard(format!(
                    "powerup outside the grid at {}",
                    saved.position
                )));
            }
        }
        Ok(board)
    }
}

pub fn save_to_string(state: &SaveState) -> Result<String, SaveError> {
    Ok(serde_yaml_ng::to_string(state)?)
}

pub fn load_from_str(content: &str) -> Result<SaveState, SaveError> {
    let state: SaveState = serde_yaml_ng::from_str(content)?;
    if state.version != SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: state.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(state)
}

pub fn save_game(path: &Path, state: &SaveState) -> Result<(), SaveError> {
    let content = save_to_string(state)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_game(path: &Path) -> Result<SaveState, SaveError> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}
