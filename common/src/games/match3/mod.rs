mod ability;
mod board;
mod collection;
mod config;
mod controller;
mod events;
pub mod match_finder;
mod save;
mod streak;
mod threat;
mod types;

pub use ability::AbilityProfile;
pub use board::{Board, TypeGrid};
pub use collection::{Collection, StealResult};
pub use config::{GameConfig, RulesConfig};
pub use controller::{ActionError, BoardController, CascadeResult, CascadeStep, MoveOutcome, SwapResult};
pub use events::{CallbackSink, ChannelEventSink, EventLog, EventSink, GameEvent};
pub use save::{SAVE_VERSION, SaveError, SaveState, SavedPowerup, load_game, save_game};
pub use streak::{StreakCounter, is_milestone, milestone_reward};
pub use threat::{ThreatChange, ThreatCounter};
pub use types::{
    BOARD_SIZE, CELL_COUNT, GEM_TYPE_COUNT, Gem, GemType, MIN_MATCH_LENGTH, Match, Position,
    PowerupTag, match_score,
};
