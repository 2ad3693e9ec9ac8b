use std::collections::HashSet;

use super::ability::AbilityProfile;
use super::board::Board;
use super::collection::{Collection, StealResult};
use super::config::{GameConfig, RulesConfig};
use super::events::{EventLog, EventSink, GameEvent};
use super::match_finder;
use super::save::{SAVE_VERSION, SaveError, SaveState};
use super::streak::{StreakCounter, milestone_reward};
use super::threat::{ThreatChange, ThreatCounter};
use super::types::{BOARD_SIZE, GemType, Gem, Match, Position, PowerupTag};
use crate::games::session_rng::{RandomSource, SessionRng};
use crate::identifiers::GemId;

#[derive(Debug, Clone, PartialEq)]
pub struct SwapResult {
    pub success: bool,
    pub matches: Vec<Match>,
}

/// One settled level of a cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeStep {
    pub level: u32,
    pub matches: Vec<Match>,
    pub removed: Vec<Gem>,
    /// One entry per unit credited to the collection.
    pub collected: Vec<GemType>,
    /// Powerup gems born this level, at their settled positions.
    pub powerups: Vec<Gem>,
    pub spawned: Vec<Gem>,
    pub score: u64,
    pub big_match: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeResult {
    pub matches: Vec<Match>,
    pub collected_gems: Vec<GemType>,
    pub total_score: u64,
    pub cascade_count: u32,
    pub pure_small: bool,
    pub big_match: bool,
    pub limit_reached: bool,
    pub threat: ThreatChange,
    pub steal: Option<StealResult>,
    pub milestones: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub swap: SwapResult,
    pub cascade: Option<CascadeResult>,
    /// The settled board had no move left and was reshuffled.
    pub reshuffled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    InsufficientGems { needed: u32, available: u32 },
    NoMovesAvailable,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::InsufficientGems { needed, available } => {
                write!(f, "Not enough gems: need {}, have {}", needed, available)
            }
            ActionError::NoMovesAvailable => write!(f, "No moves available"),
        }
    }
}

impl std::error::Error for ActionError {}

/// Insertion-ordered set of cells to clear in one level.
#[derive(Default)]
struct RemovalSet {
    seen: HashSet<Position>,
    order: Vec<Position>,
}

impl RemovalSet {
    fn insert(&mut self, pos: Position) {
        if pos.is_in_bounds() && self.seen.insert(pos) {
            self.order.push(pos);
        }
    }
}

fn types_unlike_neighbors(board: &Board, pos: Position) -> Vec<GemType> {
    let neighbors = [
        pos.row.checked_sub(1).map(|row| Position::new(row, pos.col)),
        Some(Position::new(pos.row + 1, pos.col)),
        pos.col.checked_sub(1).map(|col| Position::new(pos.row, col)),
        Some(Position::new(pos.row, pos.col + 1)),
    ];
    let taken: Vec<GemType> = neighbors
        .into_iter()
        .flatten()
        .filter_map(|p| board.gem_type_at(p))
        .collect();
    GemType::ALL
        .iter()
        .copied()
        .filter(|t| !taken.contains(t))
        .collect()
}

/// Owns the board and every counter a move touches. All mutation of a game
/// goes through here, one move at a time.
pub struct BoardController<R: RandomSource = SessionRng, S: EventSink = EventLog> {
    board: Board,
    collection: Collection,
    threat: ThreatCounter,
    streak: StreakCounter,
    score: u64,
    total_stolen: u64,
    profile: AbilityProfile,
    rules: RulesConfig,
    rng: R,
    sink: S,
}

impl BoardController<SessionRng, EventLog> {
    /// Seeds from `config.seed`, or draws a fresh seed when it is unset.
    pub fn from_config(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };
        Self::new(config, rng, EventLog::new())
    }
}

impl<R: RandomSource> BoardController<R, EventLog> {
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.sink.take_events()
    }
}

impl<R: RandomSource, S: EventSink> BoardController<R, S> {
    /// Fresh match-free board, reshuffled if it happens to have no move.
    pub fn new(config: &GameConfig, mut rng: R, sink: S) -> Self {
        let board = Board::generate(&mut rng);
        let mut controller = Self::with_board(config, board, rng, sink);
        controller.ensure_valid_moves();
        controller
    }

    pub fn with_board(config: &GameConfig, board: Board, rng: R, sink: S) -> Self {
        Self {
            board,
            collection: Collection::new(),
            threat: ThreatCounter::new(config.rules.threat_threshold),
            streak: StreakCounter::new(),
            score: 0,
            total_stolen: 0,
            profile: config.profile.clone(),
            rules: config.rules.clone(),
            rng,
            sink,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    pub fn threat(&self) -> u32 {
        self.threat.value()
    }

    pub fn streak(&self) -> u32 {
        self.streak.value()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn total_stolen(&self) -> u64 {
        self.total_stolen
    }

    pub fn profile(&self) -> &AbilityProfile {
        &self.profile
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Board state is left untouched; the new profile applies from the next move.
    pub fn set_profile(&mut self, profile: AbilityProfile) {
        self.profile = profile;
    }

    /// The only path that swaps gems on behalf of a player. A rejected swap
    /// leaves the board exactly as it was and breaks the streak.
    pub fn try_swap(&mut self, from: Position, to: Position) -> SwapResult {
        if !Board::are_adjacent(from, to) || self.board.is_empty_at(from) || self.board.is_empty_at(to) {
            return self.reject_swap(from, to);
        }

        self.board.swap(from, to);
        let matches = match_finder::find_all_matches(&self.board);
        if matches.is_empty() {
            self.board.swap(from, to);
            return self.reject_swap(from, to);
        }

        self.sink.emit(GameEvent::ValidSwap { from, to });
        SwapResult {
            success: true,
            matches,
        }
    }

    fn reject_swap(&mut self, from: Position, to: Position) -> SwapResult {
        self.sink.emit(GameEvent::InvalidSwap { from, to });
        if self.streak.value() > 0 {
            self.streak.reset();
            self.sink.emit(GameEvent::StreakChanged { value: 0 });
        }
        SwapResult {
            success: false,
            matches: Vec::new(),
        }
    }

    /// Swap, resolve the cascade, and reshuffle if the settled board is stuck.
    pub fn make_move(&mut self, from: Position, to: Position) -> MoveOutcome {
        let swap = self.try_swap(from, to);
        if !swap.success {
            return MoveOutcome {
                swap,
                cascade: None,
                reshuffled: false,
            };
        }

        let cascade = self.process_cascade();
        let reshuffled = !self.has_valid_moves();
        if reshuffled {
            self.ensure_valid_moves();
        }

        MoveOutcome {
            swap,
            cascade: Some(cascade),
            reshuffled,
        }
    }

    /// Resolves one level: remove, credit, place powerups, settle, refill.
    /// Returns `None` when the board has no match.
    pub fn process_cascade_step(&mut self, level: u32) -> Option<CascadeStep> {
        let matches = match_finder::find_all_matches(&self.board);
        if matches.is_empty() {
            return None;
        }
        let level = level.max(1);
        let big_match = matches.iter().any(|m| m.length >= 4);

        let removed: Vec<Gem> = self
            .removal_set(&matches)
            .order
            .into_iter()
            .filter_map(|pos| self.board.remove(pos))
            .collect();
        self.sink.emit(GameEvent::GemsRemoved {
            level,
            matches: matches.clone(),
            removed: removed.clone(),
        });

        let collected = self.credit_removed(&matches, &removed, level);

        // Born into the cleared center cell so it falls with its column.
        let powerup_ids = self.place_powerups(&matches);
        self.board.apply_gravity();
        let powerups: Vec<Gem> = self
            .board
            .gems()
            .filter(|gem| powerup_ids.contains(&gem.id))
            .copied()
            .collect();
        for gem in &powerups {
            self.sink.emit(GameEvent::PowerupCreated { gem: *gem });
        }

        let spawned = self.board.fill_empty(&mut self.rng);
        if !spawned.is_empty() {
            self.sink.emit(GameEvent::GemsSpawned {
                level,
                gems: spawned.clone(),
            });
        }

        let score = matches.iter().map(Match::base_score).sum::<u64>() * u64::from(level);
        self.score += score;

        Some(CascadeStep {
            level,
            matches,
            removed,
            collected,
            powerups,
            spawned,
            score,
            big_match,
        })
    }

    /// Matched gems first, then star lines, then rainbow colors. Only gems from
    /// the scanned matches trigger; swept gems never chain.
    fn removal_set(&self, matches: &[Match]) -> RemovalSet {
        let mut set = RemovalSet::default();
        let triggers: Vec<Gem> = matches.iter().flat_map(|m| m.gems.iter().copied()).collect();

        for gem in &triggers {
            set.insert(gem.position);
        }

        for gem in triggers.iter().filter(|g| g.powerup == PowerupTag::Star) {
            let Position { row, col } = gem.position;
            for i in 0..BOARD_SIZE {
                set.insert(Position::new(row, i));
                set.insert(Position::new(i, col));
            }
            if self.profile.wide_star_blast {
                for r in row.saturating_sub(1)..=(row + 1).min(BOARD_SIZE - 1) {
                    for c in col.saturating_sub(1)..=(col + 1).min(BOARD_SIZE - 1) {
                        set.insert(Position::new(r, c));
                    }
                }
            }
        }

        for gem in triggers.iter().filter(|g| g.powerup == PowerupTag::Rainbow) {
            for other in self.board.gems().filter(|o| o.gem_type == gem.gem_type) {
                set.insert(other.position);
            }
        }

        set
    }

    /// Favorite-gem bonus applies to matched gems only; sweep collateral
    /// credits one unit each.
    fn credit_removed(&mut self, matches: &[Match], removed: &[Gem], level: u32) -> Vec<GemType> {
        let matched: HashSet<GemId> = matches.iter().flat_map(|m| m.gems.iter().map(|g| g.id)).collect();
        let mut collected = Vec::with_capacity(removed.len());
        for gem in removed {
            let units = if matched.contains(&gem.id) {
                self.profile.credit_for(gem.gem_type)
            } else {
                1
            };
            self.collection.add(gem.gem_type, units);
            collected.extend(std::iter::repeat_n(gem.gem_type, units as usize));
        }

        for _ in 0..self.profile.cascade_bonus_at(level) {
            if let Some(&gem_type) = self.rng.pick(&GemType::ALL) {
                self.collection.add(gem_type, 1);
                collected.push(gem_type);
            }
        }

        collected
    }

    fn place_powerups(&mut self, matches: &[Match]) -> Vec<GemId> {
        let mut ids = Vec::new();
        for m in matches {
            let powerup = PowerupTag::for_match_length(m.length);
            if powerup == PowerupTag::None {
                continue;
            }
            if let Some(center) = m.center()
                && let Some(gem) = self.board.spawn(center, m.gem_type, powerup)
            {
                ids.push(gem.id);
            }
        }
        ids
    }

    /// Runs levels until the board settles, then books threat and streak once
    /// for the whole move.
    pub fn process_cascade(&mut self) -> CascadeResult {
        let mut matches = Vec::new();
        let mut collected_gems = Vec::new();
        let mut total_score = 0;
        let mut cascade_count = 0;
        let mut first_level_small = false;
        let mut big_match = false;
        let mut limit_reached = false;

        let mut level = 1;
        while let Some(step) = self.process_cascade_step(level) {
            if level == 1 {
                first_level_small = step.matches.len() == 1 && step.matches[0].length == 3;
            }
            cascade_count = level;
            big_match |= step.big_match;
            total_score += step.score;
            matches.extend(step.matches);
            collected_gems.extend(step.collected);

            if level >= self.rules.max_cascade_levels {
                if !match_finder::find_all_matches(&self.board).is_empty() {
                    limit_reached = true;
                    crate::log_warn!("Cascade still matching after {} levels, stopping", level);
                    self.sink.emit(GameEvent::CascadeLimitReached { levels: level });
                }
                break;
            }
            level += 1;
        }

        let pure_small = first_level_small && cascade_count == 1;

        self.sink.emit(GameEvent::CascadeComplete {
            matches: matches.clone(),
            collected: collected_gems.clone(),
            total_score,
            cascade_count,
        });

        let (threat, steal) = self.finalize_threat(pure_small, big_match, cascade_count);
        let milestones = self.finalize_streak(big_match, cascade_count);

        CascadeResult {
            matches,
            collected_gems,
            total_score,
            cascade_count,
            pure_small,
            big_match,
            limit_reached,
            threat,
            steal,
            milestones,
        }
    }

    fn finalize_threat(
        &mut self,
        pure_small: bool,
        big_match: bool,
        cascade_count: u32,
    ) -> (ThreatChange, Option<StealResult>) {
        if cascade_count == 0 {
            return (ThreatChange::Unchanged, None);
        }

        let change = self
            .threat
            .record_move(pure_small, big_match, cascade_count.saturating_sub(1));
        if change != ThreatChange::Unchanged {
            self.sink.emit(GameEvent::ThreatChanged {
                value: self.threat.value(),
                threshold: self.threat.threshold(),
            });
        }

        let steal = if change == ThreatChange::Triggered {
            let resistance = self.profile.steal_resistance;
            Some(self.steal_from_collection(resistance))
        } else {
            None
        };
        (change, steal)
    }

    fn finalize_streak(&mut self, big_match: bool, cascade_count: u32) -> Vec<u32> {
        if !big_match && cascade_count <= 1 {
            return Vec::new();
        }

        let milestones = self.streak.advance(self.profile.streak_multiplier.max(1));
        self.sink.emit(GameEvent::StreakChanged {
            value: self.streak.value(),
        });
        for &milestone in &milestones {
            self.grant_milestone_powerup(milestone);
        }
        milestones
    }

    /// Tags a random plain gem with the milestone's powerup. `None` when every
    /// gem already carries one.
    pub fn grant_milestone_powerup(&mut self, milestone: u32) -> Option<Position> {
        let candidates: Vec<Position> = self
            .board
            .gems()
            .filter(|gem| gem.powerup == PowerupTag::None)
            .map(|gem| gem.position)
            .collect();
        let position = *self.rng.pick(&candidates)?;
        let powerup = milestone_reward(milestone);

        self.board.set_powerup(position, powerup);
        crate::log_debug!("Streak milestone {} granted {:?} at {}", milestone, powerup, position);
        self.sink.emit(GameEvent::BonusPowerupGranted {
            milestone,
            position,
            powerup,
        });
        Some(position)
    }

    pub fn steal_from_collection(&mut self, resistance: u32) -> StealResult {
        let result = self.collection.steal(
            resistance,
            self.rules.steal_min,
            self.rules.steal_max,
            &mut self.rng,
        );
        self.total_stolen += u64::from(result.total_stolen);
        crate::log!(
            "Dragon stole {} gems ({} lifetime)",
            result.total_stolen,
            self.total_stolen
        );
        self.sink.emit(GameEvent::DragonAttack {
            result: result.clone(),
        });
        result
    }

    pub fn has_valid_moves(&self) -> bool {
        match_finder::has_valid_moves(&self.board)
    }

    /// A uniformly random valid swap, or `None` when the board is stuck.
    pub fn find_hint(&mut self) -> Option<(Position, Position)> {
        let swaps = match_finder::find_valid_swaps(&self.board);
        self.rng.pick(&swaps).copied()
    }

    /// Permutes every gem, then retypes matched gems until no match is left.
    pub fn shuffle(&mut self) {
        let mut gems: Vec<Gem> = self.board.gems().copied().collect();
        self.rng.shuffle(&mut gems);
        self.board.clear();
        for (index, gem) in gems.into_iter().enumerate() {
            self.board.set(Position::from_index(index), gem);
        }

        self.break_up_matches();
        crate::log!("Board shuffled");
        self.sink.emit(GameEvent::BoardShuffled);
    }

    fn break_up_matches(&mut self) {
        for _ in 0..self.rules.max_retype_passes {
            let matches = match_finder::find_all_matches(&self.board);
            if matches.is_empty() {
                return;
            }
            for gem in matches.iter().flat_map(|m| m.gems.iter()) {
                let allowed = types_unlike_neighbors(&self.board, gem.position);
                if let Some(&gem_type) = self.rng.pick(&allowed) {
                    self.board.retype(gem.position, gem_type);
                }
            }
        }
        if !match_finder::find_all_matches(&self.board).is_empty() {
            crate::log_warn!(
                "Shuffle still has matches after {} retype passes",
                self.rules.max_retype_passes
            );
        }
    }

    /// Reshuffles until a move exists, up to `max_shuffle_attempts` times.
    pub fn ensure_valid_moves(&mut self) -> bool {
        let mut attempts = 0;
        while !self.has_valid_moves() {
            if attempts >= self.rules.max_shuffle_attempts {
                crate::log_warn!("No valid move after {} shuffles", attempts);
                return false;
            }
            self.shuffle();
            attempts += 1;
        }
        if attempts > 0 {
            crate::log!("Reshuffled {} time(s) to restore a valid move", attempts);
        }
        true
    }

    fn charge(&mut self, cost: u32) -> Result<u32, ActionError> {
        let needed = self.profile.discounted(cost);
        if !self.collection.spend(needed) {
            return Err(ActionError::InsufficientGems {
                needed,
                available: self.collection.total(),
            });
        }
        Ok(needed)
    }

    /// Nothing is charged when the board has no valid swap.
    pub fn purchase_hint(&mut self) -> Result<(Position, Position), ActionError> {
        let swaps = match_finder::find_valid_swaps(&self.board);
        if swaps.is_empty() {
            return Err(ActionError::NoMovesAvailable);
        }
        self.charge(self.rules.hint_cost)?;
        self.rng
            .pick(&swaps)
            .copied()
            .ok_or(ActionError::NoMovesAvailable)
    }

    /// Returns the amount paid.
    pub fn purchase_shuffle(&mut self) -> Result<u32, ActionError> {
        let paid = self.charge(self.rules.shuffle_cost)?;
        self.shuffle();
        self.ensure_valid_moves();
        Ok(paid)
    }

    pub fn save_state(&self) -> SaveState {
        let (board, powerups) = SaveState::capture_board(&self.board);
        SaveState {
            version: SAVE_VERSION,
            board,
            powerups,
            collection: self.collection.clone(),
            threat: self.threat.value(),
            streak: self.streak.value(),
            score: self.score,
            total_stolen: self.total_stolen,
        }
    }

    /// Replaces the whole game state. On error nothing changes.
    pub fn restore(&mut self, state: &SaveState) -> Result<(), SaveError> {
        if state.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: state.version,
                expected: SAVE_VERSION,
            });
        }
        self.board = state.to_board()?;
        self.collection = state.collection.clone();
        self.threat = ThreatCounter::with_value(self.rules.threat_threshold, state.threat);
        self.streak = StreakCounter::with_value(state.streak);
        self.score = state.score;
        self.total_stolen = state.total_stolen;
        Ok(())
    }

    #[cfg(test)]
    fn set_board(&mut self, board: Board) {
        self.board = board;
    }
}
