use tokio::sync::mpsc;

use super::collection::StealResult;
use super::types::{Gem, GemType, Match, Position, PowerupTag};

/// Everything the engine reports to presentation layers, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Swap accepted, emitted before the cascade runs.
    ValidSwap { from: Position, to: Position },
    InvalidSwap { from: Position, to: Position },
    /// One per cascade level, once the removal set is known.
    GemsRemoved {
        level: u32,
        matches: Vec<Match>,
        removed: Vec<Gem>,
    },
    PowerupCreated { gem: Gem },
    GemsSpawned { level: u32, gems: Vec<Gem> },
    CascadeComplete {
        matches: Vec<Match>,
        collected: Vec<GemType>,
        total_score: u64,
        cascade_count: u32,
    },
    BoardShuffled,
    DragonAttack { result: StealResult },
    ThreatChanged { value: u32, threshold: u32 },
    StreakChanged { value: u32 },
    BonusPowerupGranted {
        milestone: u32,
        position: Position,
        powerup: PowerupTag,
    },
    CascadeLimitReached { levels: u32 },
}

pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Buffers events until the owner drains them.
#[derive(Debug, Default)]
pub struct EventLog {
    pending_events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn peek(&self) -> &[GameEvent] {
        &self.pending_events
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

pub struct CallbackSink<F> {
    callback: F,
}

impl<F: FnMut(GameEvent)> CallbackSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(GameEvent)> EventSink for CallbackSink<F> {
    fn emit(&mut self, event: GameEvent) {
        (self.callback)(event);
    }
}

/// Forwards events to an async consumer. Events sent after the receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<GameEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&mut self, event: GameEvent) {
        let _ = self.sender.send(event);
    }
}
