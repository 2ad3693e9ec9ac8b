use std::time::Duration;

use common::games::match3::{BOARD_SIZE, Board, GameEvent, GemType, Position, PowerupTag};
use tokio::sync::mpsc;

fn gem_letter(gem_type: GemType) -> char {
    match gem_type {
        GemType::Ruby => 'R',
        GemType::Sapphire => 'S',
        GemType::Emerald => 'E',
        GemType::Diamond => 'D',
        GemType::Amethyst => 'A',
        GemType::Bracelet => 'B',
        GemType::Earring => 'J',
    }
}

fn powerup_mark(powerup: PowerupTag) -> char {
    match powerup {
        PowerupTag::None => ' ',
        PowerupTag::Star => '*',
        PowerupTag::Rainbow => '@',
    }
}

/// One line per row: a letter per gem followed by its powerup mark.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            match board.get(Position::new(row, col)) {
                Some(gem) => {
                    out.push(gem_letter(gem.gem_type));
                    out.push(powerup_mark(gem.powerup));
                }
                None => out.push_str(". "),
            }
        }
        out.push('\n');
    }
    out
}

pub fn describe_event(event: &GameEvent) -> Option<String> {
    let text = match event {
        GameEvent::ValidSwap { from, to } => format!("swap {} <-> {}", from, to),
        GameEvent::InvalidSwap { from, to } => format!("rejected swap {} <-> {}", from, to),
        GameEvent::GemsRemoved { level, matches, removed } => format!(
            "level {}: {} match(es), {} gem(s) cleared",
            level,
            matches.len(),
            removed.len()
        ),
        GameEvent::PowerupCreated { gem } => {
            format!("{:?} {} created at {}", gem.powerup, gem.gem_type, gem.position)
        }
        GameEvent::GemsSpawned { .. } => return None,
        GameEvent::CascadeComplete {
            total_score,
            cascade_count,
            collected,
            ..
        } => format!(
            "cascade done: {} level(s), +{} points, {} gem(s) collected",
            cascade_count,
            total_score,
            collected.len()
        ),
        GameEvent::BoardShuffled => "board shuffled".to_string(),
        GameEvent::DragonAttack { result } => {
            format!("the dragon stole {} gem(s)", result.total_stolen)
        }
        GameEvent::ThreatChanged { value, threshold } => format!("threat {}/{}", value, threshold),
        GameEvent::StreakChanged { value } => format!("streak {}", value),
        GameEvent::BonusPowerupGranted {
            milestone,
            position,
            powerup,
        } => format!("streak {} bonus: {:?} at {}", milestone, powerup, position),
        GameEvent::CascadeLimitReached { levels } => {
            format!("cascade stopped after {} levels", levels)
        }
    };
    Some(text)
}

/// Prints events until every sender is gone.
pub async fn print_events(mut receiver: mpsc::UnboundedReceiver<GameEvent>, step_delay: Duration) {
    while let Some(event) = receiver.recv().await {
        let Some(text) = describe_event(&event) else {
            continue;
        };
        println!("  {}", text);
        if !step_delay.is_zero() {
            tokio::time::sleep(step_delay).await;
        }
    }
}
