use common::games::RandomSource;
use common::games::match3::{BoardController, EventSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub moves_played: u32,
    pub score: u64,
    pub longest_cascade: u32,
    pub steals: u32,
    pub gems_stolen: u64,
    pub reshuffles: u32,
    pub milestones: Vec<u32>,
    /// Play ended early because no hint could be found.
    pub stuck: bool,
}

/// Plays up to `moves` hinted swaps.
pub fn play<R: RandomSource, S: EventSink>(controller: &mut BoardController<R, S>, moves: u32) -> PlaySummary {
    let mut summary = PlaySummary::default();

    for _ in 0..moves {
        let Some((from, to)) = controller.find_hint() else {
            summary.stuck = true;
            break;
        };

        let outcome = controller.make_move(from, to);
        summary.moves_played += 1;
        if outcome.reshuffled {
            summary.reshuffles += 1;
        }
        if let Some(cascade) = outcome.cascade {
            summary.longest_cascade = summary.longest_cascade.max(cascade.cascade_count);
            if cascade.steal.is_some() {
                summary.steals += 1;
            }
            summary.milestones.extend(cascade.milestones);
        }
    }

    summary.score = controller.score();
    summary.gems_stolen = controller.total_stolen();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::games::SessionRng;
    use common::games::match3::{EventLog, GameConfig, GameEvent};

    #[test]
    fn test_play_runs_requested_moves() {
        for seed in 0..5u64 {
            let mut controller = BoardController::new(&GameConfig::default(), SessionRng::new(seed), EventLog::new());

            let summary = play(&mut controller, 25);

            assert_eq!(summary.moves_played, 25, "Seed {}", seed);
            assert!(!summary.stuck);
            assert!(summary.score >= 25 * 50, "Seed {}", seed);
            assert!(summary.longest_cascade >= 1);
            assert_eq!(summary.gems_stolen, controller.total_stolen());

            let events = controller.take_events();
            let completes = events
                .iter()
                .filter(|e| matches!(e, GameEvent::CascadeComplete { .. }))
                .count();
            assert_eq!(completes, 25);
            assert!(!events.iter().any(|e| matches!(e, GameEvent::InvalidSwap { .. })));
        }
    }

    #[test]
    fn test_zero_moves_is_noop() {
        let mut controller = BoardController::new(&GameConfig::default(), SessionRng::new(1), EventLog::new());

        assert_eq!(play(&mut controller, 0), PlaySummary::default());
    }
}
