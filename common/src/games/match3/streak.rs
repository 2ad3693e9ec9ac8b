use super::types::PowerupTag;

const EARLY_MILESTONES: [u32; 5] = [5, 10, 15, 20, 25];
const LATE_MILESTONE_STEP: u32 = 10;

/// Streak of good moves (a 4+ match or any cascade).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakCounter {
    value: u32,
}

impl StreakCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Adds `amount` and returns every milestone crossed on the way.
    pub fn advance(&mut self, amount: u32) -> Vec<u32> {
        let before = self.value;
        self.value = self.value.saturating_add(amount);
        milestones_between(before, self.value)
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

pub fn is_milestone(value: u32) -> bool {
    let last_early = EARLY_MILESTONES[EARLY_MILESTONES.len() - 1];
    EARLY_MILESTONES.contains(&value)
        || (value > last_early && (value - last_early) % LATE_MILESTONE_STEP == 0)
}

/// Milestones in `(from, to]`.
pub fn milestones_between(from: u32, to: u32) -> Vec<u32> {
    (from.saturating_add(1)..=to).filter(|v| is_milestone(*v)).collect()
}

/// 5, 15 and 25 grant a star; 10, 20 and everything past 25 grant a rainbow.
pub fn milestone_reward(milestone: u32) -> PowerupTag {
    match milestone {
        5 | 15 | 25 => PowerupTag::Star,
        _ => PowerupTag::Rainbow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_schedule() {
        let hits: Vec<u32> = (1..=60).filter(|v| is_milestone(*v)).collect();
        assert_eq!(hits, vec![5, 10, 15, 20, 25, 35, 45, 55]);
    }

    #[test]
    fn test_advance_reports_crossed_milestones() {
        let mut streak = StreakCounter::with_value(4);

        assert_eq!(streak.advance(1), vec![5]);
        assert_eq!(streak.advance(1), Vec::<u32>::new());
        assert_eq!(streak.value(), 6);
    }

    #[test]
    fn test_multiplier_can_jump_over_milestones() {
        let mut streak = StreakCounter::with_value(9);

        assert_eq!(streak.advance(2), vec![10]);
        assert_eq!(streak.advance(10), vec![15, 20]);
    }

    #[test]
    fn test_rewards() {
        assert_eq!(milestone_reward(5), PowerupTag::Star);
        assert_eq!(milestone_reward(10), PowerupTag::Rainbow);
        assert_eq!(milestone_reward(25), PowerupTag::Star);
        assert_eq!(milestone_reward(35), PowerupTag::Rainbow);
    }

    #[test]
    fn test_reset() {
        let mut streak = StreakCounter::with_value(12);
        streak.reset();
        assert_eq!(streak.value(), 0);
    }
}
