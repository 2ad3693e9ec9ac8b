use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::GemType;
use crate::games::session_rng::RandomSource;

/// Share of a type's current stock the dragon takes in one grab, in percent.
const STEAL_GRAB_PERCENT: u32 = 30;

/// Gems banked by the player. Counts never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    counts: BTreeMap<GemType, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealResult {
    pub total_stolen: u32,
    pub stolen: BTreeMap<GemType, u32>,
}

impl StealResult {
    pub fn is_empty(&self) -> bool {
        self.total_stolen == 0
    }
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: BTreeMap<GemType, u32>) -> Self {
        let counts = counts.into_iter().filter(|(_, n)| *n > 0).collect();
        Self { counts }
    }

    pub fn counts(&self) -> &BTreeMap<GemType, u32> {
        &self.counts
    }

    pub fn count(&self, gem_type: GemType) -> u32 {
        self.counts.get(&gem_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts
            .values()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add(&mut self, gem_type: GemType, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.counts.entry(gem_type).or_insert(0);
        *count = count.saturating_add(amount);
    }

    /// Removes up to `amount` of `gem_type` and returns how many were removed.
    pub fn take(&mut self, gem_type: GemType, amount: u32) -> u32 {
        let Some(current) = self.counts.get_mut(&gem_type) else {
            return 0;
        };
        let taken = amount.min(*current);
        *current -= taken;
        if *current == 0 {
            self.counts.remove(&gem_type);
        }
        taken
    }

    /// Pays `amount` units, drawing from the largest stocks first (ties go to the
    /// earlier gem type). Nothing is deducted when the total is too small.
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.total() < amount {
            return false;
        }
        let mut remaining = amount;
        while remaining > 0 {
            let Some((&gem_type, _)) = self
                .counts
                .iter()
                .max_by(|(ta, a), (tb, b)| a.cmp(b).then(tb.cmp(ta)))
            else {
                break;
            };
            remaining -= self.take(gem_type, 1);
        }
        true
    }

    /// Dragon steal: draws a target in `steal_min..=steal_max`, subtracts
    /// `resistance` (never below one while anything is banked), clamps to the
    /// total, then grabs up to 30% of a random stocked type per round.
    pub fn steal(
        &mut self,
        resistance: u32,
        steal_min: u32,
        steal_max: u32,
        rng: &mut impl RandomSource,
    ) -> StealResult {
        let total = self.total();
        if total == 0 {
            return StealResult::default();
        }

        let target = rng.range_inclusive(steal_min, steal_max);
        let mut remaining = target.saturating_sub(resistance).max(1).min(total);
        let mut result = StealResult::default();

        while remaining > 0 {
            let stocked: Vec<GemType> = self.counts.keys().copied().collect();
            let Some(&gem_type) = rng.pick(&stocked) else {
                break;
            };
            let stock = self.count(gem_type);
            let grab = (stock * STEAL_GRAB_PERCENT / 100).max(1).min(remaining);
            let taken = self.take(gem_type, grab);

            *result.stolen.entry(gem_type).or_insert(0) += taken;
            result.total_stolen += taken;
            remaining -= taken;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::session_rng::{ScriptedRng, SessionRng};

    fn sample() -> Collection {
        let mut collection = Collection::new();
        collection.add(GemType::Ruby, 10);
        collection.add(GemType::Emerald, 4);
        collection.add(GemType::Earring, 1);
        collection
    }

    #[test]
    fn test_add_and_take_never_go_negative() {
        let mut collection = sample();

        assert_eq!(collection.take(GemType::Emerald, 9), 4);
        assert_eq!(collection.count(GemType::Emerald), 0);
        assert_eq!(collection.take(GemType::Diamond, 3), 0);
        assert_eq!(collection.total(), 11);
    }

    #[test]
    fn test_counts_saturate_instead_of_wrapping() {
        let mut collection = Collection::new();
        collection.add(GemType::Ruby, u32::MAX);
        collection.add(GemType::Ruby, 5);
        collection.add(GemType::Emerald, 3);

        assert_eq!(collection.count(GemType::Ruby), u32::MAX);
        assert_eq!(collection.total(), u32::MAX);
    }

    #[test]
    fn test_spend_draws_from_largest_stock() {
        let mut collection = sample();

        assert!(collection.spend(6));
        assert_eq!(collection.count(GemType::Ruby), 4);
        assert_eq!(collection.count(GemType::Emerald), 4);
        assert_eq!(collection.count(GemType::Earring), 1);

        // Ties go to the earlier gem type.
        assert!(collection.spend(1));
        assert_eq!(collection.count(GemType::Ruby), 3);
        assert_eq!(collection.count(GemType::Emerald), 4);
    }

    #[test]
    fn test_spend_fails_without_mutation_when_short() {
        let mut collection = sample();

        assert!(!collection.spend(16));
        assert_eq!(collection, sample());
    }

    #[test]
    fn test_steal_from_empty_collection_is_noop() {
        let mut collection = Collection::new();
        let mut rng = SessionRng::new(1);

        let result = collection.steal(0, 2, 9, &mut rng);

        assert!(result.is_empty());
        assert!(result.stolen.is_empty());
    }

    #[test]
    fn test_steal_resistance_keeps_minimum_of_one() {
        let mut collection = sample();
        let mut rng = ScriptedRng::new(vec![0]);

        let result = collection.steal(50, 2, 9, &mut rng);

        assert_eq!(result.total_stolen, 1);
        assert_eq!(collection.total(), 14);
    }

    #[test]
    fn test_steal_takes_exact_target_with_resistance() {
        let mut collection = sample();
        // Target 2 + 7 = 9, resistance 3 leaves 6 to steal.
        let mut rng = ScriptedRng::new(vec![7, 0]);

        let result = collection.steal(3, 2, 9, &mut rng);

        assert_eq!(result.total_stolen, 6);
        assert_eq!(collection.total(), 9);
        let per_type: u32 = result.stolen.values().sum();
        assert_eq!(per_type, 6);
    }

    #[test]
    fn test_fuzz_steal_bounds() {
        for seed in 0..300u64 {
            let mut rng = SessionRng::new(seed);
            let mut collection = Collection::new();
            for gem_type in GemType::ALL {
                let amount = rng.random_range(0..4u32);
                collection.add(gem_type, amount);
            }
            let before = collection.total();

            let result = collection.steal(seed as u32 % 4, 2, 9, &mut rng);

            assert!(result.total_stolen <= before, "Seed {}", seed);
            assert_eq!(collection.total(), before - result.total_stolen, "Seed {}", seed);
            if before > 0 {
                assert!(result.total_stolen >= 1, "Seed {}", seed);
            }
        }
    }
}
