use serde::{Deserialize, Serialize};

use super::types::GemType;
use crate::config::Validate;

pub const MAX_FAVORITE_BONUS: u32 = 10;
pub const MAX_CASCADE_BONUS: u32 = 10;
pub const MAX_STREAK_MULTIPLIER: u32 = 10;

/// Character modifiers the cascade engine reads on every move. Supplied by the
/// caller; switching profiles never touches the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityProfile {
    pub name: String,
    /// Extra random gems per cascade level past the first, scaled by `level - 1`.
    pub cascade_bonus: u32,
    /// Flat reduction of every dragon steal.
    pub steal_resistance: u32,
    pub favorite_gem: Option<GemType>,
    /// Extra units credited per removed gem of `favorite_gem`.
    pub favorite_bonus: u32,
    /// Triggered stars also clear the 3x3 box around themselves.
    pub wide_star_blast: bool,
    /// Streak increment for a good move.
    pub streak_multiplier: u32,
    /// Percentage taken off hint and shuffle costs.
    pub cost_discount_percent: u32,
}

impl AbilityProfile {
    pub fn discounted(&self, cost: u32) -> u32 {
        let discount = u64::from(self.cost_discount_percent.min(100));
        let cost = u64::from(cost);
        (cost - cost * discount / 100) as u32
    }

    /// Units credited for one matched gem of `gem_type`. Bonuses above the
    /// validated limit are clamped.
    pub fn credit_for(&self, gem_type: GemType) -> u32 {
        if self.favorite_gem == Some(gem_type) {
            1 + self.favorite_bonus.min(MAX_FAVORITE_BONUS)
        } else {
            1
        }
    }

    /// Extra random gems granted at `level` (1-based).
    pub fn cascade_bonus_at(&self, level: u32) -> u32 {
        level
            .saturating_sub(1)
            .saturating_mul(self.cascade_bonus.min(MAX_CASCADE_BONUS))
    }
}

impl Default for AbilityProfile {
    fn default() -> Self {
        Self {
            name: "Plain".to_string(),
            cascade_bonus: 0,
            steal_resistance: 0,
            favorite_gem: None,
            favorite_bonus: 0,
            wide_star_blast: false,
            streak_multiplier: 1,
            cost_discount_percent: 0,
        }
    }
}

impl Validate for AbilityProfile {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Ability profile name must not be empty".to_string());
        }
        if self.streak_multiplier < 1 || self.streak_multiplier > MAX_STREAK_MULTIPLIER {
            return Err(format!(
                "Streak multiplier must be between 1 and {}, got {}",
                MAX_STREAK_MULTIPLIER, self.streak_multiplier
            ));
        }
        if self.favorite_bonus > MAX_FAVORITE_BONUS {
            return Err(format!(
                "Favorite bonus must be at most {}, got {}",
                MAX_FAVORITE_BONUS, self.favorite_bonus
            ));
        }
        if self.cascade_bonus > MAX_CASCADE_BONUS {
            return Err(format!(
                "Cascade bonus must be at most {}, got {}",
                MAX_CASCADE_BONUS, self.cascade_bonus
            ));
        }
        if self.cost_discount_percent > 100 {
            return Err(format!(
                "Cost discount must be at most 100%, got {}",
                self.cost_discount_percent
            ));
        }
        if self.favorite_bonus > 0 && self.favorite_gem.is_none() {
            return Err("Favorite bonus requires a favorite gem".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_neutral() {
        let profile = AbilityProfile::default();

        assert_eq!(profile.discounted(10), 10);
        assert_eq!(profile.credit_for(GemType::Ruby), 1);
        assert_eq!(profile.cascade_bonus_at(5), 0);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_discount_amount_rounds_down() {
        let profile = AbilityProfile {
            cost_discount_percent: 25,
            ..AbilityProfile::default()
        };

        assert_eq!(profile.discounted(10), 8);
        assert_eq!(profile.discounted(5), 4);
    }

    #[test]
    fn test_favorite_gem_credit() {
        let profile = AbilityProfile {
            favorite_gem: Some(GemType::Amethyst),
            favorite_bonus: 2,
            ..AbilityProfile::default()
        };

        assert_eq!(profile.credit_for(GemType::Amethyst), 3);
        assert_eq!(profile.credit_for(GemType::Diamond), 1);
    }

    #[test]
    fn test_cascade_bonus_skips_first_level() {
        let profile = AbilityProfile {
            cascade_bonus: 2,
            ..AbilityProfile::default()
        };

        assert_eq!(profile.cascade_bonus_at(1), 0);
        assert_eq!(profile.cascade_bonus_at(2), 2);
        assert_eq!(profile.cascade_bonus_at(4), 6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_multiplier = AbilityProfile {
            streak_multiplier: 0,
            ..AbilityProfile::default()
        };
        let big_discount = AbilityProfile {
            cost_discount_percent: 150,
            ..AbilityProfile::default()
        };
        let orphan_bonus = AbilityProfile {
            favorite_bonus: 1,
            ..AbilityProfile::default()
        };

        assert!(zero_multiplier.validate().is_err());
        assert!(big_discount.validate().is_err());
        assert!(orphan_bonus.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_bonuses() {
        let huge_favorite = AbilityProfile {
            favorite_gem: Some(GemType::Ruby),
            favorite_bonus: u32::MAX,
            ..AbilityProfile::default()
        };
        let huge_cascade = AbilityProfile {
            cascade_bonus: 1 << 31,
            ..AbilityProfile::default()
        };
        let at_limit = AbilityProfile {
            favorite_gem: Some(GemType::Ruby),
            favorite_bonus: MAX_FAVORITE_BONUS,
            cascade_bonus: MAX_CASCADE_BONUS,
            ..AbilityProfile::default()
        };

        assert!(huge_favorite.validate().is_err());
        assert!(huge_cascade.validate().is_err());
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_unvalidated_extremes_do_not_overflow() {
        let profile = AbilityProfile {
            favorite_gem: Some(GemType::Ruby),
            favorite_bonus: u32::MAX,
            cascade_bonus: 1 << 31,
            cost_discount_percent: 50,
            ..AbilityProfile::default()
        };

        assert_eq!(profile.credit_for(GemType::Ruby), 1 + MAX_FAVORITE_BONUS);
        assert_eq!(profile.cascade_bonus_at(3), 2 * MAX_CASCADE_BONUS);
        assert_eq!(profile.cascade_bonus_at(u32::MAX), u32::MAX);
        assert_eq!(profile.discounted(100_000_000), 50_000_000);
        assert_eq!(profile.discounted(u32::MAX), u32::MAX - u32::MAX / 2);
    }
}
