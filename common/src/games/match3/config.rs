use serde::{Deserialize, Serialize};

use super::ability::AbilityProfile;
use crate::config::Validate;

pub const MAX_PURCHASE_COST: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub hint_cost: u32,
    pub shuffle_cost: u32,
    pub steal_min: u32,
    pub steal_max: u32,
    pub threat_threshold: u32,
    /// Safety valve for cascades that fail to settle.
    pub max_cascade_levels: u32,
    pub max_shuffle_attempts: u32,
    /// Bound on retype passes while a shuffle removes accidental matches.
    pub max_retype_passes: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            hint_cost: 5,
            shuffle_cost: 10,
            steal_min: 2,
            steal_max: 9,
            threat_threshold: 3,
            max_cascade_levels: 64,
            max_shuffle_attempts: 100,
            max_retype_passes: 256,
        }
    }
}

impl Validate for RulesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.hint_cost > MAX_PURCHASE_COST || self.shuffle_cost > MAX_PURCHASE_COST {
            return Err(format!(
                "Hint and shuffle costs must be at most {}, got {} and {}",
                MAX_PURCHASE_COST, self.hint_cost, self.shuffle_cost
            ));
        }
        if self.steal_min > self.steal_max {
            return Err(format!(
                "Steal range is empty: {}..={}",
                self.steal_min, self.steal_max
            ));
        }
        if self.threat_threshold < 1 {
            return Err("Threat threshold must be at least 1".to_string());
        }
        if self.max_cascade_levels < 1 {
            return Err("Max cascade levels must be at least 1".to_string());
        }
        if self.max_shuffle_attempts < 1 {
            return Err("Max shuffle attempts must be at least 1".to_string());
        }
        if self.max_retype_passes < 1 {
            return Err("Max retype passes must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    /// `None` picks a fresh random seed per game.
    pub seed: Option<u64>,
    pub rules: RulesConfig,
    pub profile: AbilityProfile,
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), String> {
        self.rules.validate()?;
        self.profile.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ConfigContentProvider, ConfigManager, ConfigSerializer, FileContentConfigProvider,
        InMemoryContentProvider, YamlConfigSerializer,
    };
    use crate::games::match3::GemType;

    fn get_temp_file_path() -> String {
        let mut path = std::env::temp_dir();
        let random_number: u32 = rand::random();
        path.push(format!("temp_dragon_gems_config_{}.yaml", random_number));
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_can_be_serialized_and_deserialized_string() {
        let config = GameConfig::default();
        let serializer = YamlConfigSerializer::new();

        let serialized = serializer.serialize(&config).unwrap();
        let deserialized: GameConfig = serializer.deserialize(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let serializer = YamlConfigSerializer::new();
        let yaml = "seed: 42\nprofile:\n  name: Aurora\n  favorite_gem: Sapphire\n  favorite_bonus: 1\n";

        let config: GameConfig = serializer.deserialize(yaml).unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.profile.favorite_gem, Some(GemType::Sapphire));
        assert_eq!(config.profile.streak_multiplier, 1);
        assert_eq!(config.rules, RulesConfig::default());
    }

    #[test]
    fn test_config_roundtrips_through_file() {
        let config = GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        };
        let file_path = get_temp_file_path();
        let provider = FileContentConfigProvider::new(file_path.clone());
        let serializer = YamlConfigSerializer::new();

        provider
            .set_config_content(&serializer.serialize(&config).unwrap())
            .unwrap();
        let content = provider.get_config_content().unwrap().unwrap();
        let restored: GameConfig = serializer.deserialize(&content).unwrap();
        let _ = std::fs::remove_file(&file_path);

        assert_eq!(config, restored);
    }

    #[test]
    fn test_missing_file_yields_none() {
        let provider = FileContentConfigProvider::new(get_temp_file_path());
        assert_eq!(provider.get_config_content().unwrap(), None);
    }

    #[test]
    fn test_manager_returns_default_when_empty_and_caches_saved() {
        let manager: ConfigManager<InMemoryContentProvider, GameConfig> =
            ConfigManager::new(InMemoryContentProvider::default(), YamlConfigSerializer::new());

        assert_eq!(manager.get_config().unwrap(), GameConfig::default());

        let custom = GameConfig {
            seed: Some(99),
            ..GameConfig::default()
        };
        manager.set_config(&custom).unwrap();
        assert_eq!(manager.get_config().unwrap(), custom);
    }

    #[test]
    fn test_manager_rejects_invalid_content() {
        let yaml = "rules:\n  steal_min: 9\n  steal_max: 2\n".to_string();
        let manager: ConfigManager<InMemoryContentProvider, GameConfig> =
            ConfigManager::new(InMemoryContentProvider::new(Some(yaml)), YamlConfigSerializer::new());

        let error = manager.get_config().unwrap_err();
        assert!(error.contains("Steal range"));
    }

    #[test]
    fn test_purchase_costs_are_bounded() {
        let mut rules = RulesConfig {
            hint_cost: MAX_PURCHASE_COST,
            shuffle_cost: MAX_PURCHASE_COST,
            ..RulesConfig::default()
        };
        assert!(rules.validate().is_ok());

        rules.shuffle_cost = u32::MAX;
        assert!(rules.validate().unwrap_err().contains("shuffle costs"));

        rules.shuffle_cost = 10;
        rules.hint_cost = MAX_PURCHASE_COST + 1;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_manager_rejects_oversized_profile_bonus() {
        let yaml = "profile:\n  favorite_gem: Ruby\n  favorite_bonus: 4294967295\n".to_string();
        let manager: ConfigManager<InMemoryContentProvider, GameConfig> =
            ConfigManager::new(InMemoryContentProvider::new(Some(yaml)), YamlConfigSerializer::new());

        let error = manager.get_config().unwrap_err();
        assert!(error.contains("Favorite bonus"));
    }

    #[test]
    fn test_manager_refuses_to_save_invalid_config() {
        let manager: ConfigManager<InMemoryContentProvider, GameConfig> =
            ConfigManager::new(InMemoryContentProvider::default(), YamlConfigSerializer::new());
        let mut invalid = GameConfig::default();
        invalid.profile.cost_discount_percent = 200;

        assert!(manager.set_config(&invalid).is_err());
        assert_eq!(manager.get_config().unwrap(), GameConfig::default());
    }
}
