use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use common::games::match3::GameConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "dragon_gems_runner_config.yaml";

const MAX_MOVES: u32 = 10_000;
const MAX_STEP_DELAY_MS: u64 = 5_000;

fn get_config_path() -> String {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME).to_string_lossy().into_owned();
    }
    CONFIG_FILE_NAME.to_string()
}

/// `path` overrides the default file next to the executable.
pub fn get_config_manager(
    path: Option<&str>,
) -> ConfigManager<FileContentConfigProvider, RunnerConfig, YamlConfigSerializer> {
    match path {
        Some(path) => ConfigManager::from_yaml_file(path),
        None => ConfigManager::from_yaml_file(&get_config_path()),
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    pub game: GameConfig,
    pub moves: u32,
    /// Pause after each printed event, imitating animation time.
    pub step_delay_ms: u64,
    pub save_path: Option<String>,
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<(), String> {
        self.game.validate()?;
        if self.moves == 0 {
            return Err("moves must be greater than 0".to_string());
        }
        if self.moves > MAX_MOVES {
            return Err(format!("moves must not exceed {}", MAX_MOVES));
        }
        if self.step_delay_ms > MAX_STEP_DELAY_MS {
            return Err(format!("step_delay_ms must not exceed {}", MAX_STEP_DELAY_MS));
        }
        if let Some(path) = &self.save_path
            && path.is_empty()
        {
            return Err("save_path must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            moves: 30,
            step_delay_ms: 0,
            save_path: None,
        }
    }
}
