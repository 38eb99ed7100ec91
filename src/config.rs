use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::ai::{AiLevel, AiPlayer};
use crate::arena::MatchConfig;
use crate::pawn::Side;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for one AI player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub level: AiLevel,
    /// Fixed seed for reproducible play; random when absent.
    pub seed: Option<u64>,
}

impl AiConfig {
    pub fn build(&self, name: impl Into<String>, side: Side) -> AiPlayer {
        match self.seed {
            Some(seed) => AiPlayer::with_seed(name, side, self.level, seed),
            None => AiPlayer::new(name, side, self.level),
        }
    }
}

/// Everything the demo binary reads from its JSON config file. Missing
/// keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub attacker_ai: AiConfig,
    pub defender_ai: AiConfig,
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
