use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Deepest search a config file may ask for.
pub const MAX_SEARCH_DEPTH: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Search depth in plies.
    pub const fn depth(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 3,
            Self::Hard => 5,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read engine config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_depth: u8,
    pub alpha_beta: bool,
    // Static neighbour pre-sort; never changes the chosen move
    pub move_ordering: bool,
    pub immediate_win_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: Difficulty::Medium.depth(),
            alpha_beta: true,
            move_ordering: true,
            immediate_win_check: true,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    difficulty: Option<Difficulty>,
    max_depth: Option<u8>,
    alpha_beta: Option<bool>,
    move_ordering: Option<bool>,
    immediate_win_check: Option<bool>,
}

impl EngineConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            max_depth: difficulty.depth(),
            ..Self::default()
        }
    }

    /// Reads a partial config. `difficulty` picks the depth unless
    /// `max_depth` is given too; the depth is clamped to `1..=MAX_SEARCH_DEPTH`.
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = json_config
            .difficulty
            .map_or_else(Self::default, Self::from_difficulty);

        Ok(Self {
            max_depth: json_config
                .max_depth
                .unwrap_or(default.max_depth)
                .clamp(1, MAX_SEARCH_DEPTH),
            alpha_beta: json_config.alpha_beta.unwrap_or(default.alpha_beta),
            move_ordering: json_config.move_ordering.unwrap_or(default.move_ordering),
            immediate_win_check: json_config
                .immediate_win_check
                .unwrap_or(default.immediate_win_check),
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = EngineConfig::load_from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn test_load_config_difficulty() {
        let config = EngineConfig::load_from_json(r#"{ "difficulty": "Hard" }"#).unwrap();
        assert_eq!(config.max_depth, 5);
        assert!(config.alpha_beta);

        let config =
            EngineConfig::load_from_json(r#"{ "difficulty": "Easy", "max_depth": 4 }"#).unwrap();
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_load_config_partial() {
        let json = r#"{
            "alpha_beta": false,
            "move_ordering": false
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert!(!config.alpha_beta);
        assert!(!config.move_ordering);
        // Others should be default
        assert!(config.immediate_win_check);
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn test_load_config_clamps_depth() {
        let config = EngineConfig::load_from_json(r#"{ "max_depth": 0 }"#).unwrap();
        assert_eq!(config.max_depth, 1);
        let config = EngineConfig::load_from_json(r#"{ "max_depth": 200 }"#).unwrap();
        assert_eq!(config.max_depth, MAX_SEARCH_DEPTH);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let result = EngineConfig::load_from_json("{ invalid json }");
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = EngineConfig::load_from_json(r#"{ "difficulty": "Impossible" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = EngineConfig::load_from_file("/nonexistent/duel/engine.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_difficulty_depths() {
        let depths: Vec<u8> = Difficulty::ALL.iter().map(|d| d.depth()).collect();
        assert_eq!(depths, vec![1, 3, 5]);
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_deserialize_absolute_config() {
        let config: EngineConfig = serde_json::from_str(r#"{ "max_depth": 7 }"#).unwrap();
        assert_eq!(config.max_depth, 7);
        assert!(config.move_ordering);
    }
}
