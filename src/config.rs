use std::num::NonZeroUsize;

use crate::{
    ranking::{Norm, StopWords, DEFAULT_SEPARATOR},
    storage::{self, StorageManager},
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

/// Default minimum document count for a vocabulary term
const DEFAULT_MIN_DF: usize = 10;
/// Default maximum document fraction for a vocabulary term
const DEFAULT_MAX_DF: f32 = 0.25;
/// Default number of pairs to report
const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid config: {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Configuration for the similarity ranking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Terms found in fewer reference documents are dropped
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Terms found in a larger fraction of reference documents are dropped (0.0, 1.0]
    #[serde(default = "default_max_df")]
    pub max_df: f32,

    #[serde(default)]
    pub norm: Norm,

    /// Stop-word list: "english" or "none"
    #[serde(default)]
    pub stop_words: StopWords,

    /// Number of pairs to report
    #[serde(default = "default_top_k")]
    pub top_k: NonZeroUsize,

    /// Placed between title and abstract
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Worker threads: "auto" or a positive integer
    #[serde(default = "default_parallelism")]
    pub parallelism: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_df: DEFAULT_MIN_DF,
            max_df: DEFAULT_MAX_DF,
            norm: Norm::L2,
            stop_words: StopWords::English,
            top_k: default_top_k(),
            separator: default_separator(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_min_df() -> usize {
    DEFAULT_MIN_DF
}

fn default_max_df() -> f32 {
    DEFAULT_MAX_DF
}

fn default_top_k() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_TOP_K).unwrap_or(NonZeroUsize::MIN)
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_parallelism() -> String {
    "auto".to_string()
}

impl RankingConfig {
    /// Thread count for rayon; 0 lets rayon decide.
    pub fn thread_count(&self) -> usize {
        self.parallelism.parse::<usize>().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_df == 0 {
            return Err(ConfigError::invalid("ranking.min_df", "must be at least 1"));
        }

        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ConfigError::invalid(
                "ranking.max_df",
                format!("must be in (0.0, 1.0], got {}", self.max_df),
            ));
        }

        if self.parallelism != "auto" {
            match self.parallelism.parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::invalid(
                        "ranking.parallelism",
                        format!(
                            "must be 'auto' or a positive integer, got '{}'",
                            self.parallelism
                        ),
                    ))
                }
                Ok(_) => {}
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    pub fn load_with(base_path: &str) -> Result<Self, ConfigError> {
        let store = storage::BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("Writing default config to {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_string();
        config.ranking.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().to_str().unwrap();

        let config = Config::load_with(base).unwrap();

        assert_eq!(config.ranking, RankingConfig::default());
        assert!(tmp.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "ranking:\n  min_df: 2\n  stop_words: none\n",
        )
        .unwrap();

        let config = Config::load_with(tmp.path().to_str().unwrap()).unwrap();

        assert_eq!(config.ranking.min_df, 2);
        assert_eq!(config.ranking.stop_words, StopWords::None);
        assert_eq!(config.ranking.max_df, DEFAULT_MAX_DF);
        assert_eq!(config.ranking.top_k.get(), DEFAULT_TOP_K);

        // upgraded file now contains every field
        let saved = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(saved.contains("separator"));
    }

    #[test]
    fn test_invalid_max_df() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "ranking:\n  max_df: 1.5\n").unwrap();

        let result = Config::load_with(tmp.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_zero_top_k_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "ranking:\n  top_k: 0\n").unwrap();

        let result = Config::load_with(tmp.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_parallelism_validation() {
        let mut config = RankingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_count(), 0);

        config.parallelism = "4".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_count(), 4);

        config.parallelism = "0".to_string();
        assert!(config.validate().is_err());

        config.parallelism = "many".to_string();
        assert!(config.validate().is_err());
    }
}
