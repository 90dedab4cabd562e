//! Configuration management
//!
//! TOML-backed configuration with environment variable overrides in the
//! form `RESUMATCH_SECTION__KEY=value`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embedding::EmbeddingConfig;
use crate::error::{Result, ResumatchError};
use crate::index::IndexConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
}

/// Corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the candidate documents (.txt files)
    pub source_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results per query
    pub default_limit: usize,
    /// Display snippet length in characters of cleaned content
    pub snippet_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            snippet_chars: 300,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ResumatchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ResumatchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ResumatchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: RESUMATCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("RESUMATCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CORPUS__SOURCE_DIR" => {
                self.corpus.source_dir = PathBuf::from(value);
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "INDEX__PATH" => {
                self.index.path = PathBuf::from(value);
            }
            "SEARCH__DEFAULT_LIMIT" => {
                self.search.default_limit =
                    value.parse().map_err(|_| ResumatchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.embedding.model.is_empty() {
            return Err(ResumatchError::InvalidConfigValue {
                path: "embedding.model".to_string(),
                message: "model name must not be empty".to_string(),
            });
        }
        if self.embedding.dimension == 0 {
            return Err(ResumatchError::InvalidConfigValue {
                path: "embedding.dimension".to_string(),
                message: "dimension must be positive".to_string(),
            });
        }
        if self.search.default_limit == 0 {
            return Err(ResumatchError::InvalidConfigValue {
                path: "search.default_limit".to_string(),
                message: "limit must be positive".to_string(),
            });
        }
        if self.search.snippet_chars == 0 {
            return Err(ResumatchError::InvalidConfigValue {
                path: "search.snippet_chars".to_string(),
                message: "snippet length must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ResumatchError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("resumatch").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig {
                source_dir: PathBuf::from("resume-store"),
            },
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.search.default_limit = 7;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.default_limit, 7);
        assert_eq!(loaded.embedding.model, "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ResumatchError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = Config::default();
        config.search.default_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ResumatchError::InvalidConfigValue { .. })
        ));
    }
}
