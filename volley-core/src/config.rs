//! Runtime configuration, read from `volley.toml` with environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::ollama;
use crate::storage::{Theme, DEFAULT_SNAPSHOT_KEY, DEFAULT_THEME_KEY};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "volley.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub coach: CoachConfig,
    pub log: LogConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub snapshot_key: String,
    pub theme_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".volley"),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

/// Which [`crate::Coach`] writes reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachBackend {
    #[default]
    Ollama,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub backend: CoachBackend,
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            backend: CoachBackend::default(),
            host: ollama::DEFAULT_HOST.to_string(),
            model: ollama::DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl CoachConfig {
    /// Read/write timeout for one coaching request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn,volley_core=info,volley_cli=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme used until one is saved.
    pub default_theme: Theme,
}

impl Config {
    /// Read `path`, or `volley.toml` in the working directory when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse TOML text; missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `VOLLEY_DATA_DIR`, `OLLAMA_HOST` and `OLLAMA_MODEL`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("VOLLEY_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.coach.host = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.coach.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.snapshot_key, DEFAULT_SNAPSHOT_KEY);
        assert_eq!(config.coach.backend, CoachBackend::Ollama);
        assert_eq!(config.ui.default_theme, Theme::Light);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [coach]
            backend = "rules"
            timeout_secs = 5

            [ui]
            default_theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.coach.backend, CoachBackend::Rules);
        assert_eq!(config.coach.timeout(), Duration::from_secs(5));
        assert_eq!(config.coach.model, ollama::DEFAULT_MODEL);
        assert_eq!(config.ui.default_theme, Theme::Dark);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_toml("[coach]\nbackend = \"gpt\"").is_err());
        assert!(Config::from_toml("[ui]\ndefault_theme = 3").is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("VOLLEY_DATA_DIR", "/tmp/volley"),
            ("OLLAMA_MODEL", "mistral"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/volley"));
        assert_eq!(config.coach.model, "mistral");
        assert_eq!(config.coach.host, ollama::DEFAULT_HOST);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn reads_file_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("volley.toml");
        fs::write(&path, "[storage]\ndata_dir = \"stats\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("stats"));
    }
}
