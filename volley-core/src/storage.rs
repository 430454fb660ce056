//! Whole-state persistence behind an injected key-value store.
//!
//! The snapshot is written as one JSON value under one key and replaced in
//! full on every save. The theme preference lives under its own key.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::athlete::{Athlete, AthleteId};
use crate::match_data::MatchData;
use crate::tracker::Tracker;

pub const DEFAULT_SNAPSHOT_KEY: &str = "volleyball_stats_pro_data";
pub const DEFAULT_THEME_KEY: &str = "volleyball_stats_pro_theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key `{0}`")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// The persisted form of a [`Tracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub athletes: Vec<Athlete>,
    pub stats_by_athlete: BTreeMap<AthleteId, MatchData>,
}

/// Colour scheme preference, stored as `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stored form: `light` or `dark`.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme.
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{}`", other)),
        }
    }
}

/// String values under string keys, in the manner of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files under `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write to a temp file, then rename over the target.
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        tracing::debug!(bytes = value.len(), path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Loads and saves snapshots and the theme through a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    store: S,
    snapshot_key: String,
    theme_key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    /// Use the default storage keys.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, DEFAULT_SNAPSHOT_KEY, DEFAULT_THEME_KEY)
    }

    /// Use custom keys for the snapshot and the theme.
    pub fn with_keys(store: S, snapshot_key: impl Into<String>, theme_key: impl Into<String>) -> Self {
        Self {
            store,
            snapshot_key: snapshot_key.into(),
            theme_key: theme_key.into(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Overwrite the stored snapshot.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(&self.snapshot_key, &json)?;
        tracing::info!(athletes = snapshot.athletes.len(), "snapshot saved");
        Ok(())
    }

    /// The stored snapshot, or `None` when nothing usable is stored.
    ///
    /// Read and parse failures are logged and treated as absent.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.store.get(&self.snapshot_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(error = %e, "failed to read saved data");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::error!(error = %e, "failed to parse saved data, ignoring it");
                None
            }
        }
    }

    /// Save the whole roster and its stats.
    pub fn save_tracker(&mut self, tracker: &Tracker) -> Result<()> {
        self.save(&tracker.to_snapshot())
    }

    /// The stored roster, or the default roster when none is stored.
    pub fn load_tracker(&self) -> Tracker {
        match self.load() {
            Some(snapshot) => {
                tracing::info!(athletes = snapshot.athletes.len(), "snapshot loaded");
                Tracker::from_snapshot(snapshot)
            }
            None => Tracker::new(),
        }
    }

    /// Delete the stored snapshot. The theme is kept.
    pub fn purge(&mut self) -> Result<()> {
        self.store.remove(&self.snapshot_key)?;
        tracing::info!("saved data purged");
        Ok(())
    }

    /// Reset the roster and delete the stored snapshot.
    pub fn full_reset(&mut self, tracker: &mut Tracker) -> Result<()> {
        self.purge()?;
        tracker.full_reset();
        Ok(())
    }

    /// Overwrite the stored theme.
    pub fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.set(&self.theme_key, theme.as_str())
    }

    /// The stored theme, or `None` when absent or unreadable.
    pub fn load_theme(&self) -> Option<Theme> {
        let raw = match self.store.get(&self.theme_key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(error = %e, "failed to read theme preference");
                return None;
            }
        };
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring stored theme");
                None
            }
        }
    }
}
