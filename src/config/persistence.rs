use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::EngineConfig;
use super::store::ConfigHistoryEntry;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the configuration and its audit trail. Out of scope
/// for the engine itself; implementations own schema and durability.
pub trait ConfigPersistence {
    fn save(&self, config: &EngineConfig, history: &[ConfigHistoryEntry]) -> Result<(), PersistenceError>;

    /// `Ok(None)` when no snapshot exists yet.
    fn load(&self) -> Result<Option<(EngineConfig, Vec<ConfigHistoryEntry>)>, PersistenceError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigSnapshot {
    config: EngineConfig,
    history: Vec<ConfigHistoryEntry>,
}

/// Single-file JSON persistence.
///
/// Writes go to a sibling temp file first and are committed with an atomic
/// rename, so a crash mid-write can never leave a truncated snapshot behind.
#[derive(Debug)]
pub struct JsonFileConfigPersistence {
    path: PathBuf,
}

impl JsonFileConfigPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl ConfigPersistence for JsonFileConfigPersistence {
    fn save(&self, config: &EngineConfig, history: &[ConfigHistoryEntry]) -> Result<(), PersistenceError> {
        let snapshot = ConfigSnapshot {
            config: config.clone(),
            history: history.to_vec(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        let f = fs::File::create(&temp)?;
        serde_json::to_writer_pretty(&f, &snapshot)?;
        f.sync_all()?;

        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<(EngineConfig, Vec<ConfigHistoryEntry>)>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let f = fs::File::open(&self.path)?;
        let snapshot: ConfigSnapshot = serde_json::from_reader(f)?;
        Ok(Some((snapshot.config, snapshot.history)))
    }
}
