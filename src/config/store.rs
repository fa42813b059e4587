use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::persistence::ConfigPersistence;
use super::settings::{ConfigPatch, EngineConfig};
use crate::document::DocumentType;

/// An update violated a configuration invariant. The whole update is
/// rejected; nothing was applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Weight for {factor} is {weight}, must be in [0,10]")]
    WeightOutOfRange { factor: String, weight: f64 },

    #[error("ragStrictness is {0}, must be in [0,100]")]
    StrictnessOutOfRange(u8),

    #[error("Allocation percentages sum to {0}, must sum to 100")]
    AllocationSum(u32),

    #[error("documentTypesPriority is not a permutation of the type taxonomy: {0}")]
    PriorityNotPermutation(String),
}

/// What a history entry records about the change itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigChange {
    Update { patch: ConfigPatch },
    Reset,
}

/// Who/when/what of one successful configuration change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigHistoryEntry {
    pub version: u64,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub change: ConfigChange,
}

struct StoreState {
    config: EngineConfig,
    history: Vec<ConfigHistoryEntry>,
}

/// Holds the shared configuration under a writer-serialized critical
/// section. Readers always get a complete, validated snapshot; an invalid
/// update leaves the prior configuration intact.
pub struct ConfigStore {
    state: RwLock<StoreState>,
    persistence: Option<Box<dyn ConfigPersistence + Send + Sync>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        ConfigStore {
            state: RwLock::new(StoreState {
                config: EngineConfig::default(),
                history: Vec::new(),
            }),
            persistence: None,
        }
    }

    /// Attach a durable layer. An existing snapshot, when present, seeds
    /// the store; a load failure falls back to defaults with a warning
    /// rather than failing construction.
    pub fn with_persistence(persistence: Box<dyn ConfigPersistence + Send + Sync>) -> Self {
        let (config, history) = match persistence.load() {
            Ok(Some((config, history))) => (config, history),
            Ok(None) => (EngineConfig::default(), Vec::new()),
            Err(err) => {
                warn!(error = %err, "failed to load persisted configuration, using defaults");
                (EngineConfig::default(), Vec::new())
            }
        };

        ConfigStore {
            state: RwLock::new(StoreState { config, history }),
            persistence: Some(persistence),
        }
    }

    /// A complete, validated snapshot of the current configuration.
    pub fn get(&self) -> EngineConfig {
        self.state.read().unwrap_or_else(|e| e.into_inner()).config.clone()
    }

    /// The append-only audit trail, oldest first.
    pub fn history(&self) -> Vec<ConfigHistoryEntry> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).history.clone()
    }

    /// Apply a partial update atomically.
    ///
    /// The patch is merged onto the current configuration and the MERGED
    /// result is validated; any violation rejects the whole update and the
    /// prior configuration stays in effect. An empty patch is a no-op and
    /// does not bump the version.
    pub fn update(&self, patch: ConfigPatch, changed_by: &str) -> Result<EngineConfig, ConfigError> {
        if patch.is_empty() {
            return Ok(self.get());
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let mut merged = state.config.clone();
        if let Some(weights) = &patch.weights {
            merged.weights = weights.clone();
        }
        if let Some(strictness) = patch.rag_strictness {
            merged.rag_strictness = strictness;
        }
        if let Some(allocation) = patch.allocation {
            merged.allocation = allocation;
        }
        if let Some(priority) = &patch.document_types_priority {
            merged.document_types_priority = priority.clone();
        }

        validate(&merged)?;

        merged.version = state.config.version + 1;
        let entry = ConfigHistoryEntry {
            version: merged.version,
            changed_by: changed_by.to_string(),
            changed_at: Utc::now(),
            change: ConfigChange::Update { patch },
        };

        state.config = merged.clone();
        state.history.push(entry);
        self.persist(&state);

        Ok(merged)
    }

    /// Restore the fixed default configuration. Logged as a history entry
    /// like any other change.
    pub fn reset(&self, changed_by: &str) -> EngineConfig {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let mut fresh = EngineConfig::default();
        fresh.version = state.config.version + 1;

        let entry = ConfigHistoryEntry {
            version: fresh.version,
            changed_by: changed_by.to_string(),
            changed_at: Utc::now(),
            change: ConfigChange::Reset,
        };

        state.config = fresh.clone();
        state.history.push(entry);
        self.persist(&state);

        fresh
    }

    /// Persistence failures never fail the update: the in-memory commit
    /// already happened, and durable storage is a collaborator that may be
    /// transiently unreachable.
    fn persist(&self, state: &StoreState) {
        if let Some(persistence) = &self.persistence {
            if let Err(err) = persistence.save(&state.config, &state.history) {
                warn!(error = %err, "failed to persist configuration snapshot");
            }
        }
    }
}

/// Validate a complete candidate configuration.
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    for (factor, weight) in config.weights.iter() {
        if !weight.is_finite() || !(0.0..=10.0).contains(weight) {
            return Err(ConfigError::WeightOutOfRange {
                factor: factor.clone(),
                weight: *weight,
            });
        }
    }

    if config.rag_strictness > 100 {
        return Err(ConfigError::StrictnessOutOfRange(config.rag_strictness));
    }

    if config.allocation.total() != 100 {
        return Err(ConfigError::AllocationSum(config.allocation.total()));
    }

    if config.document_types_priority.len() != DocumentType::ALL.len() {
        return Err(ConfigError::PriorityNotPermutation(format!(
            "expected {} types, got {}",
            DocumentType::ALL.len(),
            config.document_types_priority.len()
        )));
    }
    for doc_type in DocumentType::ALL {
        let occurrences = config
            .document_types_priority
            .iter()
            .filter(|t| **t == doc_type)
            .count();
        if occurrences != 1 {
            return Err(ConfigError::PriorityNotPermutation(format!(
                "{doc_type:?} appears {occurrences} times"
            )));
        }
    }

    Ok(())
}
