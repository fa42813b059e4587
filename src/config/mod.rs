pub mod persistence;
pub mod settings;
pub mod store;

pub use persistence::{ConfigPersistence, JsonFileConfigPersistence, PersistenceError};
pub use settings::{AllocationSplit, ConfigPatch, EngineConfig, ScoringWeights};
pub use store::{ConfigChange, ConfigError, ConfigHistoryEntry, ConfigStore};
