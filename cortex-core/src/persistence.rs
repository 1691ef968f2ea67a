//! JSON persistence for the two independent state units.
//!
//! ```text
//! cognitive_state.json  { "long_term_memory": { category: [item, ...] },
//!                         "associations":     { token: [token, ...] } }
//! emotional_state.json  { "dimensions": { pleasure, arousal, dominance },
//!                         "emotional_memory": [snapshot, ...] }
//! ```
//!
//! Load contract for both units:
//! - missing file → `Ok(None)`, the caller starts empty
//! - malformed content → [`CortexError::StateLoad`]
//!
//! Saves write a sibling temp file and rename it over the target, so a crash
//! mid-save never leaves a truncated state file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{EmotionConfig, MemoryConfig, PersistenceConfig};
use crate::emotion::{EmotionalSnapshot, EmotionalState};
use crate::error::{CortexError, Result};
use crate::memory::{AssociationGraph, MemoryItem, MemoryStore};
use crate::types::PadVector;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Persisted form of the memory store. The short-term buffer is not saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CognitiveState {
    /// Category → items, insertion order preserved.
    #[serde(default)]
    pub long_term_memory: BTreeMap<String, Vec<MemoryItem>>,
    /// Token co-occurrence graph.
    #[serde(default)]
    pub associations: AssociationGraph,
}

impl CognitiveState {
    /// Capture the persistent parts of a store.
    #[must_use]
    pub fn capture(store: &MemoryStore) -> Self {
        Self {
            long_term_memory: store.long_term().clone(),
            associations: store.associations().clone(),
        }
    }

    /// Rebuild a store with an empty short-term buffer.
    #[must_use]
    pub fn into_store(self, config: MemoryConfig) -> MemoryStore {
        MemoryStore::from_parts(config, self.long_term_memory, self.associations)
    }
}

/// Persisted form of the emotional state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalStateRecord {
    /// Current affect vector.
    #[serde(default)]
    pub dimensions: PadVector,
    /// Trailing snapshot log, oldest first.
    #[serde(default)]
    pub emotional_memory: Vec<EmotionalSnapshot>,
}

impl EmotionalStateRecord {
    /// Capture an emotional state.
    #[must_use]
    pub fn capture(state: &EmotionalState) -> Self {
        Self {
            dimensions: state.get_emotional_state(),
            emotional_memory: state.memory_log().iter().cloned().collect(),
        }
    }

    /// Rebuild the state; the log is truncated to the configured capacity.
    #[must_use]
    pub fn into_state(self, config: EmotionConfig) -> EmotionalState {
        EmotionalState::from_parts(config, self.dimensions, self.emotional_memory)
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Reads and writes the state files named by a [`PersistenceConfig`].
#[derive(Debug, Clone)]
pub struct StateStore {
    config: PersistenceConfig,
}

impl StateStore {
    /// Create a store over the configured paths.
    #[must_use]
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config }
    }

    /// Path of the cognitive state file.
    #[must_use]
    pub fn cognitive_path(&self) -> &Path {
        &self.config.cognitive_state_path
    }

    /// Path of the emotional state file.
    #[must_use]
    pub fn emotional_path(&self) -> &Path {
        &self.config.emotional_state_path
    }

    /// Save the long-term memory and associations.
    ///
    /// # Errors
    /// Returns [`CortexError::Serialization`] or [`CortexError::Io`].
    pub fn save_cognitive(&self, store: &MemoryStore) -> Result<()> {
        let start = Instant::now();
        let record = CognitiveState::capture(store);
        let bytes = write_json(&self.config.cognitive_state_path, &record, self.config.pretty)?;
        debug!(
            path = %self.config.cognitive_state_path.display(),
            memories = store.long_term_len(),
            bytes,
            elapsed_us = start.elapsed().as_micros(),
            "Saved cognitive state"
        );
        Ok(())
    }

    /// Load the memory store, if a state file exists.
    ///
    /// # Errors
    /// Returns [`CortexError::StateLoad`] for malformed content and
    /// [`CortexError::Io`] for read failures other than a missing file.
    pub fn load_cognitive(&self, config: MemoryConfig) -> Result<Option<MemoryStore>> {
        let start = Instant::now();
        let Some(record) = read_json::<CognitiveState>(&self.config.cognitive_state_path)? else {
            return Ok(None);
        };
        let store = record.into_store(config);
        info!(
            path = %self.config.cognitive_state_path.display(),
            memories = store.long_term_len(),
            tokens = store.associations().len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded cognitive state"
        );
        Ok(Some(store))
    }

    /// Load the memory store, falling back to an empty one on any failure.
    #[must_use]
    pub fn load_cognitive_or_default(&self, config: MemoryConfig) -> Restored<MemoryStore> {
        match self.load_cognitive(config.clone()) {
            Ok(Some(store)) => Restored::loaded(store),
            Ok(None) => Restored::loaded(MemoryStore::new(config)),
            Err(e) => {
                warn!(error = %e, "Falling back to empty cognitive state");
                Restored::fallback(MemoryStore::new(config))
            }
        }
    }

    /// Save the emotional state.
    ///
    /// # Errors
    /// Returns [`CortexError::Serialization`] or [`CortexError::Io`].
    pub fn save_emotional(&self, state: &EmotionalState) -> Result<()> {
        let start = Instant::now();
        let record = EmotionalStateRecord::capture(state);
        let bytes = write_json(&self.config.emotional_state_path, &record, self.config.pretty)?;
        debug!(
            path = %self.config.emotional_state_path.display(),
            snapshots = record.emotional_memory.len(),
            bytes,
            elapsed_us = start.elapsed().as_micros(),
            "Saved emotional state"
        );
        Ok(())
    }

    /// Load the emotional state, if a state file exists.
    ///
    /// # Errors
    /// Returns [`CortexError::StateLoad`] for malformed content and
    /// [`CortexError::Io`] for read failures other than a missing file.
    pub fn load_emotional(&self, config: EmotionConfig) -> Result<Option<EmotionalState>> {
        let Some(record) = read_json::<EmotionalStateRecord>(&self.config.emotional_state_path)?
        else {
            return Ok(None);
        };
        let state = record.into_state(config);
        info!(
            path = %self.config.emotional_state_path.display(),
            snapshots = state.memory_log().len(),
            state = %state.get_emotional_state(),
            "Loaded emotional state"
        );
        Ok(Some(state))
    }

    /// Load the emotional state, falling back to neutral on any failure.
    #[must_use]
    pub fn load_emotional_or_default(&self, config: EmotionConfig) -> Restored<EmotionalState> {
        match self.load_emotional(config.clone()) {
            Ok(Some(state)) => Restored::loaded(state),
            Ok(None) => Restored::loaded(EmotionalState::new(config)),
            Err(e) => {
                warn!(error = %e, "Falling back to neutral emotional state");
                Restored::fallback(EmotionalState::new(config))
            }
        }
    }
}

/// State returned by the `load_*_or_default` helpers.
#[derive(Debug)]
pub struct Restored<T> {
    /// The loaded state, or an empty default.
    pub state: T,
    /// A state file was present but unusable, so defaults were used.
    pub fell_back: bool,
}

impl<T> Restored<T> {
    fn loaded(state: T) -> Self {
        Self {
            state,
            fell_back: false,
        }
    }

    fn fallback(state: T) -> Self {
        Self {
            state,
            fell_back: true,
        }
    }
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No state file; starting empty");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| CortexError::StateLoad {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<usize> {
    let json = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|e| CortexError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(json.len())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionalContext;

    fn state_store(dir: &Path) -> StateStore {
        StateStore::new(PersistenceConfig::default().in_dir(dir))
    }

    fn populated_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.add_memory("remember the critical launch date", Some("work"));
        store.add_memory("it is important that I stay happy", None);
        store.add_memory("plain note", None);
        store.consolidate();
        store
    }

    #[test]
    fn missing_files_load_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        assert!(s.load_cognitive(MemoryConfig::default()).expect("load").is_none());
        assert!(s.load_emotional(EmotionConfig::default()).expect("load").is_none());
    }

    #[test]
    fn cognitive_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        let store = populated_store();
        s.save_cognitive(&store).expect("save");

        let loaded = s
            .load_cognitive(MemoryConfig::default())
            .expect("load")
            .expect("present");
        assert_eq!(loaded.long_term(), store.long_term());
        assert_eq!(loaded.associations(), store.associations());
        assert!(loaded.short_term().is_empty());
    }

    #[test]
    fn emotional_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        let mut state = EmotionalState::default();
        state.update_state("happy", &EmotionalContext::default());
        state.update_state("calm", &EmotionalContext::default());
        s.save_emotional(&state).expect("save");

        let loaded = s
            .load_emotional(EmotionConfig::default())
            .expect("load")
            .expect("present");
        assert_eq!(loaded.get_emotional_state(), state.get_emotional_state());
        assert_eq!(loaded.memory_log(), state.memory_log());
    }

    #[test]
    fn malformed_content_is_a_state_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        fs::write(s.cognitive_path(), "{ not json").expect("write");

        let err = s
            .load_cognitive(MemoryConfig::default())
            .expect_err("malformed");
        assert!(err.is_state_load());

        let fallback = s.load_cognitive_or_default(MemoryConfig::default());
        assert!(fallback.fell_back);
        assert_eq!(fallback.state.long_term_len(), 0);

        let missing = s.load_emotional_or_default(EmotionConfig::default());
        assert!(!missing.fell_back);
    }

    #[test]
    fn records_without_ids_get_fresh_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        let json = r#"{
            "long_term_memory": {
                "general": [
                    {"content": "a b", "timestamp": "2024-01-01T00:00:00Z", "category": null, "importance": 0.7},
                    {"content": "c d", "timestamp": "2024-01-01T00:00:00Z", "importance": 0.8}
                ]
            },
            "associations": {"a": ["b"], "b": ["a"]}
        }"#;
        fs::write(s.cognitive_path(), json).expect("write");

        let loaded = s
            .load_cognitive(MemoryConfig::default())
            .expect("load")
            .expect("present");
        let items = loaded.category("general");
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].id, items[1].id);
        assert!(loaded.associations().are_associated("a", "b"));
    }

    #[test]
    fn out_of_range_importance_is_clamped_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        let json = r#"{
            "long_term_memory": {
                "general": [
                    {"content": "too loud", "timestamp": "2024-01-01T00:00:00Z", "importance": 7.5},
                    {"content": "too quiet", "timestamp": "2024-01-01T00:00:00Z", "importance": -2.0}
                ]
            },
            "associations": {}
        }"#;
        fs::write(s.cognitive_path(), json).expect("write");

        let loaded = s
            .load_cognitive(MemoryConfig::default())
            .expect("load")
            .expect("present");
        let items = loaded.category("general");
        assert!((items[0].importance - 1.0).abs() < f32::EPSILON);
        assert!(items[1].importance.abs() < f32::EPSILON);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        s.save_emotional(&EmotionalState::default()).expect("save");
        let names: Vec<_> = fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(|e| e.ok().map(|e| e.file_name()))
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("emotional_state.json")]);
    }

    #[test]
    fn loaded_log_is_truncated_to_capacity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = state_store(dir.path());
        let mut state = EmotionalState::default();
        for _ in 0..10 {
            state.update_state("sad", &EmotionalContext::default());
        }
        s.save_emotional(&state).expect("save");

        let config = EmotionConfig {
            log_capacity: 4,
            ..EmotionConfig::default()
        };
        let loaded = s.load_emotional(config).expect("load").expect("present");
        assert_eq!(loaded.memory_log().len(), 4);
    }
}
