//! Memory items and the [`MemoryStore`] aggregate.
//!
//! The store has three tiers:
//!
//! - **Short-term buffer**: the most recent items, bounded by
//!   `short_term_capacity`. Overflow triggers consolidation.
//! - **Long-term store**: category → items, append-only. Only items whose
//!   importance exceeded the consolidation threshold ever arrive here.
//! - **Association graph**: token co-occurrence built from long-term items.
//!
//! Items are immutable once stored. They are never deleted individually:
//! they either migrate to long-term during consolidation or are dropped with
//! the rest of the buffer.

pub mod association;

pub use association::AssociationGraph;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::config::MemoryConfig;
use crate::consolidation::{self, ConsolidationReport};
use crate::retrieval::{self, RecalledMemory};
use crate::text;
use crate::types::{MemoryId, Timestamp};

/// A single remembered message or fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Unique identifier. Records persisted without one receive a fresh id.
    #[serde(default)]
    pub id: MemoryId,
    /// The remembered text.
    pub content: String,
    /// When the item was created.
    pub timestamp: Timestamp,
    /// Category supplied by the caller, if any.
    #[serde(default)]
    pub category: Option<String>,
    /// Importance in [0, 1], fixed at creation.
    pub importance: f32,
}

impl MemoryItem {
    /// Create a new memory item stamped with the current time.
    ///
    /// Importance is clamped to [0, 1].
    #[must_use]
    pub fn new(content: impl Into<String>, category: Option<String>, importance: f32) -> Self {
        Self {
            id: MemoryId::new(),
            content: content.into(),
            timestamp: chrono::Utc::now(),
            category,
            importance: importance.clamp(0.0, 1.0),
        }
    }
}

/// What happened as a result of one [`MemoryStore::add_memory`] call.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// Id of the newly buffered item.
    pub id: MemoryId,
    /// Importance assigned to the item.
    pub importance: f32,
    /// Present when the add overflowed the buffer and consolidation ran.
    pub consolidation: Option<ConsolidationReport>,
}

/// Bounded short-term buffer + categorized long-term store + association graph.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: MemoryConfig,
    short_term: Vec<MemoryItem>,
    long_term: BTreeMap<String, Vec<MemoryItem>>,
    associations: AssociationGraph,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            short_term: Vec::with_capacity(config.short_term_capacity + 1),
            config,
            long_term: BTreeMap::new(),
            associations: AssociationGraph::default(),
        }
    }

    /// Rebuild a store from persisted long-term items and associations.
    /// The short-term buffer always starts empty. Importance is clamped to
    /// [0, 1].
    #[must_use]
    pub fn from_parts(
        config: MemoryConfig,
        mut long_term: BTreeMap<String, Vec<MemoryItem>>,
        associations: AssociationGraph,
    ) -> Self {
        for item in long_term.values_mut().flatten() {
            if !(0.0..=1.0).contains(&item.importance) {
                warn!(id = %item.id, importance = item.importance, "Clamping out-of-range importance");
                item.importance = item.importance.clamp(0.0, 1.0);
            }
        }
        Self {
            short_term: Vec::with_capacity(config.short_term_capacity + 1),
            config,
            long_term,
            associations,
        }
    }

    /// Score the importance of `content`.
    ///
    /// `base + bonus × (importance keyword hits + emotion keyword hits)`,
    /// capped at 1.0. Keywords match as case-insensitive substrings, each
    /// distinct keyword counting once.
    #[must_use]
    pub fn evaluate_importance(&self, content: &str) -> f32 {
        let mut importance = self.config.base_importance;
        let hits = text::substring_hits(content, &self.config.importance_keywords)
            + text::substring_hits(content, &self.config.emotion_keywords);
        for _ in 0..hits {
            importance += self.config.keyword_bonus;
        }
        importance.clamp(0.0, 1.0)
    }

    /// Record a new memory in the short-term buffer.
    ///
    /// If the buffer then holds more than `short_term_capacity` items, the
    /// whole buffer is consolidated: important items move to long-term, the
    /// rest are discarded, and the buffer is cleared.
    pub fn add_memory(&mut self, content: impl Into<String>, category: Option<&str>) -> AddOutcome {
        let content = content.into();
        let importance = self.evaluate_importance(&content);
        let item = MemoryItem::new(content, category.map(str::to_string), importance);
        let id = item.id;

        trace!(%id, importance, category = ?item.category, "Buffered memory");
        self.short_term.push(item);

        let consolidation = if self.short_term.len() > self.config.short_term_capacity {
            Some(self.consolidate())
        } else {
            None
        };

        AddOutcome {
            id,
            importance,
            consolidation,
        }
    }

    /// Run consolidation on the current buffer regardless of its length.
    pub fn consolidate(&mut self) -> ConsolidationReport {
        consolidation::consolidate(
            &mut self.short_term,
            &mut self.long_term,
            &mut self.associations,
            self.config.consolidation_threshold,
            &self.config.default_category,
        )
    }

    /// Recall long-term memories relevant to `query`.
    ///
    /// Searches `category` only when given, otherwise every category.
    /// Results have relevance strictly above the recall threshold and are
    /// sorted by relevance, descending. Equal relevance keeps store order:
    /// category name (lexicographic), then insertion order.
    #[must_use]
    pub fn recall(&self, query: &str, category: Option<&str>) -> Vec<RecalledMemory> {
        let candidates: Box<dyn Iterator<Item = (&String, &MemoryItem)>> = match category {
            Some(name) => match self.long_term.get_key_value(name) {
                Some((key, items)) => Box::new(items.iter().map(move |m| (key, m))),
                None => Box::new(std::iter::empty()),
            },
            None => Box::new(
                self.long_term
                    .iter()
                    .flat_map(|(key, items)| items.iter().map(move |m| (key, m))),
            ),
        };
        retrieval::recall(query, candidates, self.config.recall_threshold)
    }

    /// Items currently in the short-term buffer, oldest first.
    #[must_use]
    pub fn short_term(&self) -> &[MemoryItem] {
        &self.short_term
    }

    /// The full long-term store.
    #[must_use]
    pub fn long_term(&self) -> &BTreeMap<String, Vec<MemoryItem>> {
        &self.long_term
    }

    /// Long-term items of one category, in insertion order.
    #[must_use]
    pub fn category(&self, name: &str) -> &[MemoryItem] {
        self.long_term.get(name).map_or(&[], Vec::as_slice)
    }

    /// Total number of long-term items across all categories.
    #[must_use]
    pub fn long_term_len(&self) -> usize {
        self.long_term.values().map(Vec::len).sum()
    }

    /// The association graph.
    #[must_use]
    pub fn associations(&self) -> &AssociationGraph {
        &self.associations
    }

    /// Tokens that co-occurred with `token` in some consolidated memory.
    pub fn associated_with<'a>(&'a self, token: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.associations.neighbors(token)
    }

    /// The store's configuration.
    #[must_use]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }
}
