//! Memory Retrieval: lexical recall over the long-term store.
//!
//! Relevance of a memory M to a query Q is the fraction of query tokens
//! present in the memory: |tokens(Q) ∩ tokens(M)| / |tokens(Q)|. Only
//! memories strictly above the recall threshold are returned, best first.

pub mod scoring;

use serde::Serialize;

use crate::memory::MemoryItem;
use crate::types::{MemoryId, Timestamp};

/// A long-term memory projected for a caller, with its relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecalledMemory {
    /// Id of the underlying memory.
    pub id: MemoryId,
    /// The remembered text.
    pub content: String,
    /// Token overlap with the query, in (threshold, 1].
    pub relevance: f32,
    /// When the memory was created.
    pub timestamp: Timestamp,
    /// Long-term category the memory was found in.
    pub category: String,
}

/// Score `candidates` against `query` and keep those above `threshold`.
///
/// `candidates` yields `(category, item)` pairs in store order. The result is
/// sorted by relevance descending; the sort is stable, so equal relevance
/// keeps store order.
pub fn recall<'a, I>(query: &str, candidates: I, threshold: f32) -> Vec<RecalledMemory>
where
    I: IntoIterator<Item = (&'a String, &'a MemoryItem)>,
{
    let query_tokens = crate::text::tokens(query);
    if query_tokens.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<RecalledMemory> = candidates
        .into_iter()
        .filter_map(|(category, item)| {
            let relevance = scoring::relevance(&query_tokens, item);
            (relevance > threshold).then(|| RecalledMemory {
                id: item.id,
                content: item.content.clone(),
                relevance,
                timestamp: item.timestamp,
                category: category.clone(),
            })
        })
        .collect();

    scoring::rank(&mut results);
    results
}
