//! Scoring and ranking for recall.
//!
//!   Relevance(m) = |Q ∩ tokens(m)| / |Q|

use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::memory::MemoryItem;
use crate::retrieval::RecalledMemory;
use crate::text;

/// Relevance of `memory` to a tokenized query.
#[must_use]
pub fn relevance(query_tokens: &HashSet<&str>, memory: &MemoryItem) -> f32 {
    text::overlap_ratio(query_tokens, &memory.content)
}

/// Sort descending by relevance. Stable: equal scores keep their order.
pub fn rank(results: &mut [RecalledMemory]) {
    results.sort_by_key(|r| Reverse(OrderedFloat(r.relevance)));
}
