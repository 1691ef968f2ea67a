//! Memory Consolidation
//!
//! Moves important items from the short-term buffer into the long-term store.
//! Runs when the buffer overflows (or when asked to explicitly):
//!
//!   - items with importance strictly above the threshold are appended to
//!     their category (the default category when they have none)
//!   - every promoted item's tokens are wired into the association graph
//!   - everything else is discarded, and the buffer is cleared

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::memory::{AssociationGraph, MemoryItem};
use crate::text;
use crate::types::MemoryId;

/// Summary of one consolidation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    /// Number of items appended to long-term memory.
    pub promoted: usize,
    /// Number of items dropped.
    pub discarded: usize,
    /// Ids of the promoted items, in buffer order.
    pub promoted_ids: Vec<MemoryId>,
}

/// Drain `short_term`, promoting items whose importance exceeds `threshold`.
pub fn consolidate(
    short_term: &mut Vec<MemoryItem>,
    long_term: &mut BTreeMap<String, Vec<MemoryItem>>,
    associations: &mut AssociationGraph,
    threshold: f32,
    default_category: &str,
) -> ConsolidationReport {
    let mut report = ConsolidationReport::default();

    for item in short_term.drain(..) {
        if item.importance <= threshold {
            report.discarded += 1;
            continue;
        }

        associations.connect_all(&text::tokens(&item.content));

        let category = item
            .category
            .clone()
            .unwrap_or_else(|| default_category.to_string());
        report.promoted += 1;
        report.promoted_ids.push(item.id);
        long_term.entry(category).or_default().push(item);
    }

    debug!(
        promoted = report.promoted,
        discarded = report.discarded,
        "Consolidated short-term memory"
    );

    report
}
