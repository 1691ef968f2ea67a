//! Token co-occurrence graph.
//!
//! An undirected graph over whitespace tokens. Every pair of distinct tokens
//! that appear in the same consolidated memory is joined by an edge. The
//! graph only grows; nothing is ever pruned.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Mapping from token to the set of tokens it has co-occurred with.
///
/// Serializes as `{ token: [neighbor, ...] }` with neighbors sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl AssociationGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mutual edge between every unordered pair of distinct tokens.
    ///
    /// A token set of size one adds nothing: a token never associates with
    /// itself.
    pub fn connect_all(&mut self, tokens: &HashSet<&str>) {
        if tokens.len() < 2 {
            return;
        }
        for token in tokens {
            let neighbors = self.edges.entry((*token).to_string()).or_default();
            for other in tokens {
                if other != token {
                    neighbors.insert((*other).to_string());
                }
            }
        }
    }

    /// Neighbors of `token`, in sorted order. Empty if the token is unknown.
    pub fn neighbors<'a>(&'a self, token: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .get(token)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether an edge joins `a` and `b`.
    #[must_use]
    pub fn are_associated(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|set| set.contains(b))
    }

    /// Number of tokens with at least one neighbor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Iterate `(token, neighbors)` in token order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.edges.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text;

    #[test]
    fn edges_are_mutual() {
        let mut g = AssociationGraph::new();
        g.connect_all(&text::tokens("rain wet ground"));
        assert!(g.are_associated("rain", "wet"));
        assert!(g.are_associated("wet", "rain"));
        assert!(g.are_associated("ground", "rain"));
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn no_self_edges() {
        let mut g = AssociationGraph::new();
        g.connect_all(&text::tokens("echo echo"));
        assert!(g.is_empty());
        g.connect_all(&text::tokens("echo chamber"));
        assert!(!g.are_associated("echo", "echo"));
    }

    #[test]
    fn graph_only_grows() {
        let mut g = AssociationGraph::new();
        g.connect_all(&text::tokens("a b"));
        let before = g.edge_count();
        g.connect_all(&text::tokens("b c"));
        assert!(g.edge_count() > before);
        assert!(g.are_associated("a", "b"));
        assert!(!g.are_associated("a", "c"));
    }

    #[test]
    fn serializes_as_sorted_token_lists() {
        let mut g = AssociationGraph::new();
        g.connect_all(&text::tokens("b a"));
        let json = serde_json::to_string(&g).expect("serialize");
        assert_eq!(json, r#"{"a":["b"],"b":["a"]}"#);
        let back: AssociationGraph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, g);
    }
}
