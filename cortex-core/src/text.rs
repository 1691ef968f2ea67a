//! Lexical primitives shared by recall, reasoning, decisions, and reflection.
//!
//! Every "relevance", "similarity", and "importance" measure in the engine
//! is a token-overlap heuristic built from these functions. Tokenization is
//! plain whitespace splitting; no stemming, no stop words.

use std::collections::HashSet;

/// Set of whitespace-separated tokens, verbatim.
#[must_use]
pub fn tokens(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

/// Set of lowercase tokens with surrounding ASCII punctuation trimmed.
///
/// Used for lexicon and keyword-list scans so that `"Safe,"` matches `safe`.
/// Tokens that are pure punctuation are dropped.
#[must_use]
pub fn normalized_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard index of the whitespace token sets of `a` and `b`.
///
/// Returns 0.0 when both texts are empty (empty union).
#[must_use]
pub fn jaccard(a: &str, b: &str) -> f32 {
    let left = tokens(a);
    let right = tokens(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f32 / union as f32
}

/// Fraction of `query` tokens that also occur in `content`:
/// |Q ∩ M| / |Q|. Returns 0.0 for an empty query.
#[must_use]
pub fn overlap_ratio(query: &HashSet<&str>, content: &str) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    let content_tokens = tokens(content);
    let shared = query.intersection(&content_tokens).count();
    shared as f32 / query.len() as f32
}

/// Number of distinct keywords present in a normalized token set.
#[must_use]
pub fn keyword_hits<S: AsRef<str>>(tokens: &HashSet<String>, keywords: &[S]) -> usize {
    keywords
        .iter()
        .filter(|k| tokens.contains(&k.as_ref().to_lowercase()))
        .count()
}

/// Whether any keyword occurs in the normalized token set.
#[must_use]
pub fn contains_any<S: AsRef<str>>(tokens: &HashSet<String>, keywords: &[S]) -> bool {
    keyword_hits(tokens, keywords) > 0
}

/// Number of distinct keywords occurring anywhere in `text` as a
/// case-insensitive substring.
#[must_use]
pub fn substring_hits<S: AsRef<str>>(text: &str, keywords: &[S]) -> usize {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| {
            let k = k.as_ref().to_lowercase();
            !k.is_empty() && lowered.contains(&k)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_of_identical_texts_is_one() {
        assert!((jaccard("the ground gets wet", "the ground gets wet") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn jaccard_of_empty_texts_is_zero() {
        assert_eq!(jaccard("", ""), 0.0);
        assert_eq!(jaccard("   ", ""), 0.0);
    }

    #[test]
    fn jaccard_counts_sets_not_multisets() {
        // {a, b} vs {a, c}: 1 shared of 3 distinct.
        let sim = jaccard("a a b", "a c");
        assert!((sim - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_ratio_guards_empty_query() {
        let q = tokens("");
        assert_eq!(overlap_ratio(&q, "anything at all"), 0.0);
    }

    #[test]
    fn overlap_ratio_is_relative_to_query() {
        let q = tokens("fire safety drill");
        let r = overlap_ratio(&q, "notes about fire safety");
        assert!((r - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_tokens_trim_punctuation_and_case() {
        let t = normalized_tokens("Safe, HAPPY! -- ok?");
        assert!(t.contains("safe"));
        assert!(t.contains("happy"));
        assert!(t.contains("ok"));
        assert!(!t.contains("--"));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn keyword_hits_counts_distinct_keywords() {
        let t = normalized_tokens("risk risk danger safe");
        assert_eq!(keyword_hits(&t, &["risk", "danger", "loss"]), 2);
        assert!(contains_any(&t, &["safe"]));
        assert!(!contains_any(&t, &["secure"]));
    }

    #[test]
    fn substring_hits_is_case_insensitive() {
        assert_eq!(substring_hits("Remember: CRITICAL info", &["remember", "critical", "core"]), 2);
        assert_eq!(substring_hits("anything", &[""]), 0);
    }
}
