//! Multi-factor decision scoring.
//!
//! Each candidate option is scored on four lexical factors, combined with
//! fixed weights:
//!
//!   Score = 0.3·Safety + 0.3·Efficacy + 0.2·Ethics + 0.2·Novelty
//!
//! The weighted score is then blended with historical experience (when the
//! situation recalls any memories) and with alignment to the current
//! inference conclusion (when one exists):
//!
//!   Score ← 0.7·Score + 0.3·History
//!   Score ← 0.8·Score + 0.2·Alignment
//!
//! The highest final score wins. Ties go to the option seen first.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::DecisionConfig;
use crate::memory::MemoryStore;
use crate::reasoning::{Inference, ReasoningEngine};
use crate::retrieval::RecalledMemory;
use crate::text;

/// Neutral score used when a factor has nothing to go on.
const NEUTRAL: f32 = 0.5;

/// Jaccard similarity a memory must exceed to count as experience with an
/// option.
pub const EXPERIENCE_SIMILARITY: f32 = 0.3;

/// Per-option factor scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScores {
    /// Risk vs. safety vocabulary in the option and situation.
    pub safety: f32,
    /// Share of the option's recalled memories that mention success.
    pub efficacy: f32,
    /// Unethical vs. ethical vocabulary in the option.
    pub ethics: f32,
    /// Dissimilarity of the option to its recalled memories.
    pub novelty: f32,
}

/// One scored option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionEvaluation {
    /// The option text.
    pub option: String,
    /// Final blended score.
    pub score: f32,
    /// Factor breakdown.
    pub factors: FactorScores,
}

/// Result of [`DecisionEngine::make_decision`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// The situation that was decided on.
    pub situation: String,
    /// Winning option. Absent only when no options were given.
    pub chosen_option: Option<String>,
    /// Score of the winning option, 0.0 when there is none.
    pub confidence: f32,
    /// Every option with its score, in input order.
    pub evaluations: Vec<OptionEvaluation>,
    /// Inference drawn from the situation.
    pub inference: Inference,
}

/// Scores options against the memory store and the reasoning engine.
///
/// Holds no state of its own; create one per decision.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine<'a> {
    config: &'a DecisionConfig,
    memory: &'a MemoryStore,
    reasoning: &'a ReasoningEngine,
}

impl<'a> DecisionEngine<'a> {
    /// Create an engine over borrowed components.
    #[must_use]
    pub fn new(
        config: &'a DecisionConfig,
        memory: &'a MemoryStore,
        reasoning: &'a ReasoningEngine,
    ) -> Self {
        Self {
            config,
            memory,
            reasoning,
        }
    }

    /// Choose among `options` for `situation`.
    ///
    /// An empty option list is valid and yields no choice with confidence 0.
    #[must_use]
    pub fn make_decision<S: AsRef<str>>(&self, situation: &str, options: &[S]) -> Decision {
        let memories = self.memory.recall(situation, None);
        let inference = self.reasoning.infer(self.memory, situation);

        let evaluations: Vec<OptionEvaluation> = options
            .iter()
            .map(|option| self.evaluate_option(option.as_ref(), situation, &memories, &inference))
            .collect();

        let mut best: Option<&OptionEvaluation> = None;
        for evaluation in &evaluations {
            if best.is_none_or(|b| evaluation.score > b.score) {
                best = Some(evaluation);
            }
        }

        let (chosen_option, confidence) = match best {
            Some(b) => (Some(b.option.clone()), b.score),
            None => (None, 0.0),
        };

        debug!(
            options = evaluations.len(),
            chosen = ?chosen_option,
            confidence,
            "Decision made"
        );

        Decision {
            situation: situation.to_string(),
            chosen_option,
            confidence,
            evaluations,
            inference,
        }
    }

    fn evaluate_option(
        &self,
        option: &str,
        situation: &str,
        memories: &[RecalledMemory],
        inference: &Inference,
    ) -> OptionEvaluation {
        let factors = self.analyze_factors(option, situation);
        let w = &self.config.weights;
        let mut score = factors.safety * w.safety
            + factors.efficacy * w.efficacy
            + factors.ethics * w.ethics
            + factors.novelty * w.novelty;

        if !memories.is_empty() {
            let history = self.historical_experience(option, memories);
            score = (1.0 - self.config.history_blend) * score + self.config.history_blend * history;
        }

        if let Some(conclusion) = &inference.conclusion {
            let alignment = text::jaccard(option, conclusion);
            score =
                (1.0 - self.config.reasoning_blend) * score + self.config.reasoning_blend * alignment;
        }

        let score = score.clamp(0.0, 1.0);
        trace!(option, score, ?factors, "Scored option");
        OptionEvaluation {
            option: option.to_string(),
            score,
            factors,
        }
    }

    /// Compute the four factor scores for one option.
    #[must_use]
    pub fn analyze_factors(&self, option: &str, situation: &str) -> FactorScores {
        let recalled = self.memory.recall(option, None);
        FactorScores {
            safety: self.safety(option, situation),
            efficacy: self.efficacy(&recalled),
            ethics: self.ethics(option),
            novelty: novelty(option, &recalled),
        }
    }

    fn safety(&self, option: &str, situation: &str) -> f32 {
        let words = text::normalized_tokens(&format!("{option} {situation}"));
        let risk = text::keyword_hits(&words, &self.config.risk_keywords) as f32;
        let safe = text::keyword_hits(&words, &self.config.safety_keywords) as f32;
        (1.0 - risk * self.config.safety_step + safe * self.config.safety_step).clamp(0.0, 1.0)
    }

    fn efficacy(&self, recalled: &[RecalledMemory]) -> f32 {
        if recalled.is_empty() {
            return NEUTRAL;
        }
        let successes = recalled
            .iter()
            .filter(|m| {
                text::contains_any(
                    &text::normalized_tokens(&m.content),
                    &self.config.success_keywords,
                )
            })
            .count();
        (successes as f32 / recalled.len() as f32 + NEUTRAL).min(1.0)
    }

    fn ethics(&self, option: &str) -> f32 {
        let words = text::normalized_tokens(option);
        let bad = text::keyword_hits(&words, &self.config.unethical_keywords) as f32;
        let good = text::keyword_hits(&words, &self.config.ethical_keywords) as f32;
        (1.0 - bad * self.config.ethics_step + good * self.config.ethics_step).clamp(0.0, 1.0)
    }

    /// Net success of memories that resemble `option`, offset to 0.5.
    fn historical_experience(&self, option: &str, memories: &[RecalledMemory]) -> f32 {
        let relevant: Vec<_> = memories
            .iter()
            .filter(|m| text::jaccard(option, &m.content) > EXPERIENCE_SIMILARITY)
            .map(|m| text::normalized_tokens(&m.content))
            .collect();
        if relevant.is_empty() {
            return NEUTRAL;
        }

        let successes = relevant
            .iter()
            .filter(|words| text::contains_any(words, &self.config.history_success_keywords))
            .count() as f32;
        let failures = relevant
            .iter()
            .filter(|words| text::contains_any(words, &self.config.failure_keywords))
            .count() as f32;

        ((successes - failures) / relevant.len() as f32 + NEUTRAL).clamp(0.0, 1.0)
    }
}

fn novelty(option: &str, recalled: &[RecalledMemory]) -> f32 {
    if recalled.is_empty() {
        return 1.0;
    }
    let total: f32 = recalled
        .iter()
        .map(|m| text::jaccard(option, &m.content))
        .sum();
    (1.0 - total / recalled.len() as f32).clamp(0.0, 1.0)
}
