//! Symbolic reasoning over the memory store.
//!
//! Three cue patterns classify a statement:
//!
//! | type      | cue                              | components         | confidence |
//! |-----------|----------------------------------|--------------------|------------|
//! | causal    | `if … then`                      | condition, result  | 0.8        |
//! | analogy   | `resembles` / `like` / `similar to` | target, source  | 0.7        |
//! | induction | `all` / `always`                 | none               | 0.0        |
//!
//! Patterns are scanned in that order and the **last** match wins.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::memory::MemoryStore;
use crate::text;

static CAUSAL_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bif\b.*\bthen\b").expect("static regex"));
static CAUSAL_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:if|then)\b").expect("static regex"));
static ANALOGY_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:resembles|like|similar to)\b").expect("static regex")
});
static INDUCTION_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:all|always)\b").expect("static regex"));

/// Confidence of a successful causal extraction.
pub const CAUSAL_CONFIDENCE: f32 = 0.8;
/// Confidence of a successful analogy extraction.
pub const ANALOGY_CONFIDENCE: f32 = 0.7;
/// Confidence attached to any produced inference conclusion.
pub const INFERENCE_CONFIDENCE: f32 = 0.7;
/// Jaccard similarity a memory needs with the result clause to count as precedent.
pub const PRECEDENT_SIMILARITY: f32 = 0.3;

/// Kind of logical relation recognized in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicType {
    /// "if X then Y".
    Causal,
    /// "X resembles / is like / is similar to Y".
    Analogy,
    /// "all" / "always" generalizations.
    Induction,
}

impl LogicType {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Causal => "causal",
            Self::Analogy => "analogy",
            Self::Induction => "induction",
        }
    }
}

impl fmt::Display for LogicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parts extracted from a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Components {
    /// Nothing extracted.
    #[default]
    None,
    /// Causal condition and result clauses.
    Causal {
        /// Clause between `if` and `then`.
        condition: String,
        /// Clause after `then`.
        result: String,
    },
    /// Analogy target and source.
    Analogy {
        /// Text before the cue.
        target: String,
        /// Text after the cue.
        source: String,
    },
}

/// Result of [`ReasoningEngine::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// The analyzed statement.
    pub statement: String,
    /// Recognized relation, if any cue matched.
    pub logic_type: Option<LogicType>,
    /// Extracted components.
    pub components: Components,
    /// 0.0 when nothing matched or extraction failed.
    pub confidence: f32,
}

impl Analysis {
    fn empty(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            logic_type: None,
            components: Components::None,
            confidence: 0.0,
        }
    }

    /// The causal condition, when one was extracted.
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        match &self.components {
            Components::Causal { condition, .. } => Some(condition),
            _ => None,
        }
    }

    /// The causal result, when one was extracted.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        match &self.components {
            Components::Causal { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// One human-readable step of an inference trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReasoningStep {
    /// A logical relation was recognized.
    LogicIdentified {
        /// The relation.
        logic_type: LogicType,
    },
    /// Memories relevant to the condition were found.
    MemoryRetrieval {
        /// How many.
        count: usize,
    },
    /// A conclusion was drawn.
    Conclusion {
        /// Whether precedent supported it.
        supported: bool,
    },
}

impl fmt::Display for ReasoningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogicIdentified { logic_type } => {
                write!(f, "identified a {logic_type} relation")
            }
            Self::MemoryRetrieval { count } => write!(f, "found {count} related memories"),
            Self::Conclusion { supported: true } => f.write_str("concluded from precedent"),
            Self::Conclusion { supported: false } => {
                f.write_str("concluded without supporting evidence")
            }
        }
    }
}

/// Result of [`ReasoningEngine::infer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inference {
    /// The context that was reasoned about.
    pub context: String,
    /// Conclusion text, if one could be drawn.
    pub conclusion: Option<String>,
    /// Trace steps in the order they happened.
    pub reasoning_path: Vec<ReasoningStep>,
    /// [`INFERENCE_CONFIDENCE`] with a conclusion, 0.0 otherwise.
    pub confidence: f32,
}

/// Pattern-based logic classification and causal inference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasoningEngine;

impl ReasoningEngine {
    /// Create a reasoning engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify `statement` and extract its components.
    #[must_use]
    pub fn analyze(&self, statement: &str) -> Analysis {
        let mut analysis = Analysis::empty(statement);

        if CAUSAL_CUE.is_match(statement) {
            analysis = Analysis::empty(statement);
            analysis.logic_type = Some(LogicType::Causal);
            let parts: Vec<&str> = CAUSAL_SPLIT.split(statement).collect();
            if parts.len() >= 3 {
                analysis.components = Components::Causal {
                    condition: parts[1].trim().to_string(),
                    result: parts[2].trim().to_string(),
                };
                analysis.confidence = CAUSAL_CONFIDENCE;
            }
        }

        if ANALOGY_CUE.is_match(statement) {
            analysis = Analysis::empty(statement);
            analysis.logic_type = Some(LogicType::Analogy);
            let parts: Vec<&str> = ANALOGY_CUE.split(statement).collect();
            if parts.len() >= 2 {
                analysis.components = Components::Analogy {
                    target: parts[0].trim().to_string(),
                    source: parts[1].trim().to_string(),
                };
                analysis.confidence = ANALOGY_CONFIDENCE;
            }
        }

        if INDUCTION_CUE.is_match(statement) {
            analysis = Analysis::empty(statement);
            analysis.logic_type = Some(LogicType::Induction);
        }

        trace!(logic_type = ?analysis.logic_type, confidence = analysis.confidence, "Analyzed statement");
        analysis
    }

    /// Reason about `context` using precedent from `memory`.
    ///
    /// Only causal statements yield conclusions, and only when recalling the
    /// condition finds at least one memory. The conclusion asserts support
    /// when some recalled memory resembles the result clause.
    #[must_use]
    pub fn infer(&self, memory: &MemoryStore, context: &str) -> Inference {
        let mut inference = Inference {
            context: context.to_string(),
            conclusion: None,
            reasoning_path: Vec::new(),
            confidence: 0.0,
        };

        let analysis = self.analyze(context);
        let Some(logic_type) = analysis.logic_type else {
            return inference;
        };
        inference
            .reasoning_path
            .push(ReasoningStep::LogicIdentified { logic_type });

        let (Some(condition), Some(result)) = (analysis.condition(), analysis.result()) else {
            return inference;
        };
        if condition.is_empty() {
            return inference;
        }

        let related = memory.recall(condition, None);
        if related.is_empty() {
            return inference;
        }
        inference.reasoning_path.push(ReasoningStep::MemoryRetrieval {
            count: related.len(),
        });

        let supported = related
            .iter()
            .any(|m| text::jaccard(&m.content, result) > PRECEDENT_SIMILARITY);
        let conclusion = if supported {
            format!("Based on precedent, {condition} likely leads to {result}")
        } else {
            format!(
                "{condition} might lead to {result}, but there is not enough evidence to support it"
            )
        };

        debug!(supported, related = related.len(), "Drew causal conclusion");
        inference
            .reasoning_path
            .push(ReasoningStep::Conclusion { supported });
        inference.conclusion = Some(conclusion);
        inference.confidence = INFERENCE_CONFIDENCE;
        inference
    }

    /// Whether `text` is phrased as a question.
    #[must_use]
    pub fn is_question(text: &str) -> bool {
        text.contains('?')
    }
}
