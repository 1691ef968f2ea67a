//! Self-Reflection: post-hoc scoring of interaction quality.
//!
//! After each turn the agent looks back at its emotional trend and the
//! signals the host application measured (latency, user feedback,
//! emotional alignment) and records:
//!
//! - four quality subscores in [0, 1]
//! - learning points for low feedback or poor alignment
//! - improvement suggestions for every weak subscore and learning point
//!
//! The log and its indexes are unbounded unless `reflection.log_capacity` is
//! configured.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::ReflectionConfig;
use crate::emotion::{EmotionalState, EmotionalTrend};
use crate::text;
use crate::types::{Dimension, PadVector, Timestamp};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Signals measured by the host application for one interaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionData<'a> {
    /// Seconds taken to respond.
    pub latency_secs: Option<f32>,
    /// User satisfaction in [0, 1].
    pub user_feedback: Option<f32>,
    /// How well the agent's affect matched the user's, in [0, 1].
    pub emotional_alignment: Option<f32>,
    /// Conversation so far, oldest first.
    pub chat_history: &'a [String],
}

// ---------------------------------------------------------------------------
// Trend analysis
// ---------------------------------------------------------------------------

/// Overall direction of a value series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Mean change is positive.
    Up,
    /// Mean change is negative.
    Down,
    /// No change, or too few samples to tell.
    Steady,
}

/// Summary of one dimension's recent movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionTrend {
    /// Sign of the mean consecutive difference.
    pub direction: TrendDirection,
    /// Population standard deviation of consecutive differences.
    pub volatility: f32,
    /// Mean value.
    pub average: f32,
}

impl DimensionTrend {
    /// Summarize a series. `None` for an empty series.
    #[must_use]
    pub fn from_series(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let average = mean(values);
        let changes: Vec<f32> = values.windows(2).map(|w| w[1] - w[0]).collect();

        if changes.is_empty() {
            return Some(Self {
                direction: TrendDirection::Steady,
                volatility: 0.0,
                average,
            });
        }

        let mean_change = mean(&changes);
        let variance = changes
            .iter()
            .map(|c| (c - mean_change).powi(2))
            .sum::<f32>()
            / changes.len() as f32;

        let direction = if mean_change > 0.0 {
            TrendDirection::Up
        } else if mean_change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Steady
        };

        Some(Self {
            direction,
            volatility: variance.sqrt(),
            average,
        })
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Analyze every non-empty dimension of an emotional trend.
#[must_use]
pub fn analyze_trend(trend: &EmotionalTrend) -> BTreeMap<Dimension, DimensionTrend> {
    Dimension::ALL
        .iter()
        .filter_map(|d| DimensionTrend::from_series(trend.series(*d)).map(|t| (*d, t)))
        .collect()
}

// ---------------------------------------------------------------------------
// Quality, learnings, suggestions
// ---------------------------------------------------------------------------

/// What an improvement suggestion is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    /// Response speed.
    Responsiveness,
    /// Emotional resonance.
    Empathy,
    /// Practical usefulness.
    Helpfulness,
    /// Staying on topic.
    Coherence,
    /// A low user-feedback learning point.
    Feedback,
    /// A poor emotional-alignment learning point.
    Emotion,
}

impl Aspect {
    /// Canned suggestion for this aspect. `context` fills the learning-point
    /// suggestions and is ignored by the quality ones.
    #[must_use]
    pub fn suggestion(self, context: &str) -> String {
        match self {
            Self::Responsiveness => "Respond faster and keep the conversation flowing".into(),
            Self::Empathy => "Strengthen emotional understanding and resonance".into(),
            Self::Helpfulness => "Offer more specific and practical help".into(),
            Self::Coherence => "Keep the conversation on topic".into(),
            Self::Feedback => format!("Improve based on user feedback: {context}"),
            Self::Emotion => format!("Improve emotional alignment: {context}"),
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Responsiveness => "responsiveness",
            Self::Empathy => "empathy",
            Self::Helpfulness => "helpfulness",
            Self::Coherence => "coherence",
            Self::Feedback => "feedback",
            Self::Emotion => "emotion",
        })
    }
}

/// Interaction quality subscores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QualityScores {
    /// `1 − min(1, latency / ceiling)`, 0 without a latency.
    pub responsiveness: f32,
    /// Supplied alignment, 0 without one.
    pub empathy: f32,
    /// Supplied feedback, 0 without one.
    pub helpfulness: f32,
    /// Mean Jaccard similarity of consecutive turns.
    pub coherence: f32,
}

impl QualityScores {
    /// Subscores paired with their aspect, in fixed order.
    #[must_use]
    pub fn entries(&self) -> [(Aspect, f32); 4] {
        [
            (Aspect::Responsiveness, self.responsiveness),
            (Aspect::Empathy, self.empathy),
            (Aspect::Helpfulness, self.helpfulness),
            (Aspect::Coherence, self.coherence),
        ]
    }
}

/// Kind of learning point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningKind {
    /// User feedback fell below the floor.
    Feedback,
    /// Emotional alignment fell below the floor.
    Emotion,
}

impl LearningKind {
    /// The aspect its suggestion is filed under.
    #[must_use]
    pub fn aspect(self) -> Aspect {
        match self {
            Self::Feedback => Aspect::Feedback,
            Self::Emotion => Aspect::Emotion,
        }
    }
}

/// Something the agent should learn from this interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningPoint {
    /// What triggered it.
    pub kind: LearningKind,
    /// Short description.
    pub point: String,
    /// The message or state that triggered it.
    pub context: String,
}

/// One entry in the reflection log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectionRecord {
    /// When the reflection happened.
    pub timestamp: Timestamp,
    /// Affect at reflection time.
    pub emotional_state: PadVector,
    /// Per-dimension trend summary.
    pub emotional_trend: BTreeMap<Dimension, DimensionTrend>,
    /// Quality subscores.
    pub quality: QualityScores,
    /// Learning points extracted.
    pub learnings: Vec<LearningPoint>,
    /// Improvement suggestions, quality-driven first.
    pub improvements: Vec<String>,
}

// ---------------------------------------------------------------------------
// SelfReflection
// ---------------------------------------------------------------------------

/// Reflection log plus per-kind indexes of learnings and suggestions.
///
/// A configured `log_capacity` windows the log and each index alike.
#[derive(Debug, Clone, Default)]
pub struct SelfReflection {
    config: ReflectionConfig,
    log: VecDeque<ReflectionRecord>,
    learning_points: BTreeMap<LearningKind, Vec<LearningPoint>>,
    improvement_suggestions: BTreeMap<Aspect, Vec<String>>,
}

impl SelfReflection {
    /// Create an empty reflector.
    #[must_use]
    pub fn new(config: ReflectionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Reflect on one interaction and append the record to the log.
    pub fn reflect(
        &mut self,
        emotion: &EmotionalState,
        data: &InteractionData<'_>,
    ) -> ReflectionRecord {
        let emotional_trend = analyze_trend(&emotion.default_trend());
        let quality = self.interaction_quality(data);
        let learnings = self.learning_points_for(emotion, data);

        let mut improvements = Vec::new();
        for (aspect, score) in quality.entries() {
            if score < self.config.quality_floor {
                let suggestion = aspect.suggestion("");
                self.improvement_suggestions
                    .entry(aspect)
                    .or_default()
                    .push(suggestion.clone());
                improvements.push(suggestion);
            }
        }
        for learning in &learnings {
            let aspect = learning.kind.aspect();
            let suggestion = aspect.suggestion(&learning.context);
            self.improvement_suggestions
                .entry(aspect)
                .or_default()
                .push(suggestion.clone());
            improvements.push(suggestion);
        }
        for learning in &learnings {
            self.learning_points
                .entry(learning.kind)
                .or_default()
                .push(learning.clone());
        }

        let record = ReflectionRecord {
            timestamp: chrono::Utc::now(),
            emotional_state: emotion.get_emotional_state(),
            emotional_trend,
            quality,
            learnings,
            improvements,
        };

        debug!(
            learnings = record.learnings.len(),
            improvements = record.improvements.len(),
            "Reflection recorded"
        );

        self.log.push_back(record.clone());
        if let Some(capacity) = self.config.log_capacity {
            while self.log.len() > capacity {
                self.log.pop_front();
            }
            self.learning_points
                .values_mut()
                .for_each(|v| keep_newest(v, capacity));
            self.improvement_suggestions
                .values_mut()
                .for_each(|v| keep_newest(v, capacity));
        }
        record
    }

    /// Score the four quality aspects.
    #[must_use]
    pub fn interaction_quality(&self, data: &InteractionData<'_>) -> QualityScores {
        let responsiveness = data.latency_secs.map_or(0.0, |latency| {
            let ceiling = self.config.latency_ceiling_secs.max(f32::EPSILON);
            (1.0 - (latency / ceiling).min(1.0)).clamp(0.0, 1.0)
        });
        QualityScores {
            responsiveness,
            empathy: data.emotional_alignment.map_or(0.0, |a| a.clamp(0.0, 1.0)),
            helpfulness: data.user_feedback.map_or(0.0, |f| f.clamp(0.0, 1.0)),
            coherence: coherence(data.chat_history),
        }
    }

    fn learning_points_for(
        &self,
        emotion: &EmotionalState,
        data: &InteractionData<'_>,
    ) -> Vec<LearningPoint> {
        let mut learnings = Vec::new();
        if data
            .user_feedback
            .is_some_and(|f| f < self.config.feedback_floor)
        {
            learnings.push(LearningPoint {
                kind: LearningKind::Feedback,
                point: "User satisfaction needs to improve".into(),
                context: data.chat_history.last().cloned().unwrap_or_default(),
            });
        }
        if data
            .emotional_alignment
            .is_some_and(|a| a < self.config.alignment_floor)
        {
            learnings.push(LearningPoint {
                kind: LearningKind::Emotion,
                point: "Empathic alignment needs to improve".into(),
                context: emotion.get_emotional_state().to_string(),
            });
        }
        learnings
    }

    /// The reflection log, oldest first.
    #[must_use]
    pub fn log(&self) -> &VecDeque<ReflectionRecord> {
        &self.log
    }

    /// Every learning point recorded for `kind`.
    #[must_use]
    pub fn learning_points(&self, kind: LearningKind) -> &[LearningPoint] {
        self.learning_points.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Every suggestion recorded for `aspect`.
    #[must_use]
    pub fn suggestions(&self, aspect: Aspect) -> &[String] {
        self.improvement_suggestions
            .get(&aspect)
            .map_or(&[], Vec::as_slice)
    }
}

/// Mean Jaccard similarity of consecutive messages; 1.0 with fewer than two.
#[must_use]
pub fn coherence(chat_history: &[String]) -> f32 {
    if chat_history.len() < 2 {
        return 1.0;
    }
    let scores: Vec<f32> = chat_history
        .windows(2)
        .map(|w| text::jaccard(&w[0], &w[1]))
        .collect();
    mean(&scores)
}

/// Drop the oldest entries so at most `capacity` remain.
fn keep_newest<T>(entries: &mut Vec<T>, capacity: usize) {
    let excess = entries.len().saturating_sub(capacity);
    entries.drain(..excess);
}
