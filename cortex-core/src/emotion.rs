//! Emotional State: a continuous PAD affect vector.
//!
//! Every turn nudges the vector toward the emotion expressed in the message
//! and its context, using exponential smoothing:
//!
//! 1. Scan the text against the lexicon, sum the matched vectors and divide
//!    by the largest absolute component.
//! 2. Context impact = `history_weight` × mean lexicon score of the last
//!    `history_window` turns, plus a fixed delta for task success
//!    (+0.3 pleasure, +0.2 dominance) or failure (−0.2, −0.1).
//! 3. `new = 0.7·text + 0.3·context`
//! 4. `current = 0.8·current + 0.2·new`, clamped to [-1, 1].
//! 5. A snapshot is appended to a bounded log (oldest dropped).

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EmotionConfig;
use crate::text;
use crate::types::{Dimension, PadVector, Timestamp};

const SUCCESS_DELTA: PadVector = PadVector::new(0.3, 0.0, 0.2);
const FAILURE_DELTA: PadVector = PadVector::new(-0.2, 0.0, -0.1);

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// Discrete emotion words and the affect each one carries.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionLexicon {
    entries: Vec<(String, PadVector)>,
}

impl Default for EmotionLexicon {
    fn default() -> Self {
        Self::from_entries([
            ("happy", PadVector::new(0.8, 0.5, 0.6)),
            ("sad", PadVector::new(-0.7, -0.3, -0.4)),
            ("angry", PadVector::new(-0.6, 0.8, 0.7)),
            ("afraid", PadVector::new(-0.7, 0.7, -0.8)),
            ("surprised", PadVector::new(0.2, 0.8, 0.0)),
            ("calm", PadVector::new(0.3, -0.4, 0.2)),
        ])
    }
}

impl EmotionLexicon {
    /// Build a lexicon from `(word, vector)` pairs. Words are lowercased.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PadVector)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(word, vector)| (word.into().to_lowercase(), vector))
                .collect(),
        }
    }

    /// Normalized affect expressed by `text`.
    ///
    /// Each lexicon word present in the text contributes once. The sum is
    /// divided by its largest absolute component; no matches gives zero.
    #[must_use]
    pub fn score(&self, text: &str) -> PadVector {
        let words = text::normalized_tokens(text);
        self.entries
            .iter()
            .filter(|(word, _)| words.contains(word))
            .fold(PadVector::NEUTRAL, |acc, (_, vector)| acc.add(vector))
            .normalized()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Context & Log
// ---------------------------------------------------------------------------

/// Situational input to [`EmotionalState::update_state`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionalContext<'a> {
    /// Previous messages, oldest first.
    pub chat_history: &'a [String],
    /// The last task succeeded. Takes precedence over `task_failure`.
    pub task_success: bool,
    /// The last task failed.
    pub task_failure: bool,
}

/// One entry of the emotional memory log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSnapshot {
    /// When the update happened.
    pub timestamp: Timestamp,
    /// State after the update.
    pub dimensions: PadVector,
    /// Text that triggered the update.
    pub trigger: String,
}

/// Per-dimension value series over recent log entries, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmotionalTrend {
    /// Pleasure values.
    pub pleasure: Vec<f32>,
    /// Arousal values.
    pub arousal: Vec<f32>,
    /// Dominance values.
    pub dominance: Vec<f32>,
}

impl EmotionalTrend {
    /// The series for one dimension.
    #[must_use]
    pub fn series(&self, dimension: Dimension) -> &[f32] {
        match dimension {
            Dimension::Pleasure => &self.pleasure,
            Dimension::Arousal => &self.arousal,
            Dimension::Dominance => &self.dominance,
        }
    }

    /// Number of samples per series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pleasure.len()
    }

    /// Whether there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pleasure.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Response Templates
// ---------------------------------------------------------------------------

/// Which canned template set the current state answers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTone {
    /// Pleasure dominates and is positive.
    HighPleasure,
    /// Pleasure dominates and is zero or negative.
    LowPleasure,
    /// Arousal (or dominance) dominates and is positive.
    HighArousal,
    /// Arousal (or dominance) dominates and is zero or negative.
    LowArousal,
}

impl ResponseTone {
    /// Tone for a state vector.
    ///
    /// The dominant dimension is the first one with the greatest absolute
    /// value (pleasure, arousal, dominance). Dominance has no templates of
    /// its own and answers from the arousal sets.
    #[must_use]
    pub fn for_state(state: &PadVector) -> Self {
        let (dimension, value) = state.dominant();
        let high = value > 0.0;
        match (dimension, high) {
            (Dimension::Pleasure, true) => Self::HighPleasure,
            (Dimension::Pleasure, false) => Self::LowPleasure,
            (_, true) => Self::HighArousal,
            (_, false) => Self::LowArousal,
        }
    }

    /// The templates of this tone.
    #[must_use]
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Self::HighPleasure => &[
                "I'm feeling really good right now!",
                "This is wonderful!",
                "I'm glad to be talking with you!",
            ],
            Self::LowPleasure => &[
                "That is a little saddening...",
                "I understand how that feels.",
                "Let's face this together.",
            ],
            Self::HighArousal => &[
                "This is so exciting!",
                "I'm full of energy right now!",
                "Let's get moving!",
            ],
            Self::LowArousal => &[
                "Let's slow down and think it through.",
                "Let's take it one step at a time.",
                "Staying calm matters.",
            ],
        }
    }
}

impl fmt::Display for ResponseTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HighPleasure => "high_pleasure",
            Self::LowPleasure => "low_pleasure",
            Self::HighArousal => "high_arousal",
            Self::LowArousal => "low_arousal",
        })
    }
}

// ---------------------------------------------------------------------------
// EmotionalState
// ---------------------------------------------------------------------------

/// The agent's current affect and its recent history.
#[derive(Debug, Clone)]
pub struct EmotionalState {
    config: EmotionConfig,
    lexicon: EmotionLexicon,
    dimensions: PadVector,
    log: VecDeque<EmotionalSnapshot>,
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::new(EmotionConfig::default())
    }
}

impl EmotionalState {
    /// Neutral state with the default lexicon.
    #[must_use]
    pub fn new(config: EmotionConfig) -> Self {
        Self::with_lexicon(config, EmotionLexicon::default())
    }

    /// Neutral state with a custom lexicon.
    #[must_use]
    pub fn with_lexicon(config: EmotionConfig, lexicon: EmotionLexicon) -> Self {
        Self {
            config,
            lexicon,
            dimensions: PadVector::NEUTRAL,
            log: VecDeque::new(),
        }
    }

    /// Restore a persisted state. Dimensions are clamped and only the newest
    /// `log_capacity` snapshots are kept.
    #[must_use]
    pub fn from_parts(
        config: EmotionConfig,
        dimensions: PadVector,
        log: impl IntoIterator<Item = EmotionalSnapshot>,
    ) -> Self {
        let mut state = Self::new(config);
        state.dimensions = dimensions.clamped();
        state.log = log.into_iter().collect();
        state.enforce_capacity();
        state
    }

    /// Fold `text` and `context` into the current state and log a snapshot.
    /// Returns the updated vector.
    pub fn update_state(&mut self, text: &str, context: &EmotionalContext<'_>) -> PadVector {
        let from_text = self.lexicon.score(text);
        let from_context = self.context_impact(context);
        let raw = from_text
            .scale(self.config.text_weight)
            .add(&from_context.scale(self.config.context_weight));

        self.dimensions = self
            .dimensions
            .scale(self.config.decay)
            .add(&raw.scale(1.0 - self.config.decay))
            .clamped();

        self.log.push_back(EmotionalSnapshot {
            timestamp: chrono::Utc::now(),
            dimensions: self.dimensions,
            trigger: text.to_string(),
        });
        self.enforce_capacity();

        trace!(state = %self.dimensions, "Emotional state updated");
        self.dimensions
    }

    fn context_impact(&self, context: &EmotionalContext<'_>) -> PadVector {
        let window = self.config.history_window.min(context.chat_history.len());
        let recent = &context.chat_history[context.chat_history.len() - window..];

        let mut impact = if recent.is_empty() {
            PadVector::NEUTRAL
        } else {
            recent
                .iter()
                .fold(PadVector::NEUTRAL, |acc, msg| acc.add(&self.lexicon.score(msg)))
                .scale(self.config.history_weight / recent.len() as f32)
        };

        if context.task_success {
            impact = impact.add(&SUCCESS_DELTA);
        } else if context.task_failure {
            impact = impact.add(&FAILURE_DELTA);
        }
        impact
    }

    fn enforce_capacity(&mut self) {
        while self.log.len() > self.config.log_capacity {
            self.log.pop_front();
        }
    }

    /// Tone the next response should take.
    #[must_use]
    pub fn tone(&self) -> ResponseTone {
        ResponseTone::for_state(&self.dimensions)
    }

    /// Pick a canned response for the current state, uniformly at random
    /// from the tone's template set.
    pub fn get_response<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        let templates = self.tone().templates();
        templates[rng.gen_range(0..templates.len())]
    }

    /// Copy of the current vector.
    #[must_use]
    pub fn get_emotional_state(&self) -> PadVector {
        self.dimensions
    }

    /// Value series from the last `window` log entries.
    #[must_use]
    pub fn get_emotional_trend(&self, window: usize) -> EmotionalTrend {
        let skip = self.log.len().saturating_sub(window);
        let mut trend = EmotionalTrend::default();
        for snapshot in self.log.iter().skip(skip) {
            trend.pleasure.push(snapshot.dimensions.pleasure);
            trend.arousal.push(snapshot.dimensions.arousal);
            trend.dominance.push(snapshot.dimensions.dominance);
        }
        trend
    }

    /// Trend over the configured default window.
    #[must_use]
    pub fn default_trend(&self) -> EmotionalTrend {
        self.get_emotional_trend(self.config.trend_window)
    }

    /// The emotional memory log, oldest first.
    #[must_use]
    pub fn memory_log(&self) -> &VecDeque<EmotionalSnapshot> {
        &self.log
    }

    /// The lexicon in use.
    #[must_use]
    pub fn lexicon(&self) -> &EmotionLexicon {
        &self.lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn single_happy_update_follows_smoothing_formula() {
        let mut state = EmotionalState::default();
        let v = state.update_state("I am happy", &EmotionalContext::default());
        // text = (0.8, 0.5, 0.6) / 0.8 = (1.0, 0.625, 0.75)
        // new  = 0.7 × text; current = 0.2 × new
        assert!(approx(v.pleasure, 0.14));
        assert!(approx(v.arousal, 0.0875));
        assert!(approx(v.dominance, 0.105));
    }

    #[test]
    fn lexicon_words_count_once_and_ignore_punctuation() {
        let lexicon = EmotionLexicon::default();
        assert_eq!(lexicon.score("Happy! happy happy."), lexicon.score("happy"));
        assert_eq!(lexicon.score("nothing here"), PadVector::NEUTRAL);
    }

    #[test]
    fn task_success_beats_failure() {
        let mut state = EmotionalState::default();
        let ctx = EmotionalContext {
            chat_history: &[],
            task_success: true,
            task_failure: true,
        };
        let v = state.update_state("", &ctx);
        // 0.2 × 0.3 × (0.3, 0, 0.2)
        assert!(approx(v.pleasure, 0.018));
        assert!(approx(v.dominance, 0.012));
    }

    #[test]
    fn history_is_averaged_over_window() {
        let mut state = EmotionalState::default();
        let history = vec![
            "sad".to_string(),
            "happy".to_string(),
            "happy".to_string(),
            "happy".to_string(),
        ];
        let ctx = EmotionalContext {
            chat_history: &history,
            ..EmotionalContext::default()
        };
        let v = state.update_state("", &ctx);
        // Only the last three (all happy) count: 0.2 × 0.3 × 0.2 × 1.0
        assert!(approx(v.pleasure, 0.012));
    }

    #[test]
    fn state_stays_bounded_under_repeated_updates() {
        let mut state = EmotionalState::default();
        let history = vec!["angry".to_string(); 5];
        let ctx = EmotionalContext {
            chat_history: &history,
            task_success: false,
            task_failure: true,
        };
        for _ in 0..500 {
            let v = state.update_state("angry afraid sad", &ctx);
            for d in Dimension::ALL {
                assert!((-1.0..=1.0).contains(&v.get(d)));
            }
        }
    }

    #[test]
    fn log_is_a_sliding_window() {
        let config = EmotionConfig {
            log_capacity: 3,
            ..EmotionConfig::default()
        };
        let mut state = EmotionalState::new(config);
        for i in 0..5 {
            state.update_state(&format!("turn {i}"), &EmotionalContext::default());
        }
        let triggers: Vec<_> = state.memory_log().iter().map(|s| s.trigger.as_str()).collect();
        assert_eq!(triggers, vec!["turn 2", "turn 3", "turn 4"]);
    }

    #[test]
    fn trend_takes_last_window_entries() {
        let mut state = EmotionalState::default();
        assert!(state.get_emotional_trend(10).is_empty());
        for _ in 0..4 {
            state.update_state("happy", &EmotionalContext::default());
        }
        let trend = state.get_emotional_trend(2);
        assert_eq!(trend.len(), 2);
        assert!(trend.pleasure[1] > trend.pleasure[0]);
    }

    #[test]
    fn tone_tie_breaks_and_dominance_fallback() {
        assert_eq!(ResponseTone::for_state(&PadVector::NEUTRAL), ResponseTone::LowPleasure);
        assert_eq!(
            ResponseTone::for_state(&PadVector::new(0.5, 0.5, 0.0)),
            ResponseTone::HighPleasure
        );
        assert_eq!(
            ResponseTone::for_state(&PadVector::new(0.1, -0.6, 0.2)),
            ResponseTone::LowArousal
        );
        assert_eq!(
            ResponseTone::for_state(&PadVector::new(0.1, 0.2, 0.9)),
            ResponseTone::HighArousal
        );
        assert_eq!(
            ResponseTone::for_state(&PadVector::new(0.1, 0.2, -0.9)),
            ResponseTone::LowArousal
        );
    }

    #[test]
    fn response_is_deterministic_under_seeded_rng() {
        let mut state = EmotionalState::default();
        state.update_state("happy", &EmotionalContext::default());
        let a = state.get_response(&mut StdRng::seed_from_u64(7));
        let b = state.get_response(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(ResponseTone::HighPleasure.templates().contains(&a));
    }

    #[test]
    fn restored_state_is_clamped_and_truncated() {
        let config = EmotionConfig {
            log_capacity: 2,
            ..EmotionConfig::default()
        };
        let snaps = (0..4).map(|i| EmotionalSnapshot {
            timestamp: chrono::Utc::now(),
            dimensions: PadVector::NEUTRAL,
            trigger: format!("t{i}"),
        });
        let state = EmotionalState::from_parts(config, PadVector::new(2.0, 0.0, -3.0), snaps);
        assert_eq!(state.get_emotional_state(), PadVector::new(1.0, 0.0, -1.0));
        assert_eq!(state.memory_log().len(), 2);
        assert_eq!(state.memory_log()[0].trigger, "t2");
    }
}
