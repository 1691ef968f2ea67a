//! Core type definitions shared by every Cortex component.
//!
//! All types are serializable so the persisted state units can be written
//! and read back without an intermediate representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity & Time
// ---------------------------------------------------------------------------

/// Wall-clock timestamp attached to memories, snapshots, and reflections.
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Emotional Model: PAD (Pleasure-Arousal-Dominance)
// ---------------------------------------------------------------------------

/// One axis of the affect vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Unhappy (-1) → happy (+1).
    Pleasure,
    /// Calm (-1) → excited (+1).
    Arousal,
    /// Submissive (-1) → dominant (+1).
    Dominance,
}

impl Dimension {
    /// All dimensions in their fixed scan order. Tie-breaks that pick "the
    /// first maximal dimension" follow this order.
    pub const ALL: [Self; 3] = [Self::Pleasure, Self::Arousal, Self::Dominance];

    /// Lowercase name, as used in persisted records and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pleasure => "pleasure",
            Self::Arousal => "arousal",
            Self::Dominance => "dominance",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PAD emotional vector based on Russell & Mehrabian (1977).
///
/// Each axis ranges from -1.0 to 1.0 once it has passed through
/// [`PadVector::clamped`]; intermediate vectors (lexicon sums, context
/// impacts) may temporarily exceed that range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PadVector {
    /// Unhappy (-1.0) to happy (+1.0).
    pub pleasure: f32,
    /// Calm (-1.0) to excited (+1.0).
    pub arousal: f32,
    /// Submissive (-1.0) to dominant (+1.0).
    pub dominance: f32,
}

impl PadVector {
    /// Neutral emotional state.
    pub const NEUTRAL: Self = Self {
        pleasure: 0.0,
        arousal: 0.0,
        dominance: 0.0,
    };

    /// Create a new vector without clamping.
    #[must_use]
    pub const fn new(pleasure: f32, arousal: f32, dominance: f32) -> Self {
        Self {
            pleasure,
            arousal,
            dominance,
        }
    }

    /// Read one axis.
    #[must_use]
    pub fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Pleasure => self.pleasure,
            Dimension::Arousal => self.arousal,
            Dimension::Dominance => self.dominance,
        }
    }

    /// Component-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.pleasure + other.pleasure,
            self.arousal + other.arousal,
            self.dominance + other.dominance,
        )
    }

    /// Multiply every axis by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.pleasure * factor,
            self.arousal * factor,
            self.dominance * factor,
        )
    }

    /// Clamp every axis to [-1, 1].
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self::new(
            self.pleasure.clamp(-1.0, 1.0),
            self.arousal.clamp(-1.0, 1.0),
            self.dominance.clamp(-1.0, 1.0),
        )
    }

    /// Largest absolute component.
    #[must_use]
    pub fn max_abs(&self) -> f32 {
        self.pleasure
            .abs()
            .max(self.arousal.abs())
            .max(self.dominance.abs())
    }

    /// Divide by the largest absolute component so the strongest axis has
    /// magnitude 1. A zero vector is returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let max_abs = self.max_abs();
        if max_abs == 0.0 {
            *self
        } else {
            self.scale(1.0 / max_abs)
        }
    }

    /// The axis with the greatest absolute value. Ties go to the earlier
    /// axis in [`Dimension::ALL`] order.
    #[must_use]
    pub fn dominant(&self) -> (Dimension, f32) {
        let mut best = (Dimension::Pleasure, self.pleasure);
        for dimension in &Dimension::ALL[1..] {
            let value = self.get(*dimension);
            if value.abs() > best.1.abs() {
                best = (*dimension, value);
            }
        }
        best
    }
}

impl fmt::Display for PadVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pleasure={:.2} arousal={:.2} dominance={:.2}",
            self.pleasure, self.arousal, self.dominance
        )
    }
}
