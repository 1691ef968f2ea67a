//! # Cortex Core Library
//!
//! A cognitive-affective engine for a conversational agent. Each
//! [`CognitiveSession`] combines:
//!
//! - **Memory** - a bounded short-term buffer consolidated into a
//!   categorized long-term store with a word association graph
//! - **Reasoning** - cue-based recognition of causal, analogical and
//!   inductive statements, and precedent-backed inference
//! - **Decisions** - weighted scoring of options on safety, efficacy,
//!   ethics and novelty, blended with history and reasoning
//! - **Emotion** - a PAD (pleasure, arousal, dominance) state with
//!   exponential smoothing and a bounded emotional log
//! - **Self-reflection** - per-turn quality scores, learning points and
//!   improvement suggestions
//!
//! Long-term memory and emotional state persist as JSON between runs.
//!
//! ```
//! use cortex_core::{CognitiveSession, EngineConfig, TurnSignals};
//! use rand::SeedableRng;
//!
//! let mut session = CognitiveSession::new(EngineConfig::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let report = session.handle_turn("Hello!", &TurnSignals::default(), &mut rng);
//! assert!(report.reply.contains("Cortex"));
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod classifier;
pub mod config;
pub mod consolidation;
pub mod decision;
pub mod emotion;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod persistence;
pub mod reasoning;
pub mod reflection;
pub mod retrieval;
pub mod session;
pub mod text;
pub mod types;

pub use classifier::{Request, RequestKind};
pub use config::EngineConfig;
pub use decision::{Decision, DecisionEngine};
pub use emotion::EmotionalState;
pub use error::{CortexError, Result};
pub use memory::{MemoryItem, MemoryStore};
pub use reasoning::{Inference, ReasoningEngine};
pub use reflection::SelfReflection;
pub use session::{CognitiveSession, SessionRegistry, SharedSession, TurnReport, TurnSignals};
pub use types::*;
