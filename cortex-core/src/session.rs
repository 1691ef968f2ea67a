//! Conversation sessions.
//!
//! A [`CognitiveSession`] owns every component for one conversation: the
//! memory store, reasoning engine, emotional state, self-reflection log and
//! chat history. Nothing is process-global, so any number of sessions can
//! run side by side.
//!
//! Sessions are not internally synchronized. Share one across threads as a
//! [`SharedSession`] so every operation on it is serialized.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use serde::Serialize;
use tracing::{Level, debug, info, span};
use uuid::Uuid;

use crate::classifier::{self, Request};
use crate::config::EngineConfig;
use crate::consolidation::ConsolidationReport;
use crate::decision::{Decision, DecisionEngine};
use crate::emotion::{EmotionalContext, EmotionalState};
use crate::error::Result;
use crate::memory::MemoryStore;
use crate::metrics::{EngineCounters, LatencyMonitor, spans};
use crate::persistence::StateStore;
use crate::reasoning::{Analysis, Inference, ReasoningEngine};
use crate::reflection::{InteractionData, ReflectionRecord, SelfReflection};
use crate::retrieval::RecalledMemory;
use crate::types::PadVector;

/// Category under which learning requests are remembered.
pub const LEARNING_CATEGORY: &str = "learning";

// ---------------------------------------------------------------------------
// Turn inputs & outputs
// ---------------------------------------------------------------------------

/// Externally measured signals for one turn. All optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnSignals {
    /// Response latency in seconds. Measured by the session when absent.
    pub latency_secs: Option<f32>,
    /// User satisfaction in [0, 1].
    pub user_feedback: Option<f32>,
    /// Emotional alignment in [0, 1].
    pub emotional_alignment: Option<f32>,
    /// The last task succeeded.
    pub task_success: bool,
    /// The last task failed.
    pub task_failure: bool,
}

/// The structured cognitive response to a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CognitiveBundle {
    /// The message.
    pub input: String,
    /// Logical analysis of the message.
    pub analysis: Analysis,
    /// Inference, for questions.
    pub inference: Option<Inference>,
    /// Decision, for "should" messages with options.
    pub decision: Option<Decision>,
    /// Long-term memories relevant to the message.
    pub memories: Vec<RecalledMemory>,
}

/// Everything produced by one call to [`CognitiveSession::handle_turn`].
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    /// How the message was classified.
    pub request: Request,
    /// Primary reply text.
    pub reply: String,
    /// Canned line matching the current affect.
    pub emotional_response: &'static str,
    /// Affect after the turn.
    pub emotional_state: PadVector,
    /// Cognitive bundle, for free-form and decision turns.
    pub cognition: Option<CognitiveBundle>,
    /// Consolidation triggered by recording the message, if any.
    pub consolidation: Option<ConsolidationReport>,
    /// Reflection on the turn.
    pub reflection: ReflectionRecord,
    /// Processing time of the turn.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// CognitiveSession
// ---------------------------------------------------------------------------

/// One conversation's cognitive-affective state.
pub struct CognitiveSession {
    config: EngineConfig,
    memory: MemoryStore,
    reasoning: ReasoningEngine,
    emotion: EmotionalState,
    reflection: SelfReflection,
    chat_history: Vec<String>,
    state_store: StateStore,
    counters: EngineCounters,
    monitor: LatencyMonitor,
}

impl fmt::Debug for CognitiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CognitiveSession")
            .field("agent", &self.config.general.agent_name)
            .field("long_term", &self.memory.long_term_len())
            .field("turns", &self.chat_history.len())
            .field("emotion", &self.emotion.get_emotional_state())
            .finish_non_exhaustive()
    }
}

impl CognitiveSession {
    /// A fresh session with empty memory and neutral affect.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let memory = MemoryStore::new(config.memory.clone());
        let emotion = EmotionalState::new(config.emotion.clone());
        Self::assemble(config, memory, emotion)
    }

    /// A session restored from the configured state files.
    ///
    /// Missing files start empty. Malformed or unreadable files are logged,
    /// counted, and replaced by empty defaults; loading never fails.
    #[must_use]
    pub fn load(config: EngineConfig) -> Self {
        let _span = span!(Level::INFO, spans::PERSIST_LOAD).entered();
        let store = StateStore::new(config.persistence.clone());
        let memory = store.load_cognitive_or_default(config.memory.clone());
        let emotion = store.load_emotional_or_default(config.emotion.clone());
        let failures = u64::from(memory.fell_back) + u64::from(emotion.fell_back);
        let (memory, emotion) = (memory.state, emotion.state);

        let session = Self::assemble(config, memory, emotion);
        session
            .counters
            .state_load_failures
            .fetch_add(failures, Ordering::Relaxed);
        session
    }

    fn assemble(config: EngineConfig, memory: MemoryStore, emotion: EmotionalState) -> Self {
        info!(
            agent = %config.general.agent_name,
            long_term = memory.long_term_len(),
            "Cognitive session created"
        );
        let budget_ms = f64::from(config.reflection.latency_ceiling_secs) * 1000.0;
        Self {
            reflection: SelfReflection::new(config.reflection.clone()),
            state_store: StateStore::new(config.persistence.clone()),
            memory,
            reasoning: ReasoningEngine::new(),
            emotion,
            chat_history: Vec::new(),
            counters: EngineCounters::new(),
            monitor: LatencyMonitor::new(budget_ms),
            config,
        }
    }

    /// Persist long-term memory and emotional state.
    ///
    /// # Errors
    /// Returns the first save failure.
    pub fn save_state(&self) -> Result<()> {
        let _span = span!(Level::INFO, spans::PERSIST_SAVE).entered();
        self.state_store.save_cognitive(&self.memory)?;
        self.state_store.save_emotional(&self.emotion)?;
        EngineCounters::bump(&self.counters.saves_completed);
        info!(
            cognitive = %self.state_store.cognitive_path().display(),
            emotional = %self.state_store.emotional_path().display(),
            "Session state saved"
        );
        Ok(())
    }

    // -- turn handling ------------------------------------------------------

    /// Handle one user message end to end.
    ///
    /// Every turn records the message in memory and chat history, updates
    /// the emotional state, dispatches on the classified request, and
    /// reflects on the interaction.
    pub fn handle_turn<R: Rng + ?Sized>(
        &mut self,
        text: &str,
        signals: &TurnSignals,
        rng: &mut R,
    ) -> TurnReport {
        let start = Instant::now();
        let request = classifier::classify(text);
        let _span = span!(Level::DEBUG, spans::SESSION_TURN, kind = %request.kind()).entered();

        let category = matches!(request, Request::LearningRequest { .. }).then_some(LEARNING_CATEGORY);
        let consolidation = self.remember(text, category);
        self.push_history(text);
        self.update_emotion(text, signals);

        let (reply, cognition) = match &request {
            Request::Greeting => (self.handle_greeting(rng), None),
            Request::StatusQuery => (self.handle_status(rng), None),
            Request::LearningRequest { topic } => (self.handle_learning(topic), None),
            Request::DecisionRequest { options } => {
                let bundle = self.cognize(text, Some(options.as_slice()));
                (Self::summarize(&bundle, &self.emotion, rng), Some(bundle))
            }
            Request::FreeForm => {
                let bundle = self.cognize(text, None);
                (Self::summarize(&bundle, &self.emotion, rng), Some(bundle))
            }
        };

        let elapsed = start.elapsed();
        let reflection = self.reflect(signals, elapsed);
        self.monitor.record(elapsed);

        debug!(
            kind = %request.kind(),
            elapsed_us = elapsed.as_micros(),
            "Turn handled"
        );

        TurnReport {
            request,
            reply,
            emotional_response: self.emotion.get_response(rng),
            emotional_state: self.emotion.get_emotional_state(),
            cognition,
            consolidation,
            reflection,
            elapsed,
        }
    }

    /// Record `text` in memory and produce the cognitive bundle for it.
    ///
    /// Questions are reasoned about; "should" messages with options are
    /// decided on.
    pub fn process_input(&mut self, text: &str) -> CognitiveBundle {
        self.remember(text, None);
        let options = classifier::decision_options(text);
        self.cognize(text, options.as_deref())
    }

    fn cognize(&self, text: &str, options: Option<&[String]>) -> CognitiveBundle {
        let analysis = self.reasoning.analyze(text);

        let inference = ReasoningEngine::is_question(text).then(|| {
            let _span = span!(Level::DEBUG, spans::INFER).entered();
            EngineCounters::bump(&self.counters.inferences);
            self.reasoning.infer(&self.memory, text)
        });

        let decision = options.map(|options| self.make_decision(text, options));

        CognitiveBundle {
            input: text.to_string(),
            analysis,
            inference,
            decision,
            memories: self.recall(text, None),
        }
    }

    fn summarize<R: Rng + ?Sized>(
        bundle: &CognitiveBundle,
        emotion: &EmotionalState,
        rng: &mut R,
    ) -> String {
        if let Some(chosen) = bundle
            .decision
            .as_ref()
            .and_then(|d| d.chosen_option.as_ref().map(|c| (c, d.confidence)))
        {
            return format!("I would go with \"{}\" (confidence {:.2}).", chosen.0, chosen.1);
        }
        if let Some(conclusion) = bundle.inference.as_ref().and_then(|i| i.conclusion.as_ref()) {
            return format!("{conclusion}.");
        }
        if let Some(memory) = bundle.memories.first() {
            return format!("That reminds me: {}", memory.content);
        }
        emotion.get_response(rng).to_string()
    }

    fn handle_greeting<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let name = &self.config.general.agent_name;
        let greetings = [
            format!("Hello! I'm {name}, nice to meet you!"),
            format!("Hi there! {name} here, happy to chat."),
            format!("Hey! I'm {name}. What's on your mind?"),
        ];
        let pick = rng.gen_range(0..greetings.len());
        greetings[pick].clone()
    }

    fn handle_status<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("Let me check how I feel... {}", self.emotion.get_response(rng))
    }

    fn handle_learning(&self, topic: &str) -> String {
        let known = self.memory.category(LEARNING_CATEGORY).len();
        format!("I'll study {topic} and remember what I learn. ({known} learning notes kept so far.)")
    }

    fn remember(&mut self, text: &str, category: Option<&str>) -> Option<ConsolidationReport> {
        let _span = span!(Level::TRACE, spans::MEMORY_ADD).entered();
        let outcome = self.memory.add_memory(text, category);
        EngineCounters::bump(&self.counters.memories_added);
        if let Some(report) = &outcome.consolidation {
            let _span = span!(Level::DEBUG, spans::CONSOLIDATION).entered();
            EngineCounters::bump(&self.counters.consolidation_passes);
            self.counters
                .items_promoted
                .fetch_add(report.promoted as u64, Ordering::Relaxed);
            self.counters
                .items_discarded
                .fetch_add(report.discarded as u64, Ordering::Relaxed);
        }
        outcome.consolidation
    }

    /// Append to chat history before the emotion update, so the current
    /// message is part of its context window.
    fn push_history(&mut self, text: &str) {
        self.chat_history.push(text.to_string());
        if let Some(cap) = self.config.general.history_capacity {
            let excess = self.chat_history.len().saturating_sub(cap);
            self.chat_history.drain(..excess);
        }
    }

    fn update_emotion(&mut self, text: &str, signals: &TurnSignals) {
        let _span = span!(Level::TRACE, spans::EMOTION_UPDATE).entered();
        let context = EmotionalContext {
            chat_history: &self.chat_history,
            task_success: signals.task_success,
            task_failure: signals.task_failure,
        };
        self.emotion.update_state(text, &context);
        EngineCounters::bump(&self.counters.emotional_updates);
    }

    fn reflect(&mut self, signals: &TurnSignals, elapsed: Duration) -> ReflectionRecord {
        let _span = span!(Level::DEBUG, spans::REFLECTION).entered();
        let data = InteractionData {
            latency_secs: Some(signals.latency_secs.unwrap_or(elapsed.as_secs_f32())),
            user_feedback: signals.user_feedback,
            emotional_alignment: signals.emotional_alignment,
            chat_history: &self.chat_history,
        };
        let record = self.reflection.reflect(&self.emotion, &data);
        EngineCounters::bump(&self.counters.reflections);
        record
    }

    // -- direct component access -------------------------------------------

    /// Recall long-term memories relevant to `query`.
    #[must_use]
    pub fn recall(&self, query: &str, category: Option<&str>) -> Vec<RecalledMemory> {
        let _span = span!(Level::TRACE, spans::MEMORY_RECALL).entered();
        EngineCounters::bump(&self.counters.recalls);
        self.memory.recall(query, category)
    }

    /// Score `options` for `situation`.
    #[must_use]
    pub fn make_decision<S: AsRef<str>>(&self, situation: &str, options: &[S]) -> Decision {
        let _span = span!(Level::DEBUG, spans::DECISION).entered();
        EngineCounters::bump(&self.counters.decisions);
        DecisionEngine::new(&self.config.decision, &self.memory, &self.reasoning)
            .make_decision(situation, options)
    }

    /// The memory store.
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Mutable access to the memory store.
    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    /// The reasoning engine.
    #[must_use]
    pub fn reasoning(&self) -> &ReasoningEngine {
        &self.reasoning
    }

    /// The emotional state.
    #[must_use]
    pub fn emotion(&self) -> &EmotionalState {
        &self.emotion
    }

    /// The self-reflection log.
    #[must_use]
    pub fn reflection(&self) -> &SelfReflection {
        &self.reflection
    }

    /// Messages seen so far, oldest first.
    #[must_use]
    pub fn chat_history(&self) -> &[String] {
        &self.chat_history
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Event counters.
    #[must_use]
    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    /// Per-turn latency monitor.
    #[must_use]
    pub fn monitor(&self) -> &LatencyMonitor {
        &self.monitor
    }
}

// ---------------------------------------------------------------------------
// Sharing & registry
// ---------------------------------------------------------------------------

/// A session shared between request handlers. The mutex serializes every
/// operation on the session.
pub type SharedSession = Arc<Mutex<CognitiveSession>>;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps session ids to shared sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session built from `config`.
    pub fn create(&self, config: EngineConfig) -> (SessionId, SharedSession) {
        let id = SessionId::new();
        let session = Arc::new(Mutex::new(CognitiveSession::new(config)));
        self.sessions.write().insert(id, Arc::clone(&session));
        debug!(session = %id, "Session registered");
        (id, session)
    }

    /// Register an existing session.
    pub fn insert(&self, session: CognitiveSession) -> (SessionId, SharedSession) {
        let id = SessionId::new();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id, Arc::clone(&shared));
        (id, shared)
    }

    /// Look up a session.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.read().get(&id).cloned()
    }

    /// Remove a session, returning it if it existed.
    pub fn remove(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.write().remove(&id)
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
