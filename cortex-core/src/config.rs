//! Configuration for the Cortex engine.
//!
//! Maps directly to `cortex.toml`. Every field has a default, and the
//! defaults reproduce the engine's reference constants exactly, so an empty
//! file (or no file at all) yields the standard behavior.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory store capacity, thresholds, and importance keywords.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Decision factor weights and keyword lists.
    #[serde(default)]
    pub decision: DecisionConfig,
    /// Emotional state dynamics.
    #[serde(default)]
    pub emotion: EmotionConfig,
    /// Self-reflection thresholds and retention.
    #[serde(default)]
    pub reflection: ReflectionConfig,
    /// State file locations.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CortexError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CortexError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Name the agent uses for itself in greetings.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    /// Maximum chat turns a session retains. `None` keeps every turn.
    #[serde(default)]
    pub history_capacity: Option<usize>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            agent_name: default_agent_name(),
            history_capacity: None,
        }
    }
}

/// Memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Short-term buffer capacity; exceeding it triggers consolidation.
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,
    /// Items with importance strictly above this are promoted to long-term.
    #[serde(default = "default_0_6")]
    pub consolidation_threshold: f32,
    /// Recalled items must have relevance strictly above this.
    #[serde(default = "default_0_3")]
    pub recall_threshold: f32,
    /// Importance every new memory starts from.
    #[serde(default = "default_0_5")]
    pub base_importance: f32,
    /// Importance added per matched keyword.
    #[serde(default = "default_0_1")]
    pub keyword_bonus: f32,
    /// Category used when a memory is added without one.
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Keywords that mark content as important.
    #[serde(default = "default_importance_keywords")]
    pub importance_keywords: Vec<String>,
    /// Keywords that mark content as emotionally charged.
    #[serde(default = "default_emotion_keywords")]
    pub emotion_keywords: Vec<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: default_short_term_capacity(),
            consolidation_threshold: 0.6,
            recall_threshold: 0.3,
            base_importance: 0.5,
            keyword_bonus: 0.1,
            default_category: default_category(),
            importance_keywords: default_importance_keywords(),
            emotion_keywords: default_emotion_keywords(),
        }
    }
}

/// Weights of the four decision factors. Should sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionWeights {
    /// Weight of the safety factor.
    #[serde(default = "default_0_3")]
    pub safety: f32,
    /// Weight of the efficacy factor.
    #[serde(default = "default_0_3")]
    pub efficacy: f32,
    /// Weight of the ethics factor.
    #[serde(default = "default_0_2")]
    pub ethics: f32,
    /// Weight of the novelty factor.
    #[serde(default = "default_0_2")]
    pub novelty: f32,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        Self {
            safety: 0.3,
            efficacy: 0.3,
            ethics: 0.2,
            novelty: 0.2,
        }
    }
}

/// Decision engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Factor weights.
    #[serde(default)]
    pub weights: DecisionWeights,
    /// Share of the final score taken by historical experience.
    #[serde(default = "default_0_3")]
    pub history_blend: f32,
    /// Share of the final score taken by reasoning alignment.
    #[serde(default = "default_0_2")]
    pub reasoning_blend: f32,
    /// Per-hit safety penalty / bonus.
    #[serde(default = "default_0_2")]
    pub safety_step: f32,
    /// Per-hit ethics penalty / bonus.
    #[serde(default = "default_0_3")]
    pub ethics_step: f32,
    /// Words that lower the safety score.
    #[serde(default = "default_risk_keywords")]
    pub risk_keywords: Vec<String>,
    /// Words that raise the safety score.
    #[serde(default = "default_safety_keywords")]
    pub safety_keywords: Vec<String>,
    /// Words that lower the ethics score.
    #[serde(default = "default_unethical_keywords")]
    pub unethical_keywords: Vec<String>,
    /// Words that raise the ethics score.
    #[serde(default = "default_ethical_keywords")]
    pub ethical_keywords: Vec<String>,
    /// Words marking a recalled memory as an efficacy success.
    #[serde(default = "default_success_keywords")]
    pub success_keywords: Vec<String>,
    /// Words marking a memory as a positive historical outcome.
    #[serde(default = "default_history_success_keywords")]
    pub history_success_keywords: Vec<String>,
    /// Words marking a memory as a negative historical outcome.
    #[serde(default = "default_failure_keywords")]
    pub failure_keywords: Vec<String>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            weights: DecisionWeights::default(),
            history_blend: 0.3,
            reasoning_blend: 0.2,
            safety_step: 0.2,
            ethics_step: 0.3,
            risk_keywords: default_risk_keywords(),
            safety_keywords: default_safety_keywords(),
            unethical_keywords: default_unethical_keywords(),
            ethical_keywords: default_ethical_keywords(),
            success_keywords: default_success_keywords(),
            history_success_keywords: default_history_success_keywords(),
            failure_keywords: default_failure_keywords(),
        }
    }
}

/// Emotional state dynamics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Exponential smoothing factor applied to the current state.
    #[serde(default = "default_0_8")]
    pub decay: f32,
    /// Share of the raw update taken from the message text.
    #[serde(default = "default_0_7")]
    pub text_weight: f32,
    /// Share of the raw update taken from the context.
    #[serde(default = "default_0_3")]
    pub context_weight: f32,
    /// Multiplier on the averaged emotion of recent chat turns.
    #[serde(default = "default_0_2")]
    pub history_weight: f32,
    /// Number of trailing chat turns considered as context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Emotional memory log capacity (oldest dropped).
    #[serde(default = "default_emotion_log_capacity")]
    pub log_capacity: usize,
    /// Number of log entries examined by trend analysis.
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            decay: 0.8,
            text_weight: 0.7,
            context_weight: 0.3,
            history_weight: 0.2,
            history_window: default_history_window(),
            log_capacity: default_emotion_log_capacity(),
            trend_window: default_trend_window(),
        }
    }
}

/// Self-reflection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionConfig {
    /// Latency (seconds) at which responsiveness reaches zero.
    #[serde(default = "default_latency_ceiling")]
    pub latency_ceiling_secs: f32,
    /// Quality subscores below this produce an improvement suggestion.
    #[serde(default = "default_0_6")]
    pub quality_floor: f32,
    /// User feedback below this produces a learning point.
    #[serde(default = "default_0_6")]
    pub feedback_floor: f32,
    /// Emotional alignment below this produces a learning point.
    #[serde(default = "default_0_7")]
    pub alignment_floor: f32,
    /// Maximum reflections retained. `None` keeps every reflection.
    #[serde(default)]
    pub log_capacity: Option<usize>,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            latency_ceiling_secs: default_latency_ceiling(),
            quality_floor: 0.6,
            feedback_floor: 0.6,
            alignment_floor: 0.7,
            log_capacity: None,
        }
    }
}

/// Persistence / save settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the cognitive state file.
    #[serde(default = "default_cognitive_path")]
    pub cognitive_state_path: PathBuf,
    /// Path to the emotional state file.
    #[serde(default = "default_emotional_path")]
    pub emotional_state_path: PathBuf,
    /// Pretty-print saved JSON.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            cognitive_state_path: default_cognitive_path(),
            emotional_state_path: default_emotional_path(),
            pretty: true,
        }
    }
}

impl PersistenceConfig {
    /// Re-root both state files under `dir`, keeping their file names.
    #[must_use]
    pub fn in_dir(&self, dir: &std::path::Path) -> Self {
        let rebase = |p: &PathBuf| match p.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(p),
        };
        Self {
            cognitive_state_path: rebase(&self.cognitive_state_path),
            emotional_state_path: rebase(&self.emotional_state_path),
            pretty: self.pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_agent_name() -> String {
    "Cortex".to_string()
}
fn default_short_term_capacity() -> usize {
    10
}
fn default_category() -> String {
    "general".to_string()
}
fn default_history_window() -> usize {
    3
}
fn default_emotion_log_capacity() -> usize {
    100
}
fn default_trend_window() -> usize {
    10
}
fn default_latency_ceiling() -> f32 {
    5.0
}
fn default_cognitive_path() -> PathBuf {
    PathBuf::from("cognitive_state.json")
}
fn default_emotional_path() -> PathBuf {
    PathBuf::from("emotional_state.json")
}
fn default_0_1() -> f32 {
    0.1
}
fn default_0_2() -> f32 {
    0.2
}
fn default_0_3() -> f32 {
    0.3
}
fn default_0_5() -> f32 {
    0.5
}
fn default_0_6() -> f32 {
    0.6
}
fn default_0_7() -> f32 {
    0.7
}
fn default_0_8() -> f32 {
    0.8
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

fn default_importance_keywords() -> Vec<String> {
    words(&["important", "must", "remember", "critical", "core"])
}
fn default_emotion_keywords() -> Vec<String> {
    words(&["happy", "sad", "angry", "surprised", "afraid"])
}
fn default_risk_keywords() -> Vec<String> {
    words(&["danger", "dangerous", "harm", "loss", "risk", "unsafe"])
}
fn default_safety_keywords() -> Vec<String> {
    words(&["safe", "protect", "secure", "reliable"])
}
fn default_unethical_keywords() -> Vec<String> {
    words(&["deceive", "harm", "improper", "violate", "illegal"])
}
fn default_ethical_keywords() -> Vec<String> {
    words(&["honest", "fair", "proper", "compliant", "legal"])
}
fn default_success_keywords() -> Vec<String> {
    words(&["success", "successful", "effective", "solved"])
}
fn default_history_success_keywords() -> Vec<String> {
    words(&["success", "successful", "effective", "good", "solved"])
}
fn default_failure_keywords() -> Vec<String> {
    words(&["failure", "failed", "ineffective", "bad", "problem"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.memory.short_term_capacity, 10);
        assert!((config.memory.consolidation_threshold - 0.6).abs() < f32::EPSILON);
        assert!((config.memory.recall_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.memory.default_category, "general");
        assert_eq!(config.emotion.log_capacity, 100);
        assert!(config.reflection.log_capacity.is_none());
        assert!(config.general.history_capacity.is_none());
    }

    #[test]
    fn decision_weights_sum_to_one() {
        let w = DecisionWeights::default();
        let sum = w.safety + w.efficacy + w.ethics + w.novelty;
        assert!((sum - 1.0).abs() < 0.01, "Weights sum to {sum}, expected ~1.0");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").expect("parse");
        assert_eq!(config.memory.short_term_capacity, 10);
        assert_eq!(config.general.agent_name, "Cortex");
    }

    #[test]
    fn partial_toml_overrides_selectively() {
        let toml = r#"
[memory]
short_term_capacity = 4

[general]
history_capacity = 20

[reflection]
log_capacity = 50
"#;
        let config = EngineConfig::from_toml(toml).expect("parse");
        assert_eq!(config.memory.short_term_capacity, 4);
        assert!((config.memory.consolidation_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.reflection.log_capacity, Some(50));
        assert_eq!(config.general.history_capacity, Some(20));
        assert!((config.emotion.decay - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EngineConfig::from_toml("[memory\nbroken").expect_err("invalid toml");
        assert!(matches!(err, crate::CortexError::Config(_)));
    }

    #[test]
    fn persistence_paths_rebase_into_dir() {
        let p = PersistenceConfig::default().in_dir(std::path::Path::new("/var/lib/cortex"));
        assert_eq!(
            p.cognitive_state_path,
            PathBuf::from("/var/lib/cortex/cognitive_state.json")
        );
        assert_eq!(
            p.emotional_state_path,
            PathBuf::from("/var/lib/cortex/emotional_state.json")
        );
    }
}
