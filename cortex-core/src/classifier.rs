//! Request classification.
//!
//! Each incoming message is classified into exactly one [`Request`] variant,
//! checked in priority order:
//!
//! 1. learning request: "learn about X", "study X"
//! 2. status query: "how are you", "your mood", "how do you feel"
//! 3. decision request: "should" with extractable options
//! 4. greeting: first word hello / hi / hey / greetings
//! 5. free-form: everything else

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LEARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:learn\s+about|study)\s+(.+)").expect("static regex")
});
static SHOULD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bshould\b").expect("static regex"));
static WHETHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhether\b").expect("static regex"));
static OR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+or\s+").expect("static regex"));

const STATUS_PHRASES: [&str; 3] = ["how are you", "your mood", "how do you feel"];
const GREETINGS: [&str; 4] = ["hello", "hi", "hey", "greetings"];
const SUBJECTS: [&str; 3] = ["i", "we", "you"];

/// A classified message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// A greeting.
    Greeting,
    /// A question about the agent's state or mood.
    StatusQuery,
    /// A request to learn about a topic.
    LearningRequest {
        /// What to learn about.
        topic: String,
    },
    /// A request to choose between options.
    DecisionRequest {
        /// Candidate options, in the order they were mentioned.
        options: Vec<String>,
    },
    /// Anything else.
    FreeForm,
}

/// Discriminant of [`Request`], for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// [`Request::Greeting`].
    Greeting,
    /// [`Request::StatusQuery`].
    StatusQuery,
    /// [`Request::LearningRequest`].
    LearningRequest,
    /// [`Request::DecisionRequest`].
    DecisionRequest,
    /// [`Request::FreeForm`].
    FreeForm,
}

impl Request {
    /// The variant without its payload.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Greeting => RequestKind::Greeting,
            Self::StatusQuery => RequestKind::StatusQuery,
            Self::LearningRequest { .. } => RequestKind::LearningRequest,
            Self::DecisionRequest { .. } => RequestKind::DecisionRequest,
            Self::FreeForm => RequestKind::FreeForm,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greeting => "greeting",
            Self::StatusQuery => "status_query",
            Self::LearningRequest => "learning_request",
            Self::DecisionRequest => "decision_request",
            Self::FreeForm => "free_form",
        })
    }
}

/// Classify a message.
#[must_use]
pub fn classify(text: &str) -> Request {
    if let Some(topic) = learning_topic(text) {
        return Request::LearningRequest { topic };
    }

    let lowered = text.to_lowercase();
    if STATUS_PHRASES.iter().any(|p| lowered.contains(p)) {
        return Request::StatusQuery;
    }

    if let Some(options) = decision_options(text) {
        return Request::DecisionRequest { options };
    }

    let first = text
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase());
    if first.is_some_and(|w| GREETINGS.contains(&w.as_str())) {
        return Request::Greeting;
    }

    Request::FreeForm
}

/// Options of a "should" message, when it has any.
#[must_use]
pub fn decision_options(text: &str) -> Option<Vec<String>> {
    if !SHOULD.is_match(text) {
        return None;
    }
    let options = extract_options(text);
    (!options.is_empty()).then_some(options)
}

fn learning_topic(text: &str) -> Option<String> {
    let captures = LEARN.captures(text)?;
    let topic = captures
        .get(1)?
        .as_str()
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim();
    (!topic.is_empty()).then(|| topic.to_string())
}

/// Extract decision options from a message.
///
/// "whether" yields `["yes", "no"]`. Otherwise "A or B" yields the text
/// between the last "should" and "or" (minus a leading I / we / you), and
/// the text after "or" up to the first `?`. Returns an empty list when
/// either side is empty.
#[must_use]
pub fn extract_options(text: &str) -> Vec<String> {
    if WHETHER.is_match(text) {
        return vec!["yes".to_string(), "no".to_string()];
    }

    let Some(or) = OR.find(text) else {
        return Vec::new();
    };
    let (before, after) = (&text[..or.start()], &text[or.end()..]);

    let first = SHOULD
        .find_iter(before)
        .last()
        .map_or(before, |m| &before[m.end()..]);
    let first = strip_subject(first.trim());
    let second = after.split('?').next().unwrap_or_default();
    let second = second
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim();

    if first.is_empty() || second.is_empty() {
        return Vec::new();
    }
    vec![first.to_string(), second.to_string()]
}

fn strip_subject(text: &str) -> &str {
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) if SUBJECTS.contains(&head.to_lowercase().as_str()) => rest.trim(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_requests_capture_topic() {
        assert_eq!(
            classify("Can you learn about rust lifetimes?"),
            Request::LearningRequest {
                topic: "rust lifetimes".into()
            }
        );
        assert_eq!(
            classify("study astronomy"),
            Request::LearningRequest {
                topic: "astronomy".into()
            }
        );
    }

    #[test]
    fn status_queries() {
        assert_eq!(classify("Hi, how are you?"), Request::StatusQuery);
        assert_eq!(classify("what is your mood"), Request::StatusQuery);
        assert_eq!(classify("How do you feel today"), Request::StatusQuery);
    }

    #[test]
    fn whether_yields_yes_no() {
        assert_eq!(
            classify("should I decide whether to go"),
            Request::DecisionRequest {
                options: vec!["yes".into(), "no".into()]
            }
        );
    }

    #[test]
    fn either_or_options_are_extracted() {
        assert_eq!(
            classify("Should I stay home or go out?"),
            Request::DecisionRequest {
                options: vec!["stay home".into(), "go out".into()]
            }
        );
        assert_eq!(
            extract_options("it rained, so should we take the bus or walk"),
            vec!["take the bus".to_string(), "walk".to_string()]
        );
    }

    #[test]
    fn should_without_options_is_free_form() {
        assert_eq!(classify("you should rest"), Request::FreeForm);
        assert_eq!(classify("should I or?"), Request::FreeForm);
    }

    #[test]
    fn decision_options_need_should() {
        assert_eq!(decision_options("tea or coffee?"), None);
        assert_eq!(
            decision_options("should I have tea or coffee?"),
            Some(vec!["have tea".to_string(), "coffee".to_string()])
        );
    }

    #[test]
    fn greetings_match_first_word_only() {
        assert_eq!(classify("Hello there"), Request::Greeting);
        assert_eq!(classify("hey!"), Request::Greeting);
        assert_eq!(classify("say hello"), Request::FreeForm);
        assert_eq!(classify("history lesson"), Request::FreeForm);
    }

    #[test]
    fn priority_order_is_fixed() {
        // Learning beats greeting.
        assert_eq!(
            classify("hello, study chemistry").kind(),
            RequestKind::LearningRequest
        );
        // Status beats decision.
        assert_eq!(
            classify("how are you, should I sleep or eat?").kind(),
            RequestKind::StatusQuery
        );
    }
}
