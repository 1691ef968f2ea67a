//! Plain-text rendering of a turn for the terminal.

use std::fmt;

use cortex_core::classifier::Request;
use cortex_core::session::{CognitiveBundle, TurnReport};

/// Number of recalled memories shown per turn.
const SHOWN_MEMORIES: usize = 2;

/// A [`TurnReport`] formatted for display, prefixed with the agent's name.
pub struct RenderedTurn<'a> {
    agent: &'a str,
    report: &'a TurnReport,
}

impl<'a> RenderedTurn<'a> {
    pub fn new(agent: &'a str, report: &'a TurnReport) -> Self {
        Self { agent, report }
    }
}

impl fmt::Display for RenderedTurn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "{}: {}", self.agent, report.reply)?;
        writeln!(
            f,
            "  [emotion] {} {}",
            report.emotional_response, report.emotional_state
        )?;

        if let Request::LearningRequest { topic } = &report.request {
            writeln!(f, "  [learning] noted \"{topic}\"")?;
        }
        if let Some(bundle) = &report.cognition {
            write_cognition(f, bundle)?;
        }
        if let Some(consolidation) = &report.consolidation {
            writeln!(
                f,
                "  [memory] consolidated: {} kept, {} forgotten",
                consolidation.promoted, consolidation.discarded
            )?;
        }
        Ok(())
    }
}

fn write_cognition(f: &mut fmt::Formatter<'_>, bundle: &CognitiveBundle) -> fmt::Result {
    if let Some(logic_type) = bundle.analysis.logic_type {
        writeln!(
            f,
            "  [logic] {logic_type} (confidence {:.2})",
            bundle.analysis.confidence
        )?;
    }

    if let Some(inference) = &bundle.inference {
        if let Some(conclusion) = &inference.conclusion {
            writeln!(f, "  [inference] {conclusion}")?;
        }
        let path: Vec<String> = inference.reasoning_path.iter().map(ToString::to_string).collect();
        if !path.is_empty() {
            writeln!(f, "  [trace] {}", path.join(" -> "))?;
        }
    }

    if let Some(decision) = &bundle.decision {
        match &decision.chosen_option {
            Some(chosen) => writeln!(
                f,
                "  [decision] {chosen} (confidence {:.2})",
                decision.confidence
            )?,
            None => writeln!(f, "  [decision] no option to choose")?,
        }
        for eval in &decision.evaluations {
            let s = &eval.factors;
            writeln!(
                f,
                "    - {}: {:.2} (safety {:.2}, efficacy {:.2}, ethics {:.2}, novelty {:.2})",
                eval.option, eval.score, s.safety, s.efficacy, s.ethics, s.novelty
            )?;
        }
    }

    for memory in bundle.memories.iter().take(SHOWN_MEMORIES) {
        writeln!(
            f,
            "  [recall] {} ({:.2}, {})",
            memory.content, memory.relevance, memory.category
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::EngineConfig;
    use cortex_core::session::{CognitiveSession, TurnSignals};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn render(text: &str) -> String {
        let mut session = CognitiveSession::new(EngineConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        let report = session.handle_turn(text, &TurnSignals::default(), &mut rng);
        RenderedTurn::new("Cortex", &report).to_string()
    }

    #[test]
    fn decision_shows_every_factor() {
        let out = render("should I walk or drive?");
        assert!(out.starts_with("Cortex: "));
        assert!(out.contains("[decision] walk"));
        assert!(out.contains("- drive:"));
        assert!(out.contains("novelty"));
    }

    #[test]
    fn causal_question_shows_logic_and_trace() {
        let out = render("if it rains then will it flood?");
        assert!(out.contains("[logic] causal"));
        assert!(out.contains("[trace] identified a causal relation"));
    }

    #[test]
    fn learning_is_acknowledged() {
        let out = render("learn about glaciers");
        assert!(out.contains("[learning] noted \"glaciers\""));
    }
}
