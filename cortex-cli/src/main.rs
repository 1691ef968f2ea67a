//! `cortex`: talk to a cognitive session from the terminal.
//!
//! Reads one message per line from stdin and prints the rendered turn.
//! `exit`, `quit` or end of input ends the session, after which long-term
//! memory and emotional state are saved unless `--no-save` is given.

mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cortex_core::config::EngineConfig;
use cortex_core::session::{CognitiveSession, TurnSignals};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::render::RenderedTurn;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CORTEX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the state files (overrides the configured paths)
    #[arg(short, long, env = "CORTEX_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Seed for response selection, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Do not save state on exit
    #[arg(long)]
    no_save: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.state_dir {
        config.persistence = config.persistence.in_dir(dir);
    }

    init_logging(&config.general.log_level, args.json_logs);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let agent = config.general.agent_name.clone();
    let mut session = CognitiveSession::load(config);
    info!(
        long_term = session.memory().long_term_len(),
        "{agent} online"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }
        if !text.is_empty() {
            let report = session.handle_turn(text, &TurnSignals::default(), &mut rng);
            writeln!(stdout, "{}", RenderedTurn::new(&agent, &report))?;
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    info!(
        turns = session.chat_history().len(),
        latency = %session
            .monitor()
            .percentiles()
            .summary(session.monitor().budget_ms()),
        "Session finished"
    );
    if !args.no_save {
        session.save_state().context("saving session state")?;
    }
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
