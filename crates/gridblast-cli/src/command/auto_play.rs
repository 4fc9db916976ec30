use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use gridblast_engine::{GameConfig, GameSession, PieceSeed, SessionSnapshot};
use gridblast_evaluator::{
    heuristic_agent::{GameEnd, HeuristicAgent},
    weight_store::WeightStore,
    weights::WeightVector,
};
use serde::Serialize;

use crate::util::{self, JsonTarget};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Weight file to play with (built-in weights when omitted)
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Game configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed of the piece sequence (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of moves
    #[arg(long, default_value_t = 10_000)]
    turn_limit: usize,
    /// Write the live game state to this file after every move
    #[arg(long)]
    state_file: Option<PathBuf>,
    /// Output file for the game summary (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Live state hand-off written to `--state-file`.
#[derive(Debug, Serialize)]
struct StateFile<'a> {
    written_at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct GameSummary {
    seed: u64,
    score: u64,
    moves: usize,
    end: &'static str,
    total_cleared_lines: usize,
    max_combo_streak: u32,
    all_clears: usize,
}

fn write_state(path: &Path, session: &GameSession) -> anyhow::Result<()> {
    let snapshot = session.snapshot();
    let state = StateFile {
        written_at: Utc::now(),
        snapshot: &snapshot,
    };
    util::write_json_atomic("state", path, &state)
}

fn load_weights(path: Option<&Path>) -> anyhow::Result<WeightVector> {
    let Some(path) = path else {
        return Ok(WeightVector::default());
    };
    let file = WeightStore::new(path)
        .load()
        .with_context(|| format!("cannot load weights file {}", path.display()))?;
    tracing::info!(name = %file.name, fitness = ?file.fitness, "loaded weights");
    Ok(file.weights)
}

fn play(arg: &AutoPlayArg, seed: u64) -> anyhow::Result<GameSummary> {
    let config: GameConfig = match &arg.config {
        Some(path) => util::read_json_file("game config", path)?,
        None => GameConfig::default(),
    };
    let rules = config.validate().context("invalid game configuration")?;
    let weights = load_weights(arg.weights.as_deref())?;
    let agent = HeuristicAgent::from_weights(weights);

    let mut session = GameSession::new(&rules, PieceSeed::from_u64(seed));
    let state_file = arg.state_file.as_deref();
    if let Some(path) = state_file {
        write_state(path, &session)?;
    }

    let mut write_error = None;
    let played = agent
        .play_session(&mut session, arg.turn_limit, |session, placement, outcome| {
            tracing::debug!(
                slot = placement.slot(),
                origin = %placement.origin(),
                points = outcome.points(),
                cleared = outcome.cleared_count(),
                "move"
            );
            if let Some(path) = state_file
                && write_error.is_none()
                && let Err(err) = write_state(path, session)
            {
                write_error = Some(err);
            }
        })
        .context("agent made an illegal move")?;
    if let Some(err) = write_error {
        return Err(err);
    }
    if let Some(path) = state_file {
        write_state(path, &session)?;
    }

    let stats = session.stats();
    Ok(GameSummary {
        seed,
        score: played.score(),
        moves: played.moves(),
        end: match played.end() {
            GameEnd::GameOver => "game_over",
            GameEnd::TurnLimit => "turn_limit",
        },
        total_cleared_lines: stats.total_cleared_lines(),
        max_combo_streak: stats.max_combo_streak(),
        all_clears: stats.all_clears(),
    })
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(rand::random);
    let summary = play(arg, seed)?;
    tracing::info!(
        seed,
        score = summary.score,
        moves = summary.moves,
        end = summary.end,
        "game finished"
    );
    JsonTarget::from_arg(arg.output.clone()).write("game summary", &summary)
}
