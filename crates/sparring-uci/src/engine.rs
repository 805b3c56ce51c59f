//! Synchronous UCI engine loop.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use sparring_core::{Color, Position};
use sparring_engine::{
    DifficultyProfile, EvalWeights, MATE_SCORE, MATE_THRESHOLD, SearchEngine, SearchLimits,
    SearchOutcome,
};

use crate::command::{Command, GoParams, UciOption, parse_command};
use crate::error::UciError;

/// Difficulty used until the GUI sets one.
const DEFAULT_DIFFICULTY: u8 = 3;

/// The UCI engine, holding the current position and the searcher.
///
/// Commands are handled one at a time on the calling thread; `go` blocks
/// until the search finishes within its budget.
pub struct UciEngine {
    position: Position,
    engine: SearchEngine,
    difficulty: u8,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        Self {
            position: Position::new(),
            engine: SearchEngine::new(DifficultyProfile::for_level(DEFAULT_DIFFICULTY)),
            difficulty: DEFAULT_DIFFICULTY,
        }
    }

    /// Read commands from `input` until `quit` or end of input, writing
    /// responses to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<(), UciError> {
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received UCI command");

            match parse_command(trimmed) {
                Ok(Command::Quit) => break,
                Ok(cmd) => {
                    if let Err(err) = self.handle(cmd, output) {
                        match err {
                            UciError::Io { .. } => return Err(err),
                            other => warn!(error = %other, "UCI command failed"),
                        }
                    }
                }
                Err(err) => warn!(error = %err, "UCI parse error"),
            }
            output.flush()?;
        }

        info!("sparring shutting down");
        Ok(())
    }

    /// Handle a single parsed command.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<(), UciError> {
        match cmd {
            Command::Uci => self.handle_uci(out)?,
            Command::IsReady => writeln!(out, "readyok")?,
            Command::UciNewGame => self.handle_ucinewgame(),
            Command::Position(position) => self.position = *position,
            Command::Go(params) => self.handle_go(params, out)?,
            Command::SetOption(option) => self.handle_setoption(option)?,
            Command::Stop | Command::Quit | Command::Unknown(_) => {}
        }
        Ok(())
    }

    fn handle_uci<W: Write>(&self, out: &mut W) -> Result<(), UciError> {
        writeln!(out, "id name sparring")?;
        writeln!(out, "id author sparring developers")?;
        writeln!(
            out,
            "option name Difficulty type spin default {DEFAULT_DIFFICULTY} min 1 max 5"
        )?;
        writeln!(out, "option name Weights type string default <empty>")?;
        writeln!(out, "option name OwnBook type check default true")?;
        writeln!(out, "uciok")?;
        Ok(())
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Position::new();
        self.engine.reset();
    }

    fn handle_setoption(&mut self, option: UciOption) -> Result<(), UciError> {
        match option {
            UciOption::Difficulty(level) => {
                let profile = DifficultyProfile::try_from(level)?;
                self.engine.set_profile(profile);
                self.difficulty = level;
                info!(level, "difficulty set");
            }
            UciOption::Weights(path) => {
                let weights = load_weights(&path)?;
                self.engine.set_weights(weights);
                info!(path = %path.display(), "weights loaded");
            }
            UciOption::OwnBook(enabled) => self.engine.set_book_enabled(enabled),
        }
        Ok(())
    }

    fn handle_go<W: Write>(&mut self, params: GoParams, out: &mut W) -> Result<(), UciError> {
        let limits = if params.infinite {
            SearchLimits::default()
        } else {
            SearchLimits {
                depth: params.depth,
                nodes: params.nodes,
                movetime: params.movetime,
            }
        };

        match self.engine.select_move_with_limits(&mut self.position, limits) {
            Some(outcome) => {
                writeln!(out, "{}", info_line(&outcome, self.position.side_to_move()))?;
                writeln!(out, "bestmove {}", outcome.best_move)?;
            }
            None => {
                debug!(outcome = ?self.position.outcome(), difficulty = self.difficulty, "no move to play");
                writeln!(out, "bestmove 0000")?;
            }
        }
        Ok(())
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Read evaluation weights from a TOML file. Missing keys keep their
/// default values.
pub fn load_weights(path: &Path) -> Result<EvalWeights, UciError> {
    let weights_error = |reason: String| UciError::Weights {
        path: path.to_path_buf(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| weights_error(e.to_string()))?;
    toml::from_str(&text).map_err(|e| weights_error(e.to_string()))
}

/// `info` line for a finished search. UCI scores are from the side to
/// move's point of view.
fn info_line(outcome: &SearchOutcome, side: Color) -> String {
    let score = match side {
        Color::White => outcome.evaluation,
        Color::Black => -outcome.evaluation,
    };
    let score = if score.abs() > MATE_THRESHOLD {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {score}")
    };

    let stats = &outcome.stats;
    let pv = outcome
        .pv
        .iter()
        .map(|mv| mv.to_uci())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "info depth {} score {} nodes {} nps {} time {} pv {}",
        stats.depth_reached,
        score,
        stats.nodes_evaluated,
        stats.nodes_per_second,
        stats.elapsed.as_millis(),
        pv
    )
}
