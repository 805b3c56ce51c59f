//! Static evaluation.
//!
//! Every term is computed White-relative and reported separately in an
//! [`EvalBreakdown`]; [`Evaluator::evaluate`] sums them, applies contempt
//! near equality and memoises the result in the [`TranspositionCache`].

pub mod king_safety;
pub mod material;
pub mod mobility;
pub mod pawns;
pub mod phase;
pub mod pst;
pub mod score;
pub mod tactics;

use sparring_core::{Color, Outcome, Position};

use crate::search::tt::TranspositionCache;
use score::{S, Score};

/// Score of the side that delivers checkmate.
pub const MATE_SCORE: i32 = 50_000;

/// Scores beyond this magnitude are forced mates.
pub const MATE_THRESHOLD: i32 = 49_000;

/// Tunable evaluation constants.
///
/// With the `serde` feature this round-trips through TOML or JSON; missing
/// fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EvalWeights {
    /// Pawn, knight, bishop, rook, queen.
    pub material: [Score; 5],
    /// Per legal move of the side to move.
    pub mobility: Score,
    /// Per legal move landing on d4/d5/e4/e5.
    pub center_control: i32,
    /// Charged to the side to move when in check.
    pub in_check: i32,
    /// Per extra pawn on a file.
    pub doubled_pawn: i32,
    /// Per pawn without friendly pawns on adjacent files.
    pub isolated_pawn: i32,
    /// Multiplied by the square of the passed pawn's relative rank.
    pub passed_pawn: i32,
    /// Per shield file without a friendly pawn in front of the king.
    pub shield_missing: i32,
    /// Contempt applies only when the raw score is inside this margin.
    pub near_draw_margin: i32,
    /// Enable the undefended-piece term.
    pub protection: bool,
    /// Share of a hanging piece's value charged, in percent.
    pub protection_percent: i32,
    /// Enable the immediate-capture term.
    pub exchange: bool,
    /// Share of the best capture gain credited, in percent.
    pub exchange_percent: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: [S(100, 120), S(320, 300), S(330, 310), S(500, 520), S(900, 950)],
            mobility: S(3, 2),
            center_control: 5,
            in_check: 50,
            doubled_pawn: 20,
            isolated_pawn: 15,
            passed_pawn: 10,
            shield_missing: 20,
            near_draw_margin: 50,
            protection: false,
            protection_percent: 50,
            exchange: false,
            exchange_percent: 50,
        }
    }
}

/// Per-term contributions of one static evaluation, White-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalBreakdown {
    pub phase: i32,
    pub material: i32,
    pub placement: i32,
    pub pawns: i32,
    pub king_safety: i32,
    pub mobility: i32,
    pub center: i32,
    pub in_check: i32,
    pub protection: i32,
    pub exchange: i32,
}

impl EvalBreakdown {
    /// Sum of all terms, before contempt.
    pub fn total(&self) -> i32 {
        self.material
            + self.placement
            + self.pawns
            + self.king_safety
            + self.mobility
            + self.center
            + self.in_check
            + self.protection
            + self.exchange
    }
}

/// Position evaluator holding weights, contempt and the engine's colour.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvalWeights,
    contempt: i32,
    perspective: Color,
}

impl Evaluator {
    /// Evaluator with no contempt, playing White.
    pub fn new(weights: EvalWeights) -> Self {
        Self {
            weights,
            contempt: 0,
            perspective: Color::White,
        }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: EvalWeights) {
        self.weights = weights;
    }

    /// Value of a draw to the engine, in centipawns. Negative values make
    /// the engine avoid draws.
    pub fn contempt(&self) -> i32 {
        self.contempt
    }

    pub fn set_contempt(&mut self, contempt: i32) {
        self.contempt = contempt;
    }

    /// The colour the engine is playing.
    pub fn perspective(&self) -> Color {
        self.perspective
    }

    pub fn set_perspective(&mut self, color: Color) {
        self.perspective = color;
    }

    /// Contempt expressed White-relative.
    pub fn draw_score(&self) -> i32 {
        match self.perspective {
            Color::White => self.contempt,
            Color::Black => -self.contempt,
        }
    }

    /// Score of a finished game, or `None` while play continues.
    pub fn terminal_score(&self, pos: &Position) -> Option<i32> {
        match pos.outcome()? {
            Outcome::Checkmate { winner: Color::White } => Some(MATE_SCORE),
            Outcome::Checkmate { winner: Color::Black } => Some(-MATE_SCORE),
            _ => Some(self.draw_score()),
        }
    }

    /// Compute every term without touching the cache.
    pub fn breakdown(&self, pos: &Position) -> EvalBreakdown {
        let w = &self.weights;
        let phase = phase::game_phase(pos);
        let activity = mobility::evaluate_activity(pos, w);

        let in_check = if pos.in_check() {
            match pos.side_to_move() {
                Color::White => -w.in_check,
                Color::Black => w.in_check,
            }
        } else {
            0
        };

        EvalBreakdown {
            phase,
            material: material::material(pos, w).taper(phase),
            placement: material::placement(pos).taper(phase),
            pawns: pawns::evaluate_pawns(pos, w),
            king_safety: king_safety::evaluate_king_safety(pos, w),
            mobility: activity.mobility.taper(phase),
            center: activity.center,
            in_check,
            protection: if w.protection { tactics::protection(pos, w) } else { 0 },
            exchange: if w.exchange { tactics::exchange(pos, w) } else { 0 },
        }
    }

    /// Evaluate `pos`, White-relative, memoised by position key.
    ///
    /// Fifty-move and repetition draws depend on history the key does not
    /// cover; they bypass the cache.
    pub fn evaluate(&self, pos: &Position, cache: &mut TranspositionCache) -> i32 {
        if pos.is_fifty_move_draw() || pos.is_threefold_repetition() {
            return self.terminal_score(pos).unwrap_or_else(|| self.draw_score());
        }

        let key = pos.key();
        if let Some(cached) = cache.get(key) {
            return cached;
        }

        let score = match self.terminal_score(pos) {
            Some(score) => score,
            None => {
                let raw = self.breakdown(pos).total();
                if raw.abs() < self.weights.near_draw_margin {
                    raw + self.draw_score()
                } else {
                    raw
                }
            }
        };

        cache.put(key, score);
        score
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalWeights::default())
    }
}
