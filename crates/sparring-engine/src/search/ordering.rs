//! Move ordering.
//!
//! Score bands, highest first:
//! - PV move: 20,000
//! - Captures: 10,000 + victim - attacker / 100
//! - Promotions: 9,000 + promoted piece value
//! - Checks: 8,000
//! - Killers: 7,000 (+100 for the primary slot)
//!
//! Every move additionally gets its history score (capped at 1,000), +100
//! for landing on a central square and +50 for knight or bishop development.

use sparring_core::{Move, Piece};

use crate::eval::mobility::CENTER;
use crate::search::heuristics::{HistoryTable, KillerTable};

const PV_BONUS: i32 = 20_000;
const CAPTURE_BASE: i32 = 10_000;
const PROMOTION_BASE: i32 = 9_000;
const CHECK_BONUS: i32 = 8_000;
const KILLER_BONUS: i32 = 7_000;
const PRIMARY_KILLER_BONUS: i32 = 100;
const HISTORY_CAP: i32 = 1_000;
const CENTER_BONUS: i32 = 100;
const DEVELOPMENT_BONUS: i32 = 50;

/// Piece values used only for ordering.
pub fn order_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 20_000,
    }
}

/// When the tail of the ordered list is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingConfig {
    /// Moves kept after truncation.
    pub keep: usize,
    /// Truncate only in iterations searching at least this deep.
    pub truncate_depth: i32,
    /// Truncate only at or beyond this ply. The root is never truncated.
    pub truncate_ply: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            keep: 20,
            truncate_depth: 4,
            truncate_ply: 2,
        }
    }
}

/// Search state the orderer reads.
pub struct OrderHints<'a> {
    pub pv_move: Option<Move>,
    pub killers: &'a KillerTable,
    pub history: &'a HistoryTable,
}

/// Ranks legal moves so likely-best candidates are searched first.
#[derive(Debug, Clone, Default)]
pub struct MoveOrderer {
    config: OrderingConfig,
}

impl MoveOrderer {
    pub fn new(config: OrderingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Priority of `mv` at `ply`.
    pub fn score(&self, mv: &Move, ply: usize, hints: &OrderHints<'_>) -> i32 {
        let mut score = if hints.pv_move == Some(*mv) {
            PV_BONUS
        } else if let Some(victim) = mv.captured() {
            CAPTURE_BASE + order_value(victim) - order_value(mv.piece()) / 100
        } else if let Some(promo) = mv.promotion() {
            PROMOTION_BASE + order_value(promo)
        } else if mv.gives_check() {
            CHECK_BONUS
        } else {
            match hints.killers.rank(ply, *mv) {
                Some(0) => KILLER_BONUS + PRIMARY_KILLER_BONUS,
                Some(_) => KILLER_BONUS,
                None => 0,
            }
        };

        score += hints.history.score(mv).min(HISTORY_CAP);
        if CENTER.contains(&mv.dest()) {
            score += CENTER_BONUS;
        }
        if is_development(mv) {
            score += DEVELOPMENT_BONUS;
        }
        score
    }

    /// Sort `moves` best-first. Ties keep generation order.
    pub fn order(
        &self,
        moves: Vec<Move>,
        ply: usize,
        search_depth: i32,
        hints: &OrderHints<'_>,
    ) -> Vec<Move> {
        let mut scored: Vec<(i32, Move)> = moves
            .into_iter()
            .map(|mv| (self.score(&mv, ply, hints), mv))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let truncate = ply > 0
            && ply >= self.config.truncate_ply
            && search_depth >= self.config.truncate_depth;
        if truncate {
            scored.truncate(self.config.keep);
        }
        scored.into_iter().map(|(_, mv)| mv).collect()
    }
}

/// A knight or bishop moving off the back ranks and edge files.
fn is_development(mv: &Move) -> bool {
    if !matches!(mv.piece(), Piece::Knight | Piece::Bishop) {
        return false;
    }
    let rank = mv.dest().get_rank().to_index();
    let file = mv.dest().get_file().to_index();
    !matches!(rank, 0 | 7) && !matches!(file, 0 | 7)
}

/// Most valuable victim, least valuable attacker. Used in quiescence,
/// where killers and history do not apply.
pub fn order_tactical(moves: &mut [Move]) {
    let value = |mv: &Move| match mv.captured() {
        Some(victim) => order_value(victim) - order_value(mv.piece()),
        None => mv.promotion().map_or(0, order_value) - order_value(Piece::Pawn),
    };
    moves.sort_by_key(|mv| std::cmp::Reverse(value(mv)));
}
