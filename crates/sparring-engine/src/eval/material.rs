//! Material balance and piece-square placement.
//!
//! Both terms walk the same piece sets, so they share a module. Scores are
//! White-relative.

use sparring_core::{Color, Piece, Position};

use crate::eval::EvalWeights;
use crate::eval::pst::pst_value;
use crate::eval::score::Score;

/// Pieces that carry material value, in [`EvalWeights::material`] order.
pub const VALUED_PIECES: [Piece; 5] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
];

/// Middlegame value of `piece` under `weights`; kings are worth nothing.
pub fn piece_value(weights: &EvalWeights, piece: Piece) -> i32 {
    match piece {
        Piece::King => 0,
        other => weights.material[other.to_index()].mg(),
    }
}

/// Material balance, tapered later by the caller.
pub fn material(pos: &Position, weights: &EvalWeights) -> Score {
    let mut score = Score::ZERO;
    for piece in VALUED_PIECES {
        let white = pos.pieces(piece, Color::White).popcnt() as i32;
        let black = pos.pieces(piece, Color::Black).popcnt() as i32;
        score += weights.material[piece.to_index()] * (white - black);
    }
    score
}

/// Sum of piece-square bonuses, White minus Black.
pub fn placement(pos: &Position) -> Score {
    let mut score = Score::ZERO;
    for piece in VALUED_PIECES.into_iter().chain([Piece::King]) {
        for sq in pos.pieces(piece, Color::White) {
            score += pst_value(piece, Color::White, sq);
        }
        for sq in pos.pieces(piece, Color::Black) {
            score -= pst_value(piece, Color::Black, sq);
        }
    }
    score
}
