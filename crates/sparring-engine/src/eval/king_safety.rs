//! King safety from pawn shield coverage.

use sparring_core::{Color, File, Piece, Position, Rank, Square};

use crate::eval::EvalWeights;

/// Number of files next to (and including) the king's file with no friendly
/// pawn in the two ranks directly in front of the king.
pub fn missing_shield_files(pos: &Position, color: Color) -> i32 {
    let king = pos.king_square(color);
    let king_file = king.get_file().to_index() as i32;
    let king_rank = king.get_rank().to_index() as i32;
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };

    let mut missing = 0;
    for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
        let covered = (1..=2).any(|step| {
            let rank = king_rank + forward * step;
            if !(0..8).contains(&rank) {
                return false;
            }
            let sq = Square::make_square(Rank::from_index(rank as usize), File::from_index(file as usize));
            pos.piece_on(sq) == Some((Piece::Pawn, color))
        });
        if !covered {
            missing += 1;
        }
    }
    missing
}

/// Shield penalty, White-relative.
pub fn evaluate_king_safety(pos: &Position, weights: &EvalWeights) -> i32 {
    let white = missing_shield_files(pos, Color::White);
    let black = missing_shield_files(pos, Color::Black);
    weights.shield_missing * (black - white)
}
