//! Game phase from remaining non-pawn material.

use sparring_core::{Piece, Position};

/// Phase of a full complement of minor and major pieces.
///
/// Knight=1, Bishop=1, Rook=2, Queen=4: 4 + 4 + 8 + 8 = 24.
pub const MAX_PHASE: i32 = 24;

/// Phase in `0..=MAX_PHASE`; [`MAX_PHASE`] is a full middlegame, 0 a pawn
/// ending. Promotions cannot push it above the maximum.
pub fn game_phase(pos: &Position) -> i32 {
    let count = |piece| pos.pieces_of_kind(piece).popcnt() as i32;
    let phase = count(Piece::Knight)
        + count(Piece::Bishop)
        + 2 * count(Piece::Rook)
        + 4 * count(Piece::Queen);
    phase.min(MAX_PHASE)
}
