//! Mobility and central control for the side to move.

use sparring_core::{Color, Position, Square};

use crate::eval::EvalWeights;
use crate::eval::score::Score;

/// The four central squares.
pub const CENTER: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

/// Mobility and centre-control contributions, White-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    /// Per-move mobility weight times the legal move count (tapered by the caller).
    pub mobility: Score,
    /// Centre-control bonus for legal moves landing on d4/d5/e4/e5.
    pub center: i32,
}

/// Count legal moves of the side to move and how many land in the centre.
/// The opponent's moves are not counted.
pub fn evaluate_activity(pos: &Position, weights: &EvalWeights) -> Activity {
    let dests = pos.legal_destinations();
    let count = dests.len() as i32;
    let central = dests.iter().filter(|sq| CENTER.contains(*sq)).count() as i32;

    let sign = match pos.side_to_move() {
        Color::White => 1,
        Color::Black => -1,
    };
    Activity {
        mobility: weights.mobility * (count * sign),
        center: weights.center_control * central * sign,
    }
}
