//! Emergency move choice without search.

use sparring_core::{Move, Piece, Position, Square};

use crate::search::ordering::order_value;

/// Destinations preferred once nothing tactical is available.
const CENTRAL_DESTINATIONS: [Square; 8] = [
    Square::D4,
    Square::D5,
    Square::E4,
    Square::E5,
    Square::C4,
    Square::C5,
    Square::F4,
    Square::F5,
];

/// Pick a reasonable legal move by simple rules: a mating move, the
/// capture of the most valuable piece, a check, castling, knight or bishop
/// development, a central move, and finally whatever comes first.
pub fn fallback_move(pos: &mut Position) -> Option<Move> {
    let moves = pos.legal_moves();
    if moves.is_empty() {
        return None;
    }

    for mv in &moves {
        let mates = match pos.apply(mv) {
            Ok(child) => child.is_checkmate(),
            Err(_) => false,
        };
        if mates {
            return Some(*mv);
        }
    }

    if let Some(capture) = moves
        .iter()
        .filter_map(|mv| mv.captured().map(|victim| (order_value(victim), *mv)))
        .max_by_key(|(value, _)| *value)
    {
        return Some(capture.1);
    }

    let rules: [fn(&Move) -> bool; 4] = [
        Move::gives_check,
        Move::is_castling,
        |mv: &Move| matches!(mv.piece(), Piece::Knight | Piece::Bishop) && is_off_back_rank(mv),
        |mv: &Move| CENTRAL_DESTINATIONS.contains(&mv.dest()),
    ];
    for rule in rules {
        if let Some(mv) = moves.iter().find(|mv| rule(mv)) {
            return Some(*mv);
        }
    }

    moves.first().copied()
}

fn is_off_back_rank(mv: &Move) -> bool {
    !matches!(mv.dest().get_rank().to_index(), 0 | 7)
}
