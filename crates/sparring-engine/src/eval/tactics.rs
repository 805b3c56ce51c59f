//! Optional tactical terms: undefended pieces and immediate capture gains.
//!
//! Both overlap with material, since a hanging piece is usually lost a
//! move later anyway. They stay separate contributions and are off by
//! default.

use sparring_core::{Color, Position};

use crate::eval::EvalWeights;
use crate::eval::material::{VALUED_PIECES, piece_value};

fn hanging_value(pos: &Position, color: Color, weights: &EvalWeights) -> i32 {
    let mut total = 0;
    for piece in VALUED_PIECES {
        for sq in pos.pieces(piece, color) {
            let attacked = pos.attackers(sq, !color).popcnt() > 0;
            let defended = pos.attackers(sq, color).popcnt() > 0;
            if attacked && !defended {
                total += piece_value(weights, piece);
            }
        }
    }
    total
}

/// Penalty for pieces that are attacked and have no defender, White-relative.
pub fn protection(pos: &Position, weights: &EvalWeights) -> i32 {
    let white = hanging_value(pos, Color::White, weights);
    let black = hanging_value(pos, Color::Black, weights);
    (black - white) * weights.protection_percent / 100
}

/// Best material gain the side to move can take right now, White-relative.
///
/// A capture onto a defended square is assumed to lose the capturing piece.
pub fn exchange(pos: &Position, weights: &EvalWeights) -> i32 {
    let us = pos.side_to_move();
    let best = pos
        .legal_moves()
        .into_iter()
        .filter_map(|mv| {
            let victim = mv.captured()?;
            let recapture = if pos.attackers(mv.dest(), !us).popcnt() > 0 {
                piece_value(weights, mv.piece())
            } else {
                0
            };
            Some(piece_value(weights, victim) - recapture)
        })
        .max()
        .unwrap_or(0)
        .max(0);

    let gain = best * weights.exchange_percent / 100;
    match us {
        Color::White => gain,
        Color::Black => -gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> EvalWeights {
        EvalWeights {
            protection: true,
            exchange: true,
            ..EvalWeights::default()
        }
    }

    #[test]
    fn starting_position_has_nothing_hanging() {
        let pos = Position::new();
        assert_eq!(protection(&pos, &weights()), 0);
        assert_eq!(exchange(&pos, &weights()), 0);
    }

    #[test]
    fn undefended_knight_is_penalised() {
        // Black knight on d5 attacked by the e4 pawn, nothing defends it.
        let pos = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let w = weights();
        assert_eq!(protection(&pos, &w), 320 * w.protection_percent / 100);
    }

    #[test]
    fn free_capture_counts_for_side_to_move() {
        let pos = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let w = weights();
        assert_eq!(exchange(&pos, &w), 320 * w.exchange_percent / 100);

        let black = Position::from_fen("4k3/8/8/3n4/8/4P3/8/4K3 b - - 0 1").unwrap();
        assert_eq!(exchange(&black, &w), -(100 * w.exchange_percent / 100));
    }

    #[test]
    fn defended_target_is_not_a_gain_for_a_bigger_piece() {
        // Queen takes a pawn defended by another pawn.
        let pos = Position::from_fen("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        assert_eq!(exchange(&pos, &weights()), 0);
    }
}
