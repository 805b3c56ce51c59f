//! Pawn structure: doubled, isolated and passed pawns.

use sparring_core::{BitBoard, Color, Piece, Position, Square};

use crate::eval::EvalWeights;

/// Relative rank of `sq` for `color`: 0 on its back rank, 7 on promotion.
pub(crate) fn relative_rank(sq: Square, color: Color) -> i32 {
    let rank = sq.get_rank().to_index() as i32;
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

fn file_counts(pawns: BitBoard) -> [i32; 8] {
    let mut counts = [0; 8];
    for sq in pawns {
        counts[sq.get_file().to_index()] += 1;
    }
    counts
}

/// Whether no enemy pawn on the same or an adjacent file stands in front of
/// the pawn on `sq`.
fn is_passed(sq: Square, color: Color, enemy_pawns: BitBoard) -> bool {
    let file = sq.get_file().to_index() as i32;
    let rank = relative_rank(sq, color);
    !enemy_pawns.into_iter().any(|enemy| {
        let enemy_file = enemy.get_file().to_index() as i32;
        (enemy_file - file).abs() <= 1 && relative_rank(enemy, color) > rank
    })
}

fn side(pos: &Position, color: Color, weights: &EvalWeights) -> i32 {
    let pawns = pos.pieces(Piece::Pawn, color);
    let enemy = pos.pieces(Piece::Pawn, !color);
    let counts = file_counts(pawns);
    let mut score = 0;

    for count in counts {
        if count > 1 {
            score -= weights.doubled_pawn * (count - 1);
        }
    }

    for sq in pawns {
        let file = sq.get_file().to_index();
        let left = file.checked_sub(1).map_or(0, |f| counts[f]);
        let right = counts.get(file + 1).copied().unwrap_or(0);
        if left + right == 0 {
            score -= weights.isolated_pawn;
        }

        if is_passed(sq, color, enemy) {
            let advance = relative_rank(sq, color);
            score += weights.passed_pawn * advance * advance;
        }
    }

    score
}

/// Pawn structure score, White-relative.
pub fn evaluate_pawns(pos: &Position, weights: &EvalWeights) -> i32 {
    side(pos, Color::White, weights) - side(pos, Color::Black, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(fen: &str) -> i32 {
        evaluate_pawns(&Position::from_fen(fen).unwrap(), &EvalWeights::default())
    }

    #[test]
    fn starting_position_is_symmetric() {
        assert_eq!(evaluate_pawns(&Position::new(), &EvalWeights::default()), 0);
    }

    #[test]
    fn doubled_and_isolated() {
        // Black's d7 pawn stops both e-pawns from counting as passed.
        let pos = Position::from_fen("4k3/3p4/8/8/8/4P3/4P3/6K1 w - - 0 1").unwrap();
        let w = EvalWeights::default();
        assert_eq!(
            side(&pos, Color::White, &w),
            -(w.doubled_pawn + 2 * w.isolated_pawn)
        );
    }

    #[test]
    fn passed_pawn_bonus_grows_with_advancement() {
        let far = score("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let near = score("4k3/8/8/8/8/4P3/8/4K3 w - - 0 1");
        assert!(far > near);
        let w = EvalWeights::default();
        assert_eq!(far, w.passed_pawn * 36 - w.isolated_pawn);
    }

    #[test]
    fn pawn_ahead_on_adjacent_file_blocks_passer() {
        let pos = Position::from_fen("4k3/3p4/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let black = pos.pieces(Piece::Pawn, Color::Black);
        let white = pos.pieces(Piece::Pawn, Color::White);
        assert!(!is_passed(Square::E4, Color::White, black));
        assert!(!is_passed(Square::D7, Color::Black, white));
    }
}
