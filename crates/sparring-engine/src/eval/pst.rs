//! Piece-square tables.
//!
//! Tables read like a diagram from White's side: the first row is rank 8,
//! the last row rank 1, files a..h left to right. [`pst_value`] handles the
//! orientation for both colours.

use sparring_core::{Color, Piece, Square};

use crate::eval::score::{S, Score};

#[rustfmt::skip]
const PAWN: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     78,  83,  86,  73, 102,  82,  85,  90,
      7,  29,  21,  44,  40,  31,  44,   7,
    -17,  16,  -2,  15,  14,   0,  15, -13,
    -26,   3,  10,   9,   6,   1,   0, -23,
    -22,   9,   5, -11, -10,  -2,   3, -19,
    -31,   8,  -7, -37, -36, -14,   3, -31,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i32; 64] = [
    -66, -53, -75, -75, -10, -55, -58, -70,
     -3,  -6, 100, -36,   4,  62,  -4, -14,
     10,  67,   1,  74,  73,  27,  62,  -2,
     24,  24,  45,  37,  33,  41,  25,  17,
     -1,   5,  31,  21,  22,  35,   2,   0,
    -18,  10,  13,  22,  18,  15,  11, -14,
    -23, -15,   2,   0,   2,   0, -23, -20,
    -74, -23, -26, -24, -19, -35, -22, -69,
];

#[rustfmt::skip]
const BISHOP: [i32; 64] = [
    -59, -78, -82, -76, -23,-107, -37, -50,
    -11,  20,  35, -42, -39,  31,   2, -22,
     -9,  39, -32,  41,  52, -10,  28, -14,
     25,  17,  20,  34,  26,  25,  15,  10,
     13,  10,  17,  23,  17,  16,   0,   7,
     14,  25,  24,  15,   8,  25,  20,  15,
     19,  20,  11,   6,   7,   6,  20,  16,
     -7,   2, -15, -12, -14, -15, -10, -10,
];

#[rustfmt::skip]
const ROOK: [i32; 64] = [
     35,  29,  33,   4,  37,  33,  56,  50,
     55,  29,  56,  67,  55,  62,  34,  60,
     19,  35,  28,  33,  45,  27,  25,  15,
      0,   5,  16,  13,  18,  -4,  -9,  -6,
    -28, -35, -16, -21, -13, -29, -46, -30,
    -42, -28, -42, -25, -25, -35, -26, -46,
    -53, -38, -31, -26, -29, -43, -44, -53,
    -30, -24, -18,   5,  -2, -18, -31, -32,
];

#[rustfmt::skip]
const QUEEN: [i32; 64] = [
      6,   1,  -8,-104,  69,  24,  88,  26,
     14,  32,  60, -10,  20,  76,  57,  24,
     -2,  43,  32,  60,  72,  63,  43,   2,
      1, -16,  22,  17,  25,  20, -13,  -6,
    -14, -15,  -2,  -5,  -1, -10, -20, -22,
    -30,  -6, -13, -11, -16, -11, -16, -27,
    -36, -18,   0, -19, -15, -15, -21, -38,
    -39, -30, -31, -13, -31, -36, -34, -42,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
      4,  54,  47, -99, -99,  60,  83, -62,
    -32,  10,  55,  56,  56,  55,  10,   3,
    -62,  12, -57,  44, -67,  28,  37, -31,
    -55,  50,  11,  -4, -19,  13,   0, -49,
    -55, -43, -52, -28, -51, -47,  -8, -50,
    -47, -42, -43, -79, -64, -32, -29, -32,
     -4,   3, -14, -50, -57, -18,  13,   4,
     17,  30,  -3, -14,   6,  -1,  40,  18,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

/// Table index for a piece of `color` on `sq`.
///
/// Square indices run a1=0 .. h8=63 while the tables start at a8, so White
/// flips the rank and Black, seeing the board from the other side, reads
/// the raw index.
#[inline]
fn table_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.to_index() ^ 56,
        Color::Black => sq.to_index(),
    }
}

/// Positional bonus for `piece` of `color` on `sq`. Only the king has a
/// distinct endgame table.
pub fn pst_value(piece: Piece, color: Color, sq: Square) -> Score {
    let idx = table_index(color, sq);
    match piece {
        Piece::Pawn => S(PAWN[idx], PAWN[idx]),
        Piece::Knight => S(KNIGHT[idx], KNIGHT[idx]),
        Piece::Bishop => S(BISHOP[idx], BISHOP[idx]),
        Piece::Rook => S(ROOK[idx], ROOK[idx]),
        Piece::Queen => S(QUEEN[idx], QUEEN[idx]),
        Piece::King => S(KING_MG[idx], KING_EG[idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawn_on_seventh_is_rewarded() {
        assert_eq!(pst_value(Piece::Pawn, Color::White, Square::E7).mg(), 102);
        assert_eq!(pst_value(Piece::Pawn, Color::Black, Square::E2).mg(), 102);
    }

    #[test]
    fn colours_mirror_vertically() {
        for piece in [Piece::Knight, Piece::Queen, Piece::King] {
            assert_eq!(
                pst_value(piece, Color::White, Square::G1),
                pst_value(piece, Color::Black, Square::G8)
            );
        }
    }

    #[test]
    fn king_endgame_prefers_centre() {
        let centre = pst_value(Piece::King, Color::White, Square::E4);
        let corner = pst_value(Piece::King, Color::White, Square::H1);
        assert!(centre.eg() > corner.eg());
        assert_ne!(centre.mg(), centre.eg());
    }
}
