//! Annotated move type.

use std::fmt;
use std::hash::{Hash, Hasher};

use chess::{ChessMove, Piece, Square};

/// A legal move, tagged with what the search and move ordering need to know.
///
/// Moves are only produced by [`Position::legal_moves`](crate::Position::legal_moves).
/// Equality and hashing look at origin, destination and promotion piece
/// only, so a killer move recorded in one position still matches the same
/// move generated in a sibling position.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    inner: ChessMove,
    piece: Piece,
    captured: Option<Piece>,
    gives_check: bool,
    castling: bool,
}

impl Move {
    pub(crate) fn new(
        inner: ChessMove,
        piece: Piece,
        captured: Option<Piece>,
        gives_check: bool,
        castling: bool,
    ) -> Self {
        Self {
            inner,
            piece,
            captured,
            gives_check,
            castling,
        }
    }

    /// Origin square.
    pub fn source(&self) -> Square {
        self.inner.get_source()
    }

    /// Destination square.
    pub fn dest(&self) -> Square {
        self.inner.get_dest()
    }

    /// The piece being moved.
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// The captured piece, including en passant captures.
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// The promotion piece, if this is a promotion.
    pub fn promotion(&self) -> Option<Piece> {
        self.inner.get_promotion()
    }

    /// Whether the move leaves the opponent in check.
    pub fn gives_check(&self) -> bool {
        self.gives_check
    }

    /// Whether the move is a castling king move.
    pub fn is_castling(&self) -> bool {
        self.castling
    }

    /// Whether the move captures a piece.
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Neither a capture nor a promotion.
    pub fn is_quiet(&self) -> bool {
        self.captured.is_none() && self.promotion().is_none()
    }

    /// Captures, promotions and checks: the moves quiescence search follows.
    pub fn is_tactical(&self) -> bool {
        !self.is_quiet() || self.gives_check
    }

    /// The underlying move-generator value.
    pub fn raw(&self) -> ChessMove {
        self.inner
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        let mut text = format!("{}{}", square_name(self.source()), square_name(self.dest()));
        if let Some(promo) = self.promotion() {
            text.push(piece_letter(promo).to_ascii_lowercase());
        }
        text
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.get_source().to_index().hash(state);
        self.inner.get_dest().to_index().hash(state);
        self.inner.get_promotion().map(|p| p.to_index()).hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Algebraic name of a square, e.g. `e4`.
pub fn square_name(sq: Square) -> String {
    let file = (b'a' + sq.get_file().to_index() as u8) as char;
    let rank = (b'1' + sq.get_rank().to_index() as u8) as char;
    format!("{file}{rank}")
}

/// Upper-case SAN letter for a piece (`P` for pawns).
pub fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}
