//! Owned chess position with guarded apply/undo.
//!
//! The search mutates one [`Position`] in place. Every exploratory move is
//! applied through [`Position::apply`], which returns a [`MoveGuard`]; the
//! move is undone when the guard is dropped. Because the guard holds the
//! mutable borrow, moves can only be undone in LIFO order and an early
//! return can never leave the position unbalanced.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use chess::{
    BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square, get_bishop_moves,
    get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
};
use tracing::trace;

use crate::error::PositionError;
use crate::moves::Move;
use crate::san;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The side to move is checkmated.
    Checkmate {
        /// The side that delivered mate.
        winner: Color,
    },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// Neither side can possibly mate.
    InsufficientMaterial,
    /// One hundred plies without a capture or pawn move.
    FiftyMoveRule,
    /// The same position occurred three times.
    ThreefoldRepetition,
}

impl Outcome {
    /// Whether the outcome is a draw.
    pub fn is_draw(self) -> bool {
        !matches!(self, Outcome::Checkmate { .. })
    }
}

/// State needed to restore the position after a move is undone.
#[derive(Clone, Copy)]
struct Snapshot {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A chess position plus the history needed for draw detection.
#[derive(Clone)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Zobrist keys of every position reached, current one last.
    keys: Vec<u64>,
    snapshots: Vec<Snapshot>,
    san_history: Vec<String>,
    from_start: bool,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        let board = Board::default();
        Self {
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
            keys: vec![board.get_hash()],
            snapshots: Vec::new(),
            san_history: Vec::new(),
            from_start: true,
        }
    }

    /// Parse a position from FEN.
    ///
    /// The halfmove clock and fullmove number fields are optional and
    /// default to `0` and `1`.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let invalid = |reason: String| PositionError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(invalid(format!("expected at least 4 fields, found {}", fields.len())));
        }

        let placement = fields[..4].join(" ");
        let board = Board::from_str(&placement).map_err(|e| invalid(format!("{e:?}")))?;

        let halfmove_clock = match fields.get(4) {
            Some(text) => text
                .parse()
                .map_err(|_| invalid(format!("bad halfmove clock `{text}`")))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(text) => text
                .parse()
                .map_err(|_| invalid(format!("bad fullmove number `{text}`")))?,
            None => 1,
        };

        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
            keys: vec![board.get_hash()],
            snapshots: Vec::new(),
            san_history: Vec::new(),
            from_start: board == Board::default(),
        })
    }

    /// FEN of the current position.
    pub fn fen(&self) -> String {
        let board = self.board.to_string();
        let placement: Vec<&str> = board.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Zobrist identity covering pieces, side to move, castling and en passant.
    pub fn key(&self) -> u64 {
        self.board.get_hash()
    }

    /// The side to move.
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// The piece and its colour on `sq`.
    pub fn piece_on(&self, sq: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    /// Bitboard of `color`'s pieces of kind `piece`.
    pub fn pieces(&self, piece: Piece, color: Color) -> BitBoard {
        *self.board.pieces(piece) & *self.board.color_combined(color)
    }

    /// Bitboard of all pieces of kind `piece`, both colours.
    pub fn pieces_of_kind(&self, piece: Piece) -> BitBoard {
        *self.board.pieces(piece)
    }

    /// Square of `color`'s king.
    pub fn king_square(&self, color: Color) -> Square {
        self.board.king_square(color)
    }

    /// Pieces of `color` that attack `sq`.
    pub fn attackers(&self, sq: Square, color: Color) -> BitBoard {
        let occupied = *self.board.combined();
        let diagonal = *self.board.pieces(Piece::Bishop) | *self.board.pieces(Piece::Queen);
        let straight = *self.board.pieces(Piece::Rook) | *self.board.pieces(Piece::Queen);
        let attackers = get_pawn_attacks(sq, !color, *self.board.pieces(Piece::Pawn))
            | (get_knight_moves(sq) & *self.board.pieces(Piece::Knight))
            | (get_bishop_moves(sq, occupied) & diagonal)
            | (get_rook_moves(sq, occupied) & straight)
            | (get_king_moves(sq) & *self.board.pieces(Piece::King));
        attackers & *self.board.color_combined(color)
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Full move number, starting at 1.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// All legal moves, annotated with capture, promotion and check flags.
    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board)
            .map(|m| self.annotate(m))
            .collect()
    }

    /// Number of legal moves, without annotating them.
    pub fn legal_move_count(&self) -> usize {
        MoveGen::new_legal(&self.board).len()
    }

    /// Destination square of every legal move, without annotation.
    pub fn legal_destinations(&self) -> Vec<Square> {
        MoveGen::new_legal(&self.board)
            .map(|m| m.get_dest())
            .collect()
    }

    fn annotate(&self, m: ChessMove) -> Move {
        let source = m.get_source();
        let dest = m.get_dest();
        let piece = self.board.piece_on(source).unwrap_or(Piece::Pawn);
        let changes_file = source.get_file() != dest.get_file();

        let captured = match self.board.piece_on(dest) {
            Some(victim) => Some(victim),
            // A diagonal pawn move onto an empty square is en passant.
            None if piece == Piece::Pawn && changes_file => Some(Piece::Pawn),
            None => None,
        };
        let castling = piece == Piece::King
            && source.get_file().to_index().abs_diff(dest.get_file().to_index()) == 2;
        let gives_check = self.board.make_move_new(m).checkers().popcnt() > 0;

        Move::new(m, piece, captured, gives_check, castling)
    }

    /// Whether the side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    /// Whether the side to move is stalemated.
    pub fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    /// No pawns, rooks or queens, and at most one minor piece on the board.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = *self.board.pieces(Piece::Pawn)
            | *self.board.pieces(Piece::Rook)
            | *self.board.pieces(Piece::Queen);
        if heavy.popcnt() > 0 {
            return false;
        }
        let minors = *self.board.pieces(Piece::Knight) | *self.board.pieces(Piece::Bishop);
        minors.popcnt() <= 1
    }

    /// Whether the fifty-move rule applies.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// How many times the current position has occurred since the last
    /// irreversible move, including now.
    pub fn repetitions(&self) -> usize {
        let key = self.key();
        self.keys
            .iter()
            .rev()
            .take(self.halfmove_clock as usize + 1)
            .filter(|&&k| k == key)
            .count()
    }

    /// Whether the current position has occurred three times.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions() >= 3
    }

    /// Draws that do not depend on the side to move having legal moves.
    pub fn draw_by_rule(&self) -> Option<Outcome> {
        if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.is_fifty_move_draw() {
            Some(Outcome::FiftyMoveRule)
        } else if self.is_threefold_repetition() {
            Some(Outcome::ThreefoldRepetition)
        } else {
            None
        }
    }

    /// The game result, if the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => Some(Outcome::Checkmate {
                winner: !self.side_to_move(),
            }),
            BoardStatus::Stalemate => Some(Outcome::Stalemate),
            BoardStatus::Ongoing => self.draw_by_rule(),
        }
    }

    /// Whether the game is over by mate, stalemate or a draw rule.
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Apply `mv` for exploration. The move is undone when the guard drops.
    pub fn apply(&mut self, mv: &Move) -> Result<MoveGuard<'_>, PositionError> {
        if !self.board.legal(mv.raw()) {
            return Err(PositionError::IllegalMove {
                mv: mv.to_uci(),
                fen: self.fen(),
            });
        }
        let next = self.board.make_move_new(mv.raw());
        self.push(next, mv.piece() == Piece::Pawn || mv.is_capture());
        Ok(MoveGuard { position: self })
    }

    /// Pass the turn without moving. Clears en passant rights.
    ///
    /// Returns `None` when the side to move is in check.
    pub fn apply_null(&mut self) -> Option<MoveGuard<'_>> {
        let next = self.board.null_move()?;
        self.push(next, false);
        Some(MoveGuard { position: self })
    }

    /// Play `mv` permanently and record it in the SAN history.
    pub fn play(&mut self, mv: &Move) -> Result<(), PositionError> {
        if !self.board.legal(mv.raw()) {
            return Err(PositionError::IllegalMove {
                mv: mv.to_uci(),
                fen: self.fen(),
            });
        }
        let text = san::to_san(self, mv);
        let next = self.board.make_move_new(mv.raw());
        self.push(next, mv.piece() == Piece::Pawn || mv.is_capture());
        trace!(san = %text, "played move");
        self.san_history.push(text);
        Ok(())
    }

    /// Parse a SAN move and play it.
    pub fn play_san(&mut self, text: &str) -> Result<Move, PositionError> {
        let mv = san::parse_san(self, text)?;
        self.play(&mv)?;
        Ok(mv)
    }

    /// Parse a coordinate-notation move (`e2e4`, `e7e8q`) and play it.
    pub fn play_uci(&mut self, text: &str) -> Result<Move, PositionError> {
        let mv = san::parse_uci(self, text)?;
        self.play(&mv)?;
        Ok(mv)
    }

    /// Revert the last permanently played move.
    pub fn undo(&mut self) -> bool {
        if self.san_history.pop().is_none() {
            return false;
        }
        self.pop()
    }

    /// SAN of every move played since the position was created.
    pub fn san_history(&self) -> &[String] {
        &self.san_history
    }

    /// Whether the game started from the standard initial position, so the
    /// SAN history describes the whole game.
    pub fn is_from_start(&self) -> bool {
        self.from_start
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    fn push(&mut self, next: Board, irreversible: bool) {
        self.snapshots.push(Snapshot {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        if self.board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
        self.halfmove_clock = if irreversible { 0 } else { self.halfmove_clock + 1 };
        self.board = next;
        self.keys.push(next.get_hash());
    }

    fn pop(&mut self) -> bool {
        match self.snapshots.pop() {
            Some(snapshot) => {
                self.board = snapshot.board;
                self.halfmove_clock = snapshot.halfmove_clock;
                self.fullmove_number = snapshot.fullmove_number;
                self.keys.pop();
                true
            }
            None => false,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position").field("fen", &self.fen()).finish()
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

/// An applied exploratory move. Dropping the guard undoes it.
#[must_use = "dropping the guard immediately undoes the move"]
pub struct MoveGuard<'a> {
    position: &'a mut Position,
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.position.pop();
    }
}
