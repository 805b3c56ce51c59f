//! Standard Algebraic Notation rendering and parsing.

use chess::{MoveGen, Piece};

use crate::error::PositionError;
use crate::moves::{Move, piece_letter, square_name};
use crate::position::Position;

/// Render `mv` in SAN, including check and mate suffixes.
///
/// `mv` must be legal in `pos`.
pub fn to_san(pos: &Position, mv: &Move) -> String {
    let mut text = if mv.is_castling() {
        if mv.dest().get_file().to_index() > mv.source().get_file().to_index() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        body(pos, mv)
    };

    let after = pos.board().make_move_new(mv.raw());
    if after.checkers().popcnt() > 0 {
        let mated = MoveGen::new_legal(&after).len() == 0;
        text.push(if mated { '#' } else { '+' });
    }
    text
}

fn body(pos: &Position, mv: &Move) -> String {
    let mut text = String::new();
    let dest = square_name(mv.dest());

    if mv.piece() == Piece::Pawn {
        if mv.is_capture() {
            text.push_str(&square_name(mv.source())[..1]);
            text.push('x');
        }
        text.push_str(&dest);
        if let Some(promo) = mv.promotion() {
            text.push('=');
            text.push(piece_letter(promo));
        }
        return text;
    }

    text.push(piece_letter(mv.piece()));

    let rivals: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|other| {
            other.piece() == mv.piece() && other.dest() == mv.dest() && other.source() != mv.source()
        })
        .collect();
    if !rivals.is_empty() {
        let origin = square_name(mv.source());
        let same_file = rivals
            .iter()
            .any(|r| r.source().get_file() == mv.source().get_file());
        let same_rank = rivals
            .iter()
            .any(|r| r.source().get_rank() == mv.source().get_rank());
        if !same_file {
            text.push_str(&origin[..1]);
        } else if !same_rank {
            text.push_str(&origin[1..]);
        } else {
            text.push_str(&origin);
        }
    }

    if mv.is_capture() {
        text.push('x');
    }
    text.push_str(&dest);
    text
}

/// Strip annotations so `Nf3+`, `Nf3!?` and `Nf3` compare equal.
fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
        .replace('=', "")
}

/// Find the legal move described by a SAN string.
pub fn parse_san(pos: &Position, text: &str) -> Result<Move, PositionError> {
    let wanted = normalize(text);
    pos.legal_moves()
        .into_iter()
        .find(|mv| normalize(&to_san(pos, mv)) == wanted)
        .ok_or_else(|| PositionError::UnknownMove {
            text: text.to_string(),
        })
}

/// Find the legal move described by coordinate notation, e.g. `e7e8q`.
pub fn parse_uci(pos: &Position, text: &str) -> Result<Move, PositionError> {
    let wanted = text.trim().to_ascii_lowercase();
    pos.legal_moves()
        .into_iter()
        .find(|mv| mv.to_uci() == wanted)
        .ok_or_else(|| PositionError::UnknownMove {
            text: text.to_string(),
        })
}
