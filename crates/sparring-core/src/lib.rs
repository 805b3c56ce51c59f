//! Position handling for sparring.
//!
//! Wraps the `chess` crate's move generator in an owned [`Position`] with
//! guarded apply/undo, draw bookkeeping and SAN support. The search engine
//! only ever talks to chess rules through this crate.

pub mod error;
pub mod moves;
pub mod position;
pub mod san;

pub use chess::{ALL_SQUARES, BitBoard, Color, EMPTY, File, Piece, Rank, Square};
pub use error::PositionError;
pub use moves::Move;
pub use position::{MoveGuard, Outcome, Position, STARTING_FEN};
