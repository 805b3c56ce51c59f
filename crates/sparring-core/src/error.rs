//! Errors raised while building or mutating a [`Position`](crate::Position).

/// Errors that can occur when constructing a position or applying moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The FEN string could not be parsed.
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
        /// Why the parser rejected it.
        reason: String,
    },

    /// A move was not legal in the position it was applied to.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove {
        /// The move in coordinate notation.
        mv: String,
        /// The position it was applied to.
        fen: String,
    },

    /// A SAN or coordinate string did not match any legal move.
    #[error("no legal move matches `{text}`")]
    UnknownMove {
        /// The move text as supplied.
        text: String,
    },
}
