//! UCI protocol errors.

use std::path::PathBuf;

use sparring_core::PositionError;
use sparring_engine::ProfileError;

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// The FEN or one of the listed moves was rejected.
    #[error("bad position: {0}")]
    Position(#[from] PositionError),

    /// A `go` parameter is missing its value.
    #[error("missing value for go parameter `{param}`")]
    MissingGoValue {
        /// The parameter name.
        param: String,
    },

    /// A `go` parameter value could not be parsed.
    #[error("invalid value `{value}` for go parameter `{param}`")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The offending value.
        value: String,
    },

    /// `setoption` without `name`.
    #[error("malformed setoption command")]
    MalformedOption,

    /// An option this engine does not offer.
    #[error("unknown option `{name}`")]
    UnknownOption {
        /// The option name as sent.
        name: String,
    },

    /// An option value of the wrong type.
    #[error("invalid value `{value}` for option `{name}`")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The offending value.
        value: String,
    },

    /// The requested difficulty level does not exist.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The weights file could not be read or parsed.
    #[error("cannot load weights from {}: {reason}", path.display())]
    Weights {
        /// The file that was requested.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// An I/O error occurred while talking to the GUI.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
