//! Engine configuration errors.

/// Errors raised while building a difficulty profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Difficulty levels run from 1 to 5.
    #[error("unknown difficulty level {level} (expected 1-5)")]
    UnknownLevel {
        /// The level that was requested.
        level: u8,
    },
}
