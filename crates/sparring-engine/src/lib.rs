//! Move search and evaluation for sparring.

pub mod book;
pub mod difficulty;
pub mod error;
pub mod eval;
pub mod search;

pub use book::{DEFAULT_BOOK, OpeningBook};
pub use difficulty::DifficultyProfile;
pub use error::ProfileError;
pub use eval::{EvalBreakdown, EvalWeights, Evaluator, MATE_SCORE, MATE_THRESHOLD};
pub use search::tt::TranspositionCache;
pub use search::{SearchEngine, SearchLimits, SearchOutcome, SearchStats};
