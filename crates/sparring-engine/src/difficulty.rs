//! Difficulty levels.
//!
//! Each level fixes how deep and how long the engine searches, how often it
//! deliberately plays a near-best move instead of the best one, how it
//! values draws, and which search features are switched on.

use std::time::Duration;

use tracing::warn;

use crate::error::ProfileError;

/// Level used when an unknown level is requested.
pub const DEFAULT_LEVEL: u8 = 3;

/// Search and evaluation settings for one difficulty level.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    /// Deepest iterative-deepening iteration.
    pub search_depth: i32,
    /// Wall-clock allowance per move.
    pub time_budget: Duration,
    /// Node allowance per move, including quiescence nodes.
    pub node_budget: u64,
    /// Probability of replacing the best move by a near-best alternative.
    pub randomness: f64,
    /// Engine-oriented value of a draw in centipawns.
    pub contempt: i32,
    /// Try a null move before the real ones at depth 3 and above.
    pub enable_null_move: bool,
    /// Search each iteration in a narrow window around the previous score.
    pub enable_aspiration: bool,
    /// Search depths 1, 2, ... instead of jumping to `search_depth`.
    pub enable_iterative_deepening: bool,
    /// Search late quiet moves one ply shallower first.
    pub enable_late_move_reduction: bool,
    /// Extra plies of captures, promotions and checks beyond the horizon.
    pub quiescence_depth: i32,
}

impl DifficultyProfile {
    /// Built-in profile for `level`. Unknown levels fall back to
    /// [`DEFAULT_LEVEL`] with a warning.
    pub fn for_level(level: u8) -> Self {
        Self::try_from(level).unwrap_or_else(|err| {
            warn!(%err, fallback = DEFAULT_LEVEL, "using default difficulty");
            Self::builtin(DEFAULT_LEVEL)
        })
    }

    fn builtin(level: u8) -> Self {
        let base = Self {
            search_depth: 3,
            time_budget: Duration::from_millis(2500),
            node_budget: 15_000,
            randomness: 0.15,
            contempt: 0,
            enable_null_move: true,
            enable_aspiration: false,
            enable_iterative_deepening: true,
            enable_late_move_reduction: true,
            quiescence_depth: 3,
        };
        match level {
            1 => Self {
                search_depth: 2,
                time_budget: Duration::from_millis(800),
                node_budget: 3_000,
                randomness: 0.40,
                contempt: -50,
                enable_null_move: false,
                enable_iterative_deepening: false,
                ..base
            },
            2 => Self {
                search_depth: 2,
                time_budget: Duration::from_millis(1500),
                node_budget: 8_000,
                randomness: 0.25,
                contempt: -20,
                enable_null_move: false,
                ..base
            },
            4 => Self {
                search_depth: 4,
                time_budget: Duration::from_millis(5000),
                node_budget: 60_000,
                randomness: 0.08,
                contempt: 10,
                enable_aspiration: true,
                ..base
            },
            5 => Self {
                search_depth: 5,
                time_budget: Duration::from_millis(10_000),
                node_budget: 200_000,
                randomness: 0.03,
                contempt: 20,
                enable_aspiration: true,
                ..base
            },
            _ => base,
        }
    }
}

impl TryFrom<u8> for DifficultyProfile {
    type Error = ProfileError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1..=5 => Ok(Self::builtin(level)),
            _ => Err(ProfileError::UnknownLevel { level }),
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::builtin(DEFAULT_LEVEL)
    }
}
