//! Search budget: node and wall-clock limits polled by the search.

use std::time::{Duration, Instant};

/// Nodes between two budget checks.
pub const CHECK_INTERVAL: u64 = 1000;

/// Decides when a search has used up its allowance.
///
/// The limits are only consulted every [`CHECK_INTERVAL`] nodes, so a search
/// may overshoot by up to one interval. Once exhausted the budget stays
/// exhausted.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    start: Instant,
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    exhausted: bool,
}

impl SearchBudget {
    /// Start the clock now with the given limits.
    pub fn new(time_limit: Option<Duration>, node_limit: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            time_limit,
            node_limit,
            exhausted: false,
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    /// Poll after counting a node. Returns `true` once the budget is spent.
    pub fn should_stop(&mut self, nodes: u64) -> bool {
        if self.exhausted {
            return true;
        }
        if nodes % CHECK_INTERVAL != 0 {
            return false;
        }
        let over_nodes = self.node_limit.is_some_and(|limit| nodes >= limit);
        let over_time = self
            .time_limit
            .is_some_and(|limit| self.start.elapsed() >= limit);
        self.exhausted = over_nodes || over_time;
        self.exhausted
    }

    /// Whether a previous poll found the budget spent.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
