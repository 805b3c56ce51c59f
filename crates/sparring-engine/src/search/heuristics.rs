//! Killer and history tables for quiet move ordering.

use sparring_core::Move;

use crate::search::negamax::MAX_PLY;

/// Two killer moves per ply: quiet moves that caused beta cutoffs there.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    /// Record `mv` as the primary killer at `ply`, demoting the old primary.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// `Some(0)` for the primary killer, `Some(1)` for the secondary.
    pub fn rank(&self, ply: usize, mv: Move) -> Option<usize> {
        let slots = self.slots.get(ply)?;
        slots.iter().position(|k| *k == Some(mv))
    }

    pub fn clear(&mut self) {
        self.slots = [[None; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper bound on a single history entry.
const HISTORY_MAX: i32 = 16_384;

/// History heuristic indexed by `[from][to]`.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    table: Box<[[i32; 64]; 64]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[0; 64]; 64]),
        }
    }

    /// Credit `mv` with `depth²`.
    pub fn reward(&mut self, mv: &Move, depth: i32) {
        let depth = depth.max(1);
        let entry = &mut self.table[mv.source().to_index()][mv.dest().to_index()];
        *entry = (*entry + depth * depth).min(HISTORY_MAX);
    }

    pub fn score(&self, mv: &Move) -> i32 {
        self.table[mv.source().to_index()][mv.dest().to_index()]
    }

    pub fn clear(&mut self) {
        for row in self.table.iter_mut() {
            row.fill(0);
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
