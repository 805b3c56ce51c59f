//! Negamax alpha-beta search with null-move pruning, late-move reduction
//! and quiescence.
//!
//! Scores inside the search are relative to the side to move. Mate is
//! `-(MATE_SCORE - ply)` for the side that is mated, so shorter mates score
//! higher.

use sparring_core::{Color, Move, Position};
use tracing::trace;

use crate::eval::{Evaluator, MATE_SCORE};
use crate::search::control::SearchBudget;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::{MoveOrderer, OrderHints, order_tactical};
use crate::search::tt::{Bound, TranspositionCache};

/// Larger than any reachable score.
pub const INF: i32 = 100_000;

/// Maximum search ply for table sizing and recursion limits.
pub const MAX_PLY: usize = 64;

/// Move index from which quiet moves are reduced.
const LMR_MIN_INDEX: usize = 4;

/// Triangular principal-variation table.
///
/// Row `ply` holds the best line found from that ply onward.
pub struct PvTable {
    moves: Box<[[Option<Move>; MAX_PLY]; MAX_PLY]>,
    len: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            moves: Box::new([[None; MAX_PLY]; MAX_PLY]),
            len: [0; MAX_PLY],
        }
    }

    /// Forget the line at `ply`; called on entry to every node.
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Make `mv` followed by the child's line the line at `ply`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let child = ply + 1;
        let copy_len = if child < MAX_PLY {
            self.len[child].min(MAX_PLY - 1)
        } else {
            0
        };
        let (top, bottom) = self.moves.split_at_mut(child.min(MAX_PLY));
        top[ply][0] = Some(mv);
        if copy_len > 0 {
            top[ply][1..1 + copy_len].copy_from_slice(&bottom[0][..copy_len]);
        }
        self.len[ply] = 1 + copy_len;
    }

    /// The line from the root.
    pub fn root_pv(&self) -> Vec<Move> {
        self.moves[0][..self.len[0]].iter().flatten().copied().collect()
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Which pruning features a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFeatures {
    pub null_move: bool,
    pub late_move_reduction: bool,
    pub quiescence_depth: i32,
}

/// Search state threaded through negamax calls.
pub(crate) struct SearchContext<'a> {
    /// Nodes visited, including quiescence nodes.
    pub nodes: u64,
    /// Set once the budget runs out; never cleared during a search.
    pub stopped: bool,
    /// Depth of the current iterative-deepening iteration.
    pub search_depth: i32,
    /// Root PV of the previous iteration, used as an ordering hint.
    pub prev_pv: Vec<Move>,
    pub pv: PvTable,
    pub features: SearchFeatures,
    pub budget: SearchBudget,
    pub evaluator: &'a Evaluator,
    pub orderer: &'a MoveOrderer,
    pub cache: &'a mut TranspositionCache,
    pub killers: &'a mut KillerTable,
    pub history: &'a mut HistoryTable,
}

impl SearchContext<'_> {
    /// Count a node and poll the budget.
    fn tick(&mut self) -> bool {
        self.nodes += 1;
        if self.budget.should_stop(self.nodes) {
            self.stopped = true;
        }
        self.stopped
    }

    /// Static evaluation from the side to move's point of view.
    pub fn static_eval(&mut self, pos: &Position) -> i32 {
        let white = self.evaluator.evaluate(pos, self.cache);
        relative(white, pos.side_to_move())
    }

    /// Contempt from the side to move's point of view.
    fn draw_value(&self, pos: &Position) -> i32 {
        relative(self.evaluator.draw_score(), pos.side_to_move())
    }

    fn no_moves_value(&self, pos: &Position, ply: usize) -> i32 {
        if pos.in_check() {
            -(MATE_SCORE - ply as i32)
        } else {
            self.draw_value(pos)
        }
    }
}

/// Convert a White-relative score to the point of view of `color`.
pub fn relative(score: i32, color: Color) -> i32 {
    match color {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Rule draws inside the tree, where one repetition already counts.
fn is_search_draw(pos: &Position) -> bool {
    pos.is_insufficient_material() || pos.is_fifty_move_draw() || pos.repetitions() >= 2
}

/// Negamax alpha-beta search below the root.
pub(crate) fn negamax(
    pos: &mut Position,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.pv.clear_ply(ply);

    if ctx.stopped || ctx.tick() {
        return ctx.static_eval(pos);
    }

    let key = pos.key();
    if ply > 0
        && let Some(score) = ctx
            .cache
            .probe(key)
            .and_then(|slot| slot.cutoff(depth, alpha, beta, ply))
    {
        return score;
    }

    if ply > 0 && is_search_draw(pos) {
        return ctx.draw_value(pos);
    }

    if depth <= 0 {
        return qsearch(pos, ply, alpha, beta, ctx.features.quiescence_depth, ctx);
    }

    if ply >= MAX_PLY - 1 {
        return ctx.static_eval(pos);
    }

    let in_check = pos.in_check();

    if ctx.features.null_move && ply > 0 && !in_check && depth >= 3 {
        let reduction = if depth > 6 { 3 } else { 2 };
        if let Some(mut passed) = pos.apply_null() {
            let score = -negamax(&mut passed, depth - 1 - reduction, ply + 1, -beta, -beta + 1, ctx);
            drop(passed);
            if !ctx.stopped && score >= beta {
                return beta;
            }
        }
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return ctx.no_moves_value(pos, ply);
    }

    let ordered = {
        let hints = OrderHints {
            pv_move: ctx.prev_pv.get(ply).copied(),
            killers: &*ctx.killers,
            history: &*ctx.history,
        };
        ctx.orderer.order(moves, ply, ctx.search_depth, &hints)
    };

    let original_alpha = alpha;
    let mut best_score = -INF;
    let mut searched = 0;

    for (index, mv) in ordered.iter().enumerate() {
        if ctx.stopped {
            break;
        }

        let mut child = match pos.apply(mv) {
            Ok(child) => child,
            Err(err) => {
                trace!(%err, "skipping move");
                continue;
            }
        };

        let reduce = ctx.features.late_move_reduction
            && index >= LMR_MIN_INDEX
            && depth > 2
            && !mv.is_capture()
            && !mv.gives_check();

        let score = if reduce {
            let reduced = -negamax(&mut child, depth - 2, ply + 1, -alpha - 1, -alpha, ctx);
            if reduced > alpha {
                -negamax(&mut child, depth - 1, ply + 1, -beta, -alpha, ctx)
            } else {
                reduced
            }
        } else {
            -negamax(&mut child, depth - 1, ply + 1, -beta, -alpha, ctx)
        };
        drop(child);
        searched += 1;

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
            ctx.pv.update(ply, *mv);
            ctx.history.reward(mv, depth);
        }
        if alpha >= beta {
            if mv.is_quiet() {
                ctx.killers.store(ply, *mv);
            }
            ctx.history.reward(mv, depth);
            break;
        }
    }

    if searched == 0 {
        return ctx.static_eval(pos);
    }

    if !ctx.stopped {
        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        ctx.cache.store(key, best_score, depth, bound, ply);
    }

    best_score
}

/// Quiescence search: follow captures, promotions and checks for up to
/// `remaining` plies before trusting the static evaluation.
pub(crate) fn qsearch(
    pos: &mut Position,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    remaining: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    if ctx.stopped || ctx.tick() {
        return ctx.static_eval(pos);
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return ctx.no_moves_value(pos, ply);
    }
    if is_search_draw(pos) {
        return ctx.draw_value(pos);
    }

    // Stand pat: the side to move may decline every capture.
    let stand_pat = ctx.static_eval(pos);
    if remaining <= 0 || ply >= MAX_PLY - 1 {
        return stand_pat;
    }
    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut tactical: Vec<Move> = moves.into_iter().filter(Move::is_tactical).collect();
    order_tactical(&mut tactical);

    for mv in &tactical {
        if ctx.stopped {
            break;
        }
        let mut child = match pos.apply(mv) {
            Ok(child) => child,
            Err(err) => {
                trace!(%err, "skipping move");
                continue;
            }
        };
        let score = -qsearch(&mut child, ply + 1, -beta, -alpha, remaining - 1, ctx);
        drop(child);

        if score >= beta {
            return score;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::control::CHECK_INTERVAL;

    struct Tables {
        evaluator: Evaluator,
        orderer: MoveOrderer,
        cache: TranspositionCache,
        killers: KillerTable,
        history: HistoryTable,
    }

    impl Tables {
        fn new() -> Self {
            Self {
                evaluator: Evaluator::default(),
                orderer: MoveOrderer::default(),
                cache: TranspositionCache::new(),
                killers: KillerTable::new(),
                history: HistoryTable::new(),
            }
        }

        fn context(&mut self, features: SearchFeatures, budget: SearchBudget) -> SearchContext<'_> {
            SearchContext {
                nodes: 0,
                stopped: false,
                search_depth: 4,
                prev_pv: Vec::new(),
                pv: PvTable::new(),
                features,
                budget,
                evaluator: &self.evaluator,
                orderer: &self.orderer,
                cache: &mut self.cache,
                killers: &mut self.killers,
                history: &mut self.history,
            }
        }
    }

    fn features(null_move: bool) -> SearchFeatures {
        SearchFeatures {
            null_move,
            late_move_reduction: false,
            quiescence_depth: 0,
        }
    }

    /// Full-window search one ply below the root; returns score and nodes.
    fn search_below_root(fen: &str, depth: i32, null_move: bool) -> (i32, u64) {
        let mut pos = Position::from_fen(fen).unwrap();
        let mut tables = Tables::new();
        let mut ctx = tables.context(features(null_move), SearchBudget::unlimited());
        let score = negamax(&mut pos, depth, 1, -INF, INF, &mut ctx);
        (score, ctx.nodes)
    }

    const QUIET: &str = "4k3/pp3ppp/8/8/8/8/PP3PPP/4K3 w - - 0 1";

    fn legal(pos: &Position, uci: &str) -> Move {
        pos.legal_moves()
            .into_iter()
            .find(|m| m.to_uci() == uci)
            .unwrap()
    }

    #[test]
    fn pv_update_copies_child_line() {
        let mut pos = Position::new();
        let e4 = legal(&pos, "e2e4");
        pos.play(&e4).unwrap();
        let e5 = legal(&pos, "e7e5");

        let mut pv = PvTable::new();
        pv.clear_ply(1);
        pv.update(1, e5);
        pv.clear_ply(0);
        pv.update(0, e4);
        assert_eq!(pv.root_pv(), vec![e4, e5]);

        pv.clear_ply(0);
        assert!(pv.root_pv().is_empty());
    }

    #[test]
    fn relative_flips_for_black() {
        assert_eq!(relative(120, Color::White), 120);
        assert_eq!(relative(120, Color::Black), -120);
    }

    #[test]
    fn repetition_counts_once_inside_search() {
        let mut pos = Position::new();
        for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
            pos.play_san(san).unwrap();
        }
        assert!(is_search_draw(&pos));
        assert!(!pos.is_threefold_repetition());
    }

    #[test]
    fn null_move_tried_at_depth_three() {
        // With an infinite beta the null search can never cut, so it only
        // adds nodes.
        let (plain_score, plain_nodes) = search_below_root(QUIET, 3, false);
        let (null_score, null_nodes) = search_below_root(QUIET, 3, true);
        assert_eq!(null_score, plain_score);
        assert!(null_nodes > plain_nodes);
    }

    #[test]
    fn null_move_skipped_below_depth_three() {
        assert_eq!(search_below_root(QUIET, 2, true), search_below_root(QUIET, 2, false));
    }

    #[test]
    fn null_move_skipped_in_check() {
        let checked = "4k3/pp3ppp/8/8/8/8/PP3PPP/4K2r w - - 0 1";
        assert!(Position::from_fen(checked).unwrap().in_check());
        assert_eq!(search_below_root(checked, 3, true), search_below_root(checked, 3, false));
    }

    #[test]
    fn stopped_search_returns_static_eval() {
        let mut pos = Position::from_fen(QUIET).unwrap();
        let mut tables = Tables::new();
        let mut ctx = tables.context(features(false), SearchBudget::unlimited());
        let expected = ctx.static_eval(&pos);
        ctx.stopped = true;
        assert_eq!(negamax(&mut pos, 3, 1, -INF, INF, &mut ctx), expected);
        assert_eq!(qsearch(&mut pos, 1, -INF, INF, 3, &mut ctx), expected);
        assert_eq!(ctx.nodes, 0);
    }

    #[test]
    fn nothing_searched_returns_static_eval() {
        // The budget trips inside the null-move search, before any real
        // move is tried.
        let mut pos = Position::from_fen(QUIET).unwrap();
        let mut tables = Tables::new();
        let mut ctx = tables.context(features(true), SearchBudget::new(None, Some(1)));
        let expected = ctx.static_eval(&pos);
        ctx.nodes = CHECK_INTERVAL - 2;
        let score = negamax(&mut pos, 3, 1, -INF, INF, &mut ctx);
        assert!(ctx.stopped);
        assert_eq!(ctx.nodes, CHECK_INTERVAL);
        assert_eq!(score, expected);
    }
}
