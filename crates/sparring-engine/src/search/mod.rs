//! Move selection: opening book, iterative deepening and the search driver.

pub mod control;
pub mod fallback;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;
pub mod variety;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sparring_core::{Move, Position, san};
use tracing::{debug, info, trace, warn};

use crate::book::OpeningBook;
use crate::difficulty::DifficultyProfile;
use crate::eval::{EvalBreakdown, EvalWeights, Evaluator};
use control::SearchBudget;
use heuristics::{HistoryTable, KillerTable};
use negamax::{INF, PvTable, SearchContext, SearchFeatures, negamax, relative};
use ordering::{MoveOrderer, OrderHints};
use tt::TranspositionCache;
use variety::{RootCandidate, VARIETY_TOLERANCE};

/// Half-width of the aspiration window around the previous iteration's score.
pub const ASPIRATION_WINDOW: i32 = 50;

/// Counters from the most recent [`SearchEngine::select_move`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Nodes visited, quiescence included.
    pub nodes_evaluated: u64,
    /// Deepest fully completed iteration.
    pub depth_reached: i32,
    /// Entries in the transposition cache after the search.
    pub cache_size: usize,
    /// Search speed over the whole call.
    pub nodes_per_second: u64,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

/// The move the engine chose and how it got there.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Move to play.
    pub best_move: Move,
    /// Centipawns, positive favours White.
    pub evaluation: i32,
    /// Expected continuation, starting with `best_move`.
    pub pv: Vec<Move>,
    /// Counters for the search that produced `best_move`.
    pub stats: SearchStats,
}

/// Per-call overrides of the difficulty profile's limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Replaces `search_depth`.
    pub depth: Option<i32>,
    /// Replaces `node_budget`.
    pub nodes: Option<u64>,
    /// Replaces `time_budget`.
    pub movetime: Option<Duration>,
}

/// Root search result for one iteration.
struct RootResult {
    best: Option<RootCandidate>,
    candidates: Vec<RootCandidate>,
}

/// A fully searched iteration.
struct Iteration {
    best: RootCandidate,
    candidates: Vec<RootCandidate>,
    pv: Vec<Move>,
}

/// Single-threaded chess move selector.
///
/// Owns the evaluator, the transposition cache and the ordering tables, so
/// knowledge carries over between moves of one game until
/// [`clear_cache`](Self::clear_cache) or [`reset`](Self::reset).
pub struct SearchEngine {
    evaluator: Evaluator,
    orderer: MoveOrderer,
    cache: TranspositionCache,
    killers: KillerTable,
    history: HistoryTable,
    book: OpeningBook,
    use_book: bool,
    profile: DifficultyProfile,
    stats: SearchStats,
    rng: StdRng,
}

impl SearchEngine {
    /// Engine with default weights and the built-in opening book.
    pub fn new(profile: DifficultyProfile) -> Self {
        Self::with_weights(profile, EvalWeights::default())
    }

    pub fn with_weights(profile: DifficultyProfile, weights: EvalWeights) -> Self {
        let mut evaluator = Evaluator::new(weights);
        evaluator.set_contempt(profile.contempt);
        Self {
            evaluator,
            orderer: MoveOrderer::default(),
            cache: TranspositionCache::new(),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            book: OpeningBook::default(),
            use_book: true,
            profile,
            stats: SearchStats::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the opening book.
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = book;
        self
    }

    /// Seed the random source used for book picks and move variety.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_book_enabled(&mut self, enabled: bool) {
        self.use_book = enabled;
    }

    pub fn book_enabled(&self) -> bool {
        self.use_book
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Switch to another profile. Cached scores carry the old contempt, so
    /// the cache is cleared.
    pub fn set_profile(&mut self, profile: DifficultyProfile) {
        self.evaluator.set_contempt(profile.contempt);
        self.profile = profile;
        self.cache.clear();
        debug!(contempt = self.profile.contempt, "profile changed, cache cleared");
    }

    /// Switch to a built-in level (1-5).
    pub fn set_difficulty(&mut self, level: u8) {
        self.set_profile(DifficultyProfile::for_level(level));
    }

    pub fn weights(&self) -> &EvalWeights {
        self.evaluator.weights()
    }

    pub fn set_weights(&mut self, weights: EvalWeights) {
        self.evaluator.set_weights(weights);
        self.cache.clear();
        debug!("weights changed, cache cleared");
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Number of positions in the transposition cache.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Drop cached evaluations and history scores.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.history.clear();
        debug!("cache cleared");
    }

    /// Return to a freshly constructed state, keeping profile, weights and
    /// book.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.history.clear();
        self.killers.clear();
        self.stats = SearchStats::default();
        debug!("engine reset");
    }

    /// Static evaluation of `pos`, White-relative, memoised.
    pub fn evaluate(&mut self, pos: &Position) -> i32 {
        self.evaluator.evaluate(pos, &mut self.cache)
    }

    /// Per-term evaluation, bypassing the cache.
    pub fn breakdown(&self, pos: &Position) -> EvalBreakdown {
        self.evaluator.breakdown(pos)
    }

    /// A legal move chosen by simple rules, without searching.
    pub fn fallback_move(&self, pos: &mut Position) -> Option<Move> {
        fallback::fallback_move(pos)
    }

    /// Choose a move for the side to move using the profile's limits.
    ///
    /// Returns `None` when the side to move has no legal moves; the caller
    /// can tell checkmate from stalemate through [`Position::outcome`].
    pub fn select_move(&mut self, pos: &mut Position) -> Option<SearchOutcome> {
        self.select_move_with_limits(pos, SearchLimits::default())
    }

    /// Like [`select_move`](Self::select_move) with per-call limits.
    pub fn select_move_with_limits(
        &mut self,
        pos: &mut Position,
        limits: SearchLimits,
    ) -> Option<SearchOutcome> {
        let side = pos.side_to_move();
        if self.evaluator.perspective() != side {
            self.evaluator.set_perspective(side);
            self.cache.clear();
            debug!(?side, "engine colour changed, cache cleared");
        }
        self.stats = SearchStats {
            cache_size: self.cache.len(),
            ..SearchStats::default()
        };

        let moves = pos.legal_moves();
        if moves.is_empty() {
            debug!(outcome = ?pos.outcome(), "no legal moves");
            return None;
        }

        if let Some(outcome) = self.book_move(pos) {
            return Some(outcome);
        }

        if let [only] = moves.as_slice() {
            let evaluation = match pos.apply(only) {
                Ok(child) => self.evaluator.evaluate(&child, &mut self.cache),
                Err(_) => 0,
            };
            self.stats.cache_size = self.cache.len();
            debug!(mv = %only, evaluation, "single legal move");
            return Some(SearchOutcome {
                best_move: *only,
                evaluation,
                pv: vec![*only],
                stats: self.stats,
            });
        }

        self.iterative_deepening(pos, limits)
    }

    /// Book reply for positions reached from the standard start.
    fn book_move(&mut self, pos: &Position) -> Option<SearchOutcome> {
        if !self.use_book || !pos.is_from_start() {
            return None;
        }
        let Some(candidates) = self.book.lookup(pos.san_history()) else {
            debug!(ply = pos.san_history().len(), "out of book");
            return None;
        };
        let pick = candidates.choose(&mut self.rng)?;
        match san::parse_san(pos, pick) {
            Ok(mv) => {
                debug!(mv = %mv, san = %pick, "book move");
                Some(SearchOutcome {
                    best_move: mv,
                    evaluation: 0,
                    pv: vec![mv],
                    stats: self.stats,
                })
            }
            Err(err) => {
                warn!(%err, san = %pick, "unusable book entry");
                None
            }
        }
    }

    fn iterative_deepening(
        &mut self,
        pos: &mut Position,
        limits: SearchLimits,
    ) -> Option<SearchOutcome> {
        let profile = &self.profile;
        let max_depth = limits.depth.unwrap_or(profile.search_depth).max(1);
        let first_depth = if profile.enable_iterative_deepening { 1 } else { max_depth };
        let use_aspiration = profile.enable_aspiration;
        let randomness = profile.randomness;
        let variety_margin = (randomness > 0.0).then_some(VARIETY_TOLERANCE);

        let budget = SearchBudget::new(
            Some(limits.movetime.unwrap_or(profile.time_budget)),
            Some(limits.nodes.unwrap_or(profile.node_budget)),
        );

        self.killers.clear();
        let mut ctx = SearchContext {
            nodes: 0,
            stopped: false,
            search_depth: first_depth,
            prev_pv: Vec::new(),
            pv: PvTable::new(),
            features: SearchFeatures {
                null_move: profile.enable_null_move,
                late_move_reduction: profile.enable_late_move_reduction,
                quiescence_depth: profile.quiescence_depth,
            },
            budget,
            evaluator: &self.evaluator,
            orderer: &self.orderer,
            cache: &mut self.cache,
            killers: &mut self.killers,
            history: &mut self.history,
        };

        let mut completed: Option<Iteration> = None;
        let mut partial: Option<RootCandidate> = None;
        let mut depth_reached = 0;
        let mut prev_score = 0;

        for depth in first_depth..=max_depth {
            ctx.search_depth = depth;

            let aspirate = use_aspiration && depth > 1 && completed.is_some();
            let (alpha, beta) = if aspirate {
                (prev_score - ASPIRATION_WINDOW, prev_score + ASPIRATION_WINDOW)
            } else {
                (-INF, INF)
            };

            let mut result = search_root(pos, depth, alpha, beta, variety_margin, &mut ctx);
            if aspirate
                && !ctx.stopped
                && result
                    .best
                    .is_none_or(|best| best.score <= alpha || best.score >= beta)
            {
                debug!(depth, alpha, beta, "aspiration failed, re-searching");
                result = search_root(pos, depth, -INF, INF, variety_margin, &mut ctx);
            }

            if ctx.stopped {
                if completed.is_none() {
                    partial = result.best;
                }
                debug!(depth, nodes = ctx.nodes, "budget exhausted");
                break;
            }
            let Some(best) = result.best else {
                break;
            };

            let pv = ctx.pv.root_pv();
            prev_score = best.score;
            depth_reached = depth;
            let elapsed = ctx.budget.elapsed();
            info!(
                depth,
                score = best.score,
                nodes = ctx.nodes,
                nps = nodes_per_second(ctx.nodes, elapsed),
                pv = %format_pv(&pv),
                "iteration complete"
            );
            ctx.prev_pv = pv.clone();
            completed = Some(Iteration {
                best,
                candidates: result.candidates,
                pv,
            });
        }

        let nodes = ctx.nodes;
        let elapsed = ctx.budget.elapsed();
        drop(ctx);

        let (chosen, pv) = match completed {
            Some(iteration) => {
                let chosen = variety::substitute(
                    iteration.best,
                    &iteration.candidates,
                    randomness,
                    VARIETY_TOLERANCE,
                    &mut self.rng,
                );
                let pv = if chosen.mv == iteration.best.mv {
                    iteration.pv
                } else {
                    vec![chosen.mv]
                };
                (chosen, pv)
            }
            None => {
                let candidate = partial.or_else(|| {
                    fallback::fallback_move(pos).map(|mv| RootCandidate { mv, score: 0 })
                })?;
                debug!(mv = %candidate.mv, "no completed iteration, using partial result");
                (candidate, vec![candidate.mv])
            }
        };

        self.stats = SearchStats {
            nodes_evaluated: nodes,
            depth_reached,
            cache_size: self.cache.len(),
            nodes_per_second: nodes_per_second(nodes, elapsed),
            elapsed,
        };

        let evaluation = relative(chosen.score, pos.side_to_move());
        info!(
            mv = %chosen.mv,
            evaluation,
            depth = depth_reached,
            nodes,
            "move selected"
        );

        Some(SearchOutcome {
            best_move: chosen.mv,
            evaluation,
            pv,
            stats: self.stats,
        })
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DifficultyProfile::default())
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("profile", &self.profile)
            .field("cache", &self.cache.len())
            .field("use_book", &self.use_book)
            .finish()
    }
}

/// Search every root move.
///
/// With `variety_margin` set, moves after the first are searched with alpha
/// lowered to `best - margin` so that any move within the margin gets an
/// exact score. A move whose search was cut short by the budget is dropped,
/// unless it is the first one.
fn search_root(
    pos: &mut Position,
    depth: i32,
    alpha: i32,
    beta: i32,
    variety_margin: Option<i32>,
    ctx: &mut SearchContext<'_>,
) -> RootResult {
    ctx.pv.clear_ply(0);

    let ordered = {
        let hints = OrderHints {
            pv_move: ctx.prev_pv.first().copied(),
            killers: &*ctx.killers,
            history: &*ctx.history,
        };
        ctx.orderer.order(pos.legal_moves(), 0, depth, &hints)
    };

    let mut best: Option<RootCandidate> = None;
    let mut best_score = -INF;
    let mut candidates = Vec::with_capacity(ordered.len());

    for mv in &ordered {
        if ctx.stopped {
            break;
        }

        let floor = match variety_margin {
            Some(margin) if best.is_some() => alpha.max(best_score - margin),
            _ => alpha.max(best_score),
        };

        let mut child = match pos.apply(mv) {
            Ok(child) => child,
            Err(err) => {
                trace!(%err, "skipping root move");
                continue;
            }
        };
        let score = -negamax(&mut child, depth - 1, 1, -beta, -floor, ctx);
        drop(child);

        if ctx.stopped && best.is_some() {
            break;
        }

        if score > floor {
            candidates.push(RootCandidate { mv: *mv, score });
        }
        if score > best_score {
            best_score = score;
            best = Some(RootCandidate { mv: *mv, score });
            ctx.pv.update(0, *mv);
            ctx.history.reward(mv, depth);
        }
        if best_score >= beta {
            break;
        }
    }

    RootResult { best, candidates }
}

fn nodes_per_second(nodes: u64, elapsed: Duration) -> u64 {
    let millis = elapsed.as_millis().max(1) as u64;
    nodes.saturating_mul(1000) / millis
}

fn format_pv(pv: &[Move]) -> String {
    pv.iter()
        .map(Move::to_uci)
        .collect::<Vec<_>>()
        .join(" ")
}
