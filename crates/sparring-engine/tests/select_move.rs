use sparring_core::{Color, Outcome, Position};
use sparring_engine::{
    DifficultyProfile, MATE_SCORE, MATE_THRESHOLD, OpeningBook, SearchEngine,
};

const SCHOLARS_MATE: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

fn plain_profile(depth: i32) -> DifficultyProfile {
    DifficultyProfile {
        search_depth: depth,
        randomness: 0.0,
        contempt: 0,
        enable_null_move: false,
        enable_aspiration: false,
        enable_late_move_reduction: false,
        quiescence_depth: 0,
        ..DifficultyProfile::default()
    }
}

fn engine_without_book(profile: DifficultyProfile) -> SearchEngine {
    let mut engine = SearchEngine::new(profile).with_seed(42);
    engine.set_book_enabled(false);
    engine
}

/// Unpruned minimax with the engine's leaf conventions: side-to-move
/// relative scores, mate as `-(MATE_SCORE - ply)`, rule draws worth zero.
fn minimax(engine: &mut SearchEngine, pos: &mut Position, depth: i32, ply: i32) -> i32 {
    let moves = pos.legal_moves();
    let leaf = depth == 0;

    if !leaf && ply > 0 && rule_draw(pos) {
        return 0;
    }
    if moves.is_empty() {
        return if pos.in_check() { -(MATE_SCORE - ply) } else { 0 };
    }
    if leaf {
        if rule_draw(pos) {
            return 0;
        }
        let white = engine.evaluate(pos);
        return match pos.side_to_move() {
            Color::White => white,
            Color::Black => -white,
        };
    }

    moves
        .iter()
        .map(|mv| {
            let mut child = pos.apply(mv).unwrap();
            -minimax(engine, &mut child, depth - 1, ply + 1)
        })
        .max()
        .unwrap()
}

fn rule_draw(pos: &Position) -> bool {
    pos.is_insufficient_material() || pos.is_fifty_move_draw() || pos.repetitions() >= 2
}

#[test]
fn single_legal_move_skips_search() {
    let mut pos = Position::from_fen("7k/8/8/8/8/8/6q1/7K w - - 0 1").unwrap();
    assert_eq!(pos.legal_move_count(), 1);
    let mut engine = engine_without_book(DifficultyProfile::for_level(5));
    let outcome = engine.select_move(&mut pos).unwrap();
    assert_eq!(outcome.best_move.to_uci(), "h1g2");
    assert_eq!(outcome.stats.nodes_evaluated, 0);
}

#[test]
fn mate_in_one_is_found() {
    let mut pos = Position::from_fen(SCHOLARS_MATE).unwrap();
    let mut engine = engine_without_book(DifficultyProfile::for_level(3));
    let outcome = engine.select_move(&mut pos).unwrap();
    assert_eq!(outcome.best_move.to_uci(), "h5f7");
    assert!(
        outcome.evaluation > MATE_THRESHOLD,
        "evaluation {} should indicate mate",
        outcome.evaluation
    );
}

#[test]
fn evaluate_is_stable_across_cache_clears() {
    let pos = Position::from_fen(SCHOLARS_MATE).unwrap();
    let mut engine = SearchEngine::default();
    let first = engine.evaluate(&pos);
    assert_eq!(engine.evaluate(&pos), first);
    engine.clear_cache();
    assert_eq!(engine.evaluate(&pos), first);
}

#[test]
fn cache_size_tracks_distinct_positions() {
    let mut engine = SearchEngine::default();
    engine.clear_cache();
    assert_eq!(engine.cache_size(), 0);

    let mut pos = Position::new();
    let mut seen = 0;
    for san in ["e4", "e5", "Nf3", "Nc6", "Bb5"] {
        pos.play_san(san).unwrap();
        engine.evaluate(&pos);
        seen += 1;
        assert_eq!(engine.cache_size(), seen);
    }
    // Re-evaluating hits the cache.
    engine.evaluate(&pos);
    assert_eq!(engine.cache_size(), seen);
}

#[test]
fn node_budget_is_respected() {
    let mut profile = DifficultyProfile::for_level(5);
    profile.node_budget = 5_000;
    let mut engine = engine_without_book(profile.clone());
    let mut pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    let outcome = engine.select_move(&mut pos).unwrap();
    assert!(outcome.stats.nodes_evaluated <= profile.node_budget + 1000);
    assert!(pos.legal_moves().contains(&outcome.best_move));
}

#[test]
fn pruned_search_matches_plain_minimax() {
    let fen = "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1";
    let mut engine = engine_without_book(plain_profile(2));

    let mut pos = Position::from_fen(fen).unwrap();
    let outcome = engine.select_move(&mut pos).unwrap();

    let mut reference = engine_without_book(plain_profile(2));
    let mut root = Position::from_fen(fen).unwrap();
    let mut best: Option<(i32, String)> = None;
    for mv in root.legal_moves() {
        let mut child = root.apply(&mv).unwrap();
        let score = -minimax(&mut reference, &mut child, 1, 1);
        drop(child);
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, mv.to_uci()));
        }
    }
    let (score, mv) = best.unwrap();

    assert_eq!(outcome.evaluation, score);
    assert_eq!(outcome.best_move.to_uci(), mv);
}

#[test]
fn weakest_level_opens_sensibly() {
    let mut profile = DifficultyProfile::for_level(1);
    profile.search_depth = 1;
    let mut engine = engine_without_book(profile);
    let mut pos = Position::new();
    let outcome = engine.select_move(&mut pos).unwrap();
    assert!(pos.legal_moves().contains(&outcome.best_move));
    assert!(outcome.evaluation.abs() < 150, "evaluation {}", outcome.evaluation);
}

#[test]
fn stalemate_yields_no_move() {
    let mut pos = Position::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    let mut engine = SearchEngine::default();
    assert!(engine.select_move(&mut pos).is_none());
    assert_eq!(pos.outcome(), Some(Outcome::Stalemate));
}

#[test]
fn checkmated_side_yields_no_move() {
    let mut pos = Position::from_fen("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").unwrap();
    let mut engine = SearchEngine::default();
    assert!(engine.select_move(&mut pos).is_none());
    assert_eq!(
        pos.outcome(),
        Some(Outcome::Checkmate {
            winner: Color::White
        })
    );
}

#[test]
fn book_reply_skips_search() {
    let book = OpeningBook::from_entries([("e4", ["e5"])]);
    let mut engine = SearchEngine::new(DifficultyProfile::for_level(3)).with_book(book);
    let mut pos = Position::new();
    pos.play_san("e4").unwrap();

    let outcome = engine.select_move(&mut pos).unwrap();
    assert_eq!(outcome.best_move.to_uci(), "e7e5");
    assert_eq!(outcome.evaluation, 0);
    assert_eq!(outcome.stats.nodes_evaluated, 0);
}

#[test]
fn book_ignored_for_custom_start() {
    let book = OpeningBook::from_entries([("", ["e4"])]);
    let mut engine = SearchEngine::new(DifficultyProfile::for_level(1))
        .with_book(book)
        .with_seed(3);
    let mut pos = Position::from_fen(SCHOLARS_MATE).unwrap();
    let outcome = engine.select_move(&mut pos).unwrap();
    assert!(outcome.stats.nodes_evaluated > 0);
}

#[test]
fn illegal_book_entry_falls_through_to_search() {
    let book = OpeningBook::from_entries([("", ["Ke2"])]);
    let mut engine = SearchEngine::new(DifficultyProfile::for_level(1))
        .with_book(book)
        .with_seed(5);
    let mut pos = Position::new();
    let outcome = engine.select_move(&mut pos).unwrap();
    assert!(outcome.stats.nodes_evaluated > 0);
    assert!(pos.legal_moves().contains(&outcome.best_move));
}

#[test]
fn fallback_move_is_legal() {
    let engine = SearchEngine::default();
    let mut pos = Position::from_fen(SCHOLARS_MATE).unwrap();
    let mv = engine.fallback_move(&mut pos).unwrap();
    assert_eq!(mv.to_uci(), "h5f7");
}

fn deep_budget(mut profile: DifficultyProfile) -> DifficultyProfile {
    profile.node_budget = 5_000_000;
    profile.time_budget = std::time::Duration::from_secs(120);
    profile
}

#[test]
fn quiescence_sees_the_recapture() {
    // Qxd5 wins a pawn at the horizon but loses the queen to cxd5.
    let fen = "4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1";
    let run = |quiescence_depth: i32| {
        let profile = DifficultyProfile {
            quiescence_depth,
            ..plain_profile(1)
        };
        let mut engine = engine_without_book(deep_budget(profile));
        let mut pos = Position::from_fen(fen).unwrap();
        engine.select_move(&mut pos).unwrap()
    };

    let horizon = run(0);
    assert_eq!(horizon.best_move.to_uci(), "d2d5");

    let quiet = run(3);
    assert_ne!(quiet.best_move.to_uci(), "d2d5");
    assert!(quiet.evaluation < horizon.evaluation);
}

#[test]
fn late_move_reduction_saves_nodes() {
    // Nxe5 wins the undefended queen.
    let fen = "rnb1kbnr/pppp1ppp/8/4q3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 3";
    let run = |late_move_reduction: bool| {
        let profile = DifficultyProfile {
            enable_late_move_reduction: late_move_reduction,
            quiescence_depth: 3,
            ..plain_profile(4)
        };
        let mut engine = engine_without_book(deep_budget(profile));
        let mut pos = Position::from_fen(fen).unwrap();
        engine.select_move(&mut pos).unwrap()
    };

    let full = run(false);
    let reduced = run(true);
    assert_eq!(full.best_move.to_uci(), "f3e5");
    assert_eq!(reduced.best_move, full.best_move);
    assert_eq!(reduced.stats.depth_reached, 4);
    assert!(
        reduced.stats.nodes_evaluated < full.stats.nodes_evaluated,
        "reduced {} vs full {}",
        reduced.stats.nodes_evaluated,
        full.stats.nodes_evaluated
    );
}
