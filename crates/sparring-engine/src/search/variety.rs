//! Post-search move substitution for weaker difficulty levels.

use rand::Rng;
use rand::seq::SliceRandom;
use sparring_core::Move;
use tracing::debug;

/// Alternatives must score within this many centipawns of the best move.
pub const VARIETY_TOLERANCE: i32 = 50;

/// A root move and its side-to-move relative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootCandidate {
    pub mv: Move,
    pub score: i32,
}

/// With probability `probability`, replace `best` by a uniformly chosen
/// candidate scoring within `tolerance` of it. Returns `best` unchanged when
/// the coin says no or no candidate qualifies.
pub fn substitute<R: Rng + ?Sized>(
    best: RootCandidate,
    candidates: &[RootCandidate],
    probability: f64,
    tolerance: i32,
    rng: &mut R,
) -> RootCandidate {
    if probability <= 0.0 || !rng.gen_bool(probability.min(1.0)) {
        return best;
    }

    let alternatives: Vec<RootCandidate> = candidates
        .iter()
        .copied()
        .filter(|c| c.mv != best.mv && c.score >= best.score - tolerance)
        .collect();

    match alternatives.choose(rng) {
        Some(pick) => {
            debug!(best = %best.mv, pick = %pick.mv, loss = best.score - pick.score, "substituting near-best move");
            *pick
        }
        None => best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sparring_core::Position;

    fn candidates(scores: &[(&str, i32)]) -> Vec<RootCandidate> {
        let pos = Position::new();
        scores
            .iter()
            .map(|&(uci, score)| RootCandidate {
                mv: pos
                    .legal_moves()
                    .into_iter()
                    .find(|m| m.to_uci() == uci)
                    .unwrap(),
                score,
            })
            .collect()
    }

    #[test]
    fn zero_probability_keeps_best() {
        let list = candidates(&[("e2e4", 40), ("d2d4", 35)]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(substitute(list[0], &list, 0.0, VARIETY_TOLERANCE, &mut rng), list[0]);
        }
    }

    #[test]
    fn certain_substitution_stays_within_tolerance() {
        let list = candidates(&[("e2e4", 40), ("d2d4", 35), ("g1f3", 0), ("a2a3", -60)]);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let pick = substitute(list[0], &list, 1.0, VARIETY_TOLERANCE, &mut rng);
            assert_ne!(pick.mv, list[0].mv);
            assert!(pick.score >= list[0].score - VARIETY_TOLERANCE);
        }
    }

    #[test]
    fn no_alternative_in_range_keeps_best() {
        let list = candidates(&[("e2e4", 200), ("a2a3", -60)]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(substitute(list[0], &list, 1.0, VARIETY_TOLERANCE, &mut rng), list[0]);
    }
}
