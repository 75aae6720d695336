use std::cmp::Ordering;

use crate::ranking::{approx_eq, EliminationRule, OptionId, Round};

/// Baldwin: the option with the lowest Wilson score is eliminated.
///
/// The score of an option counts every active voter, so an option that few
/// voters ranked is penalized even if they ranked it highly.
pub struct BaldwinRule;

impl EliminationRule for BaldwinRule {
    fn name(&self) -> &'static str {
        "Baldwin"
    }

    fn select_elimination_candidate(&self, round: &Round) -> (OptionId, String) {
        let scores = round.ballots.wilson_scores(true);
        let mut candidates: Vec<(f64, OptionId)> =
            scores.iter().map(|(id, score)| (*score, *id)).collect();
        candidates.sort_by(|a, b| {
            let by_score = if approx_eq(a.0, b.0) {
                Ordering::Equal
            } else {
                a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal)
            };
            by_score
                .then_with(|| {
                    round
                        .first_preferences_of(a.1)
                        .cmp(&round.first_preferences_of(b.1))
                })
                .then(b.1.cmp(&a.1))
        });
        let (score, id) = candidates[0];
        (id, format!("Wilson score {:.4}", score))
    }

    fn winner_score(&self, round: &Round, winner: OptionId) -> f64 {
        round
            .ballots
            .wilson_scores(true)
            .get(&winner)
            .cloned()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RankVoteCounterMethod;
    use crate::ranking::rank_task;
    use crate::ranking::tests::{ballots_of, names};

    #[test]
    fn eliminates_the_least_supported_option() {
        // B has a single first preference but appears on almost every ballot.
        let votes = ballots_of(&[(2, "A>B"), (1, "B>A"), (2, "C>B>A"), (2, "D>B")]);
        let results = rank_task(RankVoteCounterMethod::Baldwin, &votes);
        let trace: Vec<&str> = results[0].trace.lines().collect();
        assert!(trace[0].starts_with("Round 1: eliminated"));
        assert!(!trace[0].contains("'B'"));
        assert_eq!(names(&results)[0], "B");
        assert!(results[0].score > 0.0 && results[0].score <= 1.0);
    }
}
