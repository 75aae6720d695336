use std::cmp::Ordering;

use crate::ranking::{
    approx_eq, Ballots, OptionId, Placement, RankResult, RankingCounter, VoteCount,
};

/// Orders the options by the Wilson lower bound of their rank success.
///
/// The scores are computed once on the full ballots.
pub struct WilsonCounter;

/// Live options from best to worst Wilson score.
///
/// Ties go to the option ranked by more voters, then to the lesser block.
pub(crate) fn wilson_order(ballots: &Ballots) -> Vec<(OptionId, f64, VoteCount)> {
    let scores = ballots.wilson_scores(false);
    let counts = ballots.ranking_counts();
    let mut res: Vec<(OptionId, f64, VoteCount)> = scores
        .into_iter()
        .map(|(id, score)| {
            let ranked_by = counts.get(&id).cloned().unwrap_or(VoteCount::EMPTY);
            (id, score, ranked_by)
        })
        .collect();
    res.sort_by(|a, b| {
        let by_score = if approx_eq(a.1, b.1) {
            Ordering::Equal
        } else {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)
        };
        by_score.then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0))
    });
    res
}

fn describe(score: f64, ranked_by: VoteCount) -> String {
    format!("Wilson score {:.4} from {} ranking(s)", score, ranked_by.0)
}

impl RankingCounter for WilsonCounter {
    fn name(&self) -> &'static str {
        "Wilson"
    }

    fn find_winner(&self, ballots: &Ballots) -> Option<Placement> {
        wilson_order(ballots)
            .first()
            .map(|(id, score, ranked_by)| Placement {
                option: *id,
                score: *score,
                trace: vec![describe(*score, *ranked_by)],
            })
    }

    fn rank(&self, ballots: &Ballots) -> Vec<RankResult> {
        wilson_order(ballots)
            .into_iter()
            .enumerate()
            .map(|(idx, (id, score, ranked_by))| RankResult {
                position: idx + 1,
                score,
                option: ballots.option(id).clone(),
                trace: describe(score, ranked_by),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RankVoteCounterMethod;
    use crate::ranking::rank_task;
    use crate::ranking::tests::{ballots_of, names};

    #[test]
    fn few_unanimous_votes_beat_many_lukewarm_ones() {
        // Three voters put A first. B is first once and second nine times.
        let votes = ballots_of(&[(3, "A"), (1, "B>C"), (9, "C>B")]);
        let results = rank_task(RankVoteCounterMethod::Wilson, &votes);
        assert_eq!(names(&results), vec!["C", "A", "B"]);
        assert!((results[1].score - 0.4385).abs() < 1e-3);
        assert_eq!(results[1].trace, "Wilson score 0.4385 from 3 ranking(s)");
    }
}
