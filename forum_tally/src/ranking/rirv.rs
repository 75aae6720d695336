use crate::ranking::wilson::wilson_order;
use crate::ranking::{Ballots, OptionId, Placement, RankingCounter};

/// Rated instant runoff: the two best options by Wilson score go to a runoff.
///
/// Each voter supports whichever of the two they ranked better, or the one
/// they ranked at all. The option with more support wins the position. A tie
/// goes to the option with the better score.
pub struct RatedInstantRunoffCounter;

fn runoff(ballots: &Ballots, first: OptionId, second: OptionId) -> (u64, u64) {
    let mut first_votes = 0;
    let mut second_votes = 0;
    for v in ballots.voters() {
        match (v.rank_of(first), v.rank_of(second)) {
            (Some(a), Some(b)) if a < b => first_votes += 1,
            (Some(a), Some(b)) if b < a => second_votes += 1,
            (Some(_), None) => first_votes += 1,
            (None, Some(_)) => second_votes += 1,
            _ => {}
        }
    }
    (first_votes, second_votes)
}

impl RankingCounter for RatedInstantRunoffCounter {
    fn name(&self) -> &'static str {
        "rated instant runoff"
    }

    fn find_winner(&self, ballots: &Ballots) -> Option<Placement> {
        let order = wilson_order(ballots);
        match order.as_slice() {
            [] => None,
            [(only, _, _)] => Some(Placement {
                option: *only,
                score: ballots.active_voters().0 as f64,
                trace: vec![format!("{} is the last option", ballots.label(*only))],
            }),
            [(first, first_score, _), (second, second_score, _), ..] => {
                let (first_votes, second_votes) = runoff(ballots, *first, *second);
                let (winner, score) = if second_votes > first_votes {
                    (*second, second_votes)
                } else {
                    (*first, first_votes)
                };
                let trace = vec![
                    format!(
                        "Runoff between {} (Wilson score {:.4}) and {} (Wilson score {:.4})",
                        ballots.label(*first),
                        first_score,
                        ballots.label(*second),
                        second_score
                    ),
                    format!(
                        "{} wins the runoff {} to {}",
                        ballots.label(winner),
                        first_votes.max(second_votes),
                        first_votes.min(second_votes)
                    ),
                ];
                Some(Placement {
                    option: winner,
                    score: score as f64,
                    trace,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RankVoteCounterMethod;
    use crate::ranking::rank_task;
    use crate::ranking::tests::{ballots_of, names};

    #[test]
    fn runoff_between_the_two_best_scores() {
        let votes = ballots_of(&[(3, "A>B"), (4, "B>A"), (1, "C")]);
        let results = rank_task(RankVoteCounterMethod::RatedInstantRunoff, &votes);
        assert_eq!(names(&results)[0], "B");
        assert_eq!(results[0].score, 4.0);
        assert!(results[0].trace.ends_with("'B' wins the runoff 4 to 3"));
    }

    #[test]
    fn tied_runoff_goes_to_the_better_score() {
        let votes = ballots_of(&[(2, "A>B"), (2, "B>A")]);
        let results = rank_task(RankVoteCounterMethod::RatedInstantRunoff, &votes);
        assert_eq!(names(&results), vec!["A", "B"]);
        assert!(results[0].trace.ends_with("'A' wins the runoff 2 to 2"));
    }
}
