use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ranking::{approx_eq, EliminationRule, OptionId, Round};

/// Coombs: the option that the most voters like least is eliminated.
///
/// A voter who left some live options unranked puts all of them last, split
/// evenly. Otherwise the options with the voter's worst rank are last.
pub struct CoombsRule;

fn last_preferences(round: &Round) -> BTreeMap<OptionId, f64> {
    let live = round.ballots.live();
    let mut counts: BTreeMap<OptionId, f64> = live.iter().map(|id| (*id, 0.0)).collect();
    for v in round.ballots.voters() {
        if v.is_exhausted() {
            continue;
        }
        let unranked: Vec<OptionId> = live
            .iter()
            .filter(|id| v.rank_of(**id).is_none())
            .cloned()
            .collect();
        let last: Vec<OptionId> = if !unranked.is_empty() {
            unranked
        } else {
            let lowest = v.lowest_rank();
            v.rankings()
                .iter()
                .filter(|rv| Some(rv.rank) == lowest)
                .map(|rv| rv.option)
                .collect()
        };
        let share = 1.0 / last.len() as f64;
        for id in last {
            if let Some(c) = counts.get_mut(&id) {
                *c += share;
            }
        }
    }
    counts
}

impl EliminationRule for CoombsRule {
    fn name(&self) -> &'static str {
        "Coombs"
    }

    fn select_elimination_candidate(&self, round: &Round) -> (OptionId, String) {
        let mut candidates: Vec<(f64, OptionId)> = last_preferences(round)
            .into_iter()
            .map(|(id, count)| (count, id))
            .collect();
        // Most last preferences, then fewest first preferences, then the greater block.
        candidates.sort_by(|a, b| {
            let by_count = if approx_eq(a.0, b.0) {
                Ordering::Equal
            } else {
                b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal)
            };
            by_count
                .then_with(|| {
                    round
                        .first_preferences_of(a.1)
                        .cmp(&round.first_preferences_of(b.1))
                })
                .then(b.1.cmp(&a.1))
        });
        let (count, id) = candidates[0];
        (id, format!("{:.2} last preference(s)", count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::tests::ballots_of;
    use crate::ranking::Ballots;

    #[test]
    fn unranked_options_share_the_last_place() {
        let votes = ballots_of(&[(1, "A"), (1, "A>B>C")]);
        let ballots = Ballots::from_task_votes(&votes);
        let round = Round::new(1, &ballots);
        let last = last_preferences(&round);
        // Options are numbered in block order: A, B, C.
        assert!(approx_eq(last[&OptionId(0)], 0.0));
        assert!(approx_eq(last[&OptionId(1)], 0.5));
        assert!(approx_eq(last[&OptionId(2)], 1.5));
        let (loser, _) = CoombsRule.select_elimination_candidate(&round);
        assert_eq!(loser, OptionId(2));
    }
}
