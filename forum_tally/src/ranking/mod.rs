//! Ranked-choice counting.
//!
//! The counters order all the options of a ranked task. Positions are filled
//! one at a time: the counter finds the winner among the options still in
//! play, the winner is removed from every ballot, and the counter runs again
//! on the remaining options.
//!
//! The elimination methods (instant runoff, Baldwin, Coombs) share the same
//! round loop and only differ by their `EliminationRule`.

mod baldwin;
mod coombs;
mod irv;
mod rirv;
mod wilson;

use log::{debug, info};

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::{Add, AddAssign},
};

use crate::config::RankVoteCounterMethod;
use crate::identity::Origin;
use crate::storage::{RankedTaskVotes, VoteStorage};
use crate::vote_block::VoteLineBlock;
use crate::vote_line::{MarkerType, VoteLine, MAX_RANK};

pub use crate::ranking::baldwin::BaldwinRule;
pub use crate::ranking::coombs::CoombsRule;
pub use crate::ranking::irv::InstantRunoffRule;
pub use crate::ranking::rirv::RatedInstantRunoffCounter;
pub use crate::ranking::wilson::WilsonCounter;

/// z value of the 95% confidence interval.
pub const WILSON_Z: f64 = 1.96;

const EPSILON: f64 = 1e-9;

/// Index of an option in the ballots. Options are numbered in block order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct OptionId(pub u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct VoteCount(pub u64);

impl VoteCount {
    pub const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

/// The rank a voter gave to an option.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RankedVote {
    pub option: OptionId,
    pub rank: u32,
}

/// All the rankings of one voter, best first.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterRankings {
    pub voter: Origin,
    // Invariant: sorted by (rank, option), ranks are contiguous from 1.
    rankings: Vec<RankedVote>,
}

impl VoterRankings {
    pub fn new(voter: Origin, rankings: Vec<RankedVote>) -> VoterRankings {
        let mut res = VoterRankings { voter, rankings };
        res.renumber();
        res
    }

    pub fn rankings(&self) -> &[RankedVote] {
        &self.rankings
    }

    /// The most preferred option. Options with the same rank are ordered by id.
    pub fn top(&self) -> Option<OptionId> {
        self.rankings.first().map(|rv| rv.option)
    }

    pub fn rank_of(&self, option: OptionId) -> Option<u32> {
        self.rankings
            .iter()
            .find(|rv| rv.option == option)
            .map(|rv| rv.rank)
    }

    pub fn lowest_rank(&self) -> Option<u32> {
        self.rankings.last().map(|rv| rv.rank)
    }

    pub fn is_exhausted(&self) -> bool {
        self.rankings.is_empty()
    }

    fn remove(&mut self, option: OptionId) {
        self.rankings.retain(|rv| rv.option != option);
        self.renumber();
    }

    // Dense renumbering: equal ranks stay equal, gaps are closed.
    fn renumber(&mut self) {
        self.rankings
            .sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.option.cmp(&b.option)));
        let mut current: Option<u32> = None;
        let mut next_rank = 0;
        for rv in self.rankings.iter_mut() {
            if current != Some(rv.rank) {
                current = Some(rv.rank);
                next_rank += 1;
            }
            rv.rank = next_rank;
        }
    }
}

/// The ballots of a task: the options still in play and the rankings of every voter.
///
/// Counters only work on copies, so the same ballots can be counted with
/// several methods.
#[derive(Debug, Clone)]
pub struct Ballots {
    options: Vec<VoteLineBlock>,
    live: BTreeSet<OptionId>,
    voters: Vec<VoterRankings>,
}

fn rank_value(line: &VoteLine) -> u32 {
    match line.marker_type() {
        MarkerType::Rank => line.marker_value(),
        // A voter whose line was merged into a ranked option without a rank.
        _ => MAX_RANK,
    }
}

impl Ballots {
    pub fn from_task_votes(votes: &RankedTaskVotes) -> Ballots {
        let options: Vec<VoteLineBlock> = votes.keys().cloned().collect();
        let mut by_voter: BTreeMap<Origin, Vec<RankedVote>> = BTreeMap::new();
        for (idx, voters) in votes.values().enumerate() {
            let option = OptionId(idx as u32);
            for (origin, line) in voters.iter() {
                by_voter.entry(origin.clone()).or_default().push(RankedVote {
                    option,
                    rank: rank_value(line),
                });
            }
        }
        let voters: Vec<VoterRankings> = by_voter
            .into_iter()
            .map(|(voter, rankings)| VoterRankings::new(voter, rankings))
            .collect();
        let live = (0..options.len()).map(|idx| OptionId(idx as u32)).collect();
        Ballots {
            options,
            live,
            voters,
        }
    }

    pub fn option(&self, id: OptionId) -> &VoteLineBlock {
        &self.options[id.0 as usize]
    }

    pub fn live(&self) -> &BTreeSet<OptionId> {
        &self.live
    }

    pub fn voters(&self) -> &[VoterRankings] {
        &self.voters
    }

    /// Removes an option from play and from every ballot.
    pub fn remove_option(&mut self, id: OptionId) {
        self.live.remove(&id);
        for v in self.voters.iter_mut() {
            v.remove(id);
        }
    }

    pub(crate) fn label(&self, id: OptionId) -> String {
        format!("'{}'", self.option(id).first_line().clean_content())
    }

    /// The number of first preferences of every live option.
    pub fn first_preferences(&self) -> BTreeMap<OptionId, VoteCount> {
        let mut tally: BTreeMap<OptionId, VoteCount> =
            self.live.iter().map(|id| (*id, VoteCount::EMPTY)).collect();
        for v in self.voters.iter() {
            if let Some(top) = v.top() {
                if let Some(vc) = tally.get_mut(&top) {
                    *vc += VoteCount(1);
                }
            }
        }
        tally
    }

    /// The number of voters who ranked each live option at all.
    pub fn ranking_counts(&self) -> BTreeMap<OptionId, VoteCount> {
        let mut counts: BTreeMap<OptionId, VoteCount> =
            self.live.iter().map(|id| (*id, VoteCount::EMPTY)).collect();
        for v in self.voters.iter() {
            for rv in v.rankings.iter() {
                if let Some(vc) = counts.get_mut(&rv.option) {
                    *vc += VoteCount(1);
                }
            }
        }
        counts
    }

    /// The voters that still rank at least one live option.
    pub fn active_voters(&self) -> VoteCount {
        VoteCount(self.voters.iter().filter(|v| !v.is_exhausted()).count() as u64)
    }

    /// The Wilson lower bound of every live option.
    ///
    /// Every ranking is a trial whose success is `(m - r) / (m - 1)` for rank
    /// `r` among `m` live options. If `include_non_rankers` is set, every active
    /// voter who did not rank an option counts as a failed trial for it.
    pub fn wilson_scores(&self, include_non_rankers: bool) -> BTreeMap<OptionId, f64> {
        let m = self.live.len() as f64;
        let mut sums: BTreeMap<OptionId, (f64, f64)> =
            self.live.iter().map(|id| (*id, (0.0, 0.0))).collect();
        let active = self.active_voters().0 as f64;
        for v in self.voters.iter() {
            for rv in v.rankings.iter() {
                if let Some((successes, trials)) = sums.get_mut(&rv.option) {
                    *successes += rank_success(rv.rank, m);
                    *trials += 1.0;
                }
            }
        }
        sums.into_iter()
            .map(|(id, (successes, trials))| {
                let trials = if include_non_rankers { active } else { trials };
                (id, wilson_lower_bound(successes, trials))
            })
            .collect()
    }
}

/// The success value of a rank among `m` options: 1 for the best rank, 0 for the worst.
pub fn rank_success(rank: u32, m: f64) -> f64 {
    if m <= 1.0 {
        return 1.0;
    }
    ((m - rank as f64) / (m - 1.0)).clamp(0.0, 1.0)
}

/// Lower bound of the Wilson score interval at 95% confidence.
///
/// Returns 0 when there are no trials.
pub fn wilson_lower_bound(successes: f64, trials: f64) -> f64 {
    if trials <= 0.0 {
        return 0.0;
    }
    let z = WILSON_Z;
    let n = trials;
    let p = (successes / n).clamp(0.0, 1.0);
    let z2 = z * z;
    let center = p + z2 / (2.0 * n);
    let margin = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    ((center - margin) / (1.0 + z2 / n)).max(0.0)
}

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// The state of one round of an elimination method.
pub struct Round<'a> {
    pub number: u32,
    pub ballots: &'a Ballots,
    pub first_preferences: BTreeMap<OptionId, VoteCount>,
    pub active_voters: VoteCount,
}

impl<'a> Round<'a> {
    pub fn new(number: u32, ballots: &'a Ballots) -> Round<'a> {
        Round {
            number,
            ballots,
            first_preferences: ballots.first_preferences(),
            active_voters: ballots.active_voters(),
        }
    }

    pub fn first_preferences_of(&self, id: OptionId) -> VoteCount {
        self.first_preferences
            .get(&id)
            .cloned()
            .unwrap_or(VoteCount::EMPTY)
    }

    /// The option that more than half of the active voters prefer, if any.
    pub fn majority_winner(&self) -> Option<OptionId> {
        self.first_preferences
            .iter()
            .find(|(_, vc)| vc.0 * 2 > self.active_voters.0)
            .map(|(id, _)| *id)
    }
}

/// The rule that distinguishes the elimination methods.
pub trait EliminationRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the winner of this round, if there is one.
    fn winner_test(&self, round: &Round) -> Option<OptionId> {
        round.majority_winner()
    }

    /// Picks the option to eliminate, with a description of why.
    fn select_elimination_candidate(&self, round: &Round) -> (OptionId, String);

    /// The score reported for the winner.
    fn winner_score(&self, round: &Round, winner: OptionId) -> f64 {
        round.first_preferences_of(winner).0 as f64
    }
}

/// The winner of one position.
#[derive(PartialEq, Debug, Clone)]
pub struct Placement {
    pub option: OptionId,
    pub score: f64,
    pub trace: Vec<String>,
}

/// One position of the final ordering of a task.
#[derive(PartialEq, Debug, Clone)]
pub struct RankResult {
    /// 1 for the winner.
    pub position: usize,
    pub score: f64,
    pub option: VoteLineBlock,
    /// The rounds that led to this position, in order.
    pub trace: String,
}

/// The ordering of all the options of a ranked task.
#[derive(PartialEq, Debug, Clone)]
pub struct TaskRanking {
    pub task: String,
    pub results: Vec<RankResult>,
}

pub trait RankingCounter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Finds the winner among the live options.
    fn find_winner(&self, ballots: &Ballots) -> Option<Placement>;

    /// Orders all the options.
    fn rank(&self, ballots: &Ballots) -> Vec<RankResult> {
        let mut work = ballots.clone();
        let mut res: Vec<RankResult> = Vec::new();
        while let Some(placement) = self.find_winner(&work) {
            debug!(
                "{}: position {}: {} ({:?})",
                self.name(),
                res.len() + 1,
                work.label(placement.option),
                placement.trace
            );
            res.push(RankResult {
                position: res.len() + 1,
                score: placement.score,
                option: work.option(placement.option).clone(),
                trace: placement.trace.join("\n"),
            });
            work.remove_option(placement.option);
        }
        res
    }
}

/// Runs an elimination rule round after round until it finds a winner.
pub struct EliminationCounter<R: EliminationRule> {
    rule: R,
}

impl<R: EliminationRule> EliminationCounter<R> {
    pub fn new(rule: R) -> EliminationCounter<R> {
        EliminationCounter { rule }
    }
}

impl<R: EliminationRule> RankingCounter for EliminationCounter<R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn find_winner(&self, ballots: &Ballots) -> Option<Placement> {
        let mut work = ballots.clone();
        let mut trace: Vec<String> = Vec::new();
        let mut number: u32 = 1;
        // Every round removes one option.
        loop {
            let round = Round::new(number, &work);
            debug!(
                "{}: round {}: first preferences {:?}, active voters {:?}",
                self.rule.name(),
                number,
                round.first_preferences,
                round.active_voters
            );
            let winner = match work.live.len() {
                0 => return None,
                1 => work.live.iter().next().cloned(),
                _ => self.rule.winner_test(&round),
            };
            if let Some(winner) = winner {
                let score = self.rule.winner_score(&round, winner);
                trace.push(format!(
                    "Round {}: {} wins with {} of {} first preferences",
                    number,
                    work.label(winner),
                    round.first_preferences_of(winner).0,
                    round.active_voters.0
                ));
                return Some(Placement {
                    option: winner,
                    score,
                    trace,
                });
            }
            let (loser, reason) = self.rule.select_elimination_candidate(&round);
            trace.push(format!(
                "Round {}: eliminated {} ({})",
                number,
                work.label(loser),
                reason
            ));
            work.remove_option(loser);
            number += 1;
        }
    }
}

/// The counter implementing a method.
pub fn counter_for(method: RankVoteCounterMethod) -> Box<dyn RankingCounter> {
    match method {
        RankVoteCounterMethod::InstantRunoff => {
            Box::new(EliminationCounter::new(InstantRunoffRule))
        }
        RankVoteCounterMethod::Baldwin => Box::new(EliminationCounter::new(BaldwinRule)),
        RankVoteCounterMethod::Coombs => Box::new(EliminationCounter::new(CoombsRule)),
        RankVoteCounterMethod::Wilson => Box::new(WilsonCounter),
        RankVoteCounterMethod::RatedInstantRunoff => Box::new(RatedInstantRunoffCounter),
    }
}

/// Orders the options of one ranked task.
pub fn rank_task(method: RankVoteCounterMethod, votes: &RankedTaskVotes) -> Vec<RankResult> {
    let ballots = Ballots::from_task_votes(votes);
    counter_for(method).rank(&ballots)
}

/// Orders the options of every ranked task of the storage.
pub fn rank_all(storage: &VoteStorage, method: RankVoteCounterMethod) -> Vec<TaskRanking> {
    let counter = counter_for(method);
    let mut res: Vec<TaskRanking> = Vec::new();
    for (task, votes) in storage.ranked_votes_by_task() {
        info!(
            "Ranking task {:?} ({} options) with {}",
            task,
            votes.len(),
            counter.name()
        );
        let ballots = Ballots::from_task_votes(&votes);
        res.push(TaskRanking {
            task,
            results: counter.rank(&ballots),
        });
    }
    res
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ComparisonPolicy;
    use crate::vote_line::parse_line;

    /// Builds ranked votes from ballots written as `"A>B>C"`, repeated `count` times.
    pub(crate) fn ballots_of(ballots: &[(u32, &str)]) -> RankedTaskVotes {
        let mut res: RankedTaskVotes = BTreeMap::new();
        let mut voter_idx = 0;
        for (count, prefs) in ballots {
            for _ in 0..*count {
                voter_idx += 1;
                let voter = Origin::user(&format!("voter{}", voter_idx), "thread");
                for (rank, name) in prefs.split('>').enumerate() {
                    let line = parse_line(&format!("[{}] {}", rank + 1, name)).unwrap();
                    let block = VoteLineBlock::from_line(line.clone(), &ComparisonPolicy::DEFAULT);
                    res.entry(block).or_default().insert(voter.clone(), line);
                }
            }
        }
        res
    }

    pub(crate) fn names(results: &[RankResult]) -> Vec<String> {
        results
            .iter()
            .map(|r| r.option.first_line().clean_content().to_string())
            .collect()
    }

    #[test]
    fn wilson_primitive() {
        assert_eq!(wilson_lower_bound(0.0, 0.0), 0.0);
        let all_three = wilson_lower_bound(3.0, 3.0);
        let one_of_ten = wilson_lower_bound(1.0, 10.0);
        assert!(all_three > one_of_ten);
        assert!((all_three - 0.4385).abs() < 1e-3);
        assert!(wilson_lower_bound(10.0, 10.0) > all_three);
    }

    #[test]
    fn renumbering_is_dense() {
        let v = VoterRankings::new(
            Origin::user("a", "t"),
            vec![
                RankedVote { option: OptionId(2), rank: 5 },
                RankedVote { option: OptionId(0), rank: 2 },
                RankedVote { option: OptionId(1), rank: 2 },
            ],
        );
        assert_eq!(v.top(), Some(OptionId(0)));
        assert_eq!(v.rank_of(OptionId(1)), Some(1));
        assert_eq!(v.rank_of(OptionId(2)), Some(2));
        let mut v = v;
        v.remove(OptionId(0));
        v.remove(OptionId(1));
        assert_eq!(v.rank_of(OptionId(2)), Some(1));
    }

    #[test]
    fn irv_majority_in_first_round() {
        let votes = ballots_of(&[(3, "A>B>C"), (1, "B>C>A"), (1, "C>B>A")]);
        let results = rank_task(RankVoteCounterMethod::InstantRunoff, &votes);
        assert_eq!(results[0].option.first_line().clean_content(), "A");
        assert_eq!(results[0].score, 3.0);
        assert!(!results[0].trace.contains("eliminated"));
        assert!(results[0].trace.starts_with("Round 1: 'A' wins"));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn coombs_and_irv_diverge_on_a_centrist() {
        // C is everybody's second choice and nobody's first.
        let votes = ballots_of(&[(3, "A>C>B"), (3, "B>C>A"), (1, "D>C>A>B")]);
        let irv = rank_task(RankVoteCounterMethod::InstantRunoff, &votes);
        assert_eq!(irv[0].option.first_line().clean_content(), "A");
        assert!(irv[0].trace.starts_with("Round 1: eliminated 'C'"));

        let coombs = rank_task(RankVoteCounterMethod::Coombs, &votes);
        assert_eq!(coombs[0].option.first_line().clean_content(), "C");
        assert!(!coombs[0].trace.contains("eliminated 'C'"));
        let trace: Vec<&str> = coombs[0].trace.lines().collect();
        assert!(trace[0].starts_with("Round 1: eliminated 'D'"));
        assert!(trace[1].starts_with("Round 2: eliminated 'B'"));
        assert!(trace[2].starts_with("Round 3: 'C' wins"));
    }

    #[test]
    fn wilson_prefers_consistent_support() {
        let votes = ballots_of(&[(3, "Strong"), (1, "Weak>Filler"), (9, "Filler>Weak")]);
        let b = Ballots::from_task_votes(&votes);
        let scores = b.wilson_scores(false);
        let id_of = |name: &str| {
            OptionId(
                votes
                    .keys()
                    .position(|k| k.first_line().clean_content() == name)
                    .unwrap() as u32,
            )
        };
        assert!(scores[&id_of("Strong")] > scores[&id_of("Weak")]);
    }

    #[test]
    fn all_methods_place_every_option() {
        let votes = ballots_of(&[(2, "A>B>C>D"), (2, "B>A>D"), (1, "C>D"), (1, "D")]);
        for method in RankVoteCounterMethod::ALL {
            let results = rank_task(method, &votes);
            assert_eq!(results.len(), 4, "method {}", method);
            let mut placed = names(&results);
            placed.sort();
            assert_eq!(placed, vec!["A", "B", "C", "D"], "method {}", method);
            for (idx, r) in results.iter().enumerate() {
                assert_eq!(r.position, idx + 1);
            }
        }
    }

    #[test]
    fn counting_is_deterministic() {
        let votes = ballots_of(&[(1, "A>B"), (1, "B>A")]);
        for method in RankVoteCounterMethod::ALL {
            let first = rank_task(method, &votes);
            let second = rank_task(method, &votes);
            assert_eq!(first, second, "method {}", method);
        }
    }

    #[test]
    fn empty_task_has_no_results() {
        let votes: RankedTaskVotes = BTreeMap::new();
        for method in RankVoteCounterMethod::ALL {
            assert!(rank_task(method, &votes).is_empty());
        }
    }
}
