//! The running tally: which voters support which vote units.
//!
//! All the mutating operations that a user may request after a tally (merge,
//! join, delete, split, task replacement) record their inverse in a bounded
//! history, so that they can be undone in reverse order.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::identity::Origin;
use crate::vote_block::VoteLineBlock;
use crate::vote_line::VoteLine;

/// Maximum number of operations that can be undone.
pub const MAX_UNDO_HISTORY: usize = 100;

/// The vote of one voter for a block, as the voter cast it.
///
/// The block is the voter's own copy, so it carries the voter's markers. The
/// position is the index of the block inside the voter's post.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterVote {
    block: VoteLineBlock,
    position: usize,
}

impl VoterVote {
    pub fn new(block: VoteLineBlock, position: usize) -> VoterVote {
        VoterVote { block, position }
    }

    pub fn block(&self) -> &VoteLineBlock {
        &self.block
    }

    /// The line the voter cast (the first line of their block).
    pub fn line(&self) -> &VoteLine {
        self.block.first_line()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

pub type VoterStorage = BTreeMap<Origin, VoterVote>;

/// The options of a task and their supporters.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TaskTally {
    pub task: String,
    /// Sorted by decreasing support, then by block order.
    pub entries: Vec<(VoteLineBlock, BTreeSet<Origin>)>,
}

/// The ranked votes of a task: every option, and the line each voter cast for it.
pub type RankedTaskVotes = BTreeMap<VoteLineBlock, BTreeMap<Origin, VoteLine>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum UndoKind {
    Merge,
    Join,
    Delete,
    Split,
    ReplaceTask,
}

// The previous state of every block touched by an operation. None means that
// the block did not exist.
#[derive(Debug, Clone)]
struct UndoAction {
    kind: UndoKind,
    previous: Vec<(VoteLineBlock, Option<VoterStorage>)>,
}

#[derive(Debug, Clone, Default)]
pub struct VoteStorage {
    votes: HashMap<VoteLineBlock, VoterStorage>,
    history: VecDeque<UndoAction>,
}

fn task_key(task: &str) -> String {
    task.trim().to_lowercase()
}

impl VoteStorage {
    pub fn new() -> VoteStorage {
        VoteStorage::default()
    }

    /// Removes all the votes and the undo history.
    pub fn reset(&mut self) {
        self.votes.clear();
        self.history.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn contains(&self, block: &VoteLineBlock) -> bool {
        self.votes.contains_key(block)
    }

    /// The stored blocks, in block order.
    pub fn blocks(&self) -> Vec<&VoteLineBlock> {
        let mut res: Vec<&VoteLineBlock> = self.votes.keys().collect();
        res.sort();
        res
    }

    pub fn voters_for(&self, block: &VoteLineBlock) -> Option<&VoterStorage> {
        self.votes.get(block)
    }

    pub fn support_count_for(&self, block: &VoteLineBlock) -> usize {
        self.votes.get(block).map(|v| v.len()).unwrap_or(0)
    }

    pub fn has_voter(&self, origin: &Origin) -> bool {
        self.votes.values().any(|v| v.contains_key(origin))
    }

    /// The current votes of a voter, in the order of their post.
    pub fn votes_by(&self, origin: &Origin) -> Vec<VoterVote> {
        let mut res: Vec<VoterVote> = self
            .votes
            .values()
            .filter_map(|v| v.get(origin).cloned())
            .collect();
        res.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.block.cmp(&b.block))
        });
        res
    }

    /// Records the vote of a voter. A new vote replaces everything the voter
    /// previously supported.
    pub fn add_votes(&mut self, blocks: &[VoteLineBlock], origin: &Origin) {
        self.remove_voter(origin);
        for (position, block) in blocks.iter().enumerate() {
            self.votes
                .entry(block.clone())
                .or_default()
                .insert(origin.clone(), VoterVote::new(block.clone(), position));
        }
        debug!(
            "add_votes: {} now supports {} block(s)",
            origin,
            blocks.len()
        );
    }

    // Removes the voter from every block and prunes the blocks left empty.
    fn remove_voter(&mut self, origin: &Origin) {
        for voters in self.votes.values_mut() {
            voters.remove(origin);
        }
        self.votes.retain(|_, voters| !voters.is_empty());
    }

    // The stored version of a block, which is the first one that was added.
    fn stored_key(&self, block: &VoteLineBlock) -> Option<VoteLineBlock> {
        self.votes.get_key_value(block).map(|(k, _)| k.clone())
    }

    fn snapshot(&self, blocks: &[&VoteLineBlock]) -> Vec<(VoteLineBlock, Option<VoterStorage>)> {
        let mut res: Vec<(VoteLineBlock, Option<VoterStorage>)> = Vec::new();
        for block in blocks {
            if res.iter().any(|(b, _)| b == *block) {
                continue;
            }
            match self.votes.get_key_value(*block) {
                Some((k, v)) => res.push((k.clone(), Some(v.clone()))),
                None => res.push(((*block).clone(), None)),
            }
        }
        res
    }

    fn push_history(&mut self, kind: UndoKind, previous: Vec<(VoteLineBlock, Option<VoterStorage>)>) {
        self.history.push_back(UndoAction { kind, previous });
        while self.history.len() > MAX_UNDO_HISTORY {
            self.history.pop_front();
        }
    }

    /// Moves all the supporters of `from` to `to`, and deletes `from`.
    ///
    /// Voters who already support `to` keep their vote for it. The others keep
    /// their own markers.
    pub fn merge(&mut self, from: &VoteLineBlock, to: &VoteLineBlock) -> bool {
        if from == to {
            return false;
        }
        let to_key = match self.stored_key(to) {
            Some(k) => k,
            None => return false,
        };
        if !self.votes.contains_key(from) {
            return false;
        }
        let previous = self.snapshot(&[from, to]);
        let from_voters = self.votes.remove(from).unwrap_or_default();
        let target = self.votes.entry(to_key.clone()).or_default();
        for (origin, vote) in from_voters {
            if target.contains_key(&origin) {
                continue;
            }
            let block = to_key.with_markers_of(&vote.block);
            target.insert(origin, VoterVote::new(block, vote.position));
        }
        self.push_history(UndoKind::Merge, previous);
        debug!("merge: merged {:?} into {:?}", from.to_string(), to.to_string());
        true
    }

    /// Makes every voter in `voters` support exactly what `target` supports.
    pub fn join(&mut self, voters: &[Origin], target: &Origin) -> bool {
        let voters: Vec<&Origin> = voters.iter().filter(|v| *v != target).collect();
        if voters.is_empty() {
            return false;
        }
        let target_votes = self.votes_by(target);
        if target_votes.is_empty() {
            return false;
        }

        let mut touched: Vec<VoteLineBlock> = self
            .votes
            .iter()
            .filter(|(_, vs)| voters.iter().any(|v| vs.contains_key(*v)))
            .map(|(b, _)| b.clone())
            .collect();
        touched.extend(target_votes.iter().map(|tv| tv.block.clone()));
        let touched_refs: Vec<&VoteLineBlock> = touched.iter().collect();
        let previous = self.snapshot(&touched_refs);

        for voter in voters {
            self.remove_voter(voter);
            for tv in target_votes.iter() {
                self.votes
                    .entry(tv.block.clone())
                    .or_default()
                    .insert(voter.clone(), tv.clone());
            }
        }
        self.push_history(UndoKind::Join, previous);
        true
    }

    /// Removes a block and all its supporters.
    pub fn delete(&mut self, block: &VoteLineBlock) -> bool {
        if !self.votes.contains_key(block) {
            return false;
        }
        let previous = self.snapshot(&[block]);
        self.votes.remove(block);
        self.push_history(UndoKind::Delete, previous);
        true
    }

    /// Replaces a block by several blocks. Every supporter of the original block
    /// supports all the new ones.
    pub fn split(&mut self, block: &VoteLineBlock, into: &[VoteLineBlock]) -> bool {
        if into.is_empty() || !self.votes.contains_key(block) {
            return false;
        }
        let mut touched: Vec<&VoteLineBlock> = vec![block];
        touched.extend(into.iter());
        let previous = self.snapshot(&touched);

        let voters = self.votes.remove(block).unwrap_or_default();
        for (idx, new_block) in into.iter().enumerate() {
            let target = self.votes.entry(new_block.clone()).or_default();
            for (origin, vote) in voters.iter() {
                if target.contains_key(origin) {
                    continue;
                }
                let copy = new_block.with_markers_of(&vote.block);
                target.insert(origin.clone(), VoterVote::new(copy, vote.position + idx));
            }
        }
        self.push_history(UndoKind::Split, previous);
        true
    }

    /// Moves a block under another task.
    pub fn replace_task(&mut self, block: &VoteLineBlock, task: &str) -> bool {
        let key = match self.stored_key(block) {
            Some(k) => k,
            None => return false,
        };
        let relabelled = key.with_task(task);
        if relabelled == key {
            return false;
        }
        let previous = self.snapshot(&[&key, &relabelled]);
        let voters = self.votes.remove(&key).unwrap_or_default();
        let target = self.votes.entry(relabelled).or_default();
        for (origin, vote) in voters {
            if target.contains_key(&origin) {
                continue;
            }
            let copy = vote.block.with_task(task);
            target.insert(origin, VoterVote::new(copy, vote.position));
        }
        self.push_history(UndoKind::ReplaceTask, previous);
        true
    }

    /// Reverts the last mutating operation. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let action = match self.history.pop_back() {
            Some(a) => a,
            None => return false,
        };
        debug!(
            "undo: reverting {:?} on {} block(s)",
            action.kind,
            action.previous.len()
        );
        for (block, previous) in action.previous {
            self.votes.remove(&block);
            if let Some(voters) = previous {
                self.votes.insert(block, voters);
            }
        }
        true
    }

    /// The tasks present in the tally, sorted.
    pub fn tasks(&self) -> Vec<String> {
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for block in self.blocks() {
            seen.entry(task_key(block.task()))
                .or_insert_with(|| block.task().to_string());
        }
        seen.into_values().collect()
    }

    /// The plain-vote tally, grouped by task.
    pub fn snapshot_by_task(&self) -> Vec<TaskTally> {
        let mut by_task: BTreeMap<String, TaskTally> = BTreeMap::new();
        for block in self.blocks() {
            let voters: BTreeSet<Origin> = self
                .votes
                .get(block)
                .map(|v| v.keys().cloned().collect())
                .unwrap_or_default();
            by_task
                .entry(task_key(block.task()))
                .or_insert_with(|| TaskTally {
                    task: block.task().to_string(),
                    entries: Vec::new(),
                })
                .entries
                .push((block.clone(), voters));
        }
        let mut res: Vec<TaskTally> = by_task.into_values().collect();
        for tt in res.iter_mut() {
            tt.entries
                .sort_by(|(b1, v1), (b2, v2)| v2.len().cmp(&v1.len()).then_with(|| b1.cmp(b2)));
        }
        res
    }

    /// The ranked votes of every task, as the input of the ranked counters.
    pub fn ranked_votes_by_task(&self) -> Vec<(String, RankedTaskVotes)> {
        let mut by_task: BTreeMap<String, (String, RankedTaskVotes)> = BTreeMap::new();
        for block in self.blocks() {
            if !block.is_ranked() {
                continue;
            }
            let voters: BTreeMap<Origin, VoteLine> = self
                .votes
                .get(block)
                .map(|v| v.iter().map(|(o, vv)| (o.clone(), vv.line().clone())).collect())
                .unwrap_or_default();
            by_task
                .entry(task_key(block.task()))
                .or_insert_with(|| (block.task().to_string(), BTreeMap::new()))
                .1
                .insert(block.clone(), voters);
        }
        by_task.into_values().collect()
    }
}
