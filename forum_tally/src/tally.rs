//! The tally session: runs the posts of a thread through the constructor into
//! the vote storage, and counts the ranked tasks.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{QuestConfig, RankVoteCounterMethod, TallyError};
use crate::constructor::{Construction, Context, PlanRegistry, VoteConstructor, VoterIndex};
use crate::identity::Origin;
use crate::post::Post;
use crate::ranking::{rank_all, TaskRanking};
use crate::storage::{TaskTally, VoteStorage};

/// Number of passes over the deferred posts before they are processed anyway.
pub const MAX_DEFERRAL_PASSES: usize = 10;

/// Cooperative cancellation of a run, checked between two posts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Statistics of a run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunStats {
    /// Posts that went through the constructor.
    pub posts: usize,
    /// Posts that produced a vote.
    pub votes: usize,
    /// Posts ignored because the same author voted again later.
    pub superseded: usize,
    pub passes: usize,
    /// Posts processed with pending references, after the deferral passes ran out.
    pub forced: usize,
}

#[derive(Debug, Clone)]
pub struct Tally {
    config: QuestConfig,
    storage: VoteStorage,
    plans: PlanRegistry,
    voters: VoterIndex,
}

impl Tally {
    pub fn new(config: QuestConfig) -> Result<Tally, TallyError> {
        config.validate()?;
        Ok(Tally {
            plans: PlanRegistry::new(&config.comparison),
            voters: VoterIndex::default(),
            storage: VoteStorage::new(),
            config,
        })
    }

    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    pub fn storage(&self) -> &VoteStorage {
        &self.storage
    }

    /// Gives access to the manual operations (merge, join, delete, split, undo).
    pub fn storage_mut(&mut self) -> &mut VoteStorage {
        &mut self.storage
    }

    pub fn plans(&self) -> &PlanRegistry {
        &self.plans
    }

    fn included<'p>(&self, posts: &'p [Post]) -> Vec<&'p Post> {
        let mut res: Vec<&Post> = Vec::new();
        for post in posts {
            let origin = post.origin();
            if origin.author().is_empty() {
                warn!(
                    "Skipping post {} (#{}): no author",
                    origin.post_id(),
                    origin.thread_post_number()
                );
                continue;
            }
            if self.config.includes_post_number(origin.thread_post_number())
                && self.config.includes_author(origin.author())
                && post.has_vote()
            {
                res.push(post);
            }
        }
        res
    }

    /// Tallies the posts of a thread, given in thread order.
    ///
    /// Everything from a previous run is discarded first. Posts that reference
    /// a voter whose latest vote comes later are retried after the pass.
    pub fn run(&mut self, posts: &[Post], cancel: Option<&CancelFlag>) -> Result<RunStats, TallyError> {
        self.storage.reset();
        self.plans = PlanRegistry::new(&self.config.comparison);
        let included = self.included(posts);
        info!(
            "Tallying {} vote post(s) out of {} post(s)",
            included.len(),
            posts.len()
        );
        if included.is_empty() {
            return Err(TallyError::EmptyTally);
        }
        self.voters = VoterIndex::new(included.iter().cloned(), &self.config.comparison);

        let constructor = VoteConstructor::new(&self.config);
        for post in included.iter() {
            constructor.register_plans(post, &mut self.plans);
        }
        debug!("run: {} plan(s) registered", self.plans.len());

        let mut stats = RunStats::default();
        // Thread number of the last processed post of every voter.
        let mut last_processed: HashMap<Origin, u64> = HashMap::new();
        let mut queue: Vec<&Post> = included;
        let mut force = false;
        while !queue.is_empty() {
            stats.passes += 1;
            let queued = queue.len();
            let mut deferred: Vec<&Post> = Vec::new();
            for post in queue {
                if cancel.map_or(false, |c| c.is_canceled()) {
                    info!("Run canceled after {} post(s)", stats.posts);
                    return Err(TallyError::Canceled);
                }
                let origin = post.origin();
                if last_processed
                    .get(origin)
                    .map_or(false, |n| *n > origin.thread_post_number())
                {
                    debug!("run: post {} of {} is superseded", origin.post_id(), origin);
                    stats.superseded += 1;
                    continue;
                }
                let construction = {
                    let ctx = Context {
                        storage: &self.storage,
                        plans: &self.plans,
                        voters: &self.voters,
                    };
                    constructor.construct(post, &ctx, force)
                };
                match construction {
                    Construction::Deferred(target) => {
                        debug!("run: deferring post {} of {} until {} is processed", origin.post_id(), origin, target);
                        deferred.push(post);
                    }
                    Construction::Votes(blocks) => {
                        if force {
                            stats.forced += 1;
                        }
                        if !blocks.is_empty() {
                            self.storage.add_votes(&blocks, origin);
                            stats.votes += 1;
                        }
                        self.voters.mark_processed(origin);
                        last_processed.insert(origin.clone(), origin.thread_post_number());
                        stats.posts += 1;
                    }
                }
            }
            if !deferred.is_empty() && (deferred.len() == queued || stats.passes >= MAX_DEFERRAL_PASSES) {
                warn!(
                    "Processing {} deferred post(s) with unresolved references after {} pass(es)",
                    deferred.len(),
                    stats.passes
                );
                force = true;
            }
            queue = deferred;
        }
        self.storage.clear_history();
        info!(
            "Tally done: {} vote(s), {} block(s), {} pass(es)",
            stats.votes,
            self.storage.len(),
            stats.passes
        );
        Ok(stats)
    }

    /// The plain votes, per task.
    pub fn snapshot(&self) -> Vec<TaskTally> {
        self.storage.snapshot_by_task()
    }

    /// The ranked tasks, counted with the method of the quest.
    pub fn rankings(&self) -> Vec<TaskRanking> {
        self.rankings_with(self.config.ranked_vote_method)
    }

    pub fn rankings_with(&self, method: RankVoteCounterMethod) -> Vec<TaskRanking> {
        rank_all(&self.storage, method)
    }
}
