//! Tallies the votes cast in the posts of a forum quest thread.
//!
//! Posts are parsed into vote lines, grouped into blocks according to the
//! partition mode of the quest, and stored per voter. References to plans and
//! to other voters are resolved along the way. Ranked tasks are then ordered
//! with one of the ranked-choice counters.

mod config;
pub mod constructor;
pub mod identity;
pub mod markup;
pub mod post;
pub mod ranking;
pub mod storage;
pub mod tally;
pub mod vote_block;
pub mod vote_line;

pub use crate::config::*;
pub use crate::identity::{IdentityType, Origin, PostId};
pub use crate::post::Post;
pub use crate::ranking::{RankResult, TaskRanking};
pub use crate::storage::{TaskTally, VoteStorage, VoterVote};
pub use crate::tally::{CancelFlag, RunStats, Tally, MAX_DEFERRAL_PASSES};
pub use crate::vote_block::VoteLineBlock;
pub use crate::vote_line::{parse_line, parse_lines, MarkerType, VoteLine};
