// ********* Quest configuration ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The granularity at which the vote of a post is split into independently
/// tallied units.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum PartitionMode {
    /// The whole vote of a post is a single unit.
    None,
    /// Every line is a unit. Tasks are not inherited.
    ByLine,
    /// Every line is a unit. Child lines without a task inherit the task of
    /// their top-level line.
    ByLineTask,
    /// A top-level line and its indented children form a unit.
    ByBlock,
    /// Like `ByBlock`, but references to plans are exploded into the blocks
    /// of the plan.
    ByBlockAll,
}

impl PartitionMode {
    pub fn is_by_line(&self) -> bool {
        matches!(self, PartitionMode::ByLine | PartitionMode::ByLineTask)
    }
}

impl FromStr for PartitionMode {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "none" => Ok(PartitionMode::None),
            "byline" | "line" => Ok(PartitionMode::ByLine),
            "bylinetask" | "linetask" => Ok(PartitionMode::ByLineTask),
            "byblock" | "block" => Ok(PartitionMode::ByBlock),
            "byblockall" | "blockall" => Ok(PartitionMode::ByBlockAll),
            _ => Err(TallyError::InvalidArgument(format!(
                "unknown partition mode: {:?}",
                s
            ))),
        }
    }
}

/// The algorithm used to order the options of a ranked task.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RankVoteCounterMethod {
    InstantRunoff,
    Baldwin,
    Coombs,
    Wilson,
    RatedInstantRunoff,
}

impl RankVoteCounterMethod {
    pub const ALL: [RankVoteCounterMethod; 5] = [
        RankVoteCounterMethod::InstantRunoff,
        RankVoteCounterMethod::Baldwin,
        RankVoteCounterMethod::Coombs,
        RankVoteCounterMethod::Wilson,
        RankVoteCounterMethod::RatedInstantRunoff,
    ];
}

impl FromStr for RankVoteCounterMethod {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "irv" | "instantrunoff" => Ok(RankVoteCounterMethod::InstantRunoff),
            "baldwin" => Ok(RankVoteCounterMethod::Baldwin),
            "coombs" => Ok(RankVoteCounterMethod::Coombs),
            "wilson" | "wilsonscore" => Ok(RankVoteCounterMethod::Wilson),
            "rirv" | "ratedinstantrunoff" => Ok(RankVoteCounterMethod::RatedInstantRunoff),
            _ => Err(TallyError::InvalidArgument(format!(
                "unknown ranked vote counting method: {:?}",
                s
            ))),
        }
    }
}

impl Display for RankVoteCounterMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RankVoteCounterMethod::InstantRunoff => "instant-runoff",
            RankVoteCounterMethod::Baldwin => "baldwin",
            RankVoteCounterMethod::Coombs => "coombs",
            RankVoteCounterMethod::Wilson => "wilson",
            RankVoteCounterMethod::RatedInstantRunoff => "rated-instant-runoff",
        };
        write!(f, "{}", name)
    }
}

/// Controls which differences in the text of a vote are significant when
/// comparing vote content, tasks and plan names.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct ComparisonPolicy {
    pub case_sensitive: bool,
    pub whitespace_sensitive: bool,
}

impl ComparisonPolicy {
    pub const DEFAULT: ComparisonPolicy = ComparisonPolicy {
        case_sensitive: false,
        whitespace_sensitive: false,
    };

    /// The canonical form of a piece of text under this policy.
    pub fn normalize(&self, text: &str) -> String {
        let trimmed = text.trim();
        let spaced: String = if self.whitespace_sensitive {
            trimmed.to_string()
        } else {
            trimmed.chars().filter(|c| !c.is_whitespace()).collect()
        };
        if self.case_sensitive {
            spaced
        } else {
            spaced.to_lowercase()
        }
    }

    pub fn equals(&self, left: &str, right: &str) -> bool {
        self.normalize(left) == self.normalize(right)
    }
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        ComparisonPolicy::DEFAULT
    }
}

/// Restricts the tally to the listed tasks when enabled.
///
/// Task names are always matched case-insensitively.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TaskFilter {
    pub enabled: bool,
    pub names: Vec<String>,
}

impl TaskFilter {
    pub const DISABLED: TaskFilter = TaskFilter {
        enabled: false,
        names: Vec::new(),
    };

    pub fn new(names: &[String]) -> TaskFilter {
        TaskFilter {
            enabled: !names.is_empty(),
            names: names.to_vec(),
        }
    }

    pub fn allows(&self, task: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let task = task.trim().to_lowercase();
        self.names.iter().any(|n| n.trim().to_lowercase() == task)
    }
}

/// A set of thread post numbers, written as `N` and `N-M` items separated by commas.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PostNumberFilter {
    ranges: Vec<(u64, u64)>,
}

impl PostNumberFilter {
    pub const EMPTY: PostNumberFilter = PostNumberFilter { ranges: Vec::new() };

    pub fn contains(&self, number: u64) -> bool {
        self.ranges
            .iter()
            .any(|(low, high)| *low <= number && number <= *high)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

fn parse_post_number(s: &str) -> Result<u64, TallyError> {
    let trimmed = s.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(TallyError::InvalidArgument(format!(
            "negative post number: {}",
            n
        ))),
        Ok(n) => Ok(n as u64),
        Err(_) => Err(TallyError::InvalidArgument(format!(
            "invalid post number: {:?}",
            trimmed
        ))),
    }
}

impl FromStr for PostNumberFilter {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges: Vec<(u64, u64)> = Vec::new();
        for item in s.split(',').map(|x| x.trim()).filter(|x| !x.is_empty()) {
            if item.starts_with('-') {
                return Err(TallyError::InvalidArgument(format!(
                    "negative post number in filter: {:?}",
                    item
                )));
            }
            match item.split_once('-') {
                Some((low, high)) => {
                    let low = parse_post_number(low)?;
                    let high = parse_post_number(high)?;
                    if low > high {
                        return Err(TallyError::InvalidArgument(format!(
                            "empty post range: {:?}",
                            item
                        )));
                    }
                    ranges.push((low, high));
                }
                None => {
                    for n in item.split_whitespace() {
                        let n = parse_post_number(n)?;
                        ranges.push((n, n));
                    }
                }
            }
        }
        Ok(PostNumberFilter { ranges })
    }
}

/// The read-only configuration of a tally run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestConfig {
    /// The thread the posts come from. Part of the identity of every voter.
    pub thread: String,
    pub partition_mode: PartitionMode,
    pub ranked_vote_method: RankVoteCounterMethod,
    pub comparison: ComparisonPolicy,
    pub task_filter: TaskFilter,
    /// Authors whose posts are ignored.
    pub username_filter: Vec<String>,
    /// Thread post numbers that are ignored.
    pub post_filter: PostNumberFilter,
    /// First thread post number to consider (1-based).
    pub start_post: u64,
    /// Last thread post number to consider. Zero reads to the end of the thread.
    pub end_post: u64,
    pub proxy_votes_enabled: bool,
    pub force_pinned_proxy_votes: bool,
    pub forbid_vote_label_plan_names: bool,
}

impl QuestConfig {
    pub const DEFAULT: QuestConfig = QuestConfig {
        thread: String::new(),
        partition_mode: PartitionMode::ByBlock,
        ranked_vote_method: RankVoteCounterMethod::InstantRunoff,
        comparison: ComparisonPolicy::DEFAULT,
        task_filter: TaskFilter::DISABLED,
        username_filter: Vec::new(),
        post_filter: PostNumberFilter::EMPTY,
        start_post: 1,
        end_post: 0,
        proxy_votes_enabled: true,
        force_pinned_proxy_votes: false,
        forbid_vote_label_plan_names: false,
    };

    pub fn validate(&self) -> Result<(), TallyError> {
        if self.start_post == 0 {
            return Err(TallyError::InvalidArgument(
                "the start post number must be at least 1".to_string(),
            ));
        }
        if self.end_post != 0 && self.end_post < self.start_post {
            return Err(TallyError::InvalidArgument(format!(
                "the end post {} is before the start post {}",
                self.end_post, self.start_post
            )));
        }
        if self.task_filter.enabled && self.task_filter.names.is_empty() {
            return Err(TallyError::InvalidArgument(
                "the task filter is enabled but lists no task".to_string(),
            ));
        }
        Ok(())
    }

    pub fn includes_post_number(&self, number: u64) -> bool {
        number >= self.start_post
            && (self.end_post == 0 || number <= self.end_post)
            && !self.post_filter.contains(number)
    }

    pub fn includes_author(&self, author: &str) -> bool {
        let author = author.trim().to_lowercase();
        !self
            .username_filter
            .iter()
            .any(|u| u.trim().to_lowercase() == author)
    }
}

impl Default for QuestConfig {
    fn default() -> Self {
        QuestConfig::DEFAULT
    }
}

/// Errors that prevent a tally from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyError {
    /// A configuration or argument error. This is a bug of the caller.
    InvalidArgument(String),
    /// The run was canceled between two posts.
    Canceled,
    /// There was nothing to tally.
    EmptyTally,
}

impl Error for TallyError {}

impl Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            TallyError::Canceled => write!(f, "the tally was canceled"),
            TallyError::EmptyTally => write!(f, "no votes to tally"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_filter_ranges() {
        let f: PostNumberFilter = "12, 40-45,  7 9".parse().unwrap();
        assert!(f.contains(12));
        assert!(f.contains(40));
        assert!(f.contains(45));
        assert!(f.contains(9));
        assert!(!f.contains(46));
        assert!(!f.contains(8));
    }

    #[test]
    fn post_filter_rejects_negative() {
        assert!(matches!(
            "-4".parse::<PostNumberFilter>(),
            Err(TallyError::InvalidArgument(_))
        ));
        assert!("10-4".parse::<PostNumberFilter>().is_err());
        assert!("abc".parse::<PostNumberFilter>().is_err());
    }

    #[test]
    fn unknown_modes_fail_fast() {
        assert_eq!("by_block".parse::<PartitionMode>(), Ok(PartitionMode::ByBlock));
        assert_eq!("ByLineTask".parse::<PartitionMode>(), Ok(PartitionMode::ByLineTask));
        assert!("paragraph".parse::<PartitionMode>().is_err());
        assert_eq!(
            "RIRV".parse::<RankVoteCounterMethod>(),
            Ok(RankVoteCounterMethod::RatedInstantRunoff)
        );
        assert!("borda".parse::<RankVoteCounterMethod>().is_err());
    }

    #[test]
    fn validate_post_window() {
        let mut config = QuestConfig::DEFAULT;
        assert!(config.validate().is_ok());
        config.start_post = 0;
        assert!(config.validate().is_err());
        config.start_post = 10;
        config.end_post = 5;
        assert!(config.validate().is_err());
        config.end_post = 0;
        assert!(config.includes_post_number(10));
        assert!(!config.includes_post_number(9));
    }

    #[test]
    fn comparison_policy() {
        let p = ComparisonPolicy::DEFAULT;
        assert!(p.equals("Eat  Cake", "eatcake"));
        let strict = ComparisonPolicy {
            case_sensitive: true,
            whitespace_sensitive: true,
        };
        assert!(!strict.equals("Eat Cake", "eat cake"));
        assert!(strict.equals(" Eat Cake ", "Eat Cake"));
    }

    #[test]
    fn task_filter_is_case_insensitive() {
        let f = TaskFilter::new(&["Plot".to_string()]);
        assert!(f.allows("plot"));
        assert!(!f.allows("Action"));
        assert!(TaskFilter::DISABLED.allows("anything"));
    }
}
