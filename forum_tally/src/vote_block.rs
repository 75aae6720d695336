use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

use crate::config::ComparisonPolicy;
use crate::vote_line::{MarkerType, VoteLine};

// (relative depth, task, content), normalized under the comparison policy.
type LineKey = (usize, String, String);

/// An ordered group of vote lines that forms one tallied unit: a lone line,
/// or a parent line with its indented children.
///
/// Two blocks are equal when their lines have the same structure, tasks and
/// content. Markers are not compared: `[X] Eat cake` and `[+] Eat cake` are the
/// same vote unit.
#[derive(Debug, Clone)]
pub struct VoteLineBlock {
    lines: Vec<VoteLine>,
    policy: ComparisonPolicy,
    key: Vec<LineKey>,
    category: MarkerType,
}

impl VoteLineBlock {
    /// Returns None if there are no lines.
    pub fn new(lines: Vec<VoteLine>, policy: &ComparisonPolicy) -> Option<VoteLineBlock> {
        if lines.is_empty() {
            return None;
        }
        let base_depth = lines.iter().map(|l| l.depth()).min().unwrap_or(0);
        let key: Vec<LineKey> = lines
            .iter()
            .map(|l| {
                (
                    l.depth() - base_depth,
                    policy.normalize(l.task()),
                    policy.normalize(l.clean_content()),
                )
            })
            .collect();
        let category = dominant_marker_type(&lines);
        Some(VoteLineBlock {
            lines,
            policy: *policy,
            key,
            category,
        })
    }

    pub fn from_line(line: VoteLine, policy: &ComparisonPolicy) -> VoteLineBlock {
        let key = vec![(
            0,
            policy.normalize(line.task()),
            policy.normalize(line.clean_content()),
        )];
        let category = line.marker_type();
        VoteLineBlock {
            lines: vec![line],
            policy: *policy,
            key,
            category,
        }
    }

    pub fn lines(&self) -> &[VoteLine] {
        &self.lines
    }

    pub fn first_line(&self) -> &VoteLine {
        &self.lines[0]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The task of the block is the task of its first line.
    pub fn task(&self) -> &str {
        self.lines[0].task()
    }

    pub fn category(&self) -> MarkerType {
        self.category
    }

    pub fn is_ranked(&self) -> bool {
        self.category == MarkerType::Rank
    }

    pub fn policy(&self) -> &ComparisonPolicy {
        &self.policy
    }

    fn rebuilt(&self, lines: Vec<VoteLine>) -> VoteLineBlock {
        // The lines are never empty here: they come from an existing block.
        VoteLineBlock::new(lines, &self.policy).unwrap_or_else(|| self.clone())
    }

    /// A copy of the block whose first line carries the given task.
    pub fn with_task(&self, task: &str) -> VoteLineBlock {
        let mut lines = self.lines.clone();
        lines[0] = lines[0].with_task(task);
        self.rebuilt(lines)
    }

    /// A copy of the block with every line shifted so that the first line
    /// sits at the given depth.
    pub fn reindented(&self, depth: usize) -> VoteLineBlock {
        let base = self.lines[0].depth();
        let lines = self
            .lines
            .iter()
            .map(|l| l.with_depth(depth + l.depth().saturating_sub(base)))
            .collect();
        self.rebuilt(lines)
    }

    /// A copy of this block carrying the markers of another version of a vote.
    ///
    /// Markers are copied line by line when both blocks have the same number
    /// of lines. Otherwise the first marker of `other` is applied to every line.
    pub fn with_markers_of(&self, other: &VoteLineBlock) -> VoteLineBlock {
        let lines: Vec<VoteLine> = if other.lines.len() == self.lines.len() {
            self.lines
                .iter()
                .zip(other.lines.iter())
                .map(|(l, o)| l.with_marker_of(o))
                .collect()
        } else {
            self.lines
                .iter()
                .map(|l| l.with_marker_of(other.first_line()))
                .collect()
        };
        self.rebuilt(lines)
    }

    /// The normalized content of the lines, independent of the markers.
    pub fn normalized_lines(&self) -> Vec<String> {
        self.key
            .iter()
            .map(|(_, task, content)| format!("[{}]{}", task, content))
            .collect()
    }
}

fn dominant_marker_type(lines: &[VoteLine]) -> MarkerType {
    let first = lines[0].marker_type();
    let mut counts: HashMap<MarkerType, usize> = HashMap::new();
    for l in lines {
        *counts.entry(l.marker_type()).or_insert(0) += 1;
    }
    let first_count = counts.get(&first).cloned().unwrap_or(0);
    // Ties go to the type of the first line.
    let mut best = (first, first_count);
    let mut sorted: Vec<(MarkerType, usize)> = counts.into_iter().collect();
    sorted.sort();
    for (mt, count) in sorted {
        if count > best.1 {
            best = (mt, count);
        }
    }
    best.0
}

impl PartialEq for VoteLineBlock {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for VoteLineBlock {}

impl Hash for VoteLineBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for VoteLineBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VoteLineBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Display for VoteLineBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, l) in self.lines.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", l)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote_line::{parse_line, parse_lines};

    fn block(text: &str) -> VoteLineBlock {
        VoteLineBlock::new(parse_lines(text), &ComparisonPolicy::DEFAULT).unwrap()
    }

    #[test]
    fn equality_ignores_marker() {
        assert_eq!(block("[X] Eat cake"), block("[+] Eat cake"));
        assert_ne!(block("[X] Eat cake"), block("[X] Eat pie"));
        assert_eq!(block("[X] Eat cake"), block("[x]   eat CAKE"));
    }

    #[test]
    fn equality_respects_task_and_structure() {
        assert_ne!(block("[X][A] Eat cake"), block("[X][B] Eat cake"));
        assert_ne!(
            block("[X] Plan\n-[X] Eat cake"),
            block("[X] Plan\n--[X] Eat cake")
        );
        assert_eq!(
            block("[X] Plan\n-[X] Eat cake").reindented(2),
            block("[X] Plan\n-[X] Eat cake")
        );
    }

    #[test]
    fn case_sensitive_policy() {
        let strict = ComparisonPolicy {
            case_sensitive: true,
            whitespace_sensitive: false,
        };
        let a = VoteLineBlock::from_line(parse_line("[X] Eat cake").unwrap(), &strict);
        let b = VoteLineBlock::from_line(parse_line("[X] Eat Cake").unwrap(), &strict);
        assert_ne!(a, b);
    }

    #[test]
    fn category_is_dominant_type() {
        assert_eq!(block("[1] A\n-[X] B\n-[2] C").category(), MarkerType::Rank);
        assert_eq!(block("[X] A\n-[1] B").category(), MarkerType::Vote);
    }

    #[test]
    fn markers_are_copied() {
        let plain = block("[X] Plan\n-[X] Eat cake");
        let voter = block("[1] Plan\n-[2] Eat cake");
        let copy = plain.with_markers_of(&voter);
        assert_eq!(copy, plain);
        assert_eq!(copy.lines()[1].marker_value(), 2);
    }

    #[test]
    fn display_lines() {
        assert_eq!(
            block("[X][T] Plan\n-[X] Eat cake").to_string(),
            "[X][T] Plan\n-[X] Eat cake"
        );
    }
}
