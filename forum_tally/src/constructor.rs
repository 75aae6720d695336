//! Turns the vote lines of a post into the blocks that are tallied.
//!
//! This covers the registration of plans, the resolution of references to
//! plans and to other voters, and the partitioning of the resulting lines
//! according to the partition mode of the quest.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{ComparisonPolicy, PartitionMode, QuestConfig};
use crate::identity::{Origin, PostId};
use crate::post::Post;
use crate::storage::VoteStorage;
use crate::vote_block::VoteLineBlock;
use crate::vote_line::{MarkerType, VoteLine};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum PlanKind {
    /// A plan the author also votes for.
    Content,
    /// A proposal: registered, but not a vote of the author.
    Base,
}

/// Strips a keyword at the start of the text, ignoring case.
///
/// The keyword must be followed by whitespace, a colon or the end of the text.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == ':' => Some(rest),
        _ => None,
    }
}

fn clean_name(text: &str) -> Option<String> {
    let name = text
        .trim()
        .trim_start_matches(':')
        .trim_end_matches(|c: char| c == ':' || c == '.')
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn plan_name_of(line: &VoteLine) -> Option<(PlanKind, String)> {
    let content = line.clean_content().trim();
    if let Some(rest) = strip_keyword(content, "base plan") {
        return clean_name(rest).map(|name| (PlanKind::Base, name));
    }
    strip_keyword(content, "plan")
        .and_then(clean_name)
        .map(|name| (PlanKind::Content, name))
}

/// A line that may stand for the vote of a plan or of another voter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Reference {
    pub name: String,
    /// Pinned references (`^Name`, `pin Name`) use the current vote of the
    /// target and never wait for it.
    pub pinned: bool,
}

/// Reads the content of a line as a reference. Whether the name designates
/// anything is only known at resolution.
pub fn parse_reference(line: &VoteLine) -> Option<Reference> {
    let mut text = line.clean_content().trim();
    let mut pinned = false;
    if let Some(rest) = text.strip_prefix('^') {
        pinned = true;
        text = rest.trim_start();
    } else if let Some(rest) = strip_keyword(text, "pin") {
        pinned = true;
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_prefix('@') {
        text = rest;
    }
    if let Some(rest) = strip_keyword(text, "base plan").or_else(|| strip_keyword(text, "plan")) {
        text = rest;
    }
    clean_name(text).map(|name| Reference { name, pinned })
}

/// A named vote proposed in a post, that other voters may reference.
#[derive(Debug, Clone)]
pub struct Plan {
    name: String,
    origin: Origin,
    block: VoteLineBlock,
}

impl Plan {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The plan identity, which carries the post that defined it.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The plan line followed by the content of the plan.
    pub fn block(&self) -> &VoteLineBlock {
        &self.block
    }
}

/// The plans of a run. The first plan registered under a name wins.
#[derive(Debug, Clone, Default)]
pub struct PlanRegistry {
    policy: ComparisonPolicy,
    plans: BTreeMap<String, Plan>,
}

impl PlanRegistry {
    pub fn new(policy: &ComparisonPolicy) -> PlanRegistry {
        PlanRegistry {
            policy: *policy,
            plans: BTreeMap::new(),
        }
    }

    /// Returns false if a plan with the same name already exists.
    pub fn register(&mut self, name: &str, author: &Origin, block: VoteLineBlock) -> bool {
        let key = self.policy.normalize(name);
        if key.is_empty() || self.plans.contains_key(&key) {
            return false;
        }
        debug!("register_plan: {:?} from {}", name, author);
        self.plans.insert(
            key,
            Plan {
                name: name.to_string(),
                origin: author.as_plan(name),
                block,
            },
        );
        true
    }

    pub fn get(&self, name: &str) -> Option<&Plan> {
        self.plans.get(&self.policy.normalize(name))
    }

    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }
}

/// The voters of the thread, and whether their latest vote has been processed.
#[derive(Debug, Clone, Default)]
pub struct VoterIndex {
    policy: ComparisonPolicy,
    by_name: HashMap<String, Origin>,
    latest: HashMap<Origin, PostId>,
    pending: HashSet<Origin>,
}

impl VoterIndex {
    /// Indexes the authors of the posts that contain a vote, in thread order.
    pub fn new<'p, I: IntoIterator<Item = &'p Post>>(
        posts: I,
        policy: &ComparisonPolicy,
    ) -> VoterIndex {
        let mut res = VoterIndex {
            policy: *policy,
            ..VoterIndex::default()
        };
        for post in posts.into_iter().filter(|p| p.has_vote()) {
            let origin = post.origin();
            res.by_name
                .insert(policy.normalize(origin.author()), origin.clone());
            res.latest.insert(origin.clone(), origin.post_id().clone());
            res.pending.insert(origin.clone());
        }
        res
    }

    pub fn find(&self, name: &str) -> Option<&Origin> {
        self.by_name.get(&self.policy.normalize(name))
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// True while the latest vote of the voter has not been processed.
    pub fn is_pending(&self, voter: &Origin) -> bool {
        self.pending.contains(voter)
    }

    pub fn mark_processed(&mut self, origin: &Origin) {
        if self.latest.get(origin) == Some(origin.post_id()) {
            self.pending.remove(origin);
        }
    }
}

/// The state of the tally that the resolution of references reads.
pub struct Context<'a> {
    pub storage: &'a VoteStorage,
    pub plans: &'a PlanRegistry,
    pub voters: &'a VoterIndex,
}

/// What to do with a post.
#[derive(Debug, Clone)]
pub enum Construction {
    /// The blocks to store for the author. Empty when the post holds no vote.
    Votes(Vec<VoteLineBlock>),
    /// The post references a voter whose latest vote was not processed yet.
    Deferred(Origin),
}

enum Resolution {
    Literal,
    Lines { lines: Vec<VoteLine>, from_plan: bool },
    Defer(Origin),
}

// A run of lines after plan handling and reference expansion.
struct Segment {
    lines: Vec<VoteLine>,
    from_plan: bool,
}

/// Splits lines into groups made of a top-level line and the lines nested under it.
fn split_top_level(lines: &[VoteLine]) -> Vec<Vec<VoteLine>> {
    let mut groups: Vec<Vec<VoteLine>> = Vec::new();
    let mut base = 0;
    for l in lines {
        if !groups.is_empty() && l.depth() > base {
            if let Some(g) = groups.last_mut() {
                g.push(l.clone());
            }
        } else {
            base = l.depth();
            groups.push(vec![l.clone()]);
        }
    }
    groups
}

fn to_top_level(lines: &[VoteLine]) -> Vec<VoteLine> {
    let base = lines.iter().map(|l| l.depth()).min().unwrap_or(0);
    lines.iter().map(|l| l.with_depth(l.depth() - base)).collect()
}

/// Places the lines of a target under the reference line that replaces them.
fn expand(lines: &[VoteLine], reference: &VoteLine) -> Vec<VoteLine> {
    to_top_level(lines)
        .into_iter()
        .map(|l| {
            let top = l.depth() == 0;
            let moved = l.with_depth(reference.depth() + l.depth());
            if top && moved.task().is_empty() && !reference.task().is_empty() {
                moved.with_task(reference.task())
            } else {
                moved
            }
        })
        .collect()
}

/// Ranked lines are separate options: every line of a group holding a rank
/// becomes its own group, and inherits the task of its top-level line.
fn split_ranked(group: Vec<VoteLine>) -> Vec<Vec<VoteLine>> {
    if !group.iter().any(|l| l.marker_type() == MarkerType::Rank) {
        return vec![group];
    }
    let base = group.iter().map(|l| l.depth()).min().unwrap_or(0);
    let mut parent_task = String::new();
    let mut res = Vec::new();
    for l in group {
        if l.depth() == base {
            parent_task = l.task().to_string();
        }
        let line = if l.task().is_empty() {
            l.with_task(&parent_task)
        } else {
            l
        };
        res.push(vec![line.with_depth(0)]);
    }
    res
}

pub struct VoteConstructor<'a> {
    config: &'a QuestConfig,
}

impl<'a> VoteConstructor<'a> {
    pub fn new(config: &'a QuestConfig) -> VoteConstructor<'a> {
        VoteConstructor { config }
    }

    fn policy(&self) -> &ComparisonPolicy {
        &self.config.comparison
    }

    // A post whose first line names a plan, without children, and that has more
    // lines after it: the whole vote is the plan.
    fn label_plan(&self, groups: &[Vec<VoteLine>]) -> Option<(String, Vec<VoteLine>)> {
        if self.config.forbid_vote_label_plan_names || groups.len() < 2 || groups[0].len() != 1 {
            return None;
        }
        let label = &groups[0][0];
        let name = match plan_name_of(label) {
            Some((PlanKind::Content, name)) => name,
            _ => return None,
        };
        let mut lines = vec![label.with_depth(0)];
        for g in &groups[1..] {
            for l in to_top_level(g) {
                lines.push(l.with_depth(l.depth() + 1));
            }
        }
        Some((name, lines))
    }

    fn plan_block(&self, kind: PlanKind, name: &str, group: &[VoteLine]) -> Option<VoteLineBlock> {
        let mut lines = to_top_level(group);
        if kind == PlanKind::Base {
            lines[0] = lines[0].with_content(&format!("Plan {}", name));
        }
        VoteLineBlock::new(lines, self.policy())
    }

    /// Registers the plans defined in a post. Returns the number of new plans.
    pub fn register_plans(&self, post: &Post, plans: &mut PlanRegistry) -> usize {
        let groups = split_top_level(post.vote_lines());
        if let Some((name, lines)) = self.label_plan(&groups) {
            return match VoteLineBlock::new(lines, self.policy()) {
                Some(block) => {
                    if plans.register(&name, post.origin(), block) {
                        1
                    } else {
                        0
                    }
                }
                None => 0,
            };
        }
        let mut count = 0;
        for g in groups.iter().filter(|g| g.len() > 1) {
            if let Some((kind, name)) = plan_name_of(&g[0]) {
                if let Some(block) = self.plan_block(kind, &name, g) {
                    if plans.register(&name, post.origin(), block) {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    fn resolve(&self, line: &VoteLine, author: &Origin, ctx: &Context, force: bool) -> Resolution {
        let reference = match parse_reference(line) {
            Some(r) => r,
            None => return Resolution::Literal,
        };
        if let Some(plan) = ctx.plans.get(&reference.name) {
            let lines = expand(plan.block().lines(), line)
                .into_iter()
                .map(|l| if l.depth() == line.depth() { l.with_marker_of(line) } else { l })
                .collect();
            return Resolution::Lines {
                lines,
                from_plan: true,
            };
        }
        if !self.config.proxy_votes_enabled {
            return Resolution::Literal;
        }
        let target = match ctx.voters.find(&reference.name) {
            Some(t) => t,
            None => return Resolution::Literal,
        };
        let pinned = reference.pinned || self.config.force_pinned_proxy_votes;
        if target != author && !pinned && !force && ctx.voters.is_pending(target) {
            return Resolution::Defer(target.clone());
        }
        let stored: Vec<VoteLine> = ctx
            .storage
            .votes_by(target)
            .iter()
            .flat_map(|vv| vv.block().lines().to_vec())
            .collect();
        if stored.is_empty() {
            debug!("resolve: no referral for {:?} in post of {}", reference.name, author);
            return Resolution::Literal;
        }
        Resolution::Lines {
            lines: expand(&stored, line),
            from_plan: false,
        }
    }

    fn partition(&self, segments: Vec<Segment>) -> Vec<Vec<VoteLine>> {
        let all_lines = || -> Vec<VoteLine> {
            segments
                .iter()
                .flat_map(|s| s.lines.iter().cloned())
                .collect()
        };
        match self.config.partition_mode {
            PartitionMode::None => vec![to_top_level(&all_lines())],
            PartitionMode::ByLine => all_lines()
                .iter()
                .map(|l| vec![l.with_depth(0)])
                .collect(),
            PartitionMode::ByLineTask => {
                let lines = to_top_level(&all_lines());
                let mut parent_task = String::new();
                let mut res = Vec::new();
                for l in lines {
                    if l.depth() == 0 {
                        parent_task = l.task().to_string();
                    }
                    let line = if l.task().is_empty() {
                        l.with_task(&parent_task)
                    } else {
                        l
                    };
                    res.push(vec![line.with_depth(0)]);
                }
                res
            }
            PartitionMode::ByBlock => split_top_level(&all_lines()),
            PartitionMode::ByBlockAll => {
                let mut res = Vec::new();
                for s in segments.iter() {
                    if !s.from_plan || s.lines.len() < 2 {
                        res.extend(split_top_level(&s.lines));
                        continue;
                    }
                    // The plan line itself is dropped, its content is voted block by block.
                    let plan_task = s.lines[0].task().to_string();
                    for g in split_top_level(&s.lines[1..]) {
                        let mut g = to_top_level(&g);
                        if g[0].task().is_empty() {
                            g[0] = g[0].with_task(&plan_task);
                        }
                        res.push(g);
                    }
                }
                res
            }
        }
    }

    /// Builds the blocks of a post.
    ///
    /// Unless `force` is set, a post that references a voter whose latest vote
    /// is still pending is deferred. When forced, such references use the
    /// current vote of the target, or stay literal content.
    pub fn construct(&self, post: &Post, ctx: &Context, force: bool) -> Construction {
        let author = post.origin();
        let mut groups = split_top_level(post.vote_lines());
        if let Some((_, lines)) = self.label_plan(&groups) {
            groups = vec![lines];
        }

        let mut segments: Vec<Segment> = Vec::new();
        for g in groups {
            if g.len() > 1 {
                match plan_name_of(&g[0]) {
                    Some((PlanKind::Base, _)) => continue,
                    Some((PlanKind::Content, name)) => {
                        let registered = ctx.plans.get(&name).filter(|plan| {
                            VoteLineBlock::new(to_top_level(&g), self.policy()).as_ref()
                                == Some(plan.block())
                        });
                        match registered {
                            // A copy of a plan defined elsewhere becomes a reference to it.
                            Some(plan) if plan.origin().post_id() != author.post_id() => {
                                debug!("construct: plan {:?} reposted by {}", name, author);
                            }
                            // The definition itself is voted like a reference to the plan.
                            Some(_) => {
                                segments.push(Segment {
                                    lines: g,
                                    from_plan: true,
                                });
                                continue;
                            }
                            None => {
                                segments.push(Segment {
                                    lines: g,
                                    from_plan: false,
                                });
                                continue;
                            }
                        }
                    }
                    None => {
                        segments.push(Segment {
                            lines: g,
                            from_plan: false,
                        });
                        continue;
                    }
                }
            }
            let line = &g[0];
            match self.resolve(line, author, ctx, force) {
                Resolution::Defer(target) => {
                    debug!("construct: post {} of {} waits for {}", author.post_id(), author, target);
                    return Construction::Deferred(target);
                }
                Resolution::Lines { lines, from_plan } => segments.push(Segment { lines, from_plan }),
                Resolution::Literal => segments.push(Segment {
                    lines: vec![line.clone()],
                    from_plan: false,
                }),
            }
        }

        let blocks: Vec<VoteLineBlock> = self
            .partition(segments)
            .into_iter()
            .filter(|g| !g.is_empty())
            .flat_map(split_ranked)
            .filter_map(|g| VoteLineBlock::new(g, self.policy()))
            .filter(|b| self.config.task_filter.allows(b.task()))
            .collect();
        Construction::Votes(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskFilter;
    use crate::vote_line::parse_line;

    fn config(mode: PartitionMode) -> QuestConfig {
        QuestConfig {
            partition_mode: mode,
            ..QuestConfig::DEFAULT
        }
    }

    fn blocks_of(config: &QuestConfig, text: &str) -> Vec<VoteLineBlock> {
        let post = Post::from_parts("Kinematics", "1", 1, "t", text);
        let storage = VoteStorage::new();
        let mut plans = PlanRegistry::new(&config.comparison);
        let constructor = VoteConstructor::new(config);
        constructor.register_plans(&post, &mut plans);
        let voters = VoterIndex::new([&post], &config.comparison);
        let ctx = Context {
            storage: &storage,
            plans: &plans,
            voters: &voters,
        };
        match constructor.construct(&post, &ctx, false) {
            Construction::Votes(blocks) => blocks,
            Construction::Deferred(target) => panic!("unexpected deferral on {}", target),
        }
    }

    fn texts(blocks: &[VoteLineBlock]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn plan_names() {
        let name = |s: &str| plan_name_of(&parse_line(s).unwrap());
        assert_eq!(name("[X] Plan Stealth"), Some((PlanKind::Content, "Stealth".to_string())));
        assert_eq!(name("[X] plan: Stealth:"), Some((PlanKind::Content, "Stealth".to_string())));
        assert_eq!(name("[X] Base Plan: Go"), Some((PlanKind::Base, "Go".to_string())));
        assert_eq!(name("[X] Planet X"), None);
        assert_eq!(name("[X] Plan"), None);
    }

    #[test]
    fn references() {
        let reference = |s: &str| parse_reference(&parse_line(s).unwrap());
        assert_eq!(
            reference("[X] Kinematics."),
            Some(Reference {
                name: "Kinematics".to_string(),
                pinned: false
            })
        );
        assert_eq!(
            reference("[X] ^Kinematics"),
            Some(Reference {
                name: "Kinematics".to_string(),
                pinned: true
            })
        );
        assert_eq!(
            reference("[X] pin @Atreya"),
            Some(Reference {
                name: "Atreya".to_string(),
                pinned: true
            })
        );
        assert_eq!(
            reference("[X] Plan: Stealth:").map(|r| r.name),
            Some("Stealth".to_string())
        );
    }

    #[test]
    fn by_block() {
        let blocks = blocks_of(
            &config(PartitionMode::ByBlock),
            "[X] Plan Stealth\n-[X] Hide\n-[X] Wait\n[X] Eat cake",
        );
        assert_eq!(
            texts(&blocks),
            vec!["[X] Plan Stealth\n-[X] Hide\n-[X] Wait", "[X] Eat cake"]
        );
    }

    #[test]
    fn by_line_drops_indentation() {
        let blocks = blocks_of(&config(PartitionMode::ByLine), "[X][Move] Go\n-[X] left\n[X] Eat cake");
        assert_eq!(texts(&blocks), vec!["[X][Move] Go", "[X] left", "[X] Eat cake"]);
    }

    #[test]
    fn by_line_task_inherits_task() {
        let blocks = blocks_of(
            &config(PartitionMode::ByLineTask),
            "[X][Move] Go\n-[X] left\n[X] Eat cake",
        );
        assert_eq!(
            texts(&blocks),
            vec!["[X][Move] Go", "[X][Move] left", "[X] Eat cake"]
        );
    }

    #[test]
    fn none_keeps_one_block() {
        let blocks = blocks_of(&config(PartitionMode::None), "[X] Eat cake\n[X] Drink tea");
        assert_eq!(texts(&blocks), vec!["[X] Eat cake\n[X] Drink tea"]);
    }

    #[test]
    fn by_line_reassembles_into_none() {
        let text = "[X] Go\n-[X] left\n--[X] carefully\n-[X] then right";
        let whole = blocks_of(&config(PartitionMode::None), text);
        let lines = blocks_of(&config(PartitionMode::ByLine), text);
        assert_eq!(whole.len(), 1);
        let reassembled: Vec<String> = lines.iter().flat_map(|b| b.normalized_lines()).collect();
        assert_eq!(reassembled, whole[0].normalized_lines());
    }

    #[test]
    fn ranked_lines_are_split() {
        let blocks = blocks_of(
            &config(PartitionMode::ByBlock),
            "[1][Pick] Alpha\n-[2] Beta\n[3][Pick] Gamma",
        );
        assert_eq!(
            texts(&blocks),
            vec!["[1][Pick] Alpha", "[2][Pick] Beta", "[3][Pick] Gamma"]
        );
        assert!(blocks.iter().all(|b| b.is_ranked()));
    }

    #[test]
    fn base_plans_are_not_votes() {
        let config = config(PartitionMode::ByBlock);
        let post = Post::from_parts(
            "Kinematics",
            "1",
            1,
            "t",
            "[X] Base Plan: Stealth\n-[X] Hide\n[X] Eat cake",
        );
        let mut plans = PlanRegistry::new(&config.comparison);
        assert_eq!(VoteConstructor::new(&config).register_plans(&post, &mut plans), 1);
        let plan = plans.get("stealth").unwrap();
        assert_eq!(plan.block().to_string(), "[X] Plan Stealth\n-[X] Hide");
        assert!(plan.origin().is_plan());

        let blocks = blocks_of(&config, "[X] Base Plan: Stealth\n-[X] Hide\n[X] Eat cake");
        assert_eq!(texts(&blocks), vec!["[X] Eat cake"]);
    }

    #[test]
    fn label_plans() {
        let text = "[X] Plan Lola\n[X] Run\n-[X] Fast\n[X] Hide";
        let blocks = blocks_of(&config(PartitionMode::ByBlock), text);
        assert_eq!(
            texts(&blocks),
            vec!["[X] Plan Lola\n-[X] Run\n--[X] Fast\n-[X] Hide"]
        );

        let forbidden = QuestConfig {
            forbid_vote_label_plan_names: true,
            ..config(PartitionMode::ByBlock)
        };
        let blocks = blocks_of(&forbidden, text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].to_string(), "[X] Plan Lola");
    }

    #[test]
    fn label_plans_are_registered_once() {
        let config = config(PartitionMode::ByBlock);
        let constructor = VoteConstructor::new(&config);
        let mut plans = PlanRegistry::new(&config.comparison);
        let text = "[X] Plan Lola\n[X] Run\n[X] Hide";
        let first = Post::from_parts("Kinematics", "1", 1, "t", text);
        let second = Post::from_parts("Atreya", "2", 2, "t", text);
        assert_eq!(constructor.register_plans(&first, &mut plans), 1);
        assert_eq!(constructor.register_plans(&second, &mut plans), 0);
        let plan = plans.get("lola").unwrap();
        assert_eq!(plan.block().to_string(), "[X] Plan Lola\n-[X] Run\n-[X] Hide");
        assert_eq!(plan.origin().post_id(), &PostId::new("1"));
    }

    #[test]
    fn task_filter_drops_blocks() {
        let config = QuestConfig {
            task_filter: TaskFilter::new(&["move".to_string()]),
            ..config(PartitionMode::ByBlock)
        };
        let blocks = blocks_of(&config, "[X][Move] Go left\n[X][Talk] Say hi\n[X] Eat cake");
        assert_eq!(texts(&blocks), vec!["[X][Move] Go left"]);
    }

    #[test]
    fn voter_index_tracks_latest_post() {
        let first = Post::from_parts("Atreya", "10", 1, "t", "[X] Eat cake");
        let prose = Post::from_parts("Atreya", "11", 2, "t", "Nice update!");
        let second = Post::from_parts("Atreya", "12", 3, "t", "[X] Eat pie");
        let mut voters = VoterIndex::new([&first, &prose, &second], &ComparisonPolicy::DEFAULT);
        let atreya = voters.find("atreya").cloned().unwrap();
        assert_eq!(voters.len(), 1);
        assert!(voters.is_pending(&atreya));
        voters.mark_processed(first.origin());
        assert!(voters.is_pending(&atreya));
        voters.mark_processed(second.origin());
        assert!(!voters.is_pending(&atreya));
    }
}
