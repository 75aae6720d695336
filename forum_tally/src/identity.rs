use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// The identifier of a post, as given by the forum.
///
/// Identifiers compare numerically when both are numbers, and lexically
/// otherwise. Numeric identifiers come first.
#[derive(Debug, Clone, Default)]
pub struct PostId {
    text: String,
    number: Option<u64>,
}

impl PostId {
    /// The unknown post.
    pub const ZERO: PostId = PostId {
        text: String::new(),
        number: Some(0),
    };

    pub fn new(id: &str) -> PostId {
        let text = id.trim().to_string();
        if text.is_empty() {
            return PostId::ZERO;
        }
        let number = text.parse::<u64>().ok();
        PostId { text, number }
    }

    pub fn is_zero(&self) -> bool {
        self.number == Some(0) || (self.number.is_none() && self.text.is_empty())
    }

    pub fn number(&self) -> Option<u64> {
        self.number
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for PostId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PostId {}

impl Hash for PostId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.number {
            Some(n) => n.hash(state),
            None => self.text.hash(state),
        }
    }
}

impl PartialOrd for PostId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PostId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.text.cmp(&other.text),
        }
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.number {
            Some(0) if self.text.is_empty() => write!(f, "0"),
            _ => write!(f, "{}", self.text),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum IdentityType {
    User,
    Plan,
}

/// Canonical form of a name: case and whitespace are not significant.
pub fn name_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Who cast a vote, and where.
///
/// The identity is the author (case and whitespace insensitive), its type and
/// the thread. The post id, post number and permalink only record where the
/// vote was cast.
#[derive(Debug, Clone)]
pub struct Origin {
    author: String,
    author_type: IdentityType,
    post_id: PostId,
    thread_post_number: u64,
    thread: String,
    permalink: String,
    key: String,
}

impl Origin {
    pub fn new(
        author: &str,
        post_id: PostId,
        thread_post_number: u64,
        thread: &str,
        permalink: &str,
    ) -> Origin {
        let author = author.trim().to_string();
        Origin {
            key: name_key(&author),
            author,
            author_type: IdentityType::User,
            post_id,
            thread_post_number,
            thread: thread.trim().to_string(),
            permalink: permalink.trim().to_string(),
        }
    }

    /// A user origin without any provenance, mostly useful to look up voters.
    pub fn user(author: &str, thread: &str) -> Origin {
        Origin::new(author, PostId::ZERO, 0, thread, "")
    }

    /// The origin of a plan defined in the post of this origin.
    pub fn as_plan(&self, plan_name: &str) -> Origin {
        let author = plan_name.trim().to_string();
        Origin {
            key: name_key(&author),
            author,
            author_type: IdentityType::Plan,
            ..self.clone()
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn author_type(&self) -> IdentityType {
        self.author_type
    }

    pub fn is_plan(&self) -> bool {
        self.author_type == IdentityType::Plan
    }

    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    pub fn thread_post_number(&self) -> u64 {
        self.thread_post_number
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    pub fn name_key(&self) -> &str {
        &self.key
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.key == name_key(name)
    }

    fn identity(&self) -> (IdentityType, String, &str) {
        (self.author_type, self.thread.to_lowercase(), &self.key)
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Origin {}

impl Hash for Origin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Origin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Origin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.author_type {
            IdentityType::User => write!(f, "{}", self.author),
            IdentityType::Plan => write!(f, "Plan: {}", self.author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_ids_compare_numerically() {
        assert!(PostId::new("9") < PostId::new("10"));
        assert_eq!(PostId::new("010"), PostId::new("10"));
        assert!(PostId::new("abc") < PostId::new("abd"));
        assert!(PostId::new("99999") < PostId::new("a1"));
        assert!(PostId::ZERO.is_zero());
        assert!(PostId::new("").is_zero());
    }

    #[test]
    fn empty_post_id_is_zero() {
        assert_eq!(PostId::new(""), PostId::ZERO);
        assert_eq!(PostId::new("  "), PostId::ZERO);
        assert!(PostId::new("") < PostId::new("1"));
        assert_eq!(PostId::new("").to_string(), "0");
    }

    #[test]
    fn origin_identity_ignores_provenance() {
        let a = Origin::new("Kinematics", PostId::new("100"), 3, "thread", "");
        let b = Origin::new(" kine matics ", PostId::new("250"), 9, "thread", "");
        assert_eq!(a, b);
        let c = Origin::new("Kinematics", PostId::new("100"), 3, "other", "");
        assert_ne!(a, c);
    }

    #[test]
    fn plans_are_distinct_from_users() {
        let user = Origin::new("Atreya", PostId::new("5"), 1, "t", "");
        let plan = user.as_plan("Atreya");
        assert_ne!(user, plan);
        assert!(plan.is_plan());
        assert_eq!(plan.post_id(), user.post_id());
        assert!(user < plan);
    }
}
