use crate::identity::{Origin, PostId};
use crate::vote_line::{parse_lines, VoteLine};

/// A post of the thread, already fetched and flattened to decorated text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Post {
    origin: Origin,
    text: String,
    vote_lines: Vec<VoteLine>,
}

impl Post {
    pub fn new(origin: Origin, text: &str) -> Post {
        Post {
            vote_lines: parse_lines(text),
            origin,
            text: text.to_string(),
        }
    }

    /// Shortcut to build a post of a thread.
    pub fn from_parts(author: &str, post_id: &str, number: u64, thread: &str, text: &str) -> Post {
        Post::new(
            Origin::new(author, PostId::new(post_id), number, thread, ""),
            text,
        )
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vote_lines(&self) -> &[VoteLine] {
        &self.vote_lines
    }

    /// A post is a vote if it contains at least one vote line.
    pub fn has_vote(&self) -> bool {
        !self.vote_lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_is_not_a_vote() {
        let p = Post::from_parts("A", "1", 1, "t", "Hello there.\nNice update!");
        assert!(!p.has_vote());
        let p = Post::from_parts("A", "2", 2, "t", "Hello\n[X] Go left\n-[X] Carefully");
        assert!(p.has_vote());
        assert_eq!(p.vote_lines().len(), 2);
        assert_eq!(p.origin().author(), "A");
    }
}
