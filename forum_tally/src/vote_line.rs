use std::fmt::Display;

use crate::markup::{strip_decoration, tokenize, Markup, Token};

/// The kind of marker that starts a vote line.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum MarkerType {
    /// A checkbox: `[X]`
    Vote,
    /// A rank: `[1]`, `[#2]`. Lower is better.
    Rank,
    /// A score: `[75%]`
    Score,
    /// An approval: `[+]` or `[-]`
    Approval,
}

pub const VOTE_VALUE: u32 = 100;
pub const MAX_RANK: u32 = 99;
pub const APPROVE_VALUE: u32 = 80;
pub const DISAPPROVE_VALUE: u32 = 20;

const CHECKBOX_GLYPHS: [char; 8] = ['x', 'X', '✓', '✔', '✗', '✘', '☒', '☑'];
const INDENT_GLYPHS: [char; 3] = ['-', '—', '–'];

/// Interprets the body of a marker (the text between the brackets).
fn parse_marker(marker: &str) -> Option<(MarkerType, u32)> {
    let mut chars = marker.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if CHECKBOX_GLYPHS.contains(&c) {
            return Some((MarkerType::Vote, VOTE_VALUE));
        }
        match c {
            '+' => return Some((MarkerType::Approval, APPROVE_VALUE)),
            '-' => return Some((MarkerType::Approval, DISAPPROVE_VALUE)),
            _ => {}
        }
    }

    if let Some(number) = marker.strip_suffix('%') {
        let number = number.trim();
        let digits = number.strip_prefix(['+', '-']).unwrap_or(number);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let score: i64 = match number.parse::<i64>() {
            Ok(x) => x,
            // Too many digits: saturate in the direction of the sign.
            Err(_) if number.starts_with('-') => 0,
            Err(_) => 100,
        };
        return Some((MarkerType::Score, score.clamp(0, 100) as u32));
    }

    let digits = marker.strip_prefix('#').unwrap_or(marker).trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let rank: u64 = digits.parse::<u64>().unwrap_or(u64::MAX);
    if rank == 0 {
        return None;
    }
    Some((MarkerType::Rank, rank.min(MAX_RANK as u64) as u32))
}

/// A single line of a vote, e.g. `-[X][Plot] Go 『b』left『/b』`.
///
/// Immutable once parsed: the `with_*` methods return modified copies.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VoteLine {
    prefix: String,
    marker: String,
    marker_type: MarkerType,
    marker_value: u32,
    task: String,
    content: String,
    clean_content: String,
}

impl VoteLine {
    /// Builds a vote line from its parts. Returns None if the marker is not
    /// recognized.
    pub fn new(prefix: &str, marker: &str, task: &str, content: &str) -> Option<VoteLine> {
        let marker = marker.trim();
        let (marker_type, marker_value) = parse_marker(marker)?;
        let content = Markup::parse(content).marked().trim().to_string();
        let clean_content = strip_decoration(&content).trim().to_string();
        Some(VoteLine {
            prefix: prefix.trim().to_string(),
            marker: marker.to_string(),
            marker_type,
            marker_value,
            task: strip_decoration(task).trim().to_string(),
            content,
            clean_content,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The indentation level. Top-level lines have a depth of zero.
    pub fn depth(&self) -> usize {
        self.prefix.chars().count()
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn marker_type(&self) -> MarkerType {
        self.marker_type
    }

    pub fn marker_value(&self) -> u32 {
        self.marker_value
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clean_content(&self) -> &str {
        &self.clean_content
    }

    pub fn with_depth(&self, depth: usize) -> VoteLine {
        VoteLine {
            prefix: "-".repeat(depth),
            ..self.clone()
        }
    }

    pub fn with_task(&self, task: &str) -> VoteLine {
        VoteLine {
            task: strip_decoration(task).trim().to_string(),
            ..self.clone()
        }
    }

    /// A copy of this line that carries the marker of another line.
    pub fn with_marker_of(&self, other: &VoteLine) -> VoteLine {
        VoteLine {
            marker: other.marker.clone(),
            marker_type: other.marker_type,
            marker_value: other.marker_value,
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: &str) -> VoteLine {
        let content = Markup::parse(content).marked().trim().to_string();
        let clean_content = strip_decoration(&content).trim().to_string();
        VoteLine {
            content,
            clean_content,
            ..self.clone()
        }
    }
}

impl Display for VoteLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.prefix, self.marker)?;
        if !self.task.is_empty() {
            write!(f, "[{}]", self.task)?;
        }
        write!(f, " {}", self.content)
    }
}

// A line flattened into characters and tags, so that the grammar can skip the
// decoration that surrounds the prefix, the marker or the task.
enum Item {
    Char(char),
    Tag { name: String, raw: String, open: bool },
}

struct Scanner {
    items: Vec<Item>,
    pos: usize,
    // Tags opened before the content and still open.
    pending: Vec<(String, String)>,
}

impl Scanner {
    fn new(text: &str) -> Scanner {
        let mut items: Vec<Item> = Vec::new();
        for token in tokenize(text) {
            match token {
                Token::Text(t) => items.extend(t.chars().map(Item::Char)),
                Token::Open(d, raw) => items.push(Item::Tag {
                    name: d.name().to_string(),
                    raw: raw.to_string(),
                    open: true,
                }),
                Token::Close(name, raw) => items.push(Item::Tag {
                    name,
                    raw: raw.to_string(),
                    open: false,
                }),
            }
        }
        Scanner {
            items,
            pos: 0,
            pending: Vec::new(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        while let Some(item) = self.items.get(self.pos) {
            match item {
                Item::Char(c) => return Some(*c),
                Item::Tag { name, raw, open } => {
                    if *open {
                        self.pending.push((name.clone(), raw.clone()));
                    } else if let Some(idx) = self.pending.iter().rposition(|(n, _)| n == name) {
                        self.pending.remove(idx);
                    }
                    self.pos += 1;
                }
            }
        }
        None
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Reads the body of a bracketed element, the opening bracket being already consumed.
    /// Returns None if the bracket is never closed or if brackets are nested.
    fn bracket_body(&mut self) -> Option<String> {
        let mut body = String::new();
        loop {
            match self.peek()? {
                ']' => {
                    self.bump();
                    return Some(body);
                }
                '[' => return None,
                c => {
                    body.push(c);
                    self.bump();
                }
            }
        }
    }

    /// The remaining raw text, with the still-open decoration re-applied.
    fn rest(&self) -> String {
        let mut out: String = self.pending.iter().map(|(_, raw)| raw.as_str()).collect();
        for item in &self.items[self.pos.min(self.items.len())..] {
            match item {
                Item::Char(c) => out.push(*c),
                Item::Tag { raw, .. } => out.push_str(raw),
            }
        }
        out
    }
}

/// Parses one line of text into a vote line.
///
/// Returns None if the line does not start with a recognized marker. This is
/// not an error: most lines of a post are prose.
pub fn parse_line(text: &str) -> Option<VoteLine> {
    let mut scanner = Scanner::new(text);

    let mut prefix = String::new();
    loop {
        scanner.skip_whitespace();
        match scanner.peek()? {
            '[' => break,
            c if INDENT_GLYPHS.contains(&c) => {
                prefix.push(c);
                scanner.bump();
            }
            _ => return None,
        }
    }
    scanner.bump();

    let marker = scanner.bracket_body()?;
    let marker = marker.trim();
    parse_marker(marker)?;

    scanner.skip_whitespace();
    let task = if scanner.peek() == Some('[') {
        scanner.bump();
        scanner.bracket_body()?
    } else {
        String::new()
    };

    VoteLine::new(&prefix, marker, &task, &scanner.rest())
}

/// Extracts all the vote lines of a post, in order.
pub fn parse_lines(text: &str) -> Vec<VoteLine> {
    text.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_vote() {
        let l = parse_line("[X] Eat cake").unwrap();
        assert_eq!(l.marker(), "X");
        assert_eq!(l.marker_type(), MarkerType::Vote);
        assert_eq!(l.marker_value(), 100);
        assert_eq!(l.task(), "");
        assert_eq!(l.content(), "Eat cake");
        assert_eq!(l.depth(), 0);
    }

    #[test]
    fn prefix_and_task() {
        let l = parse_line("- -[x][Plot] Go 『b』left『/b』").unwrap();
        assert_eq!(l.prefix(), "--");
        assert_eq!(l.depth(), 2);
        assert_eq!(l.task(), "Plot");
        assert_eq!(l.content(), "Go 『b』left『/b』");
        assert_eq!(l.clean_content(), "Go left");
        assert_eq!(parse_line("—[X] Dash").unwrap().depth(), 1);
    }

    #[test]
    fn ranks_and_scores() {
        let l = parse_line("[#2] Second").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Rank, 2));
        let l = parse_line("[150] Far").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Rank, 99));
        let l = parse_line("[140%] Lots").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Score, 100));
        let l = parse_line("[-5%] Little").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Score, 0));
        let l = parse_line("[+] Yes").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Approval, 80));
        let l = parse_line("[-] No").unwrap();
        assert_eq!((l.marker_type(), l.marker_value()), (MarkerType::Approval, 20));
    }

    #[test]
    fn non_votes() {
        assert!(parse_line("Just some text").is_none());
        assert!(parse_line("[Y] Not a marker").is_none());
        assert!(parse_line("[0] Rank zero").is_none());
        assert!(parse_line("[X Unbalanced").is_none());
        assert!(parse_line("[X] [Task never closed").is_none());
        assert!(parse_line("[] Empty").is_none());
        assert!(parse_line("- text [X] late marker").is_none());
    }

    #[test]
    fn decorated_marker() {
        let l = parse_line("『b』[X]『/b』 Bold marker").unwrap();
        assert_eq!(l.content(), "Bold marker");
        let l = parse_line("『b』[X] Bold line『/b』").unwrap();
        assert_eq!(l.content(), "『b』Bold line『/b』");
        assert_eq!(l.clean_content(), "Bold line");
        let l = parse_line("[X][『i』Plot『/i』] Text『/u』").unwrap();
        assert_eq!(l.task(), "Plot");
        assert_eq!(l.content(), "Text");
    }

    #[test]
    fn display_round_trip() {
        let l = parse_line("-[X][Plot]   Go left  ").unwrap();
        assert_eq!(l.to_string(), "-[X][Plot] Go left");
        assert_eq!(parse_line(&l.to_string()), Some(l));
    }

    #[test]
    fn lines_of_a_post() {
        let text = "I like this.\n[X] Plan A\n-[X] Do it\nMore text\n[X] Other";
        let lines = parse_lines(text);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].depth(), 1);
    }
}
