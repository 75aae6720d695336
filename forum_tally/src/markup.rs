//! Decorated text.
//!
//! Post text arrives with the forum formatting already flattened into private
//! delimiters: `『b』bold『/b』`, `『color=#ff0000』red『/color』`,
//! `『url=https://...』link『/url』`. They never clash with the BBCode typed by
//! the voters. The text is parsed once into a small tree of spans, which can
//! be rendered with or without the decoration.

pub const TAG_OPEN: char = '『';
pub const TAG_CLOSE: char = '』';

/// A decoration applied to a run of text.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Decoration {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler(Option<String>),
    Color(String),
    Url(String),
}

impl Decoration {
    /// Parses the body of an opening tag (the text between the delimiters).
    /// Returns None for tags that are not decorations.
    pub fn from_tag(body: &str) -> Option<Decoration> {
        let (name, arg) = match body.split_once('=') {
            Some((n, a)) => (n.trim(), Some(a.trim().to_string())),
            None => (body.trim(), None),
        };
        match (name.to_lowercase().as_str(), arg) {
            ("b", None) => Some(Decoration::Bold),
            ("i", None) => Some(Decoration::Italic),
            ("u", None) => Some(Decoration::Underline),
            ("s", None) => Some(Decoration::Strike),
            ("spoiler", arg) => Some(Decoration::Spoiler(arg)),
            ("color", Some(c)) => Some(Decoration::Color(c)),
            ("url", Some(u)) => Some(Decoration::Url(u)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Decoration::Bold => "b",
            Decoration::Italic => "i",
            Decoration::Underline => "u",
            Decoration::Strike => "s",
            Decoration::Spoiler(_) => "spoiler",
            Decoration::Color(_) => "color",
            Decoration::Url(_) => "url",
        }
    }

    pub fn open_tag(&self) -> String {
        match self {
            Decoration::Spoiler(Some(label)) => format!("{}spoiler={}{}", TAG_OPEN, label, TAG_CLOSE),
            Decoration::Color(c) => format!("{}color={}{}", TAG_OPEN, c, TAG_CLOSE),
            Decoration::Url(u) => format!("{}url={}{}", TAG_OPEN, u, TAG_CLOSE),
            d => format!("{}{}{}", TAG_OPEN, d.name(), TAG_CLOSE),
        }
    }

    pub fn close_tag(&self) -> String {
        format!("{}/{}{}", TAG_OPEN, self.name(), TAG_CLOSE)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Node {
    Text(String),
    Span(Decoration, Vec<Node>),
}

/// One lexical element of decorated text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Open(Decoration, &'a str),
    /// The name of the closed decoration, and the raw tag.
    Close(String, &'a str),
}

/// Splits decorated text into text runs and tags. Tags that are not
/// decorations are returned as text.
pub(crate) fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let start = match rest.find(TAG_OPEN) {
            Some(idx) => idx,
            None => {
                tokens.push(Token::Text(rest));
                break;
            }
        };
        if start > 0 {
            tokens.push(Token::Text(&rest[..start]));
        }
        let after_open = start + TAG_OPEN.len_utf8();
        let end = match rest[after_open..].find(TAG_CLOSE) {
            Some(idx) => after_open + idx,
            None => {
                // Dangling delimiter: the rest is plain text.
                tokens.push(Token::Text(&rest[start..]));
                break;
            }
        };
        let raw = &rest[start..end + TAG_CLOSE.len_utf8()];
        let body = &rest[after_open..end];
        let token = match body.strip_prefix('/') {
            Some(name) if Decoration::from_tag(name).is_some() || is_known_name(name) => {
                Token::Close(name.trim().to_lowercase(), raw)
            }
            Some(_) => Token::Text(raw),
            None => match Decoration::from_tag(body) {
                Some(d) => Token::Open(d, raw),
                None => Token::Text(raw),
            },
        };
        tokens.push(token);
        rest = &rest[end + TAG_CLOSE.len_utf8()..];
    }
    tokens
}

fn is_known_name(name: &str) -> bool {
    matches!(
        name.trim().to_lowercase().as_str(),
        "b" | "i" | "u" | "s" | "spoiler" | "color" | "url"
    )
}

/// Decorated text, parsed.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct Markup {
    nodes: Vec<Node>,
}

impl Markup {
    /// Parses decorated text. This never fails: closing tags without an opening
    /// tag are dropped and spans that are still open at the end are closed.
    pub fn parse(text: &str) -> Markup {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<(Decoration, Vec<Node>)> = Vec::new();

        for token in tokenize(text) {
            match token {
                Token::Text(t) => {
                    let target = match stack.last_mut() {
                        Some((_, children)) => children,
                        None => &mut root,
                    };
                    push_text(target, t);
                }
                Token::Open(d, _) => stack.push((d, Vec::new())),
                Token::Close(name, _) => {
                    let pos = stack.iter().rposition(|(d, _)| d.name() == name);
                    if let Some(pos) = pos {
                        // Implicitly close the spans opened inside.
                        while stack.len() > pos {
                            close_top(&mut stack, &mut root);
                        }
                    }
                }
            }
        }
        while !stack.is_empty() {
            close_top(&mut stack, &mut root);
        }
        Markup { nodes: root }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.plain().trim().is_empty()
    }

    /// The text without any decoration.
    pub fn plain(&self) -> String {
        let mut out = String::new();
        render(&self.nodes, false, &mut out);
        out
    }

    /// The text with balanced decoration delimiters.
    pub fn marked(&self) -> String {
        let mut out = String::new();
        render(&self.nodes, true, &mut out);
        out
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn close_top(stack: &mut Vec<(Decoration, Vec<Node>)>, root: &mut Vec<Node>) {
    if let Some((d, children)) = stack.pop() {
        // Empty spans carry nothing.
        if children.is_empty() {
            return;
        }
        let span = Node::Span(d, children);
        match stack.last_mut() {
            Some((_, parent)) => parent.push(span),
            None => root.push(span),
        }
    }
}

fn render(nodes: &[Node], with_tags: bool, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Span(d, children) => {
                if with_tags {
                    out.push_str(&d.open_tag());
                }
                render(children, with_tags, out);
                if with_tags {
                    out.push_str(&d.close_tag());
                }
            }
        }
    }
}

/// Removes all the decoration from a piece of text.
pub fn strip_decoration(text: &str) -> String {
    Markup::parse(text).plain()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_marked() {
        let m = Markup::parse("Go 『b』left『/b』 and 『color=red』『i』fast『/i』『/color』");
        assert_eq!(m.plain(), "Go left and fast");
        assert_eq!(
            m.marked(),
            "Go 『b』left『/b』 and 『color=red』『i』fast『/i』『/color』"
        );
    }

    #[test]
    fn unmatched_tags_are_tolerated() {
        let m = Markup::parse("Text『/b』 more 『i』open");
        assert_eq!(m.plain(), "Text more open");
        assert_eq!(m.marked(), "Text more 『i』open『/i』");
    }

    #[test]
    fn crossed_tags_close_inner_spans() {
        let m = Markup::parse("『b』a『i』b『/b』c『/i』");
        assert_eq!(m.plain(), "abc");
        assert_eq!(m.marked(), "『b』a『i』b『/i』『/b』c");
    }

    #[test]
    fn unknown_tags_stay_literal() {
        let m = Markup::parse("a 『quote』 b 『 c");
        assert_eq!(m.plain(), "a 『quote』 b 『 c");
    }

    #[test]
    fn url_spans() {
        let m = Markup::parse("『url=https://example.com』site『/url』");
        assert_eq!(m.plain(), "site");
        match &m.nodes()[0] {
            Node::Span(Decoration::Url(u), _) => assert_eq!(u, "https://example.com"),
            n => panic!("unexpected node {:?}", n),
        }
    }
}
