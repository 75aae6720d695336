use crate::quest::*;

use serde::Deserialize;

// One post of a thread dump.
#[derive(Debug, Clone, Deserialize)]
struct JsonPost {
    author: String,
    // Forums hand out both numeric and textual ids.
    id: JSValue,
    number: u64,
    permalink: Option<String>,
    text: String,
}

fn read_post_id(id: &JSValue) -> QuestResult<PostId> {
    match id {
        JSValue::String(s) => Ok(PostId::new(s)),
        JSValue::Number(n) if n.is_u64() => Ok(PostId::new(&n.to_string())),
        _ => whatever!("Cannot read the post id {}", id),
    }
}

pub fn parse_json_posts(contents: &str, thread: &str) -> QuestResult<Vec<Post>> {
    let parsed: Vec<JsonPost> = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    let mut res: Vec<Post> = Vec::new();
    for jp in parsed.iter() {
        let post_id = read_post_id(&jp.id)?;
        let origin = Origin::new(
            &jp.author,
            post_id,
            jp.number,
            thread,
            jp.permalink.as_deref().unwrap_or(""),
        );
        res.push(Post::new(origin, &jp.text));
    }
    debug!("parse_json_posts: {} post(s)", res.len());
    Ok(res)
}

pub fn read_json_posts(path: &str, thread: &str) -> QuestResult<Vec<Post>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_json_posts(&contents, thread)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_textual_ids() {
        let posts = parse_json_posts(
            r#"[
                {"author": " Kinematics ", "id": 9, "number": 4, "text": "[X] Yes"},
                {"author": "Atreya", "id": "post-7", "number": 5, "permalink": "https://forum.example/p/7", "text": "[X] No"}
            ]"#,
            "quest",
        )
        .unwrap();
        assert_eq!(posts[0].origin().author(), "Kinematics");
        assert_eq!(posts[0].origin().post_id().number(), Some(9));
        assert_eq!(posts[1].origin().post_id().as_str(), "post-7");
        assert_eq!(posts[1].origin().permalink(), "https://forum.example/p/7");
        assert_eq!(posts[1].origin().thread_post_number(), 5);
        assert!(posts[1].has_vote());
    }

    #[test]
    fn bad_ids_are_rejected() {
        assert!(parse_json_posts(
            r#"[{"author": "A", "id": -1, "number": 1, "text": ""}]"#,
            "quest"
        )
        .is_err());
        assert!(parse_json_posts(r#"{"author": "A"}"#, "quest").is_err());
    }
}
