use crate::quest::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// Where the posts of the thread are read from.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsSource {
    /// json or xlsx
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

/// The description of a quest, as written in the quest file.
///
/// Every field is optional. Missing fields take the default of the tally.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestFile {
    #[serde(rename = "threadUrl")]
    pub thread_url: Option<String>,
    #[serde(rename = "partitionMode")]
    pub partition_mode: Option<String>,
    #[serde(rename = "rankedVoteMethod")]
    pub ranked_vote_method: Option<String>,
    #[serde(rename = "caseSensitive")]
    pub case_sensitive: Option<bool>,
    #[serde(rename = "whitespaceSensitive")]
    pub whitespace_sensitive: Option<bool>,
    #[serde(rename = "taskFilter")]
    pub task_filter: Option<Vec<String>>,
    #[serde(rename = "usernameFilter")]
    pub username_filter: Option<Vec<String>>,
    #[serde(rename = "postFilter")]
    pub post_filter: Option<String>,
    // Signed so that a negative window is reported instead of failing the parse.
    #[serde(rename = "startPost")]
    pub start_post: Option<i64>,
    #[serde(rename = "endPost")]
    pub end_post: Option<i64>,
    #[serde(rename = "proxyVotes")]
    pub proxy_votes: Option<bool>,
    #[serde(rename = "forcePinnedProxyVotes")]
    pub force_pinned_proxy_votes: Option<bool>,
    #[serde(rename = "forbidVoteLabelPlanNames")]
    pub forbid_vote_label_plan_names: Option<bool>,
    #[serde(rename = "postsSource")]
    pub posts_source: Option<PostsSource>,
}

pub fn read_quest_file(path: &str) -> QuestResult<QuestFile> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let quest: QuestFile = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_quest_file: {:?}", quest);
    Ok(quest)
}

pub fn read_summary(path: &str) -> QuestResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_defaults() {
        let q: QuestFile = serde_json::from_str("{}").unwrap();
        assert_eq!(q, QuestFile::default());
        let q: QuestFile =
            serde_json::from_str(r#"{"postsSource": {"filePath": "posts.json"}}"#).unwrap();
        let source = q.posts_source.unwrap();
        assert_eq!(source.file_path, "posts.json");
        assert_eq!(source.provider, "");
        assert_eq!(source.worksheet_name, None);
    }
}
