use log::{debug, info, warn};

use forum_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::quest::config_reader::*;

pub mod config_reader;
mod io_json;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum QuestError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Column {column:?} not found in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid quest configuration"))]
    InvalidQuest { source: TallyError },
    #[snafu(display("The tally failed"))]
    Tallying { source: TallyError },
    #[snafu(display("Missing parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type QuestResult<T> = Result<T, QuestError>;

fn votes_to_json(snapshot: &[TaskTally]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for task_tally in snapshot.iter() {
        for (block, voters) in task_tally.entries.iter() {
            // Ranked options are reported with the rankings.
            if block.is_ranked() {
                continue;
            }
            let voter_names: Vec<String> = voters.iter().map(|o| o.to_string()).collect();
            l.push(json!({
                "task": task_tally.task,
                "option": block.to_string(),
                "count": voters.len(),
                "voters": voter_names
            }));
        }
    }
    l
}

fn rankings_to_json(rankings: &[TaskRanking]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for task_ranking in rankings.iter() {
        let results: Vec<JSValue> = task_ranking
            .results
            .iter()
            .map(|r| {
                json!({
                    "position": r.position,
                    "score": r.score,
                    "option": r.option.to_string(),
                    "trace": r.trace
                })
            })
            .collect();
        l.push(json!({"task": task_ranking.task, "results": results}));
    }
    l
}

pub fn build_summary_js(tally: &Tally) -> JSValue {
    let config = tally.config();
    json!({
        "quest": {
            "thread": config.thread,
            "partitionMode": format!("{:?}", config.partition_mode),
            "rankedVoteMethod": config.ranked_vote_method.to_string()
        },
        "votes": votes_to_json(&tally.snapshot()),
        "rankings": rankings_to_json(&tally.rankings())
    })
}

fn read_non_negative(name: &str, x: Option<i64>, default: u64) -> QuestResult<u64> {
    match x {
        None => Ok(default),
        Some(n) if n >= 0 => Ok(n as u64),
        Some(n) => whatever!("{} may not be negative, but it was {}", name, n),
    }
}

/// Builds the configuration of the tally from the quest file, with the
/// overrides of the command line.
pub fn build_config(quest: &QuestFile, args: &Args) -> QuestResult<QuestConfig> {
    let partition_mode = match args.partition.as_ref().or(quest.partition_mode.as_ref()) {
        Some(s) => s.parse::<PartitionMode>().context(InvalidQuestSnafu {})?,
        None => QuestConfig::DEFAULT.partition_mode,
    };
    let ranked_vote_method = match args.method.as_ref().or(quest.ranked_vote_method.as_ref()) {
        Some(s) => s
            .parse::<RankVoteCounterMethod>()
            .context(InvalidQuestSnafu {})?,
        None => QuestConfig::DEFAULT.ranked_vote_method,
    };
    let post_filter = match &quest.post_filter {
        Some(s) => s.parse::<PostNumberFilter>().context(InvalidQuestSnafu {})?,
        None => PostNumberFilter::EMPTY,
    };
    let defaults = QuestConfig::DEFAULT;
    let config = QuestConfig {
        thread: quest.thread_url.clone().unwrap_or_default(),
        partition_mode,
        ranked_vote_method,
        comparison: ComparisonPolicy {
            case_sensitive: quest.case_sensitive.unwrap_or(false),
            whitespace_sensitive: quest.whitespace_sensitive.unwrap_or(false),
        },
        task_filter: TaskFilter::new(&quest.task_filter.clone().unwrap_or_default()),
        username_filter: quest.username_filter.clone().unwrap_or_default(),
        post_filter,
        start_post: read_non_negative("startPost", quest.start_post, defaults.start_post)?,
        end_post: read_non_negative("endPost", quest.end_post, defaults.end_post)?,
        proxy_votes_enabled: quest.proxy_votes.unwrap_or(defaults.proxy_votes_enabled),
        force_pinned_proxy_votes: quest
            .force_pinned_proxy_votes
            .unwrap_or(defaults.force_pinned_proxy_votes),
        forbid_vote_label_plan_names: quest
            .forbid_vote_label_plan_names
            .unwrap_or(defaults.forbid_vote_label_plan_names),
    };
    config.validate().context(InvalidQuestSnafu {})?;
    debug!("build_config: {:?}", config);
    Ok(config)
}

fn read_posts(quest: &QuestFile, root: &Path, args: &Args, thread: &str) -> QuestResult<Vec<Post>> {
    let source = quest.posts_source.clone().unwrap_or_default();
    // The input of the command line is relative to the working directory.
    let path: String = match &args.input {
        Some(p) => p.clone(),
        None if !source.file_path.is_empty() => root.join(&source.file_path).display().to_string(),
        None => whatever!("No posts source: pass --input or set postsSource in the quest file"),
    };
    let input_type = args
        .input_type
        .clone()
        .or_else(|| Some(source.provider.clone()).filter(|p| !p.is_empty()))
        .unwrap_or_else(|| {
            if path.to_lowercase().ends_with(".xlsx") {
                "xlsx".to_string()
            } else {
                "json".to_string()
            }
        });
    let worksheet = args
        .excel_worksheet_name
        .clone()
        .or(source.worksheet_name);
    info!("Attempting to read posts file {:?} ({})", path, input_type);
    match input_type.as_str() {
        "json" => io_json::read_json_posts(&path, thread),
        "xlsx" | "excel" => io_xlsx::read_excel_posts(&path, worksheet, thread),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

fn write_output(out: &Option<String>, pretty_js: &str) -> QuestResult<()> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })
        }
    }
}

pub fn run_quest(args: &Args) -> QuestResult<()> {
    let (quest, root) = match &args.config {
        Some(config_path) => {
            let quest = read_quest_file(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (quest, root)
        }
        None => (QuestFile::default(), PathBuf::from(".")),
    };
    info!("quest: {:?}", quest);

    let config = build_config(&quest, args)?;
    let posts = read_posts(&quest, &root, args, &config.thread)?;
    info!("Read {} post(s)", posts.len());

    let mut tally = Tally::new(config).context(InvalidQuestSnafu {})?;
    let stats = tally.run(&posts, None).context(TallyingSnafu {})?;
    info!("stats: {:?}", stats);

    let result_js = build_summary_js(&tally);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(&args.out, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn no_args() -> Args {
        Args::parse_from(["ftally"])
    }

    fn quest(js: &str) -> QuestFile {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn config_from_quest_file() {
        let q = quest(
            r#"{
                "threadUrl": "https://forum.example/threads/quest.1",
                "partitionMode": "ByLineTask",
                "rankedVoteMethod": "coombs",
                "taskFilter": ["Plot"],
                "usernameFilter": ["GM"],
                "postFilter": "5, 10-12",
                "startPost": 2,
                "proxyVotes": false
            }"#,
        );
        let config = build_config(&q, &no_args()).unwrap();
        assert_eq!(config.partition_mode, PartitionMode::ByLineTask);
        assert_eq!(config.ranked_vote_method, RankVoteCounterMethod::Coombs);
        assert!(config.task_filter.allows("plot"));
        assert!(!config.includes_author("gm"));
        assert!(!config.includes_post_number(11));
        assert!(!config.includes_post_number(1));
        assert!(config.includes_post_number(13));
        assert!(!config.proxy_votes_enabled);
        assert_eq!(config.end_post, 0);
    }

    #[test]
    fn command_line_overrides_quest() {
        let q = quest(r#"{"rankedVoteMethod": "coombs", "partitionMode": "none"}"#);
        let args = Args::parse_from(["ftally", "--method", "rirv", "--partition", "blockall"]);
        let config = build_config(&q, &args).unwrap();
        assert_eq!(
            config.ranked_vote_method,
            RankVoteCounterMethod::RatedInstantRunoff
        );
        assert_eq!(config.partition_mode, PartitionMode::ByBlockAll);
    }

    #[test]
    fn invalid_quests_fail_fast() {
        assert!(build_config(&quest(r#"{"startPost": -3}"#), &no_args()).is_err());
        assert!(build_config(&quest(r#"{"postFilter": "-4"}"#), &no_args()).is_err());
        assert!(build_config(&quest(r#"{"rankedVoteMethod": "borda"}"#), &no_args()).is_err());
        assert!(build_config(&quest(r#"{"startPost": 10, "endPost": 5}"#), &no_args()).is_err());
    }

    #[test]
    fn summary_of_a_small_thread() {
        let posts = io_json::parse_json_posts(
            r#"[
                {"author": "Kinematics", "id": 101, "number": 1, "text": "[X] Run Lola Run!\n[1][Pick] Alpha\n[2][Pick] Beta"},
                {"author": "Atreya", "id": "102", "number": 2, "text": "[X] Kinematics"},
                {"author": "Jim", "id": 103, "number": 3, "permalink": "https://forum.example/p/103", "text": "Nice update!"}
            ]"#,
            "quest",
        )
        .unwrap();
        assert_eq!(posts.len(), 3);
        let config = QuestConfig {
            thread: "quest".to_string(),
            ..QuestConfig::DEFAULT
        };
        let mut tally = Tally::new(config).unwrap();
        tally.run(&posts, None).unwrap();
        let js = build_summary_js(&tally);
        let votes = js["votes"].as_array().unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0]["option"], json!("[X] Run Lola Run!"));
        assert_eq!(votes[0]["count"], json!(2));
        assert_eq!(votes[0]["voters"], json!(["Atreya", "Kinematics"]));
        let rankings = js["rankings"].as_array().unwrap();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0]["task"], json!("Pick"));
        assert_eq!(rankings[0]["results"][0]["option"], json!("[1][Pick] Alpha"));
        assert_eq!(js["quest"]["rankedVoteMethod"], json!("instant-runoff"));
    }
}
