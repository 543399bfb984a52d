//! Ingestion: newline-delimited JSON in, accumulated graph out.
//!
//! Two layers live here. The lower layer flattens one parsed JSON value
//! into normalized [`Post`] records: a line is either a bare post object or
//! an API response envelope (`data` + `includes`), and envelope flattening
//! resolves authors of the data posts and of their referenced posts through
//! the `includes` lookup tables. The upper layer is the line driver
//! [`build_graph`]: it walks the input with a 1-based line counter, skips
//! blank lines, and aborts the whole run on the first malformed line so
//! that partial input never produces partial output.

use std::io::{self, BufRead};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::extract::relations;
use crate::graph::NetworkGraph;
use crate::types::{Author, Mention, Post, ReferencedPost, ViewMode};

/// A fatal ingestion failure. Every variant carries the 1-based number of
/// the offending input line; nothing after that line is processed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON on line {line}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected post data on line {line}: {source}")]
    UnexpectedData {
        line: usize,
        #[source]
        source: FlattenError,
    },
}

impl BuildError {
    /// The 1-based input line this error refers to.
    pub fn line(&self) -> usize {
        match self {
            BuildError::Io { line, .. }
            | BuildError::InvalidJson { line, .. }
            | BuildError::UnexpectedData { line, .. } => *line,
        }
    }
}

/// A structural failure while flattening one JSON value into posts.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("record does not have the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("post {id} has no resolvable author")]
    MissingAuthor { id: String },

    #[error("post {id} has an unparseable created_at: {value:?}")]
    InvalidTimestamp { id: String, value: String },
}

/// Read the entire input and fold every extracted relation into a fresh
/// graph.
///
/// Lines are counted from 1. Blank lines (after trimming) are skipped.
/// The first malformed line aborts the run: the error carries its line
/// number and the graph built so far is dropped with it.
pub fn build_graph<R: BufRead>(reader: R, mode: ViewMode) -> Result<NetworkGraph, BuildError> {
    let mut graph = NetworkGraph::new();

    for (i, line) in reader.lines().enumerate() {
        let number = i + 1;
        let line = line.map_err(|source| BuildError::Io { line: number, source })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|source| BuildError::InvalidJson { line: number, source })?;
        let posts = flatten(value)
            .map_err(|source| BuildError::UnexpectedData { line: number, source })?;

        for post in &posts {
            for rel in relations(post, mode) {
                graph.add_relation(rel, mode);
            }
        }
    }

    Ok(graph)
}

/// Flatten one parsed JSON value into normalized posts.
///
/// Accepts either a bare post object or an envelope whose `data` is a post
/// or an array of posts. An envelope contributes one [`Post`] per `data`
/// entry; `includes.users` and `includes.tweets` resolve authors that the
/// entries do not carry inline.
pub fn flatten(value: serde_json::Value) -> Result<Vec<Post>, FlattenError> {
    if value.get("data").is_some() {
        let envelope: RawEnvelope = serde_json::from_value(value)?;
        let raw_posts = match envelope.data {
            OneOrMany::One(p) => vec![*p],
            OneOrMany::Many(v) => v,
        };
        raw_posts
            .into_iter()
            .map(|p| resolve(p, &envelope.includes))
            .collect()
    } else {
        let raw: RawPost = serde_json::from_value(value)?;
        Ok(vec![resolve(raw, &RawIncludes::default())?])
    }
}

// --- wire shapes -------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RawUser {
    id: String,
    username: String,
}

impl From<RawUser> for Author {
    fn from(u: RawUser) -> Self {
        Author {
            id: u.id,
            username: u.username,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawReference {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    author_id: Option<String>,
    author: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawMention {
    id: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    tag: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    mentions: Vec<RawMention>,
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    author_id: Option<String>,
    author: Option<RawUser>,
    created_at: String,
    #[serde(default)]
    referenced_tweets: Vec<RawReference>,
    #[serde(default)]
    entities: RawEntities,
}

#[derive(Debug, Deserialize)]
struct RawIncludedTweet {
    id: String,
    author_id: Option<String>,
    author: Option<RawUser>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIncludes {
    #[serde(default)]
    users: Vec<RawUser>,
    #[serde(default)]
    tweets: Vec<RawIncludedTweet>,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    data: OneOrMany,
    #[serde(default)]
    includes: RawIncludes,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawPost>),
    One(Box<RawPost>),
}

// --- resolution --------------------------------------------------------------

fn resolve(raw: RawPost, includes: &RawIncludes) -> Result<Post, FlattenError> {
    let author = raw
        .author
        .or_else(|| lookup_user(includes, raw.author_id.as_deref()))
        .ok_or_else(|| FlattenError::MissingAuthor { id: raw.id.clone() })?;
    let author_id = raw.author_id.unwrap_or_else(|| author.id.clone());

    let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FlattenError::InvalidTimestamp {
            id: raw.id.clone(),
            value: raw.created_at.clone(),
        })?;

    let referenced = raw
        .referenced_tweets
        .into_iter()
        .map(|r| resolve_reference(r, includes))
        .collect();

    let mentions = raw
        .entities
        .mentions
        .into_iter()
        .map(|m| Mention {
            id: m.id,
            username: m.username,
        })
        .collect();

    let hashtags = raw.entities.hashtags.into_iter().map(|h| h.tag).collect();

    Ok(Post {
        id: raw.id,
        author_id,
        author: author.into(),
        created_at,
        referenced,
        mentions,
        hashtags,
    })
}

/// Resolve one referenced-post entry. Inline author fields win; otherwise
/// the referenced tweet is looked up in `includes.tweets` and its author in
/// `includes.users`. A reference that resolves to no author is kept with
/// the author fields absent; whether that relation survives is the
/// accumulator's call, not a parse error.
fn resolve_reference(r: RawReference, includes: &RawIncludes) -> ReferencedPost {
    let (mut author_id, mut author) = (r.author_id, r.author);

    if author_id.is_none() && author.is_none() {
        if let Some(t) = includes.tweets.iter().find(|t| t.id == r.id) {
            author_id = t.author_id.clone();
            author = t.author.clone();
        }
    }
    if author.is_none() {
        author = lookup_user(includes, author_id.as_deref());
    }
    if author_id.is_none() {
        author_id = author.as_ref().map(|a| a.id.clone());
    }

    ReferencedPost {
        id: r.id,
        kind: r.kind,
        author_id,
        author: author.map(Author::from),
    }
}

fn lookup_user(includes: &RawIncludes, id: Option<&str>) -> Option<RawUser> {
    let id = id?;
    includes.users.iter().find(|u| u.id == id).cloned()
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn retweet_line(post_id: &str, author: &str, target: &str) -> String {
        format!(
            r#"{{"id":"{post_id}","author_id":"id-{author}",
                "author":{{"id":"id-{author}","username":"{author}"}},
                "created_at":"2022-01-05T09:30:00Z",
                "referenced_tweets":[{{"type":"retweet","id":"ref-{post_id}",
                  "author_id":"id-{target}",
                  "author":{{"id":"id-{target}","username":"{target}"}}}}]}}"#
        )
        .replace('\n', " ")
    }

    #[test]
    fn two_retweet_lines_make_four_nodes_and_two_edges() {
        let input = format!(
            "{}\n{}\n",
            retweet_line("100", "alice", "bob"),
            retweet_line("101", "carol", "dave")
        );
        let g = build_graph(Cursor::new(input), ViewMode::Posts).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 2);
        assert!(g.edges().all(|(_, _, e)| e.kind == "retweet"));
        assert!(g.edges().all(|(_, _, e)| e.weight.is_none()));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = format!("\n   \n{}\n\n", retweet_line("100", "alice", "bob"));
        let g = build_graph(Cursor::new(input), ViewMode::Posts).unwrap();
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn malformed_second_line_reports_line_two() {
        let input = format!("{}\nnot json\n", retweet_line("100", "alice", "bob"));
        let err = build_graph(Cursor::new(input), ViewMode::Posts).unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, BuildError::InvalidJson { .. }));
    }

    #[test]
    fn structurally_wrong_line_reports_its_number() {
        // Valid JSON, but the post has no author anywhere.
        let input = r#"{"id":"100","created_at":"2022-01-05T09:30:00Z"}"#;
        let err = build_graph(Cursor::new(input), ViewMode::Posts).unwrap_err();
        assert_eq!(err.line(), 1);
        assert!(matches!(err, BuildError::UnexpectedData { .. }));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let line = retweet_line("100", "alice", "bob")
            .replace("2022-01-05T09:30:00Z", "Wed Jan 05 09:30:00 +0000 2022");
        let err = build_graph(Cursor::new(line), ViewMode::Posts).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnexpectedData {
                source: FlattenError::InvalidTimestamp { .. },
                ..
            }
        ));
    }

    #[test]
    fn envelope_resolves_authors_through_includes() {
        let line = r#"{
            "data": [{
                "id": "100", "author_id": "1",
                "created_at": "2022-01-05T09:30:00Z",
                "referenced_tweets": [{"type": "reply", "id": "90"}]
            }],
            "includes": {
                "users": [
                    {"id": "1", "username": "alice"},
                    {"id": "2", "username": "bob"}
                ],
                "tweets": [{"id": "90", "author_id": "2"}]
            }
        }"#
        .replace('\n', " ");
        let posts = flatten(serde_json::from_str(&line).unwrap()).unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.author.username, "alice");
        assert_eq!(post.referenced[0].author_id.as_deref(), Some("2"));
        assert_eq!(
            post.referenced[0].author.as_ref().map(|a| a.username.as_str()),
            Some("bob")
        );
    }

    #[test]
    fn envelope_with_single_data_object_flattens() {
        let line = r#"{
            "data": {"id": "100", "author_id": "1",
                     "created_at": "2022-01-05T09:30:00Z"},
            "includes": {"users": [{"id": "1", "username": "alice"}]}
        }"#;
        let posts = flatten(serde_json::from_str(line).unwrap()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author_id, "1");
    }

    #[test]
    fn envelope_with_many_posts_flattens_each() {
        let line = r#"{
            "data": [
                {"id": "100", "author": {"id": "1", "username": "alice"},
                 "created_at": "2022-01-05T09:30:00Z"},
                {"id": "101", "author": {"id": "2", "username": "bob"},
                 "created_at": "2022-01-05T09:31:00Z"}
            ]
        }"#;
        let posts = flatten(serde_json::from_str(line).unwrap()).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].author.username, "bob");
    }

    #[test]
    fn unresolvable_reference_author_is_not_fatal() {
        let line = r#"{"id":"100","author":{"id":"1","username":"alice"},
            "created_at":"2022-01-05T09:30:00Z",
            "referenced_tweets":[{"type":"reply","id":"90"}]}"#
            .replace('\n', " ");
        let posts = flatten(serde_json::from_str(&line).unwrap()).unwrap();
        assert_eq!(posts[0].referenced[0].author, None);
        assert_eq!(posts[0].referenced[0].author_id, None);
    }

    #[test]
    fn entities_default_to_empty() {
        let line = r#"{"id":"100","author":{"id":"1","username":"alice"},
            "created_at":"2022-01-05T09:30:00Z"}"#
            .replace('\n', " ");
        let posts = flatten(serde_json::from_str(&line).unwrap()).unwrap();
        assert!(posts[0].mentions.is_empty());
        assert!(posts[0].hashtags.is_empty());
        assert!(posts[0].referenced.is_empty());
    }

    #[test]
    fn mention_graph_end_to_end() {
        let line = r#"{"id":"100","author":{"id":"1","username":"alice"},
            "created_at":"2022-01-05T09:30:00Z",
            "entities":{"mentions":[{"id":"2","username":"bob"},
                                    {"id":"2","username":"bob"}]}}"#
            .replace('\n', " ");
        let g = build_graph(Cursor::new(line), ViewMode::Users).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges_between("alice", "bob")[0].weight, Some(2));
    }

    #[test]
    fn hashtag_graph_end_to_end() {
        let line = r#"{"id":"100","author":{"id":"1","username":"alice"},
            "created_at":"2022-01-05T09:30:00Z",
            "entities":{"hashtags":[{"tag":"a"},{"tag":"b"},{"tag":"c"}]}}"#
            .replace('\n', " ");
        let g = build_graph(Cursor::new(line), ViewMode::Hashtags).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert!(g.edges().all(|(_, _, e)| e.weight == Some(1)));
    }
}
