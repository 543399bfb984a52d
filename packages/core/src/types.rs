//! Core data types for post-network construction.
//!
//! This module defines the normalized post record consumed by the relation
//! extractor ([`Post`] and its parts), the [`ViewMode`] selector that decides
//! which entities become graph nodes, and the [`Relation`] tuple that the
//! extractor hands to the graph accumulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post author or mentioned user: platform user id plus username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    /// Platform-assigned user id.
    pub id: String,
    /// Handle without the leading `@`.
    pub username: String,
}

/// One entry of a post's referenced-post list: the post it replies to,
/// retweets, or quotes.
///
/// The author fields are optional because an input record is not guaranteed
/// to carry (or resolve) the referenced post's author. Relations built from
/// an entry with missing author fields are partial and may be dropped by the
/// accumulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferencedPost {
    /// Id of the referenced post.
    pub id: String,
    /// Reference kind as supplied by the input (`reply`, `retweet`,
    /// `quote`, ...). Passed through unmodified; never normalized.
    pub kind: String,
    /// User id of the referenced post's author, when known.
    pub author_id: Option<String>,
    /// Author of the referenced post, when known.
    pub author: Option<Author>,
}

/// A user mentioned in a post's body. Both fields are optional in the wire
/// format; a mention without a username yields no relation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Mention {
    pub id: Option<String>,
    pub username: Option<String>,
}

/// A normalized post record: one unit of input after flattening.
///
/// Produced by [`crate::ingest`]; consumed read-only by
/// [`crate::extract::relations`]. One physical input line may flatten into
/// several of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Id of the post itself.
    pub id: String,
    /// User id of the post's author.
    pub author_id: String,
    /// The post's author.
    pub author: Author,
    /// Creation time, RFC 3339 in the wire format.
    pub created_at: DateTime<Utc>,
    /// Posts this post replies to, retweets, or quotes. Empty when the
    /// record references nothing.
    pub referenced: Vec<ReferencedPost>,
    /// Users mentioned in the body.
    pub mentions: Vec<Mention>,
    /// Hashtag texts without the leading `#`, in input order, duplicates
    /// preserved.
    pub hashtags: Vec<String>,
}

/// Selects which entities become graph nodes.
///
/// Exactly one mode is active per run. The CLI enforces mutual exclusion of
/// the `--users` and `--hashtags` flags, so the ambiguous both-set case
/// cannot reach the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Post-to-post relations through replies, retweets, and quotes.
    /// One edge per relation event; edges are never merged.
    #[default]
    Posts,
    /// User mention network. Parallel relations merge into one weighted edge.
    Users,
    /// Hashtag co-occurrence network. Parallel relations merge into one
    /// weighted edge.
    Hashtags,
}

/// Formats the mode as its lowercase selector string.
impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Posts => write!(f, "posts"),
            ViewMode::Users => write!(f, "users"),
            ViewMode::Hashtags => write!(f, "hashtags"),
        }
    }
}

/// One extracted relation: a directed edge candidate the accumulator folds
/// into the graph.
///
/// Which fields are required depends on the mode: user and hashtag view key
/// nodes by label and need `to_label`; post view keys nodes by id and needs
/// `to_id`. The accumulator drops tuples whose required fields are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Display label of the source (username, or `#tag`).
    pub from_label: String,
    /// Identity of the source; `None` in hashtag view.
    pub from_id: Option<String>,
    /// Display label of the target, when known.
    pub to_label: Option<String>,
    /// Identity of the target, when known.
    pub to_id: Option<String>,
    /// Relation kind: the input's reference kind in post view, `"mention"`
    /// or `"hashtag"` otherwise.
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_defaults_to_posts() {
        assert_eq!(ViewMode::default(), ViewMode::Posts);
    }

    #[test]
    fn view_mode_display() {
        assert_eq!(ViewMode::Users.to_string(), "users");
        assert_eq!(ViewMode::Hashtags.to_string(), "hashtags");
    }

    #[test]
    fn post_roundtrips_through_json() {
        let json = r#"{
            "id": "100",
            "author_id": "1",
            "author": { "id": "1", "username": "alice" },
            "created_at": "2022-01-05T09:30:00Z",
            "referenced": [
                { "id": "90", "kind": "retweet", "author_id": "2",
                  "author": { "id": "2", "username": "bob" } }
            ],
            "mentions": [ { "id": "3", "username": "carol" } ],
            "hashtags": ["osint"]
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.author.username, "alice");
        assert_eq!(post.referenced[0].kind, "retweet");
        let re = serde_json::to_string(&post).unwrap();
        let post2: Post = serde_json::from_str(&re).unwrap();
        assert_eq!(post2, post);
    }
}
