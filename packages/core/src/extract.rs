//! Relation extraction: classify what a single post record expresses.
//!
//! Given one normalized [`Post`] and the active [`ViewMode`], produce the
//! finite set of [`Relation`] tuples the record contributes to the graph.
//! Extraction never fails: records missing optional fields simply
//! contribute fewer (or partial) tuples, per the edge-case policy in the
//! accumulator.

use crate::types::{Post, Relation, ViewMode};

/// Relation kind attached to every mention edge in user view.
pub const MENTION_KIND: &str = "mention";

/// Relation kind attached to every co-occurrence edge in hashtag view.
pub const HASHTAG_KIND: &str = "hashtag";

/// Extract the relation tuples one post contributes under `mode`.
///
/// - [`ViewMode::Posts`]: one tuple per referenced-post entry, source = the
///   record's author, target = the referenced post's author (fields absent
///   when unknown), kind = the entry's reference kind, unmodified.
/// - [`ViewMode::Users`]: one `"mention"` tuple per mention carrying a
///   username; mentions without one are skipped.
/// - [`ViewMode::Hashtags`]: one `"hashtag"` tuple per 2-combination of the
///   record's hashtag list, in input order. Repeated tag text is not
///   deduplicated. Fewer than two hashtags contribute nothing.
pub fn relations(post: &Post, mode: ViewMode) -> Vec<Relation> {
    match mode {
        ViewMode::Posts => post
            .referenced
            .iter()
            .map(|r| Relation {
                from_label: post.author.username.clone(),
                from_id: Some(post.author_id.clone()),
                to_label: r.author.as_ref().map(|a| a.username.clone()),
                to_id: r.author_id.clone(),
                kind: r.kind.clone(),
            })
            .collect(),

        ViewMode::Users => post
            .mentions
            .iter()
            .filter_map(|m| {
                let username = m.username.as_ref()?;
                Some(Relation {
                    from_label: post.author.username.clone(),
                    from_id: Some(post.author_id.clone()),
                    to_label: Some(username.clone()),
                    to_id: m.id.clone(),
                    kind: MENTION_KIND.to_string(),
                })
            })
            .collect(),

        ViewMode::Hashtags => {
            let tags = &post.hashtags;
            let mut out = Vec::new();
            for i in 0..tags.len() {
                for j in i + 1..tags.len() {
                    out.push(Relation {
                        from_label: format!("#{}", tags[i]),
                        from_id: None,
                        to_label: Some(format!("#{}", tags[j])),
                        to_id: None,
                        kind: HASHTAG_KIND.to_string(),
                    });
                }
            }
            out
        }
    }
}

// --- tests -------------------------------------------------------------------
