//! The accumulating relationship graph.
//!
//! [`NetworkGraph`] owns a directed multigraph and folds [`Relation`] tuples
//! into it one at a time. Two accumulation policies exist, keyed off the
//! active [`ViewMode`]:
//!
//! - **User and hashtag view** show relationship *intensity*: nodes are keyed
//!   by label, and repeated relations between the same ordered pair merge
//!   into one edge whose `weight` counts the repetitions.
//! - **Post view** shows individual *events*: nodes are keyed by identity,
//!   every relation appends its own edge, and `weight` never appears.
//!
//! The graph is built empty, mutated only through [`NetworkGraph::add_relation`]
//! and [`NetworkGraph::filter_components`], and then read out by the exporters.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, NodeIndexable};

use crate::types::{Relation, ViewMode};

/// Attributes carried by a node. Only these three ever exist; there is no
/// open-ended attribute map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttrs {
    /// The node key: a user id, a username, or a `#tag`, depending on mode.
    pub id: String,
    /// Display label, when known.
    pub screen_name: Option<String>,
    /// Relation kind that last touched this node as a source. Set only in
    /// post view.
    pub kind: Option<String>,
}

/// Attributes carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeAttrs {
    /// Relation kind (`reply`, `retweet`, `quote`, `mention`, `hashtag`, ...).
    pub kind: String,
    /// Number of relations merged into this edge. `Some` only in user and
    /// hashtag view; post view edges never carry a weight.
    pub weight: Option<u64>,
}

/// A directed multigraph of relationship nodes and edges, with nodes
/// addressable by their string key.
#[derive(Debug, Default)]
pub struct NetworkGraph {
    graph: DiGraph<NodeAttrs, EdgeAttrs>,
    index: HashMap<String, NodeIndex>,
}

impl NetworkGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Fold one relation tuple into the graph.
    ///
    /// Tuples missing the fields their mode requires (target label in user
    /// and hashtag view, source and target identity in post view) are
    /// dropped silently; this is the edge-case policy, not an error.
    pub fn add_relation(&mut self, rel: Relation, mode: ViewMode) {
        match mode {
            ViewMode::Users | ViewMode::Hashtags => {
                let Some(to_label) = rel.to_label else { return };
                let a = self.ensure_node(&rel.from_label);
                self.graph[a].screen_name = Some(rel.from_label);
                let b = self.ensure_node(&to_label);
                self.graph[b].screen_name = Some(to_label);

                // Merge with the existing edge for this ordered pair, if
                // any. The reverse direction is a separate edge.
                if let Some(e) = self.graph.find_edge(a, b) {
                    let edge = &mut self.graph[e];
                    edge.weight = Some(edge.weight.unwrap_or(0) + 1);
                    edge.kind = rel.kind;
                } else {
                    self.graph.add_edge(
                        a,
                        b,
                        EdgeAttrs {
                            kind: rel.kind,
                            weight: Some(1),
                        },
                    );
                }
            }

            ViewMode::Posts => {
                let (Some(from_id), Some(to_id)) = (rel.from_id, rel.to_id) else {
                    return;
                };
                let a = self.ensure_node(&from_id);
                self.graph[a].screen_name = Some(rel.from_label);
                self.graph[a].kind = Some(rel.kind.clone());
                let b = self.ensure_node(&to_id);
                if let Some(label) = rel.to_label {
                    self.graph[b].screen_name = Some(label);
                }
                // One edge per relation event; parallel edges are intended.
                self.graph.add_edge(
                    a,
                    b,
                    EdgeAttrs {
                        kind: rel.kind,
                        weight: None,
                    },
                );
            }
        }
    }

    /// Remove every node belonging to a weakly connected component whose
    /// size is below `min_size` or above `max_size`. Incident edges go with
    /// their nodes. A call with both bounds unset is a no-op, and the
    /// operation is idempotent.
    pub fn filter_components(&mut self, min_size: Option<usize>, max_size: Option<usize>) {
        if min_size.is_none() && max_size.is_none() {
            return;
        }

        // Weak connectivity: union edge endpoints ignoring direction.
        let mut uf: UnionFind<usize> = UnionFind::new(self.graph.node_bound());
        for edge in self.graph.edge_references() {
            uf.union(edge.source().index(), edge.target().index());
        }

        let mut sizes: HashMap<usize, usize> = HashMap::new();
        for idx in self.graph.node_indices() {
            *sizes.entry(uf.find(idx.index())).or_insert(0) += 1;
        }

        self.graph.retain_nodes(|_, idx| {
            let size = sizes[&uf.find(idx.index())];
            let too_small = min_size.is_some_and(|min| size < min);
            let too_large = max_size.is_some_and(|max| size > max);
            !(too_small || too_large)
        });

        // Node indices shift after removal; rebuild the key index.
        self.index.clear();
        for idx in self.graph.node_indices() {
            self.index.insert(self.graph[idx].id.clone(), idx);
        }
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeAttrs> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// All edges as (source attrs, target attrs, edge attrs).
    pub fn edges(&self) -> impl Iterator<Item = (&NodeAttrs, &NodeAttrs, &EdgeAttrs)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Look up a node by its key.
    pub fn node(&self, key: &str) -> Option<&NodeAttrs> {
        self.index.get(key).map(|&i| &self.graph[i])
    }

    /// All edges from `from` to `to`, in insertion order. Post view may
    /// hold several; user and hashtag view at most one.
    pub fn edges_between(&self, from: &str, to: &str) -> Vec<&EdgeAttrs> {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return vec![];
        };
        self.graph.edges_connecting(a, b).map(|e| e.weight()).collect()
    }

    fn ensure_node(&mut self, key: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(NodeAttrs {
            id: key.to_string(),
            screen_name: None,
            kind: None,
        });
        self.index.insert(key.to_string(), idx);
        idx
    }
}

// --- tests -------------------------------------------------------------------
