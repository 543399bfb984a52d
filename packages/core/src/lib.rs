//! Build relationship graphs from social post archives.
//!
//! This crate turns a stream of newline-delimited post records into a
//! directed relationship graph and serializes it in one of several
//! interchange formats. It is the library behind the `postnet` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Normalized post record, [`ViewMode`], [`Relation`] tuple |
//! | [`ingest`] | Line driver and record flattening via [`build_graph`] |
//! | [`extract`] | Per-mode relation extraction |
//! | [`graph`] | Accumulating multigraph with weak-component filtering |
//! | [`export`] | GEXF / GML / DOT / JSON / HTML writers |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::io::BufReader;
//! use postgraph::{build_graph, export, Format, ViewMode};
//!
//! let file = std::fs::File::open("posts.jsonl")?;
//! let mut graph = build_graph(BufReader::new(file), ViewMode::Users)?;
//! graph.filter_components(Some(3), None);
//!
//! let mut out = std::fs::File::create("mentions.gexf")?;
//! export::write(&graph, Format::Gexf, &mut out)?;
//! ```
//!
//! Processing is strictly batch and single-threaded: the whole input is
//! consumed (or the run aborts on the first malformed line) before any
//! output is produced.

pub mod export;
pub mod extract;
pub mod graph;
pub mod ingest;
pub mod types;

pub use export::{ExportError, Format};
pub use extract::relations;
pub use graph::{EdgeAttrs, NetworkGraph, NodeAttrs};
pub use ingest::{build_graph, flatten, BuildError, FlattenError};
pub use types::{Author, Mention, Post, ReferencedPost, Relation, ViewMode};
