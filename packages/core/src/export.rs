//! Multi-format graph serialization.
//!
//! The exporter receives a finished, read-only [`NetworkGraph`] and writes
//! it in the format selected by the output file's extension: GEXF 1.2draft,
//! GML, Graphviz DOT, a plain JSON graph document, or a self-contained HTML
//! page embedding that JSON plus a d3 force-directed visualization. No graph
//! semantics live here; every writer walks the same node and edge accessors.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::graph::NetworkGraph;

/// Embedded visualization page. `__GRAPH_DATA__` is replaced with the JSON
/// graph document at export time; the template itself is a fixed asset.
const HTML_TEMPLATE: &str = include_str!("viz.html");

/// The serialization formats the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gexf,
    Gml,
    Dot,
    Json,
    Html,
}

/// Errors selecting an output format. These are configuration errors and
/// are raised before any input is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("output path {0:?} has no extension; expected one of: .gexf .gml .dot .json .html")]
    MissingExtension(String),

    #[error("unknown output extension {0:?}; expected one of: .gexf .gml .dot .json .html")]
    UnknownExtension(String),
}

impl Format {
    /// Select the format from an output path's extension.
    pub fn from_path(path: &Path) -> Result<Format, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::MissingExtension(path.display().to_string()))?;
        match ext.to_ascii_lowercase().as_str() {
            "gexf" => Ok(Format::Gexf),
            "gml" => Ok(Format::Gml),
            "dot" => Ok(Format::Dot),
            "json" => Ok(Format::Json),
            "html" => Ok(Format::Html),
            other => Err(ExportError::UnknownExtension(other.to_string())),
        }
    }
}

/// Serialize `graph` in `format` to `out`.
pub fn write<W: Write>(graph: &NetworkGraph, format: Format, out: &mut W) -> io::Result<()> {
    match format {
        Format::Gexf => write_gexf(graph, out),
        Format::Gml => write_gml(graph, out),
        Format::Dot => write_dot(graph, out),
        Format::Json => {
            let doc = serde_json::to_string_pretty(&json_document(graph))?;
            out.write_all(doc.as_bytes())?;
            out.write_all(b"\n")
        }
        Format::Html => {
            let doc = serde_json::to_string_pretty(&json_document(graph))?;
            out.write_all(HTML_TEMPLATE.replace("__GRAPH_DATA__", &doc).as_bytes())
        }
    }
}

// --- JSON --------------------------------------------------------------------

/// The JSON graph document: `{"nodes": [...], "links": [...]}`.
///
/// Absent attributes serialize as `null` rather than being omitted, and
/// edge weight is deliberately not part of this document.
#[derive(Serialize)]
struct JsonGraph<'a> {
    nodes: Vec<JsonNode<'a>>,
    links: Vec<JsonLink<'a>>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: Option<&'a str>,
    screen_name: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonLink<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

fn json_document(graph: &NetworkGraph) -> JsonGraph<'_> {
    JsonGraph {
        nodes: graph
            .nodes()
            .map(|n| JsonNode {
                id: &n.id,
                kind: n.kind.as_deref(),
                screen_name: n.screen_name.as_deref(),
            })
            .collect(),
        links: graph
            .edges()
            .map(|(from, to, edge)| JsonLink {
                source: &from.id,
                target: &to.id,
                kind: &edge.kind,
            })
            .collect(),
    }
}

// --- GEXF --------------------------------------------------------------------

fn write_gexf<W: Write>(graph: &NetworkGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#
    )?;
    writeln!(out, r#"  <graph defaultedgetype="directed" mode="static">"#)?;
    writeln!(out, r#"    <attributes class="node">"#)?;
    writeln!(
        out,
        r#"      <attribute id="0" title="screen_name" type="string"/>"#
    )?;
    writeln!(out, r#"      <attribute id="1" title="type" type="string"/>"#)?;
    writeln!(out, "    </attributes>")?;
    writeln!(out, r#"    <attributes class="edge">"#)?;
    writeln!(out, r#"      <attribute id="2" title="type" type="string"/>"#)?;
    writeln!(out, "    </attributes>")?;

    writeln!(out, "    <nodes>")?;
    for node in graph.nodes() {
        let label = node.screen_name.as_deref().unwrap_or(&node.id);
        writeln!(
            out,
            r#"      <node id="{}" label="{}">"#,
            xml_escape(&node.id),
            xml_escape(label)
        )?;
        writeln!(out, "        <attvalues>")?;
        if let Some(name) = &node.screen_name {
            writeln!(
                out,
                r#"          <attvalue for="0" value="{}"/>"#,
                xml_escape(name)
            )?;
        }
        if let Some(kind) = &node.kind {
            writeln!(
                out,
                r#"          <attvalue for="1" value="{}"/>"#,
                xml_escape(kind)
            )?;
        }
        writeln!(out, "        </attvalues>")?;
        writeln!(out, "      </node>")?;
    }
    writeln!(out, "    </nodes>")?;

    writeln!(out, "    <edges>")?;
    for (i, (from, to, edge)) in graph.edges().enumerate() {
        let weight = edge
            .weight
            .map(|w| format!(r#" weight="{}""#, w))
            .unwrap_or_default();
        writeln!(
            out,
            r#"      <edge id="{}" source="{}" target="{}"{}>"#,
            i,
            xml_escape(&from.id),
            xml_escape(&to.id),
            weight
        )?;
        writeln!(out, "        <attvalues>")?;
        writeln!(
            out,
            r#"          <attvalue for="2" value="{}"/>"#,
            xml_escape(&edge.kind)
        )?;
        writeln!(out, "        </attvalues>")?;
        writeln!(out, "      </edge>")?;
    }
    writeln!(out, "    </edges>")?;

    writeln!(out, "  </graph>")?;
    writeln!(out, "</gexf>")
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

// --- GML ---------------------------------------------------------------------

fn write_gml<W: Write>(graph: &NetworkGraph, out: &mut W) -> io::Result<()> {
    // GML addresses nodes by integer id; assign them in node order.
    let ids: std::collections::HashMap<&str, usize> = graph
        .nodes()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    writeln!(out, "graph [")?;
    writeln!(out, "  directed 1")?;
    for node in graph.nodes() {
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", ids[node.id.as_str()])?;
        writeln!(out, "    label \"{}\"", gml_escape(&node.id))?;
        if let Some(name) = &node.screen_name {
            writeln!(out, "    screen_name \"{}\"", gml_escape(name))?;
        }
        if let Some(kind) = &node.kind {
            writeln!(out, "    type \"{}\"", gml_escape(kind))?;
        }
        writeln!(out, "  ]")?;
    }
    for (from, to, edge) in graph.edges() {
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", ids[from.id.as_str()])?;
        writeln!(out, "    target {}", ids[to.id.as_str()])?;
        writeln!(out, "    type \"{}\"", gml_escape(&edge.kind))?;
        if let Some(w) = edge.weight {
            writeln!(out, "    weight {}", w)?;
        }
        writeln!(out, "  ]")?;
    }
    writeln!(out, "]")
}

fn gml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// --- DOT ---------------------------------------------------------------------

fn write_dot<W: Write>(graph: &NetworkGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    for node in graph.nodes() {
        match &node.screen_name {
            Some(name) => writeln!(
                out,
                "    \"{}\" [label=\"{}\"];",
                dot_escape(&node.id),
                dot_escape(name)
            )?,
            None => writeln!(out, "    \"{}\";", dot_escape(&node.id))?,
        }
    }
    for (from, to, edge) in graph.edges() {
        let weight = edge
            .weight
            .map(|w| format!(", weight={}", w))
            .unwrap_or_default();
        writeln!(
            out,
            "    \"{}\" -> \"{}\" [type=\"{}\"{}];",
            dot_escape(&from.id),
            dot_escape(&to.id),
            dot_escape(&edge.kind),
            weight
        )?;
    }
    writeln!(out, "}}")
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// --- tests -------------------------------------------------------------------
