//! `postnet`: build relationship networks from archives of social posts.
//!
//! Reads newline-delimited JSON post records, folds them into a directed
//! graph of reply/retweet/quote relations (or mention relations with
//! `--users`, or hashtag co-occurrence with `--hashtags`), optionally prunes
//! small or large connected components, and writes the graph in the format
//! chosen by the output file's extension.
//!
//! A malformed input line aborts the whole run with its line number on
//! stderr; no output file is written in that case.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use postgraph::{build_graph, export, Format, ViewMode};

/// postnet: post, mention, and hashtag networks from post archives
///
/// INFILE is newline-delimited JSON (one record per line, `-` for stdin).
/// The output format follows OUTFILE's extension: .gexf, .gml, .dot, .json,
/// or .html (interactive visualization).
#[derive(Parser)]
#[command(name = "postnet", version, about, long_about = None)]
struct Cli {
    /// Remove connected components with fewer nodes than this.
    #[arg(long = "min_subgraph_size", value_name = "N")]
    min_subgraph_size: Option<usize>,

    /// Remove connected components with more nodes than this.
    #[arg(long = "max_subgraph_size", value_name = "N")]
    max_subgraph_size: Option<usize>,

    /// Include retweets. Accepted for compatibility; relation
    /// classification does not currently consult it.
    #[arg(long)]
    retweets: bool,

    /// Build the user mention network instead of the post network.
    #[arg(long, conflicts_with = "hashtags")]
    users: bool,

    /// Build the hashtag co-occurrence network instead of the post network.
    #[arg(long)]
    hashtags: bool,

    /// Input path, or `-` for stdin.
    infile: PathBuf,

    /// Output path; the extension selects the format.
    outfile: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Resolve the output format before touching any input so an unknown
    // extension fails as a configuration error, not after a long run.
    let format = Format::from_path(&cli.outfile).unwrap_or_else(|e| fatal(&e.to_string()));

    let mode = if cli.users {
        ViewMode::Users
    } else if cli.hashtags {
        ViewMode::Hashtags
    } else {
        ViewMode::Posts
    };
    let _ = cli.retweets;

    let reader = open_input(&cli.infile);
    let mut graph = match build_graph(reader, mode) {
        Ok(graph) => graph,
        Err(e) => {
            // Fail fast: report the offending line, write nothing.
            eprintln!("postnet: {}", e);
            process::exit(1);
        }
    };

    graph.filter_components(cli.min_subgraph_size, cli.max_subgraph_size);

    // The output file is only created once the graph is complete, so a
    // failed run leaves no partial artifact behind.
    let file = File::create(&cli.outfile)
        .unwrap_or_else(|e| fatal(&format!("failed to create {}: {}", cli.outfile.display(), e)));
    let mut out = BufWriter::new(file);
    export::write(&graph, format, &mut out)
        .and_then(|_| out.flush())
        .unwrap_or_else(|e| fatal(&format!("failed to write {}: {}", cli.outfile.display(), e)));
}

/// Open the input file, or stdin when the path is `"-"`.
fn open_input(path: &PathBuf) -> Box<dyn BufRead> {
    if path.to_str() == Some("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path.display(), e)));
        Box::new(BufReader::new(file))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("postnet: {}", msg);
    process::exit(2);
}
