//! Edge-list loader.
//!
//! # Format
//!
//! One undirected edge per line: two whitespace-separated non-negative
//! integer node ids. Lines whose first character is `#` are comments. Blank
//! lines are ignored.
//!
//! ```text
//! # Directed graph (each unordered pair of nodes is saved once)
//! # FromNodeId	ToNodeId
//! 0	1
//! 0	2
//! ```
//!
//! Every line implies both directions, so `1 2` and `2 1` describe the same
//! edge and the second occurrence is counted as a duplicate.
//!
//! ## Errors
//!
//! A line that is not UTF-8, has a token count other than two, or holds a
//! token that is not a valid node id aborts the load with the 1-based line
//! number. Self-loop lines are not fatal: they are skipped, counted in
//! [`LoadStats::self_loops`], and logged.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::graph::{Graph, GraphError, Node};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading an edge list.
#[derive(Debug, thiserror::Error)]
pub enum EdgeListError {
    /// I/O error while reading the source.
    #[error("edge list I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data line did not contain exactly two tokens.
    #[error("line {line}: expected two node ids, found {content:?}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },

    /// A token was not a valid non-negative node id.
    #[error("line {line}: invalid node id {token:?}")]
    InvalidNode {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
}

// ---------------------------------------------------------------------------
// LoadStats
// ---------------------------------------------------------------------------

/// Bookkeeping collected while loading an edge list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Total lines read, comments and blanks included.
    pub lines: usize,
    /// Comment lines skipped.
    pub comments: usize,
    /// Edge lines that produced a new edge.
    pub edges: usize,
    /// Edge lines that repeated an existing edge (either direction).
    pub duplicate_edges: usize,
    /// `v v` lines skipped.
    pub self_loops: usize,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse an edge list from any buffered reader.
///
/// # Errors
///
/// Returns [`EdgeListError`] on I/O failure or on the first malformed line.
pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<(Graph, LoadStats), EdgeListError> {
    let mut graph = Graph::new();
    let mut stats = LoadStats::default();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let mut raw = raw?;
        let line_no = index + 1;
        stats.lines += 1;

        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let line = String::from_utf8(raw).map_err(|err| EdgeListError::Malformed {
            line: line_no,
            content: String::from_utf8_lossy(err.as_bytes()).trim().to_string(),
        })?;

        if line.starts_with('#') {
            stats.comments += 1;
            continue;
        }
        let Some((u, v)) = parse_line(&line, line_no)? else {
            continue;
        };

        match graph.add_edge(u, v) {
            Ok(true) => stats.edges += 1,
            Ok(false) => stats.duplicate_edges += 1,
            Err(GraphError::SelfLoop(node)) => {
                stats.self_loops += 1;
                warn!(line = line_no, node, "skipping self-loop");
            }
        }
    }

    debug!(?stats, "edge list parsed");
    Ok((graph, stats))
}

/// Load an edge list from `path`.
///
/// # Errors
///
/// Returns [`EdgeListError`] if the file cannot be opened or a line is
/// malformed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_edge_list(path: &Path) -> Result<(Graph, LoadStats), EdgeListError> {
    let file = File::open(path)?;
    parse_edge_list(BufReader::new(file))
}

/// Parse one non-comment line. Blank lines yield `Ok(None)`.
fn parse_line(line: &str, line_no: usize) -> Result<Option<(Node, Node)>, EdgeListError> {
    let mut tokens = line.split_whitespace();
    let (first, second, rest) = (tokens.next(), tokens.next(), tokens.next());

    match (first, second, rest) {
        (None, _, _) => Ok(None),
        (Some(a), Some(b), None) => Ok(Some((parse_node(a, line_no)?, parse_node(b, line_no)?))),
        _ => Err(EdgeListError::Malformed {
            line: line_no,
            content: line.trim().to_string(),
        }),
    }
}

fn parse_node(token: &str, line_no: usize) -> Result<Node, EdgeListError> {
    token.parse::<Node>().map_err(|_| EdgeListError::InvalidNode {
        line: line_no,
        token: token.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
