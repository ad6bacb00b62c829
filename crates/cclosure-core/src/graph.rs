//! Adjacency-set store for undirected simple graphs.
//!
//! # Overview
//!
//! [`Graph`] maps every node id to the ordered set of its neighbors. Every
//! algorithm in the workspace reads neighbor sets through this store, and the
//! densifier is its only writer.
//!
//! ## Invariants
//!
//! - Symmetric: `v ∈ neighbors(u)` iff `u ∈ neighbors(v)`.
//! - No self-loops and no duplicate edges.
//! - Edges are only ever inserted, never removed.
//!
//! ## Ordering
//!
//! Both the node map and the neighbor sets are B-tree collections, so every
//! traversal visits nodes in ascending id order. The closure tables and the
//! peeling order downstream inherit that determinism.
//!
//! ## Fingerprint
//!
//! [`Graph::content_hash`] is a BLAKE3 hash of the canonical edge list. Two
//! graphs with the same edges hash identically regardless of insertion order.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Node identifier. Ids may be sparse within `0..=u32::MAX`.
pub type Node = u32;

static NO_NEIGHBORS: BTreeSet<Node> = BTreeSet::new();

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by edge insertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge from a node to itself was requested.
    #[error("self-loop on node {0} is not allowed in a simple graph")]
    SelfLoop(Node),
}

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// An unordered pair of distinct nodes, stored smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair {
    lo: Node,
    hi: Node,
}

impl Pair {
    /// Canonicalize `(a, b)`. Returns `None` when `a == b`.
    #[must_use]
    pub const fn new(a: Node, b: Node) -> Option<Self> {
        if a < b {
            Some(Self { lo: a, hi: b })
        } else if b < a {
            Some(Self { lo: b, hi: a })
        } else {
            None
        }
    }

    /// The smaller node id.
    #[must_use]
    pub const fn lo(self) -> Node {
        self.lo
    }

    /// The larger node id.
    #[must_use]
    pub const fn hi(self) -> Node {
        self.hi
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An undirected simple graph stored as ordered adjacency sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<Node, BTreeSet<Node>>,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an edge iterator.
    ///
    /// Duplicate edges are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfLoop`] on the first `(v, v)` edge.
    pub fn from_edges<I>(edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (Node, Node)>,
    {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Insert the undirected edge `u`–`v`.
    ///
    /// Returns `Ok(true)` when the edge is new and `Ok(false)` when it was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfLoop`] when `u == v`; the graph is left
    /// untouched.
    pub fn add_edge(&mut self, u: Node, v: Node) -> Result<bool, GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        let inserted = self.adjacency.entry(u).or_default().insert(v);
        self.adjacency.entry(v).or_default().insert(u);
        if inserted {
            self.edge_count += 1;
        }
        Ok(inserted)
    }

    /// Register `node` with no edges. No-op if it already exists.
    pub fn add_node(&mut self, node: Node) {
        self.adjacency.entry(node).or_default();
    }

    /// Neighbors of `node` in ascending order. Unknown nodes have none.
    #[must_use]
    pub fn neighbors(&self, node: Node) -> &BTreeSet<Node> {
        self.adjacency.get(&node).unwrap_or(&NO_NEIGHBORS)
    }

    /// Number of neighbors of `node`.
    #[must_use]
    pub fn degree(&self, node: Node) -> usize {
        self.neighbors(node).len()
    }

    /// Return `true` if `u` and `v` are adjacent.
    #[must_use]
    pub fn has_edge(&self, u: Node, v: Node) -> bool {
        self.adjacency.get(&u).is_some_and(|set| set.contains(&v))
    }

    /// Return `true` if `node` is part of the graph.
    #[must_use]
    pub fn contains_node(&self, node: Node) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Iterate node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterate `(node, neighbors)` in ascending node order.
    pub fn adjacency(&self) -> impl Iterator<Item = (Node, &BTreeSet<Node>)> + '_ {
        self.adjacency.iter().map(|(&node, set)| (node, set))
    }

    /// Iterate every edge once as a canonical [`Pair`], ascending.
    pub fn edges(&self) -> impl Iterator<Item = Pair> + '_ {
        self.adjacency.iter().flat_map(|(&u, set)| {
            set.range(u.saturating_add(1)..)
                .filter_map(move |&v| Pair::new(u, v))
        })
    }

    /// Number of nodes, isolated nodes included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Return `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Largest degree in the graph, 0 when empty.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// Largest node id, `None` when empty.
    #[must_use]
    pub fn max_node_id(&self) -> Option<Node> {
        self.adjacency.keys().next_back().copied()
    }

    /// BLAKE3 fingerprint of the canonical edge list.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for pair in self.edges() {
            hasher.update(&pair.lo().to_le_bytes());
            hasher.update(&pair.hi().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
