//! The in-memory reference graph.
//!
//! Uses petgraph to hold file nodes and reference edges. Edges have set
//! semantics on `(from, to)` and self-references are rejected, so callers
//! can add every discovered reference without deduplicating first.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::*;

pub struct ReferenceGraph {
    graph: DiGraph<GraphNode, ()>,
    /// Index: node id -> node index.
    id_index: HashMap<String, NodeIndex>,
    /// Edges in insertion order, for stable output.
    edge_order: Vec<(NodeIndex, NodeIndex)>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            edge_order: Vec::new(),
        }
    }

    /// Rebuild from a serialized graph. Edges whose endpoints are missing
    /// are skipped.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut engine = Self::new();
        for node in &graph.nodes {
            engine.add_node(node.clone());
        }
        for edge in &graph.edges {
            engine.add_reference(&edge.from, &edge.to);
        }
        engine
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Add a node. A node with the same id is replaced in place.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(&node.id) {
            self.graph[idx] = node;
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        idx
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.id_index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Record that `from` references `to`. Returns `true` if this added a new
    /// edge; unknown ids, self-references and duplicates return `false`.
    pub fn add_reference(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.id_index.get(from), self.id_index.get(to)) else {
            return false;
        };
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        self.edge_order.push((a, b));
        true
    }

    // ─── Query Operations ───────────────────────────────────────

    /// Ids of the files `id` references, sorted.
    pub fn references(&self, id: &str) -> Vec<String> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Ids of the files that reference `id`, sorted.
    pub fn referenced_by(&self, id: &str) -> Vec<String> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph[other].id.clone()
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn stats(&self) -> GraphStats {
        let isolated = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
            .count();
        let most_referenced = self
            .graph
            .node_indices()
            .map(|idx| {
                let count = self.graph.edges_directed(idx, Direction::Incoming).count();
                (count, &self.graph[idx].id)
            })
            .filter(|(count, _)| *count > 0)
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(count, id)| (id.clone(), count));

        GraphStats {
            file_count: self.graph.node_count(),
            connection_count: self.graph.edge_count(),
            isolated_files: isolated,
            most_referenced,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> Vec<GraphNode> {
        self.graph.node_weights().cloned().collect()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.edge_order
            .iter()
            .map(|&(a, b)| DependencyEdge::new(self.graph[a].id.clone(), self.graph[b].id.clone()))
            .collect()
    }
}

impl Default for ReferenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary numbers for a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub file_count: usize,
    pub connection_count: usize,
    /// Files with no edges in either direction.
    pub isolated_files: usize,
    /// The file with the most incoming references and its count.
    pub most_referenced: Option<(String, usize)>,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} connections, {} isolated",
            self.file_count, self.connection_count, self.isolated_files
        )?;
        if let Some((id, count)) = &self.most_referenced {
            write!(f, ", most referenced: {} ({})", id, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, index: usize) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            label: id.rsplit('/').next().unwrap_or(id).to_string(),
            file_type: ".js".to_string(),
            path: id.to_string(),
            position: LayoutPosition::for_index(index),
        }
    }

    fn sample() -> ReferenceGraph {
        let mut graph = ReferenceGraph::new();
        for (i, id) in ["a.js", "b.js", "c.js", "lonely.js"].iter().enumerate() {
            graph.add_node(node(id, i));
        }
        graph.add_reference("a.js", "b.js");
        graph.add_reference("c.js", "b.js");
        graph.add_reference("b.js", "c.js");
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = ReferenceGraph::new();
        let stats = graph.stats();
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.connection_count, 0);
        assert!(stats.most_referenced.is_none());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = sample();
        assert!(!graph.add_reference("a.js", "b.js"));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_self_and_unknown_edges_rejected() {
        let mut graph = sample();
        assert!(!graph.add_reference("a.js", "a.js"));
        assert!(!graph.add_reference("a.js", "missing.js"));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_neighbors() {
        let graph = sample();
        assert_eq!(graph.references("b.js"), vec!["c.js"]);
        assert_eq!(graph.referenced_by("b.js"), vec!["a.js", "c.js"]);
        assert!(graph.references("nope.js").is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.file_count, 4);
        assert_eq!(stats.connection_count, 3);
        assert_eq!(stats.isolated_files, 1);
        assert_eq!(stats.most_referenced, Some(("b.js".to_string(), 2)));
    }

    #[test]
    fn test_edges_keep_insertion_order() {
        let graph = sample();
        let edges: Vec<String> = graph.edges().iter().map(|e| e.to_string()).collect();
        assert_eq!(edges, vec!["a.js -> b.js", "c.js -> b.js", "b.js -> c.js"]);
    }

    #[test]
    fn test_readd_node_replaces() {
        let mut graph = sample();
        let mut replacement = node("a.js", 9);
        replacement.label = "renamed".to_string();
        graph.add_node(replacement);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.node("a.js").unwrap().label, "renamed");
    }
}
