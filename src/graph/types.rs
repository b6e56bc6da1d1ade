//! Core types for the reference graph.
//!
//! `FileRecord` is what the scanner produces; `GraphNode`, `DependencyEdge`
//! and `Graph` are the serialized document a front end consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Nodes per layout row.
pub const GRID_COLUMNS: usize = 6;
/// Horizontal distance between layout columns.
pub const GRID_PITCH_X: i64 = 200;
/// Vertical distance between layout rows.
pub const GRID_PITCH_Y: i64 = 120;

/// An admitted file from one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root-relative path with forward slashes. This is the node identity.
    pub id: String,
    /// Base name.
    pub label: String,
    /// Lowercase extension including the dot (`.js`), empty if none.
    pub file_type: String,
    /// Absolute location on disk.
    pub absolute_path: PathBuf,
    /// Size in bytes at scan time.
    pub size: u64,
}

impl FileRecord {
    pub fn new(root: &Path, absolute_path: PathBuf, size: u64) -> Self {
        let id = relative_id(root, &absolute_path);
        let label = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());
        let file_type = absolute_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            id,
            label,
            file_type,
            absolute_path,
            size,
        }
    }

    /// Directory part of the id (`""` for files at the root).
    pub fn dir(&self) -> &str {
        self.id.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// Root-relative, forward-slash form of `path`.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Grid coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutPosition {
    pub x: i64,
    pub y: i64,
}

impl LayoutPosition {
    /// Position for the node at `index` in sorted order.
    pub fn for_index(index: usize) -> Self {
        let column = (index % GRID_COLUMNS) as i64;
        let row = (index / GRID_COLUMNS) as i64;
        Self {
            x: column * GRID_PITCH_X,
            y: row * GRID_PITCH_Y,
        }
    }
}

/// A node of the serialized graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub path: String,
    pub position: LayoutPosition,
}

impl GraphNode {
    pub fn from_record(record: &FileRecord, index: usize) -> Self {
        Self {
            id: record.id.clone(),
            label: record.label.clone(),
            file_type: record.file_type.clone(),
            path: record.id.clone(),
            position: LayoutPosition::for_index(index),
        }
    }
}

/// Directed "`from` plausibly references `to`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

impl DependencyEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub project_path: String,
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub file_count: usize,
    pub connection_count: usize,
}

/// The assembled graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub metadata: GraphMetadata,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<DependencyEdge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Every edge endpoint names a node and no edge is a self-loop.
    pub fn is_consistent(&self) -> bool {
        let ids: std::collections::HashSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges.iter().all(|e| {
            e.from != e.to && ids.contains(e.from.as_str()) && ids.contains(e.to.as_str())
        })
    }
}

/// How cross-file edges are discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrategy {
    /// Literal search for a target's name and path forms in every other file.
    #[default]
    Substring,
    /// Per-format reference extraction followed by path resolution.
    Resolved,
}

impl fmt::Display for EdgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeStrategy::Substring => write!(f, "substring"),
            EdgeStrategy::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for EdgeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substring" => Ok(EdgeStrategy::Substring),
            "resolved" => Ok(EdgeStrategy::Resolved),
            other => Err(format!("unknown strategy '{}' (expected substring or resolved)", other)),
        }
    }
}
