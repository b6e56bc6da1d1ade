//! Snapshot storage for the latest graph.
//!
//! The snapshot is pretty-printed JSON. Writes go to a `.tmp` sibling first
//! and are renamed over the target, so readers never see a half-written file.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::Graph;
use crate::error::{GraphError, Result};

#[derive(Deserialize)]
struct SnapshotHeader {
    metadata: HeaderMetadata,
}

#[derive(Deserialize)]
struct HeaderMetadata {
    project_path: String,
}

#[derive(Debug, Clone)]
pub struct GraphPersistence {
    path: PathBuf,
}

impl GraphPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the snapshot with `graph`.
    pub fn save(&self, graph: &Graph) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(graph)?;

        let tmp = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "snapshot saved"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Graph> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GraphError::SnapshotNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let graph: Graph = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), nodes = graph.nodes.len(), "snapshot loaded");
        Ok(graph)
    }

    /// Root recorded by the current snapshot, if there is one.
    ///
    /// Only `metadata.project_path` is decoded.
    pub fn last_project_path(&self) -> Result<Option<PathBuf>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let header: SnapshotHeader = serde_json::from_slice(&bytes)?;
        Ok(Some(PathBuf::from(header.metadata.project_path)))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "graph.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_graph() -> Graph {
        let root = Path::new("/proj");
        let records = [
            FileRecord::new(root, root.join("app.js"), 10),
            FileRecord::new(root, root.join("util.js"), 5),
        ];
        Graph {
            metadata: GraphMetadata {
                project_path: "/proj".to_string(),
                project_name: "proj".to_string(),
                generated_at: Utc::now(),
                file_count: 2,
                connection_count: 1,
            },
            nodes: records
                .iter()
                .enumerate()
                .map(|(i, r)| GraphNode::from_record(r, i))
                .collect(),
            edges: vec![DependencyEdge::new("app.js", "util.js")],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = GraphPersistence::new(dir.path().join("nested/out/graph.json"));
        let graph = sample_graph();

        store.save(&graph).unwrap();
        assert!(store.exists());
        assert!(!dir.path().join("nested/out/graph.json.tmp").exists());
        assert_eq!(store.load().unwrap(), graph);
        assert_eq!(store.last_project_path().unwrap(), Some(PathBuf::from("/proj")));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let dir = TempDir::new().unwrap();
        let store = GraphPersistence::new(dir.path().join("graph.json"));
        store.save(&sample_graph()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["metadata"]["project_name"], "proj");
        assert_eq!(value["nodes"][0]["type"], ".js");
        assert_eq!(value["edges"][0]["from"], "app.js");
    }

    #[test]
    fn test_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = GraphPersistence::new(dir.path().join("graph.json"));
        assert!(matches!(store.load(), Err(GraphError::SnapshotNotFound(_))));
        assert_eq!(store.last_project_path().unwrap(), None);
    }

    #[test]
    fn test_last_project_path_reads_only_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, r#"{"metadata": {"project_path": "/elsewhere"}}"#).unwrap();
        let store = GraphPersistence::new(&path);
        assert_eq!(store.last_project_path().unwrap(), Some(PathBuf::from("/elsewhere")));
        assert!(store.load().is_err());
    }

    #[test]
    fn test_corrupt_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{not json").unwrap();
        let err = GraphPersistence::new(&path).load().unwrap_err();
        assert_eq!(err.kind(), "invalid_snapshot");
    }

    #[test]
    fn test_save_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let store = GraphPersistence::new(dir.path().join("graph.json"));
        let mut graph = sample_graph();
        store.save(&graph).unwrap();

        graph.edges.clear();
        graph.metadata.connection_count = 0;
        store.save(&graph).unwrap();
        assert!(store.load().unwrap().edges.is_empty());
    }
}
