//! # refgraph
//!
//! File reference graphs for project directories.
//!
//! refgraph walks a project, keeps the source-like files, and records a
//! directed edge `A -> B` whenever file A plausibly references file B. The
//! result is a single JSON snapshot with laid-out nodes, ready for a graph
//! viewer. Builds publish progress to any number of subscribers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refgraph::{build_graph, GraphService, RefgraphConfig};
//! use std::path::Path;
//!
//! // One-off build, nothing saved
//! let graph = build_graph(Path::new(".")).unwrap();
//! println!("{} files", graph.metadata.file_count);
//!
//! // Build, save the snapshot, then query it
//! let service = GraphService::new(RefgraphConfig::default());
//! service.build(Path::new(".")).unwrap();
//! let deps = service.dependencies("src/lib.rs");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod progress;
pub mod resolver;
pub mod service;

// Re-exports for convenience
pub use config::RefgraphConfig;
pub use error::{ErrorPayload, GraphError, Result};

// Graph re-exports
pub use graph::{
    build_graph, DependencyEdge, EdgeStrategy, FileRecord, Graph, GraphBuilder, GraphMetadata,
    GraphNode, GraphPersistence, GraphStats, IgnoreRuleSet, LayoutPosition, ReferenceGraph,
};
pub use parser::{extract_references, read_references, FileKind};
pub use progress::{BuildProgress, ProgressBroadcaster, ProgressState, ProgressStatus, Subscription};
pub use resolver::DependencyResolver;
pub use service::{FileDependencies, GraphService, ReindexSummary};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// A small mixed project with ignored directories and rejected files.
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/app.js", "import { fmt } from './util'\nimport Button from '@/components/Button'\n");
        write(root, "src/util.js", "export const fmt = (s) => s.trim()\n");
        write(root, "src/components/Button.tsx", "export default function Button() {}\n");
        write(root, "server/main.py", "from server.db import connect\n");
        write(root, "server/db.py", "def connect(): pass\n");
        write(root, "data/settings.json", "{\"theme\": \"dark\"}\n");
        write(root, "native/io.c", "int main(void) { return 0; }\n");

        write(root, "node_modules/lib/index.js", "module.exports = require('./util')\n");
        write(root, "build/out.js", "util.js\n");
        write(root, "generated/api.ts", "export {}\n");
        write(root, ".hidden.js", "util.js\n");
        write(root, "notes.md", "util.js\n");
        write(root, "package-lock.json", "{}\n");
        write(root, ".gitignore", "# generated output\ngenerated/\n\n");
        fs::write(root.join("src/huge.js"), vec![b'a'; 1024 * 1024]).unwrap();
        dir
    }

    fn edge_set(graph: &Graph) -> BTreeSet<String> {
        graph.edges.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_nodes_match_admitted_files() {
        let dir = project();
        let graph = build_graph(dir.path()).unwrap();

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "data/settings.json",
                "native/io.c",
                "server/db.py",
                "server/main.py",
                "src/app.js",
                "src/components/Button.tsx",
                "src/util.js",
            ]
        );
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(graph.metadata.file_count, ids.len());
    }

    #[test]
    fn test_expected_edges() {
        let dir = project();
        let graph = build_graph(dir.path()).unwrap();
        let edges = edge_set(&graph);

        assert!(edges.contains("src/app.js -> src/util.js"));
        assert!(edges.contains("src/app.js -> src/components/Button.tsx"));
        assert!(edges.contains("server/main.py -> server/db.py"));
        assert_eq!(graph.metadata.connection_count, graph.edges.len());
    }

    #[test]
    fn test_graph_invariants() {
        let dir = project();
        let graph = build_graph(dir.path()).unwrap();

        assert!(graph.is_consistent());
        assert!(graph.edges.iter().all(|e| e.from != e.to));
        let unique: HashSet<&DependencyEdge> = graph.edges.iter().collect();
        assert_eq!(unique.len(), graph.edges.len());
    }

    #[test]
    fn test_builds_are_deterministic() {
        let dir = project();
        let first = build_graph(dir.path()).unwrap();
        let second = build_graph(dir.path()).unwrap();

        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn test_empty_project() {
        let dir = TempDir::new().unwrap();
        let graph = build_graph(dir.path()).unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_missing_root_payload() {
        let err = build_graph(Path::new("/definitely/not/a/project")).unwrap_err();
        let payload = ErrorPayload::from(&err);
        assert_eq!(payload.error, "not_found");
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_completes() {
        let dir = project();
        let state = TempDir::new().unwrap();
        let service = std::sync::Arc::new(GraphService::new(RefgraphConfig {
            snapshot_path: state.path().join("graph.json"),
            progress_interval: 1,
            channel_capacity: 256,
            ..RefgraphConfig::default()
        }));

        let mut subscription = service.subscribe();
        let root = dir.path().to_path_buf();
        let builder = std::sync::Arc::clone(&service);
        tokio::task::spawn_blocking(move || builder.build(&root))
            .await
            .unwrap()
            .unwrap();

        let mut seen = Vec::new();
        while let Some(update) = subscription.next(Duration::from_millis(100)).await {
            match update.status {
                ProgressStatus::Idle => continue,
                ProgressStatus::Keepalive => break,
                _ => seen.push(update),
            }
        }

        assert_eq!(seen.first().map(|s| s.status), Some(ProgressStatus::Scanning));
        let last = seen.last().unwrap();
        assert_eq!(last.status, ProgressStatus::Complete);
        assert_eq!(last.percentage, 100);
        assert!(seen.windows(2).all(|w| w[0].percentage <= w[1].percentage));
        assert!(seen.iter().any(|s| s.status == ProgressStatus::Analyzing
            && s.message.contains("src/util.js")));

        let build_ids: HashSet<_> = seen.iter().map(|s| s.build_id).collect();
        assert_eq!(build_ids.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip_and_reindex() {
        let dir = project();
        let state = TempDir::new().unwrap();
        let service = GraphService::new(RefgraphConfig {
            snapshot_path: state.path().join("graph.json"),
            ..RefgraphConfig::default()
        });

        let built = service.build(dir.path()).unwrap();
        assert_eq!(service.load().unwrap(), built);

        let summary = service.reindex().unwrap();
        assert_eq!(summary.file_count, built.metadata.file_count);
        assert_eq!(summary.connection_count, built.metadata.connection_count);

        let before = fs::read(service.persistence().path()).unwrap();
        dir.close().unwrap();
        assert!(service.reindex().unwrap_err().is_not_found());
        assert_eq!(fs::read(service.persistence().path()).unwrap(), before);
    }

    #[test]
    fn test_resolved_strategy_on_project() {
        let dir = project();
        let graph = GraphBuilder::new(dir.path())
            .with_strategy(EdgeStrategy::Resolved)
            .build(&BuildProgress::detached())
            .unwrap();
        let edges = edge_set(&graph);

        assert!(edges.contains("src/app.js -> src/util.js"));
        assert!(edges.contains("server/main.py -> server/db.py"));
        // Script extraction keeps relative imports only.
        assert!(!edges.contains("src/app.js -> src/components/Button.tsx"));
        assert!(graph.is_consistent());
    }
}
