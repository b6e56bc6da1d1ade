//! The operation surface: build, re-index, progress and snapshot queries.
//!
//! `GraphService` owns the progress broadcaster and the snapshot store. Builds
//! run synchronously on the caller's thread and are serialized by a build
//! lock held across build and save; a second caller waits for the first.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::RefgraphConfig;
use crate::error::{GraphError, Result};
use crate::graph::{Graph, GraphBuilder, GraphPersistence, GraphStats, ReferenceGraph};
use crate::progress::{BuildProgress, ProgressBroadcaster, Subscription};

/// Result of a re-index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexSummary {
    pub project_path: String,
    pub file_count: usize,
    pub connection_count: usize,
}

/// Both edge directions around one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDependencies {
    pub id: String,
    pub references: Vec<String>,
    pub referenced_by: Vec<String>,
}

pub struct GraphService {
    config: RefgraphConfig,
    persistence: GraphPersistence,
    broadcaster: ProgressBroadcaster,
    build_lock: Mutex<()>,
}

impl GraphService {
    pub fn new(config: RefgraphConfig) -> Self {
        let persistence = GraphPersistence::new(config.snapshot_path.clone());
        let broadcaster = ProgressBroadcaster::new(config.channel_capacity);
        Self {
            config,
            persistence,
            broadcaster,
            build_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RefgraphConfig {
        &self.config
    }

    pub fn persistence(&self) -> &GraphPersistence {
        &self.persistence
    }

    pub fn broadcaster(&self) -> &ProgressBroadcaster {
        &self.broadcaster
    }

    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    /// How long a subscriber waits before it gets a keepalive.
    pub fn keepalive(&self) -> Duration {
        self.config.keepalive()
    }

    /// Build the graph for `root` and make it the current snapshot.
    pub fn build(&self, root: &Path) -> Result<Graph> {
        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let progress = BuildProgress::new(&self.broadcaster);
        let graph = GraphBuilder::new(root)
            .with_ignore_file(self.config.ignore_file.clone())
            .with_strategy(self.config.strategy)
            .with_progress_interval(self.config.progress_interval)
            .build(&progress)?;
        self.persistence.save(&graph)?;
        Ok(graph)
    }

    /// Rebuild the root recorded in the current snapshot.
    ///
    /// A root that no longer exists fails with `NotFound` and leaves the
    /// snapshot untouched.
    pub fn reindex(&self) -> Result<ReindexSummary> {
        let root = self
            .persistence
            .last_project_path()?
            .ok_or_else(|| GraphError::SnapshotNotFound(self.persistence.path().to_path_buf()))?;

        if !root.is_dir() {
            warn!(root = %root.display(), "recorded project root is gone");
            return Err(GraphError::NotFound(root));
        }

        info!(root = %root.display(), "re-indexing");
        let graph = self.build(&root)?;
        Ok(ReindexSummary {
            project_path: graph.metadata.project_path,
            file_count: graph.metadata.file_count,
            connection_count: graph.metadata.connection_count,
        })
    }

    /// The current snapshot.
    pub fn load(&self) -> Result<Graph> {
        self.persistence.load()
    }

    /// Absolute path of the file behind node `id`.
    pub fn locate(&self, id: &str) -> Result<PathBuf> {
        let graph = self.load()?;
        let node = graph
            .node(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        Ok(node
            .path
            .split('/')
            .fold(PathBuf::from(&graph.metadata.project_path), |acc, part| acc.join(part)))
    }

    pub fn dependencies(&self, id: &str) -> Result<FileDependencies> {
        let engine = ReferenceGraph::from_graph(&self.load()?);
        if !engine.contains(id) {
            return Err(GraphError::UnknownNode(id.to_string()));
        }
        Ok(FileDependencies {
            id: id.to_string(),
            references: engine.references(id),
            referenced_by: engine.referenced_by(id),
        })
    }

    pub fn stats(&self) -> Result<GraphStats> {
        Ok(ReferenceGraph::from_graph(&self.load()?).stats())
    }
}

impl Default for GraphService {
    fn default() -> Self {
        Self::new(RefgraphConfig::default())
    }
}
