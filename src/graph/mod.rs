//! Reference graph module.
//!
//! Data model, directory scanning, ignore rules, the petgraph-backed engine,
//! graph building and snapshot storage.

pub mod builder;
pub mod engine;
pub mod ignore_rules;
pub mod persistence;
pub mod scanner;
pub mod types;

pub use builder::{build_graph, GraphBuilder, SearchTerms, DEFAULT_PROGRESS_INTERVAL};
pub use engine::{GraphStats, ReferenceGraph};
pub use ignore_rules::{IgnoreRuleSet, BUILTIN_PATTERNS, DEFAULT_IGNORE_FILE};
pub use persistence::GraphPersistence;
pub use scanner::{DirectoryScanner, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};
pub use types::{
    DependencyEdge, EdgeStrategy, FileRecord, Graph, GraphMetadata, GraphNode, LayoutPosition,
};
