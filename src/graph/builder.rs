//! Graph builder: scans a directory and assembles the reference graph.
//!
//! Phases: scan, layout, read, cross-reference, finalize. Every phase
//! reports through the build's [`BuildProgress`].
//!
//! The default cross-reference pass is a literal substring search: a file
//! references a target if its text contains any of the target's name or
//! path forms. This is intentionally loose (a filename in a comment counts)
//! and intentionally format-agnostic.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::engine::ReferenceGraph;
use super::ignore_rules::{IgnoreRuleSet, DEFAULT_IGNORE_FILE};
use super::scanner::DirectoryScanner;
use super::types::*;
use crate::error::{GraphError, Result};
use crate::parser::{extract_references, read_text};
use crate::progress::{BuildProgress, ProgressStatus};
use crate::resolver::{DependencyResolver, ALIAS_PREFIX, ALIAS_ROOT};

const SCAN_PERCENT: u8 = 10;
const READ_PERCENT: u8 = 30;
const ANALYZE_START_PERCENT: u8 = 50;
const ANALYZE_END_PERCENT: u8 = 90;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Build a graph for `root` with default settings and no listeners.
pub fn build_graph(root: &Path) -> Result<Graph> {
    GraphBuilder::new(root).build(&BuildProgress::detached())
}

pub struct GraphBuilder {
    root: PathBuf,
    rules: Option<IgnoreRuleSet>,
    ignore_file: String,
    strategy: EdgeStrategy,
    progress_interval: usize,
}

impl GraphBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: None,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            strategy: EdgeStrategy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_rules(mut self, rules: IgnoreRuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignore_file = name.into();
        self
    }

    pub fn with_strategy(mut self, strategy: EdgeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Run every phase and return the assembled graph.
    ///
    /// A missing root fails before any progress is reported. Per-file read
    /// or parse problems only reduce what the graph finds.
    pub fn build(&self, progress: &BuildProgress) -> Result<Graph> {
        if !self.root.is_dir() {
            return Err(GraphError::NotFound(self.root.clone()));
        }
        let root = self.root.canonicalize()?;
        info!(root = %root.display(), strategy = %self.strategy, build = %progress.build_id(), "building graph");

        // 1. Scan
        progress.report(ProgressStatus::Scanning, "Scanning directory...", SCAN_PERCENT);
        let mut scanner = DirectoryScanner::new(&root).with_ignore_file(self.ignore_file.clone());
        if let Some(rules) = &self.rules {
            scanner = scanner.with_rules(rules.clone());
        }
        let mut files = scanner.scan()?;

        // 2. Layout
        files.sort_by(|a, b| a.id.cmp(&b.id));
        let mut engine = ReferenceGraph::new();
        for (index, record) in files.iter().enumerate() {
            engine.add_node(GraphNode::from_record(record, index));
        }

        // 3. Read
        progress.report(
            ProgressStatus::Reading,
            format!("Reading {} files...", files.len()),
            READ_PERCENT,
        );
        let contents: Vec<String> = files
            .iter()
            .map(|f| read_text(&f.absolute_path).unwrap_or_default())
            .collect();

        // 4. Cross-reference
        progress.report(
            ProgressStatus::Analyzing,
            "Analyzing dependencies...",
            ANALYZE_START_PERCENT,
        );
        match self.strategy {
            EdgeStrategy::Substring => self.cross_reference(&files, &contents, &mut engine, progress),
            EdgeStrategy::Resolved => self.resolve_references(&files, &contents, &mut engine, progress),
        }

        // 5. Finalize
        let graph = Graph {
            metadata: GraphMetadata {
                project_path: root.display().to_string(),
                project_name: project_name(&root),
                generated_at: Utc::now(),
                file_count: engine.node_count(),
                connection_count: engine.edge_count(),
            },
            nodes: engine.nodes(),
            edges: engine.edges(),
        };
        progress.report(
            ProgressStatus::Complete,
            format!(
                "Graph complete: {} files, {} connections",
                graph.metadata.file_count, graph.metadata.connection_count
            ),
            100,
        );
        info!(
            nodes = graph.metadata.file_count,
            edges = graph.metadata.connection_count,
            "generated graph"
        );
        Ok(graph)
    }

    /// For every (target, source) pair, add source -> target when the
    /// source's text contains any search term for the target.
    fn cross_reference(
        &self,
        files: &[FileRecord],
        contents: &[String],
        engine: &mut ReferenceGraph,
        progress: &BuildProgress,
    ) {
        let total = files.len();
        for (i, target) in files.iter().enumerate() {
            self.report_analyzing(progress, i, total, &target.id);
            let terms = SearchTerms::for_target(target);

            for (source, content) in files.iter().zip(contents) {
                if source.id == target.id || content.is_empty() {
                    continue;
                }
                if terms.matches(source, content) && engine.add_reference(&source.id, &target.id) {
                    debug!(from = %source.id, to = %target.id, "reference found");
                }
            }
        }
    }

    /// Extract references per source file and resolve each to a known file.
    fn resolve_references(
        &self,
        files: &[FileRecord],
        contents: &[String],
        engine: &mut ReferenceGraph,
        progress: &BuildProgress,
    ) {
        let resolver = DependencyResolver::new(files.iter().map(|f| f.id.clone()));
        let total = files.len();
        for (i, (source, content)) in files.iter().zip(contents).enumerate() {
            self.report_analyzing(progress, i, total, &source.id);
            for reference in extract_references(&source.absolute_path, content) {
                if let Some(target) = resolver.resolve(&reference, &source.id) {
                    if engine.add_reference(&source.id, &target) {
                        debug!(from = %source.id, to = %target, reference = %reference, "reference resolved");
                    }
                }
            }
        }
    }

    fn report_analyzing(&self, progress: &BuildProgress, index: usize, total: usize, id: &str) {
        if index % self.progress_interval != 0 && index + 1 != total {
            return;
        }
        progress.report(
            ProgressStatus::Analyzing,
            format!("Analyzing {} ({}/{})", id, index + 1, total),
            analyzing_percent(index, total),
        );
    }
}

/// 50% before any file is analyzed, 90% once every file is done.
fn analyzing_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return ANALYZE_END_PERCENT;
    }
    let span = (ANALYZE_END_PERCENT - ANALYZE_START_PERCENT) as usize;
    ANALYZE_START_PERCENT + (span * done.min(total) / total) as u8
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

/// The literal strings that count as a mention of one target file.
#[derive(Debug, Clone)]
pub struct SearchTerms {
    id: String,
    /// Terms that do not depend on the source file.
    fixed: Vec<String>,
}

impl SearchTerms {
    pub fn for_target(target: &FileRecord) -> Self {
        let id = target.id.clone();
        let no_ext = strip_extension(&id).to_string();

        let mut fixed = vec![
            target.label.clone(),
            id.clone(),
            no_ext.clone(),
            id.replace('/', "."),
            no_ext.replace('/', "."),
        ];
        let alias_root = format!("{}/", ALIAS_ROOT);
        if let (Some(rest), Some(rest_no_ext)) =
            (id.strip_prefix(&alias_root), no_ext.strip_prefix(&alias_root))
        {
            fixed.push(format!("{}{}", ALIAS_PREFIX, rest));
            fixed.push(format!("{}{}", ALIAS_PREFIX, rest_no_ext));
        }
        fixed.sort();
        fixed.dedup();

        Self { id, fixed }
    }

    pub fn fixed_terms(&self) -> &[String] {
        &self.fixed
    }

    /// Relative forms of the target as seen from `source`'s directory.
    pub fn relative_terms(&self, source: &FileRecord) -> [String; 2] {
        let relative = relative_reference(source.dir(), &self.id);
        let stripped = strip_base_extension(&relative).to_string();
        [relative, stripped]
    }

    pub fn matches(&self, source: &FileRecord, content: &str) -> bool {
        self.fixed.iter().any(|term| content.contains(term.as_str()))
            || self
                .relative_terms(source)
                .iter()
                .any(|term| content.contains(term.as_str()))
    }
}

/// Everything before the last `.` of the whole id.
fn strip_extension(id: &str) -> &str {
    id.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(id)
}

/// Everything before the last `.` of the final path segment.
fn strip_base_extension(path: &str) -> &str {
    let base_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[base_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..base_start + dot],
        _ => path,
    }
}

/// Path from directory `from_dir` to file `to`, both root-relative,
/// always starting with `./` or `../`.
pub fn relative_reference(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = if from_dir.is_empty() {
        Vec::new()
    } else {
        from_dir.split('/').collect()
    };
    let to_parts: Vec<&str> = to.split('/').collect();

    let common = from
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count()
        .min(to_parts.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to_parts[common..]);
    let relative = parts.join("/");

    if relative.starts_with("./") || relative.starts_with("../") {
        relative
    } else {
        format!("./{}", relative)
    }
}
