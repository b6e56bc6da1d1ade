//! Directory scanner: walks a project root and admits candidate files.
//!
//! The `ignore` walker runs with its standard filters off: exclusion is
//! decided by [`IgnoreRuleSet`] alone, plus the fixed admission rules below.

use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ignore_rules::IgnoreRuleSet;
use super::types::{relative_id, FileRecord};
use crate::error::{GraphError, Result};

/// Extensions a file must carry to be admitted.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".js", ".json", ".jsx", ".tsx", ".jpg", ".ts", ".py", ".c"];

/// Files at or above this size are skipped.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

pub struct DirectoryScanner {
    root: PathBuf,
    rules: Option<IgnoreRuleSet>,
    ignore_file: String,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: None,
            ignore_file: super::ignore_rules::DEFAULT_IGNORE_FILE.to_string(),
        }
    }

    /// Use an explicit rule set instead of built-ins + the project ignore file.
    pub fn with_rules(mut self, rules: IgnoreRuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignore_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The rule set this scanner will apply.
    pub fn rules(&self) -> IgnoreRuleSet {
        self.rules
            .clone()
            .unwrap_or_else(|| IgnoreRuleSet::for_project_with(&self.root, &self.ignore_file))
    }

    /// Walk the tree and return every admitted file. Order is unspecified.
    pub fn scan(&self) -> Result<Vec<FileRecord>> {
        if !self.root.is_dir() {
            return Err(GraphError::NotFound(self.root.clone()));
        }

        let rules = self.rules();
        let prune_rules = rules.clone();
        let prune_root = self.root.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                let rel = relative_id(&prune_root, entry.path());
                !prune_rules.excludes_dir(&name, &rel)
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let path = entry.path();
            let rel = relative_id(&self.root, path);
            if !is_admissible_name(path) || rules.excludes_file(&rel) {
                continue;
            }

            // Follows symlinks, so a linked file is sized by its target.
            let size = match fs::metadata(path) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => continue,
                Err(e) => {
                    debug!(file = %rel, error = %e, "no metadata (dangling link?), skipping");
                    continue;
                }
            };
            if size >= MAX_FILE_SIZE {
                debug!(file = %rel, size, "file too large, skipping");
                continue;
            }

            files.push(FileRecord::new(&self.root, entry.into_path(), size));
        }

        debug!(root = %self.root.display(), count = files.len(), "scan finished");
        Ok(files)
    }
}

/// Not hidden and carrying an allowed extension.
pub fn is_admissible_name(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = format!(".{}", ext.to_lowercase());
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
