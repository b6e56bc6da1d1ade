//! Exclusion patterns: built-ins plus the project's ignore file.
//!
//! Patterns are plain strings, not globs. There is no negation or
//! precedence: a `!pattern` line is kept verbatim as one more exclusion.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Excluded in every project.
pub const BUILTIN_PATTERNS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".vscode",
    "dist",
    "build",
    ".husky",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".npmrc",
    ".yarnrc",
    ".prettierrc",
    ".eslintrc",
    "prettier.config.js",
    "eslint.config.js",
    ".prettierignore",
];

pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
}

impl IgnoreRuleSet {
    pub fn builtin() -> Self {
        Self::from_patterns(BUILTIN_PATTERNS.iter().copied())
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-ins followed by the lines of `<root>/.gitignore`.
    pub fn for_project(root: &Path) -> Self {
        Self::for_project_with(root, DEFAULT_IGNORE_FILE)
    }

    pub fn for_project_with(root: &Path, ignore_file: &str) -> Self {
        let mut rules = Self::builtin();
        let path = root.join(ignore_file);
        if !path.exists() {
            return rules;
        }
        match fs::read_to_string(&path) {
            Ok(text) => {
                let extra = parse_ignore_file(&text);
                debug!(file = %path.display(), count = extra.len(), "loaded ignore patterns");
                rules.patterns.extend(extra);
            }
            Err(e) => warn!(file = %path.display(), error = %e, "failed to read ignore file"),
        }
        rules
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Prune a directory whose name equals a pattern, or whose root-relative
    /// path equals a pattern or sits under `pattern/`. Paths are also tried
    /// with a leading `/` so root-anchored lines (`/generated`) apply.
    pub fn excludes_dir(&self, name: &str, rel_path: &str) -> bool {
        let anchored = anchored(rel_path);
        self.patterns.iter().any(|p| {
            name == p || is_at_or_under(rel_path, p) || is_at_or_under(&anchored, p)
        })
    }

    /// Coarse file check: any pattern occurring anywhere in `/`-prefixed
    /// root-relative path excludes it.
    pub fn excludes_file(&self, rel_path: &str) -> bool {
        let anchored = anchored(rel_path);
        self.patterns.iter().any(|p| anchored.contains(p.as_str()))
    }
}

fn anchored(rel_path: &str) -> String {
    format!("/{}", rel_path)
}

fn is_at_or_under(path: &str, pattern: &str) -> bool {
    path == pattern
        || (path.starts_with(pattern) && path.as_bytes().get(pattern.len()) == Some(&b'/'))
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One pattern per non-blank, non-comment line, trailing `/` stripped.
/// Lines that end up empty (a bare `/`) are dropped.
pub fn parse_ignore_file(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.trim_end_matches('/').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
