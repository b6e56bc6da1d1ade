//! Resolve raw reference strings to known file ids.
//!
//! Works purely on root-relative, forward-slash ids; nothing touches the
//! filesystem. A reference that matches nothing is simply unresolved.

use std::collections::HashSet;

/// Probed in order when a reference has no extension.
pub const CANDIDATE_EXTENSIONS: &[&str] = &[".js", ".ts", ".jsx", ".tsx", ".py", ".html", ".css"];

/// Shorthand for the project's source directory.
pub const ALIAS_PREFIX: &str = "@/";
/// Directory the alias prefix stands for.
pub const ALIAS_ROOT: &str = "src";

pub struct DependencyResolver {
    known: HashSet<String>,
}

impl DependencyResolver {
    pub fn new<I, S>(known_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    /// Map `reference`, found in the file `source_id`, to a known id.
    pub fn resolve(&self, reference: &str, source_id: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        let source_dir = parent_dir(source_id);

        if reference.starts_with("./") || reference.starts_with("../") {
            let candidate = normalize(&join(source_dir, reference))?;
            self.probe(candidate)
        } else if let Some(rest) = reference.strip_prefix(ALIAS_PREFIX) {
            let candidate = normalize(&join(ALIAS_ROOT, rest))?;
            self.probe(candidate)
        } else if let Some(rest) = reference.strip_prefix('/') {
            let candidate = normalize(&join(source_dir, rest))?;
            self.exact(candidate)
        } else {
            let candidate = normalize(reference)?;
            self.exact(candidate)
        }
    }

    /// Exact match if the base name has an extension, otherwise try each
    /// candidate extension in order.
    fn probe(&self, candidate: String) -> Option<String> {
        if has_extension(&candidate) {
            return self.exact(candidate);
        }
        CANDIDATE_EXTENSIONS
            .iter()
            .map(|ext| format!("{}{}", candidate, ext))
            .find(|id| self.known.contains(id))
    }

    fn exact(&self, candidate: String) -> Option<String> {
        self.known.contains(&candidate).then_some(candidate)
    }
}

fn parent_dir(id: &str) -> &str {
    id.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

fn has_extension(id: &str) -> bool {
    id.rsplit('/').next().is_some_and(|base| base.contains('.'))
}

/// Collapse `.` and `..` segments. Escaping the root yields `None`.
pub fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
