//! File kind detection and tree-sitter grammar loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

/// The extraction dialect chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Formal import statements, parsed with tree-sitter.
    Python,
    /// JS/TS modules with bundler conventions.
    Script,
    Markup,
    Stylesheet,
    /// JSON and similar structured data.
    Data,
    /// SVG.
    Vector,
    Markdown,
    /// Anything else that may be text.
    Other,
}

impl FileKind {
    /// Detect kind from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Other;
        };
        match ext.to_lowercase().as_str() {
            "py" | "pyw" => FileKind::Python,
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => FileKind::Script,
            "html" | "htm" => FileKind::Markup,
            "css" | "scss" | "less" => FileKind::Stylesheet,
            "json" => FileKind::Data,
            "svg" => FileKind::Vector,
            "md" | "markdown" => FileKind::Markdown,
            _ => FileKind::Other,
        }
    }

    /// Grammar for kinds that are parsed rather than pattern-matched.
    pub fn tree_sitter_language(&self) -> Option<Language> {
        match self {
            FileKind::Python => Some(tree_sitter_python::LANGUAGE.into()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileKind::Python => "Python",
            FileKind::Script => "Script",
            FileKind::Markup => "Markup",
            FileKind::Stylesheet => "Stylesheet",
            FileKind::Data => "Data",
            FileKind::Vector => "Vector",
            FileKind::Markdown => "Markdown",
            FileKind::Other => "Other",
        }
    }

    /// Whether undecodable content should be reported loudly.
    pub fn is_structured(&self) -> bool {
        self.tree_sitter_language().is_some()
    }
}
