//! Python import extraction via AST traversal.
//!
//! Collects module names from:
//!   import a.b
//!   import a.b as c
//!   from a.b import x
//!   from .a import x
//!   from __future__ import annotations
//! and turns each into a pseudo file path (`a/b.py`).

use tree_sitter::{Node, Parser};

use crate::error::{GraphError, Result};
use crate::parser::FileKind;

/// Parse Python source and return the imported modules as `a/b.py` paths.
///
/// Fails on source with syntax errors; callers treat that as "no references".
pub fn extract_python_imports(source: &str) -> Result<Vec<String>> {
    let language = FileKind::Python
        .tree_sitter_language()
        .ok_or_else(|| GraphError::Parse("no Python grammar".to_string()))?;

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| GraphError::Parse(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| GraphError::Parse("failed to parse source".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(GraphError::Parse("syntax error".to_string()));
    }

    let mut modules = Vec::new();
    collect_imports(&root, source.as_bytes(), &mut modules);
    Ok(modules.into_iter().map(|m| module_to_path(&m)).collect())
}

/// Recursively walk the AST; imports may be nested in functions or blocks.
fn collect_imports(node: &Node, source: &[u8], modules: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            let count = node.child_count();
            for i in 0..count {
                if let Some(child) = node.child(i) {
                    if let Some(name) = imported_name(&child, source) {
                        modules.push(name);
                    }
                }
            }
            return;
        }
        "import_from_statement" => {
            if let Some(module) = node
                .child_by_field_name("module_name")
                .and_then(|m| from_module_name(&m, source))
            {
                modules.push(module);
            }
            return;
        }
        "future_import_statement" => {
            modules.push("__future__".to_string());
            return;
        }
        _ => {}
    }

    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            collect_imports(&child, source, modules);
        }
    }
}

/// `a.b` or the `a.b` of `a.b as c`.
fn imported_name(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => text(node, source),
        "aliased_import" => node
            .child_by_field_name("name")
            .and_then(|n| text(&n, source)),
        _ => None,
    }
}

/// Module of a `from` import. A bare relative import (`from . import x`)
/// names no module and yields nothing.
fn from_module_name(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => text(node, source),
        "relative_import" => {
            let count = node.child_count();
            for i in 0..count {
                if let Some(child) = node.child(i) {
                    if child.kind() == "dotted_name" {
                        return text(&child, source);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

fn text(node: &Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(|s| s.to_string())
}

/// `a.b` → `a/b.py`
pub fn module_to_path(module: &str) -> String {
    format!("{}.py", module.replace('.', "/"))
}
