//! Reference extraction: which other files does a file's text name?
//!
//! Extraction is best-effort. Unreadable, undecodable or unparsable content
//! produces an empty list and a log line, never an error.

pub mod extractors;
pub mod language;

pub use language::FileKind;

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use extractors::*;

/// Raw reference strings found in `content`, using the dialect for `path`.
pub fn extract_references(path: &Path, content: &str) -> Vec<String> {
    match FileKind::from_path(path) {
        FileKind::Python => match extract_python_imports(content) {
            Ok(refs) => refs,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to parse Python imports");
                Vec::new()
            }
        },
        FileKind::Script => extract_script_imports(content),
        FileKind::Markup => extract_markup(content),
        FileKind::Stylesheet => extract_stylesheet(content),
        FileKind::Data => extract_data(content),
        FileKind::Vector => extract_vector(content),
        FileKind::Markdown => extract_markdown(content),
        FileKind::Other => extract_generic(content),
    }
}

/// Read `path` and extract its references.
pub fn read_references(path: &Path) -> Vec<String> {
    match read_text(path) {
        Some(content) => extract_references(path, &content),
        None => Vec::new(),
    }
}

/// Full UTF-8 text of a file, or `None` if it cannot be read or decoded.
///
/// Failures are logged at `warn` for parsed dialects and at `debug` otherwise,
/// since binary files routinely land in the generic path.
pub fn read_text(path: &Path) -> Option<String> {
    let loud = FileKind::from_path(path).is_structured();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            if loud {
                warn!(file = %path.display(), error = %e, "failed to read file");
            } else {
                debug!(file = %path.display(), error = %e, "failed to read file");
            }
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            if loud {
                warn!(file = %path.display(), error = %e, "file is not valid UTF-8");
            } else {
                debug!(file = %path.display(), "skipping non-text content");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_dispatch_by_kind() {
        let js = extract_references(Path::new("a.js"), "import x from './x';");
        assert_eq!(js, vec!["./x.js"]);

        let py = extract_references(Path::new("a.py"), "import pkg.mod\n");
        assert_eq!(py, vec!["pkg/mod.py"]);

        let json = extract_references(Path::new("a.json"), r#"{"k": "./b.json"}"#);
        assert_eq!(json, vec!["./b.json"]);

        let c = extract_references(Path::new("a.c"), "#include \"./b.h\"");
        assert_eq!(c, vec!["./b.h"]);
    }

    #[test]
    fn test_python_parse_failure_is_empty() {
        let refs = extract_references(Path::new("bad.py"), "class (:\n");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_read_references_tolerates_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]).unwrap();
        assert!(read_references(&path).is_empty());
    }

    #[test]
    fn test_read_references_missing_file() {
        assert!(read_references(&PathBuf::from("/definitely/not/here.js")).is_empty());
    }

    #[test]
    fn test_read_references_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "from app import models\n").unwrap();
        assert_eq!(read_references(&path), vec!["app.py"]);
    }
}
