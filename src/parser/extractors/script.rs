//! JavaScript/TypeScript import extraction.
//!
//! Matches static imports, side-effect imports, `require(...)` and dynamic
//! `import(...)`. Only relative targets are kept; an extensionless target
//! gets `.js` appended, the way bundlers resolve it by default.

use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::is_external;

static IMPORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"import\s+.*?\s+from\s+['"]([^'"]+)['"]"#,
        r#"import\s+['"]([^'"]+)['"]"#,
        r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("import pattern must compile"))
    .collect()
});

/// Extension assumed for extensionless relative imports.
pub const DEFAULT_SCRIPT_EXTENSION: &str = ".js";

pub fn extract_script_imports(content: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for pattern in IMPORT_PATTERNS.iter() {
        for cap in pattern.captures_iter(content) {
            let Some(target) = cap.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if is_external(target) || !is_relative(target) {
                continue;
            }
            refs.push(with_default_extension(target));
        }
    }
    refs
}

fn is_relative(target: &str) -> bool {
    target.starts_with("./") || target.starts_with("../")
}

fn with_default_extension(target: &str) -> String {
    let base = target.rsplit('/').next().unwrap_or(target);
    if base.contains('.') {
        target.to_string()
    } else {
        format!("{}{}", target, DEFAULT_SCRIPT_EXTENSION)
    }
}
