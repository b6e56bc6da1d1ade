//! Pattern-based reference extraction for formats without import syntax.
//!
//! Each function scans text for attribute values, CSS urls, or relative path
//! literals. Results keep document order and may contain duplicates.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("reference pattern must compile")
}

static MARKUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)<link[^>]*href=["']([^"']+)["']"#,
        r#"(?i)<script[^>]*src=["']([^"']+)["']"#,
        r#"(?i)<img[^>]*src=["']([^"']+)["']"#,
        r#"(?i)<source[^>]*src=["']([^"']+)["']"#,
        r#"(?i)<iframe[^>]*src=["']([^"']+)["']"#,
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static STYLESHEET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"@import\s+["']([^"']+)["']"#,
        r#"url\(["']?([^"']+)["']?\)"#,
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static DATA_PATTERN: Lazy<Regex> = Lazy::new(|| compile(r#"["']((?:\./|\.\./)[^"']+)["']"#));

static VECTOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r#"(?i)<image[^>]*href=["']([^"']+)["']"#));

static MARKDOWN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)!\[.*?\]\(([^)]+)\)"#,
        r#"(?i)<img[^>]*src=["']([^"']+)["']"#,
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static GENERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r#"((?:\.\./|\./)[^\s"'`()<>\[\]{},;]+)"#));

/// Absolute URLs, protocol-relative URLs and inline data never name a project file.
pub fn is_external(reference: &str) -> bool {
    reference.starts_with("http") || reference.starts_with("//") || reference.starts_with("data:")
}

/// First capture group of every match of every pattern, externals removed.
fn captures(patterns: &[Regex], content: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for pattern in patterns {
        for cap in pattern.captures_iter(content) {
            if let Some(m) = cap.get(1) {
                let value = m.as_str();
                if !is_external(value) {
                    refs.push(value.to_string());
                }
            }
        }
    }
    refs
}

/// `<link href>`, `<script src>`, `<img src>`, `<source src>`, `<iframe src>`.
pub fn extract_markup(content: &str) -> Vec<String> {
    captures(&MARKUP_PATTERNS, content)
}

/// `@import "…"` and `url(…)`.
pub fn extract_stylesheet(content: &str) -> Vec<String> {
    captures(&STYLESHEET_PATTERNS, content)
}

/// Quoted strings starting with `./` or `../`.
pub fn extract_data(content: &str) -> Vec<String> {
    captures(std::slice::from_ref(&*DATA_PATTERN), content)
}

/// `<image href>` inside SVG.
pub fn extract_vector(content: &str) -> Vec<String> {
    captures(std::slice::from_ref(&*VECTOR_PATTERN), content)
}

/// `![alt](path)` and inline `<img src>`.
pub fn extract_markdown(content: &str) -> Vec<String> {
    captures(&MARKDOWN_PATTERNS, content)
}

/// Any `./…` or `../…` run of path characters.
pub fn extract_generic(content: &str) -> Vec<String> {
    captures(std::slice::from_ref(&*GENERIC_PATTERN), content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup() {
        let html = r#"
<link rel="stylesheet" href="./css/site.css">
<SCRIPT type="module" src='app.js'></SCRIPT>
<img alt="logo" src="https://cdn.example.com/logo.png">
<img src="data:image/png;base64,AAAA">
<iframe src="//player.example.com/embed"></iframe>
<source src="../media/clip.mp4">
"#;
        assert_eq!(
            extract_markup(html),
            vec!["./css/site.css", "app.js", "../media/clip.mp4"]
        );
    }

    #[test]
    fn test_stylesheet() {
        let css = r#"
@import "reset.css";
@import url("http://fonts.example.com/font.css");
body { background: url(../img/bg.png); }
.icon { background-image: url('icons/star.svg'); }
"#;
        let refs = extract_stylesheet(css);
        assert_eq!(refs, vec!["reset.css", "../img/bg.png", "icons/star.svg"]);
    }

    #[test]
    fn test_data_only_relative_strings() {
        let json = r#"{"main": "./lib/index.js", "types": "../types/index.d.ts", "name": "pkg"}"#;
        assert_eq!(extract_data(json), vec!["./lib/index.js", "../types/index.d.ts"]);
    }

    #[test]
    fn test_vector() {
        let svg = r#"<svg><image href="./photo.jpg" /><image xlink:href="http://x/y.png"/></svg>"#;
        assert_eq!(extract_vector(svg), vec!["./photo.jpg"]);
    }

    #[test]
    fn test_markdown() {
        let md = "![diagram](docs/arch.png)\n![remote](https://x.io/a.png)\n<img src=\"./shot.jpg\">";
        assert_eq!(extract_markdown(md), vec!["docs/arch.png", "./shot.jpg"]);
    }

    #[test]
    fn test_generic() {
        let text = "#include \"./util.h\"\nsee ../docs/readme.txt, and (./notes)";
        assert_eq!(
            extract_generic(text),
            vec!["./util.h", "../docs/readme.txt", "./notes"]
        );
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("http://example.com"));
        assert!(is_external("//cdn.example.com/x.js"));
        assert!(is_external("data:text/plain,hi"));
        assert!(!is_external("./local.js"));
    }
}
