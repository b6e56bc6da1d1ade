//! Per-dialect reference extractors.
//!
//! Python is parsed with tree-sitter; every other dialect is pattern-matched.

pub mod patterns;
pub mod python;
pub mod script;

pub use patterns::{
    extract_data, extract_generic, extract_markdown, extract_markup, extract_stylesheet,
    extract_vector, is_external,
};
pub use python::extract_python_imports;
pub use script::extract_script_imports;
