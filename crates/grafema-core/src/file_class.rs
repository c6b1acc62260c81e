//! File classification, used to create a `MODULE` node per file even when
//! no semantic constructs are walked (§8 Boundary behaviors), and to pick
//! the right walker for a path.

use std::path::Path;

/// Languages this workspace can classify a file as. Only `JavaScript`
/// and `TypeScript` are semantically walked (§4.3); everything else
/// still gets a `MODULE` node during INDEXING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Java,
    C,
    Cpp,
    Yaml,
    Toml,
    Json,
    Markdown,
    Other,
}

impl Language {
    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("rs") => Language::Rust,
            Some("ts") | Some("tsx") => Language::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Language::JavaScript,
            Some("py") | Some("pyi") => Language::Python,
            Some("go") => Language::Go,
            Some("java") => Language::Java,
            Some("c") | Some("h") => Language::C,
            Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hh") => Language::Cpp,
            Some("yml") | Some("yaml") => Language::Yaml,
            Some("toml") => Language::Toml,
            Some("json") | Some("jsonc") => Language::Json,
            Some("md") | Some("mdx") => Language::Markdown,
            _ => Language::Other,
        }
    }

    /// Whether this language is walked for semantic constructs by
    /// `grafema-analysis::walker` (§4.3).
    pub fn is_semantically_walked(&self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(Language::from_path(&PathBuf::from("a.ts")), Language::TypeScript);
        assert_eq!(Language::from_path(&PathBuf::from("a.js")), Language::JavaScript);
        assert_eq!(Language::from_path(&PathBuf::from("a.rs")), Language::Rust);
        assert_eq!(Language::from_path(&PathBuf::from("a.xyz")), Language::Other);
    }

    #[test]
    fn only_js_ts_are_semantically_walked() {
        assert!(Language::JavaScript.is_semantically_walked());
        assert!(Language::TypeScript.is_semantically_walked());
        assert!(!Language::Rust.is_semantically_walked());
    }
}
