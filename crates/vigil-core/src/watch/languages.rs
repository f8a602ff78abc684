//! Tree-sitter grammar registry.
//!
//! Maps file extensions to the bundled grammars. Grammars are statically
//! linked; the enum is the registry, and compiled queries are cached per
//! `(language, query)` by the watch engine.

use tree_sitter::Language;

use crate::errors::VigilError;

/// A language with a bundled tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Javascript,
    Typescript,
    Tsx,
    Python,
    Go,
    Java,
    Rust,
    C,
    Cpp,
    Json,
}

impl LanguageId {
    /// Resolve a language from a file extension (with or without the dot).
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::UnsupportedLanguage`] for extensions without a
    /// bundled grammar.
    pub fn from_extension(ext: &str) -> Result<Self, VigilError> {
        match ext.trim_start_matches('.') {
            "js" | "jsx" | "mjs" => Ok(Self::Javascript),
            "ts" => Ok(Self::Typescript),
            "tsx" => Ok(Self::Tsx),
            "py" => Ok(Self::Python),
            "go" => Ok(Self::Go),
            "java" => Ok(Self::Java),
            "rs" => Ok(Self::Rust),
            "c" | "h" => Ok(Self::C),
            "cpp" | "cxx" | "hpp" => Ok(Self::Cpp),
            "json" => Ok(Self::Json),
            other => Err(VigilError::UnsupportedLanguage(other.to_string())),
        }
    }

    /// Short name used in logs and cache keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Tsx => "tsx",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::Rust => "rust",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Json => "json",
        }
    }

    /// The grammar for this language.
    pub fn grammar(&self) -> Language {
        match self {
            Self::Javascript => tree_sitter_javascript::language(),
            Self::Typescript => tree_sitter_typescript::language_typescript(),
            Self::Tsx => tree_sitter_typescript::language_tsx(),
            Self::Python => tree_sitter_python::language(),
            Self::Go => tree_sitter_go::language(),
            Self::Java => tree_sitter_java::language(),
            Self::Rust => tree_sitter_rust::language(),
            Self::C => tree_sitter_c::language(),
            Self::Cpp => tree_sitter_cpp::language(),
            Self::Json => tree_sitter_json::language(),
        }
    }
}
