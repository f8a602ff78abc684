//! Error types for vigil-core.

use thiserror::Error;

/// Domain-specific errors for Vigil operations.
#[derive(Error, Debug)]
pub enum VigilError {
    /// The ruleset file could not be read or parsed.
    #[error("Config invalid: {0}")]
    InvalidConfig(String),

    /// A `use:` reference does not have the `#defined/<kind>/<name>` shape.
    #[error("Invalid reference format: `{0}`")]
    InvalidReferenceFormat(String),

    /// A reference resolved to a different kind than the position requires
    /// (e.g. a `#defined/reports/...` reference in a watch slot).
    #[error("Expected a {expected} reference, got {actual}")]
    ReferenceKindMismatch {
        /// The kind required by the referencing position.
        expected: &'static str,
        /// The kind named in the reference.
        actual: String,
    },

    /// A reference names an entry that does not exist in the `defined` block.
    #[error("{kind} '{name}' not found")]
    ReferenceNotFound {
        /// The defined-block section that was searched.
        kind: &'static str,
        /// The missing entry name.
        name: String,
    },

    /// A tsq watch could not determine a language because neither the watch
    /// config nor the file path carries an extension.
    #[error("tsq watch requires a file extension to resolve a language")]
    MissingFileExtension,

    /// The extension does not map to a bundled grammar, or an ast-grep
    /// language string is unknown.
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),

    /// A user-supplied query or pattern failed to compile.
    ///
    /// This covers jq programs, regex patterns and flags, tree-sitter
    /// queries, XPath expressions, ast-grep patterns, and include globs.
    /// Compile failures are configuration defects and surface per signal;
    /// they are never collapsed into empty extraction.
    #[error("failed to compile {kind} {what}: {message}")]
    QueryCompile {
        /// The watch kind the query belongs to.
        kind: &'static str,
        /// What was being compiled ("query", "pattern", "expression", "glob").
        what: &'static str,
        /// The underlying compiler message.
        message: String,
    },

    /// A report template failed to compile or render.
    #[error("failed to render report template: {0}")]
    TemplateRender(String),

    /// A content provider failed with something other than absence.
    #[error("content provider error: {0}")]
    Provider(String),

    /// An error attributed to a specific (concern, signal) pair.
    ///
    /// Wraps resolution and compilation failures so the offending signal is
    /// always identifiable from the message alone.
    #[error("concern `{concern}`, signal #{signal}: {source}")]
    Signal {
        /// The concern id the signal belongs to.
        concern: String,
        /// Zero-based index of the signal within the concern.
        signal: usize,
        /// The underlying failure.
        #[source]
        source: Box<VigilError>,
    },

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VigilError {
    /// Attribute this error to a (concern, signal) pair.
    pub fn for_signal(self, concern: &str, signal: usize) -> Self {
        VigilError::Signal {
            concern: concern.to_string(),
            signal,
            source: Box::new(self),
        }
    }
}
