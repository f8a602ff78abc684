//! The watch engine.
//!
//! Five extractor kinds unified behind one contract: run the kind-specific
//! extractor against both sides of a file change, compare the textual
//! artifacts, and — when they differ — package the difference as a
//! [`FilterResult`] with a unified diff, an optional line range, and merged
//! symbolic context.
//!
//! Failure policy at this boundary: failures to parse the *file content*
//! (invalid JSON/XML, broken source) collapse to empty extraction, so a
//! file broken the same way on both sides stays silent. Failures to
//! compile user-supplied queries and patterns are configuration defects
//! and propagate; the runner attributes them to the offending signal.

pub mod astgrep;
pub mod diffing;
pub mod jq;
pub mod languages;
pub mod regex;
pub mod tsq;
pub mod xpath;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tree_sitter::Query;

use crate::config::WatchConfig;
use crate::errors::VigilError;
use crate::provider::FileVersions;
use crate::watch::diffing::LineRange;
use crate::watch::languages::LanguageId;

/// One symbolic-context record: named capture values, enclosing node
/// texts, metavariable bindings.
pub type ContextEntry = BTreeMap<String, String>;

/// A kind-specific extractor's output for one side.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub text: String,
    pub context: Vec<ContextEntry>,
}

/// The non-empty result of a watch: the two artifacts differ.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    /// Unified diff of the two artifacts, three lines of context.
    pub diff_text: String,
    /// The old side's artifact.
    pub left: String,
    /// The new side's artifact.
    pub right: String,
    /// First changed region on the new side of the artifact diff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    /// Merged left/right context, deduplicated, order preserved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ContextEntry>,
}

/// Compiled tree-sitter queries, keyed by `(language, query)`.
///
/// Shared across the whole run; compilation happens once per distinct
/// query and the compiled form is read concurrently.
pub struct QueryCache {
    queries: Mutex<HashMap<(LanguageId, String), Arc<Query>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            queries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch or compile the query for `language`.
    pub(crate) fn compiled(
        &self,
        language: LanguageId,
        source: &str,
    ) -> Result<Arc<Query>, VigilError> {
        let mut cache = self.queries.lock().expect("query cache poisoned");
        if let Some(query) = cache.get(&(language, source.to_string())) {
            return Ok(Arc::clone(query));
        }
        let query =
            Query::new(&language.grammar(), source).map_err(|e| VigilError::QueryCompile {
                kind: "tsq",
                what: "query",
                message: e.to_string(),
            })?;
        let query = Arc::new(query);
        cache.insert((language, source.to_string()), Arc::clone(&query));
        Ok(query)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a watch to a file-version pair.
///
/// Returns `Ok(None)` (absence) when both sides are absent or the two
/// extractions are identical. A returned [`FilterResult`] always has
/// `left != right`.
///
/// # Errors
///
/// Configuration-level contract violations: missing/unsupported language,
/// uncompilable query or pattern.
pub fn apply(
    cache: &QueryCache,
    watch: &WatchConfig,
    versions: &FileVersions,
    file_path: Option<&str>,
) -> Result<Option<FilterResult>, VigilError> {
    if versions.is_empty() {
        return Ok(None);
    }

    let left = extract_side(cache, watch, versions.old.as_deref(), file_path)?;
    let right = extract_side(cache, watch, versions.new.as_deref(), file_path)?;

    if left.text == right.text {
        return Ok(None);
    }

    let diff_text = diffing::unified_artifact_diff(&left.text, &right.text);
    let line_range = if watch.emits_line_range() {
        diffing::first_hunk_range(&diff_text)
    } else {
        None
    };
    let context = merge_contexts(left.context, right.context);

    Ok(Some(FilterResult {
        diff_text,
        left: left.text,
        right: right.text,
        line_range,
        context,
    }))
}

/// Run the kind-specific extractor on one side. Absent content extracts to
/// empty text with empty context.
fn extract_side(
    cache: &QueryCache,
    watch: &WatchConfig,
    content: Option<&str>,
    file_path: Option<&str>,
) -> Result<Extraction, VigilError> {
    let Some(content) = content else {
        return Ok(Extraction::default());
    };
    match watch {
        WatchConfig::Jq(w) => jq::extract(w, content),
        WatchConfig::Regex(w) => regex::extract(w, content),
        WatchConfig::Xpath(w) => xpath::extract(w, content),
        WatchConfig::Tsq(w) => tsq::extract(cache, w, content, file_path),
        WatchConfig::AstGrep(w) => astgrep::extract(w, content),
    }
}

/// Merge left and right context sequences with set semantics, preserving
/// first-occurrence order.
fn merge_contexts(left: Vec<ContextEntry>, right: Vec<ContextEntry>) -> Vec<ContextEntry> {
    let mut merged: Vec<ContextEntry> = Vec::with_capacity(left.len() + right.len());
    for entry in left.into_iter().chain(right) {
        if !merged.contains(&entry) {
            merged.push(entry);
        }
    }
    merged
}
