//! Tree-sitter query extraction.
//!
//! The artifact is the source text of each match's *content captures*:
//! either the captures named by the configured `capture`, or the maximal
//! captures — those not spatially contained by any other capture of the
//! same match, which filters nested captures so content is not emitted
//! twice. Content nodes are deduplicated by node identity and joined by a
//! blank line. Remaining captures of each match form a context entry.

use std::collections::HashSet;
use std::path::Path;

use tree_sitter::{Node, Parser, QueryCursor};

use crate::config::TsqWatch;
use crate::errors::VigilError;
use crate::watch::languages::LanguageId;
use crate::watch::{ContextEntry, Extraction, QueryCache};

pub fn extract(
    cache: &QueryCache,
    watch: &TsqWatch,
    content: &str,
    file_path: Option<&str>,
) -> Result<Extraction, VigilError> {
    let language = resolve_language(watch.language.as_deref(), file_path)?;
    let query = cache.compiled(language, &watch.query)?;

    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| VigilError::QueryCompile {
            kind: "tsq",
            what: "query",
            message: format!("grammar version mismatch for {}: {e}", language.name()),
        })?;

    let Some(tree) = parser.parse(content, None) else {
        tracing::debug!("tsq watch: {} parser returned no tree", language.name());
        return Ok(Extraction::default());
    };

    let bytes = content.as_bytes();
    let capture_names = query.capture_names();

    let mut cursor = QueryCursor::new();
    let mut seen_nodes: HashSet<usize> = HashSet::new();
    let mut snippets: Vec<String> = Vec::new();
    let mut context: Vec<ContextEntry> = Vec::new();

    for m in cursor.matches(&query, tree.root_node(), bytes) {
        let captures = m.captures;

        // Which captures carry the content for this match.
        let is_content: Vec<bool> = match &watch.capture {
            Some(wanted) => captures
                .iter()
                .map(|c| capture_names[c.index as usize] == wanted.as_str())
                .collect(),
            None => captures
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    !captures
                        .iter()
                        .enumerate()
                        .any(|(j, other)| j != i && strictly_contains(&other.node, &c.node))
                })
                .collect(),
        };

        let mut entry = ContextEntry::new();
        for (capture, content_capture) in captures.iter().zip(&is_content) {
            let text = capture.node.utf8_text(bytes).unwrap_or("");
            if *content_capture {
                if seen_nodes.insert(capture.node.id()) {
                    snippets.push(text.to_string());
                }
            } else if !text.is_empty() {
                entry.insert(
                    capture_names[capture.index as usize].to_string(),
                    text.to_string(),
                );
            }
        }
        if !entry.is_empty() {
            context.push(entry);
        }
    }

    Ok(Extraction {
        text: snippets.join("\n\n"),
        context,
    })
}

/// Language from the watch config (an extension like `.ts`), else from the
/// file path's extension.
fn resolve_language(
    configured: Option<&str>,
    file_path: Option<&str>,
) -> Result<LanguageId, VigilError> {
    if let Some(ext) = configured {
        return LanguageId::from_extension(ext);
    }
    let ext = file_path
        .and_then(|p| Path::new(p).extension())
        .and_then(|e| e.to_str())
        .ok_or(VigilError::MissingFileExtension)?;
    LanguageId::from_extension(ext)
}

/// `outer` spatially contains `inner` and their ranges are not identical.
fn strictly_contains(outer: &Node<'_>, inner: &Node<'_>) -> bool {
    let same = outer.start_byte() == inner.start_byte() && outer.end_byte() == inner.end_byte();
    !same && outer.start_byte() <= inner.start_byte() && outer.end_byte() >= inner.end_byte()
}
