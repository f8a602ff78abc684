//! Report rendering.
//!
//! A firing signal's [`FilterResult`] is rendered through the signal's
//! report template into a [`ReportOutput`]: the rendered content plus the
//! structured metadata downstream notifiers consume. Templates receive
//! `filePath`, `diffText`, `left.artifact`, and `right.artifact`; output
//! is treated as markdown, so HTML escaping is disabled.

use handlebars::Handlebars;
use serde::Serialize;

use crate::config::ReportConfig;
use crate::errors::VigilError;
use crate::watch::diffing::LineRange;
use crate::watch::{ContextEntry, FilterResult};

/// A rendered report with its structured metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    /// The rendered template output.
    pub content: String,
    pub metadata: ReportMetadata,
    /// The signal's notify record, copied verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<serde_json::Value>,
}

/// Structured metadata accompanying a report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// The changed file's effective path.
    pub file_name: String,
    /// The raw artifact diff.
    pub diff_text: String,
    /// Duplicate of `content` for consumers that prefer a single field.
    pub message: String,
    /// First changed region within the *filtered artifact* — not a
    /// source-file line range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ContextEntry>>,
}

/// Render a report template against a filter result.
///
/// # Errors
///
/// Returns [`VigilError::TemplateRender`] when the template fails to
/// compile or render.
pub fn render(
    report: &ReportConfig,
    filtered: &FilterResult,
    file_path: &str,
) -> Result<String, VigilError> {
    match report {
        ReportConfig::Handlebars(config) => {
            render_template(&config.template, filtered, file_path)
        }
    }
}

/// Render an arbitrary template with the report variables. Also used for
/// `set-context` action values, which share the variable set.
pub fn render_template(
    template: &str,
    filtered: &FilterResult,
    file_path: &str,
) -> Result<String, VigilError> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);

    let data = template_data(filtered, file_path);
    registry
        .render_template(template, &data)
        .map_err(|e| VigilError::TemplateRender(e.to_string()))
}

fn template_data(filtered: &FilterResult, file_path: &str) -> serde_json::Value {
    serde_json::json!({
        "filePath": file_path,
        "diffText": filtered.diff_text,
        "left": { "artifact": filtered.left },
        "right": { "artifact": filtered.right },
    })
}

/// Assemble the full [`ReportOutput`] for a rendered signal.
pub fn build_output(
    content: String,
    filtered: &FilterResult,
    file_path: &str,
    notify: Option<serde_json::Value>,
) -> ReportOutput {
    ReportOutput {
        metadata: ReportMetadata {
            file_name: file_path.to_string(),
            diff_text: filtered.diff_text.clone(),
            message: content.clone(),
            line_range: filtered.line_range,
            context: if filtered.context.is_empty() {
                None
            } else {
                Some(filtered.context.clone())
            },
        },
        content,
        notify,
    }
}
