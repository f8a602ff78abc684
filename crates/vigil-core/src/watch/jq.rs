//! jq extraction (in-process via jaq).
//!
//! Each version's content is parsed as JSON and run through the configured
//! jq program; every output value is rendered with jq conventions (strings
//! quoted) and values are joined by newline. Invalid JSON input collapses
//! to empty extraction; a program that does not compile is a configuration
//! defect and surfaces as an error.

use jaq_interpret::{Ctx, FilterT, ParseCtx, RcIter, Val};

use crate::config::JqWatch;
use crate::errors::VigilError;
use crate::watch::Extraction;

pub fn extract(watch: &JqWatch, content: &str) -> Result<Extraction, VigilError> {
    if content.trim().is_empty() {
        return Ok(Extraction::default());
    }

    let filter = compile(&watch.query)?;

    let input: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("jq watch: input is not valid JSON: {e}");
            return Ok(Extraction::default());
        }
    };

    let inputs = RcIter::new(core::iter::empty());
    let mut outputs = Vec::new();
    for result in filter.run((Ctx::new([], &inputs), Val::from(input))) {
        match result {
            Ok(value) => outputs.push(value.to_string()),
            Err(e) => {
                tracing::debug!("jq watch: runtime error: {e}");
                return Ok(Extraction::default());
            }
        }
    }

    Ok(Extraction {
        text: outputs.join("\n"),
        context: Vec::new(),
    })
}

/// Compile a jq program against the jaq core + std definitions.
fn compile(query: &str) -> Result<jaq_interpret::Filter, VigilError> {
    let compile_error = |message: String| VigilError::QueryCompile {
        kind: "jq",
        what: "query",
        message,
    };

    let mut defs = ParseCtx::new(Vec::new());
    defs.insert_natives(jaq_core::core());
    defs.insert_defs(jaq_std::std());

    let (main, parse_errors) = jaq_parse::parse(query, jaq_parse::main());
    if !parse_errors.is_empty() {
        let message = parse_errors
            .iter()
            .map(|e| format!("{e:?}"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(compile_error(message));
    }
    let main = main.ok_or_else(|| compile_error("empty jq program".to_string()))?;

    let filter = defs.compile(main);
    if !defs.errs.is_empty() {
        return Err(compile_error(format!(
            "{} undefined name(s) in program",
            defs.errs.len()
        )));
    }
    Ok(filter)
}
