//! ast-grep structural pattern extraction.
//!
//! Patterns are code-shaped templates with metavariables (`$NAME`,
//! `$$$REST`), or a `{context, selector}` pair where `context` is a
//! surrounding snippet and `selector` the AST node kind to extract from
//! within it. The artifact is the matched nodes' source text, blank-line
//! separated; metavariable bindings form context entries.

use ast_grep_core::meta_var::MetaVariable;
use ast_grep_core::{Language as _, Pattern};
use ast_grep_language::SupportLang;

use crate::config::{AstGrepPattern, AstGrepWatch};
use crate::errors::VigilError;
use crate::watch::{ContextEntry, Extraction};

pub fn extract(watch: &AstGrepWatch, content: &str) -> Result<Extraction, VigilError> {
    let lang: SupportLang = watch
        .language
        .parse()
        .map_err(|_| VigilError::UnsupportedLanguage(watch.language.clone()))?;

    let pattern = match &watch.pattern {
        AstGrepPattern::Template(template) => Pattern::try_new(template, lang),
        AstGrepPattern::Contextual { context, selector } => {
            Pattern::contextual(context, selector, lang)
        }
    }
    .map_err(|e| VigilError::QueryCompile {
        kind: "ast-grep",
        what: "pattern",
        message: e.to_string(),
    })?;

    let root = lang.ast_grep(content);
    let mut snippets = Vec::new();
    let mut context = Vec::new();

    for m in root.root().find_all(pattern) {
        snippets.push(m.text().to_string());

        let env = m.get_env();
        let mut entry = ContextEntry::new();
        for var in env.get_matched_variables() {
            match var {
                MetaVariable::Capture(name, _) => {
                    if let Some(node) = env.get_match(&name) {
                        entry.insert(name, node.text().to_string());
                    }
                }
                MetaVariable::MultiCapture(name) => {
                    let texts: Vec<String> = env
                        .get_multiple_matches(&name)
                        .iter()
                        .map(|n| n.text().to_string())
                        .collect();
                    if !texts.is_empty() {
                        entry.insert(name, texts.join(" "));
                    }
                }
                _ => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IncludeGlobs;

    fn watch(language: &str, pattern: AstGrepPattern) -> AstGrepWatch {
        AstGrepWatch {
            include: IncludeGlobs::One("**/*".into()),
            language: language.into(),
            pattern,
        }
    }

    #[test]
    fn template_pattern_extracts_matches() {
        let w = watch(
            "javascript",
            AstGrepPattern::Template("console.log($MSG)".into()),
        );
        let src = "console.log(\"a\");\nconsole.warn(\"b\");\nconsole.log(err);";
        let out = extract(&w, src).unwrap();
        assert_eq!(out.text, "console.log(\"a\")\n\nconsole.log(err)");
    }

    #[test]
    fn metavariable_bindings_become_context() {
        let w = watch(
            "javascript",
            AstGrepPattern::Template("console.log($MSG)".into()),
        );
        let out = extract(&w, "console.log(err)").unwrap();
        assert_eq!(out.context.len(), 1);
        assert_eq!(out.context[0].get("MSG").map(String::as_str), Some("err"));
    }

    #[test]
    fn multi_capture_joins_with_space() {
        let w = watch(
            "javascript",
            AstGrepPattern::Template("f($$$ARGS)".into()),
        );
        let out = extract(&w, "f(1, 2, 3)").unwrap();
        assert_eq!(out.context.len(), 1);
        let args = out.context[0].get("ARGS").map(String::as_str);
        assert_eq!(args, Some("1 2 3"));
    }

    #[test]
    fn no_matches_yield_empty_artifact() {
        let w = watch(
            "rust",
            AstGrepPattern::Template("unsafe { $$$BODY }".into()),
        );
        let out = extract(&w, "fn safe() { let x = 1; }").unwrap();
        assert_eq!(out.text, "");
    }

    #[test]
    fn unknown_language_is_a_contract_error() {
        let w = watch("klingon", AstGrepPattern::Template("x".into()));
        let err = extract(&w, "x").unwrap_err();
        assert!(err.to_string().contains("unsupported language"));
    }
}
