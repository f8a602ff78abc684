//! Regex extraction.
//!
//! The artifact is the ordered sequence of match strings joined by newline,
//! so identical match sequences across versions yield absence even when
//! unrelated text moved around. Named capture groups become context
//! entries.
//!
//! Matching is non-overlapping, left to right. Zero-length matches are
//! skipped (the scan still advances past them), so patterns like `a*`
//! contribute nothing on text without `a`s.

use regex::{Regex, RegexBuilder};

use crate::config::RegexWatch;
use crate::errors::VigilError;
use crate::watch::{ContextEntry, Extraction};

pub fn extract(watch: &RegexWatch, content: &str) -> Result<Extraction, VigilError> {
    let re = build(&watch.pattern, watch.flags.as_deref())?;

    let names: Vec<&str> = re.capture_names().flatten().collect();
    let mut matches = Vec::new();
    let mut context = Vec::new();

    if names.is_empty() {
        for m in re.find_iter(content) {
            if m.as_str().is_empty() {
                continue;
            }
            matches.push(m.as_str().to_string());
        }
    } else {
        for caps in re.captures_iter(content) {
            let whole = match caps.get(0) {
                Some(m) if !m.as_str().is_empty() => m,
                _ => continue,
            };
            matches.push(whole.as_str().to_string());

            let mut entry = ContextEntry::new();
            for name in &names {
                if let Some(group) = caps.name(name) {
                    entry.insert((*name).to_string(), group.as_str().to_string());
                }
            }
            if !entry.is_empty() {
                context.push(entry);
            }
        }
    }

    Ok(Extraction {
        text: matches.join("\n"),
        context,
    })
}

/// Compile the pattern with the effective flags: global and multiline are
/// always on; user flags add `i`, `s`, `x`. `m`, `g`, and `u` are accepted
/// no-ops. An unknown flag is a configuration defect.
fn build(pattern: &str, flags: Option<&str>) -> Result<Regex, VigilError> {
    let mut builder = RegexBuilder::new(pattern);
    builder.multi_line(true);

    for flag in flags.unwrap_or("").chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'm' | 'g' | 'u' => {}
            other => {
                return Err(VigilError::QueryCompile {
                    kind: "regex",
                    what: "pattern",
                    message: format!("unsupported flag `{other}`"),
                });
            }
        }
    }

    builder.build().map_err(|e| VigilError::QueryCompile {
        kind: "regex",
        what: "pattern",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IncludeGlobs;

    fn watch(pattern: &str, flags: Option<&str>) -> RegexWatch {
        RegexWatch {
            include: IncludeGlobs::One("**/*".into()),
            pattern: pattern.into(),
            flags: flags.map(String::from),
        }
    }

    #[test]
    fn matches_join_by_newline_in_order() {
        let out = extract(&watch(r"\bfoo\w*", None), "foo foobar baz foot").unwrap();
        assert_eq!(out.text, "foo\nfoobar\nfoot");
    }

    #[test]
    fn case_insensitive_flag() {
        let out = extract(&watch("foo", Some("i")), "FOO").unwrap();
        assert_eq!(out.text, "FOO");
    }

    #[test]
    fn multiline_is_always_on() {
        let out = extract(&watch(r"^b$", None), "a\nb\nc").unwrap();
        assert_eq!(out.text, "b");
    }

    #[test]
    fn named_captures_become_context() {
        let out = extract(
            &watch(r#"version = "(?P<v>[^"]+)""#, None),
            r#"version = "1.2.3""#,
        )
        .unwrap();
        assert_eq!(out.context.len(), 1);
        assert_eq!(out.context[0].get("v").map(String::as_str), Some("1.2.3"));
    }

    #[test]
    fn zero_length_matches_are_skipped() {
        let out = extract(&watch("a*", None), "bbb").unwrap();
        assert_eq!(out.text, "");
        assert!(out.context.is_empty());
    }

    #[test]
    fn unknown_flag_is_a_config_error() {
        let err = extract(&watch("foo", Some("q")), "foo").unwrap_err();
        assert!(matches!(err, VigilError::QueryCompile { kind: "regex", .. }));
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        let err = extract(&watch("(unclosed", None), "x").unwrap_err();
        assert!(matches!(err, VigilError::QueryCompile { kind: "regex", .. }));
    }
}
