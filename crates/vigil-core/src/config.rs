//! Configuration types for Vigil.
//!
//! This module provides the ruleset model loaded from `vigil.yml`:
//! - [`Config`]: the root — concerns plus the shared `defined` block
//! - [`Concern`]: a named governance area holding ordered signals
//! - [`Signal`]: a (watch, report, optional notify) triple
//! - [`WatchConfig`] / [`ReportConfig`]: closed tagged variants
//! - [`OrRef`]: inline value or `use: "#defined/<kind>/<name>"` reference
//!
//! Watch, report, and action kinds are closed tagged unions; the dispatcher
//! matches exhaustively. References are string keys into the `defined`
//! table, resolved shallowly at use time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::VigilError;

// ============================================================================
// Config root
// ============================================================================

/// The configuration root: concern map plus the shared `defined` block.
///
/// Concern order is declaration order and is preserved through parsing;
/// the runner traverses concerns in that order.
///
/// # Example YAML
///
/// ```yaml
/// concerns:
///   dependencies:
///     signals:
///       - watch:
///           type: jq
///           include: "package.json"
///           query: ".dependencies"
///         report:
///           use: "#defined/reports/plain"
/// defined:
///   reports:
///     plain:
///       type: handlebars
///       template: "{{filePath}} changed:\n{{diffText}}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Concerns keyed by id, in declaration order.
    pub concerns: IndexMap<String, Concern>,

    /// Shared definitions referenced via `use:`.
    #[serde(default)]
    pub defined: Defined,
}

impl Config {
    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::InvalidConfig`] if the file cannot be read or
    /// does not match the schema.
    pub fn from_path(path: &Path) -> Result<Self, VigilError> {
        let content = fs::read_to_string(path).map_err(|e| {
            VigilError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content).map_err(|e| {
            VigilError::InvalidConfig(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, VigilError> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve a signal position: inline value or `#defined/signals/<name>`.
    pub fn resolve_signal<'a>(&'a self, r: &'a OrRef<Signal>) -> Result<&'a Signal, VigilError> {
        match r {
            OrRef::Inline(signal) => Ok(signal),
            OrRef::Use(u) => self.lookup(&u.reference, RefKind::Signals, &self.defined.signals),
        }
    }

    /// Resolve a watch position: inline value or `#defined/watches/<name>`.
    pub fn resolve_watch<'a>(
        &'a self,
        r: &'a OrRef<WatchConfig>,
    ) -> Result<&'a WatchConfig, VigilError> {
        match r {
            OrRef::Inline(watch) => Ok(watch),
            OrRef::Use(u) => self.lookup(&u.reference, RefKind::Watches, &self.defined.watches),
        }
    }

    /// Resolve a report position: inline value or `#defined/reports/<name>`.
    pub fn resolve_report<'a>(
        &'a self,
        r: &'a OrRef<ReportConfig>,
    ) -> Result<&'a ReportConfig, VigilError> {
        match r {
            OrRef::Inline(report) => Ok(report),
            OrRef::Use(u) => self.lookup(&u.reference, RefKind::Reports, &self.defined.reports),
        }
    }

    fn lookup<'a, T>(
        &self,
        reference: &str,
        expected: RefKind,
        table: &'a BTreeMap<String, T>,
    ) -> Result<&'a T, VigilError> {
        let (kind, name) = parse_reference(reference)?;
        if kind != expected {
            return Err(VigilError::ReferenceKindMismatch {
                expected: expected.as_str(),
                actual: kind.as_str().to_string(),
            });
        }
        table.get(name).ok_or_else(|| VigilError::ReferenceNotFound {
            kind: expected.as_str(),
            name: name.to_string(),
        })
    }
}

/// Shared definitions keyed by kind then by name.
///
/// An unreferenced entry is valid; resolution is shallow (defined entries
/// do not reference each other).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defined {
    #[serde(default)]
    pub watches: BTreeMap<String, WatchConfig>,
    #[serde(default)]
    pub reports: BTreeMap<String, ReportConfig>,
    #[serde(default)]
    pub signals: BTreeMap<String, Signal>,
}

// ============================================================================
// Concerns and signals
// ============================================================================

/// A named governance area: an ordered sequence of signals plus opaque
/// stakeholder metadata (passed through to notification outputs untouched).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concern {
    pub signals: Vec<OrRef<Signal>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stakeholders: Option<serde_json::Value>,
}

/// A (watch, report) pair with optional notify channels and actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub watch: OrRef<WatchConfig>,
    pub report: OrRef<ReportConfig>,

    /// Opaque notify record, copied verbatim onto produced reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<serde_json::Value>,

    /// Actions executed when the signal fires.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionConfig>,
}

/// Side effects a firing signal may perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionConfig {
    /// Set key/value pairs in the shared per-concern context. Values are
    /// templates rendered with the same variables as the signal's report.
    SetContext {
        entries: BTreeMap<String, String>,
    },
}

// ============================================================================
// References
// ============================================================================

/// Either an inline configuration or a `use:` reference into `defined`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrRef<T> {
    Use(UseRef),
    Inline(T),
}

/// An object with a single `use` field naming a defined entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UseRef {
    #[serde(rename = "use")]
    pub reference: String,
}

/// The three sections of the `defined` block a reference may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Signals,
    Watches,
    Reports,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Signals => "signals",
            RefKind::Watches => "watches",
            RefKind::Reports => "reports",
        }
    }
}

/// Split a `#defined/<kind>/<name>` reference into its parts.
///
/// # Errors
///
/// Returns [`VigilError::InvalidReferenceFormat`] for anything that does
/// not have exactly that shape.
pub fn parse_reference(reference: &str) -> Result<(RefKind, &str), VigilError> {
    let invalid = || VigilError::InvalidReferenceFormat(reference.to_string());

    let rest = reference.strip_prefix("#defined/").ok_or_else(invalid)?;
    let (kind, name) = rest.split_once('/').ok_or_else(invalid)?;
    if name.is_empty() || name.contains('/') {
        return Err(invalid());
    }

    let kind = match kind {
        "signals" => RefKind::Signals,
        "watches" => RefKind::Watches,
        "reports" => RefKind::Reports,
        _ => return Err(invalid()),
    };
    Ok((kind, name))
}

// ============================================================================
// Watches
// ============================================================================

/// One glob or a set of globs, minimatch-style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeGlobs {
    One(String),
    Many(Vec<String>),
}

impl IncludeGlobs {
    /// Compile the include patterns into a matcher.
    ///
    /// `*` does not cross path separators; `**` does — the minimatch
    /// convention the patterns are written against.
    pub fn matcher(&self) -> Result<GlobSet, VigilError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.patterns() {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| VigilError::QueryCompile {
                    kind: "include",
                    what: "glob",
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| VigilError::QueryCompile {
            kind: "include",
            what: "glob",
            message: e.to_string(),
        })
    }

    fn patterns(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            IncludeGlobs::One(p) => std::slice::from_ref(p),
            IncludeGlobs::Many(ps) => ps.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

/// A watch: one extractor kind applied to both sides of a file change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WatchConfig {
    Jq(JqWatch),
    Regex(RegexWatch),
    Xpath(XpathWatch),
    Tsq(TsqWatch),
    AstGrep(AstGrepWatch),
}

impl WatchConfig {
    /// The include globs gating which files the watch runs on.
    pub fn include(&self) -> &IncludeGlobs {
        match self {
            WatchConfig::Jq(w) => &w.include,
            WatchConfig::Regex(w) => &w.include,
            WatchConfig::Xpath(w) => &w.include,
            WatchConfig::Tsq(w) => &w.include,
            WatchConfig::AstGrep(w) => &w.include,
        }
    }

    /// Whether the extractor output is line-structured enough for a
    /// filtered-artifact line range to mean anything. jq output is a
    /// transformation rather than a subset, so it opts out.
    pub fn emits_line_range(&self) -> bool {
        !matches!(self, WatchConfig::Jq(_))
    }
}

/// Run a jq program over each version's content as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JqWatch {
    pub include: IncludeGlobs,
    pub query: String,
}

/// Extract ordered regex matches; named capture groups become context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegexWatch {
    pub include: IncludeGlobs,
    pub pattern: String,

    /// Extra flags on top of the always-on global + multiline:
    /// `i` (case-insensitive), `s` (dot-all), `x` (ignore whitespace).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

/// Evaluate an XPath 1.0 expression against each version as XML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpathWatch {
    pub include: IncludeGlobs,
    pub expression: String,

    /// Namespace prefix → URI bindings for the expression.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, String>,
}

/// Run a tree-sitter query; emit the content captures' source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsqWatch {
    pub include: IncludeGlobs,
    pub query: String,

    /// Capture name whose nodes form the artifact. When absent, the
    /// maximal (non-nested) captures of each match are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,

    /// Language as a file extension (e.g. `.ts`). When absent, derived
    /// from the matched file's extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Match an ast-grep structural pattern; emit matched nodes' source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstGrepWatch {
    pub include: IncludeGlobs,

    /// Language name understood by ast-grep (e.g. `rust`, `typescript`).
    pub language: String,

    pub pattern: AstGrepPattern,
}

/// A code-shaped template, or a contextual pattern that disambiguates via
/// a surrounding snippet and a target node kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AstGrepPattern {
    Template(String),
    Contextual { context: String, selector: String },
}

// ============================================================================
// Reports
// ============================================================================

/// How a detected change is rendered for humans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReportConfig {
    Handlebars(HandlebarsReport),
}

/// A Handlebars template over `filePath`, `diffText`, `left.artifact`,
/// and `right.artifact`. Output is treated as markdown; no HTML escaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlebarsReport {
    pub template: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config::from_yaml(
            r##"
concerns:
  versions:
    stakeholders:
      - team: release
    signals:
      - use: "#defined/signals/version-bump"
      - watch:
          type: regex
          include: ["**/*.toml"]
          pattern: 'version = "(?P<v>[^"]+)"'
        report:
          type: handlebars
          template: "{{filePath}}: {{diffText}}"
defined:
  watches:
    pkg-version:
      type: jq
      include: "package.json"
      query: ".version"
  reports:
    plain:
      type: handlebars
      template: "{{diffText}}"
  signals:
    version-bump:
      watch:
        use: "#defined/watches/pkg-version"
      report:
        use: "#defined/reports/plain"
      notify:
        labels: [release]
"##,
        )
        .expect("sample config should parse")
    }

    #[test]
    fn parses_concern_order_and_defined_block() {
        let config = sample_config();
        assert_eq!(config.concerns.len(), 1);
        let concern = &config.concerns["versions"];
        assert_eq!(concern.signals.len(), 2);
        assert!(config.defined.watches.contains_key("pkg-version"));
    }

    #[test]
    fn resolves_signal_watch_and_report_references() {
        let config = sample_config();
        let concern = &config.concerns["versions"];

        let signal = config.resolve_signal(&concern.signals[0]).unwrap();
        let watch = config.resolve_watch(&signal.watch).unwrap();
        assert!(matches!(watch, WatchConfig::Jq(w) if w.query == ".version"));

        let report = config.resolve_report(&signal.report).unwrap();
        let ReportConfig::Handlebars(h) = report;
        assert_eq!(h.template, "{{diffText}}");
    }

    #[test]
    fn inline_signal_resolves_to_itself() {
        let config = sample_config();
        let concern = &config.concerns["versions"];
        let signal = config.resolve_signal(&concern.signals[1]).unwrap();
        assert!(matches!(
            config.resolve_watch(&signal.watch).unwrap(),
            WatchConfig::Regex(_)
        ));
    }

    #[test]
    fn bad_reference_format() {
        let err = parse_reference("defined/watches/x").unwrap_err();
        assert!(err.to_string().contains("Invalid reference format"));

        let err = parse_reference("#defined/watches").unwrap_err();
        assert!(err.to_string().contains("Invalid reference format"));

        let err = parse_reference("#defined/things/x").unwrap_err();
        assert!(err.to_string().contains("Invalid reference format"));
    }

    #[test]
    fn kind_mismatch_reports_both_kinds() {
        let config = sample_config();
        let r: OrRef<WatchConfig> = OrRef::Use(UseRef {
            reference: "#defined/reports/plain".into(),
        });
        let err = config.resolve_watch(&r).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected a watches reference, got reports"
        );
    }

    #[test]
    fn unresolved_name() {
        let config = sample_config();
        let r: OrRef<WatchConfig> = OrRef::Use(UseRef {
            reference: "#defined/watches/nope".into(),
        });
        let err = config.resolve_watch(&r).unwrap_err();
        assert_eq!(err.to_string(), "watches 'nope' not found");
    }

    #[test]
    fn include_globs_use_minimatch_star_semantics() {
        let one = IncludeGlobs::One("*.json".into());
        let set = one.matcher().unwrap();
        assert!(set.is_match("package.json"));
        assert!(!set.is_match("nested/package.json"));

        let deep = IncludeGlobs::One("**/*.json".into());
        let set = deep.matcher().unwrap();
        assert!(set.is_match("nested/deep/package.json"));
    }

    #[test]
    fn watch_tags_round_trip() {
        let yaml = r#"
type: ast-grep
include: "**/*.rs"
language: rust
pattern:
  context: "fn f() { $BODY }"
  selector: block
"#;
        let watch: WatchConfig = serde_yaml::from_str(yaml).unwrap();
        match watch {
            WatchConfig::AstGrep(w) => {
                assert_eq!(w.language, "rust");
                assert!(matches!(w.pattern, AstGrepPattern::Contextual { .. }));
            }
            other => panic!("expected ast-grep watch, got {:?}", other),
        }
    }
}
