//! # vigil-core
//!
//! **Vigil** – deterministic code-change governance engine.
//!
//! Given a pair of source-tree snapshots, a unified diff between them, and
//! a declarative ruleset, vigil answers one question per governed concern:
//! *what changed that someone should know about?* It produces an ordered
//! list of rendered reports plus structured metadata for downstream
//! notification.
//!
//! ## Main Types
//!
//! - [`Engine`] – the entry point: owns the ruleset and run-scoped caches
//! - [`Config`] – the concern/signal/watch/report model
//! - [`ContentProvider`] – byte retrieval per `(revision, path)`
//! - [`RunOutput`] – reports, per-concern context, recorded failures
//! - [`VigilError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`config`] – ruleset model and `#defined/...` reference resolution
//! - [`diff`] – unified diff parsing
//! - [`watch`] – the five extractors and the shared filtered-diff pipeline
//! - [`runner`] – (file × concern × signal) traversal
//! - [`report`] – template rendering and metadata assembly
//! - [`provider`] – the content-provider contract
//!
//! ## Example
//!
//! ```ignore
//! use vigil_core::{Config, Engine, MapProvider, ProcessContext, Refs};
//!
//! let engine = Engine::new(Config::from_yaml(ruleset_yaml)?);
//! let mut provider = MapProvider::new();
//! provider.insert("base", "package.json", r#"{"version":"1.0.0"}"#);
//! provider.insert("head", "package.json", r#"{"version":"2.0.0"}"#);
//!
//! let ctx = ProcessContext { provider: &provider, refs: Refs::new("base", "head") };
//! let output = engine.run(&diff_text, &ctx)?;
//! ```

// Modules
pub mod config;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod provider;
pub mod report;
pub mod runner;
pub mod watch;

// Re-exports for convenience
pub use config::{
    ActionConfig, AstGrepPattern, AstGrepWatch, Concern, Config, Defined, HandlebarsReport,
    IncludeGlobs, JqWatch, OrRef, RefKind, RegexWatch, ReportConfig, Signal, TsqWatch, UseRef,
    WatchConfig, XpathWatch,
};
pub use diff::{parse_unified_diff, ChangeKind, FileChange, Hunk};
pub use engine::Engine;
pub use errors::VigilError;
pub use provider::{ContentProvider, FileVersions, MapProvider, Refs, WORKING_TREE};
pub use report::{ReportMetadata, ReportOutput};
pub use runner::{ProcessContext, RunOutput, SignalFailure};
pub use watch::diffing::LineRange;
pub use watch::{apply as apply_watch, ContextEntry, FilterResult, QueryCache};
