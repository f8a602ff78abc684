//! Vigil Engine – the long-lived value tying a configuration to the
//! run-scoped caches.
//!
//! The [`Engine`] owns the immutable ruleset and the compiled-query cache;
//! hosts create one per loaded configuration and call [`Engine::run`] per
//! diff. The engine itself is stateless across runs — nothing persists.

use std::path::Path;

use crate::config::Config;
use crate::diff::{parse_unified_diff, FileChange};
use crate::errors::VigilError;
use crate::runner::{self, ProcessContext, RunOutput};
use crate::watch::QueryCache;

/// The main entry point for change analysis.
///
/// # Example
///
/// ```ignore
/// use vigil_core::{Engine, MapProvider, ProcessContext, Refs};
///
/// let engine = Engine::from_config_path(Path::new("vigil.yml"))?;
/// let ctx = ProcessContext { provider: &provider, refs: Refs::new("main", "HEAD") };
/// let output = engine.run(&diff_text, &ctx)?;
/// for report in &output.reports {
///     println!("{}", report.content);
/// }
/// ```
pub struct Engine {
    config: Config,
    cache: QueryCache,
}

impl Engine {
    /// Create an engine from an already-parsed configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: QueryCache::new(),
        }
    }

    /// Create an engine from a YAML ruleset file.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::InvalidConfig`] if the file cannot be read or
    /// does not match the schema.
    pub fn from_config_path(path: &Path) -> Result<Self, VigilError> {
        Ok(Self::new(Config::from_path(path)?))
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a unified diff and run every concern against it.
    ///
    /// # Errors
    ///
    /// Returns an error for configuration resolution failures; per-signal
    /// runtime failures are recorded in the output instead.
    pub fn run(&self, diff_text: &str, ctx: &ProcessContext<'_>) -> Result<RunOutput, VigilError> {
        let files = parse_unified_diff(diff_text);
        tracing::debug!(
            files = files.len(),
            concerns = self.config.concerns.len(),
            "starting run"
        );
        self.run_files(&files, ctx)
    }

    /// Run every concern against already-parsed file changes.
    pub fn run_files(
        &self,
        files: &[FileChange],
        ctx: &ProcessContext<'_>,
    ) -> Result<RunOutput, VigilError> {
        runner::run(files, &self.config, &self.cache, ctx)
    }

    /// Resolve every reference in every signal without running anything.
    ///
    /// Used by hosts to fail fast on dangling references. An unreferenced
    /// `defined` entry is valid and not checked.
    pub fn validate(&self) -> Result<(), VigilError> {
        for (concern_id, concern) in &self.config.concerns {
            for (signal_idx, signal_ref) in concern.signals.iter().enumerate() {
                let attribute = |e: VigilError| e.for_signal(concern_id, signal_idx);

                let signal = self.config.resolve_signal(signal_ref).map_err(attribute)?;
                let watch = self.config.resolve_watch(&signal.watch).map_err(attribute)?;
                watch.include().matcher().map_err(attribute)?;
                self.config.resolve_report(&signal.report).map_err(attribute)?;
            }
        }
        Ok(())
    }
}
