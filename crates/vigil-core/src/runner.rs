//! The processing runner.
//!
//! Walks every (file, concern, signal) triple: resolves the signal's watch,
//! gates on the include globs, lazily materializes both file versions, runs
//! the watch, and renders a report when the watch fires. Evaluation is
//! parallel, but the emitted report sequence always equals the sequential
//! file × concern × signal order.
//!
//! Failure policy: reference-resolution failures are fatal and returned
//! up, attributed to the offending signal. Watch runtime failures, render
//! failures, and provider errors are local — recorded as a
//! [`SignalFailure`] while every other signal still runs.

use std::collections::BTreeMap;

use globset::GlobSet;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{ActionConfig, Config, Signal, WatchConfig};
use crate::diff::{ChangeKind, FileChange};
use crate::errors::VigilError;
use crate::provider::{ContentProvider, FileVersions, Refs};
use crate::report::{self, ReportOutput};
use crate::watch::{self, QueryCache};

/// Everything a run needs besides the diff: where bytes come from and
/// which revisions bound the comparison.
pub struct ProcessContext<'a> {
    pub provider: &'a dyn ContentProvider,
    pub refs: Refs,
}

/// A per-signal failure the runner recorded and skipped past.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFailure {
    pub concern: String,
    pub signal: usize,
    pub file: String,
    pub error: String,
}

/// The result of a full run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    /// Reports in deterministic file × concern × signal order.
    pub reports: Vec<ReportOutput>,
    /// Shared per-concern context accumulated by `set-context` actions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub concerns: BTreeMap<String, BTreeMap<String, String>>,
    /// Signals that failed locally; the rest of the run is unaffected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SignalFailure>,
}

/// A signal resolved once per run, shared across files.
struct Prepared<'c> {
    concern_id: &'c str,
    signal_idx: usize,
    signal: &'c Signal,
    watch: &'c WatchConfig,
    include: GlobSet,
}

/// What one (file, signal) task produced.
enum Outcome {
    Skipped,
    Failed(SignalFailure),
    Fired {
        concern_id: String,
        report: ReportOutput,
        context_updates: Vec<(String, String)>,
    },
}

/// Run the configured concerns against a parsed diff.
///
/// # Errors
///
/// Returns an error only for configuration resolution failures; every
/// other failure is recorded in [`RunOutput::failures`].
pub fn run(
    files: &[FileChange],
    config: &Config,
    cache: &QueryCache,
    ctx: &ProcessContext<'_>,
) -> Result<RunOutput, VigilError> {
    if files.is_empty() {
        return Ok(RunOutput::default());
    }

    // Resolve each (concern, signal) once. Resolution is lazy in the sense
    // that an empty diff resolves nothing; with files present every signal
    // executes, so resolving up front is observationally identical.
    let mut prepared: Vec<Prepared<'_>> = Vec::new();
    for (concern_id, concern) in &config.concerns {
        for (signal_idx, signal_ref) in concern.signals.iter().enumerate() {
            let attribute = |e: VigilError| e.for_signal(concern_id, signal_idx);

            let signal = config.resolve_signal(signal_ref).map_err(attribute)?;
            let watch = config.resolve_watch(&signal.watch).map_err(attribute)?;
            let include = watch.include().matcher().map_err(attribute)?;

            prepared.push(Prepared {
                concern_id,
                signal_idx,
                signal,
                watch,
                include,
            });
        }
    }

    // Task list in emission order; rayon's indexed collect preserves it.
    let tasks: Vec<(&FileChange, &Prepared<'_>)> = files
        .iter()
        .flat_map(|file| prepared.iter().map(move |p| (file, p)))
        .filter(|(file, p)| p.include.is_match(file.effective_path()))
        .collect();

    let outcomes: Vec<Result<Outcome, VigilError>> = tasks
        .par_iter()
        .map(|&(file, p)| execute(file, p, config, cache, ctx))
        .collect();

    let mut output = RunOutput::default();
    for outcome in outcomes {
        match outcome? {
            Outcome::Skipped => {}
            Outcome::Failed(failure) => {
                tracing::warn!(
                    concern = %failure.concern,
                    signal = failure.signal,
                    file = %failure.file,
                    "signal failed: {}",
                    failure.error
                );
                output.failures.push(failure);
            }
            Outcome::Fired {
                concern_id,
                report,
                context_updates,
            } => {
                if !context_updates.is_empty() {
                    let slot = output.concerns.entry(concern_id).or_default();
                    for (key, value) in context_updates {
                        slot.insert(key, value);
                    }
                }
                output.reports.push(report);
            }
        }
    }

    Ok(output)
}

/// Evaluate one (file, signal) pair.
///
/// Only reference-resolution failures return `Err`; everything else maps
/// to an [`Outcome`].
fn execute(
    file: &FileChange,
    p: &Prepared<'_>,
    config: &Config,
    cache: &QueryCache,
    ctx: &ProcessContext<'_>,
) -> Result<Outcome, VigilError> {
    let path = file.effective_path();
    let fail = |e: &VigilError| {
        Outcome::Failed(SignalFailure {
            concern: p.concern_id.to_string(),
            signal: p.signal_idx,
            file: path.to_string(),
            error: e.to_string(),
        })
    };

    // Materialize both sides. Absence is data; provider errors are local
    // failures for this signal.
    let old = if file.kind == ChangeKind::Add {
        None
    } else {
        let old_path = file.old_path.as_deref().unwrap_or(path);
        match ctx.provider.fetch(&ctx.refs.base, old_path) {
            Ok(content) => content,
            Err(e) => return Ok(fail(&e)),
        }
    };
    let new = if file.kind == ChangeKind::Delete {
        None
    } else {
        match ctx.provider.fetch(&ctx.refs.head, path) {
            Ok(content) => content,
            Err(e) => return Ok(fail(&e)),
        }
    };
    let versions = FileVersions::new(old, new);

    let filtered = match watch::apply(cache, p.watch, &versions, Some(path)) {
        Ok(Some(filtered)) => filtered,
        Ok(None) => return Ok(Outcome::Skipped),
        Err(e) => return Ok(fail(&e)),
    };

    // Report resolution is a configuration failure: fatal.
    let report_config = config
        .resolve_report(&p.signal.report)
        .map_err(|e| e.for_signal(p.concern_id, p.signal_idx))?;

    let content = match report::render(report_config, &filtered, path) {
        Ok(content) => content,
        Err(e) => return Ok(fail(&e)),
    };

    let mut context_updates = Vec::new();
    for action in &p.signal.actions {
        match action {
            ActionConfig::SetContext { entries } => {
                for (key, template) in entries {
                    match report::render_template(template, &filtered, path) {
                        Ok(value) => context_updates.push((key.clone(), value)),
                        Err(e) => return Ok(fail(&e)),
                    }
                }
            }
        }
    }

    let report = report::build_output(content, &filtered, path, p.signal.notify.clone());
    Ok(Outcome::Fired {
        concern_id: p.concern_id.to_string(),
        report,
        context_updates,
    })
}
