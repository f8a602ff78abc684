//! CLI definition and command dispatch for Vigil.
//!
//! This module defines the command-line interface using `clap` and
//! provides the `run()` function that dispatches commands to the engine.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (e.g., `--config`, `--verbose`)
//! 2. Environment variables (`VIGIL_CONFIG`, `VIGIL_VERBOSE`)
//! 3. `vigil.yml` in the repository root

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vigil_core::{Engine, ProcessContext, Refs, WORKING_TREE};

use crate::git::{GitContentProvider, GitRepo};
use crate::output;

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Default ruleset filename looked up in the repository root.
const DEFAULT_CONFIG: &str = "vigil.yml";

/// Vigil – deterministic code-change governance engine
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "VIGIL_VERBOSE")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the ruleset file (default: vigil.yml in the repo)
    #[arg(long, global = true, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze changes between two revisions and print reports
    #[command(after_help = r#"EXAMPLES:
    # Working tree against HEAD
    vigil check

    # A PR-style range
    vigil check --base origin/main --head HEAD

    # Machine-readable output
    vigil check --base main --head HEAD --json | jq '.reports[].metadata.fileName'
"#)]
    Check {
        /// Repository to analyze
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Base revision (the old side)
        #[arg(long, default_value = "HEAD")]
        base: String,

        /// Head revision (the new side); "." means the working tree
        #[arg(long, default_value = WORKING_TREE)]
        head: String,

        /// Output the full run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the ruleset and resolve every reference without running
    #[command(after_help = r#"EXAMPLES:
    # Validate the default ruleset
    vigil validate

    # Validate a specific file
    vigil validate --config rules/governance.yml
"#)]
    Validate {
        /// Repository the default ruleset is resolved against
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always; debug only with --verbose; nothing with --quiet.
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = format!("vigil_core={log_level},vigil_cli={log_level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Check {
            repo,
            base,
            head,
            json,
        } => check(&cli, repo.clone(), base, head, *json),
        Command::Validate { repo } => validate(&cli, repo.clone()),
    }
}

fn load_engine(cli: &Cli, repo: &std::path::Path) -> Result<Engine, ExitCode> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| repo.join(DEFAULT_CONFIG));

    Engine::from_config_path(&config_path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::FAILURE
    })
}

fn check(cli: &Cli, repo: PathBuf, base: &str, head: &str, json: bool) -> ExitCode {
    let engine = match load_engine(cli, &repo) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let git = GitRepo::new(repo);
    let diff_text = match git.diff(base, head) {
        Ok(diff) => diff,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let provider = GitContentProvider::new(git);
    let ctx = ProcessContext {
        provider: &provider,
        refs: Refs::new(base, head),
    };

    match engine.run(&diff_text, &ctx) {
        Ok(result) => {
            if json {
                if let Err(e) = output::print_json(&result) {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            } else {
                output::print_human(&result);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate(cli: &Cli, repo: PathBuf) -> ExitCode {
    let engine = match load_engine(cli, &repo) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    match engine.validate() {
        Ok(()) => {
            let concerns = engine.config().concerns.len();
            println!("ok: {concerns} concern(s), all references resolve");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("invalid: {e}");
            ExitCode::FAILURE
        }
    }
}
