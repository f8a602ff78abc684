//! # vigil CLI
//!
//! Command-line interface for the Vigil change-governance engine.
//!
//! This binary provides human-friendly access to `vigil-core`
//! functionality. Run `vigil --help` for usage information.

mod cli;
mod git;
mod output;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
