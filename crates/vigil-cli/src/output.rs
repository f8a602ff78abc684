//! Rendering run output to stdout.
//!
//! Two modes: a human-readable report listing, and `--json` emitting the
//! full structured [`RunOutput`] for scripting.

use vigil_core::RunOutput;

/// Print each report with a short header, separated by rules.
pub fn print_human(output: &RunOutput) {
    if output.reports.is_empty() && output.failures.is_empty() {
        println!("No reportable changes.");
        return;
    }

    for (i, report) in output.reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("── {} ──", report.metadata.file_name);
        println!("{}", report.content.trim_end());
    }

    if !output.failures.is_empty() {
        println!();
        println!("{} signal(s) failed:", output.failures.len());
        for failure in &output.failures {
            println!(
                "  {} (signal #{}) on {}: {}",
                failure.concern, failure.signal, failure.file, failure.error
            );
        }
    }
}

/// Print the full run output as JSON.
pub fn print_json(output: &RunOutput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}
