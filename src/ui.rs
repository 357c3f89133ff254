//! Styled status output.
//!
//! Status and success lines go to stdout, errors and warnings to stderr.
//! Nothing here is used by `version`, whose stdout carries only the
//! version string.

use console::style;

use crate::publish::{PublishReport, StepOutcome};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a warning with a yellow marker.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// One line per step, e.g. `  image     published`
pub fn format_report(report: &PublishReport) -> Vec<String> {
    report
        .steps
        .iter()
        .map(|(kind, outcome)| {
            let outcome = match outcome {
                StepOutcome::Published => "published",
                StepOutcome::Skipped => "skipped",
            };
            format!("  {:<8}  {}", kind.name(), outcome)
        })
        .collect()
}

/// Print the publish summary.
pub fn display_report(report: &PublishReport) {
    println!(
        "\n{}",
        style(format!("Publish summary for {}", report.version)).bold()
    );
    for line in format_report(report) {
        println!("{}", line);
    }
}
