//! Formatting functions for release output.
//!
//! Everything the user sees goes through here. Colours come from `console`,
//! which drops them when the stream is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a bold heading that opens a release phase.
pub fn display_phase(title: &str) {
    println!("\n{}", style(title).bold());
}

/// Echo an external command before it runs.
pub fn display_command(command: &str) {
    println!("  {} {}", style("$").dim(), style(command).cyan());
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the steps a dry run would have executed.
///
/// # Arguments
/// * `tag` - The tag the release would create
/// * `steps` - Human-readable step descriptions, in execution order
pub fn display_plan(tag: &str, steps: &[String]) {
    println!(
        "\n{} {}",
        style("Planned release:").bold(),
        style(tag).green()
    );
    for line in plan_lines(steps) {
        println!("{}", line);
    }
}

fn plan_lines(steps: &[String]) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("  {}. {}", i + 1, step))
        .collect()
}

/// Display the final summary after a successful release.
pub fn display_release_summary(tag: &str, dependency_updated: bool) {
    println!(
        "\n{} Successfully released {}",
        style("✓").green().bold(),
        style(tag).green().bold()
    );
    if dependency_updated {
        println!("  Self-dependency updated and pushed");
    }
}
