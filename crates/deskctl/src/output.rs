//! Terminal output for command results

use crate::commands::CommandOutput;
use owo_colors::OwoColorize;

/// Print result lines to stdout and diagnostics as a warning list on stderr
pub fn print(output: &CommandOutput) {
    for line in &output.lines {
        println!("{}", line);
    }
    if output.diagnostics.is_empty() {
        return;
    }
    eprintln!(
        "{} {} warning(s)",
        "!".yellow().bold(),
        output.diagnostics.len()
    );
    for d in output.diagnostics.iter() {
        eprintln!("  {} {}", "-".yellow(), d);
    }
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);
}
