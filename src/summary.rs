//! End-of-run console output
//!
//! Human-facing header and summary lines, separate from the structured
//! report stream on the sink.

use crate::process::RunOutcome;
use console::style;
use std::path::Path;

/// Print a header before the run starts
pub fn print_header(root: &Path, operations: &[String], workers: usize) {
    println!();
    println!(
        "{} {}",
        style("fileproc").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root.display());
    println!("  {} {}", style("Operations:").bold(), operations.join(", "));
    println!("  {} {}", style("Workers:").bold(), workers);
    println!();
}

/// Print a summary of the run results
pub fn print_summary(outcome: &RunOutcome) {
    let stats = &outcome.stats;
    let duration_secs = stats.elapsed.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.completed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    if outcome.completed {
        println!("{}", style("Run Complete").green().bold());
    } else {
        println!("{}", style("Run Truncated").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Entries Visited:").bold(),
        format_number(stats.visited)
    );
    println!(
        "  {} {} submitted, {} completed",
        style("Tasks:").bold(),
        format_number(stats.submitted),
        format_number(stats.completed)
    );
    if stats.failed > 0 {
        println!(
            "  {} {}",
            style("Failed:").yellow().bold(),
            format_number(stats.failed)
        );
    }
    if stats.unmatched > 0 {
        println!(
            "  {} {}",
            style("Unmatched:").bold(),
            format_number(stats.unmatched)
        );
    }
    if stats.skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped:").bold(),
            format_number(stats.skipped)
        );
    }
    if stats.read_errors > 0 {
        println!(
            "  {} {}",
            style("Read Errors:").yellow().bold(),
            format_number(stats.read_errors)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} tasks/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    println!();
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}
