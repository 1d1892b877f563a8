//! Statistics reporting.

use console::style;
use std::path::Path;

use crate::fetch::ExtractionState;

/// Print the counters of a finished extraction.
pub fn print_run_stats(state: &ExtractionState) {
    println!();
    println!("{}", style("Statistics:").bold());
    println!("  Seen:     {}", state.seen);
    if state.filtered > 0 {
        println!("  Filtered: {}", state.filtered);
    }
    println!("  Exported: {}", style(state.exported).green());
    if state.skipped > 0 {
        println!("  Skipped:  {}", style(state.skipped).yellow());
    }
    if state.retries > 0 {
        println!("  Retries:  {}", state.retries);
    }
    if state.missing_video_urls > 0 {
        println!(
            "  Videos without URL: {}",
            style(state.missing_video_urls).yellow()
        );
    }
}

/// Print the final summary line.
pub fn print_summary(path: &Path, rows: usize) {
    println!(
        "CSV saved to {} with {} rows.",
        style(path.display()).bold(),
        style(rows).green()
    );
}
