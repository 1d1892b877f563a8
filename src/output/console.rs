//! Console output utilities.

use console::style;
use std::path::Path;

use crate::config::PostFilter;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     ig-saved-export                                   ║
║     Export your saved Instagram posts to CSV          ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(
    username: &str,
    filter: PostFilter,
    max_posts: Option<usize>,
    sleep_seconds: f64,
    output: &Path,
) {
    let limit = max_posts.map_or_else(|| "none".to_string(), |max| max.to_string());

    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Account: {}", username);
    println!("  Posts:   {}", filter);
    println!("  Limit:   {}", limit);
    println!("  Sleep:   {}s", sleep_seconds);
    println!("  Output:  {}", output.display());
    println!();
}
