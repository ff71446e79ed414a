//! Pure formatting functions for terminal output.
//!
//! Each status line is a coloured marker, a bold title and the summary.

use console::style;

/// Format a status line without printing it.
pub fn format_line(marker: &str, title: &str, summary: &str) -> String {
    if summary.is_empty() {
        format!("{} {}", marker, style(title).bold())
    } else {
        format!("{} {}: {}", marker, style(title).bold(), summary)
    }
}

/// Print an error status in red.
pub fn display_error(title: &str, summary: &str) {
    eprintln!("{}", format_line(&style("✗").red().to_string(), title, summary));
}

/// Print a success status with a green checkmark.
pub fn display_success(title: &str, summary: &str) {
    println!(
        "{}",
        format_line(&style("✓").green().to_string(), title, summary)
    );
}

/// Print an in-progress status with a yellow arrow.
pub fn display_status(title: &str, summary: &str) {
    println!(
        "{}",
        format_line(&style("→").yellow().to_string(), title, summary)
    );
}

/// Print a multi-line detail body, indented under the last status.
pub fn display_details(text: &str) {
    for line in text.lines() {
        println!("    {}", style(line).dim());
    }
}
