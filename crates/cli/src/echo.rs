use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Beanpress".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Turn annotated reading lessons into a study book\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: impl std::fmt::Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.to_string().bright_white());
}

/// Print harvest summary
pub fn print_harvest_summary(harvest: &beanpress_core::Harvest, elapsed: std::time::Duration) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Harvest Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Lessons", harvest.collections.len());
    print_detail("Fetched", harvest.fetched);
    print_detail("Cached", harvest.collections.len() - harvest.fetched);
    print_detail("Failed", harvest.failed.len());
    print_detail("Elapsed", format!("{:.2}s", elapsed.as_secs_f64()));
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
