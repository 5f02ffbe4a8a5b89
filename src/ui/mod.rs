//! Terminal output for the CLI: colored status lines and a per-query
//! progress bar. Everything is written to stderr so stdout stays clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use crate::models::{RunResult, Traversal};

/// Check if stderr is a terminal.
pub fn is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Warning => "⚠",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    eprintln!();
    eprintln!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// One line per query with its record count, then the total.
pub fn print_run_summary(result: &RunResult) {
    print_section("Results");
    for (query, records) in result.sections() {
        let label = if query.is_empty() { "(empty query)" } else { query };
        eprintln!("  {:<40} {}", label, format_number(records.len()).bold());
    }
    eprintln!(
        "  {:<40} {}",
        "total".dimmed(),
        format_number(result.len()).bold().green()
    );
}

/// Report one written output file.
pub fn print_saved(path: &Path) {
    let size = std::fs::metadata(path)
        .map(|m| format_file_size(m.len()))
        .unwrap_or_default();
    print_status(
        Status::Success,
        &format!("Saved {} {}", path.display(), size.dimmed()),
    );
}

/// Format a number with commas.
pub fn format_number(n: usize) -> String {
    n.to_string()
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect()
}

/// Get a human-readable file size.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Progress over the queries of a run
pub struct QueryProgress {
    pb: ProgressBar,
}

impl QueryProgress {
    /// Visible only when `enabled` and stderr is a terminal
    pub fn new(total: usize, enabled: bool) -> Self {
        let pb = ProgressBar::new(total as u64);
        if !(enabled && is_terminal()) {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {msg}\n{wide_bar:.cyan/blue} {pos}/{len} queries",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .progress_chars("█▓░"),
        );
        pb.set_message("🔍 Crawling Google Scholar");
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Record a finished query
    pub fn complete(&self, query: &str, traversal: &Traversal) {
        let line = format!(
            "{:?}: {} records from {} page(s), {}",
            query,
            traversal.records.len(),
            traversal.pages_fetched,
            traversal.stop
        );
        if traversal.is_partial() {
            self.pb
                .println(format!("{} {}", status_icon(Status::Warning).yellow(), line));
        } else {
            self.pb
                .println(format!("{} {}", status_icon(Status::Success).green(), line));
        }
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.pb.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, StopReason};

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Warning), "⚠");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(123), "123");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1048576), "1.00 MB");
    }

    #[test]
    fn test_disabled_progress_is_hidden() {
        let progress = QueryProgress::new(2, false);
        assert!(progress.is_hidden());

        let traversal = Traversal {
            records: vec![Record::new("a")],
            pages_fetched: 1,
            stop: StopReason::NoNextLink,
        };
        progress.complete("q", &traversal);
        progress.finish();
    }
}
