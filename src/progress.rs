//! Progress and report display for the CLI
//!
//! Provides a harvest spinner using indicatif and plain-text tables for the
//! report commands.

use crate::harvest::{HarvestProgress, HarvestStats};
use crate::report::{FileReport, FolderReport};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a harvest runs
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &HarvestProgress) {
        let msg = format!(
            "Dirs: {} | Files: {} | Size: {} | Rate: {:.0}/s | Batches: {}",
            format_number(progress.dirs),
            format_number(progress.records),
            format_size(progress.bytes, BINARY),
            progress.records_per_second(),
            format_number(progress.batches),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact age: the two most significant units, e.g. `3d 4h`, `12m`
pub fn format_age(age: Duration) -> String {
    const UNITS: [(&str, u64); 5] = [
        ("y", 365 * 86_400),
        ("d", 86_400),
        ("h", 3_600),
        ("m", 60),
        ("s", 1),
    ];

    let mut secs = age.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }

    let mut parts = Vec::with_capacity(2);
    for (suffix, unit) in UNITS {
        if secs >= unit {
            parts.push(format!("{}{}", secs / unit, suffix));
            secs %= unit;
            if parts.len() == 2 {
                break;
            }
        } else if !parts.is_empty() {
            break;
        }
    }
    parts.join(" ")
}

/// Print the result of a harvest
pub fn print_harvest_summary(root: &str, stats: &HarvestStats, db_path: &str) {
    println!();
    println!("{}", style("Harvest Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Forgotten:").bold(), format_number(stats.forgotten));
    println!("  {} {}", style("Files:").bold(), format_number(stats.records));
    println!("  {} {}", style("Total Size:").bold(), format_size(stats.bytes, BINARY));
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        stats.duration.as_secs_f64(),
        stats.records_per_second()
    );
    if stats.skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(stats.skipped)
        );
    }
    println!("  {} {}", style("Database:").bold(), db_path);
    println!();
}

/// Print folder rollups as a table
pub fn print_folders(rows: &[FolderReport]) {
    println!(
        "{}",
        style(format!(
            "{:>10}  {:>10}  {:>10}  {:>8}  {}",
            "SIZE", "ON DISK", "FILES", "AGE", "FOLDER"
        ))
        .bold()
    );
    for row in rows {
        let r = &row.rollup;
        println!(
            "{:>10}  {:>10}  {:>10}  {:>8}  {}",
            format_size(r.sum_filesize, BINARY),
            format_size(r.sum_filesize_on_disk, BINARY),
            format_number(r.file_count),
            format_age(row.age),
            r.dirname
        );
    }
}

/// Print file records as a table
pub fn print_files(rows: &[FileReport]) {
    println!(
        "{}",
        style(format!(
            "{:>10}  {:>10}  {:<12}  {:>8}  {}",
            "SIZE", "ON DISK", "OWNER", "AGE", "PATH"
        ))
        .bold()
    );
    for row in rows {
        let r = &row.record;
        println!(
            "{:>10}  {:>10}  {:<12}  {:>8}  {}",
            format_size(r.filesize, BINARY),
            format_size(r.filesize_bytes_on_disk, BINARY),
            r.owner,
            format_age(row.age),
            r.path()
        );
    }
}
