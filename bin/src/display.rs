//! Display utilities and output formatting for the ytgrab CLI.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ytgrab_lib::{HistoryEntry, JobState};

/// Formats bytes in human-readable form (e.g., "4.20 MB", "512 B").
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Creates the percentage bar shown while a job runs.
pub(crate) fn job_progress_bar(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Returns the status line for a job state.
pub(crate) const fn state_label(state: JobState) -> &'static str {
    match state {
        JobState::Pending => "queued",
        JobState::Extracting => "reading video information",
        JobState::Fetching => "downloading",
        JobState::PostProcessing => "tagging and saving",
        JobState::Succeeded => "done",
        JobState::Failed => "failed",
        JobState::Cancelled => "cancelled",
    }
}

/// Prints history entries as an aligned table.
pub(crate) fn print_history(entries: &[HistoryEntry]) {
    let title_width = entries
        .iter()
        .map(|entry| entry.title().chars().count())
        .max()
        .unwrap_or(5)
        .clamp(5, 60);

    println!("{:<19}  {:<5}  {:<title_width$}  PATH", "DATE", "KIND", "TITLE");
    for entry in entries {
        println!(
            "{:<19}  {:<5}  {:<title_width$}  {}",
            entry.timestamp().format("%Y-%m-%d %H:%M:%S"),
            entry.kind().as_str(),
            truncate(entry.title(), title_width),
            entry.path().display(),
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
