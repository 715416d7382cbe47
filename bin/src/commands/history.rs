//! History command implementation.

use crate::display::print_history;
use anyhow::{Context, Result};
use inquire::Confirm;
use ytgrab_lib::{HistoryLog, StorePaths};

/// Print the most recent downloads.
pub(crate) fn show_history(paths: &StorePaths, limit: usize) -> Result<()> {
    let history = HistoryLog::open(paths);
    let entries = history
        .recent(limit)
        .with_context(|| format!("Failed to read history from {}", history.path().display()))?;

    if entries.is_empty() {
        println!("No downloads recorded yet.");
        return Ok(());
    }

    print_history(&entries);
    Ok(())
}

/// Remove all history entries, asking first unless `yes` is set.
pub(crate) fn clear_history(paths: &StorePaths, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new("Clear the entire download history?")
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("History kept.");
            return Ok(());
        }
    }

    let history = HistoryLog::open(paths);
    history.clear().context("Failed to clear history")?;
    println!("History cleared.");
    Ok(())
}
