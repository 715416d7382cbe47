//! Config command implementation.

use anyhow::{Context, Result, bail};
use inquire::Confirm;
use serde_json::Value;
use ytgrab_lib::{AppConfig, ConfigStore, StorePaths};

/// Print the configuration and where it lives.
pub(crate) fn show(paths: &StorePaths) -> Result<()> {
    let store = ConfigStore::open(paths);
    let config = store.load().context("Failed to load configuration")?;

    println!("# {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Print one value.
pub(crate) fn get(paths: &StorePaths, key: &str) -> Result<()> {
    let config = ConfigStore::open(paths)
        .load()
        .context("Failed to load configuration")?;

    match config.get(key) {
        Some(Value::String(text)) => println!("{text}"),
        Some(value) => println!("{value}"),
        None => bail!(
            "No setting named '{key}' (known: {})",
            AppConfig::RECOGNIZED_KEYS.join(", ")
        ),
    }
    Ok(())
}

/// Change one value and save the file.
pub(crate) fn set(paths: &StorePaths, key: &str, value: &str) -> Result<()> {
    let store = ConfigStore::open(paths);
    store.update(|config| config.set(key, value))?;
    println!("{key} updated.");
    Ok(())
}

/// Restore the defaults, asking first unless `yes` is set.
pub(crate) fn reset(paths: &StorePaths, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new("Reset all settings to their defaults?")
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if !confirmed {
            return Ok(());
        }
    }

    let store = ConfigStore::open(paths);
    store.reset().context("Failed to reset configuration")?;
    println!("Configuration reset: {}", store.path().display());
    Ok(())
}
