//! Check command implementation.

use anyhow::{Result, bail};

/// External programs a download needs.
const REQUIRED_TOOLS: [(&str, &str); 2] = [
    ("yt-dlp", "extracts and downloads media"),
    ("ffmpeg", "converts audio and merges video streams"),
];

/// Report whether the required tools are on PATH.
pub(crate) fn check() -> Result<()> {
    let mut missing = Vec::new();

    for (tool, purpose) in REQUIRED_TOOLS {
        match which::which(tool) {
            Ok(path) => println!("  ok       {tool:<7} {}", path.display()),
            Err(_) => {
                println!("  missing  {tool:<7} ({purpose})");
                missing.push(tool);
            }
        }
    }

    if !missing.is_empty() {
        bail!("Required tools not found on PATH: {}", missing.join(", "));
    }
    println!("All required tools are installed.");
    Ok(())
}
