//! Preflight checks for streaming.
//!
//! Validates that the host has the audio tools the streamer drives, so a
//! missing `pactl` or `ffmpeg` is reported up front instead of as a spawn
//! failure mid-stream.
//!
//! # Example
//!
//! ```rust
//! use audio_streamer::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("ffmpeg") {
//!     println!("ffmpeg not installed");
//! }
//!
//! let tools = &[("pactl", "libpulse"), ("ffmpeg", "ffmpeg")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};

/// Check if a command exists on PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Host tools needed to list sources and stream.
///
/// Each tuple is (command_name, package_name).
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[("pactl", "libpulse"), ("ffmpeg", "ffmpeg")];

/// Check that specific tools are available.
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<_> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .collect();

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

pub fn check_host_tools() -> Result<()> {
    check_required_tools(REQUIRED_TOOLS)
}
