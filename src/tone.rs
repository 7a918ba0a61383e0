//! Test tone sender.

use anyhow::{bail, Context, Result};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::ffmpeg::{self, FFMPEG, TEST_TONE_FREQUENCY, TEST_TONE_SECONDS};

/// Send the standard 440 Hz, 5 second tone and wait for ffmpeg to finish.
pub async fn send_test_tone(config: &Config) -> Result<()> {
    send_tone(config, TEST_TONE_FREQUENCY, TEST_TONE_SECONDS).await
}

pub async fn send_tone(config: &Config, frequency: u32, seconds: u32) -> Result<()> {
    if !config.is_ip_configured() {
        bail!("Please set target IP first");
    }

    let args = ffmpeg::tone_args(config, frequency, seconds);
    tracing::info!(
        "Sending {}-second test tone ({}Hz) to {}...",
        seconds,
        frequency,
        config.target_display()
    );

    let status = Command::new(FFMPEG)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .with_context(|| format!("Failed to start '{FFMPEG}'"))?;

    if !status.success() {
        bail!("Test tone failed: ffmpeg exited with {status}");
    }

    tracing::info!("Test tone sent");
    Ok(())
}
