use anyhow::{bail, Result};
use std::path::Path;

use audio_streamer::desktop::{self, write_desktop_entry};
use audio_streamer::ffmpeg::player_url;
use audio_streamer::network::{probe, ProbeOutcome};
use audio_streamer::preflight::{check_host_tools, REQUIRED_TOOLS};
use audio_streamer::tone::send_test_tone;

const TROUBLESHOOTING_TIPS: &[&str] = &[
    "Make sure both devices are on the same WiFi network",
    "On phone: VLC → Open Network Stream → udp://@:<port>",
    "Try the test tone first to verify connectivity",
    "Check if firewall is blocking UDP traffic",
];

pub(crate) async fn test_network(
    config_path: &Path,
    target: Option<String>,
    port: Option<String>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let ip = target.unwrap_or_else(|| config.target_ip.clone());
    let port = port.unwrap_or_else(|| config.target_port.to_string());

    let outcome = probe(&ip, &port).await;
    if !outcome.is_success() {
        print_tips();
        bail!("{outcome}");
    }

    tracing::info!("{outcome}");
    if let ProbeOutcome::Sent(addr) = outcome {
        tracing::info!("Listen on the receiver with: {}", player_url(addr.port()));
    }
    Ok(())
}

pub(crate) async fn test_tone(
    config_path: &Path,
    target: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    super::apply_overrides(&mut config, target.as_deref(), port);
    config.validate()?;

    if let Err(e) = send_test_tone(&config).await {
        print_tips();
        return Err(e);
    }
    Ok(())
}

pub(crate) fn check() -> Result<()> {
    check_host_tools()?;
    let names: Vec<_> = REQUIRED_TOOLS.iter().map(|(tool, _)| *tool).collect();
    tracing::info!("All required tools found: {}", names.join(", "));
    Ok(())
}

pub(crate) fn desktop_entry(install: Option<&Path>) -> Result<()> {
    match install {
        Some(dir) => {
            let path = write_desktop_entry(dir)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", desktop::desktop_entry()),
    }
    Ok(())
}

fn print_tips() {
    tracing::warn!("Troubleshooting tips:");
    for tip in TROUBLESHOOTING_TIPS {
        tracing::warn!("  • {tip}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_desktop_entry_installs_into_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("applications");

        desktop_entry(Some(&dir)).unwrap();

        let written = fs::read_to_string(dir.join(desktop::DESKTOP_FILENAME)).unwrap();
        assert_eq!(written, desktop::desktop_entry());
    }

    #[test]
    fn test_desktop_entry_prints_without_install_dir() {
        assert!(desktop_entry(None).is_ok());
    }
}
