//! Persisted streaming settings.
//!
//! Settings live in `<config dir>/audio-streamer/config.json`. A missing file
//! is created with defaults on first load; fields missing from an existing
//! file fall back to their defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory name under the user config dir.
pub const APP_DIR_NAME: &str = "audio-streamer";

/// Config file name inside [`APP_DIR_NAME`].
pub const CONFIG_FILENAME: &str = "config.json";

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_UDP_PAYLOAD: u32 = 65_507;

/// Address that means "not configured" when stored as the target.
const UNSPECIFIED_TARGET: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Receiver address. Empty until the user sets one.
    pub target_ip: String,
    pub target_port: u16,
    /// ffmpeg audio encoder name, e.g. `aac` or `libopus`.
    pub audio_codec: String,
    /// ffmpeg bitrate string, e.g. `192k`.
    pub bitrate: String,
    pub sample_rate: u32,
    pub channels: u8,
    /// UDP packet size handed to ffmpeg as `pkt_size`.
    pub buffer_size: u32,
    pub low_latency: bool,
    /// PulseAudio source name chosen by the user, if any.
    pub preferred_source: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_ip: String::new(),
            target_port: 1234,
            audio_codec: "aac".to_string(),
            bitrate: "192k".to_string(),
            sample_rate: 48000,
            channels: 2,
            buffer_size: 1316,
            low_latency: true,
            preferred_source: None,
        }
    }
}

impl Config {
    /// True once a usable receiver address has been set.
    pub fn is_ip_configured(&self) -> bool {
        !self.target_ip.is_empty() && self.target_ip != UNSPECIFIED_TARGET
    }

    /// `ip:port` of the receiver, or `NOT SET`.
    pub fn target_display(&self) -> String {
        if self.target_ip.is_empty() {
            "NOT SET".to_string()
        } else {
            format!("{}:{}", self.target_ip, self.target_port)
        }
    }

    /// Apply user-entered target values.
    ///
    /// An empty address and a port that does not parse are ignored, leaving
    /// the current value in place. Returns true if anything changed.
    pub fn apply_target(&mut self, ip: Option<&str>, port: Option<&str>) -> bool {
        let mut changed = false;

        if let Some(ip) = ip.map(str::trim) {
            if !ip.is_empty() && ip != self.target_ip {
                self.target_ip = ip.to_string();
                changed = true;
            }
        }

        if let Some(Ok(port)) = port.map(|p| p.trim().parse::<u16>()) {
            if port != self.target_port {
                self.target_port = port;
                changed = true;
            }
        }

        changed
    }

    pub fn set_preferred_source(&mut self, name: impl Into<String>) {
        self.preferred_source = Some(name.into());
    }

    /// Reject settings ffmpeg would refuse or that cannot be sent over UDP.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            bail!("channels must be at least 1");
        }
        if self.sample_rate == 0 {
            bail!("sample_rate must be greater than 0");
        }
        if self.buffer_size == 0 || self.buffer_size > MAX_UDP_PAYLOAD {
            bail!(
                "buffer_size must be between 1 and {} bytes, got {}",
                MAX_UDP_PAYLOAD,
                self.buffer_size
            );
        }
        if self.audio_codec.trim().is_empty() {
            bail!("audio_codec must not be empty");
        }
        if self.bitrate.trim().is_empty() {
            bail!("bitrate must not be empty");
        }
        if !self.target_ip.is_empty() && self.target_ip.parse::<IpAddr>().is_err() {
            bail!("target_ip '{}' is not a valid IP address", self.target_ip);
        }
        Ok(())
    }

    /// Load the config at `path`, writing defaults there if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config '{}'", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("parsing config '{}'", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            return Ok(config);
        }

        let config = Config::default();
        config.save(path)?;
        tracing::info!("created default config at {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("serializing config")?;
        let tmp = tmp_path(path);
        fs::write(&tmp, json)
            .with_context(|| format!("writing temporary config '{}'", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| {
            format!("renaming '{}' -> '{}'", tmp.display(), path.display())
        })?;
        Ok(())
    }
}

/// Default config location, creating its directory if needed.
pub fn default_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory '{}'", config_dir.display()))?;
    Ok(config_dir.join(CONFIG_FILENAME))
}

fn tmp_path(path: &Path) -> PathBuf {
    let n = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let name = path
        .file_name()
        .and_then(|part| part.to_str())
        .unwrap_or(CONFIG_FILENAME);
    path.with_file_name(format!(".{name}.tmp-{n}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.target_port, 1234);
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.buffer_size, 1316);
        assert!(config.low_latency);
        assert!(!config.is_ip_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_ip_configured() {
        let mut config = Config::default();
        config.target_ip = "0.0.0.0".to_string();
        assert!(!config.is_ip_configured());
        config.target_ip = "192.168.1.20".to_string();
        assert!(config.is_ip_configured());
    }

    #[test]
    fn test_apply_target_ignores_empty_and_bad_port() {
        let mut config = Config::default();
        config.target_ip = "10.0.0.5".to_string();

        assert!(!config.apply_target(Some("  "), Some("not-a-port")));
        assert_eq!(config.target_ip, "10.0.0.5");
        assert_eq!(config.target_port, 1234);

        assert!(!config.apply_target(None, Some("70000")));
        assert_eq!(config.target_port, 1234);

        assert!(config.apply_target(Some("10.0.0.9"), Some("5000")));
        assert_eq!(config.target_ip, "10.0.0.9");
        assert_eq!(config.target_port, 5000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.channels = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.buffer_size = MAX_UDP_PAYLOAD + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target_ip = "phone.local".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target_ip = "fe80::1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.json");

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.is_file());

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "target_ip": "192.168.0.7", "channels": 1 }"#).unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.target_ip, "192.168.0.7");
        assert_eq!(config.channels, 1);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.preferred_source, None);
    }

    #[test]
    fn test_save_roundtrip_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let mut config = Config::default();
        config.target_ip = "192.168.0.7".to_string();
        config.set_preferred_source("alsa_output.pci.analog-stereo.monitor");
        config.save(&path).unwrap();

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(loaded, config);

        let entries = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_or_create(&path).is_err());
    }
}
