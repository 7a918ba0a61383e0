//! ffmpeg argument construction.
//!
//! ffmpeg captures from PulseAudio, encodes, and muxes to MPEG-TS sent over
//! UDP. Receivers such as VLC open [`player_url`].

use crate::config::Config;

/// Program name looked up on PATH.
pub const FFMPEG: &str = "ffmpeg";

/// Frequency of the connectivity test tone, in Hz.
pub const TEST_TONE_FREQUENCY: u32 = 440;

/// Length of the connectivity test tone, in seconds.
pub const TEST_TONE_SECONDS: u32 = 5;

/// ffmpeg log level passed ahead of the stream arguments.
pub const STREAM_LOG_LEVEL: &str = "info";

/// Destination URL including the packet size.
pub fn udp_url(config: &Config) -> String {
    format!(
        "udp://{}:{}?pkt_size={}",
        host_for_url(&config.target_ip),
        config.target_port,
        config.buffer_size
    )
}

/// URL a receiver listens on for `port`.
pub fn player_url(port: u16) -> String {
    format!("udp://@:{port}")
}

/// Arguments that stream `source` to the configured target.
pub fn stream_args(config: &Config, source: &str) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "pulse".to_string(),
        "-i".to_string(),
        source.to_string(),
        "-ac".to_string(),
        config.channels.to_string(),
        "-ar".to_string(),
        config.sample_rate.to_string(),
        "-c:a".to_string(),
        config.audio_codec.clone(),
        "-b:a".to_string(),
        config.bitrate.clone(),
    ];

    if config.low_latency {
        args.extend(
            [
                "-flags",
                "+low_delay",
                "-fflags",
                "+nobuffer",
                "-flush_packets",
                "1",
            ]
            .map(String::from),
        );
    }

    args.extend(["-f", "mpegts", "-muxdelay", "0", "-muxpreload", "0"].map(String::from));
    args.push(udp_url(config));

    tracing::debug!("FFmpeg command: {} {}", FFMPEG, args.join(" "));
    args
}

/// Arguments that send a generated sine tone to the configured target.
pub fn tone_args(config: &Config, frequency: u32, seconds: u32) -> Vec<String> {
    let args = vec![
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("sine=frequency={frequency}:duration={seconds}"),
        "-c:a".to_string(),
        "aac".to_string(),
        "-f".to_string(),
        "mpegts".to_string(),
        format!(
            "udp://{}:{}",
            host_for_url(&config.target_ip),
            config.target_port
        ),
    ];

    tracing::debug!("FFmpeg command: {} {}", FFMPEG, args.join(" "));
    args
}

/// IPv6 literals need brackets inside a URL.
fn host_for_url(ip: &str) -> String {
    if ip.contains(':') && !ip.starts_with('[') {
        format!("[{ip}]")
    } else {
        ip.to_string()
    }
}
