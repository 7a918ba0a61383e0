use anyhow::{bail, Result};
use std::path::Path;

use audio_streamer::ffmpeg::player_url;
use audio_streamer::lock::StreamLock;
use audio_streamer::preflight::check_host_tools;
use audio_streamer::sources::{list_sources, select_source, AudioSource};
use audio_streamer::StreamSession;

pub(crate) async fn run(
    config_path: &Path,
    source: Option<String>,
    target: Option<String>,
    port: Option<u16>,
    save: bool,
) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    super::apply_overrides(&mut config, target.as_deref(), port);
    config.validate()?;

    if !config.is_ip_configured() {
        bail!(
            "Please set target IP address (pass --target <ip> or run `audio-streamer config set --target <ip>`)"
        );
    }

    let lock_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let _lock = StreamLock::acquire(lock_dir)?;

    check_host_tools()?;

    let sources = list_sources()?;
    let chosen = choose_source(&sources, source.as_deref(), config.preferred_source.as_deref())?;

    let session = StreamSession::start(&config, chosen)?;

    if save {
        config.set_preferred_source(chosen.name.clone());
        config.save(config_path)?;
        tracing::info!("Configuration saved");
    }

    tracing::info!(
        "VLC on phone: {} (press Ctrl-C to stop)",
        player_url(config.target_port)
    );
    session.run_until_interrupted().await
}

fn choose_source<'a>(
    sources: &'a [AudioSource],
    requested: Option<&str>,
    preferred: Option<&str>,
) -> Result<&'a AudioSource> {
    if let Some(name) = requested {
        if let Some(source) = sources.iter().find(|s| s.name == name) {
            return Ok(source);
        }
        let available = sources
            .iter()
            .map(|s| format!("  {}", s.name))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("unknown audio source '{}'; available:\n{}", name, available);
    }

    let Some(index) = select_source(sources, preferred) else {
        bail!("No audio sources found");
    };
    let source = &sources[index];
    tracing::info!("Auto-selected: {}", source.description);
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_streamer::sources::{classify, rank, RawSource};
    use audio_streamer::Config;
    use tempfile::TempDir;

    fn sources() -> Vec<AudioSource> {
        let raw = vec![
            RawSource {
                name: "mic".into(),
                description: "Microphone".into(),
                state: "IDLE".into(),
            },
            RawSource {
                name: "speakers.monitor".into(),
                description: "Monitor of Speakers".into(),
                state: "RUNNING".into(),
            },
        ];
        let mut sources = classify(raw, Some("speakers.monitor"));
        rank(&mut sources);
        sources
    }

    #[test]
    fn test_requested_source_wins() {
        let sources = sources();
        let chosen = choose_source(&sources, Some("mic"), Some("speakers.monitor")).unwrap();
        assert_eq!(chosen.name, "mic");
    }

    #[test]
    fn test_unknown_requested_source_lists_available() {
        let sources = sources();
        let err = choose_source(&sources, Some("nope"), None).unwrap_err().to_string();
        assert!(err.contains("speakers.monitor"));
        assert!(err.contains("mic"));
    }

    #[test]
    fn test_falls_back_to_best() {
        let sources = sources();
        let chosen = choose_source(&sources, None, Some("unplugged.monitor")).unwrap();
        assert_eq!(chosen.name, "speakers.monitor");
        assert!(choose_source(&[], None, None).is_err());
    }

    #[tokio::test]
    async fn test_refused_stream_does_not_save_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.json");
        let mut config = Config::default();
        config.apply_target(Some("10.0.0.1"), None);
        config.save(&config_path).unwrap();

        let _running = StreamLock::acquire(temp.path()).unwrap();
        let err = run(&config_path, None, Some("10.0.0.2".into()), Some(5000), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already running"));

        let on_disk = Config::load_or_create(&config_path).unwrap();
        assert_eq!(on_disk, config);
    }
}
