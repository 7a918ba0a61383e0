use anyhow::{Context, Result};
use std::path::Path;

use crate::ConfigAction;

pub(crate) fn run(config_path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = super::load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).context("serializing config")?;
            println!("{json}");
        }
        ConfigAction::Path => println!("{}", config_path.display()),
        ConfigAction::Set {
            target,
            port,
            source,
            codec,
            bitrate,
            low_latency,
        } => {
            let mut config = super::load_config(config_path)?;
            super::apply_overrides(&mut config, target.as_deref(), port);
            if let Some(source) = source {
                config.set_preferred_source(source);
            }
            if let Some(codec) = codec {
                config.audio_codec = codec;
            }
            if let Some(bitrate) = bitrate {
                config.bitrate = bitrate;
            }
            if let Some(low_latency) = low_latency {
                config.low_latency = low_latency;
            }

            config.validate()?;
            config.save(config_path)?;
            tracing::info!("Configuration saved (target: {})", config.target_display());
        }
    }
    Ok(())
}
