use anyhow::{Context, Result};
use std::path::Path;

use audio_streamer::sources::{display_label, list_sources, select_source};

pub(crate) fn list(config_path: &Path, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let sources = list_sources()?;

    if json {
        let out = serde_json::to_string_pretty(&sources).context("serializing sources")?;
        println!("{out}");
        return Ok(());
    }

    if sources.is_empty() {
        tracing::warn!("No audio sources found");
        return Ok(());
    }

    let selected = select_source(&sources, config.preferred_source.as_deref());
    for (i, source) in sources.iter().enumerate() {
        let marker = if Some(i) == selected { "▶" } else { " " };
        println!("{marker} {}", display_label(source));
        tracing::debug!("    {} [{}]", source.name, source.state);
    }
    println!();
    println!("Legend: ⚡ = Active/Running  ⭐ = Default");

    Ok(())
}
