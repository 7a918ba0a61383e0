mod config;
mod diagnostics;
mod sources;
mod stream;

use anyhow::Result;
use std::path::{Path, PathBuf};

use audio_streamer::{config as app_config, Config};

use crate::{Args, Commands};

pub(crate) async fn dispatch(args: Args) -> Result<()> {
    let config_path = resolve_config_path(args.config)?;

    match args.command {
        Commands::Sources { json } => sources::list(&config_path, json),
        Commands::Stream {
            source,
            target,
            port,
            save,
        } => stream::run(&config_path, source, target, port, save).await,
        Commands::TestNetwork { target, port } => {
            diagnostics::test_network(&config_path, target, port).await
        }
        Commands::TestTone { target, port } => {
            diagnostics::test_tone(&config_path, target, port).await
        }
        Commands::Config { action } => config::run(&config_path, action),
        Commands::Check => diagnostics::check(),
        Commands::DesktopEntry { install } => diagnostics::desktop_entry(install.as_deref()),
    }
}

fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => Ok(path),
        None => app_config::default_path(),
    }
}

pub(crate) fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_create(path)
}

/// Apply `--target`/`--port` overrides for this invocation.
pub(crate) fn apply_overrides(config: &mut Config, target: Option<&str>, port: Option<u16>) {
    let port = port.map(|p| p.to_string());
    config.apply_target(target, port.as_deref());
}
