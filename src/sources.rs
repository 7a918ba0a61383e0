//! PulseAudio source discovery via `pactl`.
//!
//! Sources are ranked so the one most likely to carry what the user is
//! hearing comes first: an actively running source, then the monitor of the
//! default sink, then any monitor over a microphone.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt;

use crate::process::Cmd;

const SOURCE_BLOCK_MARKER: &str = "Source #";
const MONITOR_MARKER: &str = ".monitor";

/// PulseAudio source state as reported by `pactl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    Running,
    Idle,
    Suspended,
    Other(String),
}

impl SourceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "RUNNING" => Self::Running,
            "IDLE" => Self::Idle,
            "SUSPENDED" => Self::Suspended,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Idle => f.write_str("IDLE"),
            Self::Suspended => f.write_str("SUSPENDED"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// One `Source #N` block from `pactl list sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    pub name: String,
    pub description: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioSource {
    pub name: String,
    pub description: String,
    pub state: SourceState,
    pub is_monitor: bool,
    /// Only `RUNNING` counts; idle and suspended sources are not running.
    pub is_running: bool,
    /// Monitor of the default output sink.
    pub is_default: bool,
}

impl AudioSource {
    fn score(&self) -> u8 {
        let mut score = 0;
        if self.is_running {
            score += 4;
        }
        if self.is_default {
            score += 2;
        }
        if self.is_monitor {
            score += 1;
        }
        score
    }
}

/// Parse `pactl list sources` output.
///
/// Blocks lacking a name, description or state are skipped.
pub fn parse_pactl_sources(output: &str) -> Vec<RawSource> {
    let mut sources = Vec::new();

    for block in output.split(SOURCE_BLOCK_MARKER) {
        if block.trim().is_empty() {
            continue;
        }

        let mut name = None;
        let mut description = None;
        let mut state = None;

        for line in block.lines() {
            let trimmed = line.trim();
            if let Some(val) = trimmed.strip_prefix("Name:") {
                name = Some(val.trim().to_string());
            } else if let Some(val) = trimmed.strip_prefix("Description:") {
                description = Some(val.trim().to_string());
            } else if let Some(val) = trimmed.strip_prefix("State:") {
                state = Some(val.trim().to_string());
            }
        }

        if let (Some(name), Some(description), Some(state)) = (name, description, state) {
            sources.push(RawSource {
                name,
                description,
                state,
            });
        }
    }

    sources
}

/// Turn parsed blocks into sources, flagging the default sink's monitor.
pub fn classify(raw: Vec<RawSource>, default_monitor: Option<&str>) -> Vec<AudioSource> {
    raw.into_iter()
        .map(|RawSource { name, description, state }| {
            let state = SourceState::parse(&state);
            AudioSource {
                is_monitor: name.contains(MONITOR_MARKER),
                is_running: state == SourceState::Running,
                is_default: default_monitor.is_some_and(|m| m == name),
                name,
                description,
                state,
            }
        })
        .collect()
}

/// Sort best-first: by score descending, then by description.
pub fn rank(sources: &mut [AudioSource]) {
    sources.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| a.description.cmp(&b.description))
    });
}

/// Index of the source to stream from.
///
/// The preferred source wins while it is still present; otherwise the first
/// (best-ranked) entry.
pub fn select_source(sources: &[AudioSource], preferred: Option<&str>) -> Option<usize> {
    if sources.is_empty() {
        return None;
    }

    preferred
        .and_then(|p| sources.iter().position(|s| s.name == p))
        .or(Some(0))
}

/// One-line label: kind marker, description, then running/default markers.
pub fn display_label(source: &AudioSource) -> String {
    let icon = if source.is_monitor { "🔊" } else { "🎤" };
    format!(
        "{} {}{}{}",
        icon,
        source.description,
        if source.is_running { " ⚡" } else { "" },
        if source.is_default { " ⭐" } else { "" },
    )
}

/// Run `pactl` with `args` and return its stdout.
fn pactl(args: &[&str]) -> Result<String> {
    let result = Cmd::new("pactl")
        .args(args)
        .error_msg(format!("'pactl {}' failed", args.join(" ")))
        .run()?;
    Ok(result.stdout)
}

/// Name of the monitor for the default output sink.
pub fn default_sink_monitor() -> Result<String> {
    default_sink_monitor_with(pactl)
}

/// Query PulseAudio and return all sources, best first.
pub fn list_sources() -> Result<Vec<AudioSource>> {
    list_sources_with(pactl)
}

fn default_sink_monitor_with<F>(pactl: F) -> Result<String>
where
    F: Fn(&[&str]) -> Result<String>,
{
    let sink = pactl(&["get-default-sink"]).context("Failed to get default sink")?;
    let sink = sink.trim();
    if sink.is_empty() {
        bail!("pactl reported no default sink");
    }
    Ok(format!("{}{}", sink, MONITOR_MARKER))
}

/// `list_sources` over an injectable `pactl` runner.
///
/// Failing to list sources is an error; failing to read the default sink
/// only means no source is flagged as default.
fn list_sources_with<F>(pactl: F) -> Result<Vec<AudioSource>>
where
    F: Fn(&[&str]) -> Result<String>,
{
    let listing = pactl(&["list", "sources"]).context("Failed to list sources")?;

    let default_monitor = match default_sink_monitor_with(&pactl) {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::warn!("could not determine default sink: {e:#}");
            None
        }
    };

    let mut sources = classify(parse_pactl_sources(&listing), default_monitor.as_deref());
    rank(&mut sources);
    tracing::debug!("found {} audio sources", sources.len());
    Ok(sources)
}
