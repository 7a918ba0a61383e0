use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "audio-streamer",
    version,
    about = "Stream system audio to phone via UDP",
    arg_required_else_help = true
)]
pub(crate) struct Args {
    /// Set output verbosity (-v shows ffmpeg output)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Use custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List audio sources, best candidate first
    Sources {
        /// Print sources as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stream an audio source until Ctrl-C
    Stream {
        /// PulseAudio source name (default: preferred, else best ranked)
        #[arg(short, long)]
        source: Option<String>,

        /// Receiver IP address
        #[arg(short, long)]
        target: Option<String>,

        /// Receiver UDP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Persist target and source to the config file
        #[arg(long)]
        save: bool,
    },

    /// Send a single UDP test packet to the receiver
    TestNetwork {
        /// Receiver IP address
        #[arg(short, long)]
        target: Option<String>,

        /// Receiver UDP port
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Send a 5 second 440Hz test tone to the receiver
    TestTone {
        /// Receiver IP address
        #[arg(short, long)]
        target: Option<String>,

        /// Receiver UDP port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or edit the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check that pactl and ffmpeg are installed
    Check,

    /// Print the desktop entry, or install it into a directory
    DesktopEntry {
        /// Directory to write audio-streamer.desktop into
        #[arg(long, value_name = "DIR")]
        install: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the configuration as JSON
    Show,

    /// Print the configuration file path
    Path,

    /// Update settings and save
    Set {
        /// Receiver IP address
        #[arg(short, long)]
        target: Option<String>,

        /// Receiver UDP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Preferred PulseAudio source name
        #[arg(short, long)]
        source: Option<String>,

        /// ffmpeg audio encoder
        #[arg(long)]
        codec: Option<String>,

        /// Encoder bitrate, e.g. 192k
        #[arg(long)]
        bitrate: Option<String>,

        /// Enable low-latency ffmpeg flags
        #[arg(long)]
        low_latency: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    audio_streamer::logging::setup_logging(args.verbose, args.quiet);

    commands::dispatch(args).await
}
