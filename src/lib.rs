//! Stream system audio to a phone or another host over UDP.
//!
//! The streamer does no audio work itself. It drives two host tools:
//!
//! - **pactl** - lists PulseAudio sources and the default sink
//! - **ffmpeg** - captures a source, encodes it, and sends MPEG-TS over UDP
//!
//! # Architecture
//!
//! ```text
//! audio-streamer (binary)
//!     │
//!     ├── config     Config load/save (JSON under the user config dir)
//!     ├── sources    pactl parsing, ranking, selection
//!     ├── ffmpeg     argument construction
//!     ├── stream     supervised ffmpeg session + single-instance lock
//!     ├── network    UDP probe
//!     ├── tone       440 Hz test tone
//!     └── desktop    .desktop entry and install layout
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use audio_streamer::{sources, Config, StreamSession};
//!
//! let mut config = Config::default();
//! config.apply_target(Some("192.168.1.20"), Some("1234"));
//!
//! let sources = sources::list_sources()?;
//! let best = &sources[sources::select_source(&sources, None).unwrap()];
//! StreamSession::start(&config, best)?.run_until_interrupted().await?;
//! ```

pub mod config;
pub mod desktop;
pub mod ffmpeg;
pub mod lock;
pub mod logging;
pub mod network;
pub mod preflight;
pub mod process;
pub mod sources;
pub mod stream;
pub mod tone;

pub use config::Config;
pub use sources::AudioSource;
pub use stream::StreamSession;
