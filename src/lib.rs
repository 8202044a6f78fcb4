//! steptty - a terminal step sequencer driven by a lookahead scheduler.
//!
//! Players tick on a coarse host timer and commit every step due in the next
//! lookahead window to the audio engine at an absolute frame, so playback
//! timing is set by the audio clock and not by when the tick happened to run.

pub mod audio;
pub mod audio_api;
pub mod config;
pub mod error;
pub mod loader;
pub mod middle;
pub mod pipeline;
pub mod scheduler;
pub mod shared;
pub mod sound;
pub mod tui;

pub use audio::{AudioClock, FrameClock, ManualClock};
pub use config::{SchedulerConfig, TempoRange};
pub use error::{SequencerError, SoundError};
pub use pipeline::Pattern;
pub use scheduler::{Player, TransportState, VisualEvent};
pub use sound::{PlaybackHandle, SoundProvider};
