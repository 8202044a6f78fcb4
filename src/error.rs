use thiserror::Error;

// Command validation errors. Raised synchronously; nothing is mutated when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("step {step} is out of range (pattern has {total} steps)")]
    OutOfRange { step: usize, total: usize },

    #[error("tempo {bpm} bpm is outside {min}..={max}")]
    InvalidTempo { bpm: u32, min: u32, max: u32 },

    #[error("pattern geometry {beats_per_bar}x{steps_per_beat} must be non-zero")]
    InvalidGeometry {
        beats_per_bar: usize,
        steps_per_beat: usize,
    },

    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),
}

// Errors raised by a sound provider. Commit-time failures are logged and skipped by the player.
#[derive(Debug, Error)]
pub enum SoundError {
    #[error("sound '{0}' is not loaded")]
    NotLoaded(String),

    #[error("failed to load sound '{name}'")]
    Load {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("audio engine unavailable: {0}")]
    Unavailable(String),
}
