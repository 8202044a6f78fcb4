//! The sound provider contract the scheduler commits notes to.
//!
//! A provider resolves a sound name to a decoded buffer and starts it at an
//! absolute time on the session clock. Timing accuracy after the commit is the
//! provider's job; the caller only has to commit before the time arrives.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::SoundError;

pub mod bank;
pub mod recording;

pub use bank::{SampleBank, SampleVoice};
pub use recording::{CommitRecord, RecordedPlayback, RecordingProvider};

/// A committed playback that can still be called off.
pub trait PlaybackHandle {
    /// Stops and disconnects the playback. Calling it twice is harmless.
    fn cancel(&mut self);
}

pub trait SoundProvider {
    type Handle: PlaybackHandle;

    /// Starts `name` at absolute clock time `time` (seconds).
    fn start_at(&self, name: &str, time: f64) -> Result<Self::Handle, SoundError>;
}

impl<P: SoundProvider + ?Sized> SoundProvider for &P {
    type Handle = P::Handle;

    fn start_at(&self, name: &str, time: f64) -> Result<Self::Handle, SoundError> {
        (**self).start_at(name, time)
    }
}

impl<P: SoundProvider + ?Sized> SoundProvider for Rc<P> {
    type Handle = P::Handle;

    fn start_at(&self, name: &str, time: f64) -> Result<Self::Handle, SoundError> {
        (**self).start_at(name, time)
    }
}

impl<P: SoundProvider + ?Sized> SoundProvider for Arc<P> {
    type Handle = P::Handle;

    fn start_at(&self, name: &str, time: f64) -> Result<Self::Handle, SoundError> {
        (**self).start_at(name, time)
    }
}
