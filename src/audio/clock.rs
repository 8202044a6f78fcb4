use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Monotonic audio time in seconds.
pub trait AudioClock {
    fn now(&self) -> f64;
}

impl<C: AudioClock + ?Sized> AudioClock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: AudioClock + ?Sized> AudioClock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: AudioClock + ?Sized> AudioClock for Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

// Counts frames the engine has rendered. Only the audio thread advances it.
#[derive(Clone, Debug)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    /// Absolute frame index of `time`; times before zero map to frame 0.
    pub fn frame_at(&self, time: f64) -> u64 {
        if time <= 0.0 {
            0
        } else {
            (time * self.sample_rate as f64).round() as u64
        }
    }
}

impl AudioClock for FrameClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

static SESSION_CLOCK: OnceLock<FrameClock> = OnceLock::new();

// One clock per session: the first call creates it, later calls get the same one.
pub fn install_session_clock(sample_rate: u32) -> FrameClock {
    let clock = SESSION_CLOCK.get_or_init(|| FrameClock::new(sample_rate));
    if clock.sample_rate() != sample_rate {
        tracing::warn!(
            "session clock already runs at {} Hz, ignoring {} Hz",
            clock.sample_rate(),
            sample_rate
        );
    }
    clock.clone()
}

pub fn session_clock() -> Option<FrameClock> {
    SESSION_CLOCK.get().cloned()
}

/// Hand-driven clock for tests and offline rendering.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, time: f64) {
        self.now.set(time);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
