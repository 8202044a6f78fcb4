use std::time::Duration;

use crate::error::SequencerError;

pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_millis(100);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(25);
pub const DEFAULT_MIN_BPM: u32 = 30;
pub const DEFAULT_MAX_BPM: u32 = 300;

/// Inclusive tempo bounds in beats per minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TempoRange {
    pub min: u32,
    pub max: u32,
}

impl TempoRange {
    pub fn contains(&self, bpm: u32) -> bool {
        (self.min..=self.max).contains(&bpm)
    }

    pub fn check(&self, bpm: u32) -> Result<u32, SequencerError> {
        if self.contains(bpm) {
            Ok(bpm)
        } else {
            Err(SequencerError::InvalidTempo {
                bpm,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for TempoRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BPM,
            max: DEFAULT_MAX_BPM,
        }
    }
}

/// Timing knobs shared by every player in a session.
///
/// `lookahead` has to cover the tick period plus the worst tick jitter,
/// otherwise notes get committed after their due time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub lookahead: Duration,
    pub tick_interval: Duration,
    pub tempo_range: TempoRange,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SequencerError> {
        if self.tick_interval.is_zero() {
            return Err(SequencerError::InvalidConfig(
                "tick interval must be non-zero".into(),
            ));
        }
        if self.lookahead <= self.tick_interval {
            return Err(SequencerError::InvalidConfig(format!(
                "lookahead ({:?}) must exceed the tick interval ({:?})",
                self.lookahead, self.tick_interval
            )));
        }
        let range = self.tempo_range;
        if range.min == 0 || range.min > range.max {
            return Err(SequencerError::InvalidConfig(format!(
                "tempo range {}..={} is empty or starts at zero",
                range.min, range.max
            )));
        }
        Ok(())
    }

    pub fn lookahead_secs(&self) -> f64 {
        self.lookahead.as_secs_f64()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            tick_interval: DEFAULT_TICK_INTERVAL,
            tempo_range: TempoRange::default(),
        }
    }
}
