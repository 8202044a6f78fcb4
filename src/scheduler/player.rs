//! The lookahead scheduler for one pattern.
//!
//! A [`Player`] is ticked on a coarse, jittery cadence. Each tick commits every
//! step due within the lookahead window to the sound provider at its exact
//! absolute time, so the audio side plays sample-accurately no matter when the
//! tick itself ran. Highlights are queued against the same clock.

use tracing::{debug, info, warn};

use crate::audio::AudioClock;
use crate::config::SchedulerConfig;
use crate::error::SequencerError;
use crate::pipeline::pattern::Pattern;
use crate::sound::{PlaybackHandle, SoundProvider};

use super::transport::TransportState;
use super::visual::{VisualEvent, VisualQueue};

// slack for float error when deciding whether a note time has been reached
const TIME_EPSILON: f64 = 1e-9;

struct Commitment<H> {
    time: f64,
    handle: H,
}

pub struct Player<P: SoundProvider, C: AudioClock> {
    pattern: Pattern,
    provider: P,
    clock: C,
    config: SchedulerConfig,

    bpm: u32,
    note_interval: f64,
    state: TransportState,
    current_step: usize,
    // next_note_time = anchor_time + steps_since_anchor * note_interval
    anchor_time: f64,
    steps_since_anchor: u64,
    pause_offset: f64,

    playbacks: Vec<Commitment<P::Handle>>,
    visuals: VisualQueue,
    outbox: Vec<VisualEvent>,
    highlighted: Option<usize>,
}

pub fn note_interval(bpm: u32, steps_per_beat: usize) -> f64 {
    (60.0 / bpm as f64) / steps_per_beat as f64
}

impl<P: SoundProvider, C: AudioClock> Player<P, C> {
    pub fn new(
        bpm: u32,
        pattern: Pattern,
        provider: P,
        clock: C,
        config: SchedulerConfig,
    ) -> Result<Self, SequencerError> {
        config.validate()?;
        let bpm = config.tempo_range.check(bpm)?;
        Ok(Self {
            note_interval: note_interval(bpm, pattern.steps_per_beat()),
            pattern,
            provider,
            clock,
            config,
            bpm,
            state: TransportState::Stopped,
            current_step: 0,
            anchor_time: 0.0,
            steps_since_anchor: 0,
            pause_offset: 0.0,
            playbacks: Vec::new(),
            visuals: VisualQueue::new(),
            outbox: Vec::new(),
            highlighted: None,
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn note_interval(&self) -> f64 {
        self.note_interval
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn next_note_time(&self) -> f64 {
        self.anchor_time + self.steps_since_anchor as f64 * self.note_interval
    }

    pub fn pause_offset(&self) -> f64 {
        self.pause_offset
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn outstanding_playbacks(&self) -> usize {
        self.playbacks.len()
    }

    pub fn outstanding_visuals(&self) -> usize {
        self.visuals.len()
    }

    /// Starts or resumes playback from the stored phase.
    pub fn start(&mut self) {
        if self.state.is_playing() {
            return;
        }
        let now = self.clock.now();
        self.anchor_time = now + self.pause_offset * self.note_interval;
        self.steps_since_anchor = 0;
        self.pause_offset = 0.0;
        self.state = TransportState::Playing;
        info!(
            "{}: playing from step {} at {:.4}s",
            self.pattern.name(),
            self.current_step,
            self.anchor_time
        );
        self.tick();
    }

    /// Pauses, keeping the fractional step phase for the next start.
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let now = self.clock.now();
        self.rewind_unsounded(now);
        self.pause_offset = (self.next_note_time() - now) / self.note_interval;
        self.cancel_commitments();
        self.state = TransportState::Paused;
        info!(
            "{}: paused at step {} (offset {:.3} steps)",
            self.pattern.name(),
            self.current_step,
            self.pause_offset
        );
    }

    pub fn stop(&mut self) {
        self.cancel_commitments();
        self.state = TransportState::Stopped;
        self.current_step = 0;
        self.pause_offset = 0.0;
        self.steps_since_anchor = 0;
        self.highlighted = None;
        self.outbox.push(VisualEvent::HighlightCleared);
        info!("{}: stopped", self.pattern.name());
    }

    pub fn set_tempo(&mut self, bpm: u32) -> Result<(), SequencerError> {
        let bpm = self.config.tempo_range.check(bpm).inspect_err(|e| {
            warn!("{}: tempo change rejected: {}", self.pattern.name(), e);
        })?;
        let was_playing = self.state.is_playing();
        if was_playing {
            self.pause();
        }
        self.bpm = bpm;
        self.note_interval = note_interval(bpm, self.pattern.steps_per_beat());
        info!("{}: tempo {} bpm", self.pattern.name(), bpm);
        if was_playing {
            self.start();
        }
        Ok(())
    }

    /// Flips `step` and returns its new state.
    pub fn toggle_step(&mut self, step: usize) -> Result<bool, SequencerError> {
        self.pattern.toggle(step)
    }

    /// One pass of the lookahead loop. Returns how many notes were committed.
    pub fn tick(&mut self) -> usize {
        if !self.state.is_playing() {
            return 0;
        }
        let now = self.clock.now();
        self.release_sounded(now);

        let horizon = now + self.config.lookahead_secs();
        let total = self.pattern.total_steps();
        let mut committed = 0;
        while self.next_note_time() < horizon {
            let time = self.next_note_time();
            if self.pattern.is_active(self.current_step).unwrap_or(false)
                && self.commit(self.current_step, time, now)
            {
                committed += 1;
            }
            self.steps_since_anchor += 1;
            self.current_step = (self.current_step + 1) % total;
        }
        committed
    }

    /// Highlight events whose time has come, plus any pending clear.
    pub fn poll_events(&mut self) -> Vec<VisualEvent> {
        let now = self.clock.now();
        let mut events = std::mem::take(&mut self.outbox);
        for event in self.visuals.drain_due(now) {
            if let VisualEvent::StepHighlighted { step, .. } = event {
                self.highlighted = Some(step);
            }
            events.push(event);
        }
        events
    }

    fn commit(&mut self, step: usize, time: f64, now: f64) -> bool {
        let sound = self.pattern.sound_name();
        let started = match self.provider.start_at(sound, time) {
            Ok(handle) => {
                self.playbacks.push(Commitment { time, handle });
                debug!("{}: step {} at {:.4}s", self.pattern.name(), step, time);
                true
            }
            Err(err) => {
                warn!("{}: skipping step {}: {}", self.pattern.name(), step, err);
                false
            }
        };
        // delayed by (time - now) so it fires when the note is heard; late notes fire right away
        self.visuals.schedule(time.max(now), step);
        started
    }

    // Steps committed inside the window but not yet heard lose their playback
    // on pause, so the cursor goes back to the first of them.
    fn rewind_unsounded(&mut self, now: f64) {
        let ahead = (self.next_note_time() - now) / self.note_interval;
        if ahead <= 0.0 {
            return;
        }
        let back = ((ahead + TIME_EPSILON).floor() as u64).min(self.steps_since_anchor);
        if back == 0 {
            return;
        }
        let total = self.pattern.total_steps() as u64;
        self.steps_since_anchor -= back;
        self.current_step = ((self.current_step as u64 + total - back % total) % total) as usize;
    }

    // A schedule can reach the engine up to a block after its time, so a handle
    // stays cancellable for one lookahead past the note.
    fn release_sounded(&mut self, now: f64) {
        let margin = self.config.lookahead_secs();
        self.playbacks.retain(|c| c.time + margin + TIME_EPSILON >= now);
    }

    fn cancel_commitments(&mut self) {
        for mut commitment in self.playbacks.drain(..) {
            commitment.handle.cancel();
        }
        let dropped = self.visuals.cancel_all();
        if dropped > 0 {
            debug!("{}: dropped {} pending highlights", self.pattern.name(), dropped);
        }
    }
}

impl<P: SoundProvider, C: AudioClock> Drop for Player<P, C> {
    fn drop(&mut self) {
        self.cancel_commitments();
    }
}
