// The step data a player reads on every tick and the UI mutates on toggle.

use std::collections::BTreeSet;

use crate::error::SequencerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    sound_name: String, // key into the sound provider
    beats_per_bar: usize,
    steps_per_beat: usize,
    active_steps: BTreeSet<usize>,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        sound_name: impl Into<String>,
        beats_per_bar: usize,
        steps_per_beat: usize,
        initial_steps: impl IntoIterator<Item = usize>,
    ) -> Result<Self, SequencerError> {
        if beats_per_bar == 0 || steps_per_beat == 0 {
            return Err(SequencerError::InvalidGeometry {
                beats_per_bar,
                steps_per_beat,
            });
        }
        let mut pattern = Self {
            name: name.into(),
            sound_name: sound_name.into(),
            beats_per_bar,
            steps_per_beat,
            active_steps: BTreeSet::new(),
        };
        for step in initial_steps {
            pattern.check(step)?;
            pattern.active_steps.insert(step);
        }
        Ok(pattern)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sound_name(&self) -> &str {
        &self.sound_name
    }

    pub fn beats_per_bar(&self) -> usize {
        self.beats_per_bar
    }

    pub fn steps_per_beat(&self) -> usize {
        self.steps_per_beat
    }

    pub fn total_steps(&self) -> usize {
        self.beats_per_bar * self.steps_per_beat
    }

    pub fn is_active(&self, step: usize) -> Result<bool, SequencerError> {
        self.check(step)?;
        Ok(self.active_steps.contains(&step))
    }

    /// Flips membership of `step` and returns its new state.
    pub fn toggle(&mut self, step: usize) -> Result<bool, SequencerError> {
        self.check(step)?;
        if self.active_steps.remove(&step) {
            Ok(false)
        } else {
            self.active_steps.insert(step);
            Ok(true)
        }
    }

    /// Active steps in ascending order.
    pub fn active_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_steps.iter().copied()
    }

    fn check(&self, step: usize) -> Result<(), SequencerError> {
        let total = self.total_steps();
        if step < total {
            Ok(())
        } else {
            Err(SequencerError::OutOfRange { step, total })
        }
    }
}
