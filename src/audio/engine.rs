use std::collections::HashMap;

use crate::audio_api::{AudioCommand, ScheduleParams};

use super::clock::FrameClock;
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::{SampleId, VoiceId};
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so we wont malloc in audio callback
const MAX_PENDING: usize = 256;

pub struct Engine {
    clock: FrameClock,
    samples: HashMap<SampleId, SampleBuffer>,
    pending: Vec<ScheduleParams>,
    voices: [Voice; MAX_VOICES],
}

impl Engine {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            samples: HashMap::new(),
            pending: Vec::with_capacity(MAX_PENDING),
            voices: [Voice::idle(); MAX_VOICES],
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Schedule(params) => {
                // full queue drops the note rather than growing in the callback
                if self.pending.len() < MAX_PENDING {
                    self.pending.push(params);
                }
            }
            AudioCommand::Cancel { voice } => self.cancel(voice),
        }
    }

    fn cancel(&mut self, voice: VoiceId) {
        self.pending.retain(|p| p.voice != voice);
        for v in self.voices.iter_mut().filter(|v| v.active && v.id == voice) {
            v.active = false;
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    // Render one block and advance the session clock past it
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        let block_start = self.clock.frames();
        let block_end = block_start + out.len() as u64;

        // start every pending voice that begins inside this block (or is late)
        let mut i = 0;
        while i < self.pending.len() {
            let params = self.pending[i];
            if params.start_frame < block_end {
                self.pending.swap_remove(i);
                let delay = params.start_frame.saturating_sub(block_start) as usize;
                self.start_voice(params, delay);
            } else {
                i += 1;
            }
        }

        for voice in self.voices.iter_mut().filter(|v| v.active) {
            match self.samples.get(&voice.sample) {
                Some(buffer) => voice.render_into(buffer, out),
                None => voice.active = false,
            }
        }

        self.clock.advance(out.len() as u64);
    }

    fn start_voice(&mut self, params: ScheduleParams, delay: usize) {
        // steal the oldest slot when the pool is full
        let slot = self
            .voices
            .iter()
            .position(|v| !v.active)
            .unwrap_or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, v)| v.position())
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });
        self.voices[slot] = Voice::new(params.voice, params.sample, params.gain, delay);
    }
}
