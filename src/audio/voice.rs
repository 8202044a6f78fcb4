use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::{SampleId, VoiceId};

// One playing instance of a sample. Lives in the engine's fixed pool.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub id: VoiceId,
    pub sample: SampleId,
    pub gain: f32,
    pub active: bool,
    pos: usize,
    delay: usize, // frames of silence before the first sample, within the next block only
}

impl Voice {
    pub fn new(id: VoiceId, sample: SampleId, gain: f32, delay: usize) -> Self {
        Self {
            id,
            sample,
            gain,
            active: true,
            pos: 0,
            delay,
        }
    }

    pub fn idle() -> Self {
        Self {
            id: VoiceId(u64::MAX),
            sample: SampleId(u64::MAX),
            gain: 0.0,
            active: false,
            pos: 0,
            delay: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    // mix this voice into `out`, starting `delay` frames into the block
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        let start = self.delay.min(out.len());
        self.delay -= start;

        let remaining = buffer.data.len().saturating_sub(self.pos);
        let n = remaining.min(out.len() - start);
        let src = &buffer.data[self.pos..self.pos + n];
        for (frame, sample) in out[start..start + n].iter_mut().zip(src) {
            frame.left += sample.left * self.gain;
            frame.right += sample.right * self.gain;
        }
        self.pos += n;

        if self.pos >= buffer.data.len() {
            self.active = false;
        }
    }
}
