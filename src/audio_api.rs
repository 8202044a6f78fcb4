pub use crate::audio::{SampleBuffer, SampleId, VoiceId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleParams {
    pub voice: VoiceId,
    pub sample: SampleId,
    pub start_frame: u64, // absolute frame on the session clock
    pub gain: f32,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (that would block the audio thread), so a
    // decoded buffer is registered first (see sample_loader.rs)
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // Start a registered sample at an exact frame
    Schedule(ScheduleParams),

    // Drop a pending schedule or silence a voice that already started
    Cancel { voice: VoiceId },
}
