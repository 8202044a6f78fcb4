use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SAMPLE_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_VOICE_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

// one per scheduled playback, so a cancel can find its voice again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

// atomic counters let us generate unique ids from any thread
pub fn next_sample_id() -> SampleId {
    SampleId(NEXT_SAMPLE_ID.fetch_add(1, Ordering::Relaxed))
}

pub fn next_voice_id() -> VoiceId {
    VoiceId(NEXT_VOICE_ID.fetch_add(1, Ordering::Relaxed))
}
