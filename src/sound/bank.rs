use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crossbeam_channel::{Sender, TrySendError};

use crate::audio::{FrameClock, SampleId, VoiceId, next_voice_id};
use crate::audio_api::{AudioCommand, ScheduleParams};
use crate::error::SoundError;
use crate::loader::sample_loader;

use super::{PlaybackHandle, SoundProvider};

const DEFAULT_GAIN: f32 = 0.8;

// Sound provider backed by the realtime engine: holds the name -> sample mapping
// and turns absolute times into frames on the session clock.
pub struct SampleBank {
    tx: Sender<AudioCommand>,
    clock: FrameClock,
    loaded: HashMap<String, SampleId>,
}

impl SampleBank {
    pub fn new(tx: Sender<AudioCommand>, clock: FrameClock) -> Self {
        Self {
            tx,
            clock,
            loaded: HashMap::new(),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Decodes every source and registers it with the engine.
    ///
    /// Stops at the first failure, naming the entry that could not be loaded.
    /// Entries decoded before the failure stay registered.
    pub fn load_all(&mut self, sources: &BTreeMap<String, PathBuf>) -> Result<(), SoundError> {
        let rate = self.clock.sample_rate();
        for (name, path) in sources {
            let (id, buffer) =
                sample_loader::load(path, rate).map_err(|source| SoundError::Load {
                    name: name.clone(),
                    source,
                })?;
            let frames = buffer.len();
            self.send(AudioCommand::RegisterSample { id, buffer })
                .map_err(|e| SoundError::Load {
                    name: name.clone(),
                    source: anyhow::Error::new(e),
                })?;
            self.loaded.insert(name.clone(), id);
            tracing::info!("loaded sound '{}' ({} frames) from {}", name, frames, path.display());
        }
        Ok(())
    }

    fn send(&self, cmd: AudioCommand) -> Result<(), SoundError> {
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => SoundError::Unavailable("command queue full".into()),
            TrySendError::Disconnected(_) => {
                SoundError::Unavailable("audio engine disconnected".into())
            }
        })
    }
}

impl SoundProvider for SampleBank {
    type Handle = SampleVoice;

    fn start_at(&self, name: &str, time: f64) -> Result<SampleVoice, SoundError> {
        let sample = *self
            .loaded
            .get(name)
            .ok_or_else(|| SoundError::NotLoaded(name.to_string()))?;
        let voice = next_voice_id();
        self.send(AudioCommand::Schedule(ScheduleParams {
            voice,
            sample,
            start_frame: self.clock.frame_at(time),
            gain: DEFAULT_GAIN,
        }))?;
        tracing::debug!("scheduled '{}' at {:.4}s", name, time);
        Ok(SampleVoice {
            voice,
            tx: self.tx.clone(),
            cancelled: false,
        })
    }
}

pub struct SampleVoice {
    voice: VoiceId,
    tx: Sender<AudioCommand>,
    cancelled: bool,
}

impl SampleVoice {
    pub fn id(&self) -> VoiceId {
        self.voice
    }
}

impl PlaybackHandle for SampleVoice {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if self.tx.try_send(AudioCommand::Cancel { voice: self.voice }).is_err() {
            tracing::warn!("could not cancel voice {:?}: audio queue unavailable", self.voice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_click(path: &Path, rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in [i16::MAX, 0, 0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn bank() -> (SampleBank, crossbeam_channel::Receiver<AudioCommand>) {
        let (tx, rx) = crossbeam_channel::bounded(16);
        (SampleBank::new(tx, FrameClock::new(1_000)), rx)
    }

    #[test]
    fn start_at_unknown_name_is_not_loaded() {
        let (bank, rx) = bank();
        assert!(matches!(
            bank.start_at("shake", 1.0),
            Err(SoundError::NotLoaded(name)) if name == "shake"
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn load_all_registers_and_schedules_by_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shake.wav");
        write_click(&path, 1_000);
        let (mut bank, rx) = bank();

        let sources = BTreeMap::from([("shake".to_string(), path)]);
        bank.load_all(&sources).unwrap();
        assert!(bank.is_loaded("shake"));
        assert!(matches!(rx.try_recv(), Ok(AudioCommand::RegisterSample { .. })));

        let handle = bank.start_at("shake", 0.5).unwrap();
        match rx.try_recv() {
            Ok(AudioCommand::Schedule(params)) => {
                assert_eq!(params.start_frame, 500);
                assert_eq!(params.voice, handle.id());
            }
            other => panic!("expected a schedule, got {other:?}"),
        }
    }

    #[test]
    fn load_error_names_the_failed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("shake.wav");
        write_click(&good, 1_000);
        let (mut bank, _rx) = bank();

        let sources = BTreeMap::from([
            ("sangban".to_string(), dir.path().join("missing.wav")),
            ("shake".to_string(), good),
        ]);
        match bank.load_all(&sources) {
            Err(SoundError::Load { name, .. }) => assert_eq!(name, "sangban"),
            other => panic!("expected a load error, got {other:?}"),
        }
    }

    #[test]
    fn cancel_is_sent_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shake.wav");
        write_click(&path, 1_000);
        let (mut bank, rx) = bank();
        bank.load_all(&BTreeMap::from([("shake".to_string(), path)])).unwrap();

        let mut handle = bank.start_at("shake", 0.1).unwrap();
        let _ = rx.try_iter().count();
        handle.cancel();
        handle.cancel();
        let cancels: Vec<_> = rx.try_iter().collect();
        assert_eq!(cancels.len(), 1);
        assert!(matches!(cancels[0], AudioCommand::Cancel { voice } if voice == handle.id()));
    }

    #[test]
    fn disconnected_engine_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shake.wav");
        write_click(&path, 1_000);
        let (mut bank, rx) = bank();
        bank.load_all(&BTreeMap::from([("shake".to_string(), path)])).unwrap();
        drop(rx);
        assert!(matches!(
            bank.start_at("shake", 0.1),
            Err(SoundError::Unavailable(_))
        ));
    }
}
