use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::AudioCommand;

pub mod clock;
mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod voice;

pub use clock::{AudioClock, FrameClock, ManualClock, install_session_clock, session_clock};
pub use engine::Engine;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{SampleId, VoiceId, next_sample_id, next_voice_id};

const COMMAND_QUEUE: usize = 1024;
const SCRATCH_FRAMES: usize = 4096;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: FrameClock,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn sender(&self) -> Sender<AudioCommand> {
        self.tx.clone()
    }

    pub fn clock(&self) -> FrameClock {
        self.clock.clone()
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;
    let clock = install_session_clock(sample_rate);
    tracing::info!("audio output: {} Hz, {} channels", sample_rate, channels);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, clock.clone(), channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                clock,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    clock: FrameClock,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(clock);
    let mut scratch = vec![StereoFrame::zero(); SCRATCH_FRAMES];

    let err_fn = |err| tracing::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                let frames = &mut scratch[..chunk.len() / channels];
                engine.render_block(frames);
                write_interleaved(frames, chunk, channels);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// Spread stereo frames across the device's channel layout
fn write_interleaved(frames: &[StereoFrame], out: &mut [f32], channels: usize) {
    for (frame, slot) in frames.iter().zip(out.chunks_exact_mut(channels)) {
        match slot {
            [mono] => *mono = frame.mono(),
            [left, right, rest @ ..] => {
                *left = frame.left;
                *right = frame.right;
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}
