use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

// A decoded one-shot, already at the device sample rate
#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn from_frames(data: Vec<StereoFrame>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file into stereo frames at `target_rate`
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        // mono is duplicated, anything past two channels is dropped
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| StereoFrame {
                left: c[0],
                right: if channels > 1 { c[1] } else { c[0] },
            })
            .collect();

        let frames = if spec.sample_rate != target_rate {
            resample_linear(&frames, spec.sample_rate, target_rate)
        } else {
            frames
        };

        Ok(Self { data: frames })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn mono_int_wav_is_duplicated_to_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("click.wav");
        write_wav(&path, 1, 44_100, &[0, 16_384, -16_384]);

        let buffer = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buffer.len(), 3);
        assert!((buffer.data[1].left - 0.5).abs() < 1e-6);
        assert_eq!(buffer.data[1].left, buffer.data[1].right);
        assert!((buffer.data[2].right + 0.5).abs() < 1e-6);
    }

    #[test]
    fn stereo_wav_keeps_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pan.wav");
        write_wav(&path, 2, 44_100, &[16_384, 0, 0, -16_384]);

        let buffer = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buffer.len(), 2);
        assert!((buffer.data[0].left - 0.5).abs() < 1e-6);
        assert_eq!(buffer.data[0].right, 0.0);
        assert!((buffer.data[1].right + 0.5).abs() < 1e-6);
    }

    #[test]
    fn resampling_scales_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("up.wav");
        write_wav(&path, 1, 24_000, &[0; 240]);

        let buffer = SampleBuffer::load_wav(&path, 48_000).unwrap();
        assert_eq!(buffer.len(), 480);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SampleBuffer::load_wav(&dir.path().join("nope.wav"), 44_100).is_err());
    }
}
