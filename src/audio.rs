//! Audio loading — WAV decoding via [`hound`], mono downmix.
//!
//! The file is decoded once per run into a mono `f32` buffer in `[-1.0, 1.0]`
//! and then shared read-only by every pitch extraction.

use std::path::Path;

use tracing::debug;

use crate::error::{MoraError, Result};

/// Decoded mono audio at its native sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Decode a WAV file (integer PCM of any width, or 32-bit float).
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader =
            hound::WavReader::open(path).map_err(|e| MoraError::audio_read(path, e))?;
        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(MoraError::audio_read(
                path,
                format!("bad WAV header ({} channels, {} Hz)", spec.channels, spec.sample_rate),
            ));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| MoraError::audio_read(path, e))?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| MoraError::audio_read(path, e))?
            }
        };

        let audio = Self::from_interleaved(&interleaved, spec.channels, spec.sample_rate);
        debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            duration = audio.duration(),
            "decoded audio"
        );
        Ok(audio)
    }

    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { sample_rate, channels: 1, samples }
    }

    /// Average interleaved channels into one. A trailing partial frame is dropped.
    pub fn from_interleaved(interleaved: &[f32], channels: u16, sample_rate: u32) -> Self {
        let samples = if channels <= 1 {
            interleaved.to_vec()
        } else {
            interleaved
                .chunks_exact(channels as usize)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };
        Self { sample_rate, channels: channels.max(1), samples }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the source before downmixing.
    pub fn source_channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples in `[start_ms, end_ms)`, clamped to the buffer.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> &[f32] {
        let to_index = |ms: u64| {
            let i = ms.saturating_mul(self.sample_rate as u64) / 1000;
            (i as usize).min(self.samples.len())
        };
        let (start, end) = (to_index(start_ms), to_index(end_ms));
        if start >= end {
            return &[];
        }
        &self.samples[start..end]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_stereo_downmix() {
        let audio = AudioBuffer::from_interleaved(&[0.2, 0.4, -1.0, 1.0], 2, 8_000);
        let samples = audio.samples();
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.3).abs() < 1e-6);
        assert_eq!(samples[1], 0.0);
        assert_eq!(audio.source_channels(), 2);
        assert!((audio.duration() - 2.0 / 8_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_slice_ms() {
        let audio = AudioBuffer::from_mono((0..1000).map(|i| i as f32).collect(), 1_000);
        let slice = audio.slice_ms(100, 250);
        assert_eq!(slice.len(), 150);
        assert_eq!(slice[0], 100.0);
        assert!(audio.slice_ms(900, 5_000).len() == 100);
        assert!(audio.slice_ms(300, 300).is_empty());
        assert!(audio.slice_ms(400, 300).is_empty());
    }

    #[test]
    fn test_open_decodes_and_downmixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<i16> = (0..48_000).map(|i| if i % 2 == 0 { 16_384 } else { -16_384 }).collect();
        write_wav(&path, 2, 24_000, &frames);

        let audio = AudioBuffer::open(&path).unwrap();
        assert_eq!(audio.sample_rate(), 24_000);
        assert_eq!(audio.samples().len(), 24_000);
        assert!((audio.duration() - 1.0).abs() < 1e-9);
        // Opposite-phase channels cancel out.
        assert!(audio.samples().iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn test_open_missing_file() {
        let err = AudioBuffer::open(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, MoraError::AudioRead { .. }));
    }

    #[test]
    fn test_open_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        std::fs::write(&path, b"this is not a riff file").unwrap();
        assert!(matches!(AudioBuffer::open(&path), Err(MoraError::AudioRead { .. })));
    }
}
