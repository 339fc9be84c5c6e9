//! Per-mora pitch measurement.
//!
//! For every mora the audio window `[start, end)` (millisecond resolution) is
//! cut from the shared mono buffer and scanned with frames of `frame_size`
//! samples at `hop_size` (50 % overlap by default). Both are expressed at the
//! configured analysis rate; audio at another rate is scanned with frames
//! scaled to the same time span, so the lowest detectable pitch does not
//! depend on the recording rate. Each frame yields one
//! estimate from a [`PitchDetector`]; unvoiced frames (estimate ≤ 0) are
//! dropped and the mora pitch is the mean of the rest, or `0.0` if none were
//! voiced.
//!
//! The bundled detector is [`Yin`] (de Cheveigné & Kawahara, 2002).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocate::round_to;
use crate::audio::AudioBuffer;
use crate::query::Mora;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Unit the mora pitch is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchUnit {
    /// Hertz, rounded to 2 decimals.
    #[default]
    Hz,
    /// Kilohertz, rounded to 7 decimals.
    Khz,
}

impl PitchUnit {
    pub fn report(self, hz: f64) -> f64 {
        match self {
            PitchUnit::Hz => round_to(hz, 2),
            PitchUnit::Khz => round_to(hz / 1000.0, 7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Rate `frame_size` and `hop_size` are expressed at.
    pub sample_rate: u32,
    pub frame_size: usize,
    /// Defaults to `frame_size / 2`.
    pub hop_size: Option<usize>,
    /// Largest normalised difference still accepted as voiced.
    pub tolerance: f32,
    pub unit: PitchUnit,
}

impl PitchConfig {
    pub fn hop(&self) -> usize {
        self.hop_size.unwrap_or(self.frame_size / 2).max(1)
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self { sample_rate: 24_000, frame_size: 512, hop_size: None, tolerance: 0.8, unit: PitchUnit::Hz }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detector
// ─────────────────────────────────────────────────────────────────────────────

/// Single-frame fundamental frequency estimator.
pub trait PitchDetector {
    /// Estimate in Hz; `0.0` when the frame is unvoiced.
    fn detect(&mut self, frame: &[f32]) -> f32;
}

/// YIN estimator with an absolute threshold on the cumulative mean
/// normalised difference.
#[derive(Debug, Clone)]
pub struct Yin {
    sample_rate: u32,
    tolerance: f32,
    cmnd: Vec<f32>,
}

impl Yin {
    pub fn new(sample_rate: u32, tolerance: f32) -> Self {
        Self { sample_rate, tolerance, cmnd: Vec::new() }
    }

    /// Cumulative mean normalised difference for lags `0..frame.len() / 2`.
    fn difference(&mut self, frame: &[f32]) {
        let half = frame.len() / 2;
        self.cmnd.clear();
        self.cmnd.resize(half, 1.0);

        let mut running = 0.0f32;
        for tau in 1..half {
            let d: f32 = (0..half)
                .map(|j| {
                    let delta = frame[j] - frame[j + tau];
                    delta * delta
                })
                .sum();
            running += d;
            self.cmnd[tau] = if running > 0.0 { d * tau as f32 / running } else { 1.0 };
        }
    }

    /// Sub-sample lag by fitting a parabola through the neighbours of `tau`.
    fn refine(&self, tau: usize) -> f32 {
        if tau == 0 || tau + 1 >= self.cmnd.len() {
            return tau as f32;
        }
        let (s0, s1, s2) = (self.cmnd[tau - 1], self.cmnd[tau], self.cmnd[tau + 1]);
        let denom = 2.0 * (2.0 * s1 - s2 - s0);
        if denom.abs() < f32::EPSILON {
            tau as f32
        } else {
            tau as f32 + (s2 - s0) / denom
        }
    }
}

impl PitchDetector for Yin {
    fn detect(&mut self, frame: &[f32]) -> f32 {
        if frame.len() < 4 {
            return 0.0;
        }
        self.difference(frame);

        let half = self.cmnd.len();
        let mut tau = 2;
        while tau < half {
            if self.cmnd[tau] < self.tolerance {
                while tau + 1 < half && self.cmnd[tau + 1] < self.cmnd[tau] {
                    tau += 1;
                }
                // Still descending at the largest lag: the period is out of range.
                if tau + 1 >= half {
                    return 0.0;
                }
                let lag = self.refine(tau);
                return if lag > 0.0 { self.sample_rate as f32 / lag } else { 0.0 };
            }
            tau += 1;
        }
        0.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sampler
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PitchSampler {
    config: PitchConfig,
}

impl PitchSampler {
    pub fn new(config: PitchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    /// A [`Yin`] detector for `audio`, running at the audio's own rate.
    pub fn detector_for(&self, audio: &AudioBuffer) -> Yin {
        let rate = audio.sample_rate();
        if rate != self.config.sample_rate {
            let (frame, hop) = self.frame_geometry(rate);
            debug!(
                configured = self.config.sample_rate,
                audio = rate,
                frame,
                hop,
                "scaling analysis frames to the audio sample rate"
            );
        }
        Yin::new(rate, self.config.tolerance)
    }

    /// Frame and hop length in samples at `rate`, spanning the same time as
    /// `frame_size` / `hop_size` do at the configured rate.
    pub fn frame_geometry(&self, rate: u32) -> (usize, usize) {
        let (frame, hop) = (self.config.frame_size, self.config.hop());
        if rate == self.config.sample_rate || self.config.sample_rate == 0 {
            return (frame, hop);
        }
        let ratio = rate as f64 / self.config.sample_rate as f64;
        let scale = |n: usize| ((n as f64 * ratio).round() as usize).max(1);
        (scale(frame).max(4), scale(hop))
    }

    /// Measure every mora with a [`Yin`] detector.
    pub fn sample(&self, audio: &AudioBuffer, moras: &mut [Mora]) {
        let mut detector = self.detector_for(audio);
        self.sample_with(&mut detector, audio, moras);
    }

    /// Measure every mora with a caller-supplied detector.
    pub fn sample_with<D: PitchDetector + ?Sized>(
        &self,
        detector: &mut D,
        audio: &AudioBuffer,
        moras: &mut [Mora],
    ) {
        for mora in moras {
            let start_ms = (mora.start * 1000.0) as u64;
            let end_ms = (mora.end * 1000.0) as u64;
            let segment = audio.slice_ms(start_ms, end_ms);
            let hz = self.mean_voiced_pitch(&mut *detector, segment, audio.sample_rate());
            mora.pitch = self.config.unit.report(hz);
            debug!(mora = %mora.text, start_ms, end_ms, pitch = mora.pitch, "sampled pitch");
        }
    }

    /// Mean of the voiced frame estimates over `segment` (sampled at `rate`),
    /// `0.0` if none.
    pub fn mean_voiced_pitch<D: PitchDetector + ?Sized>(
        &self,
        detector: &mut D,
        segment: &[f32],
        rate: u32,
    ) -> f64 {
        let (frame, hop) = self.frame_geometry(rate);

        let mut sum = 0.0f64;
        let mut voiced = 0usize;
        let mut i = 0;
        while i + frame < segment.len() {
            let estimate = detector.detect(&segment[i..i + frame]);
            if estimate > 0.0 {
                sum += estimate as f64;
                voiced += 1;
            }
            i += hop;
        }

        if voiced == 0 {
            0.0
        } else {
            sum / voiced as f64
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
