//! Pipeline configuration — JSON, every field optional.
//!
//! ```json
//! {
//!   "language": "ja",
//!   "vowel_weight": 4.0,
//!   "pitch": { "unit": "khz" },
//!   "synthesis": { "speedScale": 1.1 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocate::DEFAULT_DECIMALS;
use crate::error::{MoraError, Result};
use crate::kana::InterrogativeMarkers;
use crate::pitch::PitchConfig;
use crate::query::SynthesisParams;
use crate::segment::PunctuationSet;
use crate::split::{DurationSplitter, VowelLengthPolicy, DEFAULT_VOWEL_WEIGHT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language hint handed to the transcriber.
    pub language: String,
    /// Rounding precision of mora boundaries and lengths.
    pub decimals: u32,
    pub punctuation: PunctuationSet,
    pub interrogative_markers: InterrogativeMarkers,
    /// How many consonant symbols one vowel symbol weighs.
    pub vowel_weight: f64,
    pub vowel_length_policy: VowelLengthPolicy,
    pub pitch: PitchConfig,
    pub synthesis: SynthesisParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: "ja".to_string(),
            decimals: DEFAULT_DECIMALS,
            punctuation: PunctuationSet::default(),
            interrogative_markers: InterrogativeMarkers::default(),
            vowel_weight: DEFAULT_VOWEL_WEIGHT,
            vowel_length_policy: VowelLengthPolicy::default(),
            pitch: PitchConfig::default(),
            synthesis: SynthesisParams::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| MoraError::io("read pipeline config", e))?;
        let config: Self =
            serde_json::from_str(&data).map_err(|e| MoraError::json("parse pipeline config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.vowel_weight.is_finite() && self.vowel_weight > 0.0) {
            return Err(MoraError::invalid_input(format!(
                "vowel_weight must be positive, got {}",
                self.vowel_weight
            )));
        }
        if self.pitch.frame_size < 4 {
            return Err(MoraError::invalid_input(format!(
                "pitch.frame_size must be at least 4, got {}",
                self.pitch.frame_size
            )));
        }
        Ok(())
    }

    pub fn splitter(&self) -> DurationSplitter {
        DurationSplitter::new(self.vowel_weight, self.vowel_length_policy)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
