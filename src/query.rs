//! Output data model — the audio query handed to the synthesis front end.
//!
//! Field names follow the VOICEVOX-style audio query JSON: accent phrases and
//! moras in snake_case, synthesis controls in camelCase.
//!
//! Word moras ([`Mora`]) and pause moras ([`PauseMora`]) are distinct types so
//! the fields a pause cannot have (text, consonant, pitch) are not represented
//! at all; [`PauseMora`] writes its fixed values only at serialisation time.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Vowel symbol emitted for pause moras.
pub const PAUSE_VOWEL: &str = "pau";

/// One timed sub-word symbol (possibly a punctuation-merged group).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mora {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Allocated duration of the mora; the quantity absorbed by reconciliation.
    pub vowel_consonant_length: f64,
    pub is_interrogative: bool,
    pub consonant: Option<String>,
    pub vowel: Option<String>,
    /// Mean voiced pitch over the mora window, `0.0` when nothing was voiced.
    pub pitch: f64,
    pub vowel_length: Option<f64>,
    pub consonant_length: Option<f64>,
}

impl Mora {
    /// A mora with timing only; phonetics, pitch and split lengths are empty
    /// until the later pipeline stages fill them in.
    pub fn timed(text: impl Into<String>, start: f64, end: f64, length: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            vowel_consonant_length: length,
            is_interrogative: false,
            consonant: None,
            vowel: None,
            pitch: 0.0,
            vowel_length: None,
            consonant_length: None,
        }
    }
}

/// Silence before a word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseMora {
    pub vowel_length: f64,
    pub consonant_length: Option<f64>,
}

impl PauseMora {
    pub fn new(length: f64) -> Self {
        Self { vowel_length: length, consonant_length: None }
    }
}

impl Serialize for PauseMora {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PauseMora", 6)?;
        s.serialize_field("text", " ")?;
        s.serialize_field("consonant", &None::<String>)?;
        s.serialize_field("consonant_length", &self.consonant_length)?;
        s.serialize_field("vowel", PAUSE_VOWEL)?;
        s.serialize_field("vowel_length", &self.vowel_length)?;
        s.serialize_field("pitch", &0.0f64)?;
        s.end()
    }
}

/// One recognised word with its moras and the pause that precedes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccentPhrase {
    pub moras: Vec<Mora>,
    pub accent: i32,
    pub is_interrogative: bool,
    pub complete_word: String,
    pub pause_mora: Option<PauseMora>,
}

/// Synthesis controls copied verbatim into every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisParams {
    pub speed_scale: f64,
    pub pitch_scale: f64,
    pub intonation_scale: f64,
    pub volume_scale: f64,
    pub pre_phoneme_length: f64,
    pub post_phoneme_length: f64,
    pub output_sampling_rate: u32,
    pub output_stereo: bool,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            pitch_scale: 0.0,
            intonation_scale: 1.0,
            volume_scale: 1.0,
            pre_phoneme_length: 0.1,
            post_phoneme_length: 0.1,
            output_sampling_rate: 24_000,
            output_stereo: false,
        }
    }
}

/// Root of the annotation: one per audio file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioQuery {
    pub transcription: String,
    pub accent_phrases: Vec<AccentPhrase>,
    /// Silence between the last word and the end of the audio.
    pub final_pause: Option<f64>,
    #[serde(flatten)]
    pub synthesis: SynthesisParams,
    pub kana: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
