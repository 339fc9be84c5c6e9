//! Upstream transcription interface.
//!
//! A transcriber turns an audio file into a full-text transcription plus
//! ordered segments of timestamped words. Engines plug in through
//! [`Transcriber`]; [`TranscriptFile`] replays a JSON document in the
//! `whisper_timestamped` layout:
//!
//! ```json
//! { "text": "…", "segments": [ { "words": [ { "text": "…", "start": 0.0, "end": 0.4 } ] } ] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MoraError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub text: String,
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub words: Vec<WordTimestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Transcription {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MoraError::json("parse transcription", e))
    }

    /// All words of all segments, in order.
    pub fn words(&self) -> impl Iterator<Item = &WordTimestamp> {
        self.segments.iter().flat_map(|s| s.words.iter())
    }
}

pub trait Transcriber {
    fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Transcription>;
}

/// Transcriber backed by a pre-computed JSON transcript.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    path: PathBuf,
}

impl TranscriptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Transcriber for TranscriptFile {
    fn transcribe(&self, _audio_path: &Path, _language: &str) -> Result<Transcription> {
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| MoraError::io("read transcription", e))?;
        Transcription::from_json(&data)
    }
}

impl Transcriber for Transcription {
    fn transcribe(&self, _audio_path: &Path, _language: &str) -> Result<Transcription> {
        Ok(self.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
