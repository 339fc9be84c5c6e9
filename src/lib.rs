//! # moratime
//!
//! Mora-level timing and pitch annotation from word-level transcription
//! timestamps, producing a VOICEVOX-style audio query for a speech-synthesis
//! front end.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use moratime::{MoraPipeline, PipelineConfig, TranscriptFile};
//!
//! let pipeline = MoraPipeline::load(PipelineConfig::default(), Path::new("files/mapping.json")).unwrap();
//! let query = pipeline
//!     .run(Path::new("audio.wav"), &TranscriptFile::new("transcript.json"))
//!     .unwrap();
//! println!("{}", serde_json::to_string_pretty(&query).unwrap());
//! ```
//!
//! ## Pipeline
//! 1. **Transcription** — word texts with start / end seconds (external engine
//!    or a `whisper_timestamped` JSON file).
//! 2. **Segmentation** — each word split into moras; non-voiced symbols
//!    (`。`, `ー`, `ッ`, …) are merged into a neighbour.
//! 3. **Allocation** — the word window is shared equally among its moras.
//! 4. **Annotation** — consonant / vowel from a JSON lookup table.
//! 5. **Pitch** — YIN over 512-sample frames, mean of the voiced frames.
//! 6. **Split** — vowel / consonant lengths with a 4:1 vowel weighting.
//! 7. **Reconciliation** — the gap between the summed lengths and the real
//!    audio duration is spread evenly over every mora and pause.

pub mod allocate;
pub mod audio;
pub mod config;
pub mod error;
pub mod kana;
pub mod mapping;
pub mod pipeline;
pub mod pitch;
pub mod query;
pub mod reconcile;
pub mod segment;
pub mod split;
pub mod transcript;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use audio::AudioBuffer;
pub use config::PipelineConfig;
pub use error::{MoraError, Result};
pub use mapping::PhoneticMap;
pub use pipeline::MoraPipeline;
pub use query::{AccentPhrase, AudioQuery, Mora, PauseMora, SynthesisParams};
pub use transcript::{Transcriber, TranscriptFile, Transcription};
