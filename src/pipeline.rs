//! Pipeline orchestrator — transcription in, reconciled audio query out.
//!
//! Words are processed strictly in transcription order. Each word goes through
//!
//! 1. **Normalisation** — katakana → hiragana, whitespace trimmed.
//! 2. **Pause** — a pause mora when the word does not start where the previous
//!    one ended. Overlapping words get a negative pause that reconciliation absorbs.
//! 3. **Segmentation** — timing-unit groups.
//! 4. **Allocation** — equal share of the word window per group.
//! 5. **Annotation** — consonant / vowel from the phonetic table.
//! 6. **Pitch** — mean voiced pitch over each mora window.
//! 7. **Split** — vowel / consonant lengths.
//!
//! and once every word is done the final pause is measured and the whole
//! query is reconciled against the audio duration.

use std::path::Path;

use tracing::{debug, info};

use crate::allocate::allocate;
use crate::audio::AudioBuffer;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::kana::{KanaNormalizer, ScriptNormalizer};
use crate::mapping::PhoneticMap;
use crate::pitch::{PitchDetector, PitchSampler};
use crate::query::{AccentPhrase, AudioQuery, PauseMora};
use crate::reconcile::reconcile;
use crate::segment::segment;
use crate::split::DurationSplitter;
use crate::transcript::{Transcriber, Transcription, WordTimestamp};

/// The mora timing pipeline. Immutable once built; one instance can serve
/// any number of runs.
pub struct MoraPipeline {
    config: PipelineConfig,
    mapping: PhoneticMap,
    normalizer: Box<dyn ScriptNormalizer>,
    sampler: PitchSampler,
    splitter: DurationSplitter,
}

impl MoraPipeline {
    pub fn new(config: PipelineConfig, mapping: PhoneticMap) -> Self {
        let sampler = PitchSampler::new(config.pitch.clone());
        let splitter = config.splitter();
        Self { config, mapping, normalizer: Box::new(KanaNormalizer), sampler, splitter }
    }

    /// Build from a config and the phonetic table at `mapping_path`
    /// (a missing table is tolerated, see [`PhoneticMap::load`]).
    pub fn load(config: PipelineConfig, mapping_path: &Path) -> Result<Self> {
        config.validate()?;
        let mapping = PhoneticMap::load(mapping_path)?;
        Ok(Self::new(config, mapping))
    }

    pub fn with_normalizer(mut self, normalizer: impl ScriptNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ── Entry points ──────────────────────────────────────────────────────────

    /// Decode `audio_path`, transcribe it and annotate the result.
    ///
    /// The audio is decoded first so an unreadable file fails before the
    /// (expensive) transcription runs.
    pub fn run(&self, audio_path: &Path, transcriber: &dyn Transcriber) -> Result<AudioQuery> {
        let audio = AudioBuffer::open(audio_path)?;
        let transcription = transcriber.transcribe(audio_path, &self.config.language)?;
        self.annotate(&transcription, &audio)
    }

    /// Annotate an existing transcription against decoded audio.
    pub fn annotate(&self, transcription: &Transcription, audio: &AudioBuffer) -> Result<AudioQuery> {
        let kana = self.normalizer.normalize(&transcription.text);
        info!(transcription = %kana, duration = audio.duration(), "annotating transcription");

        let mut detector = self.sampler.detector_for(audio);

        // The previous word's end is threaded through the fold; the first
        // word is measured from the start of the audio.
        let (accent_phrases, last_end) = transcription.words().try_fold(
            (Vec::new(), 0.0f64),
            |(mut phrases, previous_end), word| -> Result<_> {
                phrases.push(self.process_word(word, previous_end, audio, &mut detector)?);
                Ok((phrases, word.end))
            },
        )?;

        let measured = audio.duration();
        let trailing = measured - last_end;
        let final_pause = (trailing > 0.0).then_some(trailing);

        let query = AudioQuery {
            transcription: kana.clone(),
            accent_phrases,
            final_pause,
            synthesis: self.config.synthesis.clone(),
            kana,
        };

        let (query, _) = reconcile(query, measured)?;
        Ok(query)
    }

    // ── Per word ──────────────────────────────────────────────────────────────

    fn process_word<D: PitchDetector + ?Sized>(
        &self,
        word: &WordTimestamp,
        previous_end: f64,
        audio: &AudioBuffer,
        detector: &mut D,
    ) -> Result<AccentPhrase> {
        let text = self.normalizer.normalize(&word.text);

        let gap = word.start - previous_end;
        let pause_mora = (gap != 0.0).then(|| PauseMora::new(gap));

        let groups = segment(&text, &self.config.punctuation)?;
        let mut moras = allocate(word.start, word.end, groups, self.config.decimals)?;
        for mora in &mut moras {
            mora.is_interrogative = self.config.interrogative_markers.is_interrogative(&mora.text);
        }

        self.mapping.annotate(&mut moras, &self.config.punctuation);
        self.sampler.sample_with(detector, audio, &mut moras);
        self.splitter.split(&mut moras);

        debug!(
            word = %text,
            start = word.start,
            end = word.end,
            moras = moras.len(),
            pause = ?pause_mora.map(|p| p.vowel_length),
            "processed word"
        );

        Ok(AccentPhrase {
            is_interrogative: self.config.interrogative_markers.is_interrogative(&text),
            complete_word: text,
            accent: 0,
            moras,
            pause_mora,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoraError;
    use crate::reconcile::allocated_total;
    use crate::transcript::{Segment, TranscriptFile};

    const MAPPING: &str = r#"{
        "し": { "consonant": "sh", "vowel": "i" },
        "た": { "consonant": "t", "vowel": "a" },
        "か": { "consonant": "k", "vowel": "a" },
        "あ": { "consonant": null, "vowel": "a" }
    }"#;

    fn word(text: &str, start: f64, end: f64) -> WordTimestamp {
        WordTimestamp { text: text.to_string(), start, end }
    }

    fn transcription(words: Vec<WordTimestamp>) -> Transcription {
        let text = words.iter().map(|w| w.text.as_str()).collect();
        Transcription { text, segments: vec![Segment { words }] }
    }

    fn tone(seconds: f64) -> AudioBuffer {
        let n = (24_000.0 * seconds) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 180.0 * i as f32 / 24_000.0).sin() * 0.4)
            .collect();
        AudioBuffer::from_mono(samples, 24_000)
    }

    fn pipeline() -> MoraPipeline {
        MoraPipeline::new(PipelineConfig::default(), PhoneticMap::from_json(MAPPING).unwrap())
    }

    #[test]
    fn test_pause_between_words() {
        let t = transcription(vec![word("した。", 1.0, 1.3), word("あ", 1.8, 2.0)]);
        let query = pipeline().annotate(&t, &tone(2.5)).unwrap();

        let first = &query.accent_phrases[0];
        let second = &query.accent_phrases[1];
        // Leading silence before the first word becomes a pause too.
        assert!(first.pause_mora.is_some());
        assert!(second.pause_mora.is_some());
        assert_eq!(first.moras.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(), ["し", "た。"]);
        assert!(first.moras[1].consonant.as_deref() == Some("t"));
        assert!(query.final_pause.is_some());
    }

    #[test]
    fn test_pause_length_is_the_word_gap() {
        let t = transcription(vec![word("た", 0.0, 2.0), word("あ", 2.5, 3.0)]);
        let query = pipeline().annotate(&t, &tone(3.0)).unwrap();

        assert!(query.accent_phrases[0].pause_mora.is_none());
        let pause = query.accent_phrases[1].pause_mora.unwrap();
        assert_eq!(pause.vowel_length, 0.5);
        assert_eq!(pause.consonant_length, None);
        assert_eq!(query.final_pause, None);
    }

    #[test]
    fn test_overlapping_words_get_negative_pause() {
        let t = transcription(vec![word("した", 0.0, 1.0), word("あ", 0.9, 1.2)]);
        let audio = tone(2.0);
        let query = pipeline().annotate(&t, &audio).unwrap();

        let pause = query.accent_phrases[1].pause_mora.unwrap();
        assert!((pause.vowel_length + 0.1).abs() < 1e-9, "pause {}", pause.vowel_length);
        assert!((query.final_pause.unwrap() - 0.8).abs() < 1e-9);
        assert!((allocated_total(&query) - audio.duration()).abs() < 1e-9);
    }

    #[test]
    fn test_contiguous_words_have_no_pause() {
        let t = transcription(vec![word("した", 0.0, 0.4), word("か", 0.4, 0.6)]);
        let query = pipeline().annotate(&t, &tone(0.6)).unwrap();
        assert!(query.accent_phrases[0].pause_mora.is_none());
        assert!(query.accent_phrases[1].pause_mora.is_none());
        assert!(query.final_pause.is_none());
    }

    #[test]
    fn test_durations_sum_to_audio_length() {
        let t = transcription(vec![
            word("シタ", 0.2, 0.55),
            word("ありますか?", 0.7, 1.4),
            word("あ", 1.4, 1.61),
        ]);
        let audio = tone(2.0);
        let query = pipeline().annotate(&t, &audio).unwrap();
        assert!((allocated_total(&query) - audio.duration()).abs() < 1e-6);
    }

    #[test]
    fn test_word_fields() {
        let t = transcription(vec![word(" ありますカ?", 0.0, 0.5)]);
        let query = pipeline().annotate(&t, &tone(0.5)).unwrap();
        let phrase = &query.accent_phrases[0];
        assert_eq!(phrase.complete_word, "ありますか?");
        assert!(phrase.is_interrogative);
        assert_eq!(phrase.accent, 0);
        let last = phrase.moras.last().unwrap();
        assert_eq!(last.text, "か?");
        assert!(last.is_interrogative);
        assert!(!phrase.moras[0].is_interrogative);
        assert_eq!(query.kana, "ありますか?");
        assert_eq!(query.transcription, query.kana);
    }

    #[test]
    fn test_pitch_and_split_filled() {
        let t = transcription(vec![word("た", 0.1, 0.4)]);
        let query = pipeline().annotate(&t, &tone(0.5)).unwrap();
        let mora = &query.accent_phrases[0].moras[0];
        assert!((mora.pitch - 180.0).abs() < 3.0, "pitch {}", mora.pitch);
        assert_eq!(mora.vowel_length, Some(0.3));
        assert_eq!(mora.consonant_length, Some(0.06));
    }

    #[test]
    fn test_missing_mapping_degrades_to_null() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline =
            MoraPipeline::load(PipelineConfig::default(), &dir.path().join("missing.json")).unwrap();
        let t = transcription(vec![word("した", 0.0, 0.4)]);
        let query = pipeline.annotate(&t, &tone(0.4)).unwrap();
        for mora in &query.accent_phrases[0].moras {
            assert_eq!(mora.consonant, None);
            assert_eq!(mora.vowel, None);
            assert_eq!(mora.vowel_length, None);
            assert_eq!(mora.consonant_length, None);
        }
    }

    #[test]
    fn test_empty_word_is_invalid() {
        let t = transcription(vec![word("  ", 0.0, 0.4)]);
        let err = pipeline().annotate(&t, &tone(0.4)).unwrap_err();
        assert!(matches!(err, MoraError::InvalidInput { .. }));
    }

    #[test]
    fn test_nothing_to_reconcile() {
        let err = pipeline().annotate(&transcription(vec![]), &tone(0.0)).unwrap_err();
        assert!(matches!(err, MoraError::Reconciliation { .. }));
    }

    #[test]
    fn test_run_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("audio.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&audio_path, spec).unwrap();
        for s in tone(1.0).samples() {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let transcript_path = dir.path().join("transcript.json");
        let t = transcription(vec![word("した", 0.2, 0.6)]);
        std::fs::write(&transcript_path, serde_json::to_string(&t).unwrap()).unwrap();

        let query = pipeline().run(&audio_path, &TranscriptFile::new(&transcript_path)).unwrap();
        assert_eq!(query.accent_phrases.len(), 1);
        assert!((allocated_total(&query) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_run_unreadable_audio() {
        let t = transcription(vec![word("した", 0.0, 0.4)]);
        let err = pipeline().run(Path::new("/no/such/audio.wav"), &t).unwrap_err();
        assert!(matches!(err, MoraError::AudioRead { .. }));
    }
}
