//! Script normalisation and interrogative detection.
//!
//! Transcriptions arrive in mixed script. Before segmentation every text is
//! passed through a [`ScriptNormalizer`]; the default [`KanaNormalizer`] folds
//! katakana onto hiragana and trims surrounding whitespace. Kanji are left
//! untouched: reading conversion belongs to the transcriber.
//!
//! The interrogative check runs on the normalised text, so its marker set must
//! be expressed in the normalised script.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Offset between a katakana code point and its hiragana counterpart.
const KANA_OFFSET: u32 = 0x60;

pub trait ScriptNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KanaNormalizer;

impl ScriptNormalizer for KanaNormalizer {
    fn normalize(&self, text: &str) -> String {
        katakana_to_hiragana(text.trim())
    }
}

/// Fold katakana (ァ..ヶ) onto hiragana (ぁ..ゖ). Other characters pass through.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Characters whose presence marks a text as a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterrogativeMarkers {
    markers: BTreeSet<char>,
}

impl InterrogativeMarkers {
    pub fn new(markers: impl IntoIterator<Item = char>) -> Self {
        Self { markers: markers.into_iter().collect() }
    }

    pub fn is_interrogative(&self, text: &str) -> bool {
        text.chars().any(|c| self.markers.contains(&c))
    }
}

impl Default for InterrogativeMarkers {
    fn default() -> Self {
        Self::new(['か', '?', '？'])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_katakana_to_hiragana() {
        assert_eq!(katakana_to_hiragana("カタカナ"), "かたかな");
        assert_eq!(katakana_to_hiragana("ットは"), "っとは");
        assert_eq!(katakana_to_hiragana("ヴ"), "ゔ");
    }

    #[test]
    fn test_non_katakana_untouched() {
        assert_eq!(katakana_to_hiragana("ラーメン。"), "らーめん。");
        assert_eq!(katakana_to_hiragana("漢字abc"), "漢字abc");
    }

    #[test]
    fn test_normalizer_trims() {
        assert_eq!(KanaNormalizer.normalize("  シタ "), "した");
    }

    #[test]
    fn test_interrogative_after_normalization() {
        let markers = InterrogativeMarkers::default();
        assert!(markers.is_interrogative(&KanaNormalizer.normalize("アリマスカ")));
        assert!(markers.is_interrogative("ほんとう？"));
        assert!(!markers.is_interrogative("ありがとう"));
    }

    #[test]
    fn test_markers_from_json() {
        let markers: InterrogativeMarkers = serde_json::from_str(r#"["?"]"#).unwrap();
        assert!(markers.is_interrogative("a?"));
        assert!(!markers.is_interrogative("か"));
    }
}
