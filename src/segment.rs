//! Punctuation-aware segmentation of a word into timing units.
//!
//! Every character of a word becomes one timing unit, except the non-voiced
//! symbols of a [`PunctuationSet`], which are glued to a neighbour:
//!
//! - a non-voiced symbol that opens the word is merged with the character
//!   after it (`「あ` → one unit);
//! - anywhere else it is merged with the character before it (`た。` → one unit).
//!
//! The concatenation of the returned groups is always the input text.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{MoraError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Non-voiced symbol set
// ─────────────────────────────────────────────────────────────────────────────

/// Prolonged sound mark, sokuon (both scripts), voicing marks, question marks
/// (ASCII and full-width), Japanese punctuation and brackets, iteration marks.
const DEFAULT_SYMBOLS: &str = "ーッっ゜゛?？。、「」『』（）・ゝゞヽヾ";

static DEFAULT_SET: Lazy<PunctuationSet> =
    Lazy::new(|| PunctuationSet::new(DEFAULT_SYMBOLS.chars()));

/// Set of symbols that carry no timing of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PunctuationSet {
    symbols: BTreeSet<char>,
}

impl PunctuationSet {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        Self { symbols: symbols.into_iter().collect() }
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// `text` with every non-voiced symbol removed and surrounding whitespace
    /// trimmed — the lookup key used by the phonetic annotator.
    pub fn strip(&self, text: &str) -> String {
        text.chars().filter(|&c| !self.contains(c)).collect::<String>().trim().to_string()
    }
}

impl Default for PunctuationSet {
    fn default() -> Self {
        DEFAULT_SET.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Segmenter
// ─────────────────────────────────────────────────────────────────────────────

/// Split `text` into ordered timing-unit groups.
///
/// Fails with [`MoraError::InvalidInput`] when `text` is empty.
pub fn segment(text: &str, punctuation: &PunctuationSet) -> Result<Vec<String>> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Err(MoraError::invalid_input("cannot segment an empty word"));
    }

    let mut groups = Vec::with_capacity(chars.len());
    let mut i = 0;

    // A leading non-voiced symbol is carried by the character that follows it.
    if punctuation.contains(chars[0]) && chars.len() > 1 {
        groups.push(chars[..2].iter().collect());
        i = 2;
    }

    while i < chars.len() {
        match chars.get(i + 1) {
            Some(&next) if punctuation.contains(next) => {
                groups.push(chars[i..i + 2].iter().collect());
                i += 2;
            }
            _ => {
                groups.push(chars[i].to_string());
                i += 1;
            }
        }
    }

    Ok(groups)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
