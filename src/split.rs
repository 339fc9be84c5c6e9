//! Vowel / consonant duration split.
//!
//! A mora of duration `d` with `nV` vowel symbols and `nC` consonant symbols is
//! divided in weighted units where one vowel symbol counts `w` consonant
//! symbols (`w = 4` by default):
//!
//! ```text
//! unit       = d / (w·nV + nC)
//! consonant  = round(unit · nC, 4)      (null when nC = 0)
//! vowel      = d                        (FullSpan, null when nV = 0)
//!            = round(unit · w · nV, 4)  (Weighted, null when nV = 0)
//! ```
//!
//! A mora with neither vowel nor consonant gets null for both.

use serde::{Deserialize, Serialize};

use crate::allocate::round_to;
use crate::query::Mora;

pub const DEFAULT_VOWEL_WEIGHT: f64 = 4.0;

/// What a vowel-bearing mora reports as its vowel length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VowelLengthPolicy {
    /// The whole allocated duration of the mora.
    #[default]
    FullSpan,
    /// Only the vowel's weighted share.
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSplitter {
    vowel_weight: f64,
    policy: VowelLengthPolicy,
}

impl Default for DurationSplitter {
    fn default() -> Self {
        Self { vowel_weight: DEFAULT_VOWEL_WEIGHT, policy: VowelLengthPolicy::FullSpan }
    }
}

impl DurationSplitter {
    pub fn new(vowel_weight: f64, policy: VowelLengthPolicy) -> Self {
        Self { vowel_weight, policy }
    }

    /// `(vowel_length, consonant_length)` for a mora of `duration`.
    pub fn lengths(
        &self,
        duration: f64,
        consonant: Option<&str>,
        vowel: Option<&str>,
    ) -> (Option<f64>, Option<f64>) {
        let n_vowel = vowel.map_or(0, |v| v.chars().count());
        let n_consonant = consonant.map_or(0, |c| c.chars().count());
        if n_vowel + n_consonant == 0 {
            return (None, None);
        }

        let weighted = self.vowel_weight * n_vowel as f64 + n_consonant as f64;
        if weighted <= 0.0 {
            return (None, None);
        }
        let unit = duration / weighted;

        let vowel_length = (n_vowel > 0).then(|| match self.policy {
            VowelLengthPolicy::FullSpan => duration,
            VowelLengthPolicy::Weighted => round_to(unit * self.vowel_weight * n_vowel as f64, 4),
        });
        let consonant_length = (n_consonant > 0).then(|| round_to(unit * n_consonant as f64, 4));

        (vowel_length, consonant_length)
    }

    pub fn split(&self, moras: &mut [Mora]) {
        for mora in moras {
            let (vowel_length, consonant_length) = self.lengths(
                mora.vowel_consonant_length,
                mora.consonant.as_deref(),
                mora.vowel.as_deref(),
            );
            mora.vowel_length = vowel_length;
            mora.consonant_length = consonant_length;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
