//! Global duration reconciliation.
//!
//! Transcription timestamps are approximate, so the allocated mora lengths,
//! pauses and final pause rarely add up to the real audio duration. The
//! difference is spread evenly over every timing-bearing quantity:
//!
//! - the `vowel_consonant_length` of every word mora;
//! - the `vowel_length` of every pause mora, and its `consonant_length` when set;
//! - the final pause, when set.
//!
//! The quantities are enumerated once as explicit [`Quantity`] references and
//! updated through them; null fields are never touched.

use tracing::info;

use crate::error::{MoraError, Result};
use crate::query::AudioQuery;

/// Reference to one timing-bearing value inside an [`AudioQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Mora { phrase: usize, mora: usize },
    PauseVowel { phrase: usize },
    PauseConsonant { phrase: usize },
    FinalPause,
}

/// Every timing-bearing quantity of `query`, in document order.
pub fn timing_quantities(query: &AudioQuery) -> Vec<Quantity> {
    let mut quantities = Vec::new();
    for (p, phrase) in query.accent_phrases.iter().enumerate() {
        if let Some(pause) = &phrase.pause_mora {
            quantities.push(Quantity::PauseVowel { phrase: p });
            if pause.consonant_length.is_some() {
                quantities.push(Quantity::PauseConsonant { phrase: p });
            }
        }
        quantities.extend((0..phrase.moras.len()).map(|m| Quantity::Mora { phrase: p, mora: m }));
    }
    if query.final_pause.is_some() {
        quantities.push(Quantity::FinalPause);
    }
    quantities
}

fn value(query: &AudioQuery, quantity: Quantity) -> Option<f64> {
    match quantity {
        Quantity::Mora { phrase, mora } => query
            .accent_phrases
            .get(phrase)?
            .moras
            .get(mora)
            .map(|m| m.vowel_consonant_length),
        Quantity::PauseVowel { phrase } => {
            query.accent_phrases.get(phrase)?.pause_mora.map(|p| p.vowel_length)
        }
        Quantity::PauseConsonant { phrase } => {
            query.accent_phrases.get(phrase)?.pause_mora?.consonant_length
        }
        Quantity::FinalPause => query.final_pause,
    }
}

fn value_mut(query: &mut AudioQuery, quantity: Quantity) -> Option<&mut f64> {
    match quantity {
        Quantity::Mora { phrase, mora } => query
            .accent_phrases
            .get_mut(phrase)?
            .moras
            .get_mut(mora)
            .map(|m| &mut m.vowel_consonant_length),
        Quantity::PauseVowel { phrase } => query
            .accent_phrases
            .get_mut(phrase)?
            .pause_mora
            .as_mut()
            .map(|p| &mut p.vowel_length),
        Quantity::PauseConsonant { phrase } => query
            .accent_phrases
            .get_mut(phrase)?
            .pause_mora
            .as_mut()?
            .consonant_length
            .as_mut(),
        Quantity::FinalPause => query.final_pause.as_mut(),
    }
}

/// Sum of every timing-bearing quantity.
pub fn allocated_total(query: &AudioQuery) -> f64 {
    timing_quantities(query).into_iter().filter_map(|q| value(query, q)).sum()
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub allocated: f64,
    pub error: f64,
    pub quantities: usize,
    pub per_quantity: f64,
}

/// Spread `measured - allocated_total(query)` evenly over the quantities.
///
/// Fails with [`MoraError::Reconciliation`] when the query has nothing to
/// absorb the error.
pub fn reconcile(mut query: AudioQuery, measured: f64) -> Result<(AudioQuery, Correction)> {
    let quantities = timing_quantities(&query);
    if quantities.is_empty() {
        return Err(MoraError::reconciliation(
            "no moras, pauses or final pause to distribute the timing error over",
        ));
    }

    let allocated: f64 = quantities.iter().filter_map(|&q| value(&query, q)).sum();
    let error = measured - allocated;
    let per_quantity = error / quantities.len() as f64;

    for &q in &quantities {
        if let Some(v) = value_mut(&mut query, q) {
            *v += per_quantity;
        }
    }

    let correction = Correction { allocated, error, quantities: quantities.len(), per_quantity };
    info!(
        measured,
        allocated,
        error,
        quantities = correction.quantities,
        per_quantity,
        "reconciled durations"
    );
    Ok((query, correction))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
