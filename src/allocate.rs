//! Duration allocation — spreads a word's time window over its groups.
//!
//! Each group gets an equal share of `[start, end]`. Boundaries are computed
//! from the cumulative offset `start + i * share` rather than from the previous
//! rounded boundary, so rounding error never accumulates along a word, and the
//! last boundary is pinned to `end`.

use crate::error::{MoraError, Result};
use crate::query::Mora;

/// Default rounding precision for boundaries and lengths.
pub const DEFAULT_DECIMALS: u32 = 4;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Assign a `[start, end]` window to each group, in order.
pub fn allocate(start: f64, end: f64, groups: Vec<String>, decimals: u32) -> Result<Vec<Mora>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(MoraError::invalid_input(format!(
            "non-finite word window [{start}, {end}]"
        )));
    }
    if end < start {
        return Err(MoraError::invalid_input(format!(
            "word ends before it starts ({end} < {start})"
        )));
    }
    if groups.is_empty() {
        return Err(MoraError::invalid_input("no groups to allocate time to"));
    }

    let n = groups.len();
    let share = (end - start) / n as f64;

    let moras = groups
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mora_start = start + i as f64 * share;
            let mora_end = if i + 1 == n { end } else { start + (i + 1) as f64 * share };
            Mora::timed(
                text,
                round_to(mora_start, decimals),
                round_to(mora_end, decimals),
                round_to(mora_end - mora_start, decimals),
            )
        })
        .collect();

    Ok(moras)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
