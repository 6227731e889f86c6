//! Banded dynamic time warping between two feature sequences.
//!
//! The accumulated-cost table has one extra row and column: cell `(0, 0)` is
//! the anchor with cost 0, every other border cell is infeasible. Row `i`
//! (1-based) is only filled for columns `j` with `|i - j| <= locality`
//! (a Sakoe–Chiba band); cells outside the band stay infeasible.
//!
//! ```text
//! D[i][j] = cost(i-1, j-1) + min(D[i-1][j], D[i][j-1], D[i-1][j-1])
//! ```
//!
//! Infeasible predecessors never take part in the minimum, and adding to an
//! infeasible minimum keeps it infeasible.

use crate::error::{DigitError, Result};
use crate::score::DistanceScore;
use crate::sequence::FeatureView;
use crate::table::CostTable;

/// Mean absolute coefficient difference between frame `i` of `a` and frame
/// `j` of `b`.
///
/// Both views must share the same arity.
#[inline]
pub fn frame_cost(a: &FeatureView<'_>, i: usize, b: &FeatureView<'_>, j: usize) -> f64 {
    let k = a.arity();
    let mut total = 0.0;
    for coeff in 0..k {
        total += (a.value(coeff, i) - b.value(coeff, j)).abs();
    }
    total / k as f64
}

/// Alignment distance between `a` and `b` within a band of half-width
/// `locality`.
///
/// Returns [`DistanceScore::Infeasible`] without allocating when the length
/// difference exceeds `locality`, since no in-band path can then reach the
/// final corner.
///
/// # Errors
/// - [`DigitError::ArityMismatch`] if the sequences have different arity.
/// - [`DigitError::AllocationFailure`] if the cost table cannot be allocated.
pub fn align<'a, 'b>(
    a: impl Into<FeatureView<'a>>,
    b: impl Into<FeatureView<'b>>,
    locality: usize,
) -> Result<DistanceScore> {
    let a = a.into();
    let b = b.into();
    if a.arity() != b.arity() {
        return Err(DigitError::ArityMismatch {
            expected: a.arity(),
            found: b.arity(),
        });
    }

    let n = a.len();
    let m = b.len();

    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("align", len_a = n, len_b = m, locality);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    if locality < n.abs_diff(m) {
        return Ok(DistanceScore::Infeasible);
    }

    let mut table = CostTable::new(n + 1, m + 1)?;
    table.set(0, 0, DistanceScore::ZERO);

    for i in 1..=n {
        let (lo, hi) = band(i, m, locality);
        for j in lo..=hi {
            let best_prev = table
                .get(i - 1, j)
                .min(table.get(i, j - 1))
                .min(table.get(i - 1, j - 1));
            if best_prev.is_infeasible() {
                continue;
            }
            table.set(i, j, best_prev + frame_cost(&a, i - 1, &b, j - 1));
        }
    }

    Ok(table.get(n, m))
}

/// Inclusive column range `[max(1, i - locality), min(m, i + locality)]`.
///
/// May be empty (`lo > hi`) when the band leaves the table.
#[inline]
fn band(i: usize, m: usize, locality: usize) -> (usize, usize) {
    let lo = i.saturating_sub(locality).max(1);
    let hi = i.saturating_add(locality).min(m);
    (lo, hi)
}
