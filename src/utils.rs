//! Heuristics for picking segmentation parameters from a template set.
//!
//! These are used by [`crate::builder::RecognizerBuilder::build`] when the
//! caller leaves the length bounds or the locality unset.

use crate::templates::Digit;
use crate::traits::TemplateSource;

/// Shortest and longest template length across all digits, or `None` for an
/// empty store.
pub fn template_length_bounds<S>(store: &S) -> Option<(usize, usize)>
where
    S: TemplateSource + ?Sized,
{
    Digit::ALL
        .into_iter()
        .flat_map(|d| store.templates_for(d).iter().map(|t| t.len()))
        .fold(None, |acc, len| match acc {
            None => Some((len, len)),
            Some((lo, hi)) => Some((lo.min(len), hi.max(len))),
        })
}

/// Smallest band in which every segment length in `[l_min, l_max]` can
/// reach every template length in the same range.
#[inline]
pub fn default_locality(l_min: usize, l_max: usize) -> usize {
    l_max.saturating_sub(l_min)
}
