//! Nearest-template classification.
//!
//! Templates are scanned digit by digit (0 to 9), each digit's templates in
//! store order. The running best only moves on a strictly smaller score, so
//! the first template reaching the minimum wins. With the `parallel` feature
//! the alignments run concurrently but are reduced in that same fixed order.

use crate::dtw::align;
use crate::error::{try_vec, Result};
use crate::sequence::{FeatureSequence, FeatureView};
use crate::templates::{Digit, LabeledScore};
use crate::traits::{SegmentScorer, TemplateSource};

/// Label and alignment distance of the template closest to `seq`.
///
/// Returns [`LabeledScore::NONE`] when the store holds no templates, or when
/// no template is reachable inside the band.
///
/// # Errors
/// Propagates [`align`] failures (arity mismatch, allocation failure).
pub fn classify<'a, S>(
    seq: impl Into<FeatureView<'a>>,
    store: &S,
    locality: usize,
) -> Result<LabeledScore>
where
    S: TemplateSource + ?Sized,
{
    let seq = seq.into();

    #[cfg(feature = "tracing")]
    let span = tracing::debug_span!("classify", len = seq.len(), locality);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let candidates = template_pairs(store)?;
    let scored = score_templates(seq, &candidates, locality)?;
    Ok(reduce_in_order(scored))
}

fn template_pairs<S>(store: &S) -> Result<Vec<(Digit, &FeatureSequence)>>
where
    S: TemplateSource + ?Sized,
{
    let count: usize = Digit::ALL
        .into_iter()
        .map(|d| store.templates_for(d).len())
        .sum();
    let mut pairs = try_vec(count, "collecting templates")?;
    pairs.extend(
        Digit::ALL
            .into_iter()
            .flat_map(|d| store.templates_for(d).iter().map(move |t| (d, t))),
    );
    Ok(pairs)
}

/// Strict-improvement fold; input order decides ties.
fn reduce_in_order(scored: impl IntoIterator<Item = LabeledScore>) -> LabeledScore {
    let mut best = LabeledScore::NONE;
    for candidate in scored {
        if candidate.score < best.score {
            best = candidate;
        }
    }
    best
}

#[cfg(feature = "parallel")]
fn score_templates(
    seq: FeatureView<'_>,
    candidates: &[(Digit, &FeatureSequence)],
    locality: usize,
) -> Result<Vec<LabeledScore>> {
    use rayon::prelude::*;

    candidates
        .par_iter()
        .map(|&(digit, template)| {
            align(seq, template, locality).map(|score| LabeledScore {
                digit: Some(digit),
                score,
            })
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_templates(
    seq: FeatureView<'_>,
    candidates: &[(Digit, &FeatureSequence)],
    locality: usize,
) -> Result<Vec<LabeledScore>> {
    candidates
        .iter()
        .map(|&(digit, template)| {
            align(seq, template, locality).map(|score| LabeledScore {
                digit: Some(digit),
                score,
            })
        })
        .collect()
}

/// [`SegmentScorer`] backed by [`classify`] against a template set.
#[derive(Debug)]
pub struct NearestTemplate<'s, S: ?Sized> {
    store: &'s S,
    locality: usize,
}

impl<S: ?Sized> Clone for NearestTemplate<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for NearestTemplate<'_, S> {}

impl<'s, S: TemplateSource + ?Sized> NearestTemplate<'s, S> {
    pub fn new(store: &'s S, locality: usize) -> Self {
        Self { store, locality }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn locality(&self) -> usize {
        self.locality
    }
}

impl<S: TemplateSource + ?Sized> SegmentScorer for NearestTemplate<'_, S> {
    fn score(&self, segment: FeatureView<'_>) -> Result<LabeledScore> {
        classify(segment, self.store, self.locality)
    }
}
