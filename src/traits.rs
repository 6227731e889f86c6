//! Seams between the recognition core and its collaborators.
//!
//! - [`TemplateSource`] is what the classifier needs from a template set:
//!   a deterministic, ordered list of exemplars per digit.
//! - [`SegmentScorer`] is what the segmentation planner needs from a
//!   classifier: a label and a cost for one candidate segment.
//!
//! [`TemplateStore`](crate::templates::TemplateStore) implements the first,
//! [`NearestTemplate`](crate::classify::NearestTemplate) the second. Tests and
//! callers can plug in their own implementations of either.
//!
//! With the `parallel` feature both traits require `Sync`, since candidates
//! are scored from rayon worker threads.

use crate::error::Result;
use crate::sequence::{FeatureSequence, FeatureView};
use crate::templates::{Digit, LabeledScore};

#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync + ?Sized> MaybeSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}

/// Read-only labelled template collection.
pub trait TemplateSource: MaybeSync {
    /// Templates for `digit`, in the same order on every call.
    fn templates_for(&self, digit: Digit) -> &[FeatureSequence];
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn templates_for(&self, digit: Digit) -> &[FeatureSequence] {
        (**self).templates_for(digit)
    }
}

/// Scoring oracle for one candidate segment.
///
/// Implementations must be pure: the same segment content always yields the
/// same result, independent of call order.
pub trait SegmentScorer: MaybeSync {
    fn score(&self, segment: FeatureView<'_>) -> Result<LabeledScore>;
}

impl<T: SegmentScorer + ?Sized> SegmentScorer for &T {
    fn score(&self, segment: FeatureView<'_>) -> Result<LabeledScore> {
        (**self).score(segment)
    }
}
