//! Optimal segmentation of an unsegmented digit string.
//!
//! The planner scans end positions `i` in increasing order and keeps, for
//! every `i`, the cheapest way to cover frames `[0, i]` with consecutive
//! segments whose lengths lie in `[l_min, l_max]`:
//!
//! - *whole prefix*: if `i < l_max`, `[0, i]` as one segment;
//! - *extension*: once two minimum-length segments fit (`i >= 2·l_min − 1`),
//!   a last segment `[s, i]` of admissible length with `s >= l_min`, added to
//!   the best cover of `[0, s − 1]`.
//!
//! Candidates are tried whole prefix first, then by increasing last-segment
//! length; only a strictly smaller total replaces the current best. The
//! winning start of every cell is recorded and the partition is recovered by
//! walking those starts back from `n − 1`.
//!
//! Every cell depends only on cells with smaller indices. With the `parallel`
//! feature the candidates of one end position are scored concurrently and
//! then reduced in the sequential order above.

use std::fmt;

use crate::classify::NearestTemplate;
use crate::error::{try_vec, DigitError, Result};
use crate::score::DistanceScore;
use crate::sequence::FeatureView;
use crate::templates::{Digit, LabeledScore};
use crate::traits::{SegmentScorer, TemplateSource};

/// One recognised digit within the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub digit: Digit,
    /// First frame, inclusive.
    pub start: usize,
    /// Last frame, inclusive.
    pub end: usize,
    /// Classification score of this segment on its own.
    pub score: DistanceScore,
}

#[allow(clippy::len_without_is_empty)]
impl Segment {
    /// Number of frames; never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Optimal partition of a sequence into labelled segments.
///
/// Segments are ordered, contiguous and together cover every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentationResult {
    segments: Vec<Segment>,
    score: DistanceScore,
}

impl SegmentationResult {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Recognised digits, in order.
    pub fn digits(&self) -> Vec<Digit> {
        self.segments.iter().map(|s| s.digit).collect()
    }

    /// Start frame of every segment; the first is always 0.
    pub fn splits(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.start).collect()
    }

    /// Total cost of the partition.
    pub fn score(&self) -> DistanceScore {
        self.score
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl fmt::Display for SegmentationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.segments {
            write!(f, "{}", s.digit)?;
        }
        Ok(())
    }
}

/// Best cover of `[0, i]` found so far.
#[derive(Clone, Copy, Debug)]
struct Cell {
    total: DistanceScore,
    digit: Option<Digit>,
    start: usize,
    segment_score: DistanceScore,
}

impl Cell {
    const UNREACHED: Cell = Cell {
        total: DistanceScore::Infeasible,
        digit: None,
        start: 0,
        segment_score: DistanceScore::Infeasible,
    };
}

/// Segmentation dynamic program over an arbitrary [`SegmentScorer`].
#[derive(Clone, Debug)]
pub struct SegmentationPlanner<C> {
    scorer: C,
    l_min: usize,
    l_max: usize,
}

impl<C: SegmentScorer> SegmentationPlanner<C> {
    /// Planner accepting segment lengths in `[l_min, l_max]`.
    ///
    /// # Errors
    /// [`DigitError::InvalidArgument`] if `l_min == 0` or `l_min > l_max`.
    pub fn new(scorer: C, l_min: usize, l_max: usize) -> Result<Self> {
        if l_min == 0 {
            return Err(DigitError::invalid_argument(
                "minimum segment length must be at least 1",
            ));
        }
        if l_min > l_max {
            return Err(DigitError::invalid_argument(format!(
                "minimum segment length {l_min} exceeds maximum {l_max}"
            )));
        }
        Ok(Self {
            scorer,
            l_min,
            l_max,
        })
    }

    pub fn scorer(&self) -> &C {
        &self.scorer
    }

    pub fn length_bounds(&self) -> (usize, usize) {
        (self.l_min, self.l_max)
    }

    /// Split `seq` into the cheapest admissible sequence of segments.
    ///
    /// # Errors
    /// - [`DigitError::InvalidArgument`] if `l_max` exceeds the sequence length.
    /// - [`DigitError::NoFeasiblePartition`] if no admissible partition has a
    ///   finite cost.
    /// - Any error returned by the scorer.
    pub fn plan<'a>(&self, seq: impl Into<FeatureView<'a>>) -> Result<SegmentationResult> {
        let seq = seq.into();
        let n = seq.len();
        if self.l_max > n {
            return Err(DigitError::invalid_argument(format!(
                "maximum segment length {} exceeds sequence length {n}",
                self.l_max
            )));
        }

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("segment", len = n, l_min = self.l_min, l_max = self.l_max);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut best: Vec<Cell> = try_vec(n, "allocating the segmentation table")?;
        best.resize(n, Cell::UNREACHED);

        for end in (self.l_min - 1)..n {
            #[cfg(feature = "tracing")]
            let cell_span = tracing::trace_span!("segment_end", end);
            #[cfg(feature = "tracing")]
            let _cell_enter = cell_span.enter();

            best[end] = self.best_cover(seq, &best, end)?;
        }

        let result = self.backtrack(&best)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            digits = result.len(),
            score = %result.score(),
            "segmentation complete"
        );

        Ok(result)
    }

    fn best_cover(&self, seq: FeatureView<'_>, best: &[Cell], end: usize) -> Result<Cell> {
        let mut cell = Cell::UNREACHED;

        if end < self.l_max {
            let whole = checked(self.scorer.score(seq.view(0, end)?)?);
            cell = Cell {
                total: whole.score,
                digit: whole.digit,
                start: 0,
                segment_score: whole.score,
            };
        }

        if end + 1 >= self.l_min.saturating_mul(2) {
            let starts = self.extension_starts(best, end)?;
            let scored = score_segments(&self.scorer, seq, &starts, end)?;
            for (&start, labeled) in starts.iter().zip(scored) {
                let labeled = checked(labeled);
                let total = labeled.score + best[start - 1].total;
                if total < cell.total {
                    cell = Cell {
                        total,
                        digit: labeled.digit,
                        start,
                        segment_score: labeled.score,
                    };
                }
            }
        }

        Ok(cell)
    }

    /// Starts of admissible last segments ending at `end`, by increasing
    /// length, whose prefix `[0, start - 1]` has a finite cover.
    fn extension_starts(&self, best: &[Cell], end: usize) -> Result<Vec<usize>> {
        // start = end - j, j in [l_min - 1, l_max - 1], start >= l_min
        let longest = (self.l_max - 1).min(end - self.l_min);
        let mut starts = try_vec(
            (longest + 1).saturating_sub(self.l_min - 1),
            "collecting candidate segment starts",
        )?;
        starts.extend(
            (self.l_min - 1..=longest)
                .map(|j| end - j)
                .filter(|&start| best[start - 1].total.is_feasible()),
        );
        Ok(starts)
    }

    fn backtrack(&self, best: &[Cell]) -> Result<SegmentationResult> {
        let n = best.len();
        let infeasible = || DigitError::NoFeasiblePartition {
            len: n,
            l_min: self.l_min,
            l_max: self.l_max,
        };
        let last = best.last().ok_or_else(infeasible)?;
        if last.total.is_infeasible() {
            return Err(infeasible());
        }

        let mut segments = segment_buffer(n, self.l_min)?;
        let mut end = n - 1;
        loop {
            let cell = best[end];
            let digit = cell.digit.ok_or_else(infeasible)?;
            segments.push(Segment {
                digit,
                start: cell.start,
                end,
                score: cell.segment_score,
            });
            if cell.start == 0 {
                break;
            }
            end = cell.start - 1;
        }
        segments.reverse();

        Ok(SegmentationResult {
            segments,
            score: last.total,
        })
    }
}

/// Scorer output with a non-finite `Finite` turned into `Infeasible`.
fn checked(labeled: LabeledScore) -> LabeledScore {
    let score = labeled.score.normalized();
    if score.is_infeasible() {
        return LabeledScore::NONE;
    }
    LabeledScore { score, ..labeled }
}

/// Room for the longest possible partition of `n` frames.
fn segment_buffer(n: usize, l_min: usize) -> Result<Vec<Segment>> {
    try_vec(n / l_min.max(1), "allocating the segmentation result")
}

#[cfg(feature = "parallel")]
fn score_segments<C: SegmentScorer>(
    scorer: &C,
    seq: FeatureView<'_>,
    starts: &[usize],
    end: usize,
) -> Result<Vec<LabeledScore>> {
    use rayon::prelude::*;

    starts
        .par_iter()
        .map(|&start| scorer.score(seq.view(start, end)?))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_segments<C: SegmentScorer>(
    scorer: &C,
    seq: FeatureView<'_>,
    starts: &[usize],
    end: usize,
) -> Result<Vec<LabeledScore>> {
    starts
        .iter()
        .map(|&start| scorer.score(seq.view(start, end)?))
        .collect()
}

/// Cheapest partition of `seq` into digit segments of length
/// `[l_min, l_max]`, each scored by nearest-template classification.
///
/// # Errors
/// - [`DigitError::InvalidArgument`] for `l_min == 0`, `l_min > l_max` or
///   `l_max > seq.len()`; reported before any alignment is computed.
/// - [`DigitError::NoFeasiblePartition`] if every admissible partition
///   contains a segment that cannot be aligned within `locality`.
/// - [`DigitError::ArityMismatch`] / [`DigitError::AllocationFailure`] from
///   the underlying alignments.
pub fn segment<'a, S>(
    seq: impl Into<FeatureView<'a>>,
    store: &S,
    locality: usize,
    l_min: usize,
    l_max: usize,
) -> Result<SegmentationResult>
where
    S: TemplateSource + ?Sized,
{
    SegmentationPlanner::new(NearestTemplate::new(store, locality), l_min, l_max)?.plan(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::FeatureSequence;
    use crate::templates::TemplateStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(v: u8) -> Digit {
        Digit::new(v).unwrap()
    }

    fn scalars(v: &[f64]) -> FeatureSequence {
        FeatureSequence::from_scalars(v).unwrap()
    }

    fn zero_one_store() -> TemplateStore {
        let mut store = TemplateStore::new();
        store.insert(d(0), scalars(&[0.0, 0.0, 0.0])).unwrap();
        store.insert(d(1), scalars(&[5.0, 5.0, 5.0])).unwrap();
        store
    }

    /// Scores a segment by its length only: `cost[len]`, label = len % 10.
    struct LengthCost(Vec<f64>);

    impl SegmentScorer for LengthCost {
        fn score(&self, segment: FeatureView<'_>) -> Result<LabeledScore> {
            Ok(LabeledScore {
                digit: Digit::new((segment.len() % 10) as u8),
                score: DistanceScore::new(self.0[segment.len()]),
            })
        }
    }

    #[test]
    fn two_digit_scenario() {
        let store = zero_one_store();
        let input = scalars(&[0.0, 0.0, 0.0, 5.0, 5.0, 5.0]);
        let r = segment(&input, &store, 0, 3, 3).unwrap();
        assert_eq!(r.digits(), vec![d(0), d(1)]);
        assert_eq!(r.splits(), vec![0, 3]);
        assert_eq!(r.score(), DistanceScore::ZERO);
        assert_eq!(r.to_string(), "01");
        assert_eq!(r.segments()[1].end, 5);
    }

    #[test]
    fn single_segment_when_it_covers_everything() {
        let store = zero_one_store();
        let input = scalars(&[5.0, 5.0, 5.0]);
        let r = segment(&input, &store, 0, 3, 3).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.segments()[0].digit, d(1));
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let store = zero_one_store();
        let input = scalars(&[0.0; 6]);
        for (l_min, l_max) in [(0, 3), (4, 3), (3, 7)] {
            assert!(matches!(
                segment(&input, &store, 0, l_min, l_max),
                Err(DigitError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn no_partition_reported() {
        // 7 frames cannot be split into segments of length exactly 3.
        let store = zero_one_store();
        let input = scalars(&[0.0; 7]);
        assert_eq!(
            segment(&input, &store, 0, 3, 3),
            Err(DigitError::NoFeasiblePartition {
                len: 7,
                l_min: 3,
                l_max: 3
            })
        );
    }

    #[test]
    fn picks_cheapest_combination_of_lengths() {
        // n = 5, lengths in [1, 3]; length 2 is free, 1 costs 0.5, 3 costs 0.2.
        // {2, 3} in either order (0.2) beats any split using a 1 (0.5). At the
        // last end the 2-frame tail is tried before the 3-frame one.
        let costs = LengthCost(vec![9.0, 0.5, 0.0, 0.2]);
        let planner = SegmentationPlanner::new(costs, 1, 3).unwrap();
        let input = scalars(&[0.0; 5]);
        let r = planner.plan(&input).unwrap();
        let lens: Vec<usize> = r.segments().iter().map(Segment::len).collect();
        assert_eq!(lens, vec![3, 2]);
        assert_eq!(r.score(), DistanceScore::Finite(0.2));
    }

    #[test]
    fn ties_prefer_first_candidate() {
        // All lengths cost 0: whole prefix (tried first) must win at every end.
        let free = LengthCost(vec![0.0; 5]);
        let planner = SegmentationPlanner::new(&free, 1, 4).unwrap();
        let r = planner.plan(&scalars(&[0.0; 4])).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.splits(), vec![0]);

        // Beyond l_max the shortest admissible last segment is tried first.
        let planner = SegmentationPlanner::new(&free, 1, 2).unwrap();
        let r = planner.plan(&scalars(&[0.0; 3])).unwrap();
        // end 2: [0..1] + [2] is found before [0] + [1..2].
        assert_eq!(r.splits(), vec![0, 2]);
    }

    /// Counts calls, never labels anything.
    struct Counting<'c>(&'c AtomicUsize);

    impl SegmentScorer for Counting<'_> {
        fn score(&self, _segment: FeatureView<'_>) -> Result<LabeledScore> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(LabeledScore::NONE)
        }
    }

    /// Like [`LengthCost`] but hands back `Finite` without normalising.
    struct RawLengthCost(Vec<f64>);

    impl SegmentScorer for RawLengthCost {
        fn score(&self, segment: FeatureView<'_>) -> Result<LabeledScore> {
            Ok(LabeledScore {
                digit: Digit::new((segment.len() % 10) as u8),
                score: DistanceScore::Finite(self.0[segment.len()]),
            })
        }
    }

    #[test]
    fn bad_arguments_score_nothing() {
        let calls = AtomicUsize::new(0);
        for (l_min, l_max) in [(0, 3), (4, 3)] {
            let planner = SegmentationPlanner::new(Counting(&calls), l_min, l_max);
            assert!(matches!(planner, Err(DigitError::InvalidArgument { .. })));
        }
        let planner = SegmentationPlanner::new(Counting(&calls), 2, 7).unwrap();
        let err = planner.plan(&scalars(&[0.0; 6])).unwrap_err();
        assert!(matches!(err, DigitError::InvalidArgument { .. }));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn non_finite_scorer_output_is_infeasible() {
        let inf = f64::INFINITY;
        let costs = RawLengthCost(vec![0.0, inf, inf, inf]);
        let planner = SegmentationPlanner::new(costs, 1, 3).unwrap();
        assert_eq!(
            planner.plan(&scalars(&[0.0; 3])),
            Err(DigitError::NoFeasiblePartition {
                len: 3,
                l_min: 1,
                l_max: 3
            })
        );

        // A NaN length is skipped in favour of the finite ones.
        let costs = RawLengthCost(vec![0.0, 1.0, f64::NAN, 1.0]);
        let planner = SegmentationPlanner::new(costs, 1, 3).unwrap();
        let r = planner.plan(&scalars(&[0.0; 3])).unwrap();
        assert_eq!(r.score(), DistanceScore::Finite(1.0));
        assert_eq!(r.len(), 1);
        assert!(r.segments().iter().all(|s| s.score.is_feasible()));
    }

    #[test]
    fn result_buffer_is_allocated_fallibly() {
        let buf = segment_buffer(11, 2).unwrap();
        assert!(buf.capacity() >= 5);
        assert!(matches!(
            segment_buffer(usize::MAX, 1),
            Err(DigitError::AllocationFailure {
                context: "allocating the segmentation result",
                ..
            })
        ));
    }

    #[test]
    fn infeasible_prefixes_are_not_scored() {
        let calls = AtomicUsize::new(0);
        let planner = SegmentationPlanner::new(Counting(&calls), 2, 3).unwrap();
        let err = planner.plan(&scalars(&[0.0; 6])).unwrap_err();
        assert!(matches!(err, DigitError::NoFeasiblePartition { .. }));
        // Only the whole-prefix candidates (ends 1 and 2) reach the scorer.
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn segments_respect_bounds_and_cover() {
        let store = zero_one_store();
        let input = scalars(&[0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 5.0, 5.0, 0.0, 0.0]);
        let r = segment(&input, &store, 2, 2, 5).unwrap();
        let segs = r.segments();
        assert_eq!(segs[0].start, 0);
        assert_eq!(segs.last().unwrap().end, input.len() - 1);
        for w in segs.windows(2) {
            assert_eq!(w[0].end + 1, w[1].start);
        }
        for s in segs {
            assert!((2..=5).contains(&s.len()));
        }
        // The zero-cost run of five 5s is split 3 + 2: at end 8 the shorter
        // tail is tried first and nothing later improves on zero.
        assert_eq!(r.digits(), vec![d(0), d(1), d(1), d(0)]);
        assert_eq!(r.splits(), vec![0, 4, 7, 9]);
        assert_eq!(r.score(), DistanceScore::ZERO);
    }
}
