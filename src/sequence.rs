//! Frame-based feature matrices and borrowed views over them.
//!
//! A [`FeatureSequence`] is a `k × n` matrix: `k` coefficients (the arity)
//! per frame, `n >= 1` frames. Storage is coefficient-major, one contiguous
//! row per coefficient, which is the layout MFCC extractors emit.
//!
//! A [`FeatureView`] is a read-only window `[start, start + len)` over a
//! sequence. Views never copy and cannot outlive the sequence they borrow.

use crate::error::{DigitError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSequence {
    arity: usize,
    len: usize,
    /// `values[coeff * len + t]`
    values: Vec<f64>,
}

impl FeatureSequence {
    /// Build from coefficient-major rows: `rows[coeff][t]`.
    ///
    /// Every row must have the same, non-zero number of frames.
    pub fn from_coefficients<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let arity = rows.len();
        let len = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if arity == 0 || len == 0 {
            return Err(DigitError::EmptySequence);
        }
        let mut values = Vec::new();
        values
            .try_reserve_exact(arity * len)
            .map_err(|_| DigitError::allocation("copying feature rows", arity * len))?;
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != len {
                return Err(DigitError::RaggedRows {
                    row,
                    expected: len,
                    found: r.len(),
                });
            }
            values.extend_from_slice(r);
        }
        Ok(Self { arity, len, values })
    }

    /// Build from frame-major input: `frames[t][coeff]`.
    pub fn from_frames<F: AsRef<[f64]>>(frames: &[F]) -> Result<Self> {
        let len = frames.len();
        let arity = frames.first().map(|f| f.as_ref().len()).unwrap_or(0);
        if arity == 0 || len == 0 {
            return Err(DigitError::EmptySequence);
        }
        for (row, f) in frames.iter().enumerate() {
            if f.as_ref().len() != arity {
                return Err(DigitError::RaggedRows {
                    row,
                    expected: arity,
                    found: f.as_ref().len(),
                });
            }
        }
        let mut values = Vec::new();
        values
            .try_reserve_exact(arity * len)
            .map_err(|_| DigitError::allocation("transposing feature frames", arity * len))?;
        for coeff in 0..arity {
            values.extend(frames.iter().map(|f| f.as_ref()[coeff]));
        }
        Ok(Self { arity, len, values })
    }

    /// Single-coefficient sequence, one value per frame.
    pub fn from_scalars(values: &[f64]) -> Result<Self> {
        Self::from_coefficients(&[values])
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: construction rejects empty input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Coefficient `coeff` of frame `t`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn value(&self, coeff: usize, t: usize) -> f64 {
        assert!(
            t < self.len && coeff < self.arity,
            "({coeff}, {t}) out of bounds for a {}x{} sequence",
            self.arity,
            self.len
        );
        self.values[coeff * self.len + t]
    }

    /// Row of coefficient `coeff` across all frames.
    #[inline]
    pub fn coefficient(&self, coeff: usize) -> &[f64] {
        &self.values[coeff * self.len..(coeff + 1) * self.len]
    }

    /// Borrow the inclusive frame range `[start, end]`.
    pub fn view(&self, start: usize, end: usize) -> Result<FeatureView<'_>> {
        self.as_view().view(start, end)
    }

    /// Borrow the whole sequence.
    #[inline]
    pub fn as_view(&self) -> FeatureView<'_> {
        FeatureView {
            seq: self,
            start: 0,
            len: self.len,
        }
    }
}

impl<'a> From<&'a FeatureSequence> for FeatureView<'a> {
    fn from(seq: &'a FeatureSequence) -> Self {
        seq.as_view()
    }
}

/// Zero-copy window over a [`FeatureSequence`].
#[derive(Clone, Copy, Debug)]
pub struct FeatureView<'a> {
    seq: &'a FeatureSequence,
    start: usize,
    len: usize,
}

impl<'a> FeatureView<'a> {
    #[inline]
    pub fn arity(&self) -> usize {
        self.seq.arity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the first frame within the backing sequence.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Coefficient `coeff` of frame `t`, relative to the view.
    ///
    /// # Panics
    /// Panics if `t` lies outside the view or `coeff` outside the arity.
    #[inline]
    pub fn value(&self, coeff: usize, t: usize) -> f64 {
        assert!(
            t < self.len && coeff < self.seq.arity,
            "({coeff}, {t}) out of bounds for a {}x{} view",
            self.seq.arity,
            self.len
        );
        self.seq.values[coeff * self.seq.len + self.start + t]
    }

    /// Coefficient row restricted to the view.
    #[inline]
    pub fn coefficient(&self, coeff: usize) -> &'a [f64] {
        let row = coeff * self.seq.len + self.start;
        &self.seq.values[row..row + self.len]
    }

    /// Frame `t` as a freshly collected vector, relative to the view.
    pub fn frame(&self, t: usize) -> Vec<f64> {
        (0..self.arity()).map(|c| self.value(c, t)).collect()
    }

    /// Narrow to `[start, end]` (inclusive, relative to this view).
    pub fn view(&self, start: usize, end: usize) -> Result<FeatureView<'a>> {
        if start > end || end >= self.len {
            return Err(DigitError::invalid_range(start, end, self.len));
        }
        Ok(FeatureView {
            seq: self.seq,
            start: self.start + start,
            len: end - start + 1,
        })
    }

    /// Owned copy of the viewed frames.
    pub fn to_sequence(&self) -> Result<FeatureSequence> {
        let rows: Vec<&[f64]> = (0..self.arity()).map(|c| self.coefficient(c)).collect();
        FeatureSequence::from_coefficients(&rows)
    }
}
