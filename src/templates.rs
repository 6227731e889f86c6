//! Digit labels and the labelled template set.

use std::fmt;

use crate::error::{DigitError, Result};
use crate::score::DistanceScore;
use crate::sequence::FeatureSequence;
use crate::traits::TemplateSource;

/// A spoken digit label in `0..=9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Digit(u8);

impl Digit {
    pub const COUNT: usize = 10;

    /// All labels in increasing order; this is the classifier's scan order.
    pub const ALL: [Digit; 10] = [
        Digit(0),
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
    ];

    pub fn new(value: u8) -> Option<Self> {
        (value < 10).then_some(Self(value))
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Digit {
    type Error = DigitError;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
            .ok_or_else(|| DigitError::invalid_argument(format!("{value} is not a digit label")))
    }
}

impl From<Digit> for u8 {
    fn from(d: Digit) -> u8 {
        d.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Best label and score for one classified sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabeledScore {
    /// `None` when no template could be aligned.
    pub digit: Option<Digit>,
    pub score: DistanceScore,
}

impl LabeledScore {
    pub const NONE: Self = Self {
        digit: None,
        score: DistanceScore::Infeasible,
    };
}

impl Default for LabeledScore {
    fn default() -> Self {
        Self::NONE
    }
}

/// Labelled exemplars, kept in insertion order per digit.
///
/// All templates share one coefficient arity, fixed by the first insert.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    samples: [Vec<FeatureSequence>; Digit::COUNT],
    arity: Option<usize>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template for `digit`.
    pub fn insert(&mut self, digit: Digit, template: FeatureSequence) -> Result<()> {
        match self.arity {
            Some(expected) if expected != template.arity() => {
                return Err(DigitError::ArityMismatch {
                    expected,
                    found: template.arity(),
                });
            }
            _ => self.arity = Some(template.arity()),
        }
        self.samples[digit.index()].push(template);
        Ok(())
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with_template(mut self, digit: Digit, template: FeatureSequence) -> Result<Self> {
        self.insert(digit, template)?;
        Ok(self)
    }

    pub fn templates_for(&self, digit: Digit) -> &[FeatureSequence] {
        &self.samples[digit.index()]
    }

    /// Total number of templates across all digits.
    pub fn len(&self) -> usize {
        self.samples.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// `(digit, template)` pairs in classification order.
    pub fn iter(&self) -> impl Iterator<Item = (Digit, &FeatureSequence)> + '_ {
        Digit::ALL
            .into_iter()
            .flat_map(move |d| self.templates_for(d).iter().map(move |t| (d, t)))
    }
}

impl TemplateSource for TemplateStore {
    fn templates_for(&self, digit: Digit) -> &[FeatureSequence] {
        TemplateStore::templates_for(self, digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: u8) -> Digit {
        Digit::new(v).unwrap()
    }

    #[test]
    fn digit_range() {
        assert!(Digit::new(9).is_some());
        assert!(Digit::new(10).is_none());
        assert!(Digit::try_from(12u8).is_err());
        assert_eq!(Digit::ALL.len(), Digit::COUNT);
        assert_eq!(d(7).to_string(), "7");
        assert_eq!(u8::from(d(3)), 3);
    }

    #[test]
    fn insert_keeps_order_and_checks_arity() {
        let a = FeatureSequence::from_scalars(&[1.0]).unwrap();
        let b = FeatureSequence::from_scalars(&[2.0, 2.0]).unwrap();
        let wide = FeatureSequence::from_coefficients(&[[1.0], [2.0]]).unwrap();

        let mut store = TemplateStore::new();
        assert!(store.is_empty());
        store.insert(d(4), a.clone()).unwrap();
        store.insert(d(4), b.clone()).unwrap();
        assert_eq!(store.templates_for(d(4)), &[a, b]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.arity(), Some(1));

        assert_eq!(
            store.insert(d(1), wide),
            Err(DigitError::ArityMismatch {
                expected: 1,
                found: 2
            })
        );
        assert!(store.templates_for(d(1)).is_empty());
    }

    #[test]
    fn iter_follows_label_then_insertion_order() {
        let seq = |v: f64| FeatureSequence::from_scalars(&[v]).unwrap();
        let store = TemplateStore::new()
            .with_template(d(5), seq(5.0))
            .unwrap()
            .with_template(d(0), seq(0.0))
            .unwrap()
            .with_template(d(5), seq(5.5))
            .unwrap();
        let order: Vec<(u8, f64)> = store
            .iter()
            .map(|(digit, t)| (digit.value(), t.value(0, 0)))
            .collect();
        assert_eq!(order, vec![(0, 0.0), (5, 5.0), (5, 5.5)]);
    }
}
