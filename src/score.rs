//! Alignment and segmentation costs with an explicit infeasible state.
//!
//! `DistanceScore` is totally ordered: every finite score compares below
//! [`DistanceScore::Infeasible`], and finite scores compare with
//! `f64::total_cmp`. Addition absorbs into `Infeasible`, so a sentinel can
//! never be turned back into a finite-looking number.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceScore {
    /// A reachable cost. Must hold a finite value; build it through
    /// [`DistanceScore::new`] when the value may overflow or be NaN.
    /// Costs built from [`frame_cost`](crate::dtw::frame_cost) are also
    /// non-negative.
    Finite(f64),
    /// No alignment path or partition exists.
    Infeasible,
}

impl DistanceScore {
    pub const ZERO: Self = Self::Finite(0.0);

    /// Wrap a raw value; non-finite inputs (overflow, NaN) become `Infeasible`.
    #[inline]
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Finite(value)
        } else {
            Self::Infeasible
        }
    }

    /// Re-check a score that may have been built directly as `Finite`.
    #[inline]
    pub fn normalized(self) -> Self {
        match self {
            Self::Finite(v) => Self::new(v),
            Self::Infeasible => Self::Infeasible,
        }
    }

    #[inline]
    pub fn is_feasible(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    #[inline]
    pub fn is_infeasible(self) -> bool {
        !self.is_feasible()
    }

    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Infeasible => None,
        }
    }

    /// The finite value, or `f64::INFINITY` for the sentinel.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::INFINITY)
    }

    /// Smaller of two scores; `self` wins ties.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Default for DistanceScore {
    fn default() -> Self {
        Self::Infeasible
    }
}

impl From<f64> for DistanceScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Add for DistanceScore {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Finite(a), Self::Finite(b)) => Self::new(a + b),
            _ => Self::Infeasible,
        }
    }
}

impl Add<f64> for DistanceScore {
    type Output = Self;

    #[inline]
    fn add(self, rhs: f64) -> Self {
        self + Self::new(rhs)
    }
}

impl AddAssign for DistanceScore {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl PartialEq for DistanceScore {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DistanceScore {}

impl PartialOrd for DistanceScore {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistanceScore {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a.total_cmp(b),
            (Self::Finite(_), Self::Infeasible) => Ordering::Less,
            (Self::Infeasible, Self::Finite(_)) => Ordering::Greater,
            (Self::Infeasible, Self::Infeasible) => Ordering::Equal,
        }
    }
}

impl fmt::Display for DistanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v}"),
            Self::Infeasible => f.write_str("infeasible"),
        }
    }
}
