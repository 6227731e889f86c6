//! Error taxonomy for the recognition core.
//!
//! An infeasible alignment is *not* an error: it is the
//! [`DistanceScore::Infeasible`](crate::score::DistanceScore::Infeasible)
//! value. It only becomes one when it leaves the whole segmentation without a
//! valid partition, which is reported as [`DigitError::NoFeasiblePartition`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigitError {
    #[error("invalid range [{start}, {end}] for a sequence of {len} frames")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("allocation of {requested} cells failed while {context}")]
    AllocationFailure {
        context: &'static str,
        requested: usize,
    },

    #[error("no feasible partition of {len} frames into segments of length [{l_min}, {l_max}]")]
    NoFeasiblePartition {
        len: usize,
        l_min: usize,
        l_max: usize,
    },

    #[error("coefficient arity mismatch: expected {expected}, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
    },

    #[error("feature sequence must contain at least one frame and one coefficient")]
    EmptySequence,

    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl DigitError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn allocation(context: &'static str, requested: usize) -> Self {
        Self::AllocationFailure { context, requested }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self::InvalidRange { start, end, len }
    }
}

pub type Result<T> = std::result::Result<T, DigitError>;

/// Reserve room for exactly `len` elements, mapping exhaustion to
/// [`DigitError::AllocationFailure`].
pub(crate) fn try_vec<T>(len: usize, context: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| DigitError::allocation(context, len))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = DigitError::invalid_range(4, 2, 10);
        assert_eq!(
            err.to_string(),
            "invalid range [4, 2] for a sequence of 10 frames"
        );
        let err = DigitError::ArityMismatch {
            expected: 13,
            found: 12,
        };
        assert!(err.to_string().contains("expected 13, found 12"));
    }

    #[test]
    fn try_vec_reports_allocation_failure() {
        let err = try_vec::<u64>(usize::MAX, "testing").unwrap_err();
        assert!(matches!(
            err,
            DigitError::AllocationFailure {
                context: "testing",
                ..
            }
        ));
    }

    #[test]
    fn try_vec_reserves_capacity() {
        let v = try_vec::<f64>(16, "testing").unwrap();
        assert!(v.capacity() >= 16);
        assert!(v.is_empty());
    }
}
