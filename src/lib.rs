//! Spoken digit recognition by dynamic time warping.
//!
//! This crate recognises digit strings from a precomputed frame-based
//! spectral representation (e.g. MFCC matrices), in three layers:
//!
//! 1. [`align`] measures the distance between two feature sequences under a
//!    Sakoe–Chiba band of half-width `locality`.
//! 2. [`classify`] labels an isolated digit with its nearest template.
//! 3. [`segment`] cuts an unsegmented recording into consecutive digits,
//!    choosing the partition that minimises the summed classification cost,
//!    and backtracks the winning cut points.
//!
//! Infeasible alignments are represented by [`DistanceScore::Infeasible`],
//! which absorbs additions instead of overflowing into a finite number.
//!
//! ## Quick start
//! ```
//! use dtw_digits::{segment, Digit, FeatureSequence, TemplateStore};
//!
//! let mut store = TemplateStore::new();
//! store.insert(Digit::ALL[0], FeatureSequence::from_scalars(&[0.0, 0.0, 0.0])?)?;
//! store.insert(Digit::ALL[1], FeatureSequence::from_scalars(&[5.0, 5.0, 5.0])?)?;
//!
//! let input = FeatureSequence::from_scalars(&[0.0, 0.0, 0.0, 5.0, 5.0, 5.0])?;
//! let result = segment(&input, &store, 0, 3, 3)?;
//! assert_eq!(result.to_string(), "01");
//! assert_eq!(result.splits(), vec![0, 3]);
//! # Ok::<(), dtw_digits::DigitError>(())
//! ```
//!
//! ## Features
//! - `parallel`: score templates and candidate segments on the rayon pool.
//!   Results are identical to the serial build.
//! - `tracing`: spans around alignment, classification and segmentation.
//! - `serde`: serialisation of configuration and results.
//! - `probe`: builds the `scale_probe` timing binary (pulls in `sysinfo`).

pub mod builder;
pub mod classify;
pub mod dtw;
pub mod error;
pub mod score;
pub mod segment;
pub mod sequence;
pub mod table;
pub mod templates;
pub mod traits;
pub mod utils;

pub use crate::builder::{Recognizer, RecognizerBuilder, RecognizerConfig};
pub use crate::classify::{classify, NearestTemplate};
pub use crate::dtw::{align, frame_cost};
pub use crate::error::{DigitError, Result};
pub use crate::score::DistanceScore;
pub use crate::segment::{segment, Segment, SegmentationPlanner, SegmentationResult};
pub use crate::sequence::{FeatureSequence, FeatureView};
pub use crate::templates::{Digit, LabeledScore, TemplateStore};
pub use crate::traits::{SegmentScorer, TemplateSource};
