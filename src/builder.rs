use crate::classify::classify;
use crate::error::{DigitError, Result};
use crate::segment::{segment, SegmentationResult};
use crate::sequence::FeatureView;
use crate::templates::LabeledScore;
use crate::traits::TemplateSource;
use crate::utils::{default_locality, template_length_bounds};

/// Parameters shared by every call of a [`Recognizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecognizerConfig {
    /// Half-width of the alignment band.
    pub locality: usize,
    /// Shortest admissible segment, in frames.
    pub l_min: usize,
    /// Longest admissible segment, in frames.
    pub l_max: usize,
}

impl RecognizerConfig {
    pub fn new(locality: usize, l_min: usize, l_max: usize) -> Result<Self> {
        let config = Self {
            locality,
            l_min,
            l_max,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the length bounds on their own; the bound against a concrete
    /// sequence length is checked by [`segment`].
    pub fn validate(&self) -> Result<()> {
        if self.l_min == 0 {
            return Err(DigitError::invalid_argument(
                "minimum segment length must be at least 1",
            ));
        }
        if self.l_min > self.l_max {
            return Err(DigitError::invalid_argument(format!(
                "minimum segment length {} exceeds maximum {}",
                self.l_min, self.l_max
            )));
        }
        Ok(())
    }
}

pub struct RecognizerBuilder<S> {
    store: S,
    locality: Option<usize>,
    length_bounds: Option<(usize, usize)>,
}

impl<S: TemplateSource> RecognizerBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locality: None,
            length_bounds: None,
        }
    }
    pub fn with_locality(mut self, locality: usize) -> Self {
        self.locality = Some(locality);
        self
    }
    pub fn with_length_bounds(mut self, l_min: usize, l_max: usize) -> Self {
        self.length_bounds = Some((l_min, l_max));
        self
    }
    pub fn with_config(self, config: RecognizerConfig) -> Self {
        self.with_locality(config.locality)
            .with_length_bounds(config.l_min, config.l_max)
    }
    /// Unset bounds default to the template length range, unset locality to
    /// [`default_locality`] of the bounds.
    pub fn build(self) -> Result<Recognizer<S>> {
        let (l_min, l_max) = match self.length_bounds {
            Some(bounds) => bounds,
            None => template_length_bounds(&self.store).ok_or_else(|| {
                DigitError::invalid_argument(
                    "length bounds are required when the template set is empty",
                )
            })?,
        };
        let locality = self
            .locality
            .unwrap_or_else(|| default_locality(l_min, l_max));
        let config = RecognizerConfig::new(locality, l_min, l_max)?;
        Ok(Recognizer {
            store: self.store,
            config,
        })
    }
}

/// A template set bundled with fixed recognition parameters.
pub struct Recognizer<S> {
    store: S,
    config: RecognizerConfig,
}

impl<S: TemplateSource> Recognizer<S> {
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Nearest-template label for an isolated digit.
    pub fn classify<'a>(&self, seq: impl Into<FeatureView<'a>>) -> Result<LabeledScore> {
        classify(seq, &self.store, self.config.locality)
    }

    /// Optimal digit sequence for an unsegmented recording.
    pub fn segment<'a>(&self, seq: impl Into<FeatureView<'a>>) -> Result<SegmentationResult> {
        segment(
            seq,
            &self.store,
            self.config.locality,
            self.config.l_min,
            self.config.l_max,
        )
    }
}
