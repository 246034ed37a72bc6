//! Error types for slide contrast analysis.

use thiserror::Error;

/// Result type alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A CSS color string that matches none of the supported grammars.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("malformed color: {input:?}")]
    Malformed { input: String },
}

impl ColorError {
    pub(crate) fn malformed(input: &str) -> Self {
        ColorError::Malformed {
            input: input.to_string(),
        }
    }
}

/// Failures that abort the analysis of a whole slide.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Degenerate image region or non-positive palette size.
    #[error("invalid image region: {reason}")]
    InvalidRegion { reason: String },

    /// Neither a color specification nor an image could be resolved.
    #[error("no resolvable background: slide has neither a color nor an image")]
    MissingBackground,

    /// Background color string could not be parsed.
    #[error(transparent)]
    MalformedColor(#[from] ColorError),

    /// Image bytes could not be decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Slide description could not be read.
    #[error("invalid slide description: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    pub(crate) fn invalid_region(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidRegion {
            reason: reason.into(),
        }
    }
}

impl From<png::DecodingError> for AnalysisError {
    fn from(err: png::DecodingError) -> Self {
        AnalysisError::ImageDecode(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::InvalidInput(err.to_string())
    }
}

/// Per-entity faults. These never abort a slide; the entity is reported as skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("font size must be a positive number of pixels, got {value}")]
    InvalidFontSize { value: f64 },

    #[error("entity has no text color to check")]
    NoTextColor,
}
