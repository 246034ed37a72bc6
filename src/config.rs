use serde::Deserialize;

use crate::error::{AnalysisError, Result};
use crate::math::color::Color;
use crate::math::color_parse::parse_color;
use crate::quantize::QuantizationMethod;

/// K-means restarts and convergence limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 10,
            max_iterations: 100,
        }
    }
}

/// Per-analysis settings. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Quantizer for image backgrounds.
    pub method: QuantizationMethod,
    /// Palette size `k` for image backgrounds.
    pub palette_size: usize,
    /// Longest side, in pixels, an image region is downsampled to before quantizing.
    pub working_resolution: u32,
    pub kmeans: KMeansConfig,
    /// Text color for runs with no color anywhere in their cascade.
    pub default_text_color: String,
    /// Font size for entities that declare none.
    pub default_font_size_px: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            method: QuantizationMethod::MedianCut,
            palette_size: 5,
            working_resolution: 150,
            kmeans: KMeansConfig::default(),
            default_text_color: "#000000".to_string(),
            default_font_size_px: 16.0,
        }
    }
}

impl AnalyzerConfig {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] for malformed JSON or unknown enum values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configured default text color, parsed.
    pub fn default_text_color(&self) -> Result<Color> {
        Ok(parse_color(&self.default_text_color)?)
    }

    /// Reject values no analysis can run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.default_font_size_px.is_finite() && self.default_font_size_px > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "default_font_size_px must be positive, got {}",
                self.default_font_size_px
            )));
        }
        if self.working_resolution == 0 {
            return Err(AnalysisError::InvalidInput(
                "working_resolution must be at least 1".to_string(),
            ));
        }
        self.default_text_color()?;
        Ok(())
    }
}
