pub mod kmeans;
pub mod median_cut;
pub mod raster;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};
use crate::math::color::Color;
use crate::types::{Region, WeightedColor};
use kmeans::KMeans;
use median_cut::MedianCut;
use raster::RasterImage;

/// Reduces a pixel set to at most `k` weighted colors.
///
/// Implementations receive a non-empty pixel slice and `k >= 1`, and return a
/// palette sorted by descending weight whose weights sum to 1.0.
pub trait Quantizer {
    fn quantize(&self, pixels: &[[u8; 4]], k: usize) -> Vec<WeightedColor>;
}

/// Which quantizer reduces an image background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantizationMethod {
    #[default]
    #[serde(rename = "mediancut")]
    MedianCut,
    #[serde(rename = "kmeans")]
    KMeans,
}

impl QuantizationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantizationMethod::MedianCut => "mediancut",
            QuantizationMethod::KMeans => "kmeans",
        }
    }
}

impl fmt::Display for QuantizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantizationMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mediancut" | "median-cut" | "median_cut" => Ok(QuantizationMethod::MedianCut),
            "kmeans" | "k-means" => Ok(QuantizationMethod::KMeans),
            other => Err(AnalysisError::InvalidInput(format!(
                "unknown quantization method {other:?}"
            ))),
        }
    }
}

/// Dominant colors of `image`, or of `region` inside it.
///
/// The pixels are cropped, downsampled to `config.working_resolution`, then
/// handed to the quantizer `config.method` selects.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidRegion`] when `k` is zero, the image is
/// empty, or the region does not overlap the image.
pub fn extract_dominant(image: &RasterImage, region: Option<Region>, k: usize, config: &AnalyzerConfig) -> Result<Vec<WeightedColor>> {
    if k == 0 {
        return Err(AnalysisError::invalid_region("palette size must be at least 1"));
    }
    if image.pixels().is_empty() {
        return Err(AnalysisError::invalid_region("image has no pixels"));
    }

    let cropped;
    let source = match region {
        Some(region) => {
            cropped = image.crop(region)?;
            &cropped
        }
        None => image,
    };
    let working = source.downsample(config.working_resolution);

    let palette = match config.method {
        QuantizationMethod::MedianCut => MedianCut.quantize(working.pixels(), k),
        QuantizationMethod::KMeans => KMeans::new(config.kmeans).quantize(working.pixels(), k),
    };
    debug!(
        method = %config.method,
        k,
        width = working.width(),
        height = working.height(),
        colors = palette.len(),
        "quantized background"
    );
    Ok(palette)
}

/// Rounded mean color and mean opacity of a non-empty pixel set.
pub(crate) fn mean_color(pixels: &[[u8; 4]]) -> Color {
    let mut sums = [0u64; 4];
    for px in pixels {
        for (sum, &v) in sums.iter_mut().zip(px) {
            *sum += v as u64;
        }
    }
    let n = pixels.len().max(1) as f64;
    let channel = |sum: u64| (sum as f64 / n).round().clamp(0.0, 255.0) as u8;
    Color::new(
        channel(sums[0]),
        channel(sums[1]),
        channel(sums[2]),
        sums[3] as f64 / n / 255.0,
    )
}

/// Descending by weight; equal weights keep their order.
pub(crate) fn sort_by_weight(palette: &mut [WeightedColor]) {
    palette.sort_by(|a, b| b.weight.total_cmp(&a.weight));
}
