//! WCAG 2.2 contrast analysis for slide markup.
//!
//! A slide is HTML plus a background (a CSS color, a stack of color layers, or
//! a raster image). [`analyze_slide`] resolves the background to one opaque
//! color, extracts every `text-*` entity with its weighted text colors and
//! font, and reports contrast ratios, WCAG levels and remediation suggestions.

pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod parser;
pub mod quantize;
pub mod types;

pub use config::{AnalyzerConfig, KMeansConfig};
pub use engine::{analyze_batch, analyze_slide, analyze_slide_png, resolve_background};
pub use error::{AnalysisError, ColorError, EntityError, Result};
pub use math::color::{Color, Rgb};
pub use parser::extract_entities;
pub use quantize::raster::RasterImage;
pub use quantize::{extract_dominant, QuantizationMethod};
pub use types::{parse_slides, AnalysisResult, BackgroundSpec, SlideDescription, SlideInput};
