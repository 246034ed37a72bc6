use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, EntityError, Result};
use crate::math::checker::check_contrast;
use crate::math::color::{Color, Rgb};
use crate::math::color_parse::parse_color;
use crate::math::composite::{blend_over, flatten_layers};
use crate::parser::extract_entities;
use crate::parser::weighting::analyze_text_colors;
use crate::quantize::extract_dominant;
use crate::quantize::raster::RasterImage;
use crate::types::{
    AnalysisResult, BackgroundSource, BackgroundSpec, BatchSummary, CandidateContrast, EntityAnalysis,
    EntityOutcome, EntityReport, ResolvedBackground, SlideInput, Summary, TextEntity,
};

/// Canvas that translucent backgrounds are composited onto.
const CANVAS: Rgb = Rgb::WHITE;

/// Resolve a slide background to one opaque color.
///
/// Explicit colors are used as given (composited over white when translucent).
/// An image background is quantized and its top-weighted color is used.
///
/// # Errors
///
/// - [`AnalysisError::MalformedColor`] for an unparseable color or layer.
/// - [`AnalysisError::MissingBackground`] for an image background without an
///   image, or an empty layer list.
/// - [`AnalysisError::InvalidRegion`] for a zero palette size or a region
///   outside the image.
pub fn resolve_background(spec: &BackgroundSpec, image: Option<&RasterImage>, config: &AnalyzerConfig) -> Result<ResolvedBackground> {
    let resolved = match spec {
        BackgroundSpec::Solid { color } => {
            let parsed = parse_color(color)?;
            ResolvedBackground {
                effective: blend_over(parsed, CANVAS),
                source: BackgroundSource::Solid { color: color.clone() },
            }
        }
        BackgroundSpec::Layered { layers } => {
            if layers.is_empty() {
                return Err(AnalysisError::MissingBackground);
            }
            let parsed = layers
                .iter()
                .map(|layer| parse_color(layer))
                .collect::<std::result::Result<Vec<Color>, _>>()?;
            ResolvedBackground {
                effective: flatten_layers(&parsed, CANVAS),
                source: BackgroundSource::Layered { layers: layers.clone() },
            }
        }
        BackgroundSpec::Image { region } => {
            let image = image.ok_or(AnalysisError::MissingBackground)?;
            let palette = extract_dominant(image, *region, config.palette_size, config)?;
            let top = palette
                .first()
                .ok_or_else(|| AnalysisError::invalid_region("quantization produced no colors"))?;
            ResolvedBackground {
                effective: blend_over(top.color, CANVAS),
                source: BackgroundSource::Image {
                    region: *region,
                    palette,
                },
            }
        }
    };
    debug!(effective = %resolved.effective, "resolved background");
    Ok(resolved)
}

/// Analyze every text entity of one slide against its background.
///
/// Background resolution failures abort the slide. Entity faults do not: the
/// entity is reported as skipped with a diagnostic and the rest are analyzed.
#[instrument(skip_all, fields(slide = %slide.id))]
pub fn analyze_slide(slide: &SlideInput, image: Option<&RasterImage>, config: &AnalyzerConfig) -> Result<AnalysisResult> {
    config.validate()?;
    let default_color = config.default_text_color()?;
    let background = resolve_background(&slide.background, image, config)?;

    let entities: Vec<EntityReport> = extract_entities(&slide.html, default_color)
        .iter()
        .map(|entity| {
            let outcome = match analyze_entity(entity, background.effective, default_color, config) {
                Ok(analysis) => {
                    debug!(entity = %entity.id, ratio = analysis.min_ratio, "analyzed entity");
                    EntityOutcome::Analyzed(Box::new(analysis))
                }
                Err(err) => {
                    warn!(entity = %entity.id, %err, "skipping entity");
                    EntityOutcome::Skipped {
                        diagnostic: err.to_string(),
                    }
                }
            };
            EntityReport {
                id: entity.id.clone(),
                outcome,
            }
        })
        .collect();

    let summary = summarize(&entities);
    Ok(AnalysisResult {
        slide_id: slide.id.clone(),
        background,
        method: config.method,
        entities,
        summary,
    })
}

/// Decode `png_bytes` (if any) and analyze the slide against it.
///
/// # Errors
///
/// Returns [`AnalysisError::ImageDecode`] for undecodable bytes, plus everything
/// [`analyze_slide`] returns.
pub fn analyze_slide_png(slide: &SlideInput, png_bytes: Option<&[u8]>, config: &AnalyzerConfig) -> Result<AnalysisResult> {
    let image = png_bytes.map(RasterImage::decode_png).transpose()?;
    analyze_slide(slide, image.as_ref(), config)
}

/// Analyze many slides in parallel; results keep input order.
///
/// Each slide is an independent analysis. A failed slide does not affect the
/// others and is counted in the returned [`BatchSummary`].
pub fn analyze_batch(slides: &[SlideInput], image: Option<&RasterImage>, config: &AnalyzerConfig) -> (Vec<Result<AnalysisResult>>, BatchSummary) {
    let results: Vec<Result<AnalysisResult>> = slides
        .par_iter()
        .map(|slide| analyze_slide(slide, image, config))
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let summary = BatchSummary {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
    };
    info!(total = summary.total, succeeded, failed = summary.failed, "batch analyzed");
    (results, summary)
}

fn analyze_entity(entity: &TextEntity, background: Rgb, default_color: Color, config: &AnalyzerConfig) -> std::result::Result<EntityAnalysis, EntityError> {
    let font = entity.font(config.default_font_size_px)?;
    let weighted = analyze_text_colors(&entity.runs, font.size_px(), default_color);

    let candidates: Vec<CandidateContrast> = weighted
        .iter()
        .map(|w| CandidateContrast {
            color: w.color,
            weight: w.weight,
            result: check_contrast(w.color, background, &font),
        })
        .collect();

    // Worst case governs; the first candidate wins a tie
    let worst = candidates
        .iter()
        .min_by(|a, b| a.result.exact_ratio.total_cmp(&b.result.exact_ratio))
        .ok_or(EntityError::NoTextColor)?;
    let best = candidates
        .iter()
        .max_by(|a, b| a.result.exact_ratio.total_cmp(&b.result.exact_ratio))
        .ok_or(EntityError::NoTextColor)?;

    Ok(EntityAnalysis {
        font,
        geometry: entity.geometry(),
        text_content: entity.text_content.clone(),
        min_ratio: worst.result.ratio,
        max_ratio: best.result.ratio,
        wcag: worst.result.wcag,
        suggestions: worst.result.suggestions.clone(),
        warnings: entity.warnings.clone(),
        candidates,
    })
}

fn summarize(entities: &[EntityReport]) -> Summary {
    let mut summary = Summary {
        total_entities: entities.len(),
        ..Summary::default()
    };
    for report in entities {
        match report.analysis() {
            Some(analysis) => {
                summary.analyzed += 1;
                if analysis.wcag.aa_normal {
                    summary.passed_aa_normal += 1;
                } else {
                    summary.failed_aa_normal += 1;
                }
                if analysis.wcag.passes_aa() {
                    summary.passed_aa += 1;
                }
            }
            None => summary.skipped += 1,
        }
    }
    summary
}
