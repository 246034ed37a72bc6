use crate::math::color::Color;
use crate::types::{TextRun, WeightedColor};

/// Weight each run's color by `font_size_px × char_count`, the run's ink area.
///
/// Runs without a size use `fallback_size_px`. Weights are normalized to sum
/// to 1.0 and sorted descending; equal weights keep run order. When every run
/// is empty the entity gets a single full-weight `default_color`.
pub fn analyze_text_colors(runs: &[TextRun], fallback_size_px: f64, default_color: Color) -> Vec<WeightedColor> {
    let raw: Vec<WeightedColor> = runs
        .iter()
        .map(|run| {
            let size = run.font_size_px.unwrap_or(fallback_size_px);
            let size = if size.is_finite() { size.max(0.0) } else { 0.0 };
            WeightedColor {
                color: run.color,
                weight: size * run.char_count as f64,
            }
        })
        .collect();

    let total: f64 = raw.iter().map(|w| w.weight).sum();
    if total <= 0.0 {
        return vec![WeightedColor {
            color: default_color,
            weight: 1.0,
        }];
    }

    let mut weighted: Vec<WeightedColor> = raw
        .into_iter()
        .map(|w| WeightedColor {
            color: w.color,
            weight: w.weight / total,
        })
        .collect();
    // sort_by is stable
    weighted.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    weighted
}
