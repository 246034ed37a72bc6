use serde::Serialize;

use super::color::{Color, Rgb};
use super::composite::blend_over;
use super::font::FontDescriptor;
use super::suggest::{suggest_fixes, Suggestion};
use super::wcag::{classify, contrast_ratio, round_ratio, WcagClassification};

/// Contrast verdict for one (text color, background, font) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastResult {
    /// Text color after compositing over the background.
    pub text: Rgb,
    pub background: Rgb,
    /// Rounded to two decimals.
    pub ratio: f64,
    #[serde(skip)]
    pub exact_ratio: f64,
    pub wcag: WcagClassification,
    pub suggestions: Vec<Suggestion>,
}

/// Check contrast for a single text color against an opaque background.
/// A translucent text color is composited over the background first; classification
/// uses the unrounded ratio.
pub fn check_contrast(text: Color, background: Rgb, font: &FontDescriptor) -> ContrastResult {
    let effective_text = blend_over(text, background);
    let exact_ratio = contrast_ratio(effective_text, background);
    let wcag = classify(exact_ratio, font);
    let suggestions = suggest_fixes(exact_ratio, effective_text, background, font);

    ContrastResult {
        text: effective_text,
        background,
        ratio: round_ratio(exact_ratio),
        exact_ratio,
        wcag,
        suggestions,
    }
}
