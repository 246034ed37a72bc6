use serde::Serialize;

use super::color::Rgb;
use super::font::{FontDescriptor, LARGE_TEXT_PX};
use super::wcag::{aa_target, contrast_ratio, round_ratio};

/// Background darkening ladder, tried in order. The first factor that reaches the target wins.
pub const DARKEN_FACTORS: [f64; 3] = [0.8, 0.6, 0.4];

const TEXT_SHADOW_CSS: &str = "text-shadow: 0 0 4px rgba(0, 0, 0, 0.8)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    InvertTextColor,
    ChangeTextColor,
    DarkenBackground,
    IncreaseFontSize,
    AddTextShadow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ProposedValue {
    Color(Rgb),
    FontSizePx(f64),
    Css(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub description: String,
    pub new_value: ProposedValue,
    /// None when the change does not alter the measured ratio in a computable way.
    pub expected_ratio: Option<f64>,
}

/// Remediation suggestions for a text/background pair that misses its AA target
/// (4.5, or 3.0 for large text). Empty when the target is already met.
///
/// Order is fixed: invert text, black/white text, darken background, enlarge font,
/// then one decorative text-shadow fallback that carries no ratio.
pub fn suggest_fixes(ratio: f64, text: Rgb, bg: Rgb, font: &FontDescriptor) -> Vec<Suggestion> {
    let target = aa_target(font);
    if ratio >= target {
        return Vec::new();
    }

    let mut suggestions = Vec::new();

    let inverted = text.inverted();
    let inv_ratio = contrast_ratio(inverted, bg);
    if inv_ratio >= target {
        suggestions.push(Suggestion {
            kind: SuggestionKind::InvertTextColor,
            description: format!("Invert the text color to {inverted}"),
            new_value: ProposedValue::Color(inverted),
            expected_ratio: Some(round_ratio(inv_ratio)),
        });
    }

    for (candidate, name) in [(Rgb::BLACK, "black"), (Rgb::WHITE, "white")] {
        let new_ratio = contrast_ratio(candidate, bg);
        if new_ratio >= target {
            suggestions.push(Suggestion {
                kind: SuggestionKind::ChangeTextColor,
                description: format!("Change the text color to {name}"),
                new_value: ProposedValue::Color(candidate),
                expected_ratio: Some(round_ratio(new_ratio)),
            });
        }
    }

    let darkened = DARKEN_FACTORS.iter().find_map(|&factor| {
        let candidate = bg.scaled(factor);
        let new_ratio = contrast_ratio(text, candidate);
        (new_ratio >= target).then_some((factor, candidate, new_ratio))
    });
    if let Some((factor, candidate, new_ratio)) = darkened {
        suggestions.push(Suggestion {
            kind: SuggestionKind::DarkenBackground,
            description: format!(
                "Darken the background by {}% to {candidate}",
                ((1.0 - factor) * 100.0).round()
            ),
            new_value: ProposedValue::Color(candidate),
            expected_ratio: Some(round_ratio(new_ratio)),
        });
    }

    if font.size_px() < LARGE_TEXT_PX {
        suggestions.push(Suggestion {
            kind: SuggestionKind::IncreaseFontSize,
            description: format!(
                "Increase the font size to at least {LARGE_TEXT_PX}px so the large-text threshold of 3:1 applies (currently {:.2}:1)",
                ratio
            ),
            new_value: ProposedValue::FontSizePx(LARGE_TEXT_PX),
            expected_ratio: Some(round_ratio(ratio)),
        });
    }

    suggestions.push(Suggestion {
        kind: SuggestionKind::AddTextShadow,
        description: "Add a text shadow or outline to improve legibility (does not change the measured ratio)"
            .to_string(),
        new_value: ProposedValue::Css(TEXT_SHADOW_CSS.to_string()),
        expected_ratio: None,
    });

    suggestions
}
