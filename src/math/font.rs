use serde::{Deserialize, Serialize};

use crate::error::EntityError;

/// 18pt.
pub const LARGE_TEXT_PX: f64 = 24.0;
/// 14pt, large only when bold.
pub const LARGE_BOLD_TEXT_PX: f64 = 18.67;
/// Root font size assumed for `em` / `rem`.
pub const ROOT_FONT_SIZE_PX: f64 = 16.0;
pub const PT_TO_PX: f64 = 4.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    /// `bold`, `bolder`, or a numeric weight of at least 700.
    Bold,
}

impl FontWeight {
    /// Classify a CSS `font-weight` value. Unknown values are `Normal`.
    pub fn from_css(value: &str) -> FontWeight {
        let v = value.trim().to_ascii_lowercase();
        match v.as_str() {
            "bold" | "bolder" => FontWeight::Bold,
            _ => match v.parse::<f64>() {
                Ok(n) if n >= 700.0 => FontWeight::Bold,
                _ => FontWeight::Normal,
            },
        }
    }
}

/// Pixel size plus weight class. `is_large` is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontDescriptor {
    size_px: f64,
    weight: FontWeight,
}

impl FontDescriptor {
    pub fn new(size_px: f64, weight: FontWeight) -> Result<Self, EntityError> {
        if !(size_px.is_finite() && size_px > 0.0) {
            return Err(EntityError::InvalidFontSize { value: size_px });
        }
        Ok(Self { size_px, weight })
    }

    pub fn size_px(&self) -> f64 {
        self.size_px
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// WCAG large text: >= 24px, or >= 18.67px when bold.
    pub fn is_large(&self) -> bool {
        self.size_px >= LARGE_TEXT_PX || (self.size_px >= LARGE_BOLD_TEXT_PX && self.weight == FontWeight::Bold)
    }
}

/// Convert a CSS font-size to pixels.
///
/// `px` is identity, `pt` is x4/3, `em`/`rem` are relative to a 16px root, and a bare
/// number is taken as pixels. Returns None for any other unit or an unparseable number;
/// callers supply their own default.
pub fn parse_font_size_px(value: &str) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();

    let (number, factor) = if let Some(n) = v.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("pt") {
        (n, PT_TO_PX)
    } else if let Some(n) = v.strip_suffix("rem") {
        (n, ROOT_FONT_SIZE_PX)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, ROOT_FONT_SIZE_PX)
    } else {
        (v.as_str(), 1.0)
    };

    let n: f64 = number.trim().parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(n * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn font(size: f64, weight: FontWeight) -> FontDescriptor {
        FontDescriptor::new(size, weight).unwrap()
    }

    #[test]
    fn units() {
        assert_eq!(parse_font_size_px("16px"), Some(16.0));
        assert_relative_eq!(parse_font_size_px("12pt").unwrap(), 16.0, epsilon = 1e-9);
        assert_eq!(parse_font_size_px("1.5em"), Some(24.0));
        assert_eq!(parse_font_size_px("2rem"), Some(32.0));
        assert_eq!(parse_font_size_px(" 20PX "), Some(20.0));
        assert_eq!(parse_font_size_px("18"), Some(18.0));
    }

    #[test]
    fn unknown_units_are_none() {
        assert_eq!(parse_font_size_px("120%"), None);
        assert_eq!(parse_font_size_px("large"), None);
        assert_eq!(parse_font_size_px("px"), None);
        assert_eq!(parse_font_size_px("3vw"), None);
    }

    #[test]
    fn weight_classification() {
        assert_eq!(FontWeight::from_css("bold"), FontWeight::Bold);
        assert_eq!(FontWeight::from_css("BOLDER"), FontWeight::Bold);
        assert_eq!(FontWeight::from_css("700"), FontWeight::Bold);
        assert_eq!(FontWeight::from_css("900"), FontWeight::Bold);
        assert_eq!(FontWeight::from_css("600"), FontWeight::Normal);
        assert_eq!(FontWeight::from_css("normal"), FontWeight::Normal);
        assert_eq!(FontWeight::from_css("lighter"), FontWeight::Normal);
    }

    #[test]
    fn large_text_rule() {
        assert!(font(24.0, FontWeight::Normal).is_large());
        assert!(!font(23.9, FontWeight::Normal).is_large());
        assert!(font(18.67, FontWeight::Bold).is_large());
        assert!(!font(18.66, FontWeight::Bold).is_large());
        assert!(!font(20.0, FontWeight::Normal).is_large());
    }

    #[test]
    fn non_positive_size_rejected() {
        assert!(FontDescriptor::new(0.0, FontWeight::Normal).is_err());
        assert!(FontDescriptor::new(-4.0, FontWeight::Normal).is_err());
        assert!(FontDescriptor::new(f64::NAN, FontWeight::Normal).is_err());
    }
}
