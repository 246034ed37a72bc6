use serde::Serialize;

use super::color::Rgb;
use super::font::FontDescriptor;

pub const AA_NORMAL: f64 = 4.5;
pub const AA_LARGE: f64 = 3.0;
pub const AAA_NORMAL: f64 = 7.0;
pub const AAA_LARGE: f64 = 4.5;

/// Linearization threshold from the WCAG 2.x relative luminance definition.
const SRGB_THRESHOLD: f64 = 0.03928;

/// Convert sRGB channel (0-255) to linear light value.
fn srgb_to_linear(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= SRGB_THRESHOLD {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance per WCAG 2.2.
/// L = 0.2126 * R + 0.7152 * G + 0.0722 * B (linear channels)
pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * srgb_to_linear(rgb.r) + 0.7152 * srgb_to_linear(rgb.g) + 0.0722 * srgb_to_linear(rgb.b)
}

/// WCAG contrast ratio, 1.0 to 21.0. Order of the arguments does not matter.
/// ratio = (L1 + 0.05) / (L2 + 0.05) where L1 >= L2
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pass/fail against every WCAG threshold. Comparisons are inclusive.
///
/// Each flag is measured against its own fixed threshold; `is_large` says which
/// pair governs the text (see [`WcagClassification::passes_aa`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WcagClassification {
    pub aa_normal: bool,
    pub aa_large: bool,
    pub aaa_normal: bool,
    pub aaa_large: bool,
    pub is_large: bool,
}

impl WcagClassification {
    /// AA at the threshold that applies to this text size.
    pub fn passes_aa(&self) -> bool {
        if self.is_large {
            self.aa_large
        } else {
            self.aa_normal
        }
    }

    /// AAA at the threshold that applies to this text size.
    pub fn passes_aaa(&self) -> bool {
        if self.is_large {
            self.aaa_large
        } else {
            self.aaa_normal
        }
    }
}

pub fn classify(ratio: f64, font: &FontDescriptor) -> WcagClassification {
    WcagClassification {
        aa_normal: ratio >= AA_NORMAL,
        aa_large: ratio >= AA_LARGE,
        aaa_normal: ratio >= AAA_NORMAL,
        aaa_large: ratio >= AAA_LARGE,
        is_large: font.is_large(),
    }
}

/// The AA ratio an entity with this font has to reach.
pub fn aa_target(font: &FontDescriptor) -> f64 {
    if font.is_large() {
        AA_LARGE
    } else {
        AA_NORMAL
    }
}

/// Round to two decimals for reporting.
pub fn round_ratio(ratio: f64) -> f64 {
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::font::FontWeight;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn hex(value: &str) -> Rgb {
        crate::math::color_parse::parse_color(value).unwrap().rgb()
    }

    fn font(size: f64, weight: FontWeight) -> FontDescriptor {
        FontDescriptor::new(size, weight).unwrap()
    }

    #[test]
    fn black_on_white_is_21() {
        assert_abs_diff_eq!(contrast_ratio(Rgb::BLACK, Rgb::WHITE), 21.0, epsilon = 1e-6);
    }

    #[test]
    fn white_on_white_is_1() {
        assert_abs_diff_eq!(contrast_ratio(Rgb::WHITE, Rgb::WHITE), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn luminance_endpoints() {
        assert_abs_diff_eq!(relative_luminance(Rgb::BLACK), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(relative_luminance(Rgb::WHITE), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gray_on_white() {
        // colord: 4.54
        assert_abs_diff_eq!(contrast_ratio(hex("#767676"), Rgb::WHITE), 4.54, epsilon = 0.01);
    }

    #[test]
    fn light_gray_on_white() {
        assert_abs_diff_eq!(contrast_ratio(hex("#aaaaaa"), Rgb::WHITE), 2.32, epsilon = 0.01);
    }

    #[test]
    fn red_on_white() {
        // colord: 3.99
        assert_abs_diff_eq!(contrast_ratio(hex("#ff0000"), Rgb::WHITE), 3.99, epsilon = 0.01);
    }

    #[test]
    fn slate_on_white() {
        // colord: 14.62
        assert_abs_diff_eq!(contrast_ratio(hex("#1e293b"), Rgb::WHITE), 14.62, epsilon = 0.01);
    }

    #[test]
    fn aa_normal_boundary_is_inclusive() {
        let f = font(16.0, FontWeight::Normal);
        let at = classify(4.5, &f);
        assert!(at.aa_normal);
        assert!(at.aa_large);
        assert!(at.aaa_large);
        assert!(!at.aaa_normal);

        let below = classify(4.49999, &f);
        assert!(!below.aa_normal);
        assert!(below.aa_large);
    }

    #[test]
    fn aaa_normal_requires_7() {
        let r = classify(7.0, &font(16.0, FontWeight::Normal));
        assert!(r.aaa_normal);
        assert!(r.passes_aaa());
    }

    #[test]
    fn large_text_uses_relaxed_pair() {
        let r = classify(3.5, &font(24.0, FontWeight::Normal));
        assert!(r.is_large);
        assert!(!r.aa_normal);
        assert!(r.passes_aa());
        assert!(!r.passes_aaa());

        let bold = classify(3.0, &font(19.0, FontWeight::Bold));
        assert!(bold.is_large);
        assert!(bold.passes_aa());
    }

    #[test]
    fn target_depends_on_size() {
        assert_eq!(aa_target(&font(16.0, FontWeight::Normal)), AA_NORMAL);
        assert_eq!(aa_target(&font(30.0, FontWeight::Normal)), AA_LARGE);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_ratio(2.32456), 2.32);
        assert_eq!(round_ratio(4.499), 4.5);
    }

    proptest! {
        #[test]
        fn prop_ratio_is_symmetric(a in any::<[u8; 3]>(), b in any::<[u8; 3]>()) {
            let (a, b) = (Rgb::from(a), Rgb::from(b));
            prop_assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        }

        #[test]
        fn prop_ratio_in_range(a in any::<[u8; 3]>(), b in any::<[u8; 3]>()) {
            let ratio = contrast_ratio(Rgb::from(a), Rgb::from(b));
            prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio));
        }

        #[test]
        fn prop_self_contrast_is_one(a in any::<[u8; 3]>()) {
            let a = Rgb::from(a);
            prop_assert!((contrast_ratio(a, a) - 1.0).abs() < 1e-12);
        }
    }
}
