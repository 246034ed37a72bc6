use super::color::Rgb;

/// Convert HSL to RGB.
///
/// `hue` is in degrees and wraps into `[0, 360)` (negative input included).
/// `saturation` and `lightness` are percentages, clamped to `[0, 100]`.
/// Each output channel is rounded to the nearest integer.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let s = saturation.clamp(0.0, 100.0) / 100.0;
    let l = lightness.clamp(0.0, 100.0) / 100.0;
    let color = csscolorparser::Color::from_hsla(hue.rem_euclid(360.0) as f32, s as f32, l as f32, 1.0);
    let [r, g, b, _] = color.to_rgba8();
    Rgb::new(r, g, b)
}

/// Convert RGB to `(hue degrees, saturation %, lightness %)`.
pub fn rgb_to_hsl(rgb: Rgb) -> (f64, f64, f64) {
    let [r, g, b] = rgb.channels().map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s * 100.0, l * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn primaries() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn hue_wraps_including_negative() {
        assert_eq!(hsl_to_rgb(360.0, 100.0, 50.0), hsl_to_rgb(0.0, 100.0, 50.0));
        assert_eq!(hsl_to_rgb(-120.0, 100.0, 50.0), hsl_to_rgb(240.0, 100.0, 50.0));
        assert_eq!(hsl_to_rgb(480.0, 100.0, 50.0), hsl_to_rgb(120.0, 100.0, 50.0));
    }

    #[test]
    fn achromatic_rounds() {
        // 0.5 * 255 = 127.5 -> 128
        assert_eq!(hsl_to_rgb(0.0, 0.0, 50.0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn out_of_range_percentages_clamp() {
        assert_eq!(hsl_to_rgb(0.0, 150.0, 120.0), Rgb::WHITE);
        assert_eq!(hsl_to_rgb(0.0, -10.0, -5.0), Rgb::BLACK);
    }

    #[test]
    fn agrees_with_csscolorparser() {
        let cases: [(f64, f64, f64); 4] = [(0.0, 100.0, 50.0), (-120.0, 100.0, 50.0), (200.0, 40.0, 30.0), (33.0, 90.0, 65.0)];
        for (h, s, l) in cases {
            let [r, g, b, _] =
                csscolorparser::Color::from_hsla(h.rem_euclid(360.0) as f32, (s / 100.0) as f32, (l / 100.0) as f32, 1.0)
                    .to_rgba8();
            assert_eq!(hsl_to_rgb(h, s, l), Rgb::new(r, g, b), "hsl({h}, {s}%, {l}%)");
        }
    }

    #[test]
    fn rgb_to_hsl_red() {
        let (h, s, l) = rgb_to_hsl(Rgb::new(255, 0, 0));
        assert!((h - 0.0).abs() < 1e-9);
        assert!((s - 100.0).abs() < 1e-9);
        assert!((l - 50.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_hsl_round_trip_within_one_step(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let rgb = Rgb::new(r, g, b);
            let (h, s, l) = rgb_to_hsl(rgb);
            let back = hsl_to_rgb(h, s, l);
            for (x, y) in rgb.channels().iter().zip(back.channels().iter()) {
                prop_assert!((*x as i32 - *y as i32).abs() <= 1, "{rgb:?} -> {back:?}");
            }
        }
    }
}
