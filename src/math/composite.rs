use super::color::{Color, Rgb};

/// Alpha-composite a foreground color over an opaque background ("over" operator).
/// Per channel: `fg * alpha + bg * (1 - alpha)`, rounded to nearest. The result is opaque.
pub fn blend_over(fg: Color, bg: Rgb) -> Rgb {
    if fg.is_opaque() {
        return fg.rgb();
    }
    let alpha = fg.alpha;
    let blend = |f: u8, b: u8| -> u8 {
        let result = f as f64 * alpha + b as f64 * (1.0 - alpha);
        result.round().clamp(0.0, 255.0) as u8
    };

    Rgb::new(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
}

/// Composite a back-to-front stack of layers over `base`.
pub fn flatten_layers(layers: &[Color], base: Rgb) -> Rgb {
    layers.iter().fold(base, |under, layer| blend_over(*layer, under))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn opaque_fg_returns_fg() {
        assert_eq!(blend_over(Color::new(255, 0, 0, 1.0), Rgb::new(0, 0, 255)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn transparent_fg_returns_bg() {
        assert_eq!(blend_over(Color::new(255, 0, 0, 0.0), Rgb::new(0, 0, 255)), Rgb::new(0, 0, 255));
    }

    #[test]
    fn half_transparent_blends() {
        // R: 255*0.5 + 0*0.5 = 127.5 -> 128
        assert_eq!(blend_over(Color::new(255, 0, 0, 0.5), Rgb::new(0, 0, 255)), Rgb::new(128, 0, 128));
    }

    #[test]
    fn white_50_on_black() {
        assert_eq!(blend_over(Color::new(255, 255, 255, 0.5), Rgb::BLACK), Rgb::new(128, 128, 128));
    }

    #[test]
    fn layers_apply_back_to_front() {
        let layers = [Color::new(0, 0, 0, 1.0), Color::new(255, 255, 255, 0.5)];
        assert_eq!(flatten_layers(&layers, Rgb::WHITE), Rgb::new(128, 128, 128));
        // Top layer opaque hides everything beneath
        let layers = [Color::new(0, 0, 0, 0.5), Color::new(10, 20, 30, 1.0)];
        assert_eq!(flatten_layers(&layers, Rgb::WHITE), Rgb::new(10, 20, 30));
    }

    #[test]
    fn no_layers_is_base() {
        assert_eq!(flatten_layers(&[], Rgb::WHITE), Rgb::WHITE);
    }

    proptest! {
        #[test]
        fn prop_transparent_is_noop(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), bg in any::<[u8; 3]>()) {
            let bg = Rgb::from(bg);
            prop_assert_eq!(blend_over(Color::new(r, g, b, 0.0), bg), bg);
        }

        #[test]
        fn prop_opaque_ignores_bg(fg in any::<[u8; 3]>(), bg in any::<[u8; 3]>()) {
            let fg = Rgb::from(fg);
            prop_assert_eq!(blend_over(Color::opaque(fg), Rgb::from(bg)), fg);
        }
    }
}
