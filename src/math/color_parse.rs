use super::color::Color;
use super::hex::parse_hex;
use crate::error::ColorError;

/// Functional notations accepted. Other CSS color functions (oklch, hwb, lab, ...) are rejected.
const COLOR_FUNCTIONS: [&str; 4] = ["rgba(", "rgb(", "hsla(", "hsl("];

/// Parse a CSS color value into a normalized RGBA color.
///
/// Recognized grammars (case-insensitive, surrounding whitespace ignored):
/// - hex: `#rgb`, `#rrggbb`, `#rrggbbaa`
/// - `rgb()` / `rgba()` with comma or space separated channels, optional alpha
/// - `hsl()` / `hsla()` with hue in degrees and percentage saturation/lightness
/// - CSS named colors, `transparent` being RGBA(0, 0, 0, 0.0)
///
/// Channels are clamped to their ranges. Anything else is a [`ColorError`].
pub fn parse_color(value: &str) -> Result<Color, ColorError> {
    let trimmed = value.trim().to_ascii_lowercase();

    if trimmed == "transparent" {
        return Ok(Color::TRANSPARENT);
    }

    if trimmed.starts_with('#') {
        return parse_hex(&trimmed).ok_or_else(|| ColorError::malformed(value));
    }

    let is_function = COLOR_FUNCTIONS.iter().any(|f| trimmed.starts_with(f));
    let is_named = !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_alphabetic());
    if !is_function && !is_named {
        return Err(ColorError::malformed(value));
    }

    let parsed = csscolorparser::parse(&trimmed).map_err(|_| ColorError::malformed(value))?;
    let [r, g, b, _] = parsed.to_rgba8();
    Ok(Color::new(r, g, b, f64::from(parsed.a)))
}
