use super::color::Color;

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` required, case-insensitive).
/// The 8-digit form's last byte is alpha scaled to 0.0-1.0.
/// Returns None for any other length or a non-hex digit.
pub fn parse_hex(value: &str) -> Option<Color> {
    let raw = value.strip_prefix('#')?;
    if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match raw.len() {
        3 => {
            let expanded: String = raw.chars().flat_map(|c| [c, c]).collect();
            parse_hex(&format!("#{expanded}"))
        }
        6 => {
            let [r, g, b] = channel_bytes(raw)?;
            Some(Color::new(r, g, b, 1.0))
        }
        8 => {
            let [r, g, b] = channel_bytes(raw)?;
            let a = u8::from_str_radix(&raw[6..8], 16).ok()?;
            Some(Color::new(r, g, b, a as f64 / 255.0))
        }
        _ => None,
    }
}

fn channel_bytes(raw: &str) -> Option<[u8; 3]> {
    let r = u8::from_str_radix(&raw[0..2], 16).ok()?;
    let g = u8::from_str_radix(&raw[2..4], 16).ok()?;
    let b = u8::from_str_radix(&raw[4..6], 16).ok()?;
    Some([r, g, b])
}
