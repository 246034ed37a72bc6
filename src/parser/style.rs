use serde::Serialize;

/// Declarations from an inline `style` attribute, in source order.
///
/// Property names are lowercased; values are trimmed but otherwise untouched.
/// Declarations without a `:` are dropped, and a later duplicate wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    declarations: Vec<(String, String)>,
}

impl StyleDeclarations {
    pub fn parse(style: &str) -> Self {
        let declarations = split_declarations(style)
            .into_iter()
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim();
                if prop.is_empty() || value.is_empty() {
                    return None;
                }
                Some((prop, value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Split on `;` outside of quotes and parentheses (`url(data:...;base64,...)`).
fn split_declarations(style: &str) -> Vec<&str> {
    let bytes = style.as_bytes();
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<u8> = None;
    let mut start = 0;

    for (i, &ch) in bytes.iter().enumerate() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                b'"' | b'\'' => quote = Some(ch),
                b'(' => depth += 1,
                b')' => depth = (depth - 1).max(0),
                b';' if depth == 0 => {
                    parts.push(&style[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&style[start..]);
    parts
}

/// Position and size hints from a wrapper's inline style, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Geometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
}

impl Geometry {
    pub fn from_style(style: &StyleDeclarations) -> Self {
        let length = |prop: &str| style.get(prop).and_then(parse_px);
        let translate = style.get("transform").and_then(parse_translate);

        Geometry {
            left: length("left"),
            top: length("top"),
            width: length("width"),
            height: length("height"),
            translate_x: translate.map(|(x, _)| x),
            translate_y: translate.map(|(_, y)| y),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Geometry::default()
    }
}

/// `12px`, `12` -> 12.0. Other units are not geometry we can use.
fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let number = v.strip_suffix("px").unwrap_or(v).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// First `translate(Xpx, Ypx)` inside a transform list.
fn parse_translate(transform: &str) -> Option<(f64, f64)> {
    let lower = transform.to_ascii_lowercase();
    let start = lower.find("translate(")? + "translate(".len();
    let end = start + lower[start..].find(')')?;
    let (x, y) = lower[start..end].split_once(',')?;
    Some((parse_px(x)?, parse_px(y)?))
}
