use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, EntityError};
use crate::math::checker::ContrastResult;
use crate::math::color::{Color, Rgb};
use crate::math::font::{FontDescriptor, FontWeight};
use crate::math::wcag::WcagClassification;
use crate::parser::style::Geometry;
use crate::quantize::QuantizationMethod;

/// A color and its normalized share of a region or entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedColor {
    pub color: Color,
    pub weight: f64,
}

// ── Extraction ──────────────────────────────────────────────────────

/// One styled inline run (a `span`) inside a text entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// Resolved color: own declaration, else nearest styled ancestor, else the default.
    pub color: Color,
    /// The color as declared on the run itself, if it parsed.
    pub declared_color: Option<String>,
    pub font_size_px: Option<f64>,
    pub font_weight: Option<String>,
    /// Non-whitespace characters.
    pub char_count: usize,
    /// True for the single run made up when an entity has no spans.
    pub synthesized: bool,
}

/// The positioned wrapper inside a text entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Wrapper {
    pub geometry: Geometry,
    pub font_size_px: Option<f64>,
    pub font_weight: Option<String>,
}

/// A `div` whose id starts with `text-`, with its wrapper and styled runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextEntity {
    pub id: String,
    pub wrapper: Option<Wrapper>,
    pub runs: Vec<TextRun>,
    pub text_content: String,
    /// Entity-level font size (wrapper, then first run, then container).
    pub font_size_px: Option<f64>,
    pub font_weight: Option<String>,
    /// Malformed inline styles that were replaced by inherited values.
    pub warnings: Vec<String>,
}

impl TextEntity {
    /// Resolve the entity's font once, falling back to `default_size_px`.
    pub fn font(&self, default_size_px: f64) -> Result<FontDescriptor, EntityError> {
        let size = self.font_size_px.unwrap_or(default_size_px);
        let weight = self
            .font_weight
            .as_deref()
            .map(FontWeight::from_css)
            .unwrap_or(FontWeight::Normal);
        FontDescriptor::new(size, weight)
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.wrapper.as_ref().map(|w| w.geometry).filter(|g| !g.is_empty())
    }
}

// ── Input ───────────────────────────────────────────────────────────

/// Pixel rectangle inside a background image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Pixel box an entity's geometry covers in a `image_width` × `image_height` image.
    ///
    /// Missing `left`/`top` are 0 and missing `width`/`height` span the whole image.
    /// Translation shifts the origin. Both corners are clamped into the image and
    /// truncated to whole pixels; `None` when nothing is left.
    pub fn from_geometry(geometry: &Geometry, image_width: u32, image_height: u32) -> Option<Region> {
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let value = |v: Option<f64>, default: f64| v.filter(|x| x.is_finite()).unwrap_or(default);

        let left = value(geometry.left, 0.0) + value(geometry.translate_x, 0.0);
        let top = value(geometry.top, 0.0) + value(geometry.translate_y, 0.0);
        let left = left.clamp(0.0, w);
        let top = top.clamp(0.0, h);
        let right = (left + value(geometry.width, w)).clamp(0.0, w);
        let bottom = (top + value(geometry.height, h)).clamp(0.0, h);

        let (left, top, right, bottom) = (left as u32, top as u32, right as u32, bottom as u32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Region {
            left,
            top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Where a slide's background comes from. Resolves to exactly one opaque color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSpec {
    /// A single CSS color; translucent colors are composited over white.
    Solid { color: String },
    /// CSS colors composited back-to-front over white.
    Layered { layers: Vec<String> },
    /// The supplied raster image, optionally cropped to `region`.
    Image { region: Option<Region> },
}

/// Slide description as exported by the presentation source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SlideDescription {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub base_color: Option<String>,
    #[serde(default)]
    pub background_layers: Option<Vec<String>>,
    #[serde(default)]
    pub background_region: Option<Region>,
    #[serde(default)]
    pub content_html: String,
}

/// One slide ready for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideInput {
    pub id: String,
    pub background: BackgroundSpec,
    pub html: String,
}

impl From<SlideDescription> for SlideInput {
    /// Explicit colors win over the image; a slide with neither refers to the image.
    fn from(desc: SlideDescription) -> Self {
        let id = match desc.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        };
        let background = match (desc.base_color, desc.background_layers) {
            (_, Some(layers)) if !layers.is_empty() => BackgroundSpec::Layered { layers },
            (Some(color), _) if !color.trim().is_empty() => BackgroundSpec::Solid { color },
            _ => BackgroundSpec::Image {
                region: desc.background_region,
            },
        };
        SlideInput {
            id,
            background,
            html: desc.content_html,
        }
    }
}

/// Read one slide object or an array of them.
pub fn parse_slides(json: &str) -> Result<Vec<SlideInput>, AnalysisError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<SlideDescription>),
        One(SlideDescription),
    }

    let slides = match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(list) => list,
        OneOrMany::One(single) => vec![single],
    };
    Ok(slides.into_iter().map(SlideInput::from).collect())
}

// ── Results ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSource {
    Solid { color: String },
    Layered { layers: Vec<String> },
    Image {
        region: Option<Region>,
        palette: Vec<WeightedColor>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBackground {
    pub effective: Rgb,
    pub source: BackgroundSource,
}

/// Contrast of one weighted text color of an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateContrast {
    /// The text color before compositing.
    pub color: Color,
    pub weight: f64,
    #[serde(flatten)]
    pub result: ContrastResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityAnalysis {
    pub font: FontDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    pub text_content: String,
    /// Worst case over all candidates; it governs pass/fail.
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub wcag: WcagClassification,
    /// Suggestions for the worst candidate.
    pub suggestions: Vec<crate::math::suggest::Suggestion>,
    pub candidates: Vec<CandidateContrast>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityOutcome {
    Analyzed(Box<EntityAnalysis>),
    Skipped { diagnostic: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub id: String,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

impl EntityReport {
    pub fn analysis(&self) -> Option<&EntityAnalysis> {
        match &self.outcome {
            EntityOutcome::Analyzed(analysis) => Some(analysis),
            EntityOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_entities: usize,
    pub analyzed: usize,
    pub skipped: usize,
    /// Worst-case ratio >= 4.5, regardless of text size.
    pub passed_aa_normal: usize,
    pub failed_aa_normal: usize,
    /// AA at the threshold that applies to each entity's text size.
    pub passed_aa: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub slide_id: String,
    pub background: ResolvedBackground,
    pub method: QuantizationMethod,
    pub entities: Vec<EntityReport>,
    pub summary: Summary,
}

impl AnalysisResult {
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_slide_object() {
        let slides = parse_slides(r##"{"id": "s1", "base_color": "#FFFFFF", "content_html": "<div></div>"}"##).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].id, "s1");
        assert_eq!(
            slides[0].background,
            BackgroundSpec::Solid {
                color: "#FFFFFF".to_string()
            }
        );
        assert_eq!(slides[0].html, "<div></div>");
    }

    #[test]
    fn slide_array_and_numeric_ids() {
        let json = r##"[{"id": 7, "base_color": "red"}, {"content_html": "x"}]"##;
        let slides = parse_slides(json).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].id, "7");
        assert_eq!(slides[1].id, "unknown");
        assert_eq!(slides[1].background, BackgroundSpec::Image { region: None });
    }

    #[test]
    fn layers_take_precedence() {
        let json = r##"{"base_color": "red", "background_layers": ["white", "rgba(0,0,0,0.5)"]}"##;
        let slides = parse_slides(json).unwrap();
        assert!(matches!(slides[0].background, BackgroundSpec::Layered { ref layers } if layers.len() == 2));
    }

    #[test]
    fn blank_base_color_falls_through_to_image() {
        let json = r##"{"base_color": "  ", "background_region": {"left": 1, "top": 2, "width": 3, "height": 4}}"##;
        let slides = parse_slides(json).unwrap();
        assert_eq!(
            slides[0].background,
            BackgroundSpec::Image {
                region: Some(Region {
                    left: 1,
                    top: 2,
                    width: 3,
                    height: 4
                })
            }
        );
    }

    #[test]
    fn region_from_full_geometry_with_translate() {
        let geometry = Geometry {
            left: Some(100.0),
            top: Some(50.0),
            width: Some(200.0),
            height: Some(80.5),
            translate_x: Some(-20.0),
            translate_y: Some(10.7),
        };
        assert_eq!(
            Region::from_geometry(&geometry, 1280, 720),
            Some(Region {
                left: 80,
                top: 60,
                width: 200,
                height: 81
            })
        );
    }

    #[test]
    fn region_from_partial_geometry_uses_image_size() {
        let geometry = Geometry {
            left: Some(40.0),
            ..Geometry::default()
        };
        assert_eq!(
            Region::from_geometry(&geometry, 100, 60),
            Some(Region {
                left: 40,
                top: 0,
                width: 60,
                height: 60
            })
        );
        assert_eq!(
            Region::from_geometry(&Geometry::default(), 100, 60),
            Some(Region {
                left: 0,
                top: 0,
                width: 100,
                height: 60
            })
        );
    }

    #[test]
    fn region_from_geometry_clamps_to_image() {
        let overhang = Geometry {
            left: Some(-30.0),
            top: Some(90.0),
            width: Some(500.0),
            height: Some(500.0),
            ..Geometry::default()
        };
        assert_eq!(
            Region::from_geometry(&overhang, 100, 100),
            Some(Region {
                left: 0,
                top: 90,
                width: 100,
                height: 10
            })
        );

        let outside = Geometry {
            left: Some(50.0),
            translate_x: Some(80.0),
            ..Geometry::default()
        };
        assert_eq!(Region::from_geometry(&outside, 100, 100), None);

        let zero_width = Geometry {
            width: Some(0.0),
            ..Geometry::default()
        };
        assert_eq!(Region::from_geometry(&zero_width, 100, 100), None);
    }

    #[test]
    fn invalid_json_is_invalid_input() {
        assert!(matches!(parse_slides("[1, 2"), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn entity_font_defaults() {
        let entity = TextEntity {
            id: "text-1".to_string(),
            wrapper: None,
            runs: vec![],
            text_content: String::new(),
            font_size_px: None,
            font_weight: Some("700".to_string()),
            warnings: vec![],
        };
        let font = entity.font(16.0).unwrap();
        assert_eq!(font.size_px(), 16.0);
        assert_eq!(font.weight(), FontWeight::Bold);
        assert!(entity.geometry().is_none());
    }
}
