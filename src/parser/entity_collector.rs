use tracing::warn;

use super::style::{Geometry, StyleDeclarations};
use super::tokenizer::attribute_value;
use super::visitor::HtmlVisitor;
use crate::math::color::Color;
use crate::math::color_parse::parse_color;
use crate::math::font::parse_font_size_px;
use crate::types::{TextEntity, TextRun, Wrapper};

/// Id prefix that marks a text entity container.
const ENTITY_ID_PREFIX: &str = "text-";
/// Class fragment that marks the positioned wrapper (`entity__wrapper`, `wrapper`).
const WRAPPER_CLASS_FRAGMENT: &str = "wrapper";

/// Builds [`TextEntity`] values from tokenizer events.
///
/// Outside an entity everything is ignored. Inside one, a stack of open
/// elements carries the inherited color, font size and weight, and the run
/// (if any) that character data belongs to.
pub struct EntityCollector {
    default_color: Color,
    entities: Vec<TextEntity>,
    current: Option<EntityBuilder>,
}

struct EntityBuilder {
    id: String,
    wrapper: Option<Wrapper>,
    runs: Vec<PendingRun>,
    text: String,
    loose_text: String,
    loose_color: Option<Color>,
    warnings: Vec<String>,
    stack: Vec<OpenElement>,
}

struct PendingRun {
    run: TextRun,
    /// Color in scope when the span opened; `None` means the default applies.
    color: Option<Color>,
    has_style: bool,
}

#[derive(Clone)]
struct OpenElement {
    tag: String,
    color: Option<Color>,
    font_size_px: Option<f64>,
    font_weight: Option<String>,
    run: Option<usize>,
}

/// Style values an element declares for itself, after validation.
struct OwnStyle {
    declarations: StyleDeclarations,
    color: Option<(Color, String)>,
    font_size_px: Option<f64>,
    font_weight: Option<String>,
}

impl EntityCollector {
    pub fn new(default_color: Color) -> Self {
        Self {
            default_color,
            entities: Vec::new(),
            current: None,
        }
    }

    pub fn into_entities(self) -> Vec<TextEntity> {
        self.entities
    }

    fn finish_current(&mut self) {
        if let Some(builder) = self.current.take() {
            self.entities.push(builder.build(self.default_color));
        }
    }
}

impl EntityBuilder {
    fn new(id: String, root: OwnStyle, warnings: Vec<String>) -> Self {
        let root = OpenElement {
            tag: "div".to_string(),
            color: root.color.map(|(c, _)| c),
            font_size_px: root.font_size_px,
            font_weight: root.font_weight,
            run: None,
        };
        Self {
            id,
            wrapper: None,
            runs: Vec::new(),
            text: String::new(),
            loose_text: String::new(),
            loose_color: None,
            warnings,
            stack: vec![root],
        }
    }

    fn top(&self) -> Option<&OpenElement> {
        self.stack.last()
    }

    fn open(&mut self, tag_name: &str, raw_tag: &str, own: OwnStyle) {
        let parent = self.top().cloned();
        let inherited_color = own.color.as_ref().map(|(c, _)| *c).or(parent.as_ref().and_then(|p| p.color));
        let font_size_px = own.font_size_px.or(parent.as_ref().and_then(|p| p.font_size_px));
        let font_weight = own
            .font_weight
            .clone()
            .or_else(|| parent.as_ref().and_then(|p| p.font_weight.clone()));

        if self.wrapper.is_none() && is_wrapper(raw_tag) {
            self.wrapper = Some(Wrapper {
                geometry: Geometry::from_style(&own.declarations),
                font_size_px: own.font_size_px,
                font_weight: own.font_weight.clone(),
            });
        }

        let run = if tag_name == "span" {
            self.runs.push(PendingRun {
                run: TextRun {
                    text: String::new(),
                    color: Color::TRANSPARENT,
                    declared_color: own.color.map(|(_, css)| css),
                    font_size_px,
                    font_weight: font_weight.clone(),
                    char_count: 0,
                    synthesized: false,
                },
                color: inherited_color,
                has_style: !own.declarations.is_empty(),
            });
            Some(self.runs.len() - 1)
        } else {
            parent.as_ref().and_then(|p| p.run)
        };

        self.stack.push(OpenElement {
            tag: tag_name.to_string(),
            color: inherited_color,
            font_size_px,
            font_weight,
            run,
        });
    }

    fn text(&mut self, text: &str) {
        self.text.push_str(text);
        let Some(top) = self.stack.last() else {
            return;
        };
        match top.run {
            Some(idx) => self.runs[idx].run.text.push_str(text),
            None => {
                if self.loose_color.is_none() && !text.trim().is_empty() {
                    self.loose_color = top.color;
                }
                self.loose_text.push_str(text);
            }
        }
    }

    /// Pop the matching element. Returns true once the entity root has closed.
    fn close(&mut self, tag_name: &str) -> bool {
        if let Some(idx) = self.stack.iter().rposition(|e| e.tag == tag_name) {
            self.stack.truncate(idx);
        }
        self.stack.is_empty()
    }

    fn build(self, default_color: Color) -> TextEntity {
        let root = self.stack.first();
        let root_color = root.and_then(|r| r.color);
        let root_size = root.and_then(|r| r.font_size_px);
        let root_weight = root.and_then(|r| r.font_weight.clone());

        let mut runs: Vec<TextRun> = self
            .runs
            .into_iter()
            .filter(|p| p.has_style || !p.run.text.is_empty())
            .map(|p| {
                let mut run = p.run;
                run.color = p.color.unwrap_or(default_color);
                run.char_count = ink_chars(&run.text);
                run
            })
            .collect();

        let wrapper_size = self.wrapper.as_ref().and_then(|w| w.font_size_px);
        let wrapper_weight = self.wrapper.as_ref().and_then(|w| w.font_weight.clone());
        let first_size = runs.first().and_then(|r| r.font_size_px);
        let first_weight = runs.first().and_then(|r| r.font_weight.clone());

        if runs.is_empty() {
            runs.push(TextRun {
                char_count: ink_chars(&self.loose_text),
                text: self.loose_text,
                color: self.loose_color.or(root_color).unwrap_or(default_color),
                declared_color: None,
                font_size_px: wrapper_size.or(root_size),
                font_weight: wrapper_weight.clone().or(root_weight.clone()),
                synthesized: true,
            });
        }

        TextEntity {
            id: self.id,
            wrapper: self.wrapper,
            runs,
            text_content: self.text.trim().to_string(),
            font_size_px: wrapper_size.or(first_size).or(root_size),
            font_weight: wrapper_weight.or(first_weight).or(root_weight),
            warnings: self.warnings,
        }
    }
}

impl HtmlVisitor for EntityCollector {
    fn on_tag_open(&mut self, tag_name: &str, is_self_closing: bool, raw_tag: &str) {
        if let Some(builder) = self.current.as_mut() {
            if !is_self_closing {
                let own = own_style(raw_tag, &builder.id, &mut builder.warnings);
                builder.open(tag_name, raw_tag, own);
            }
            return;
        }

        if tag_name != "div" {
            return;
        }
        let Some(id) = attribute_value(raw_tag, "id").filter(|id| id.starts_with(ENTITY_ID_PREFIX)) else {
            return;
        };
        let mut warnings = Vec::new();
        let own = own_style(raw_tag, &id, &mut warnings);
        self.current = Some(EntityBuilder::new(id, own, warnings));
        if is_self_closing {
            self.finish_current();
        }
    }

    fn on_tag_close(&mut self, tag_name: &str) {
        let closed = match self.current.as_mut() {
            Some(builder) => builder.close(tag_name),
            None => false,
        };
        if closed {
            self.finish_current();
        }
    }

    fn on_text(&mut self, text: &str) {
        if let Some(builder) = self.current.as_mut() {
            builder.text(text);
        }
    }

    fn on_document_end(&mut self) {
        self.finish_current();
    }
}

/// Read an element's own style. Malformed values are dropped with a warning so
/// the element inherits instead.
fn own_style(raw_tag: &str, entity_id: &str, warnings: &mut Vec<String>) -> OwnStyle {
    let declarations = attribute_value(raw_tag, "style")
        .map(|s| StyleDeclarations::parse(&s))
        .unwrap_or_default();

    let color = declarations.get("color").and_then(|css| match parse_color(css) {
        Ok(color) => Some((color, css.to_string())),
        Err(err) => {
            warn!(entity = entity_id, %err, "ignoring malformed inline color");
            warnings.push(format!("{err}; inherited color used"));
            None
        }
    });

    let font_size_px = declarations.get("font-size").and_then(|css| {
        let px = parse_font_size_px(css);
        if px.is_none() {
            warn!(entity = entity_id, value = css, "ignoring unsupported font-size");
            warnings.push(format!("unsupported font-size {css:?}; inherited size used"));
        }
        px
    });

    let font_weight = declarations.get("font-weight").map(str::to_string);

    OwnStyle {
        declarations,
        color,
        font_size_px,
        font_weight,
    }
}

fn is_wrapper(raw_tag: &str) -> bool {
    attribute_value(raw_tag, "class")
        .map(|classes| classes.split_whitespace().any(|c| c.contains(WRAPPER_CLASS_FRAGMENT)))
        .unwrap_or(false)
}

fn ink_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
