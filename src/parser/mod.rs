pub mod entity_collector;
pub mod style;
pub mod tokenizer;
pub mod visitor;
pub mod weighting;

use crate::math::color::Color;
use crate::types::TextEntity;
use entity_collector::EntityCollector;
use visitor::HtmlVisitor;

/// Extract every text entity from slide markup, in document order.
///
/// An entity is a `div` whose id starts with `text-`. Inside it the first
/// element with a `wrapper` class supplies geometry and the entity font, and
/// each `span` becomes a styled run. Colors cascade from the nearest styled
/// ancestor inside the entity and fall back to `default_text_color`.
///
/// Malformed markup never fails: unclosed elements close at the end of the
/// document, and malformed inline colors are recorded as entity warnings.
pub fn extract_entities(html: &str, default_text_color: Color) -> Vec<TextEntity> {
    let mut collector = EntityCollector::new(default_text_color);
    tokenizer::scan_html(html, &mut [&mut collector as &mut dyn HtmlVisitor]);
    collector.into_entities()
}
