//! Color model, font model and the WCAG contrast engine.

pub mod checker;
pub mod color;
pub mod color_parse;
pub mod composite;
pub mod font;
pub mod hex;
pub mod hsl;
pub mod suggest;
pub mod wcag;
