//! Text element.

use super::{ElementId, ElementTrait, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
    Handwriting,
}

impl FontFamily {
    /// CSS-style family name handed to text backends.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
            FontFamily::Handwriting => "cursive",
        }
    }

    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::SansSerif,
            FontFamily::Serif,
            FontFamily::Monospace,
            FontFamily::Handwriting,
        ]
    }
}

/// A run of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ElementId,
    pub text: String,
    /// Top-left anchor.
    pub position: Point,
    pub color: SerializableColor,
    pub font_size: f64,
    #[serde(default)]
    pub font_family: FontFamily,
}

impl Text {
    /// Average glyph advance relative to the font size, used when no layout is available.
    const APPROX_ADVANCE: f64 = 0.6;

    pub fn new(position: Point, text: String, color: SerializableColor, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            position,
            color,
            font_size,
            font_family: FontFamily::default(),
        }
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }
}

impl ElementTrait for Text {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let lines: Vec<&str> = self.text.lines().collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
        let width = widest as f64 * self.font_size * Self::APPROX_ADVANCE;
        let height = lines.len().max(1) as f64 * self.font_size * 1.2;
        Rect::from_origin_size(self.position, (width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_grow_with_lines() {
        let one = Text::new(Point::ZERO, "abc".to_string(), SerializableColor::black(), 10.0);
        let two = Text::new(Point::ZERO, "abc\nabc".to_string(), SerializableColor::black(), 10.0);
        assert!(two.bounds().height() > one.bounds().height());
        assert!((one.bounds().width() - 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_text_still_has_area() {
        let text = Text::new(Point::new(5.0, 5.0), String::new(), SerializableColor::black(), 10.0);
        assert!(text.bounds().area() > 0.0);
    }
}
