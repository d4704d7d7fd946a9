//! Vector drawing surface.
//!
//! Coordinates are in points with the origin at the top-left corner. A
//! `Scene` is built fresh for every artifact and consumed when persisted.

use super::color::Color;
use std::f64::consts::PI;

/// Average Helvetica glyph advance as a fraction of the font size
const GLYPH_ADVANCE: f64 = 0.52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Color,
        stroke: Option<Color>,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Color,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Color,
        width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Color,
    },
    Text {
        x: f64,
        y: f64,
        size: f64,
        anchor: Anchor,
        text: String,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.width <= 0.0 {
            1.0
        } else {
            self.height / self.width
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        self.elements.push(Element::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke: None,
        });
    }

    pub fn outlined_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color, stroke: Color) {
        self.elements.push(Element::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke: Some(stroke),
        });
    }

    pub fn line(&mut self, points: Vec<(f64, f64)>, stroke: Color, width: f64) {
        self.elements.push(Element::Polyline {
            points,
            stroke,
            width,
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Color) {
        self.elements.push(Element::Circle { cx, cy, r, fill });
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, anchor: Anchor, text: impl Into<String>) {
        self.elements.push(Element::Text {
            x,
            y,
            size,
            anchor,
            text: text.into(),
            color: Color::TEXT,
        });
    }

    /// Pie wedge from `start` to `end`, angles in radians clockwise from 12 o'clock
    pub fn wedge(&mut self, cx: f64, cy: f64, r: f64, start: f64, end: f64, fill: Color) {
        let mut points = vec![(cx, cy)];
        points.extend(arc_points(cx, cy, r, start, end));
        self.elements.push(Element::Polygon { points, fill });
    }
}

/// Points along a clockwise arc, at most 5 degrees apart
pub fn arc_points(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> Vec<(f64, f64)> {
    let sweep = (end - start).max(0.0);
    let steps = ((sweep / (PI / 36.0)).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let a = start + sweep * i as f64 / steps as f64;
            (cx + r * a.sin(), cy - r * a.cos())
        })
        .collect()
}

/// Approximate rendered width of a Helvetica string
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * GLYPH_ADVANCE
}

/// Cut `text` to `max_chars`, marking the cut with "..."
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
