//! PDF output through `printpdf`: vector scenes on fixed-size pages with
//! the built-in Helvetica font.
//!
//! Callers work in points with a top-left origin; conversion to the PDF
//! bottom-left user space happens here.

use crate::error::{DeskError, Result};
use crate::render::color::Color;
use crate::render::scene::{arc_points, text_width, Anchor, Element, Scene};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point, Pt, Rgb,
};
use std::f64::consts::PI;

const LAYER: &str = "Content";

fn mm(pt: f64) -> Mm {
    Mm::from(Pt(pt))
}

fn pdf_color(c: Color) -> printpdf::Color {
    let (r, g, b) = c.unit();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

fn pdf_error(e: printpdf::Error) -> DeskError {
    DeskError::Pdf(e.to_string())
}

/// Drawing surface for one page
pub struct PageCanvas {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    height: f64,
}

impl PageCanvas {
    fn point(&self, x: f64, y: f64) -> (Point, bool) {
        (Point::new(mm(x), mm(self.height - y)), false)
    }

    fn shape(&self, points: &[(f64, f64)], closed: bool, fill: bool, stroke: bool) {
        self.layer.add_shape(Line {
            points: points.iter().map(|(x, y)| self.point(*x, *y)).collect(),
            is_closed: closed,
            has_fill: fill,
            has_stroke: stroke,
            is_clipping_path: false,
        });
    }

    pub fn rect(&self, x: f64, y: f64, w: f64, h: f64, fill: Color, stroke: Option<Color>) {
        self.layer.set_fill_color(pdf_color(fill));
        if let Some(s) = stroke {
            self.layer.set_outline_color(pdf_color(s));
            self.layer.set_outline_thickness(0.5);
        }
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
        self.shape(&corners, true, true, stroke.is_some());
    }

    pub fn polygon(&self, points: &[(f64, f64)], fill: Color) {
        if points.len() < 3 {
            return;
        }
        self.layer.set_fill_color(pdf_color(fill));
        self.shape(points, true, true, false);
    }

    pub fn polyline(&self, points: &[(f64, f64)], stroke: Color, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.layer.set_outline_color(pdf_color(stroke));
        self.layer.set_outline_thickness(width);
        self.shape(points, false, false, true);
    }

    /// Text with its baseline at `y`
    pub fn text(&self, x: f64, y: f64, size: f64, anchor: Anchor, text: &str, color: Color) {
        if text.is_empty() {
            return;
        }
        let width = text_width(text, size);
        let x = match anchor {
            Anchor::Start => x,
            Anchor::Middle => x - width / 2.0,
            Anchor::End => x - width,
        };
        self.layer.set_fill_color(pdf_color(color));
        self.layer
            .use_text(text, size, mm(x), mm(self.height - y), &self.font);
    }

    /// Draw `scene` scaled into the box at (`x`, `y`) with width `w`
    pub fn scene(&self, scene: &Scene, x: f64, y: f64, w: f64) {
        let s = if scene.width > 0.0 { w / scene.width } else { 1.0 };
        let map = |(px, py): (f64, f64)| (x + px * s, y + py * s);

        for element in &scene.elements {
            match element {
                Element::Rect {
                    x: rx,
                    y: ry,
                    w: rw,
                    h: rh,
                    fill,
                    stroke,
                } => {
                    let (px, py) = map((*rx, *ry));
                    self.rect(px, py, rw * s, rh * s, *fill, *stroke);
                }
                Element::Polygon { points, fill } => {
                    let mapped: Vec<(f64, f64)> = points.iter().copied().map(map).collect();
                    self.polygon(&mapped, *fill);
                }
                Element::Polyline {
                    points,
                    stroke,
                    width,
                } => {
                    let mapped: Vec<(f64, f64)> = points.iter().copied().map(map).collect();
                    self.polyline(&mapped, *stroke, (width * s).max(0.25));
                }
                Element::Circle { cx, cy, r, fill } => {
                    let (px, py) = map((*cx, *cy));
                    self.polygon(&arc_points(px, py, r * s, 0.0, 2.0 * PI), *fill);
                }
                Element::Text {
                    x: tx,
                    y: ty,
                    size,
                    anchor,
                    text,
                    color,
                } => {
                    let (px, py) = map((*tx, *ty));
                    self.text(px, py, size * s, *anchor, text, *color);
                }
            }
        }
    }
}

/// A document of equally sized pages
pub struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    width: f64,
    height: f64,
    /// `printpdf` creates the first page with the document
    first: Option<(PdfPageIndex, PdfLayerIndex)>,
    pages: usize,
}

impl PdfWriter {
    pub fn new(title: &str, width: f64, height: f64) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, mm(width), mm(height), LAYER);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        Ok(Self {
            doc,
            font,
            width,
            height,
            first: Some((page, layer)),
            pages: 0,
        })
    }

    pub fn new_page(&mut self) -> PageCanvas {
        let (page, layer) = match self.first.take() {
            Some(first) => first,
            None => self.doc.add_page(mm(self.width), mm(self.height), LAYER),
        };
        self.pages += 1;
        PageCanvas {
            layer: self.doc.get_page(page).get_layer(layer),
            font: self.font.clone(),
            height: self.height,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}
