//! SVG serialization of scenes, the persisted artifact format.

use super::scene::{Anchor, Element, Scene};
use std::fmt::Write;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="Helvetica, Arial, sans-serif">"#,
        w = scene.width,
        h = scene.height
    );
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);

    for element in &scene.elements {
        let _ = match element {
            Element::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
            } => {
                let stroke = stroke
                    .map(|s| format!(r#" stroke="{}" stroke-width="0.5""#, s.to_hex()))
                    .unwrap_or_default();
                writeln!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}/>"#,
                    x,
                    y,
                    w,
                    h,
                    fill.to_hex(),
                    stroke
                )
            }
            Element::Polygon { points, fill } => writeln!(
                out,
                r#"<polygon points="{}" fill="{}"/>"#,
                points_attr(points),
                fill.to_hex()
            ),
            Element::Polyline {
                points,
                stroke,
                width,
            } => writeln!(
                out,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
                points_attr(points),
                stroke.to_hex(),
                width
            ),
            Element::Circle { cx, cy, r, fill } => writeln!(
                out,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                cx,
                cy,
                r,
                fill.to_hex()
            ),
            Element::Text {
                x,
                y,
                size,
                anchor,
                text,
                color,
            } => {
                let anchor = match anchor {
                    Anchor::Start => "start",
                    Anchor::Middle => "middle",
                    Anchor::End => "end",
                };
                writeln!(
                    out,
                    r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" text-anchor="{}" fill="{}">{}</text>"#,
                    x,
                    y,
                    size,
                    anchor,
                    color.to_hex(),
                    escape(text)
                )
            }
        };
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::Color;

    #[test]
    fn test_svg_escapes_text() {
        let mut scene = Scene::new(100.0, 50.0);
        scene.text(10.0, 20.0, 12.0, Anchor::Middle, "Fish & <Chips>");
        scene.rect(0.0, 0.0, 5.0, 5.0, Color::BLACK);
        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(svg.contains(r##"fill="#000000""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
