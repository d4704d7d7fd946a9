//! Document composition: cover page plus one block of pages per section.
//!
//! Page planning is pure and separate from drawing, so layout can be checked
//! without decoding PDF content streams. Writing the bytes to disk is the
//! caller's concern.

pub mod layout;
pub mod pdf;

use crate::render::color::Color;
use crate::render::scene::{Anchor, Element, Scene};
use crate::render::ArtifactSection;
use crate::error::Result;
use chrono::NaiveDate;
use layout::{plan_pages, PageGeometry, Placement};
use pdf::PdfWriter;

/// Date format used on the cover and in footers
pub const DISPLAY_DATE: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub title: String,
    pub author: String,
    pub client: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Printed in every footer
    pub generated: NaiveDate,
    /// Drawn at the top of the cover
    pub logo: Option<Scene>,
}

/// Wordmark for the cover: a colour strip over the client name
pub fn wordmark(client: &str, palette: &[Color]) -> Scene {
    let mut scene = Scene::new(400.0, 120.0);
    let colors: Vec<Color> = if palette.is_empty() {
        vec![Color::HEADER]
    } else {
        palette.to_vec()
    };
    let band = 400.0 / colors.len() as f64;
    for (i, color) in colors.iter().enumerate() {
        scene.rect(i as f64 * band, 0.0, band, 14.0, *color);
    }
    scene.elements.push(Element::Text {
        x: 200.0,
        y: 82.0,
        size: 40.0,
        anchor: Anchor::Middle,
        text: client.to_uppercase(),
        color: colors[0],
    });
    scene
}

/// Text placed on a page, baseline at `y` from the top edge
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub anchor: Anchor,
    pub text: String,
}

/// Contents of one page before it is drawn
#[derive(Debug, Clone)]
pub struct PagePlan<'a> {
    /// Section title; `None` on the cover
    pub heading: Option<String>,
    pub images: Vec<(&'a Scene, Placement)>,
    pub texts: Vec<TextLine>,
}

impl PagePlan<'_> {
    pub fn has_text(&self, text: &str) -> bool {
        self.texts.iter().any(|t| t.text == text)
    }
}

/// Lay out the cover and every non-empty section on A4 pages
pub fn plan_document<'a>(
    sections: &'a [ArtifactSection],
    metadata: &'a ReportMetadata,
) -> Vec<PagePlan<'a>> {
    let geometry = PageGeometry::default();
    let mut pages = vec![cover_page(metadata, &geometry)];

    for section in sections.iter().filter(|s| !s.is_empty()) {
        let mut groups: Vec<Vec<f64>> = Vec::new();
        let mut scenes: Vec<&Scene> = Vec::new();
        if !section.charts.is_empty() {
            groups.push(section.charts.iter().map(|a| a.scene.aspect()).collect());
            scenes.extend(section.charts.iter().map(|a| &a.scene));
        }
        for table in &section.tables {
            groups.push(vec![table.scene.aspect()]);
            scenes.push(&table.scene);
        }

        for placements in plan_pages(&groups, &geometry) {
            let number = pages.len() + 1;
            let mut texts = vec![TextLine {
                x: geometry.width / 2.0,
                y: geometry.margin + 30.0,
                size: 24.0,
                anchor: Anchor::Middle,
                text: section.title.clone(),
            }];
            texts.extend(footer(metadata, number, &geometry));
            pages.push(PagePlan {
                heading: Some(section.title.clone()),
                images: placements.into_iter().map(|p| (scenes[p.item], p)).collect(),
                texts,
            });
        }
    }
    pages
}

/// Build the PDF for `sections`. Sections without artifacts are left out.
pub fn compose(sections: &[ArtifactSection], metadata: &ReportMetadata) -> Result<Vec<u8>> {
    let geometry = PageGeometry::default();
    let mut writer = PdfWriter::new(&metadata.title, geometry.width, geometry.height)?;

    for page in plan_document(sections, metadata) {
        let canvas = writer.new_page();
        for (scene, p) in &page.images {
            canvas.scene(scene, p.x, p.y, p.w);
        }
        for t in &page.texts {
            canvas.text(t.x, t.y, t.size, t.anchor, &t.text, Color::TEXT);
        }
    }

    writer.finish()
}

fn cover_page<'a>(metadata: &'a ReportMetadata, geometry: &PageGeometry) -> PagePlan<'a> {
    let centre = geometry.width / 2.0;
    let mut cursor = geometry.margin + 80.0;
    let mut images = Vec::new();

    if let Some(logo) = &metadata.logo {
        let w = geometry.content_width() / 2.0;
        let h = w * logo.aspect();
        images.push((
            logo,
            Placement {
                item: 0,
                x: centre - w / 2.0,
                y: cursor,
                w,
                h,
            },
        ));
        cursor += h + 80.0;
    }

    let lines = [
        (30.0, metadata.title.clone()),
        (18.0, metadata.client.clone()),
        (
            14.0,
            format!(
                "{} - {}",
                metadata.start.format(DISPLAY_DATE),
                metadata.end.format(DISPLAY_DATE)
            ),
        ),
        (14.0, format!("Prepared by {}", metadata.author)),
    ];
    let mut texts = Vec::new();
    for (size, text) in lines {
        cursor += size * 1.8;
        texts.push(TextLine {
            x: centre,
            y: cursor,
            size,
            anchor: Anchor::Middle,
            text,
        });
    }

    PagePlan {
        heading: None,
        images,
        texts,
    }
}

fn footer(metadata: &ReportMetadata, number: usize, geometry: &PageGeometry) -> [TextLine; 3] {
    let y = geometry.height - geometry.margin;
    let line = |x: f64, anchor: Anchor, text: String| TextLine {
        x,
        y,
        size: 9.0,
        anchor,
        text,
    };
    [
        line(geometry.margin, Anchor::Start, metadata.author.clone()),
        line(geometry.width / 2.0, Anchor::Middle, number.to_string()),
        line(
            geometry.width - geometry.margin,
            Anchor::End,
            metadata.generated.format(DISPLAY_DATE).to_string(),
        ),
    ]
}
