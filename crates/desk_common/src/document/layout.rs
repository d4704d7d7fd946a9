//! Page geometry and image placement.
//!
//! Coordinates are in points with the origin at the top-left of the page.

pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 40.0;

/// Vertical room taken by the section title
pub const TITLE_BAND: f64 = 60.0;
/// Vertical room taken by the footer
pub const FOOTER_BAND: f64 = 30.0;
/// Space between stacked images
pub const IMAGE_GAP: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: MARGIN,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn content_top(&self) -> f64 {
        self.margin + TITLE_BAND
    }

    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin - FOOTER_BAND
    }

    pub fn content_height(&self) -> f64 {
        self.content_bottom() - self.content_top()
    }

    /// Size of an image with `aspect` (height / width), scaled to the content
    /// width and shrunk to fit the content height
    pub fn fit(&self, aspect: f64) -> (f64, f64) {
        let width = self.content_width();
        let height = width * aspect;
        if height <= self.content_height() {
            (width, height)
        } else {
            let height = self.content_height();
            (height / aspect, height)
        }
    }
}

/// Where one image lands on a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Index of the image in the flattened input order
    pub item: usize,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Lay out groups of images, each group starting on a fresh page. Within a
/// group images stack top-down and flow onto a new page when the next one
/// does not fit.
pub fn plan_pages(groups: &[Vec<f64>], geometry: &PageGeometry) -> Vec<Vec<Placement>> {
    let mut pages: Vec<Vec<Placement>> = Vec::new();
    let mut item = 0;

    for group in groups {
        if group.is_empty() {
            continue;
        }
        let mut page: Vec<Placement> = Vec::new();
        let mut cursor = geometry.content_top();

        for &aspect in group {
            let (w, h) = geometry.fit(aspect);
            if !page.is_empty() && cursor + h > geometry.content_bottom() {
                pages.push(std::mem::take(&mut page));
                cursor = geometry.content_top();
            }
            page.push(Placement {
                item,
                x: geometry.margin + (geometry.content_width() - w) / 2.0,
                y: cursor,
                w,
                h,
            });
            cursor += h + IMAGE_GAP;
            item += 1;
        }
        pages.push(page);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_scales_to_width() {
        let g = PageGeometry::default();
        let (w, h) = g.fit(0.5);
        assert_relative_eq!(w, 515.0);
        assert_relative_eq!(h, 257.5);
    }

    #[test]
    fn test_fit_shrinks_tall_images() {
        let g = PageGeometry::default();
        let (w, h) = g.fit(3.0);
        assert_relative_eq!(h, g.content_height());
        assert_relative_eq!(w, g.content_height() / 3.0);
    }

    #[test]
    fn test_charts_overflow_to_next_page() {
        let g = PageGeometry::default();
        // three half-height charts cannot share one page
        let pages = plan_pages(&[vec![0.5, 0.5, 0.5]], &g);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[1][0].item, 2);
        assert_relative_eq!(pages[1][0].y, g.content_top());
    }

    #[test]
    fn test_each_group_starts_a_page() {
        let g = PageGeometry::default();
        let pages = plan_pages(&[vec![0.2], vec![1.2], vec![], vec![1.2]], &g);
        assert_eq!(pages.len(), 3);
        let items: Vec<usize> = pages.iter().map(|p| p[0].item).collect();
        assert_eq!(items, vec![0, 1, 2]);
    }
}
