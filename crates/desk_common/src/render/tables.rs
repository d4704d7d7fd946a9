//! Paginated ticket tables.
//!
//! Cells are tinted by SLA outcome: breach rows red, everything else
//! (including rows with no resolution margin) blue.

use super::color::Color;
use super::scene::{truncate, Anchor, Scene};
use crate::config::SlaConfig;
use crate::sla::breaches_resolution;
use crate::ticket::{columns, Ticket};
use std::ops::Range;

pub const SUMMARY_MAX_CHARS: usize = 70;
pub const SOURCE_MAX_CHARS: usize = 14;

const TABLE_WIDTH: f64 = 1400.0;
const ROW_HEIGHT: f64 = 18.0;
const FONT_SIZE: f64 = 9.0;
const MARGIN: f64 = 10.0;

/// (header, canonical column, share of table width)
const TABLE_COLUMNS: [(&str, &str, f64); 8] = [
    ("Issue key", columns::ISSUE_KEY, 0.07),
    ("Summary", columns::SUMMARY, 0.40),
    ("Created", columns::CREATED, 0.08),
    ("Updated", columns::UPDATED, 0.08),
    ("Resolution", columns::RESOLUTION, 0.06),
    ("First time fix", columns::FIRST_TIME_FIX, 0.06),
    ("In scope", columns::IN_SCOPE, 0.05),
    ("Ticket source", columns::TICKET_SOURCE, 0.08),
];

/// Row ranges of `per_page` rows; no pages for no rows
pub fn paginate(len: usize, per_page: usize) -> Vec<Range<usize>> {
    let per_page = per_page.max(1);
    (0..len.div_ceil(per_page))
        .map(|page| page * per_page..((page + 1) * per_page).min(len))
        .collect()
}

/// Display text for one table cell
pub fn table_cell(ticket: &Ticket, column: &str) -> String {
    match column {
        columns::SUMMARY => truncate(&ticket.summary, SUMMARY_MAX_CHARS),
        columns::TICKET_SOURCE => truncate(&ticket.ticket_source, SOURCE_MAX_CHARS),
        columns::CREATED => ticket
            .created
            .map(|t| t.date().to_string())
            .unwrap_or_default(),
        columns::UPDATED => ticket
            .updated
            .map(|t| t.date().to_string())
            .unwrap_or_default(),
        other => ticket.cell(other),
    }
}

/// Render one page of rows
pub fn ticket_table_page(tickets: &[&Ticket], config: &SlaConfig) -> Scene {
    let share: f64 = TABLE_COLUMNS.iter().map(|c| c.2).sum();
    let inner = TABLE_WIDTH - 2.0 * MARGIN;
    let widths: Vec<f64> = TABLE_COLUMNS.iter().map(|c| c.2 / share * inner).collect();
    let height = (tickets.len() + 1) as f64 * ROW_HEIGHT + 2.0 * MARGIN;

    let mut scene = Scene::new(TABLE_WIDTH, height);
    let mut x = MARGIN;
    for ((header, _, _), w) in TABLE_COLUMNS.iter().zip(&widths) {
        scene.outlined_rect(x, MARGIN, *w, ROW_HEIGHT, Color::HEADER, Color::GRID);
        scene.text(x + 4.0, MARGIN + 12.5, FONT_SIZE, Anchor::Start, *header);
        x += w;
    }

    for (row, ticket) in tickets.iter().enumerate() {
        let y = MARGIN + (row + 1) as f64 * ROW_HEIGHT;
        let fill = if breaches_resolution(ticket, config) {
            Color::BREACH
        } else {
            Color::ON_TARGET
        };
        let mut x = MARGIN;
        for ((_, column, _), w) in TABLE_COLUMNS.iter().zip(&widths) {
            scene.outlined_rect(x, y, *w, ROW_HEIGHT, fill, Color::GRID);
            scene.text(x + 4.0, y + 12.5, FONT_SIZE, Anchor::Start, table_cell(ticket, column));
            x += w;
        }
    }
    scene
}

/// One scene per page at the configured page size
pub fn ticket_table_pages(tickets: &[&Ticket], config: &SlaConfig) -> Vec<Scene> {
    paginate(tickets.len(), config.table_rows_per_page)
        .into_iter()
        .map(|range| ticket_table_page(&tickets[range], config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::Element;

    fn fills(scene: &Scene) -> Vec<Color> {
        scene
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_paginate() {
        let pages = paginate(250, 100);
        assert_eq!(pages, vec![0..100, 100..200, 200..250]);
        assert_eq!(paginate(200, 100).len(), 2);
        assert!(paginate(0, 100).is_empty());
    }

    #[test]
    fn test_breach_rows_are_red() {
        let config = SlaConfig::default();
        let late = Ticket {
            priority: "High".to_string(),
            actual_resolution: Some(600),
            ..Default::default()
        };
        let unknown = Ticket {
            priority: "High".to_string(),
            ..Default::default()
        };
        let scene = ticket_table_page(&[&late, &unknown], &config);
        let fills = fills(&scene);
        let cols = TABLE_COLUMNS.len();
        assert_eq!(fills.len(), cols * 3);
        assert!(fills[cols..2 * cols].iter().all(|c| *c == Color::BREACH));
        assert!(fills[2 * cols..].iter().all(|c| *c == Color::ON_TARGET));
    }

    #[test]
    fn test_cells_truncate_text() {
        let t = Ticket {
            summary: "x".repeat(200),
            ticket_source: "Customer Portal Widget".to_string(),
            ..Default::default()
        };
        assert_eq!(table_cell(&t, columns::SUMMARY).chars().count(), SUMMARY_MAX_CHARS);
        assert_eq!(table_cell(&t, columns::TICKET_SOURCE), "Customer Po...");
    }

    #[test]
    fn test_pages_follow_config() {
        let mut config = SlaConfig::default();
        config.table_rows_per_page = 2;
        let tickets: Vec<Ticket> = (0..5).map(|_| Ticket::default()).collect();
        let refs: Vec<&Ticket> = tickets.iter().collect();
        assert_eq!(ticket_table_pages(&refs, &config).len(), 3);
    }
}
