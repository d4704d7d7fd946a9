//! Bar and pie chart builders. Each call returns a brand-new `Scene`.

use super::color::Color;
use super::scene::{Anchor, Scene};
use crate::aggregate::{value_counts, PriorityStats, SatisfactionStats, StatusCounts};
use crate::config::SlaConfig;
use crate::ticket::Ticket;
use std::f64::consts::PI;

const CHART_WIDTH: f64 = 760.0;
const CHART_HEIGHT: f64 = 420.0;
const LEGEND_WIDTH: f64 = 190.0;

/// Pie slices beyond this are dropped
pub const MAX_PIE_SLICES: usize = 6;

pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn for_chart() -> Self {
        Self {
            left: 60.0,
            top: 50.0,
            right: CHART_WIDTH - LEGEND_WIDTH,
            bottom: CHART_HEIGHT - 50.0,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    fn y_of(&self, value: f64, max: f64) -> f64 {
        self.bottom - (value / max).clamp(0.0, 1.0) * self.height()
    }
}

/// One stacked segment layer
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub color: Color,
}

/// Smallest 1/2/5 x 10^n at or above `v`
pub fn nice_max(v: f64) -> f64 {
    if v <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(v.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|candidate| *candidate >= v)
        .unwrap_or(10.0 * magnitude)
}

fn draw_axes(
    scene: &mut Scene,
    area: PlotArea,
    y_max: f64,
    ticks: usize,
    label: impl Fn(f64) -> String,
    y_title: &str,
) {
    for i in 0..=ticks {
        let value = y_max * i as f64 / ticks as f64;
        let y = area.y_of(value, y_max);
        scene.line(vec![(area.left, y), (area.right, y)], Color::GRID, 0.5);
        scene.text(area.left - 6.0, y + 3.5, 10.0, Anchor::End, label(value));
    }
    scene.line(
        vec![(area.left, area.top), (area.left, area.bottom), (area.right, area.bottom)],
        Color::BLACK,
        1.0,
    );
    scene.text(area.left, area.top - 16.0, 11.0, Anchor::Start, y_title);
}

/// Draw stacked bars; returns (bar center x, stack top y) per category
fn draw_stacked_bars(
    scene: &mut Scene,
    area: PlotArea,
    categories: &[String],
    series: &[Series],
    y_max: f64,
) -> Vec<(f64, f64)> {
    let slot = area.width() / categories.len().max(1) as f64;
    let bar_width = slot * 0.6;
    let mut tops = Vec::with_capacity(categories.len());

    for (i, category) in categories.iter().enumerate() {
        let x = area.left + slot * i as f64 + (slot - bar_width) / 2.0;
        let mut stacked = 0.0;
        for s in series {
            let value = s.values.get(i).copied().unwrap_or(0.0).max(0.0);
            if value > 0.0 {
                let y_top = area.y_of(stacked + value, y_max);
                let y_bottom = area.y_of(stacked, y_max);
                scene.rect(x, y_top, bar_width, y_bottom - y_top, s.color);
            }
            stacked += value;
        }
        let center = x + bar_width / 2.0;
        scene.text(center, area.bottom + 16.0, 10.0, Anchor::Middle, category.clone());
        tops.push((center, area.y_of(stacked, y_max)));
    }
    tops
}

fn draw_legend(scene: &mut Scene, x: f64, y: f64, entries: &[(String, Color)]) {
    for (i, (label, color)) in entries.iter().enumerate() {
        let row_y = y + i as f64 * 18.0;
        scene.rect(x, row_y, 10.0, 10.0, *color);
        scene.text(x + 16.0, row_y + 9.0, 10.0, Anchor::Start, label.clone());
    }
}

/// Monthly ticket volume stacked by status, legend labels carry totals
pub fn annual_graph(months: &[Vec<&Ticket>], config: &SlaConfig) -> Scene {
    let counts: Vec<StatusCounts> = months
        .iter()
        .map(|m| StatusCounts::from_tickets(m.iter().copied()))
        .collect();
    let total = |f: fn(&StatusCounts) -> usize| counts.iter().map(f).sum::<usize>();

    let series = vec![
        Series {
            label: format!("Closed ({})", total(|c| c.closed)),
            values: counts.iter().map(|c| c.closed as f64).collect(),
            color: config.color(1),
        },
        Series {
            label: format!("Open ({})", total(|c| c.open)),
            values: counts.iter().map(|c| c.open as f64).collect(),
            color: config.color(0),
        },
        Series {
            label: format!("Unknown ({})", total(|c| c.unknown)),
            values: counts.iter().map(|c| c.unknown as f64).collect(),
            color: config.color(2),
        },
    ];

    let peak = counts.iter().map(StatusCounts::total).max().unwrap_or(0);
    let y_max = nice_max(peak as f64);
    let categories: Vec<String> = MONTH_ABBR.iter().map(|m| m.to_string()).collect();

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    let area = PlotArea::for_chart();
    draw_axes(&mut scene, area, y_max, 5, |v| format!("{:.0}", v), "N tickets");
    draw_stacked_bars(&mut scene, area, &categories, &series, y_max);
    let legend: Vec<(String, Color)> = series.iter().map(|s| (s.label.clone(), s.color)).collect();
    draw_legend(&mut scene, area.right + 20.0, area.top, &legend);
    scene
}

/// Target consumption per priority with the response-time line on top
pub fn time_graph(stats: &[PriorityStats], config: &SlaConfig) -> Scene {
    let splits: Vec<(f64, f64)> = stats.iter().map(PriorityStats::resolution_split).collect();
    let series = vec![
        Series {
            label: "Fixed at first".to_string(),
            values: splits.iter().map(|s| s.0).collect(),
            color: config.color(1),
        },
        Series {
            label: "Not fixed at first".to_string(),
            values: splits.iter().map(|s| s.1).collect(),
            color: config.color(0),
        },
    ];
    let categories: Vec<String> = stats.iter().map(|s| s.label.clone()).collect();

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    let area = PlotArea::for_chart();
    draw_axes(
        &mut scene,
        area,
        1.0,
        5,
        |v| format!("{:.0}%", v * 100.0),
        "Time taken from targets",
    );
    let tops = draw_stacked_bars(&mut scene, area, &categories, &series, 1.0);

    let response: Vec<(f64, f64)> = tops
        .iter()
        .zip(stats)
        .map(|((x, _), s)| (*x, area.y_of(s.response_pct, 1.0)))
        .collect();
    if response.len() > 1 {
        scene.line(response.clone(), Color::BLACK, 1.5);
    }
    for (x, y) in &response {
        scene.circle(*x, *y, 3.0, Color::BLACK);
    }

    for ((x, top), s) in tops.iter().zip(stats) {
        let target = s
            .resolution_target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        scene.text(
            *x,
            top - 6.0,
            9.0,
            Anchor::Middle,
            format!("AVG: {:.0} / {} min", s.avg_resolution.trunc(), target),
        );
    }

    let mut legend: Vec<(String, Color)> = series.iter().map(|s| (s.label.clone(), s.color)).collect();
    legend.push(("Response time".to_string(), Color::BLACK));
    draw_legend(&mut scene, area.right + 20.0, area.top, &legend);
    scene
}

/// Distribution of 1-5 ratings with the headline numbers above it
pub fn satisfaction_graph(stats: &SatisfactionStats, config: &SlaConfig) -> Scene {
    let categories: Vec<String> = (1..=5).map(|r| r.to_string()).collect();
    let series = vec![Series {
        label: format!("Ratings ({})", stats.rated),
        values: stats.distribution.iter().map(|n| *n as f64).collect(),
        color: config.color(0),
    }];
    let peak = stats.distribution.iter().copied().max().unwrap_or(0);
    let y_max = nice_max(peak as f64);

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    let area = PlotArea::for_chart();
    draw_axes(&mut scene, area, y_max, 5, |v| format!("{:.0}", v), "N reviews");
    draw_stacked_bars(&mut scene, area, &categories, &series, y_max);

    let rate = stats
        .review_rate
        .map(|r| format!("{:.0}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    scene.text(
        area.right,
        area.top - 16.0,
        11.0,
        Anchor::End,
        format!("Average {:.2}, review rate {}", stats.average, rate),
    );
    let legend: Vec<(String, Color)> = series.iter().map(|s| (s.label.clone(), s.color)).collect();
    draw_legend(&mut scene, area.right + 20.0, area.top, &legend);
    scene
}

/// Clockwise pie from 12 o'clock; returns false when there is nothing to draw
#[allow(clippy::too_many_arguments)]
fn draw_pie(
    scene: &mut Scene,
    cx: f64,
    cy: f64,
    r: f64,
    values: &[(String, usize)],
    config: &SlaConfig,
    legend_x: f64,
    legend_y: f64,
) -> bool {
    let slices: Vec<&(String, usize)> = values.iter().take(MAX_PIE_SLICES).collect();
    let total: usize = slices.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return false;
    }

    let mut start = 0.0;
    let mut legend = Vec::with_capacity(slices.len());
    for (i, (label, n)) in slices.iter().enumerate() {
        let sweep = *n as f64 / total as f64 * 2.0 * PI;
        let color = config.color(i);
        if *n > 0 {
            scene.wedge(cx, cy, r, start, start + sweep, color);
        }
        start += sweep;
        legend.push((format!("{} ({})", label, n), color));
    }
    draw_legend(scene, legend_x, legend_y, &legend);
    true
}

/// Open / Closed / Unknown pie; `None` for an empty partition
pub fn status_pie(counts: &StatusCounts, config: &SlaConfig) -> Option<Scene> {
    let fallback = ["Open", "Closed", "Unknown"];
    let values: Vec<(String, usize)> = counts
        .as_array()
        .iter()
        .enumerate()
        .map(|(i, n)| (config.status_label(i, fallback[i]), *n))
        .collect();

    let mut scene = Scene::new(560.0, 320.0);
    scene.text(20.0, 24.0, 13.0, Anchor::Start, "Ticket status");
    draw_pie(&mut scene, 160.0, 170.0, 120.0, &values, config, 320.0, 60.0).then_some(scene)
}

/// Issue-type and ticket-source pies side by side
pub fn types_pie(tickets: &[&Ticket], config: &SlaConfig) -> Option<Scene> {
    if tickets.is_empty() {
        return None;
    }
    let types = value_counts(tickets.iter().map(|t| t.issue_type.as_str()));
    let sources = value_counts(tickets.iter().map(|t| t.ticket_source.as_str()));

    let mut scene = Scene::new(900.0, 380.0);
    scene.text(20.0, 24.0, 13.0, Anchor::Start, "Issue types");
    scene.text(470.0, 24.0, 13.0, Anchor::Start, "Ticket sources");
    let left = draw_pie(&mut scene, 120.0, 170.0, 100.0, &types, config, 240.0, 80.0);
    let right = draw_pie(&mut scene, 570.0, 170.0, 100.0, &sources, config, 690.0, 80.0);
    (left || right).then_some(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::Element;

    fn polygons(scene: &Scene) -> usize {
        scene
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Polygon { .. }))
            .count()
    }

    fn texts(scene: &Scene) -> Vec<String> {
        scene
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_nice_max() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(7.0), 10.0);
        assert_eq!(nice_max(13.0), 20.0);
        assert_eq!(nice_max(50.0), 50.0);
        assert_eq!(nice_max(0.3), 0.5);
    }

    #[test]
    fn test_status_pie_skips_zero_slices() {
        let config = SlaConfig::default();
        let counts = StatusCounts {
            open: 3,
            closed: 0,
            unknown: 1,
        };
        let scene = status_pie(&counts, &config).unwrap();
        assert_eq!(polygons(&scene), 2);
        assert!(texts(&scene).contains(&"Closed (0)".to_string()));
        assert!(status_pie(&StatusCounts::default(), &config).is_none());
    }

    #[test]
    fn test_types_pie_empty_partition() {
        assert!(types_pie(&[], &SlaConfig::default()).is_none());
    }

    #[test]
    fn test_annual_legend_totals() {
        let config = SlaConfig::default();
        let closed = Ticket {
            resolution: crate::ticket::Resolution::Closed,
            ..Default::default()
        };
        let mut months: Vec<Vec<&Ticket>> = vec![Vec::new(); 12];
        months[2].push(&closed);
        months[5].push(&closed);
        let labels = texts(&annual_graph(&months, &config));
        assert!(labels.contains(&"Closed (2)".to_string()));
        assert!(labels.contains(&"Open (0)".to_string()));
        assert!(labels.contains(&"Jan".to_string()));
    }

    #[test]
    fn test_time_graph_annotations() {
        let config = SlaConfig::default();
        let stats = vec![PriorityStats {
            label: "High".to_string(),
            count: 2,
            resolution_target: Some(480),
            response_target: Some(30),
            avg_resolution: 150.6,
            avg_response: 10.0,
            resolution_pct: 0.31,
            response_pct: 0.33,
            first_time_fix: Some(1.0),
        }];
        let labels = texts(&time_graph(&stats, &config));
        assert!(labels.contains(&"AVG: 150 / 480 min".to_string()));
        assert!(labels.contains(&"Response time".to_string()));
    }
}
