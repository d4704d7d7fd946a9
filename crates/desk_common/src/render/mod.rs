//! Artifact rendering: charts, pies and ticket tables per report section.

pub mod charts;
pub mod color;
pub mod scene;
pub mod store;
pub mod svg;
pub mod tables;

pub use store::{Artifact, ArtifactSection, ArtifactStore};

use crate::aggregate::{
    priority_stats, satisfaction_stats, split_by_month, split_by_priority, PriorityPartition,
};
use crate::config::SlaConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::sla::breaches_resolution;
use crate::ticket::{Resolution, Ticket};
use tracing::info;

/// Directory of the overview section
pub const OVERVIEW_SECTION: &str = "general";

pub const ANNUAL_GRAPH: &str = "annualGraph";
pub const TIME_GRAPH: &str = "timeGraph";
pub const SATISFACTION_GRAPH: &str = "satisfactionGraph";
pub const STATUS_PIE: &str = "statusPie";
pub const TYPES_PIE: &str = "typesPie";
pub const OPEN_TABLE: &str = "openTable";
pub const BREACH_TABLE: &str = "breachTable";
pub const REGULAR_TABLE: &str = "regularTable";

pub struct ArtifactRenderer<'a> {
    config: &'a SlaConfig,
    store: &'a ArtifactStore,
}

impl<'a> ArtifactRenderer<'a> {
    pub fn new(config: &'a SlaConfig, store: &'a ArtifactStore) -> Self {
        Self { config, store }
    }

    /// Persist every page of a table as `{base}{n}`, numbering from 1
    pub fn render_table(&self, section: &str, base: &str, tickets: &[&Ticket]) -> Result<Vec<Artifact>> {
        tables::ticket_table_pages(tickets, self.config)
            .into_iter()
            .enumerate()
            .map(|(i, scene)| self.store.persist(section, &format!("{}{}", base, i + 1), scene))
            .collect()
    }

    /// Overview over the whole dataset
    pub fn render_overview(&self, tickets: &[Ticket], diagnostics: &mut Diagnostics) -> Result<ArtifactSection> {
        let mut section = ArtifactSection::new(OVERVIEW_SECTION, "Overview");

        let months = split_by_month(tickets);
        let annual = charts::annual_graph(&months, self.config);
        section.charts.push(self.store.persist(OVERVIEW_SECTION, ANNUAL_GRAPH, annual)?);

        let stats: Vec<_> = split_by_priority(tickets, self.config)
            .iter()
            .map(|p| priority_stats(p, self.config))
            .collect();
        let time = charts::time_graph(&stats, self.config);
        section.charts.push(self.store.persist(OVERVIEW_SECTION, TIME_GRAPH, time)?);

        let satisfaction = satisfaction_stats(tickets);
        if satisfaction.rated > 0 {
            let graph = charts::satisfaction_graph(&satisfaction, self.config);
            section
                .charts
                .push(self.store.persist(OVERVIEW_SECTION, SATISFACTION_GRAPH, graph)?);
        } else {
            diagnostics.push(Diagnostic::ArtifactSkipped {
                section: OVERVIEW_SECTION.to_string(),
                artifact: SATISFACTION_GRAPH.to_string(),
                reason: "no satisfaction ratings".to_string(),
            });
        }

        let open: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| t.resolution == Resolution::Open)
            .collect();
        section.tables = self.render_table(OVERVIEW_SECTION, OPEN_TABLE, &open)?;
        Ok(section)
    }

    /// Section for one priority; `None` when the partition is empty
    pub fn render_priority(
        &self,
        partition: &PriorityPartition<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<ArtifactSection>> {
        let label = partition.label.as_str();
        if partition.is_empty() {
            info!("No tickets to display graph for {}", label);
            for artifact in [STATUS_PIE, TYPES_PIE] {
                diagnostics.push(Diagnostic::ArtifactSkipped {
                    section: label.to_string(),
                    artifact: artifact.to_string(),
                    reason: "empty partition".to_string(),
                });
            }
            return Ok(None);
        }

        let mut section = ArtifactSection::new(label, label);
        if let Some(pie) = charts::status_pie(&partition.status, self.config) {
            section.charts.push(self.store.persist(label, STATUS_PIE, pie)?);
        }
        if let Some(pie) = charts::types_pie(&partition.tickets, self.config) {
            section.charts.push(self.store.persist(label, TYPES_PIE, pie)?);
        }

        let (breach, regular): (Vec<&Ticket>, Vec<&Ticket>) = partition
            .tickets
            .iter()
            .copied()
            .partition(|t| breaches_resolution(t, self.config));
        info!(
            "{}: {} tickets. Not on time: {}. Others: {}",
            label,
            partition.tickets.len(),
            breach.len(),
            regular.len()
        );
        section.tables.extend(self.render_table(label, BREACH_TABLE, &breach)?);
        section.tables.extend(self.render_table(label, REGULAR_TABLE, &regular)?);
        Ok(Some(section))
    }

    /// Overview from `all`, then one section per non-empty priority of `in_range`
    pub fn render_all(
        &self,
        all: &[Ticket],
        in_range: &[Ticket],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<ArtifactSection>> {
        let mut sections = vec![self.render_overview(all, diagnostics)?];
        for partition in split_by_priority(in_range, self.config) {
            if let Some(section) = self.render_priority(&partition, diagnostics)? {
                sections.push(section);
            }
        }
        let artifacts: usize = sections.iter().map(|s| s.charts.len() + s.tables.len()).sum();
        info!("Rendered {} artifacts in {} sections", artifacts, sections.len());
        Ok(sections)
    }
}
