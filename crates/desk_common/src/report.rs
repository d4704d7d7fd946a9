//! End-to-end report generation: filter, render, compose, write.

use crate::aggregate::filter_by_created;
use crate::config::SlaConfig;
use crate::diagnostics::Diagnostics;
use crate::document::{compose, wordmark, ReportMetadata};
use crate::error::{DeskError, Result};
use crate::render::color::Color;
use crate::render::{ArtifactRenderer, ArtifactStore};
use crate::table::CanonicalTable;
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Input date format for report ranges
pub const PARAM_DATE_FORMAT: &str = "%d/%m/%Y";

pub const DEFAULT_TITLE: &str = "Service Desk Report";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportParams {
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    pub output: PathBuf,
    pub title: String,
    pub author: String,
    pub client: String,
    /// Also write the canonical dataset here
    pub save_normalized: Option<PathBuf>,
}

impl ReportParams {
    /// Parse a `DD/MM/YYYY` date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), PARAM_DATE_FORMAT).map_err(|_| {
            DeskError::InvalidParams(format!("'{}' is not a DD/MM/YYYY date", value))
        })
    }

    pub fn new(start: &str, end: &str, output: impl Into<PathBuf>) -> Result<Self> {
        let params = Self {
            start: Self::parse_date(start)?,
            end: Self::parse_date(end)?,
            output: output.into(),
            title: DEFAULT_TITLE.to_string(),
            author: String::new(),
            client: String::new(),
            save_normalized: None,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(DeskError::InvalidParams(format!(
                "start date {} is after end date {}",
                self.start.format(PARAM_DATE_FORMAT),
                self.end.format(PARAM_DATE_FORMAT)
            )));
        }
        if self.output.as_os_str().is_empty() {
            return Err(DeskError::InvalidParams("output path is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub output: PathBuf,
    /// Titles of the sections that made it into the document
    pub sections: Vec<String>,
    pub artifacts: usize,
    pub tickets_in_range: usize,
    pub diagnostics: Diagnostics,
}

/// Render every artifact under `resource_root` and write the PDF to `params.output`
pub fn generate_report(
    table: &CanonicalTable,
    config: &SlaConfig,
    params: &ReportParams,
    resource_root: &Path,
) -> Result<ReportOutcome> {
    params.validate()?;

    if !params.client.is_empty() && !config.is_known_client(&params.client) {
        warn!("Client '{}' is not in the configured client list", params.client);
    }

    let mut diagnostics = Diagnostics::new();
    let in_range = filter_by_created(&table.tickets, params.start, params.end);
    info!(
        "Reporting {} of {} tickets between {} and {}",
        in_range.len(),
        table.len(),
        params.start,
        params.end
    );

    let store = ArtifactStore::prepare(resource_root)?;
    let renderer = ArtifactRenderer::new(config, &store);
    let sections = renderer.render_all(&table.tickets, &in_range, &mut diagnostics)?;

    let palette: Vec<Color> = config
        .palette
        .iter()
        .filter_map(|c| Color::from_hex(c))
        .collect();
    let metadata = ReportMetadata {
        title: params.title.clone(),
        author: params.author.clone(),
        client: params.client.clone(),
        start: params.start,
        end: params.end,
        generated: Local::now().date_naive(),
        logo: Some(wordmark(
            if params.client.is_empty() { &params.title } else { &params.client },
            &palette,
        )),
    };
    let bytes = compose(&sections, &metadata)?;
    write_document(&params.output, &bytes)?;
    info!("Wrote {} ({} bytes)", params.output.display(), bytes.len());

    if let Some(path) = &params.save_normalized {
        table.save(path)?;
    }

    let kept: Vec<_> = sections.iter().filter(|s| !s.is_empty()).collect();
    Ok(ReportOutcome {
        output: params.output.clone(),
        sections: kept.iter().map(|s| s.title.clone()).collect(),
        artifacts: kept.iter().map(|s| s.charts.len() + s.tables.len()).sum(),
        tickets_in_range: in_range.len(),
        diagnostics,
    })
}

/// Write through a sibling temp file so a failure never leaves a partial document
pub fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DeskError::DocumentWrite {
            path: path.to_path_buf(),
            reason: "output path has no file name".to_string(),
        })?;
    let partial = path.with_file_name(format!(".{}.partial", name));

    let result = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(DeskError::DocumentWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_date_is_day_first() {
        let d = ReportParams::parse_date("03/04/2024").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
        assert!(ReportParams::parse_date("2024-04-03").is_err());
    }

    #[test]
    fn test_start_after_end_rejected() {
        let err = ReportParams::new("02/04/2024", "01/04/2024", "out.pdf").unwrap_err();
        assert!(matches!(err, DeskError::InvalidParams(_)));
        assert!(ReportParams::new("01/04/2024", "01/04/2024", "out.pdf").is_ok());
    }

    #[test]
    fn test_write_document_replaces_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"old").unwrap();
        write_document(&path, b"%PDF-1.4 new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4 new");
        assert!(!dir.path().join(".report.pdf.partial").exists());
    }

    #[test]
    fn test_write_document_failure_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.pdf");
        let err = write_document(&path, b"%PDF").unwrap_err();
        assert!(err.is_output());
        assert!(!path.exists());
    }
}
