//! SLA configuration store.
//!
//! Loaded once per process from a JSON document and passed by reference to
//! every pipeline stage. Legacy export keys (`SLAresponse`, `statusOpen`,
//! `colorsICE`, ...) are accepted as aliases of the snake_case names.
//!
//! Configuration lives in config/details.json unless `--config` or
//! `DESK_CONFIG` points elsewhere.

use crate::error::{DeskError, Result};
use crate::render::color::Color;
use crate::{CONFIG_ENV, DEFAULT_CONFIG_PATH, DEFAULT_RESOURCE_ROOT};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rows per rendered ticket-table page
pub const DEFAULT_ROWS_PER_PAGE: usize = 100;

/// Immutable SLA and vocabulary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Response target in minutes, keyed by priority label
    #[serde(alias = "SLAresponse", deserialize_with = "de_targets")]
    pub response_agreed: HashMap<String, i64>,

    /// Resolution target in minutes, keyed by priority label
    #[serde(alias = "SLAresolution", deserialize_with = "de_targets")]
    pub resolution_agreed: HashMap<String, i64>,

    /// Raw status strings counted as Open
    #[serde(alias = "statusOpen")]
    pub status_open: Vec<String>,

    /// Raw status strings counted as Closed
    #[serde(alias = "statusClosed")]
    pub status_closed: Vec<String>,

    /// Column keep-list (canonical, lower-case names)
    pub columns: Vec<String>,

    /// Columns whose absence is reported as mandatory
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,

    /// Report section order
    #[serde(alias = "priorityLabels")]
    pub priority_labels: Vec<String>,

    /// Legend labels for status pies (Open, Closed, Unknown order)
    #[serde(alias = "statusLabels")]
    pub status_labels: Vec<String>,

    /// Chart palette, reused cyclically
    #[serde(alias = "colorsICE")]
    pub palette: Vec<String>,

    /// Known client prefixes
    #[serde(default)]
    pub clients: Vec<String>,

    #[serde(default = "default_rows_per_page")]
    pub table_rows_per_page: usize,

    #[serde(default = "default_resource_root")]
    pub resource_root: PathBuf,
}

fn default_required_columns() -> Vec<String> {
    ["issue key", "priority", "status", "created"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

fn default_resource_root() -> PathBuf {
    PathBuf::from(DEFAULT_RESOURCE_ROOT)
}

/// Targets may be written as numbers or numeric strings
fn de_targets<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Target {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw = HashMap::<String, Target>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(priority, target)| {
            let minutes = match target {
                Target::Int(n) => n,
                Target::Float(f) => f as i64,
                Target::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                    serde::de::Error::custom(format!(
                        "target for '{}' is not a number: '{}'",
                        priority, s
                    ))
                })?,
            };
            Ok((priority, minutes))
        })
        .collect()
}

impl Default for SlaConfig {
    fn default() -> Self {
        let targets = |pairs: &[(&str, i64)]| -> HashMap<String, i64> {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };
        let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };

        Self {
            response_agreed: targets(&[
                ("Highest", 15),
                ("High", 30),
                ("Medium", 60),
                ("Low", 240),
                ("Lowest", 480),
            ]),
            resolution_agreed: targets(&[
                ("Highest", 240),
                ("High", 480),
                ("Medium", 1440),
                ("Low", 2880),
                ("Lowest", 4320),
            ]),
            status_open: strings(&[
                "open",
                "in progress",
                "to do",
                "reopened",
                "pending",
                "escalated",
                "waiting for support",
                "waiting for customer",
            ]),
            status_closed: strings(&["resolved", "closed", "done", "cancelled", "canceled"]),
            columns: strings(&[
                "issue key",
                "issue type",
                "priority",
                "category",
                "reporter",
                "assignee",
                "summary",
                "status",
                "first time fix",
                "in scope",
                "ticket source",
                "cost centre",
                "location",
                "response time",
                "resolution time",
                "satisfaction rating",
                "time spent",
                "created",
                "updated",
            ]),
            required_columns: default_required_columns(),
            priority_labels: strings(&["Highest", "High", "Medium", "Low", "Lowest"]),
            status_labels: strings(&["Open", "Closed", "Unknown"]),
            palette: strings(&["#1F3B73", "#F28C28", "#6CA6CD", "#A7C957", "#BC4749", "#7D5BA6"]),
            clients: Vec::new(),
            table_rows_per_page: DEFAULT_ROWS_PER_PAGE,
            resource_root: default_resource_root(),
        }
    }
}

impl SlaConfig {
    /// Resolve the config path: explicit flag, then environment, then default
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load, normalize and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DeskError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&content)?;
        info!(
            "Config loaded from {}: {} priorities, {} kept columns",
            path.display(),
            config.priority_labels.len(),
            config.columns.len()
        );
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: SlaConfig = serde_json::from_str(content)
            .map_err(|e| DeskError::Config(format!("invalid config document: {}", e)))?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Lower-case and trim vocabularies so lookups can compare directly
    fn normalized(mut self) -> Self {
        let clean = |items: Vec<String>| -> Vec<String> {
            items.into_iter().map(|s| s.trim().to_lowercase()).collect()
        };
        self.status_open = clean(self.status_open);
        self.status_closed = clean(self.status_closed);
        self.columns = clean(self.columns);
        self.required_columns = clean(self.required_columns);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.priority_labels.is_empty() {
            return Err(DeskError::Config("priority label list is empty".to_string()));
        }
        if self.palette.is_empty() {
            return Err(DeskError::Config("color palette is empty".to_string()));
        }
        if let Some(bad) = self.palette.iter().find(|c| Color::from_hex(c).is_none()) {
            return Err(DeskError::Config(format!(
                "palette entry '{}' is not a #RRGGBB color",
                bad
            )));
        }
        if self.table_rows_per_page == 0 {
            return Err(DeskError::Config("table_rows_per_page must be positive".to_string()));
        }
        Ok(())
    }

    pub fn response_target(&self, priority: &str) -> Option<i64> {
        self.response_agreed.get(priority).copied()
    }

    pub fn resolution_target(&self, priority: &str) -> Option<i64> {
        self.resolution_agreed.get(priority).copied()
    }

    /// Palette color at `index`, wrapping around
    pub fn color(&self, index: usize) -> Color {
        self.palette
            .get(index % self.palette.len().max(1))
            .and_then(|hex| Color::from_hex(hex))
            .unwrap_or(Color::BLACK)
    }

    /// Legend label for a status bucket, falling back to the bucket name
    pub fn status_label(&self, index: usize, fallback: &str) -> String {
        self.status_labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_known_client(&self, client: &str) -> bool {
        self.clients.is_empty()
            || self
                .clients
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(client.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r##"{
        "SLAresponse": {"High": "30", "Low": 240},
        "SLAresolution": {"High": 180, "Low": "2880"},
        "statusOpen": ["Open ", "In Progress"],
        "statusClosed": ["RESOLVED"],
        "columns": ["Issue Key", "priority", "status"],
        "priorityLabels": ["High", "Low"],
        "statusLabels": ["Open", "Closed", "Unknown"],
        "colorsICE": ["#112233", "#abcdef"]
    }"##;

    #[test]
    fn test_legacy_keys_and_string_targets() {
        let config = SlaConfig::from_json_str(LEGACY).unwrap();
        assert_eq!(config.response_target("High"), Some(30));
        assert_eq!(config.resolution_target("Low"), Some(2880));
        assert_eq!(config.status_open, vec!["open", "in progress"]);
        assert_eq!(config.status_closed, vec!["resolved"]);
        assert_eq!(config.columns[0], "issue key");
        assert_eq!(config.table_rows_per_page, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(config.required_columns.len(), 4);
    }

    #[test]
    fn test_palette_wraps() {
        let config = SlaConfig::from_json_str(LEGACY).unwrap();
        assert_eq!(config.color(0), config.color(2));
        assert_eq!(config.color(1), Color::from_hex("#abcdef").unwrap());
    }

    #[test]
    fn test_rejects_bad_palette() {
        let doc = LEGACY.replace("#abcdef", "blue");
        let err = SlaConfig::from_json_str(&doc).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_empty_priorities() {
        let doc = LEGACY.replace(r#"["High", "Low"]"#, "[]");
        assert!(SlaConfig::from_json_str(&doc).is_err());
    }

    #[test]
    fn test_missing_target_lookup() {
        let config = SlaConfig::from_json_str(LEGACY).unwrap();
        assert_eq!(config.resolution_target("Medium"), None);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = SlaConfig::load(Path::new("/nonexistent/details.json")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_known_client() {
        let mut config = SlaConfig::default();
        assert!(config.is_known_client("ACME"));
        config.clients = vec!["ACME".to_string()];
        assert!(config.is_known_client("acme"));
        assert!(!config.is_known_client("Globex"));
    }
}
