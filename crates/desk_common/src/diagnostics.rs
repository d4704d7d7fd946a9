//! Data-quality diagnostics collected while a run degrades gracefully.
//!
//! Nothing in here aborts a run. Structural failures are `DeskError`s;
//! everything else becomes a `Diagnostic` and is logged when recorded.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single non-fatal data-quality issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Configured columns absent after header normalization
    Schema { missing: Vec<String>, mandatory: bool },
    /// A duration, number or date that could not be parsed; the field is null
    Parse {
        row: usize,
        column: String,
        value: String,
    },
    /// Rows whose priority has no configured SLA target
    ConfigLookupMiss { priority: String, rows: usize },
    /// An artifact that was not rendered
    ArtifactSkipped {
        section: String,
        artifact: String,
        reason: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema { missing, mandatory } => {
                let kind = if *mandatory { "mandatory" } else { "configured" };
                write!(f, "missing {} columns: {}", kind, missing.join(", "))
            }
            Self::Parse { row, column, value } => {
                write!(f, "row {}: unparseable {} value '{}'", row, column, value)
            }
            Self::ConfigLookupMiss { priority, rows } => {
                write!(f, "no SLA target for priority '{}' ({} rows)", priority, rows)
            }
            Self::ArtifactSkipped {
                section,
                artifact,
                reason,
            } => write!(f, "skipped {}/{}: {}", section, artifact, reason),
        }
    }
}

/// Ordered list of diagnostics for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Schema diagnostics only, for callers that surface them as warnings
    pub fn schema_warnings(&self) -> Vec<&Diagnostic> {
        self.items
            .iter()
            .filter(|d| matches!(d, Diagnostic::Schema { .. }))
            .collect()
    }

    pub fn parse_errors(&self) -> usize {
        self.items
            .iter()
            .filter(|d| matches!(d, Diagnostic::Parse { .. }))
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lookup_miss() {
        let d = Diagnostic::ConfigLookupMiss {
            priority: "Urgent".to_string(),
            rows: 3,
        };
        assert_eq!(d.to_string(), "no SLA target for priority 'Urgent' (3 rows)");
    }

    #[test]
    fn test_counters() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::Schema {
            missing: vec!["location".to_string()],
            mandatory: false,
        });
        diags.push(Diagnostic::Parse {
            row: 0,
            column: "created".to_string(),
            value: "soon".to_string(),
        });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.schema_warnings().len(), 1);
        assert_eq!(diags.parse_errors(), 1);
    }
}
