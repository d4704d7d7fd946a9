//! Schema reconciliation for heterogeneous helpdesk exports.
//!
//! Steps, in order: lower-case headers, strip the `custom field (..)`
//! wrapper, rename historical synonyms, keep only configured columns
//! (first occurrence wins), then coerce every cell into a typed `Ticket`.
//! Unparseable cells become nulls plus a `Diagnostic::Parse`.

use crate::config::SlaConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::sla;
use crate::table::{CanonicalTable, RawTable};
use crate::ticket::{columns, Resolution, Ticket};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use tracing::info;

const CUSTOM_FIELD_PREFIX: &str = "custom field (";

/// Header spellings used by older exports, mapped to canonical names
const SYNONYMS: &[(&str, &str)] = &[
    ("time to first response", columns::RESPONSE_TIME),
    ("time to resolution", columns::RESOLUTION_TIME),
];

/// Cell spellings treated as blank
const NULL_MARKERS: &[&str] = &["nan", "<na>", "nat"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%y %H:%M",
    "%d/%b/%y %I:%M %p",
    "%d/%b/%Y %I:%M %p",
    "%d/%b/%y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%d/%b/%y"];

/// Outcome of coercing one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParse<T> {
    Parsed(T),
    /// Blank cell; null without a diagnostic
    Missing,
    Unparseable(String),
}

impl<T> FieldParse<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            FieldParse::Parsed(v) => Some(v),
            _ => None,
        }
    }
}

/// Result of normalizing a table
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub table: CanonicalTable,
    pub diagnostics: Diagnostics,
}

fn is_blank(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || NULL_MARKERS.iter().any(|m| v.eq_ignore_ascii_case(m))
}

/// Canonical name for an export header
pub fn normalize_header(header: &str) -> String {
    let mut name = header.trim().to_lowercase();
    if let Some(inner) = name.strip_prefix(CUSTOM_FIELD_PREFIX) {
        name = inner.strip_suffix(')').unwrap_or(inner).trim().to_string();
    }
    SYNONYMS
        .iter()
        .find(|(old, _)| *old == name)
        .map(|(_, new)| new.to_string())
        .unwrap_or(name)
}

/// `H:MM` becomes total minutes, bare numbers are truncated
///
/// Minutes past 59 carry over: `1:75` is 135.
pub fn parse_duration(value: &str) -> FieldParse<i64> {
    if is_blank(value) {
        return FieldParse::Missing;
    }
    let v = value.trim();
    if v.contains(':') {
        let (negative, body) = match v.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, v),
        };
        let mut parts = body.split(':');
        let hours = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
        let minutes = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
        return match (hours, minutes) {
            (Some(h), Some(m)) if h >= 0 && m >= 0 => {
                let total = h * 60 + m;
                FieldParse::Parsed(if negative { -total } else { total })
            }
            _ => FieldParse::Unparseable(v.to_string()),
        };
    }
    parse_integer(v)
}

/// Nullable integer; fractional values are truncated
pub fn parse_integer(value: &str) -> FieldParse<i64> {
    if is_blank(value) {
        return FieldParse::Missing;
    }
    let v = value.trim();
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() => FieldParse::Parsed(n.trunc() as i64),
        _ => FieldParse::Unparseable(v.to_string()),
    }
}

/// Mixed-format timestamp parser; dates are day-first
pub fn parse_timestamp(value: &str) -> FieldParse<NaiveDateTime> {
    if is_blank(value) {
        return FieldParse::Missing;
    }
    let v = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return FieldParse::Parsed(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(v, fmt) {
            return FieldParse::Parsed(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(v, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return FieldParse::Parsed(dt);
            }
        }
    }
    FieldParse::Unparseable(v.to_string())
}

/// Bucket a free-text status against the configured vocabularies
pub fn classify_status(status: &str, config: &SlaConfig) -> Resolution {
    let status = status.trim().to_lowercase();
    if config.status_closed.iter().any(|s| *s == status) {
        Resolution::Closed
    } else if config.status_open.iter().any(|s| *s == status) {
        Resolution::Open
    } else {
        Resolution::Unknown
    }
}

/// Column selection after header normalization
struct ColumnPlan {
    /// Canonical name -> source column index (first occurrence)
    index: HashMap<String, usize>,
}

fn plan_columns(raw: &RawTable, config: &SlaConfig, diagnostics: &mut Diagnostics) -> ColumnPlan {
    let keep: HashSet<&str> = config
        .columns
        .iter()
        .chain(config.required_columns.iter())
        .map(String::as_str)
        .collect();

    let mut index = HashMap::new();
    for (i, header) in raw.headers.iter().enumerate() {
        let name = normalize_header(header);
        if keep.contains(name.as_str()) && !index.contains_key(&name) {
            index.insert(name, i);
        }
    }

    let required: Vec<String> = config
        .required_columns
        .iter()
        .filter(|c| !index.contains_key(*c))
        .cloned()
        .collect();
    let optional: Vec<String> = config
        .columns
        .iter()
        .filter(|c| !index.contains_key(*c) && !config.required_columns.contains(*c))
        .cloned()
        .collect();

    if !required.is_empty() {
        diagnostics.push(Diagnostic::Schema {
            missing: required,
            mandatory: true,
        });
    }
    if !optional.is_empty() {
        diagnostics.push(Diagnostic::Schema {
            missing: optional,
            mandatory: false,
        });
    }

    ColumnPlan { index }
}

/// Typed access to one source row
struct RowReader<'a> {
    number: usize,
    cells: &'a [String],
    plan: &'a ColumnPlan,
}

impl<'a> RowReader<'a> {
    fn raw(&self, column: &str) -> &'a str {
        self.plan
            .index
            .get(column)
            .and_then(|&i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn text(&self, column: &str) -> String {
        let v = self.raw(column);
        if is_blank(v) {
            String::new()
        } else {
            v.trim().to_string()
        }
    }

    fn flag(&self, column: &str) -> String {
        let v = self.text(column);
        if v.is_empty() {
            "Yes".to_string()
        } else {
            v
        }
    }

    fn typed<T>(
        &self,
        column: &str,
        parse: fn(&str) -> FieldParse<T>,
        diagnostics: &mut Diagnostics,
    ) -> Option<T> {
        match parse(self.raw(column)) {
            FieldParse::Parsed(v) => Some(v),
            FieldParse::Missing => None,
            FieldParse::Unparseable(value) => {
                diagnostics.push(Diagnostic::Parse {
                    row: self.number,
                    column: column.to_string(),
                    value,
                });
                None
            }
        }
    }

    fn ticket(&self, config: &SlaConfig, diagnostics: &mut Diagnostics) -> Ticket {
        let status = self.text(columns::STATUS);
        Ticket {
            issue_key: self.text(columns::ISSUE_KEY),
            issue_type: self.text(columns::ISSUE_TYPE),
            priority: self.text(columns::PRIORITY),
            category: self.text(columns::CATEGORY),
            reporter: self.text(columns::REPORTER),
            assignee: self.text(columns::ASSIGNEE),
            summary: self.text(columns::SUMMARY),
            resolution: classify_status(&status, config),
            status,
            first_time_fix: self.flag(columns::FIRST_TIME_FIX),
            in_scope: self.flag(columns::IN_SCOPE),
            ticket_source: self.text(columns::TICKET_SOURCE),
            cost_centre: self.text(columns::COST_CENTRE),
            location: self.text(columns::LOCATION),
            response_time_minutes: self.typed(columns::RESPONSE_TIME, parse_duration, diagnostics),
            resolution_time_minutes: self.typed(columns::RESOLUTION_TIME, parse_duration, diagnostics),
            actual_response: None,
            actual_resolution: None,
            satisfaction_rating: self.typed(columns::SATISFACTION_RATING, parse_integer, diagnostics),
            time_spent: self.typed(columns::TIME_SPENT, parse_integer, diagnostics),
            created: self.typed(columns::CREATED, parse_timestamp, diagnostics),
            updated: self.typed(columns::UPDATED, parse_timestamp, diagnostics),
        }
    }
}

/// Reconcile a raw export into canonical tickets (no SLA margins yet)
pub fn normalize(raw: &RawTable, config: &SlaConfig) -> Normalized {
    let mut diagnostics = Diagnostics::new();
    let plan = plan_columns(raw, config, &mut diagnostics);

    let tickets = raw
        .rows
        .iter()
        .enumerate()
        .map(|(number, cells)| {
            RowReader {
                number,
                cells,
                plan: &plan,
            }
            .ticket(config, &mut diagnostics)
        })
        .collect::<Vec<_>>();

    info!(
        "Table normalized: {} rows, {} of {} columns kept",
        tickets.len(),
        plan.index.len(),
        raw.headers.len()
    );

    Normalized {
        table: CanonicalTable::new(tickets),
        diagnostics,
    }
}

/// Normalize and apply SLA margins in one pass, the "format" flow
pub fn format_table(raw: &RawTable, config: &SlaConfig) -> Normalized {
    let Normalized {
        table,
        mut diagnostics,
    } = normalize(raw, config);
    let applied = sla::apply_sla(table, config);
    diagnostics.extend(applied.diagnostics);
    Normalized {
        table: applied.table,
        diagnostics,
    }
}

/// Concatenate two exports and drop repeated issue keys, first seen wins
///
/// Headers are normalized first so `Custom field (X)` and `x` line up.
/// A blank issue key counts as one key, so only the first keyless row survives.
pub fn merge_raw(existing: &RawTable, incoming: &RawTable) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    for h in existing.headers.iter().chain(incoming.headers.iter()) {
        let name = normalize_header(h);
        if !headers.contains(&name) {
            headers.push(name);
        }
    }

    let key_col = headers.iter().position(|h| h == columns::ISSUE_KEY);
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(existing.len() + incoming.len());

    for table in [existing, incoming] {
        let source: Vec<Option<usize>> = {
            let names: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
            headers
                .iter()
                .map(|h| names.iter().position(|n| n == h))
                .collect()
        };
        for cells in &table.rows {
            let row: Vec<String> = source
                .iter()
                .map(|i| i.and_then(|i| cells.get(i)).cloned().unwrap_or_default())
                .collect();
            if let Some(k) = key_col {
                let key = row[k].trim().to_string();
                if !seen.insert(key) {
                    continue;
                }
            }
            rows.push(row);
        }
    }

    info!(
        "Merged {} + {} rows into {}",
        existing.len(),
        incoming.len(),
        rows.len()
    );
    RawTable::new(headers, rows)
}

/// Fold `merge_raw` over any number of exports
pub fn merge_all(tables: &[RawTable]) -> RawTable {
    match tables.split_first() {
        None => RawTable::default(),
        Some((first, rest)) => rest
            .iter()
            .fold(merge_raw(first, &RawTable::default()), |acc, t| merge_raw(&acc, t)),
    }
}
