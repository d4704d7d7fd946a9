//! Canonical ticket record.
//!
//! One row of the normalized dataset. Every field that an export can leave
//! blank is an `Option`; text fields default to the empty string.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used when a canonical table is written back out
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical column names
pub mod columns {
    pub const ISSUE_KEY: &str = "issue key";
    pub const ISSUE_TYPE: &str = "issue type";
    pub const PRIORITY: &str = "priority";
    pub const CATEGORY: &str = "category";
    pub const REPORTER: &str = "reporter";
    pub const ASSIGNEE: &str = "assignee";
    pub const SUMMARY: &str = "summary";
    pub const STATUS: &str = "status";
    pub const RESOLUTION: &str = "resolution";
    pub const FIRST_TIME_FIX: &str = "first time fix";
    pub const IN_SCOPE: &str = "in scope";
    pub const TICKET_SOURCE: &str = "ticket source";
    pub const COST_CENTRE: &str = "cost centre";
    pub const LOCATION: &str = "location";
    pub const RESPONSE_TIME: &str = "response time";
    pub const RESOLUTION_TIME: &str = "resolution time";
    pub const ACTUAL_RESPONSE: &str = "actual response";
    pub const ACTUAL_RESOLUTION: &str = "actual resolution";
    pub const SATISFACTION_RATING: &str = "satisfaction rating";
    pub const TIME_SPENT: &str = "time spent";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";

    /// Output order of a saved canonical table
    pub const ALL: [&str; 22] = [
        ISSUE_KEY,
        ISSUE_TYPE,
        PRIORITY,
        CATEGORY,
        REPORTER,
        ASSIGNEE,
        SUMMARY,
        STATUS,
        RESOLUTION,
        FIRST_TIME_FIX,
        IN_SCOPE,
        TICKET_SOURCE,
        COST_CENTRE,
        LOCATION,
        RESPONSE_TIME,
        RESOLUTION_TIME,
        ACTUAL_RESPONSE,
        ACTUAL_RESOLUTION,
        SATISFACTION_RATING,
        TIME_SPENT,
        CREATED,
        UPDATED,
    ];
}

/// Status bucket derived from the free-text source status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Resolution {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl Resolution {
    /// Bucket order used by status counts and pies
    pub const ORDER: [Resolution; 3] = [Resolution::Open, Resolution::Closed, Resolution::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Open => "Open",
            Resolution::Closed => "Closed",
            Resolution::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ticket {
    pub issue_key: String,
    pub issue_type: String,
    pub priority: String,
    pub category: String,
    pub reporter: String,
    pub assignee: String,
    pub summary: String,
    pub status: String,
    pub resolution: Resolution,
    /// "Yes" unless the export says otherwise
    pub first_time_fix: String,
    /// "Yes" unless the export says otherwise
    pub in_scope: String,
    pub ticket_source: String,
    pub cost_centre: String,
    pub location: String,
    pub response_time_minutes: Option<i64>,
    pub resolution_time_minutes: Option<i64>,
    /// Response margin, see `sla::margin`
    pub actual_response: Option<i64>,
    /// Resolution margin, see `sla::margin`
    pub actual_resolution: Option<i64>,
    pub satisfaction_rating: Option<i64>,
    pub time_spent: Option<i64>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

impl Ticket {
    pub fn is_first_time_fix(&self) -> bool {
        self.first_time_fix == "Yes"
    }

    /// Cell text for a canonical column, empty for nulls and unknown names
    pub fn cell(&self, column: &str) -> String {
        let int = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        let ts = |v: Option<NaiveDateTime>| {
            v.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default()
        };
        match column {
            columns::ISSUE_KEY => self.issue_key.clone(),
            columns::ISSUE_TYPE => self.issue_type.clone(),
            columns::PRIORITY => self.priority.clone(),
            columns::CATEGORY => self.category.clone(),
            columns::REPORTER => self.reporter.clone(),
            columns::ASSIGNEE => self.assignee.clone(),
            columns::SUMMARY => self.summary.clone(),
            columns::STATUS => self.status.clone(),
            columns::RESOLUTION => self.resolution.to_string(),
            columns::FIRST_TIME_FIX => self.first_time_fix.clone(),
            columns::IN_SCOPE => self.in_scope.clone(),
            columns::TICKET_SOURCE => self.ticket_source.clone(),
            columns::COST_CENTRE => self.cost_centre.clone(),
            columns::LOCATION => self.location.clone(),
            columns::RESPONSE_TIME => int(self.response_time_minutes),
            columns::RESOLUTION_TIME => int(self.resolution_time_minutes),
            columns::ACTUAL_RESPONSE => int(self.actual_response),
            columns::ACTUAL_RESOLUTION => int(self.actual_resolution),
            columns::SATISFACTION_RATING => int(self.satisfaction_rating),
            columns::TIME_SPENT => int(self.time_spent),
            columns::CREATED => ts(self.created),
            columns::UPDATED => ts(self.updated),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_formats_nulls_and_timestamps() {
        let ticket = Ticket {
            issue_key: "ACME-1".to_string(),
            response_time_minutes: Some(42),
            created: NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(9, 5, 0)),
            ..Default::default()
        };
        assert_eq!(ticket.cell(columns::ISSUE_KEY), "ACME-1");
        assert_eq!(ticket.cell(columns::RESPONSE_TIME), "42");
        assert_eq!(ticket.cell(columns::RESOLUTION_TIME), "");
        assert_eq!(ticket.cell(columns::CREATED), "2024-03-01 09:05:00");
        assert_eq!(ticket.cell(columns::RESOLUTION), "Unknown");
    }

    #[test]
    fn test_first_time_fix_is_exact_yes() {
        let mut ticket = Ticket {
            first_time_fix: "Yes".to_string(),
            ..Default::default()
        };
        assert!(ticket.is_first_time_fix());
        ticket.first_time_fix = "No".to_string();
        assert!(!ticket.is_first_time_fix());
    }
}
