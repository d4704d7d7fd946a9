//! Property tests over the normalizer and merge.

use desk_common::normalizer::{format_table, merge_raw};
use desk_common::{RawTable, Resolution, SlaConfig};
use proptest::prelude::*;

fn config() -> SlaConfig {
    SlaConfig::from_json_str(
        r##"{"SLAresponse": {"High": 30}, "SLAresolution": {"High": 180, "Low": 600},
            "statusOpen": ["open"], "statusClosed": ["resolved"],
            "columns": ["issue key", "priority", "status", "resolution time", "created"],
            "priorityLabels": ["High", "Low"], "statusLabels": ["Open", "Closed", "Unknown"],
            "colorsICE": ["#000000"]}"##,
    )
    .unwrap()
}

fn row_strategy() -> impl Strategy<Value = Vec<String>> {
    (
        1u32..500,
        prop::sample::select(vec!["High", "Low", "Medium"]),
        prop::sample::select(vec!["Open", "resolved", " RESOLVED ", "blocked"]),
        0i64..100,
        0i64..60,
        1u32..28,
    )
        .prop_map(|(key, priority, status, h, m, day)| {
            vec![
                format!("ACME-{}", key),
                priority.to_string(),
                status.to_string(),
                format!("{}:{:02}", h, m),
                format!("{:02}/03/2024", day),
            ]
        })
}

fn raw(rows: Vec<Vec<String>>) -> RawTable {
    RawTable::new(
        vec![
            "Issue Key".into(),
            "Priority".into(),
            "Status".into(),
            "Time to resolution".into(),
            "Created".into(),
        ],
        rows,
    )
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let config = config();
        let raw = raw(rows);
        let a = format_table(&raw, &config).table;
        let b = format_table(&raw, &config).table;
        prop_assert_eq!(&a, &b);

        let reloaded = format_table(&a.to_raw(), &config).table;
        prop_assert_eq!(a, reloaded);
    }

    #[test]
    fn prop_resolution_depends_only_on_status(rows in prop::collection::vec(row_strategy(), 1..30)) {
        let config = config();
        let table = format_table(&raw(rows), &config).table;
        for t in table.iter() {
            let expected = match t.status.to_lowercase().as_str() {
                "resolved" => Resolution::Closed,
                "open" => Resolution::Open,
                _ => Resolution::Unknown,
            };
            prop_assert_eq!(t.resolution, expected);
        }
    }

    #[test]
    fn prop_self_merge_keeps_unique_rows(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let table = raw(rows);
        let once = merge_raw(&table, &RawTable::new(table.headers.clone(), Vec::new()));
        prop_assert_eq!(merge_raw(&once, &once).len(), once.len());
    }
}
