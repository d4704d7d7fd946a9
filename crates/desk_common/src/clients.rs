//! Client detection from issue-key prefixes (`ACME-123` -> `ACME`).

use crate::table::CanonicalTable;
use crate::ticket::Ticket;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Keyword that keeps every client in `filter_clients`
pub const ALL_CLIENTS: &str = "ALL";

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]+)-\d+").expect("static regex"))
}

/// Upper-cased client prefix of an issue key
pub fn client_prefix(issue_key: &str) -> Option<String> {
    key_pattern()
        .captures(issue_key.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Distinct client prefixes in first-seen order
pub fn clients_in(table: &CanonicalTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter_map(|t| client_prefix(&t.issue_key))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Keep tickets whose prefix is listed; `ALL` keeps everything
pub fn filter_clients(table: &CanonicalTable, prefixes: &[String]) -> CanonicalTable {
    let wanted: HashSet<String> = prefixes
        .iter()
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect();
    if wanted.is_empty() || wanted.contains(ALL_CLIENTS) {
        return table.clone();
    }
    let tickets: Vec<Ticket> = table
        .iter()
        .filter(|t| client_prefix(&t.issue_key).is_some_and(|p| wanted.contains(&p)))
        .cloned()
        .collect();
    CanonicalTable::new(tickets)
}

/// `{client}.csv` when the table holds exactly one client
pub fn recommended_file_name(table: &CanonicalTable) -> Option<String> {
    match clients_in(table).as_slice() {
        [only] => Some(format!("{}.csv", only.to_lowercase())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(keys: &[&str]) -> CanonicalTable {
        CanonicalTable::new(
            keys.iter()
                .map(|k| Ticket {
                    issue_key: k.to_string(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_prefix_extraction() {
        assert_eq!(client_prefix("acme-12"), Some("ACME".to_string()));
        assert_eq!(client_prefix("ACME12"), None);
        assert_eq!(client_prefix("12-ACME"), None);
    }

    #[test]
    fn test_clients_and_recommendation() {
        let single = table(&["ACME-1", "ACME-2"]);
        assert_eq!(clients_in(&single), vec!["ACME"]);
        assert_eq!(recommended_file_name(&single), Some("acme.csv".to_string()));

        let mixed = table(&["ACME-1", "GLOBEX-4", "ACME-3"]);
        assert_eq!(clients_in(&mixed), vec!["ACME", "GLOBEX"]);
        assert_eq!(recommended_file_name(&mixed), None);
    }

    #[test]
    fn test_filter_clients() {
        let mixed = table(&["ACME-1", "GLOBEX-4", "INITECH-9"]);
        let kept = filter_clients(&mixed, &["globex".to_string(), " initech".to_string()]);
        assert_eq!(kept.len(), 2);
        assert_eq!(filter_clients(&mixed, &["all".to_string()]).len(), 3);
    }
}
