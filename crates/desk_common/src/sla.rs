//! SLA margin computation.
//!
//! Margin encoding is asymmetric: on time stores minutes remaining
//! (`target - elapsed`), late stores the raw elapsed minutes. Report
//! consumers read it that way, so it must not become a negative margin.

use crate::config::SlaConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::table::CanonicalTable;
use crate::ticket::Ticket;
use std::collections::BTreeMap;
use tracing::info;

/// Margin for one elapsed time against its target
pub fn margin(target: i64, elapsed: i64) -> i64 {
    if elapsed <= target {
        target - elapsed
    } else {
        elapsed
    }
}

/// Whether a ticket's resolution margin exceeds its priority's target
///
/// Null margins and priorities without a target never breach.
pub fn breaches_resolution(ticket: &Ticket, config: &SlaConfig) -> bool {
    match (ticket.actual_resolution, config.resolution_target(&ticket.priority)) {
        (Some(actual), Some(target)) => actual > target,
        _ => false,
    }
}

/// Fill `actual_response` / `actual_resolution` for one ticket
///
/// Returns the ticket and whether a target lookup missed.
pub fn apply_ticket(ticket: Ticket, config: &SlaConfig) -> (Ticket, bool) {
    let response_target = config.response_target(&ticket.priority);
    let resolution_target = config.resolution_target(&ticket.priority);

    let actual_response = match (ticket.response_time_minutes, response_target) {
        (Some(elapsed), Some(target)) => Some(margin(target, elapsed)),
        _ => None,
    };
    let actual_resolution = match (ticket.resolution_time_minutes, resolution_target) {
        (Some(elapsed), Some(target)) => Some(margin(target, elapsed)),
        _ => None,
    };
    let missed = response_target.is_none() || resolution_target.is_none();

    (
        Ticket {
            actual_response,
            actual_resolution,
            ..ticket
        },
        missed,
    )
}

#[derive(Debug, Clone, Default)]
pub struct Applied {
    pub table: CanonicalTable,
    pub diagnostics: Diagnostics,
}

/// Apply margins to every row exactly once, preserving order
pub fn apply_sla(table: CanonicalTable, config: &SlaConfig) -> Applied {
    let mut misses: BTreeMap<String, usize> = BTreeMap::new();
    let tickets: Vec<Ticket> = table
        .tickets
        .into_iter()
        .map(|ticket| {
            let (ticket, missed) = apply_ticket(ticket, config);
            if missed {
                *misses.entry(ticket.priority.clone()).or_default() += 1;
            }
            ticket
        })
        .collect();

    let mut diagnostics = Diagnostics::new();
    for (priority, rows) in misses {
        diagnostics.push(Diagnostic::ConfigLookupMiss { priority, rows });
    }

    let late = tickets
        .iter()
        .filter(|t| breaches_resolution(t, config))
        .count();
    info!("SLA applied to {} rows, {} resolution breaches", tickets.len(), late);

    Applied {
        table: CanonicalTable::new(tickets),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ticket(priority: &str, response: Option<i64>, resolution: Option<i64>) -> Ticket {
        Ticket {
            issue_key: "ACME-1".to_string(),
            priority: priority.to_string(),
            response_time_minutes: response,
            resolution_time_minutes: resolution,
            ..Default::default()
        }
    }

    #[test]
    fn test_on_time_and_late() {
        let config = SlaConfig::default();
        let (t, missed) = apply_ticket(ticket("High", Some(10), Some(500)), &config);
        assert!(!missed);
        assert_eq!(t.actual_response, Some(20));
        assert_eq!(t.actual_resolution, Some(500));
        assert!(breaches_resolution(&t, &config));
    }

    #[test]
    fn test_exact_target_is_on_time() {
        assert_eq!(margin(180, 180), 0);
    }

    #[test]
    fn test_null_elapsed_stays_null() {
        let config = SlaConfig::default();
        let (t, _) = apply_ticket(ticket("High", None, None), &config);
        assert_eq!(t.actual_response, None);
        assert_eq!(t.actual_resolution, None);
        assert!(!breaches_resolution(&t, &config));
    }

    #[test]
    fn test_unknown_priority_reported_once() {
        let config = SlaConfig::default();
        let table = CanonicalTable::new(vec![
            ticket("Urgent", Some(1), Some(1)),
            ticket("Urgent", Some(2), Some(2)),
            ticket("Low", Some(3), Some(3)),
        ]);
        let applied = apply_sla(table, &config);
        assert_eq!(applied.table.len(), 3);
        assert_eq!(applied.table.tickets[0].actual_resolution, None);
        assert_eq!(applied.table.tickets[2].actual_resolution, Some(2877));
        let diags: Vec<_> = applied.diagnostics.iter().collect();
        assert_eq!(
            diags,
            vec![&Diagnostic::ConfigLookupMiss {
                priority: "Urgent".to_string(),
                rows: 2
            }]
        );
    }

    proptest! {
        #[test]
        fn margin_follows_asymmetric_rule(target in 0i64..10_000, elapsed in 0i64..20_000) {
            let m = margin(target, elapsed);
            if elapsed <= target {
                prop_assert_eq!(m, target - elapsed);
                prop_assert!(m >= 0);
            } else {
                prop_assert_eq!(m, elapsed);
            }
        }
    }
}
