//! Partitions and derived statistics shared by charts and tables.

use crate::config::SlaConfig;
use crate::ticket::{Resolution, Ticket};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Open / Closed / Unknown counts for one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: usize,
    pub closed: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn from_tickets<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut counts = Self::default();
        for t in tickets {
            match t.resolution {
                Resolution::Open => counts.open += 1,
                Resolution::Closed => counts.closed += 1,
                Resolution::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.open + self.closed + self.unknown
    }

    /// Counts in `Resolution::ORDER`
    pub fn as_array(&self) -> [usize; 3] {
        [self.open, self.closed, self.unknown]
    }
}

/// Tickets of one priority label
#[derive(Debug, Clone)]
pub struct PriorityPartition<'a> {
    pub label: String,
    pub tickets: Vec<&'a Ticket>,
    pub status: StatusCounts,
}

impl PriorityPartition<'_> {
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

/// One partition per configured priority, in configured order
///
/// Tickets whose priority is not configured appear in no partition.
pub fn split_by_priority<'a>(tickets: &'a [Ticket], config: &SlaConfig) -> Vec<PriorityPartition<'a>> {
    config
        .priority_labels
        .iter()
        .map(|label| {
            let members: Vec<&Ticket> = tickets.iter().filter(|t| t.priority == *label).collect();
            PriorityPartition {
                label: label.clone(),
                status: StatusCounts::from_tickets(members.iter().copied()),
                tickets: members,
            }
        })
        .collect()
}

/// Twelve partitions by calendar month of `created`, January first
///
/// Tickets without a creation timestamp are left out.
pub fn split_by_month(tickets: &[Ticket]) -> Vec<Vec<&Ticket>> {
    let mut months: Vec<Vec<&Ticket>> = vec![Vec::new(); 12];
    for t in tickets {
        if let Some(created) = t.created {
            months[created.month0() as usize].push(t);
        }
    }
    months
}

/// Tickets created between `start` and `end`, both days inclusive
pub fn filter_by_created(tickets: &[Ticket], start: NaiveDate, end: NaiveDate) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|t| {
            t.created
                .map(|c| c.date() >= start && c.date() <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Sum of present values over the partition size; 0 for an empty partition
pub fn average_minutes(tickets: &[&Ticket], field: fn(&Ticket) -> Option<i64>) -> f64 {
    if tickets.is_empty() {
        return 0.0;
    }
    let sum: i64 = tickets.iter().filter_map(|t| field(t)).sum();
    sum as f64 / tickets.len() as f64
}

/// Fraction of the target consumed, always within `[0, 1]`
pub fn pct_of_target(average: f64, target: Option<i64>) -> f64 {
    match target {
        Some(target) if target > 0 => {
            let target = target as f64;
            if average >= target {
                1.0
            } else {
                (average / target).max(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Share of tickets fixed first time; `None` when there are no tickets
pub fn first_time_fix_ratio(tickets: &[&Ticket]) -> Option<f64> {
    if tickets.is_empty() {
        return None;
    }
    let fixed = tickets.iter().filter(|t| t.is_first_time_fix()).count();
    Some(fixed as f64 / tickets.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityStats {
    pub label: String,
    pub count: usize,
    pub resolution_target: Option<i64>,
    pub response_target: Option<i64>,
    pub avg_resolution: f64,
    pub avg_response: f64,
    pub resolution_pct: f64,
    pub response_pct: f64,
    pub first_time_fix: Option<f64>,
}

impl PriorityStats {
    /// Resolution share split into (fixed first time, not fixed first time)
    pub fn resolution_split(&self) -> (f64, f64) {
        let ratio = self.first_time_fix.unwrap_or(0.0);
        let fixed = round2(self.resolution_pct * ratio);
        (fixed, round2(self.resolution_pct - fixed))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Averages are taken over the stored margins (`actual_*` fields)
pub fn priority_stats(partition: &PriorityPartition<'_>, config: &SlaConfig) -> PriorityStats {
    let resolution_target = config.resolution_target(&partition.label);
    let response_target = config.response_target(&partition.label);
    let avg_resolution = average_minutes(&partition.tickets, |t| t.actual_resolution);
    let avg_response = average_minutes(&partition.tickets, |t| t.actual_response);

    PriorityStats {
        label: partition.label.clone(),
        count: partition.tickets.len(),
        resolution_target,
        response_target,
        avg_resolution,
        avg_response,
        resolution_pct: pct_of_target(avg_resolution, resolution_target),
        response_pct: pct_of_target(avg_response, response_target),
        first_time_fix: first_time_fix_ratio(&partition.tickets),
    }
}

/// Value frequencies, most common first, ties in first-seen order
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        let key = if v.trim().is_empty() {
            "Unspecified".to_string()
        } else {
            v.trim().to_string()
        };
        let entry = counts.entry(key.clone()).or_insert(0);
        if *entry == 0 {
            order.push(key);
        }
        *entry += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let n = counts.get(&k).copied().unwrap_or(0);
            (k, n)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Customer satisfaction summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SatisfactionStats {
    pub rated: usize,
    /// Mean over rated tickets, 0 when none are rated
    pub average: f64,
    /// Rated tickets per closed ticket; `None` without closed tickets
    pub review_rate: Option<f64>,
    /// Ratings 1..=5; out-of-range ratings count as rated but not here
    pub distribution: [usize; 5],
}

pub fn satisfaction_stats(tickets: &[Ticket]) -> SatisfactionStats {
    let ratings: Vec<i64> = tickets.iter().filter_map(|t| t.satisfaction_rating).collect();
    let closed = tickets
        .iter()
        .filter(|t| t.resolution == Resolution::Closed)
        .count();

    let mut distribution = [0usize; 5];
    for r in &ratings {
        if (1..=5).contains(r) {
            distribution[(*r - 1) as usize] += 1;
        }
    }

    SatisfactionStats {
        rated: ratings.len(),
        average: if ratings.is_empty() {
            0.0
        } else {
            round2(ratings.iter().sum::<i64>() as f64 / ratings.len() as f64)
        },
        review_rate: if closed == 0 {
            None
        } else {
            Some(round2(ratings.len() as f64 / closed as f64))
        },
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(12, 0, 0))
    }

    fn ticket(priority: &str, resolution: Resolution, created: Option<chrono::NaiveDateTime>) -> Ticket {
        Ticket {
            priority: priority.to_string(),
            resolution,
            created,
            first_time_fix: "Yes".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_by_priority_order_and_counts() {
        let config = SlaConfig::default();
        let tickets = vec![
            ticket("Low", Resolution::Open, None),
            ticket("High", Resolution::Closed, None),
            ticket("High", Resolution::Unknown, None),
            ticket("Urgent", Resolution::Open, None),
        ];
        let parts = split_by_priority(&tickets, &config);
        let labels: Vec<&str> = parts.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Highest", "High", "Medium", "Low", "Lowest"]);
        assert_eq!(parts[1].status.as_array(), [0, 1, 1]);
        assert_eq!(parts[3].status.as_array(), [1, 0, 0]);
        assert!(parts[0].is_empty());
    }

    #[test]
    fn test_split_by_month_january_first() {
        let tickets = vec![
            ticket("Low", Resolution::Open, at(2024, 1, 5)),
            ticket("Low", Resolution::Open, at(2023, 12, 31)),
            ticket("Low", Resolution::Open, None),
        ];
        let months = split_by_month(&tickets);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].len(), 1);
        assert_eq!(months[11].len(), 1);
        assert_eq!(months.iter().map(Vec::len).sum::<usize>(), 2);
    }

    #[test]
    fn test_filter_by_created_inclusive() {
        let tickets = vec![
            ticket("Low", Resolution::Open, at(2024, 3, 1)),
            ticket("Low", Resolution::Open, at(2024, 3, 31)),
            ticket("Low", Resolution::Open, at(2024, 4, 1)),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(filter_by_created(&tickets, start, end).len(), 2);
    }

    #[test]
    fn test_empty_partition_conventions() {
        assert_eq!(average_minutes(&[], |t| t.actual_resolution), 0.0);
        assert_eq!(first_time_fix_ratio(&[]), None);
    }

    #[test]
    fn test_average_counts_null_rows_in_denominator() {
        let a = Ticket {
            actual_resolution: Some(30),
            ..Default::default()
        };
        let b = Ticket::default();
        assert_relative_eq!(average_minutes(&[&a, &b], |t| t.actual_resolution), 15.0);
    }

    #[test]
    fn test_pct_of_target_capped() {
        assert_relative_eq!(pct_of_target(90.0, Some(180)), 0.5);
        assert_eq!(pct_of_target(180.0, Some(180)), 1.0);
        assert_eq!(pct_of_target(900.0, Some(180)), 1.0);
        assert_eq!(pct_of_target(-5.0, Some(180)), 0.0);
        assert_eq!(pct_of_target(50.0, None), 0.0);
    }

    #[test]
    fn test_priority_stats_split() {
        let config = SlaConfig::default();
        let mut fixed = ticket("High", Resolution::Closed, None);
        fixed.actual_resolution = Some(240);
        let mut refixed = ticket("High", Resolution::Closed, None);
        refixed.first_time_fix = "No".to_string();
        refixed.actual_resolution = Some(240);
        let tickets = vec![fixed, refixed];
        let parts = split_by_priority(&tickets, &config);
        let stats = priority_stats(&parts[1], &config);
        assert_relative_eq!(stats.resolution_pct, 0.5);
        assert_eq!(stats.first_time_fix, Some(0.5));
        assert_eq!(stats.resolution_split(), (0.25, 0.25));
    }

    #[test]
    fn test_value_counts_sorted() {
        let counts = value_counts(["Email", "Phone", "Email", ""]);
        assert_eq!(counts[0], ("Email".to_string(), 2));
        assert_eq!(counts[1], ("Phone".to_string(), 1));
        assert_eq!(counts[2], ("Unspecified".to_string(), 1));
    }

    #[test]
    fn test_satisfaction_stats() {
        let mut a = ticket("Low", Resolution::Closed, None);
        a.satisfaction_rating = Some(5);
        let mut b = ticket("Low", Resolution::Closed, None);
        b.satisfaction_rating = Some(4);
        let c = ticket("Low", Resolution::Closed, None);
        let d = ticket("Low", Resolution::Closed, None);
        let stats = satisfaction_stats(&[a, b, c, d]);
        assert_eq!(stats.rated, 2);
        assert_relative_eq!(stats.average, 4.5);
        assert_eq!(stats.review_rate, Some(0.5));
        assert_eq!(stats.distribution, [0, 0, 0, 1, 1]);
        assert_eq!(satisfaction_stats(&[]).review_rate, None);
    }

    proptest! {
        #[test]
        fn pct_of_target_stays_in_unit_range(
            average in -1.0e6f64..1.0e6,
            target in proptest::option::of(-1_000i64..100_000),
        ) {
            let pct = pct_of_target(average, target);
            prop_assert!((0.0..=1.0).contains(&pct));
            if target.map_or(true, |t| t <= 0) {
                prop_assert_eq!(pct, 0.0);
            }
        }

        #[test]
        fn pct_of_target_saturates_at_target(target in 1i64..100_000, over in 0.0f64..1.0e6) {
            prop_assert_eq!(pct_of_target(target as f64 + over, Some(target)), 1.0);
        }
    }
}
