//! Property-based tests for the period, diff, ranking and rounding guarantees.

mod common;

use chrono::Datelike;
use proptest::prelude::*;
use std::collections::HashSet;

use common::FakeAnalytics;
use newkeys::metrics::round_position;
use newkeys::{month_range, new_queries, Pacing, PageMetricsSnapshot, QueryMetric, ResultAggregator};

// =============================================================================
// Strategy helpers
// =============================================================================

fn snapshot_strategy() -> impl Strategy<Value = PageMetricsSnapshot> {
    prop::collection::hash_map(
        "[a-cA-C]{1,3}",
        (0u64..10_000, 0u64..500, 1.0f64..100.0),
        0..12,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(query, (impressions, clicks, position))| {
                let metric = QueryMetric {
                    query: query.clone(),
                    impressions,
                    clicks,
                    position: round_position(position),
                };
                (query, metric)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn month_range_spans_exactly_one_month(year in 1i32..9999, month in 1u32..=12) {
        let range = month_range(year, month).unwrap();
        prop_assert_eq!(range.start.day(), 1);
        prop_assert_eq!(range.start.month(), month);
        prop_assert!(range.start <= range.end);

        let next = range.end.succ_opt().unwrap();
        prop_assert_eq!(next.day(), 1);
        prop_assert_ne!(next.month(), month);
    }

    #[test]
    fn diff_is_key_set_difference(current in snapshot_strategy(), baseline in snapshot_strategy()) {
        let fresh = new_queries(&current, &baseline);

        let emitted: HashSet<&str> = fresh.iter().map(|m| m.query.as_str()).collect();
        let expected: HashSet<&str> = current
            .keys()
            .filter(|q| !baseline.contains_key(*q))
            .map(String::as_str)
            .collect();
        prop_assert_eq!(emitted.len(), fresh.len());
        prop_assert_eq!(emitted, expected);

        for metric in &fresh {
            prop_assert_eq!(metric, &current[&metric.query]);
        }
    }

    #[test]
    fn diff_is_idempotent(current in snapshot_strategy(), baseline in snapshot_strategy()) {
        let mut first: Vec<String> = new_queries(&current, &baseline).into_iter().map(|m| m.query).collect();
        let mut second: Vec<String> = new_queries(&current, &baseline).into_iter().map(|m| m.query).collect();
        first.sort();
        second.sort();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn rounding_is_stable(position in 0.0f64..500.0) {
        let once = round_position(position);
        prop_assert_eq!(round_position(once), once);
    }

    #[test]
    fn ranking_is_non_increasing_and_capped(counts in prop::collection::vec(0usize..6, 0..70)) {
        let mut service = FakeAnalytics::new();
        let mut urls = Vec::new();
        for (i, count) in counts.iter().enumerate() {
            let url = format!("https://ex.com/p{i}");
            let queries: Vec<(String, u64)> = (0..*count).map(|q| (format!("q{q}"), 1)).collect();
            let query_refs: Vec<(&str, u64)> = queries.iter().map(|(q, n)| (q.as_str(), *n)).collect();
            service = service.with_queries(&url, "2026-03-01", &query_refs);
            urls.push(url);
        }

        let result = ResultAggregator::new(&service)
            .with_pacing(Pacing::none())
            .run(
                &urls,
                "https://ex.com/",
                &month_range(2026, 3).unwrap(),
                &month_range(2026, 2).unwrap(),
                |_| {},
            );

        prop_assert!(result.len() <= 50);
        prop_assert_eq!(result.pages_with_new_queries, counts.iter().filter(|c| **c > 0).count());
        for report in &result.reports {
            prop_assert!(report.new_query_count >= 1);
            prop_assert_eq!(report.new_query_count, report.metrics.len());
        }
        for pair in result.reports.windows(2) {
            prop_assert!(pair[0].new_query_count >= pair[1].new_query_count);
        }
    }
}
