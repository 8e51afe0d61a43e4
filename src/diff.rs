use crate::metrics::{PageMetricsSnapshot, QueryMetric};

/// Queries present in `current` but absent from `baseline`, with their
/// current-period metrics.
///
/// Matching is exact and case-sensitive. Output order follows the snapshot's
/// iteration order, which is unspecified; consumers sort as they need.
pub fn new_queries(current: &PageMetricsSnapshot, baseline: &PageMetricsSnapshot) -> Vec<QueryMetric> {
    current
        .iter()
        .filter(|(query, _)| !baseline.contains_key(*query))
        .map(|(_, metric)| metric.clone())
        .collect()
}
