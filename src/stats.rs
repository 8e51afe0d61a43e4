use crate::metrics::QueryMetric;

/// Queries that started driving impressions to one page.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueryReport {
    pub url: String,
    pub new_query_count: usize,
    pub metrics: Vec<QueryMetric>,
}

impl NewQueryReport {
    pub fn new(url: String, metrics: Vec<QueryMetric>) -> Self {
        Self {
            url,
            new_query_count: metrics.len(),
            metrics,
        }
    }

    /// Metrics ordered by impressions, highest first, for display.
    pub fn by_impressions(&self) -> Vec<&QueryMetric> {
        let mut sorted: Vec<&QueryMetric> = self.metrics.iter().collect();
        sorted.sort_by(|a, b| b.impressions.cmp(&a.impressions));
        sorted
    }

    /// Newline-joined queries in display order, for copying out.
    pub fn copy_block(&self) -> String {
        self.by_impressions()
            .iter()
            .map(|m| m.query.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    /// Ranked by `new_query_count`, highest first, capped at the run's limit.
    pub reports: Vec<NewQueryReport>,
    pub pages_scanned: usize,
    /// Pages with at least one new query, before truncation.
    pub pages_with_new_queries: usize,
    /// (page, period) fetches that failed and were treated as empty.
    pub failed_fetches: usize,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }
}
