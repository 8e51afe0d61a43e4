use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::period::DateRange;

/// Maximum number of query rows requested per (page, period).
pub const ROW_LIMIT: u32 = 5000;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        MetricsError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Parse(err.to_string())
    }
}

/// Current-period metrics for one query on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMetric {
    pub query: String,
    pub impressions: u64,
    pub clicks: u64,
    pub position: f64,
}

/// Query string to metrics, for one page over one date range.
pub type PageMetricsSnapshot = HashMap<String, QueryMetric>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsRequest {
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub dimension_filter_groups: Vec<FilterGroup>,
    pub row_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<DimensionFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionFilter {
    pub dimension: String,
    pub operator: String,
    pub expression: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<SearchAnalyticsRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchAnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub position: f64,
}

/// The search-analytics query capability. Implementations are expected to be
/// authenticated already and reusable for a whole run.
pub trait SearchAnalytics {
    fn query(
        &self,
        site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> Result<SearchAnalyticsResponse, MetricsError>;
}

impl SearchAnalyticsRequest {
    /// Queries for exactly `page` (equality filter) over `range`.
    pub fn for_page(page: &str, range: &DateRange) -> Self {
        Self {
            start_date: range.start_iso(),
            end_date: range.end_iso(),
            dimensions: vec!["query".to_string()],
            dimension_filter_groups: vec![FilterGroup {
                filters: vec![DimensionFilter {
                    dimension: "page".to_string(),
                    operator: "equals".to_string(),
                    expression: page.to_string(),
                }],
            }],
            row_limit: ROW_LIMIT,
        }
    }
}

/// One fractional digit, rounding the exact decimal value half to even.
pub fn round_position(position: f64) -> f64 {
    format!("{:.1}", position).parse().unwrap_or(position)
}

impl SearchAnalyticsRow {
    /// `None` for rows that carry no query key.
    pub fn into_metric(self) -> Option<QueryMetric> {
        let query = self.keys.into_iter().next()?;
        Some(QueryMetric {
            query,
            // float-to-int `as` truncates and saturates, negatives clamp to 0
            impressions: self.impressions as u64,
            clicks: self.clicks as u64,
            position: round_position(self.position),
        })
    }
}

/// Fetch every query that drove impressions to `page` during `range`.
///
/// Errors are returned, not swallowed; callers that want the best-effort
/// behaviour fall back to an empty snapshot themselves.
pub fn fetch_page_queries<S: SearchAnalytics + ?Sized>(
    service: &S,
    site: &str,
    page: &str,
    range: &DateRange,
) -> Result<PageMetricsSnapshot, MetricsError> {
    let start_time = Instant::now();
    let request = SearchAnalyticsRequest::for_page(page, range);
    let response = service.query(site, &request)?;

    let snapshot: PageMetricsSnapshot = response
        .rows
        .into_iter()
        .filter_map(SearchAnalyticsRow::into_metric)
        .map(|metric| (metric.query.clone(), metric))
        .collect();

    debug!(
        action = "complete",
        component = "metrics_fetch",
        page = page,
        range = %range,
        query_count = snapshot.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Fetched page queries"
    );
    Ok(snapshot)
}
