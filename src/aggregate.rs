use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::diff::new_queries;
use crate::metrics::{fetch_page_queries, PageMetricsSnapshot, SearchAnalytics};
use crate::period::DateRange;
use crate::stats::{AnalysisResult, NewQueryReport};

pub const DEFAULT_LIMIT: usize = 50;

/// One URL finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub url: &'a str,
}

impl Progress<'_> {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Fixed sleep cadence between pages, the only throttling applied to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub every: usize,
    pub pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            every: 10,
            pause: Duration::from_millis(20),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            every: 0,
            pause: Duration::ZERO,
        }
    }

    fn pause_after(&self, index: usize) {
        if self.every > 0 && !self.pause.is_zero() && index % self.every == 0 {
            thread::sleep(self.pause);
        }
    }
}

/// Walks the URL list one page at a time and ranks pages by new-query count.
///
/// Pages are processed strictly in order: two fetches and a diff per URL
/// before moving on. The loop body in [`ResultAggregator::run`] is the only
/// place a bounded worker pool would slot in; ranking happens after the loop
/// and does not depend on processing order beyond tie-breaking.
pub struct ResultAggregator<'a, S: SearchAnalytics + ?Sized> {
    service: &'a S,
    pacing: Pacing,
    limit: usize,
}

impl<'a, S: SearchAnalytics + ?Sized> ResultAggregator<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            pacing: Pacing::default(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// A failed fetch counts as an empty snapshot; the page simply reports
    /// no new queries for that period.
    fn snapshot(
        &self,
        site: &str,
        page: &str,
        range: &DateRange,
        failed: &mut usize,
    ) -> PageMetricsSnapshot {
        match fetch_page_queries(self.service, site, page, range) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                *failed += 1;
                warn!(action = "fetch", component = "aggregator", page = page, range = %range, error = %e, "Metrics fetch failed, treating as empty");
                PageMetricsSnapshot::new()
            }
        }
    }

    pub fn run<F>(
        &self,
        urls: &[String],
        site: &str,
        current: &DateRange,
        baseline: &DateRange,
        mut on_progress: F,
    ) -> AnalysisResult
    where
        F: FnMut(Progress<'_>),
    {
        let start_time = Instant::now();
        let total = urls.len();
        info!(
            action = "start",
            component = "aggregator",
            site = site,
            url_count = total,
            current = %current,
            baseline = %baseline,
            "Scanning pages for new queries"
        );

        let mut reports = Vec::new();
        let mut failed_fetches = 0;

        for (index, url) in urls.iter().enumerate() {
            let now = self.snapshot(site, url, current, &mut failed_fetches);
            let before = self.snapshot(site, url, baseline, &mut failed_fetches);

            let fresh = new_queries(&now, &before);
            if !fresh.is_empty() {
                reports.push(NewQueryReport::new(url.clone(), fresh));
            }

            on_progress(Progress {
                processed: index + 1,
                total,
                url,
            });
            self.pacing.pause_after(index);
        }

        let pages_with_new_queries = reports.len();
        // stable: ties keep sitemap order
        reports.sort_by(|a, b| b.new_query_count.cmp(&a.new_query_count));
        reports.truncate(self.limit);

        info!(
            action = "complete",
            component = "aggregator",
            pages_scanned = total,
            pages_with_new_queries,
            failed_fetches,
            duration_ms = start_time.elapsed().as_millis(),
            "Scan completed"
        );

        AnalysisResult {
            reports,
            pages_scanned: total,
            pages_with_new_queries,
            failed_fetches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_progress() {
        let p = Progress {
            processed: 1,
            total: 4,
            url: "https://ex.com/a",
        };
        assert_eq!(p.fraction(), 0.25);
    }

    #[test]
    fn empty_run_is_complete() {
        let p = Progress {
            processed: 0,
            total: 0,
            url: "",
        };
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn default_pacing_matches_cadence() {
        let pacing = Pacing::default();
        assert_eq!(pacing.every, 10);
        assert_eq!(pacing.pause, Duration::from_millis(20));
    }
}
