use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::aggregate::{Progress, ResultAggregator};
use crate::credentials::ServiceAccountKey;
use crate::error::SetupError;
use crate::period::MonthSelection;
use crate::search_console::SearchConsoleClient;
use crate::sitemap;
use crate::stats::AnalysisResult;
use crate::utils::format_number;

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sitemap_url: String,
    pub current: MonthSelection,
    pub baseline: MonthSelection,
    pub credentials: PathBuf,
    pub site: Option<String>,
}

/// Full run: credentials, sitemap, then the per-page scan.
///
/// Setup failures return before the first progress event.
pub fn analyze<F>(config: &RunConfig, on_progress: F) -> Result<AnalysisResult, SetupError>
where
    F: FnMut(Progress<'_>),
{
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", sitemap = %config.sitemap_url, "Starting new query analysis");

    let key = ServiceAccountKey::load(&config.credentials)?;
    let service = SearchConsoleClient::connect(key).map_err(SetupError::Auth)?;

    let urls = sitemap::try_fetch(&config.sitemap_url)?;
    let first = urls
        .first()
        .ok_or_else(|| SetupError::EmptySitemap(config.sitemap_url.clone()))?;

    let site = match &config.site {
        Some(site) => site.clone(),
        None => sitemap::site_root(first)?,
    };
    info!(action = "resolve", component = "analysis", site = %site, "Search Console property resolved");

    let result = ResultAggregator::new(&service).run(
        &urls,
        &site,
        &config.current.range(),
        &config.baseline.range(),
        on_progress,
    );

    info!(
        action = "complete",
        component = "analysis",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(result)
}

pub fn print_analysis_results(result: &AnalysisResult, config: &RunConfig) {
    println!(
        "\n--- Results: {} vs {} ---",
        config.current.label(),
        config.baseline.label()
    );
    println!(
        "Pages scanned: {}, with new queries: {}",
        format_number(result.pages_scanned as u64),
        format_number(result.pages_with_new_queries as u64)
    );
    if result.failed_fetches > 0 {
        println!(
            "Failed metric fetches (counted as empty): {}",
            format_number(result.failed_fetches as u64)
        );
    }

    if result.is_empty() {
        println!("\nNo new queries found.");
        return;
    }

    for report in &result.reports {
        println!("\n+{} new — {}", report.new_query_count, report.url);

        let rows = report.by_impressions();
        let width = rows
            .iter()
            .map(|m| m.query.chars().count())
            .max()
            .unwrap_or(0)
            .max("Query".len());

        println!(
            "  {:<width$}  {:>12}  {:>8}  {:>8}",
            "Query",
            "Impressions",
            "Clicks",
            "Position",
            width = width
        );
        for metric in &rows {
            println!(
                "  {:<width$}  {:>12}  {:>8}  {:>8.1}",
                metric.query,
                format_number(metric.impressions),
                format_number(metric.clicks),
                metric.position,
                width = width
            );
        }

        println!("\nQueries:\n{}", report.copy_block());
    }
}
