pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod credentials;
pub mod diff;
pub mod error;
pub mod metrics;
pub mod period;
pub mod search_console;
pub mod sitemap;
pub mod stats;
pub mod utils;

pub use aggregate::{Pacing, Progress, ResultAggregator};
pub use analysis::{analyze, RunConfig};
pub use args::Args;
pub use diff::new_queries;
pub use error::SetupError;
pub use metrics::{
    fetch_page_queries, MetricsError, PageMetricsSnapshot, QueryMetric, SearchAnalytics,
};
pub use period::{month_range, DateRange, MonthSelection};
pub use stats::{AnalysisResult, NewQueryReport};
