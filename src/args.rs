use clap::Parser;
use std::path::PathBuf;

use crate::period::MonthSelection;

#[derive(Parser, Debug)]
#[command(
    name = "newkeys",
    about = "Find search queries that started driving impressions to each sitemap page",
    version,
    long_about = None
)]
pub struct Args {
    /// Sitemap URL listing the pages to analyze
    #[arg(short, long)]
    pub sitemap: String,

    /// Analysis month as YYYY-MM (default: last month)
    #[arg(short, long)]
    pub month: Option<MonthSelection>,

    /// Baseline month as YYYY-MM (default: the month before last)
    #[arg(short, long)]
    pub baseline: Option<MonthSelection>,

    /// Path to the service account key file
    #[arg(short, long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Search Console property (default: scheme://host/ of the first sitemap URL)
    #[arg(long)]
    pub site: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
