use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::error;

use newkeys::analysis::{analyze, print_analysis_results, RunConfig};
use newkeys::period::default_periods;
use newkeys::utils::{setup_logging, validate_args, warn_if_same_month};
use newkeys::{Args, Progress};

fn render_progress(progress: Progress<'_>) {
    eprint!(
        "\rProcessing {}/{} ({:.0}%)",
        progress.processed,
        progress.total,
        progress.fraction() * 100.0
    );
    if progress.processed == progress.total {
        eprintln!();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    let (default_current, default_baseline) = default_periods(Local::now().date_naive());
    let config = RunConfig {
        sitemap_url: args.sitemap,
        current: args.month.unwrap_or(default_current),
        baseline: args.baseline.unwrap_or(default_baseline),
        credentials: args.credentials,
        site: args.site,
    };
    warn_if_same_month(&config.current, &config.baseline);

    match analyze(&config, render_progress) {
        Ok(result) => {
            print_analysis_results(&result, &config);
            Ok(())
        }
        Err(e) => {
            error!("Error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
