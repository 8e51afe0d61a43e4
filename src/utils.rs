use time::macros::format_description;
use tracing::warn;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::period::MonthSelection;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    let sitemap = Url::parse(&args.sitemap)
        .map_err(|e| anyhow::anyhow!("--sitemap must be an absolute URL: {}", e))?;
    if !matches!(sitemap.scheme(), "http" | "https") {
        anyhow::bail!("--sitemap must use http or https, got '{}'", sitemap.scheme());
    }

    if let Some(site) = &args.site {
        if site.trim().is_empty() {
            anyhow::bail!("--site must not be empty");
        }
    }

    Ok(())
}

pub fn warn_if_same_month(current: &MonthSelection, baseline: &MonthSelection) {
    if current == baseline {
        warn!(
            action = "validate",
            component = "periods",
            month = %current,
            "Analysis and baseline months are identical, no query can be new"
        );
    }
}
