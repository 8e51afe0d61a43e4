use thiserror::Error;

use crate::credentials::CredentialsError;
use crate::metrics::MetricsError;
use crate::sitemap::SitemapError;

/// Failures that abort a run before any page is processed.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("Search Console authentication failed: {0}")]
    Auth(#[source] MetricsError),

    #[error("Sitemap unavailable: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Sitemap {0} lists no page URLs")]
    EmptySitemap(String),
}
