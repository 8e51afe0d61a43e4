use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;
use xml::reader::{EventReader, XmlEvent};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed sitemap XML: {0}")]
    Xml(String),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for SitemapError {
    fn from(err: reqwest::Error) -> Self {
        SitemapError::Network(err.to_string())
    }
}

/// Fetch a sitemap and return its page URLs, or an empty list on any failure.
///
/// The failure is logged; use [`try_fetch`] to inspect it.
pub fn fetch(url: &str) -> Vec<String> {
    match try_fetch(url) {
        Ok(urls) => urls,
        Err(e) => {
            error!(action = "fetch", component = "sitemap", url = url, error = %e, "Failed to load sitemap");
            Vec::new()
        }
    }
}

/// Fetch a sitemap over HTTP and extract every `<url><loc>` in document order.
pub fn try_fetch(url: &str) -> Result<Vec<String>, SitemapError> {
    let start_time = Instant::now();
    info!(action = "start", component = "sitemap", url = url, "Fetching sitemap");

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SitemapError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.bytes()?;
    let urls = parse_sitemap(&body)?;

    info!(
        action = "complete",
        component = "sitemap",
        url = url,
        url_count = urls.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Sitemap loaded"
    );
    Ok(urls)
}

/// Extract page URLs from a `urlset` document in the sitemap 0.9 namespace.
///
/// `<loc>` text is returned as written (trimmed), without URL normalization.
/// Elements outside the sitemap namespace are ignored, so a document whose
/// root is in another namespace yields no URLs. Child-sitemap references in
/// an index are skipped, not followed.
pub fn parse_sitemap(body: &[u8]) -> Result<Vec<String>, SitemapError> {
    let mut urls = Vec::new();
    // (in sitemap namespace, local name) of each open element
    let mut path: Vec<(bool, String)> = Vec::new();
    let mut text = String::new();

    for event in EventReader::new(body) {
        match event.map_err(|e| SitemapError::Xml(e.to_string()))? {
            XmlEvent::StartElement { name, .. } => {
                let in_ns = name.namespace.as_deref() == Some(SITEMAP_NS);
                if path.is_empty() && !in_ns {
                    warn!(action = "parse", component = "sitemap", root = %name, "Root element is outside the sitemap namespace");
                }
                path.push((in_ns, name.local_name));
                text.clear();
            }
            XmlEvent::Characters(chunk) | XmlEvent::CData(chunk) => text.push_str(&chunk),
            XmlEvent::EndElement { .. } => {
                if is_loc_under(&path, "urlset", "url") {
                    let loc = text.trim();
                    if loc.is_empty() {
                        warn!(action = "parse", component = "sitemap", "Skipping empty <loc>");
                    } else {
                        urls.push(loc.to_string());
                    }
                } else if is_loc_under(&path, "sitemapindex", "sitemap") {
                    warn!(action = "parse", component = "sitemap", loc = text.trim(), "Nested sitemaps are not followed");
                }
                path.pop();
                text.clear();
            }
            _ => {}
        }
    }

    Ok(urls)
}

fn is_loc_under(path: &[(bool, String)], root: &str, parent: &str) -> bool {
    match path {
        [(true, r), (true, p), (true, l)] => r == root && p == parent && l == "loc",
        _ => false,
    }
}

/// Search Console property for a page URL: `scheme://host[:port]/`.
pub fn site_root(page_url: &str) -> Result<String, SitemapError> {
    let url = Url::parse(page_url).map_err(|_| SitemapError::InvalidUrl(page_url.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| SitemapError::InvalidUrl(page_url.to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
        None => format!("{}://{}/", url.scheme(), host),
    })
}
