use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration as StdDuration;
use tracing::{debug, info};

use crate::credentials::ServiceAccountKey;
use crate::metrics::{MetricsError, SearchAnalytics, SearchAnalyticsRequest, SearchAnalyticsResponse};

pub const API_BASE: &str = "https://www.googleapis.com/webmasters/v3";
pub const SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(60);
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Search Console API client authenticated as a service account.
///
/// Single-threaded by construction: the cached access token lives in a
/// `RefCell` and is refreshed shortly before it expires.
pub struct SearchConsoleClient {
    client: reqwest::blocking::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    api_base: String,
    token: RefCell<Option<AccessToken>>,
}

impl SearchConsoleClient {
    /// Build the client and perform the first token exchange, so bad
    /// credentials fail here rather than on the first page.
    pub fn connect(key: ServiceAccountKey) -> Result<Self, MetricsError> {
        Self::connect_to(key, API_BASE)
    }

    pub fn connect_to(key: ServiceAccountKey, api_base: &str) -> Result<Self, MetricsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| MetricsError::Auth(format!("unusable private key: {e}")))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let service = Self {
            client,
            key,
            encoding_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: RefCell::new(None),
        };
        service.access_token()?;
        info!(action = "connect", component = "search_console", client_email = %service.key.client_email, "Search Console client authenticated");
        Ok(service)
    }

    fn access_token(&self) -> Result<String, MetricsError> {
        let now = Utc::now();
        if let Some(token) = self.token.borrow().as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange_token(now)?;
        let value = fresh.value.clone();
        *self.token.borrow_mut() = Some(fresh);
        Ok(value)
    }

    fn exchange_token(&self, now: DateTime<Utc>) -> Result<AccessToken, MetricsError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| MetricsError::Auth(format!("failed to sign assertion: {e}")))?;

        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(MetricsError::Auth(format!(
                "token exchange failed (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&resp.text()?)?;
        debug!(action = "refresh", component = "search_console", expires_in = token.expires_in, "Access token issued");
        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

/// Percent-encode a property (`https://ex.com/` or `sc-domain:ex.com`) for a path segment.
fn encode_site(site_url: &str) -> String {
    url::form_urlencoded::byte_serialize(site_url.as_bytes()).collect()
}

impl SearchAnalytics for SearchConsoleClient {
    fn query(
        &self,
        site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> Result<SearchAnalyticsResponse, MetricsError> {
        let token = self.access_token()?;
        let endpoint = format!(
            "{}/sites/{}/searchAnalytics/query",
            self.api_base,
            encode_site(site_url)
        );

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .json(request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(MetricsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&resp.text()?)?)
    }
}
