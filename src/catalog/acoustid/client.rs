//! AcoustID HTTP client.
//!
//! The `meta` parameter joins its flags with a literal `+`. The service
//! ignores `%2B`, so the lookup URL is built by hand instead of through
//! `reqwest`'s query encoding.

use super::{adapter, dto};
use crate::catalog::domain::{AudioFingerprint, CatalogError, FingerprintMatch};

const LOOKUP_URL: &str = "https://api.acoustid.org/v2/lookup";
const META: &str = "recordings+releasegroups+compress";

/// AcoustID lookup client
pub struct AcoustIdClient {
    api_key: String,
    http: reqwest::Client,
    lookup_url: String,
}

impl AcoustIdClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_lookup_url(api_key, LOOKUP_URL)
    }

    /// Client against another lookup endpoint (mirrors, test servers)
    pub fn with_lookup_url(api_key: impl Into<String>, lookup_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http,
            lookup_url: lookup_url.into(),
        }
    }

    /// Recordings matching the fingerprint, best first
    pub async fn lookup(&self, fingerprint: &AudioFingerprint) -> Result<Vec<FingerprintMatch>, CatalogError> {
        if self.api_key.is_empty() {
            return Err(CatalogError::Fingerprint("No AcoustID API key configured".to_string()));
        }

        let response = self
            .http
            .get(self.request_url(fingerprint))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(CatalogError::RateLimited);
        }
        // Error statuses still carry a JSON body with the reason
        let body: dto::LookupResponse = response.json().await.map_err(|e| {
            if status.is_success() {
                CatalogError::Parse(e.to_string())
            } else {
                CatalogError::Network(format!("HTTP {status}"))
            }
        })?;

        let matches = adapter::to_matches(body)?;
        tracing::debug!(
            duration = fingerprint.duration_secs,
            matches = matches.len(),
            "AcoustID lookup"
        );
        Ok(matches)
    }

    fn request_url(&self, fingerprint: &AudioFingerprint) -> String {
        format!(
            "{}?client={}&duration={}&fingerprint={}&meta={META}",
            self.lookup_url,
            urlencoding::encode(&self.api_key),
            fingerprint.duration_secs,
            urlencoding::encode(&fingerprint.fingerprint)
        )
    }
}
