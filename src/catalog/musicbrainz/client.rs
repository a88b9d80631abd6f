//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! Requests are serialized through a shared gate that enforces the interval.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::catalog::domain::{
    CatalogError, Recording, RecordingQuery, Release, ReleaseGroupDetail, ReleaseIncludes,
    StatusFilter,
};

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

/// User agent string - MusicBrainz requires this
const USER_AGENT: &str = concat!(
    "TrackResolver/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/track-resolver)"
);

const RECORDING_INCLUDES: &str = "artist-credits+releases+release-groups+media";
const RELATION_INCLUDES: &str =
    "recording-level-rels+work-rels+work-level-rels+artist-rels+label-rels";

impl MusicBrainzClient {
    /// Create a new client
    pub fn new() -> Self {
        Self::with_base_url("https://musicbrainz.org/ws/2")
    }

    /// Create a client against a custom base URL (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into(),
            min_interval: Duration::from_millis(1100),
            last_request: Mutex::new(None),
        }
    }

    /// Override the politeness interval (local mirrors have no rate limit)
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Search recordings by title with optional artist and album constraints
    pub async fn search_recordings(
        &self,
        query: &RecordingQuery,
    ) -> Result<Vec<Recording>, CatalogError> {
        let url = format!(
            "{}/recording?fmt=json&limit={}&query={}",
            self.base_url,
            query.limit.clamp(1, 100),
            urlencoding::encode(&recording_query(query))
        );
        let response: dto::RecordingSearchResponse = self.get_json(&url).await?;
        tracing::debug!(
            title = %query.title,
            hits = response.recordings.len(),
            "MusicBrainz recording search"
        );
        Ok(response
            .recordings
            .into_iter()
            .map(adapter::to_recording)
            .collect())
    }

    /// Search releases by album title and artists
    pub async fn search_releases(
        &self,
        album: &str,
        artists: &[String],
        limit: u32,
    ) -> Result<Vec<Release>, CatalogError> {
        let mut query = format!("+release:\"{}\"", escape_lucene(album));
        if let Some(clause) = artist_clause(artists) {
            query.push_str(&format!(" +{clause}"));
        }
        let url = format!(
            "{}/release?fmt=json&limit={}&query={}",
            self.base_url,
            limit.clamp(1, 100),
            urlencoding::encode(&query)
        );
        let response: dto::ReleaseSearchResponse = self.get_json(&url).await?;
        Ok(response
            .releases
            .into_iter()
            .map(adapter::to_release)
            .collect())
    }

    /// Look up a release by ID
    pub async fn get_release(
        &self,
        release_id: &str,
        includes: ReleaseIncludes,
    ) -> Result<Release, CatalogError> {
        let mut inc = String::from("artist-credits+release-groups+labels");
        if includes.tracklist {
            inc.push_str("+recordings");
        }
        if includes.relations {
            inc.push('+');
            inc.push_str(RELATION_INCLUDES);
        }
        let url = format!(
            "{}/release/{}?fmt=json&inc={}",
            self.base_url, release_id, inc
        );
        let release: dto::Release = self.get_json(&url).await?;
        Ok(adapter::to_release(release))
    }

    /// Look up a release group with its releases
    pub async fn get_release_group(
        &self,
        release_group_id: &str,
    ) -> Result<ReleaseGroupDetail, CatalogError> {
        let url = format!(
            "{}/release-group/{}?fmt=json&inc=releases+artist-credits",
            self.base_url, release_group_id
        );
        let group: dto::ReleaseGroup = self.get_json(&url).await?;
        Ok(adapter::to_release_group_detail(group))
    }

    /// Look up a recording by MusicBrainz ID
    pub async fn get_recording(&self, recording_id: &str) -> Result<Recording, CatalogError> {
        let url = format!(
            "{}/recording/{}?fmt=json&inc={}",
            self.base_url, recording_id, RECORDING_INCLUDES
        );
        let recording: dto::Recording = self.get_json(&url).await?;
        Ok(adapter::to_recording(recording))
    }

    /// Wait until the rate limit allows another request
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send the HTTP request and parse the response
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        self.wait_turn().await;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(CatalogError::api(i32::from(status.as_u16()), error.error));
            }
            return Err(CatalogError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

impl Default for MusicBrainzClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the Lucene query for a recording search.
///
/// Title and artist are required clauses, the album hint only boosts.
fn recording_query(query: &RecordingQuery) -> String {
    let mut parts = vec![format!("+recording:\"{}\"", escape_lucene(&query.title))];
    if let Some(clause) = artist_clause(&query.artists) {
        parts.push(format!("+{clause}"));
    }
    if let Some(album) = query.album_hint.as_deref().filter(|a| !a.is_empty()) {
        parts.push(format!("release:\"{}\"", escape_lucene(album)));
    }
    if query.status == StatusFilter::Official {
        parts.push("+(status:official status:promotion status:bootleg)".to_string());
    }
    parts.join(" ")
}

fn artist_clause(artists: &[String]) -> Option<String> {
    let terms: Vec<String> = artists
        .iter()
        .filter(|a| !a.trim().is_empty())
        .map(|a| format!("artist:\"{}\"", escape_lucene(a)))
        .collect();
    match terms.len() {
        0 => None,
        1 => terms.into_iter().next(),
        _ => Some(format!("({})", terms.join(" "))),
    }
}

/// Escape characters that are special inside a quoted Lucene phrase
fn escape_lucene(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
