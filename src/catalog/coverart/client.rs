//! Cover Art Archive HTTP client
//!
//! Lists album artwork from the Cover Art Archive.
//! No API key required, but please respect their rate limits.
//!
//! API: https://coverartarchive.org

use super::dto;
use crate::catalog::domain::{CatalogError, CoverImage};

/// Cover Art Archive client
pub struct CoverArtClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoverArtClient {
    /// Create a new client
    pub fn new() -> Self {
        Self::with_base_url("https://coverartarchive.org")
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// List cover images for a release group.
    ///
    /// A group without artwork is reported as an empty list, not an error.
    pub async fn release_group_images(
        &self,
        release_group_id: &str,
    ) -> Result<Vec<CoverImage>, CatalogError> {
        let url = format!("{}/release-group/{}", self.base_url, release_group_id);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            return Err(CatalogError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let listing = response
            .json::<dto::CoverArtResponse>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(to_cover_images(listing))
    }
}

impl Default for CoverArtClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Front covers first, then the rest in listing order
fn to_cover_images(listing: dto::CoverArtResponse) -> Vec<CoverImage> {
    let mut images: Vec<CoverImage> = listing
        .images
        .into_iter()
        .map(|img| CoverImage {
            thumbnail: img.thumbnails.large.or(img.thumbnails.small),
            front: img.front,
            url: img.image,
        })
        .collect();
    images.sort_by_key(|img| !img.front);
    images
}
