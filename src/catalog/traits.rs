//! Trait definitions for external catalog and fingerprint clients.
//!
//! These traits are the seams of the resolution pipeline. Production code
//! uses the MusicBrainz/AcoustID implementations, while tests substitute
//! the in-memory mocks below.

use std::path::Path;

use async_trait::async_trait;

use super::domain::{
    CatalogError, CoverImage, FingerprintMatch, Recording, RecordingQuery, Release,
    ReleaseGroupDetail, ReleaseIncludes,
};

/// Remote catalog of recordings, releases and release groups.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search recordings by title, optionally constrained to artists.
    async fn search_recordings(
        &self,
        query: &RecordingQuery,
    ) -> Result<Vec<Recording>, CatalogError>;

    /// Search releases by album title and artists.
    async fn search_releases(
        &self,
        album: &str,
        artists: &[String],
        limit: u32,
    ) -> Result<Vec<Release>, CatalogError>;

    /// Fetch a release by ID.
    async fn get_release(
        &self,
        release_id: &str,
        includes: ReleaseIncludes,
    ) -> Result<Release, CatalogError>;

    /// Fetch a release group and its releases.
    async fn get_release_group(
        &self,
        release_group_id: &str,
    ) -> Result<ReleaseGroupDetail, CatalogError>;

    /// Fetch a recording with its releases.
    async fn get_recording(&self, recording_id: &str) -> Result<Recording, CatalogError>;

    /// List cover images for a release group.
    async fn release_group_cover_images(
        &self,
        release_group_id: &str,
    ) -> Result<Vec<CoverImage>, CatalogError>;
}

/// Acoustic fingerprint identification.
#[async_trait]
pub trait FingerprintApi: Send + Sync {
    /// Identify the audio at `path`. Unknown audio yields an empty list.
    async fn identify(&self, path: &Path) -> Result<Vec<FingerprintMatch>, CatalogError>;
}
