//! Catalog service - the production [`CatalogApi`]
//!
//! Combines the MusicBrainz client (metadata) with the Cover Art Archive
//! client (artwork listings) behind the single catalog seam the resolution
//! pipeline depends on.

use std::time::Duration;

use async_trait::async_trait;

use super::coverart::CoverArtClient;
use super::domain::{
    CatalogError, CoverImage, Recording, RecordingQuery, Release, ReleaseGroupDetail,
    ReleaseIncludes,
};
use super::musicbrainz::MusicBrainzClient;
use super::traits::CatalogApi;

/// Endpoints and politeness settings for the catalog service
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub musicbrainz_url: String,
    pub coverart_url: String,
    /// Minimum interval between MusicBrainz requests
    pub min_interval: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            musicbrainz_url: "https://musicbrainz.org/ws/2".to_string(),
            coverart_url: "https://coverartarchive.org".to_string(),
            min_interval: Duration::from_millis(1100),
        }
    }
}

/// MusicBrainz + Cover Art Archive
pub struct CatalogService {
    musicbrainz: MusicBrainzClient,
    coverart: CoverArtClient,
}

impl CatalogService {
    pub fn new(settings: &CatalogSettings) -> Self {
        Self {
            musicbrainz: MusicBrainzClient::with_base_url(&settings.musicbrainz_url)
                .with_min_interval(settings.min_interval),
            coverart: CoverArtClient::with_base_url(&settings.coverart_url),
        }
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new(&CatalogSettings::default())
    }
}

#[async_trait]
impl CatalogApi for CatalogService {
    async fn search_recordings(
        &self,
        query: &RecordingQuery,
    ) -> Result<Vec<Recording>, CatalogError> {
        self.musicbrainz.search_recordings(query).await
    }

    async fn search_releases(
        &self,
        album: &str,
        artists: &[String],
        limit: u32,
    ) -> Result<Vec<Release>, CatalogError> {
        self.musicbrainz.search_releases(album, artists, limit).await
    }

    async fn get_release(
        &self,
        release_id: &str,
        includes: ReleaseIncludes,
    ) -> Result<Release, CatalogError> {
        self.musicbrainz.get_release(release_id, includes).await
    }

    async fn get_release_group(
        &self,
        release_group_id: &str,
    ) -> Result<ReleaseGroupDetail, CatalogError> {
        self.musicbrainz.get_release_group(release_group_id).await
    }

    async fn get_recording(&self, recording_id: &str) -> Result<Recording, CatalogError> {
        self.musicbrainz.get_recording(recording_id).await
    }

    async fn release_group_cover_images(
        &self,
        release_group_id: &str,
    ) -> Result<Vec<CoverImage>, CatalogError> {
        self.coverart.release_group_images(release_group_id).await
    }
}
