//! Cancellation-guarded access to the catalog for one batch.

use std::future::Future;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::ResolveError;
use super::cache::BatchCache;
use crate::catalog::{
    CatalogApi, CatalogError, CoverImage, FingerprintApi, FingerprintMatch, Recording,
    RecordingQuery, Release, ReleaseGroupDetail, ReleaseIncludes,
};
use crate::config::MatchingConfig;
use crate::matching::Preferences;
use crate::model::ResolvedRelease;

/// Everything a strategy needs while resolving tracks of one batch.
///
/// Every service call checks the batch token before it is issued and again
/// when it returns, so nothing new starts once the batch is canceled.
pub struct Session<'a> {
    pub catalog: &'a dyn CatalogApi,
    pub fingerprinter: Option<&'a dyn FingerprintApi>,
    pub cache: &'a BatchCache,
    pub config: &'a MatchingConfig,
    pub prefs: Preferences,
    pub token: CancellationToken,
}

impl Session<'_> {
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail with [`ResolveError::Canceled`] once the batch is canceled
    pub fn check(&self) -> Result<(), ResolveError> {
        if self.is_canceled() {
            Err(ResolveError::Canceled)
        } else {
            Ok(())
        }
    }

    async fn guarded<T>(&self, call: impl Future<Output = Result<T, CatalogError>>) -> Result<T, ResolveError> {
        self.check()?;
        let result = call.await;
        self.check()?;
        result.map_err(ResolveError::from)
    }

    /// Search recordings, keeping `NotFound` apart from an empty result
    pub async fn search_recordings(&self, query: &RecordingQuery) -> Result<Vec<Recording>, ResolveError> {
        match self.guarded(self.catalog.search_recordings(query)).await {
            Err(ResolveError::NotFound) => Ok(Vec::new()),
            other => other,
        }
    }

    pub async fn search_releases(&self, album: &str, artists: &[String], limit: u32) -> Result<Vec<Release>, ResolveError> {
        match self.guarded(self.catalog.search_releases(album, artists, limit)).await {
            Err(ResolveError::NotFound) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Release with tracklist and relations, fetched once per batch
    pub async fn release(&self, release_id: &str) -> Result<ResolvedRelease, ResolveError> {
        self.cache
            .release(release_id, || async {
                let release = self
                    .guarded(self.catalog.get_release(release_id, ReleaseIncludes::FULL))
                    .await?;
                Ok(ResolvedRelease::from_release(release))
            })
            .await
    }

    /// Release group with its releases, fetched once per batch
    pub async fn release_group(&self, release_group_id: &str) -> Result<ReleaseGroupDetail, ResolveError> {
        self.cache
            .release_group(release_group_id, || {
                self.guarded(self.catalog.get_release_group(release_group_id))
            })
            .await
    }

    pub async fn recording(&self, recording_id: &str) -> Result<Recording, ResolveError> {
        self.guarded(self.catalog.get_recording(recording_id)).await
    }

    /// Cover images of a release group, listed once per batch
    pub async fn cover_images(&self, release_group_id: &str) -> Result<Vec<CoverImage>, ResolveError> {
        self.cache
            .covers(release_group_id, || {
                self.guarded(self.catalog.release_group_cover_images(release_group_id))
            })
            .await
    }

    /// Fingerprint lookup; no matches without a fingerprinter
    pub async fn identify(&self, path: &Path) -> Result<Vec<FingerprintMatch>, ResolveError> {
        match self.fingerprinter {
            Some(fingerprinter) => match self.guarded(fingerprinter.identify(path)).await {
                Err(ResolveError::NotFound) => Ok(Vec::new()),
                other => other,
            },
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::MockCatalog;
    use crate::test_utils::album_release;

    fn session<'a>(catalog: &'a MockCatalog, cache: &'a BatchCache, config: &'a MatchingConfig) -> Session<'a> {
        Session {
            catalog,
            fingerprinter: None,
            cache,
            config,
            prefs: Preferences::default(),
            token: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_release_is_fetched_once() {
        let catalog = MockCatalog::new().with_release(album_release("rel", "Numbers", "2001", &[("rec-1", "One", 1_000)]));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);

        let first = session.release("rel").await.unwrap();
        let second = session.release("rel").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.count_calls("release:"), 1);
    }

    #[tokio::test]
    async fn test_no_calls_after_cancel() {
        let catalog = MockCatalog::new();
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);

        session.token.cancel();
        let result = session.recording("rec").await;

        assert!(matches!(result, Err(ResolveError::Canceled)));
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_call_discards_result() {
        let token = CancellationToken::new();
        let mut catalog = MockCatalog::new().with_release(album_release("rel", "Numbers", "2001", &[]));
        catalog.cancel_after = Some((1, token.clone()));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = Session {
            token,
            ..session(&catalog, &cache, &config)
        };

        let result = session.release("rel").await;

        assert!(matches!(result, Err(ResolveError::Canceled)));
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_not_found_is_empty() {
        let catalog = MockCatalog::new().with_error(CatalogError::NotFound);
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);

        let found = session.search_recordings(&RecordingQuery::default()).await.unwrap();
        assert!(found.is_empty());
    }
}
