//! Per-batch cache of fetched releases, release groups and cover listings.
//!
//! Concurrent tracks of one batch often need the same release (album
//! tracks) or release group (fingerprint date tie-breaks, artwork). Each entry is a
//! [`OnceCell`], so concurrent requests for one id share a single fetch.
//! Failed fetches are not cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::ResolveError;
use crate::catalog::{CoverImage, ReleaseGroupDetail};
use crate::model::ResolvedRelease;

type Cells<T> = Mutex<HashMap<String, Arc<OnceCell<T>>>>;

/// Catalog cache for one batch
#[derive(Default)]
pub struct BatchCache {
    releases: Cells<ResolvedRelease>,
    release_groups: Cells<ReleaseGroupDetail>,
    covers: Cells<Vec<CoverImage>>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached release (with tracklist and relations), fetching it once
    pub async fn release<F, Fut>(&self, id: &str, fetch: F) -> Result<ResolvedRelease, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedRelease, ResolveError>>,
    {
        cached(&self.releases, id, fetch).await
    }

    /// Cached release group, fetching it once
    pub async fn release_group<F, Fut>(&self, id: &str, fetch: F) -> Result<ReleaseGroupDetail, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ReleaseGroupDetail, ResolveError>>,
    {
        cached(&self.release_groups, id, fetch).await
    }

    /// Cached cover listing of a release group, fetching it once
    pub async fn covers<F, Fut>(&self, release_group_id: &str, fetch: F) -> Result<Vec<CoverImage>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CoverImage>, ResolveError>>,
    {
        cached(&self.covers, release_group_id, fetch).await
    }

    /// Number of releases fetched so far
    pub fn release_count(&self) -> usize {
        self.releases
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

async fn cached<T, F, Fut>(cells: &Cells<T>, key: &str, fetch: F) -> Result<T, ResolveError>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResolveError>>,
{
    let cell = {
        let mut cells = cells.lock();
        cells.entry(key.to_string()).or_default().clone()
    };
    cell.get_or_try_init(fetch).await.cloned()
}
