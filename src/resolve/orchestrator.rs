//! Batch orchestration: strategies, state transitions, cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use serde::Serialize;

use super::ResolveError;
use super::album_batch::AlbumBatch;
use super::cache::BatchCache;
use super::existing_link::ExistingLink;
use super::fingerprint_search::FingerprintSearch;
use super::manager::SearchManager;
use super::session::Session;
use super::strategy::ResolutionStrategy;
use super::title_search::TitleSearch;
use crate::catalog::{CatalogApi, FingerprintApi};
use crate::config::{Config, MatchingConfig};
use crate::matching::Preferences;
use crate::model::{AutoTagState, LocatedTrack, Track, TrackLinks};

/// Final outcome of one track in a batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// Located; `track` is the input with the selected fields overwritten
    Located { track: Track, located: LocatedTrack },
    Failed {
        path: PathBuf,
        #[serde(serialize_with = "error_string")]
        error: ResolveError,
    },
    /// The batch was canceled before the track was located
    Canceled { path: PathBuf },
}

fn error_string<S: serde::Serializer>(error: &ResolveError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&error.to_string())
}

impl TrackOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Located { track, .. } => &track.path,
            Self::Failed { path, .. } | Self::Canceled { path } => path,
        }
    }

    pub fn located(&self) -> Option<&LocatedTrack> {
        match self {
            Self::Located { located, .. } => Some(located),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

/// Drives one track through its states, reporting each to the manager.
///
/// Nothing is reported once the batch is canceled.
struct StateTracker<'m> {
    path: PathBuf,
    state: AutoTagState,
    manager: &'m dyn SearchManager,
}

impl<'m> StateTracker<'m> {
    fn new(manager: &'m dyn SearchManager, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: AutoTagState::InProcess,
            manager,
        }
    }

    fn advance(&mut self, next: AutoTagState) -> Result<(), ResolveError> {
        if self.manager.is_canceled() {
            return Err(ResolveError::Canceled);
        }
        if self.state == next {
            return Ok(());
        }
        if !self.state.can_transition_to(next) {
            tracing::debug!(
                path = %self.path.display(),
                from = self.state.as_str(),
                to = next.as_str(),
                "Ignoring invalid state transition"
            );
            return Ok(());
        }
        self.state = next;
        self.manager.notify_state(&self.path, next);
        Ok(())
    }
}

/// Finished-track counter reported to the manager
struct Progress<'m> {
    manager: &'m dyn SearchManager,
    done: AtomicUsize,
    total: usize,
}

impl<'m> Progress<'m> {
    fn start(manager: &'m dyn SearchManager, total: usize) -> Self {
        manager.notify_progress(0, total);
        Self {
            manager,
            done: AtomicUsize::new(0),
            total,
        }
    }

    fn track_done(&self) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        self.manager.notify_progress(done, self.total);
    }
}

/// Resolves batches of tracks against the catalog.
pub struct Resolver {
    catalog: Arc<dyn CatalogApi>,
    fingerprinter: Option<Arc<dyn FingerprintApi>>,
    config: MatchingConfig,
    preferred_countries: Vec<String>,
    fetch_artwork: bool,
    existing_link: ExistingLink,
    title_search: TitleSearch,
    fingerprint_search: FingerprintSearch,
    album_batch: AlbumBatch,
}

impl Resolver {
    pub fn new(catalog: Arc<dyn CatalogApi>, fingerprinter: Option<Arc<dyn FingerprintApi>>, config: &Config) -> Self {
        let title_search = TitleSearch;
        Self {
            catalog,
            fingerprinter,
            config: config.matching.clone(),
            preferred_countries: config.preferences.preferred_countries.clone(),
            fetch_artwork: config.preferences.fetch_artwork,
            existing_link: ExistingLink,
            title_search,
            fingerprint_search: FingerprintSearch::new(title_search),
            album_batch: AlbumBatch,
        }
    }

    fn session<'a>(&'a self, cache: &'a BatchCache, manager: &dyn SearchManager) -> Session<'a> {
        Session {
            catalog: self.catalog.as_ref(),
            fingerprinter: self.fingerprinter.as_deref(),
            cache,
            config: &self.config,
            prefs: Preferences {
                prefer_albums: manager.prefer_albums(),
                avoid_compilations: manager.avoid_compilations(),
                preferred_countries: self.preferred_countries.clone(),
            },
            token: manager.cancellation().clone(),
        }
    }

    /// Resolve tracks independently and concurrently.
    ///
    /// Outcomes follow the input order.
    pub async fn resolve_tracks(&self, tracks: Vec<Track>, manager: &dyn SearchManager) -> Vec<TrackOutcome> {
        let cache = BatchCache::new();
        let session = self.session(&cache, manager);
        let progress = Progress::start(manager, tracks.len());
        self.resolve_each(&session, manager, tracks, &progress).await
    }

    /// Resolve tracks of one album together.
    ///
    /// When no release pairs with every track, each track is resolved on
    /// its own instead.
    pub async fn resolve_album(&self, tracks: Vec<Track>, manager: &dyn SearchManager) -> Vec<TrackOutcome> {
        self.resolve_albums(vec![tracks], manager).await
    }

    /// Resolve several albums one after another as a single batch.
    ///
    /// Lookups are cached across albums and progress counts every track of
    /// the batch. Outcomes follow the album and track order.
    pub async fn resolve_albums(&self, albums: Vec<Vec<Track>>, manager: &dyn SearchManager) -> Vec<TrackOutcome> {
        let cache = BatchCache::new();
        let session = self.session(&cache, manager);
        let progress = Progress::start(manager, albums.iter().map(Vec::len).sum());

        let mut outcomes = Vec::with_capacity(progress.total);
        for tracks in albums {
            outcomes.extend(self.resolve_one_album(&session, manager, tracks, &progress).await);
        }
        outcomes
    }

    async fn resolve_one_album(
        &self,
        session: &Session<'_>,
        manager: &dyn SearchManager,
        tracks: Vec<Track>,
        progress: &Progress<'_>,
    ) -> Vec<TrackOutcome> {
        let album = tokio::select! {
            biased;
            _ = session.token.cancelled() => Err(ResolveError::Canceled),
            result = self.album_batch.resolve_album(session, &tracks) => result,
        };

        match album {
            Ok(located) => {
                let finishing = tracks.into_iter().zip(located).map(|(track, located)| async move {
                    let path = track.path.clone();
                    let mut state = StateTracker::new(manager, &path);
                    let outcome = match state.advance(AutoTagState::Processing) {
                        Ok(()) => self.finish(session, &mut state, track, located).await,
                        Err(e) => Err(e),
                    };
                    progress.track_done();
                    into_outcome(outcome, path)
                });
                join_all(finishing).await
            }
            Err(ResolveError::Canceled) => tracks
                .into_iter()
                .map(|t| {
                    progress.track_done();
                    TrackOutcome::Canceled { path: t.path }
                })
                .collect(),
            Err(e) => {
                tracing::info!(error = %e, "Album not located as a whole, resolving tracks one by one");
                self.resolve_each(session, manager, tracks, progress).await
            }
        }
    }

    async fn resolve_each(
        &self,
        session: &Session<'_>,
        manager: &dyn SearchManager,
        tracks: Vec<Track>,
        progress: &Progress<'_>,
    ) -> Vec<TrackOutcome> {
        let pipelines = tracks.into_iter().map(|track| async move {
            let path = track.path.clone();
            let outcome = self.resolve_one(session, manager, track).await;
            progress.track_done();
            into_outcome(outcome, path)
        });
        join_all(pipelines).await
    }

    async fn resolve_one(
        &self,
        session: &Session<'_>,
        manager: &dyn SearchManager,
        track: Track,
    ) -> Result<TrackOutcome, ResolveError> {
        let stored = TrackLinks::from_links(&manager.track_links(&track.path));
        let track = Track {
            links: track.links.clone().merge(stored),
            ..track
        };
        let mut state = StateTracker::new(manager, &track.path);

        let located = tokio::select! {
            biased;
            _ = session.token.cancelled() => Err(ResolveError::Canceled),
            result = self.locate(session, &mut state, &track) => result,
        };
        match located {
            Ok(located) => self.finish(session, &mut state, track, located).await,
            Err(ResolveError::Canceled) => Err(ResolveError::Canceled),
            Err(error) => {
                state.advance(AutoTagState::Failed)?;
                tracing::info!(path = %track.path.display(), error = %error, "Track not located");
                Ok(TrackOutcome::Failed {
                    path: track.path,
                    error,
                })
            }
        }
    }

    /// Existing links first, then title search with fingerprint escalation.
    ///
    /// Tracks without a usable artist tag are fingerprinted right away.
    async fn locate(
        &self,
        session: &Session<'_>,
        state: &mut StateTracker<'_>,
        track: &Track,
    ) -> Result<LocatedTrack, ResolveError> {
        if !track.links.is_empty() {
            state.advance(AutoTagState::Processing)?;
            match self.existing_link.resolve(session, track).await {
                Ok(located) => return Ok(located),
                Err(e) if e.is_recoverable() => {}
                Err(e) => return Err(e),
            }
        }

        let can_fingerprint = session.fingerprinter.is_some();
        let tagged = track.title.is_some() && track.probe_artist().is_some();
        if !tagged && can_fingerprint {
            return self.fingerprint(session, state, track).await;
        }

        state.advance(AutoTagState::Processing)?;
        match self.title_search.resolve(session, track).await {
            Ok(located) => Ok(located),
            Err(e) if e.is_recoverable() && can_fingerprint => {
                tracing::debug!(path = %track.path.display(), error = %e, "Escalating to fingerprint");
                self.fingerprint(session, state, track).await
            }
            Err(e) => Err(e),
        }
    }

    async fn fingerprint(
        &self,
        session: &Session<'_>,
        state: &mut StateTracker<'_>,
        track: &Track,
    ) -> Result<LocatedTrack, ResolveError> {
        state.advance(AutoTagState::Fingerprinting)?;
        let matches = self.fingerprint_search.identify(session, track).await?;
        state.advance(AutoTagState::Processing)?;
        self.fingerprint_search
            .resolve_matches(session, track, matches)
            .await
    }

    /// Report the located track, store its links and list artwork.
    ///
    /// Canceled only when the batch stops before `Located` is reported.
    /// Later cancellation skips the artwork but keeps the located track.
    async fn finish(
        &self,
        session: &Session<'_>,
        state: &mut StateTracker<'_>,
        track: Track,
        located: LocatedTrack,
    ) -> Result<TrackOutcome, ResolveError> {
        state.advance(AutoTagState::Located)?;
        tracing::info!(
            path = %track.path.display(),
            title = %located.title,
            release = %located.release_id,
            source = ?located.source,
            score = located.score,
            "Track located"
        );
        let manager = state.manager;
        manager.set_track_links(&track.path, located.links().to_links());
        let updated = located.apply_to(&track, manager.fields_to_update());

        if self.fetch_artwork
            && let Some(group_id) = &located.release_group_id
            && state.advance(AutoTagState::LoadingArtwork).is_ok()
        {
            let images = tokio::select! {
                biased;
                _ = session.token.cancelled() => Err(ResolveError::Canceled),
                result = session.cover_images(group_id) => result,
            };
            match images {
                Ok(images) => manager.artwork_ready(&track.path, &images),
                Err(ResolveError::Canceled) => {
                    tracing::debug!(path = %track.path.display(), "Batch canceled, skipping artwork")
                }
                Err(e) => tracing::warn!(group = %group_id, error = %e, "Cover art listing failed"),
            }
        }

        // Fails only when canceled; the track stays located
        let _ = state.advance(AutoTagState::Done);
        Ok(TrackOutcome::Located {
            track: updated,
            located,
        })
    }
}

fn into_outcome(result: Result<TrackOutcome, ResolveError>, path: PathBuf) -> TrackOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(ResolveError::Canceled) => TrackOutcome::Canceled { path },
        Err(error) => TrackOutcome::Failed { path, error },
    }
}
