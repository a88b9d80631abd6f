//! The caller's side of a resolution batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::catalog::CoverImage;
use crate::config::PreferencesConfig;
use crate::model::{AutoTagState, TagFields, TrackLink};

/// Collaborator that owns one user-initiated batch.
///
/// Created before the batch starts and dropped after it completes or is
/// canceled; the pipeline never outlives it.
pub trait SearchManager: Send + Sync {
    /// One-way cancellation token of the batch
    fn cancellation(&self) -> &CancellationToken;

    fn is_canceled(&self) -> bool {
        self.cancellation().is_cancelled()
    }

    fn notify_progress(&self, done: usize, total: usize);

    fn fields_to_update(&self) -> TagFields;

    fn avoid_compilations(&self) -> bool;

    fn prefer_albums(&self) -> bool;

    fn set_track_links(&self, path: &Path, links: Vec<TrackLink>);

    fn track_links(&self, path: &Path) -> Vec<TrackLink>;

    /// A track entered a new state
    fn notify_state(&self, _path: &Path, _state: AutoTagState) {}

    /// Cover images were listed for a located track
    fn artwork_ready(&self, _path: &Path, _images: &[CoverImage]) {}
}

/// In-memory [`SearchManager`] that records everything it is told
pub struct BatchManager {
    token: CancellationToken,
    fields: TagFields,
    avoid_compilations: bool,
    prefer_albums: bool,
    done: AtomicUsize,
    total: AtomicUsize,
    links: Mutex<HashMap<PathBuf, Vec<TrackLink>>>,
    states: Mutex<Vec<(PathBuf, AutoTagState)>>,
    artwork: Mutex<HashMap<PathBuf, Vec<CoverImage>>>,
}

impl BatchManager {
    pub fn new(prefs: &PreferencesConfig) -> Self {
        Self {
            token: CancellationToken::new(),
            fields: prefs.fields,
            avoid_compilations: prefs.avoid_compilations,
            prefer_albums: prefs.prefer_albums,
            done: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            links: Mutex::new(HashMap::new()),
            states: Mutex::new(Vec::new()),
            artwork: Mutex::new(HashMap::new()),
        }
    }

    /// Use an externally owned token (e.g. one canceled on Ctrl-C)
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `(done, total)` as last reported
    pub fn progress(&self) -> (usize, usize) {
        (self.done.load(Ordering::SeqCst), self.total.load(Ordering::SeqCst))
    }

    /// States a track went through, in order
    pub fn states_of(&self, path: &Path) -> Vec<AutoTagState> {
        self.states
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn artwork_for(&self, path: &Path) -> Vec<CoverImage> {
        self.artwork.lock().get(path).cloned().unwrap_or_default()
    }
}

impl SearchManager for BatchManager {
    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    fn notify_progress(&self, done: usize, total: usize) {
        self.done.store(done, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        tracing::debug!(done, total, "Progress");
    }

    fn fields_to_update(&self) -> TagFields {
        self.fields
    }

    fn avoid_compilations(&self) -> bool {
        self.avoid_compilations
    }

    fn prefer_albums(&self) -> bool {
        self.prefer_albums
    }

    fn set_track_links(&self, path: &Path, links: Vec<TrackLink>) {
        self.links.lock().insert(path.to_path_buf(), links);
    }

    fn track_links(&self, path: &Path) -> Vec<TrackLink> {
        self.links.lock().get(path).cloned().unwrap_or_default()
    }

    fn notify_state(&self, path: &Path, state: AutoTagState) {
        self.states.lock().push((path.to_path_buf(), state));
    }

    fn artwork_ready(&self, path: &Path, images: &[CoverImage]) {
        self.artwork.lock().insert(path.to_path_buf(), images.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkInfo;

    #[test]
    fn test_links_are_stored_per_path() {
        let manager = BatchManager::new(&PreferencesConfig::default());
        let path = Path::new("/music/a.flac");

        manager.set_track_links(path, vec![TrackLink::new(LinkInfo::Release, "rel")]);

        assert_eq!(manager.track_links(path).len(), 1);
        assert!(manager.track_links(Path::new("/music/b.flac")).is_empty());
    }

    #[test]
    fn test_shared_token_cancels() {
        let token = CancellationToken::new();
        let manager = BatchManager::new(&PreferencesConfig::default()).with_token(token.clone());
        assert!(!manager.is_canceled());

        token.cancel();
        assert!(manager.is_canceled());
    }

    #[test]
    fn test_states_recorded_in_order() {
        let manager = BatchManager::new(&PreferencesConfig::default());
        let path = Path::new("/music/a.flac");

        manager.notify_state(path, AutoTagState::Processing);
        manager.notify_state(Path::new("/other"), AutoTagState::Processing);
        manager.notify_state(path, AutoTagState::Located);

        assert_eq!(
            manager.states_of(path),
            vec![AutoTagState::Processing, AutoTagState::Located]
        );
    }
}
