//! Whole-album resolution by tracklist pairing.

use std::collections::HashMap;

use super::ResolveError;
use super::assemble::assemble;
use super::session::Session;
use crate::matching::pairing::{implied_year, rank_releases};
use crate::matching::similarity::{string_similarity, strip_brackets};
use crate::matching::{AlbumSlot, Probe, build_slots, pair_release, score_pairing, split_artists};
use crate::model::{LocatedTrack, ResolutionSource, ResolvedRelease, Track};

/// Album-batch strategy.
///
/// Searches releases by album name and artist, then pairs the local tracks
/// against each candidate tracklist in turn. Only a release that pairs with
/// every local track is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlbumBatch;

impl AlbumBatch {
    /// Locate every track of one album; results follow the input order.
    pub async fn resolve_album(&self, session: &Session<'_>, tracks: &[Track]) -> Result<Vec<LocatedTrack>, ResolveError> {
        let probes: Vec<Probe> = tracks
            .iter()
            .map(Probe::from_track)
            .collect::<Option<_>>()
            .ok_or(ResolveError::NotFound)?;
        let album = common_album(tracks).ok_or(ResolveError::NotFound)?;
        let artists: Vec<String> = tracks
            .iter()
            .find_map(|t| t.album_artist.as_deref().or(t.artist.as_deref()))
            .map(split_artists)
            .unwrap_or_default();

        let mut releases = session
            .search_releases(&album, &artists, session.config.search_limit)
            .await?;
        rank_releases(&mut releases, &album, tracks.len());
        releases.truncate(session.config.album_release_candidates);

        let slots = build_slots(&probes);
        let years: Vec<u32> = tracks.iter().filter_map(|t| t.year).collect();
        let tag_year = implied_year(&years);

        let mut best: Option<(u32, ResolvedRelease, HashMap<usize, usize>)> = None;
        for candidate in &releases {
            let release = match session.release(&candidate.id).await {
                Ok(release) => release,
                Err(ResolveError::Canceled) => return Err(ResolveError::Canceled),
                Err(e) => {
                    tracing::warn!(release = %candidate.id, error = %e, "Skipping release");
                    continue;
                }
            };
            let pairing = pair_release(&slots, &release, session.config);
            if !pairing.is_complete(&slots) {
                tracing::debug!(
                    release = %release.id,
                    paired = pairing.pairs.len(),
                    slots = slots.len(),
                    "Release does not cover every track"
                );
                continue;
            }
            let score = score_pairing(&slots, &pairing, &release, tag_year);
            tracing::debug!(release = %release.id, score, "Release accepted");
            if best.as_ref().is_none_or(|(top, _, _)| score > *top) {
                best = Some((score, release, pairing.pairs));
            }
        }

        let (_, release, pairs) = best.ok_or(ResolveError::NotFound)?;
        tracing::info!(album = %album, release = %release.id, tracks = tracks.len(), "Album located");
        locate_all(tracks, &slots, &release, &pairs)
    }
}

/// Most common album tag among the tracks
fn common_album(tracks: &[Track]) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for album in tracks.iter().filter_map(|t| t.album.as_deref()).filter(|a| !a.trim().is_empty()) {
        match counts.iter_mut().find(|(a, _)| a == album) {
            Some((_, n)) => *n += 1,
            None => counts.push((album.to_string(), 1)),
        }
    }
    // Earliest-seen album wins ties
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(a, _)| a)
}

fn locate_all(
    tracks: &[Track],
    slots: &[AlbumSlot],
    release: &ResolvedRelease,
    pairs: &HashMap<usize, usize>,
) -> Result<Vec<LocatedTrack>, ResolveError> {
    let release_tracks: Vec<_> = release.tracks().collect();
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let slot = slots
                .iter()
                .position(|s| s.members.contains(&index))
                .ok_or(ResolveError::NotFound)?;
            let found = pairs
                .get(&slot)
                .and_then(|&i| release_tracks.get(i).copied())
                .ok_or(ResolveError::NotFound)?;
            let title = &slots[slot].probe.title;
            let agreement = string_similarity(title, &found.title)
                .max(string_similarity(&strip_brackets(title), &strip_brackets(&found.title)));
            let score = (agreement * 100.0).round() as u8;
            assemble(&track.path, release, found, ResolutionSource::AlbumBatch, score).ok_or(ResolveError::NotFound)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::MockCatalog;
    use crate::config::MatchingConfig;
    use crate::matching::Preferences;
    use crate::resolve::cache::BatchCache;
    use crate::test_utils::{album_release, mock_track};
    use tokio_util::sync::CancellationToken;

    const TITLES: [&str; 10] = [
        "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    ];

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

    fn length(i: usize) -> u64 {
        120_000 + i as u64 * 15_000
    }

    fn local_album() -> Vec<Track> {
        TITLES
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let mut track = mock_track(&format!("/m/numbers/{:02}.flac", i + 1), title, "Artist X", length(i) + 400)
                    .with_album("Numbers")
                    .with_number(Some(1), i as u32 + 1);
                track.year = Some(2001);
                track
            })
            .collect()
    }

    fn release_with(id: &str, date: &str, count: usize) -> crate::catalog::Release {
        let ids: Vec<String> = (0..count).map(|i| format!("{id}-rec-{}", i + 1)).collect();
        let tracks: Vec<(&str, &str, u64)> = (0..count)
            .map(|i| (ids[i].as_str(), TITLES[i], length(i)))
            .collect();
        album_release(id, "Numbers", date, &tracks)
    }

    #[tokio::test]
    async fn test_only_fully_paired_release_wins() {
        // The nine-track edition is tried too but cannot pair track ten
        let catalog = MockCatalog::new()
            .with_release(release_with("a-short", "2001-05-14", 9))
            .with_release(release_with("b-full", "2003-01-01", 10));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let tracks = local_album();

        let located = AlbumBatch.resolve_album(&session(&catalog, &cache, &config), &tracks).await.unwrap();

        assert_eq!(located.len(), 10);
        assert!(located.iter().all(|l| l.release_id == "b-full"));
        assert_eq!(located[9].title, "Ten");
        assert_eq!(located[9].track_number, 10);
        assert_eq!(located[9].source, ResolutionSource::AlbumBatch);
    }

    #[tokio::test]
    async fn test_closest_year_wins_between_full_releases() {
        let catalog = MockCatalog::new()
            .with_release(release_with("a-reissue", "2011-01-01", 10))
            .with_release(release_with("b-original", "2001-05-14", 10));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();

        let located = AlbumBatch
            .resolve_album(&session(&catalog, &cache, &config), &local_album())
            .await
            .unwrap();

        assert_eq!(located[0].release_id, "b-original");
        assert_eq!(catalog.count_calls("release:"), 2);
    }

    #[tokio::test]
    async fn test_no_complete_release_is_not_found() {
        let catalog = MockCatalog::new().with_release(release_with("short", "2001", 9));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();

        let result = AlbumBatch
            .resolve_album(&session(&catalog, &cache, &config), &local_album())
            .await;

        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn test_without_album_tag() {
        let catalog = MockCatalog::new();
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let tracks = vec![mock_track("/m/a.mp3", "A", "B", 1_000)];

        let result = AlbumBatch.resolve_album(&session(&catalog, &cache, &config), &tracks).await;

        assert!(matches!(result, Err(ResolveError::NotFound)));
        assert_eq!(catalog.calls(), 0);
    }

    #[test]
    fn test_common_album_prefers_majority() {
        let tracks = vec![
            Track::new("/a").with_album("Other"),
            Track::new("/b").with_album("Numbers"),
            Track::new("/c").with_album("Numbers"),
        ];
        assert_eq!(common_album(&tracks).as_deref(), Some("Numbers"));

        let tie = vec![Track::new("/a").with_album("First"), Track::new("/b").with_album("Second")];
        assert_eq!(common_album(&tie).as_deref(), Some("First"));
    }
}
