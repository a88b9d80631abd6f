//! Text search by title variants.

use async_trait::async_trait;
use futures::future::join_all;

use super::ResolveError;
use super::assemble::{assemble, locate_track};
use super::session::Session;
use super::strategy::ResolutionStrategy;
use crate::catalog::{Recording, RecordingQuery, StatusFilter};
use crate::matching::classify::is_official_status;
use crate::matching::dates::{decode_date, sort_key};
use crate::matching::{
    Candidate, Decision, DatePadding, Probe, Scored, build_candidates, dedupe_by_release,
    disambiguate, sort_candidates, title_variants,
};
use crate::model::{LocatedTrack, ResolutionSource, Track};

/// Title search strategy.
///
/// Every title variant is searched concurrently, constrained to the primary
/// artist and then, when that finds nothing, to all credited artists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleSearch;

impl TitleSearch {
    /// Search all variants and return deduplicated, ordered candidates.
    pub async fn candidates(&self, session: &Session<'_>, probe: &Probe) -> Result<Vec<Candidate>, ResolveError> {
        let variants = title_variants(&probe.title);
        let primary: Vec<String> = probe.primary_artist().map(str::to_string).into_iter().collect();

        let mut recordings = search_variants(session, probe, &variants, &primary).await?;
        if recordings.is_empty() && probe.artists.len() > 1 {
            tracing::debug!(title = %probe.title, "Nothing for the primary artist, trying all artists");
            recordings = search_variants(session, probe, &variants, &probe.artists).await?;
        }

        let mut candidates = dedupe_by_release(build_candidates(probe, &recordings, session.config));
        sort_candidates(&mut candidates, &session.prefs, session.config.date_window_days);
        tracing::debug!(
            title = %probe.title,
            variants = variants.len(),
            candidates = candidates.len(),
            "Title search"
        );
        Ok(candidates)
    }

    /// Resolve a probe built from tags or from a fingerprint match.
    pub async fn resolve_probe(
        &self,
        session: &Session<'_>,
        track: &Track,
        probe: &Probe,
        source: ResolutionSource,
    ) -> Result<LocatedTrack, ResolveError> {
        let candidates = self.candidates(session, probe).await?;
        match disambiguate(probe, candidates, &session.prefs, session.config) {
            Decision::Located(scored) => locate_scored(session, track, probe, &scored, source).await,
            Decision::Declined { best } => Err(ResolveError::Ambiguous {
                best_score: best.map(|b| b.score).unwrap_or(0),
            }),
            Decision::Empty => Err(ResolveError::NotFound),
        }
    }
}

#[async_trait]
impl ResolutionStrategy for TitleSearch {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::TitleSearch
    }

    async fn resolve(&self, session: &Session<'_>, track: &Track) -> Result<LocatedTrack, ResolveError> {
        let probe = Probe::from_track(track).ok_or(ResolveError::NotFound)?;
        self.resolve_probe(session, track, &probe, self.source()).await
    }
}

/// One search per variant, concurrently.
///
/// Failed variants are skipped; only when every variant failed does the
/// error surface.
async fn search_variants(
    session: &Session<'_>,
    probe: &Probe,
    variants: &[String],
    artists: &[String],
) -> Result<Vec<Recording>, ResolveError> {
    let queries: Vec<RecordingQuery> = variants
        .iter()
        .map(|title| RecordingQuery {
            title: title.clone(),
            artists: artists.to_vec(),
            album_hint: probe.album.clone(),
            status: StatusFilter::Official,
            limit: session.config.search_limit,
        })
        .collect();

    let results = join_all(queries.iter().map(|q| session.search_recordings(q))).await;

    let mut found = Vec::new();
    let mut succeeded = false;
    let mut last_error = None;
    for (query, result) in queries.iter().zip(results) {
        match result {
            Ok(recordings) => {
                succeeded = true;
                found.extend(recordings);
            }
            Err(ResolveError::Canceled) => return Err(ResolveError::Canceled),
            Err(e) => {
                tracing::warn!(variant = %query.title, error = %e, "Search variant failed");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !succeeded => Err(e),
        _ => Ok(found),
    }
}

/// Fetch the winning candidate's release and build the located track.
pub(super) async fn locate_scored(
    session: &Session<'_>,
    track: &Track,
    probe: &Probe,
    scored: &Scored,
    source: ResolutionSource,
) -> Result<LocatedTrack, ResolveError> {
    let candidate = &scored.candidate;
    match candidate.release_id() {
        Some(release_id) => {
            let release = session.release(release_id).await?;
            let found = locate_track(
                &release,
                Some(&candidate.recording_id),
                &probe.title,
                probe.length_ms,
                session.config.confident_similarity,
            )
            .ok_or(ResolveError::NotFound)?;
            assemble(&track.path, &release, found, source, scored.score).ok_or(ResolveError::NotFound)
        }
        None => {
            let group_id = candidate
                .release_group()
                .map(|g| g.id.clone())
                .ok_or(ResolveError::NotFound)?;
            locate_in_group(session, track, &group_id, &candidate.recording_id, source, scored.score).await
        }
    }
}

/// Locate a recording on the earliest official release of a group that has it.
pub(super) async fn locate_in_group(
    session: &Session<'_>,
    track: &Track,
    group_id: &str,
    recording_id: &str,
    source: ResolutionSource,
    score: u8,
) -> Result<LocatedTrack, ResolveError> {
    let detail = session.release_group(group_id).await?;
    let mut releases: Vec<_> = detail
        .releases
        .iter()
        .filter(|r| is_official_status(r.status.as_deref()))
        .collect();
    releases.sort_by_key(|r| {
        (
            sort_key(r.date.as_deref().map(|d| decode_date(d, DatePadding::Earliest)).unwrap_or(0)),
            r.id.clone(),
        )
    });

    for release in releases {
        let resolved = session.release(&release.id).await?;
        if let Some(found) = resolved.find_by_recording(recording_id) {
            return assemble(&track.path, &resolved, found, source, score).ok_or(ResolveError::NotFound);
        }
    }
    tracing::debug!(group = group_id, recording = recording_id, "Recording not on any release of group");
    Err(ResolveError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{CatalogError, PrimaryType};
    use crate::catalog::traits::mocks::MockCatalog;
    use crate::config::MatchingConfig;
    use crate::matching::Preferences;
    use crate::resolve::cache::BatchCache;
    use crate::test_utils::{album_release, mock_track, official_release, recording_on};
    use tokio_util::sync::CancellationToken;

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

    /// "Nine" on an album, plus a "Number 9" single by the same artist
    fn nine_catalog() -> MockCatalog {
        let album = album_release(
            "rel-album",
            "Numbers",
            "2001-05-14",
            &[("rec-8", "Eight", 180_000), ("rec-9", "Nine", 209_000)],
        );
        let nine = Recording {
            releases: vec![official_release("rel-album", "Numbers", PrimaryType::Album, "2001-05-14")],
            ..recording_on("rec-9", "Nine", "Artist X", 209_000)
        };
        let number_nine = Recording {
            releases: vec![official_release("rel-single", "Number 9", PrimaryType::Single, "2000-01-01")],
            ..recording_on("rec-n9", "Number 9", "Artist X", 230_000)
        };
        MockCatalog::new()
            .with_recording(nine)
            .with_recording(number_nine)
            .with_release(album)
    }

    #[tokio::test]
    async fn test_nine_resolves_to_exact_album_track() {
        let catalog = nine_catalog();
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);
        let track = mock_track("/m/nine.mp3", "Nine", "Artist X", 209_500);

        let located = TitleSearch.resolve(&session, &track).await.unwrap();

        assert_eq!(located.recording_id, "rec-9");
        assert_eq!(located.release_id, "rel-album");
        assert_eq!(located.track_number, 2);
        assert_eq!(located.source, ResolutionSource::TitleSearch);
        // "Nine" and "9" were both searched
        assert_eq!(catalog.count_calls("search:"), 2);
    }

    #[tokio::test]
    async fn test_failed_variant_is_tolerated() {
        let mut catalog = nine_catalog();
        catalog.failing_titles = vec!["9".to_string()];
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);

        let probe = Probe::from_track(&mock_track("/m/nine.mp3", "Nine", "Artist X", 209_500)).unwrap();
        let candidates = TitleSearch.candidates(&session, &probe).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].recording_id, "rec-9");
    }

    #[tokio::test]
    async fn test_all_variants_failing_surfaces_error() {
        let catalog = MockCatalog::new().with_error(CatalogError::RateLimited);
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);
        let track = mock_track("/m/nine.mp3", "Nine", "Artist X", 209_500);

        let result = TitleSearch.resolve(&session, &track).await;

        assert!(matches!(result, Err(ResolveError::Service(CatalogError::RateLimited))));
    }

    #[tokio::test]
    async fn test_retries_with_all_artists() {
        let recording = Recording {
            releases: vec![official_release("rel-duet", "Duet", PrimaryType::Single, "2010")],
            ..recording_on("rec-duet", "Duet", "Guest Singer", 200_000)
        };
        let catalog = MockCatalog::new()
            .with_recording(recording)
            .with_release(album_release("rel-duet", "Duet", "2010", &[("rec-duet", "Duet", 200_000)]));
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);
        let track = mock_track("/m/duet.mp3", "Duet", "Main Artist feat. Guest Singer", 200_000);

        let located = TitleSearch.resolve(&session, &track).await.unwrap();

        assert_eq!(located.recording_id, "rec-duet");
        let log = catalog.log();
        assert!(log.contains(&"search:Duet|Main Artist".to_string()));
        assert!(log.contains(&"search:Duet|Main Artist;Guest Singer".to_string()));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let catalog = MockCatalog::new();
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);
        let track = mock_track("/m/x.mp3", "Unknown Song", "Nobody", 100_000);

        let result = TitleSearch.resolve(&session, &track).await;
        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn test_release_group_only_candidate_uses_earliest_release() {
        let group = crate::test_utils::release_group("rg-1", "Numbers", PrimaryType::Album, "2001");
        let recording = Recording {
            release_groups: vec![group.clone()],
            ..recording_on("rec-9", "Nine", "Artist X", 209_000)
        };
        let early = album_release("rel-early", "Numbers", "2001-05-14", &[("rec-9", "Nine", 209_000)]);
        let late = album_release("rel-late", "Numbers", "2011-01-01", &[("rec-9", "Nine", 209_000)]);
        let catalog = MockCatalog::new()
            .with_recording(recording)
            .with_release(early.clone())
            .with_release(late.clone())
            .with_release_group(crate::catalog::ReleaseGroupDetail {
                group,
                releases: vec![late, early],
            });
        let cache = BatchCache::new();
        let config = MatchingConfig::default();
        let session = session(&catalog, &cache, &config);
        let track = mock_track("/m/nine.mp3", "Nine", "Artist X", 209_000);

        let located = TitleSearch.resolve(&session, &track).await.unwrap();

        assert_eq!(located.release_id, "rel-early");
        assert_eq!(catalog.count_calls("release:"), 1);
    }
}
