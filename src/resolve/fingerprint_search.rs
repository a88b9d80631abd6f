//! Acoustic fingerprint search.

use async_trait::async_trait;
use futures::future::join_all;

use super::ResolveError;
use super::session::Session;
use super::strategy::ResolutionStrategy;
use super::title_search::{TitleSearch, locate_in_group};
use crate::catalog::{ArtistCredit, FingerprintMatch, Recording, ReleaseGroupRef};
use crate::matching::classify::classify_release_group;
use crate::matching::dates::{decode_date, sort_key};
use crate::matching::scorer::duration_bonus;
use crate::matching::similarity::{best_artist_similarity, normalize, split_artists, string_similarity};
use crate::matching::{DatePadding, Probe, sort_by_preference};
use crate::model::{LocatedTrack, ResolutionSource, Track};

/// A (recording, release group) pair from a fingerprint lookup
#[derive(Debug, Clone)]
struct GroupPick {
    recording_index: usize,
    group: ReleaseGroupRef,
    official: bool,
    score: f64,
}

/// Fingerprint strategy, falling back to a fingerprint-seeded title search.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintSearch {
    title_search: TitleSearch,
}

impl FingerprintSearch {
    pub fn new(title_search: TitleSearch) -> Self {
        Self { title_search }
    }

    /// Identify the track's audio
    pub async fn identify(&self, session: &Session<'_>, track: &Track) -> Result<Vec<FingerprintMatch>, ResolveError> {
        let matches = session.identify(&track.path).await?;
        tracing::debug!(path = %track.path.display(), matches = matches.len(), "Fingerprint lookup");
        Ok(matches)
    }

    /// Resolve the track from fingerprint matches.
    pub async fn resolve_matches(
        &self,
        session: &Session<'_>,
        track: &Track,
        matches: Vec<FingerprintMatch>,
    ) -> Result<LocatedTrack, ResolveError> {
        let Some(best) = matches.first().cloned() else {
            return Err(ResolveError::NotFound);
        };

        let confident: Vec<FingerprintMatch> = matches
            .into_iter()
            .filter(|m| m.score >= session.config.fingerprint_min_confidence)
            .collect();
        if confident.is_empty() {
            tracing::debug!(
                path = %track.path.display(),
                score = best.score,
                "Fingerprint below confidence, searching by fingerprinted title"
            );
            let probe = fingerprinted_probe(track, &best.recording);
            return self
                .title_search
                .resolve_probe(session, track, &probe, ResolutionSource::Fingerprint)
                .await;
        }

        let recordings = with_release_groups(session, confident).await?;
        let mut picks = score_groups(track, &recordings, session);
        if picks.is_empty() {
            return Err(ResolveError::NotFound);
        }
        sort_by_preference(&mut picks, |a, b| b.score.total_cmp(&a.score));
        prefer_earliest_tied_group(session, &mut picks).await?;

        for pick in &picks {
            let (m, _) = &recordings[pick.recording_index];
            let score = (m.score * 100.0).round().clamp(0.0, 100.0) as u8;
            match locate_in_group(session, track, &pick.group.id, &m.recording.id, ResolutionSource::Fingerprint, score).await {
                Ok(located) => return Ok(located),
                Err(e) if e.is_recoverable() => {
                    tracing::debug!(group = %pick.group.id, "Release group does not contain recording, trying next");
                }
                Err(e) => return Err(e),
            }
        }
        Err(ResolveError::NotFound)
    }
}

#[async_trait]
impl ResolutionStrategy for FingerprintSearch {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::Fingerprint
    }

    async fn resolve(&self, session: &Session<'_>, track: &Track) -> Result<LocatedTrack, ResolveError> {
        let matches = self.identify(session, track).await?;
        self.resolve_matches(session, track, matches).await
    }
}

/// Probe seeded with the fingerprinted title and artist
fn fingerprinted_probe(track: &Track, recording: &Recording) -> Probe {
    let artists = ArtistCredit::display(&recording.artists)
        .map(|a| split_artists(&a))
        .unwrap_or_default();
    Probe {
        title: recording.title.clone(),
        artists,
        album: track.album.clone(),
        track_number: track.track_number,
        disc_number: track.disc_number,
        length_ms: track.length_ms,
        fingerprinted: true,
    }
}

/// Fill in release groups for recordings the lookup returned without any.
///
/// Detail fetches run together; a failed one drops that recording's groups only.
async fn with_release_groups(
    session: &Session<'_>,
    matches: Vec<FingerprintMatch>,
) -> Result<Vec<(FingerprintMatch, Vec<ReleaseGroupRef>)>, ResolveError> {
    let lookups = matches.into_iter().map(|m| async move {
        let mut groups = m.recording.release_groups.clone();
        if !groups.is_empty() {
            return Ok((m, groups));
        }
        match session.recording(&m.recording.id).await {
            Ok(detail) => {
                groups = detail.release_groups;
                for release in &detail.releases {
                    if let Some(rg) = &release.release_group
                        && !groups.iter().any(|g| g.id == rg.id)
                    {
                        groups.push(rg.clone());
                    }
                }
            }
            Err(ResolveError::Canceled) => return Err(ResolveError::Canceled),
            Err(e) => {
                tracing::warn!(recording = %m.recording.id, error = %e, "Recording detail failed");
            }
        }
        Ok((m, groups))
    });
    join_all(lookups).await.into_iter().collect()
}

/// Score every (recording, release group) pair.
///
/// Server score plus title, artist and duration agreement with the tags,
/// +1 for an official group and +1 when the group title is in the file path.
fn score_groups(track: &Track, recordings: &[(FingerprintMatch, Vec<ReleaseGroupRef>)], session: &Session<'_>) -> Vec<GroupPick> {
    let path = normalize(&track.path.to_string_lossy());
    let tag_artists: Vec<String> = track.probe_artist().map(split_artists).unwrap_or_default();

    let mut picks = Vec::new();
    for (index, (m, groups)) in recordings.iter().enumerate() {
        let recording = &m.recording;
        let title = track
            .title
            .as_deref()
            .map(|t| string_similarity(t, &recording.title))
            .unwrap_or(0.0);
        let credited: Vec<String> = recording.artists.iter().map(|a| a.name.clone()).collect();
        let artist = if tag_artists.is_empty() {
            0.0
        } else {
            best_artist_similarity(&tag_artists, &credited)
        };
        let length_diff = match (track.length_ms, recording.length_ms) {
            (Some(a), Some(b)) => Some((a as f64 - b as f64).abs() / 1000.0),
            _ => None,
        };
        let duration = duration_bonus(length_diff, session.config) / 2.0;
        let base = m.score as f64 + title + artist + duration;

        for group in groups {
            let official = classify_release_group(Some(group), Some("Official")).is_official();
            let in_path = !group.title.trim().is_empty() && path.contains(&normalize(&group.title));
            let score = base + f64::from(u8::from(official)) + f64::from(u8::from(in_path));
            tracing::debug!(recording = %recording.id, group = %group.id, score, "Fingerprint pair");
            picks.push(GroupPick {
                recording_index: index,
                group: group.clone(),
                official,
                score,
            });
        }
    }
    picks
}

/// Among official groups tied with the best pick on the same recording,
/// move the earliest first release to the front.
async fn prefer_earliest_tied_group(session: &Session<'_>, picks: &mut [GroupPick]) -> Result<(), ResolveError> {
    let best = &picks[0];
    if !best.official {
        return Ok(());
    }
    let (recording_index, best_score) = (best.recording_index, best.score);
    let tied: Vec<usize> = picks
        .iter()
        .enumerate()
        .filter(|(_, p)| p.recording_index == recording_index && p.official && (p.score - best_score).abs() < f64::EPSILON)
        .map(|(i, _)| i)
        .collect();
    if tied.len() < 2 {
        return Ok(());
    }

    let lookups = tied.iter().map(|&i| {
        let group = &picks[i].group;
        async move {
            let date = match &group.first_release_date {
                Some(date) => Some(date.clone()),
                None => match session.release_group(&group.id).await {
                    Ok(detail) => detail.group.first_release_date,
                    Err(ResolveError::Canceled) => return Err(ResolveError::Canceled),
                    Err(e) => {
                        tracing::warn!(group = %group.id, error = %e, "Release group lookup failed");
                        None
                    }
                },
            };
            let decoded = date.map(|d| decode_date(&d, DatePadding::Earliest)).unwrap_or(0);
            Ok((i, sort_key(decoded)))
        }
    });
    let dated = join_all(lookups).await.into_iter().collect::<Result<Vec<_>, _>>()?;

    if let Some(&(earliest, _)) = dated.iter().min_by_key(|(i, key)| (*key, *i)) {
        picks[..=earliest].rotate_right(1);
    }
    Ok(())
}
