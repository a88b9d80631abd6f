//! Resolution through catalog links stored by an earlier run.

use async_trait::async_trait;

use super::ResolveError;
use super::assemble::{assemble, locate_track};
use super::session::Session;
use super::strategy::ResolutionStrategy;
use crate::catalog::Release;
use crate::matching::classify::is_official_status;
use crate::matching::dates::{decode_date, sort_key};
use crate::matching::DatePadding;
use crate::model::{LocatedTrack, ResolutionSource, Track};

const LINKED_SCORE: u8 = 100;

/// Existing-link strategy.
///
/// Tries the stored release, then the stored release group's releases, then
/// the stored recording's releases. `NotFound` lets the caller fall through
/// to fingerprint or title search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingLink;

#[async_trait]
impl ResolutionStrategy for ExistingLink {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::ExistingLink
    }

    async fn resolve(&self, session: &Session<'_>, track: &Track) -> Result<LocatedTrack, ResolveError> {
        let links = &track.links;
        if links.is_empty() {
            return Err(ResolveError::NotFound);
        }
        let recording_id = links.recording.as_deref();

        if let Some(release_id) = &links.release
            && let Some(located) = try_release(session, track, release_id, recording_id).await?
        {
            return Ok(located);
        }

        if let Some(group_id) = &links.release_group {
            match session.release_group(group_id).await {
                Ok(detail) => {
                    for release in by_date(&detail.releases) {
                        if let Some(located) = try_release(session, track, &release.id, recording_id).await? {
                            return Ok(located);
                        }
                    }
                }
                Err(ResolveError::NotFound) => {
                    tracing::debug!(group = %group_id, "Linked release group no longer exists");
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(recording_id) = recording_id {
            match session.recording(recording_id).await {
                Ok(recording) => {
                    for release in by_date(&recording.releases) {
                        if let Some(located) = try_release(session, track, &release.id, Some(recording_id)).await? {
                            return Ok(located);
                        }
                    }
                }
                Err(ResolveError::NotFound) => {
                    tracing::debug!(recording = %recording_id, "Linked recording no longer exists");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(path = %track.path.display(), "Stored links did not locate the track");
        Err(ResolveError::NotFound)
    }
}

/// Official releases first, each group ordered by date
fn by_date(releases: &[Release]) -> Vec<&Release> {
    let mut ordered: Vec<&Release> = releases.iter().collect();
    ordered.sort_by_key(|r| {
        (
            !is_official_status(r.status.as_deref()),
            sort_key(r.date.as_deref().map(|d| decode_date(d, DatePadding::Earliest)).unwrap_or(0)),
            r.id.clone(),
        )
    });
    ordered
}

/// Locate the track on one release; `None` when it is not there
async fn try_release(
    session: &Session<'_>,
    track: &Track,
    release_id: &str,
    recording_id: Option<&str>,
) -> Result<Option<LocatedTrack>, ResolveError> {
    let release = match session.release(release_id).await {
        Ok(release) => release,
        Err(ResolveError::NotFound) => {
            tracing::debug!(release = %release_id, "Linked release no longer exists");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let title = track.title_or_file_stem().unwrap_or_default();
    Ok(locate_track(
        &release,
        recording_id,
        &title,
        track.length_ms,
        session.config.confident_similarity,
    )
    .and_then(|found| assemble(&track.path, &release, found, ResolutionSource::ExistingLink, LINKED_SCORE)))
}
