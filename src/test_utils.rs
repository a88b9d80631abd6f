//! Test utilities and fixtures for track-resolver tests.
//!
//! Factories for catalog data and tracks, so tests only spell out what
//! they actually care about.
//!
//! # Example
//!
//! ```ignore
//! use track_resolver::test_utils::{album_release, recording_on};
//!
//! let release = album_release("rel-1", "Numbers", "2001-05-14", &[("rec-9", "Nine", 209_000)]);
//! let recording = Recording {
//!     releases: vec![release],
//!     ..recording_on("rec-9", "Nine", "Artist X", 209_000)
//! };
//! ```

use crate::catalog::domain::{
    ArtistCredit, Medium, MediumTrack, PrimaryType, Recording, Release, ReleaseGroupDetail,
    ReleaseGroupRef,
};
use crate::model::{ResolvedRelease, Track};

/// Artist credited on every fixture release
pub const FIXTURE_ARTIST: &str = "Artist X";

/// Creates a release group owned by [`FIXTURE_ARTIST`].
pub fn release_group(id: &str, title: &str, primary_type: PrimaryType, date: &str) -> ReleaseGroupRef {
    ReleaseGroupRef {
        id: id.to_string(),
        title: title.to_string(),
        primary_type,
        secondary_types: Vec::new(),
        artists: vec![ArtistCredit::new(FIXTURE_ARTIST)],
        first_release_date: Some(date.to_string()),
    }
}

/// Creates an official release in its own release group (`rg-{id}`),
/// without a tracklist, the way search results list them.
pub fn official_release(id: &str, title: &str, primary_type: PrimaryType, date: &str) -> Release {
    Release {
        id: id.to_string(),
        title: title.to_string(),
        status: Some("Official".to_string()),
        date: Some(date.to_string()),
        country: Some("GB".to_string()),
        release_group: Some(release_group(&format!("rg-{id}"), title, primary_type, date)),
        artists: vec![ArtistCredit::new(FIXTURE_ARTIST)],
        ..Default::default()
    }
}

/// Creates an official album release with a single-disc tracklist.
///
/// Tracks are `(recording id, title, length ms)`, numbered from 1.
pub fn album_release(id: &str, title: &str, date: &str, tracks: &[(&str, &str, u64)]) -> Release {
    let tracks: Vec<MediumTrack> = tracks
        .iter()
        .enumerate()
        .map(|(i, (recording_id, title, length_ms))| MediumTrack {
            number: (i + 1).to_string(),
            position: Some(i as u32 + 1),
            title: title.to_string(),
            length_ms: Some(*length_ms),
            recording_id: Some(recording_id.to_string()),
            artists: vec![ArtistCredit::new(FIXTURE_ARTIST)],
            relations: Vec::new(),
        })
        .collect();

    Release {
        track_count: Some(tracks.len() as u32),
        media: vec![Medium {
            position: 1,
            format: Some("CD".to_string()),
            track_count: tracks.len() as u32,
            tracks,
        }],
        ..official_release(id, title, PrimaryType::Album, date)
    }
}

/// Creates a resolved album whose recordings are `rec-1`, `rec-2`, ...
pub fn resolved_release(id: &str, date: &str, tracks: &[(&str, u64)]) -> ResolvedRelease {
    let ids: Vec<String> = (1..=tracks.len()).map(|i| format!("rec-{i}")).collect();
    let listing: Vec<(&str, &str, u64)> = tracks
        .iter()
        .zip(&ids)
        .map(|((title, length), id)| (id.as_str(), *title, *length))
        .collect();
    ResolvedRelease::from_release(album_release(id, "Album", date, &listing))
}

/// Creates a recording by a single artist with a perfect server score.
pub fn recording_on(id: &str, title: &str, artist: &str, length_ms: u64) -> Recording {
    Recording {
        id: id.to_string(),
        title: title.to_string(),
        length_ms: Some(length_ms),
        score: 1.0,
        artists: vec![ArtistCredit::new(artist)],
        releases: Vec::new(),
        release_groups: Vec::new(),
    }
}

/// Wraps a release in a release group detail.
pub fn group_detail(release: &Release) -> ReleaseGroupDetail {
    let group = release
        .release_group
        .clone()
        .unwrap_or_else(|| release_group(&format!("rg-{}", release.id), &release.title, PrimaryType::Album, ""));
    ReleaseGroupDetail {
        group,
        releases: vec![Release {
            media: Vec::new(),
            ..release.clone()
        }],
    }
}

/// Creates a tagged track.
pub fn mock_track(path: &str, title: &str, artist: &str, length_ms: u64) -> Track {
    Track::new(path)
        .with_title(title)
        .with_artist(artist)
        .with_length_ms(length_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_release_numbers_tracks() {
        let release = album_release(
            "rel",
            "Numbers",
            "2001",
            &[("rec-a", "One", 1_000), ("rec-b", "Two", 2_000)],
        );

        assert_eq!(release.total_tracks(), 2);
        assert_eq!(release.media[0].tracks[1].number, "2");
        assert_eq!(release.release_group.as_ref().unwrap().id, "rg-rel");
    }

    #[test]
    fn test_resolved_release_recording_ids() {
        let resolved = resolved_release("rel", "2001", &[("One", 1_000), ("Two", 2_000)]);
        assert_eq!(resolved.find_by_recording("rec-2").unwrap().title, "Two");
    }

    #[test]
    fn test_group_detail_lists_release_without_tracks() {
        let release = album_release("rel", "Numbers", "2001", &[("rec-a", "One", 1_000)]);
        let detail = group_detail(&release);
        assert_eq!(detail.group.id, "rg-rel");
        assert!(detail.releases[0].media.is_empty());
    }
}
