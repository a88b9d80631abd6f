//! Build the located track from a fetched release.

use std::path::Path;

use crate::catalog::ArtistCredit;
use crate::matching::dates::{DatePadding, decode_date, year_of};
use crate::matching::similarity::{string_similarity, strip_brackets};
use crate::model::{Credits, LocatedTrack, ReleaseTrack, ResolutionSource, ResolvedRelease};

/// Length difference still accepted when locating a track by title
const LOCATE_LENGTH_TOLERANCE_SECS: f64 = 10.0;

/// Find a track on a release: by recording id, else by title and length.
pub fn locate_track<'r>(
    release: &'r ResolvedRelease,
    recording_id: Option<&str>,
    title: &str,
    length_ms: Option<u64>,
    min_similarity: f64,
) -> Option<&'r ReleaseTrack> {
    if let Some(id) = recording_id
        && let Some(track) = release.find_by_recording(id)
    {
        return Some(track);
    }

    release
        .tracks()
        .filter(|t| match (length_ms, t.length_ms) {
            (Some(a), Some(b)) => (a as f64 - b as f64).abs() / 1000.0 <= LOCATE_LENGTH_TOLERANCE_SECS,
            _ => true,
        })
        .map(|t| {
            let score = string_similarity(title, &t.title)
                .max(string_similarity(&strip_brackets(title), &strip_brackets(&t.title)));
            (t, score)
        })
        .filter(|(_, score)| *score >= min_similarity)
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.global_index.cmp(&a.0.global_index)))
        .map(|(t, _)| t)
}

/// Assemble the located track for `track` on `release`.
///
/// Lettered (vinyl side) numbering is reported as the global index.
pub fn assemble(
    path: &Path,
    release: &ResolvedRelease,
    track: &ReleaseTrack,
    source: ResolutionSource,
    score: u8,
) -> Option<LocatedTrack> {
    let recording_id = track.recording_id.clone()?;
    let lettered = release.has_lettered_numbers();

    let album_artist = ArtistCredit::display(&release.artists);
    let artist = ArtistCredit::display(&track.artists)
        .or_else(|| album_artist.clone())
        .unwrap_or_default();

    let (track_number, track_total) = if lettered {
        (track.global_index, release.track_count() as u32)
    } else {
        (
            track.position,
            release
                .medium(track.disc)
                .map(|m| m.tracks.len() as u32)
                .unwrap_or(0),
        )
    };

    let date = release.date.clone().or_else(|| release.original_date.clone());
    let year = date
        .as_deref()
        .and_then(|d| year_of(decode_date(d, DatePadding::Earliest)));

    Some(LocatedTrack {
        path: path.to_path_buf(),
        title: track.title.clone(),
        artist,
        album_artist,
        album: release.title.clone(),
        track_number,
        track_total: Some(track_total).filter(|&n| n > 0),
        disc_number: if lettered { 1 } else { track.disc },
        disc_total: Some(release.media.len() as u32).filter(|&n| n > 0),
        date,
        original_date: release.original_date.clone(),
        year,
        album_type: release
            .release_group_id
            .as_ref()
            .map(|_| release.primary_type.as_str().to_string()),
        country: release.country.clone(),
        length_ms: track.length_ms,
        recording_id,
        release_id: release.id.clone(),
        release_group_id: release.release_group_id.clone(),
        credits: Credits::from_relations(&track.relations, &release.labels),
        source,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{Medium, MediumTrack, Relation, Release};
    use crate::test_utils::{album_release, resolved_release};

    #[test]
    fn test_locate_by_recording_then_title() {
        let release = resolved_release("rel", "2001", &[("One", 100_000), ("Two (Live)", 200_000)]);

        let by_id = locate_track(&release, Some("rec-1"), "whatever", None, 0.8).unwrap();
        assert_eq!(by_id.title, "One");

        let by_title = locate_track(&release, Some("missing"), "Two", Some(201_000), 0.8).unwrap();
        assert_eq!(by_title.title, "Two (Live)");

        assert!(locate_track(&release, None, "Two", Some(260_000), 0.8).is_none());
        assert!(locate_track(&release, None, "Three", None, 0.8).is_none());
    }

    #[test]
    fn test_assemble_album_track() {
        let mut release = album_release(
            "rel",
            "Numbers",
            "2001-05-14",
            &[("rec-1", "One", 100_000), ("rec-9", "Nine", 209_000)],
        );
        release.labels = vec!["Label Co".to_string()];
        release.media[0].tracks[1].relations = vec![Relation {
            kind: "composer".to_string(),
            target: "Comp".to_string(),
        }];
        let resolved = ResolvedRelease::from_release(release);
        let track = resolved.find_by_recording("rec-9").unwrap();

        let located = assemble(Path::new("/m/nine.flac"), &resolved, track, ResolutionSource::TitleSearch, 97).unwrap();

        assert_eq!(located.title, "Nine");
        assert_eq!(located.artist, "Artist X");
        assert_eq!(located.album, "Numbers");
        assert_eq!((located.track_number, located.track_total), (2, Some(2)));
        assert_eq!((located.disc_number, located.disc_total), (1, Some(1)));
        assert_eq!(located.year, Some(2001));
        assert_eq!(located.album_type.as_deref(), Some("Album"));
        assert_eq!(located.release_group_id.as_deref(), Some("rg-rel"));
        assert_eq!(located.credits.composer, vec!["Comp"]);
        assert_eq!(located.credits.publisher, vec!["Label Co"]);
    }

    #[test]
    fn test_assemble_lettered_release_uses_global_index() {
        let tracks = ["A1", "A2", "B1", "B2"]
            .iter()
            .enumerate()
            .map(|(i, n)| MediumTrack {
                number: n.to_string(),
                position: Some(i as u32 + 1),
                title: format!("Side {n}"),
                recording_id: Some(format!("rec-{n}")),
                ..Default::default()
            })
            .collect();
        let release = Release {
            id: "vinyl".to_string(),
            title: "Sides".to_string(),
            media: vec![Medium {
                position: 1,
                format: Some("Vinyl".to_string()),
                track_count: 4,
                tracks,
            }],
            ..Default::default()
        };
        let resolved = ResolvedRelease::from_release(release);
        let b2 = resolved.find_by_recording("rec-B2").unwrap();

        let located = assemble(Path::new("/m/b2.mp3"), &resolved, b2, ResolutionSource::AlbumBatch, 80).unwrap();

        assert_eq!(located.track_number, 4);
        assert_eq!(located.track_total, Some(4));
        assert_eq!(located.album_type, None);
    }

    #[test]
    fn test_assemble_requires_recording_id() {
        let mut release = album_release("rel", "Numbers", "2001", &[("rec-1", "One", 1_000)]);
        release.media[0].tracks[0].recording_id = None;
        let resolved = ResolvedRelease::from_release(release);
        let track = &resolved.media[0].tracks[0];

        assert!(assemble(Path::new("/m/a.mp3"), &resolved, track, ResolutionSource::TitleSearch, 90).is_none());
    }
}
