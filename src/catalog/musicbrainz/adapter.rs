//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! If MusicBrainz changes their response format, only this file and dto.rs
//! need to change.

use super::dto;
use crate::catalog::domain::{
    ArtistCredit, Medium, MediumTrack, PrimaryType, Recording, Relation, Release,
    ReleaseGroupDetail, ReleaseGroupRef,
};

/// Convert a recording (search hit or lookup)
pub fn to_recording(recording: dto::Recording) -> Recording {
    Recording {
        id: recording.id,
        title: recording.title,
        length_ms: recording.length,
        // Lookups carry no score; they are exact matches
        score: recording.score.map_or(1.0, |s| f64::from(s.min(100)) / 100.0),
        artists: to_credits(&recording.artist_credit),
        releases: recording.releases.into_iter().map(to_release).collect(),
        release_groups: Vec::new(),
    }
}

/// Convert a release (search hit, embedded release or lookup)
pub fn to_release(release: dto::Release) -> Release {
    let labels = release
        .label_info
        .iter()
        .filter_map(|li| li.label.as_ref().map(|l| l.name.clone()))
        .collect();

    Release {
        id: release.id,
        title: release.title,
        status: release.status,
        date: release.date.filter(|d| !d.is_empty()),
        country: release.country,
        release_group: release.release_group.map(to_release_group_ref),
        artists: release
            .artist_credit
            .as_deref()
            .map(to_credits)
            .unwrap_or_default(),
        media: release.media.into_iter().map(to_medium).collect(),
        track_count: release.track_count,
        labels,
    }
}

/// Convert a release group lookup (with `inc=releases`)
pub fn to_release_group_detail(mut group: dto::ReleaseGroup) -> ReleaseGroupDetail {
    let releases = std::mem::take(&mut group.releases)
        .into_iter()
        .map(to_release)
        .collect();
    ReleaseGroupDetail {
        group: to_release_group_ref(group),
        releases,
    }
}

fn to_release_group_ref(group: dto::ReleaseGroup) -> ReleaseGroupRef {
    ReleaseGroupRef {
        id: group.id,
        title: group.title,
        primary_type: PrimaryType::parse(group.primary_type.as_deref()),
        secondary_types: group.secondary_types,
        artists: group
            .artist_credit
            .as_deref()
            .map(to_credits)
            .unwrap_or_default(),
        first_release_date: group.first_release_date.filter(|d| !d.is_empty()),
    }
}

fn to_medium(medium: dto::Medium) -> Medium {
    let offset = medium.track_offset.unwrap_or(0);
    let tracks: Vec<MediumTrack> = medium
        .tracks
        .into_iter()
        .enumerate()
        .map(|(i, t)| to_medium_track(t, offset + i as u32 + 1))
        .collect();

    Medium {
        position: medium.position.unwrap_or(1),
        format: medium.format,
        track_count: medium.track_count.unwrap_or(tracks.len() as u32),
        tracks,
    }
}

fn to_medium_track(track: dto::Track, fallback_position: u32) -> MediumTrack {
    let position = track.position.unwrap_or(fallback_position);
    let (recording_id, recording_title, recording_length, relations) = match track.recording {
        Some(rec) => {
            let relations = flatten_relations(&rec.relations);
            (Some(rec.id), rec.title, rec.length, relations)
        }
        None => (None, None, None, Vec::new()),
    };

    MediumTrack {
        number: track.number.unwrap_or_else(|| position.to_string()),
        position: Some(position),
        title: track.title.or(recording_title).unwrap_or_default(),
        length_ms: track.length.or(recording_length),
        recording_id,
        artists: track
            .artist_credit
            .as_deref()
            .map(to_credits)
            .unwrap_or_default(),
        relations,
    }
}

/// Flatten recording relations and the relations of linked works.
fn flatten_relations(relations: &[dto::Relation]) -> Vec<Relation> {
    let mut out = Vec::new();
    for rel in relations {
        let kind = rel.relation_type.to_lowercase();
        if let Some(ref artist) = rel.artist {
            // "instrument"/"vocal" carry the detail in attributes
            let kind = match rel.attributes.first() {
                Some(attr) if kind == "instrument" || kind == "vocal" => attr.to_lowercase(),
                _ => kind.clone(),
            };
            out.push(Relation {
                kind,
                target: artist.name.clone(),
            });
        } else if let Some(ref label) = rel.label {
            out.push(Relation {
                kind,
                target: label.name.clone(),
            });
        }
        if let Some(ref work) = rel.work {
            out.extend(flatten_relations(&work.relations));
        }
    }
    out
}

fn to_credits(credits: &[dto::ArtistCredit]) -> Vec<ArtistCredit> {
    credits
        .iter()
        .map(|c| ArtistCredit {
            id: Some(c.artist.id.clone()),
            // Use credited name if available, otherwise official name
            name: c
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| c.artist.name.clone()),
            join_phrase: c.joinphrase.clone().unwrap_or_default(),
        })
        .collect()
}
