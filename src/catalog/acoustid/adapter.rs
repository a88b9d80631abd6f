//! Adapter layer: Convert AcoustID DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if AcoustID changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::catalog::domain::{
    ArtistCredit, CatalogError, FingerprintMatch, PrimaryType, Recording, ReleaseGroupRef,
};

/// Convert an AcoustID lookup response to fingerprint matches.
///
/// A recording can be listed under several AcoustIDs; only its best score is kept.
pub fn to_matches(response: dto::LookupResponse) -> Result<Vec<FingerprintMatch>, CatalogError> {
    if response.status != "ok" {
        let error = response.error.unwrap_or(dto::LookupError {
            code: -1,
            message: "Unknown error".to_string(),
        });
        return Err(CatalogError::api(error.code, error.message));
    }

    let mut matches: Vec<FingerprintMatch> = Vec::new();
    for result in response.results {
        let score = result.score;
        for recording in result.recordings {
            match matches.iter_mut().find(|m| m.recording.id == recording.id) {
                Some(existing) => existing.score = existing.score.max(score),
                None => matches.push(FingerprintMatch {
                    score,
                    recording: to_recording(recording),
                }),
            }
        }
    }

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(matches)
}

fn to_recording(recording: dto::Recording) -> Recording {
    Recording {
        id: recording.id,
        title: recording.title.unwrap_or_default(),
        length_ms: recording
            .duration
            .filter(|d| *d > 0.0)
            .map(|d| (d * 1000.0) as u64),
        score: 1.0,
        artists: to_credits(&recording.artists),
        releases: Vec::new(),
        release_groups: recording
            .releasegroups
            .into_iter()
            .map(|rg| ReleaseGroupRef {
                id: rg.id,
                title: rg.title.unwrap_or_default(),
                primary_type: PrimaryType::parse(rg.release_type.as_deref()),
                secondary_types: rg.secondarytypes,
                artists: to_credits(&rg.artists),
                first_release_date: None,
            })
            .collect(),
    }
}

fn to_credits(artists: &[dto::Artist]) -> Vec<ArtistCredit> {
    artists
        .iter()
        .map(|a| {
            ArtistCredit::new(a.name.clone())
                .with_id(a.id.clone())
                .with_join(a.joinphrase.clone().unwrap_or_default())
        })
        .collect()
}
