//! Candidate building: catalog recordings → scored-ready candidates.

use std::collections::HashMap;

use serde::Serialize;

use super::classify::{Classification, classify_release_group, date_padding};
use super::dates::decode_date;
use super::similarity::{best_artist_similarity, split_artists, string_similarity, strip_brackets};
use crate::catalog::domain::{ArtistCredit, Recording, Release, ReleaseGroupRef};
use crate::config::MatchingConfig;
use crate::model::Track;

/// What we know about the track being resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probe {
    pub title: String,
    /// Split artist names; empty when the track has no artist
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub length_ms: Option<u64>,
    /// Title/artist came from a fingerprint lookup
    pub fingerprinted: bool,
}

impl Probe {
    /// Build a probe from a track's tags; `None` without any title
    pub fn from_track(track: &Track) -> Option<Self> {
        let title = track.title_or_file_stem()?;
        Some(Self {
            title,
            artists: track.probe_artist().map(split_artists).unwrap_or_default(),
            album: track.album.clone().filter(|a| !a.trim().is_empty()),
            track_number: track.track_number,
            disc_number: track.disc_number,
            length_ms: track.length_ms,
            fingerprinted: false,
        })
    }

    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

/// Release-level fields of a candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateRelease {
    pub id: String,
    pub title: String,
    pub status: Option<String>,
    pub date: Option<String>,
    pub country: Option<String>,
    pub track_count: Option<u32>,
}

/// One recording-on-a-release pairing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Candidate {
    pub recording_id: String,
    pub title: String,
    pub artists: Vec<ArtistCredit>,
    pub release: Option<CandidateRelease>,
    /// The release's group, or the groups reported without a release
    pub release_groups: Vec<ReleaseGroupRef>,
    pub length_ms: Option<u64>,
    /// Server relevance 0.0-1.0
    pub server_score: f64,
    pub title_score: f64,
    pub title_score_no_brackets: f64,
    /// Best artist similarity, 0 when the probe has no artist
    pub artist_score: f64,
    /// Release title similarity to the probe album, 0 without album
    pub album_score: f64,
    pub length_diff_sec: Option<f64>,
    #[serde(skip)]
    pub classification: Classification,
    /// Resolved date as `YYYYMMDD`, 0 when unknown
    pub date: u32,
    pub number_on_disc: Option<u32>,
    pub disc_number: Option<u32>,
}

impl Candidate {
    pub fn is_official(&self) -> bool {
        self.classification.is_official()
    }

    pub fn is_single(&self) -> bool {
        self.classification.is_single
    }

    pub fn is_compilation(&self) -> bool {
        self.classification.is_compilation
    }

    pub fn best_title_score(&self) -> f64 {
        self.title_score.max(self.title_score_no_brackets)
    }

    pub fn release_id(&self) -> Option<&str> {
        self.release.as_ref().map(|r| r.id.as_str())
    }

    pub fn release_title(&self) -> Option<&str> {
        self.release
            .as_ref()
            .map(|r| r.title.as_str())
            .or_else(|| self.release_groups.first().map(|g| g.title.as_str()))
    }

    pub fn country(&self) -> Option<&str> {
        self.release.as_ref().and_then(|r| r.country.as_deref())
    }

    pub fn release_group(&self) -> Option<&ReleaseGroupRef> {
        self.release_groups.first()
    }

    /// Remix title or a Remix release group
    pub fn is_remix(&self) -> bool {
        self.title.to_lowercase().contains("remix")
            || self.release_groups.iter().any(|g| {
                g.secondary_types
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case("remix"))
            })
    }

    /// Stable key for deduplication
    fn dedupe_key(&self) -> String {
        match &self.release {
            Some(release) => release.id.clone(),
            None => format!(
                "{}|{}",
                self.recording_id,
                self.release_group().map(|g| g.id.as_str()).unwrap_or("")
            ),
        }
    }
}

/// Turn recordings into candidates, one per release.
///
/// Recordings whose credits fail the artist check are dropped unless the
/// probe has no artist.
pub fn build_candidates(probe: &Probe, recordings: &[Recording], config: &MatchingConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    for recording in recordings {
        let credited: Vec<String> = recording.artists.iter().map(|a| a.name.clone()).collect();
        let artist_score = if probe.artists.is_empty() {
            0.0
        } else {
            best_artist_similarity(&probe.artists, &credited)
        };
        if !probe.artists.is_empty() && artist_score < config.confident_similarity {
            tracing::debug!(
                recording = %recording.id,
                artist_score,
                "Candidate rejected on artist"
            );
            continue;
        }

        let base = base_candidate(probe, recording, artist_score);

        if !recording.releases.is_empty() {
            for release in &recording.releases {
                out.push(with_release(probe, base.clone(), release));
            }
        } else if !recording.release_groups.is_empty() {
            for group in &recording.release_groups {
                out.push(with_release_group(probe, base.clone(), group));
            }
        } else {
            out.push(base);
        }
    }
    out
}

fn base_candidate(probe: &Probe, recording: &Recording, artist_score: f64) -> Candidate {
    let length_diff_sec = match (probe.length_ms, recording.length_ms) {
        (Some(a), Some(b)) => Some((a as f64 - b as f64).abs() / 1000.0),
        _ => None,
    };
    Candidate {
        recording_id: recording.id.clone(),
        title: recording.title.clone(),
        artists: recording.artists.clone(),
        length_ms: recording.length_ms,
        server_score: recording.score,
        title_score: string_similarity(&probe.title, &recording.title),
        title_score_no_brackets: string_similarity(
            &strip_brackets(&probe.title),
            &strip_brackets(&recording.title),
        ),
        artist_score,
        length_diff_sec,
        ..Default::default()
    }
}

fn with_release(probe: &Probe, mut candidate: Candidate, release: &Release) -> Candidate {
    let group = release.release_group.as_ref();
    candidate.classification = classify_release_group(group, release.status.as_deref());
    candidate.date = release
        .date
        .as_deref()
        .or(group.and_then(|g| g.first_release_date.as_deref()))
        .map(|d| decode_date(d, date_padding(group)))
        .unwrap_or(0);
    candidate.album_score = album_score(probe, &release.title);
    candidate.release_groups = group.cloned().into_iter().collect();

    // Search results list only the matched track on each medium
    let located = release.media.iter().find_map(|m| {
        m.tracks
            .iter()
            .find(|t| t.recording_id.as_deref() == Some(candidate.recording_id.as_str()))
            .or_else(|| (m.tracks.len() == 1).then(|| &m.tracks[0]))
            .map(|t| (m.position, t.position))
    });
    if let Some((disc, position)) = located {
        candidate.disc_number = Some(disc);
        candidate.number_on_disc = position;
    }

    candidate.release = Some(CandidateRelease {
        id: release.id.clone(),
        title: release.title.clone(),
        status: release.status.clone(),
        date: release.date.clone(),
        country: release.country.clone(),
        track_count: release.track_count,
    });
    candidate
}

fn with_release_group(probe: &Probe, mut candidate: Candidate, group: &ReleaseGroupRef) -> Candidate {
    // Groups reported without a release carry no status; they are listed
    // because an official release exists
    candidate.classification = classify_release_group(Some(group), Some("Official"));
    candidate.date = group
        .first_release_date
        .as_deref()
        .map(|d| decode_date(d, date_padding(Some(group))))
        .unwrap_or(0);
    candidate.album_score = album_score(probe, &group.title);
    candidate.release_groups = vec![group.clone()];
    candidate
}

fn album_score(probe: &Probe, release_title: &str) -> f64 {
    probe
        .album
        .as_deref()
        .map(|album| {
            string_similarity(album, release_title)
                .max(string_similarity(&strip_brackets(album), &strip_brackets(release_title)))
        })
        .unwrap_or(0.0)
}

/// Deduplicate by release id, keeping first occurrences.
///
/// A later duplicate replaces the kept one only with a strictly better title score.
pub fn dedupe_by_release(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let key = candidate.dedupe_key();
        match index.get(&key) {
            Some(&at) => {
                if candidate.best_title_score() > out[at].best_title_score() {
                    out[at] = candidate;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(candidate);
            }
        }
    }
    out
}
