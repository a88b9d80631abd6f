//! Internal domain models for catalog and fingerprint data.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters,
//! and the matching pipeline only ever sees these.

use serde::Serialize;

/// One credited artist, in credit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtistCredit {
    /// Catalog artist ID (absent for free-text credits)
    pub id: Option<String>,
    /// Name as credited
    pub name: String,
    /// Join phrase following this artist (e.g. " & ", " feat. ")
    pub join_phrase: String,
}

impl ArtistCredit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            join_phrase: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_join(mut self, join: impl Into<String>) -> Self {
        self.join_phrase = join.into();
        self
    }

    /// Build a combined display string from a credit list.
    pub fn display(credits: &[ArtistCredit]) -> Option<String> {
        if credits.is_empty() {
            return None;
        }

        let mut result = String::new();
        for credit in credits {
            result.push_str(&credit.name);
            result.push_str(&credit.join_phrase);
        }
        Some(result.trim().to_string())
    }
}

/// Primary type of a release group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PrimaryType {
    Album,
    Single,
    Ep,
    #[default]
    Other,
}

impl PrimaryType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("album") => Self::Album,
            Some("single") => Self::Single,
            Some("ep") => Self::Ep,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "Album",
            Self::Single => "Single",
            Self::Ep => "EP",
            Self::Other => "Other",
        }
    }
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseGroupRef {
    pub id: String,
    pub title: String,
    pub primary_type: PrimaryType,
    /// Secondary types (Compilation, Live, Soundtrack, Remix, ...)
    pub secondary_types: Vec<String>,
    pub artists: Vec<ArtistCredit>,
    /// First release date as reported (YYYY, YYYY-MM or YYYY-MM-DD)
    pub first_release_date: Option<String>,
}

/// A credit relation attached to a recording or its work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// Relation type as reported, lowercased ("composer", "lyricist", "producer", ...)
    pub kind: String,
    /// Credited name
    pub target: String,
}

/// Track on a medium
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediumTrack {
    /// Printed track number (may be "5", "A3", "B1", ...)
    pub number: String,
    /// Position on the medium
    pub position: Option<u32>,
    pub title: String,
    pub length_ms: Option<u64>,
    pub recording_id: Option<String>,
    pub artists: Vec<ArtistCredit>,
    pub relations: Vec<Relation>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Medium {
    /// Position in release (disc number)
    pub position: u32,
    /// Format (CD, Vinyl, Digital Media, ...)
    pub format: Option<String>,
    pub track_count: u32,
    pub tracks: Vec<MediumTrack>,
}

/// One concrete pressing/edition of an album
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Release {
    pub id: String,
    pub title: String,
    /// Release status (Official, Promotion, Bootleg, Pseudo-Release)
    pub status: Option<String>,
    pub date: Option<String>,
    pub country: Option<String>,
    pub release_group: Option<ReleaseGroupRef>,
    pub artists: Vec<ArtistCredit>,
    /// Media; search results usually only carry the matched track
    pub media: Vec<Medium>,
    /// Total track count across all media, when reported
    pub track_count: Option<u32>,
    /// Label names, used as publisher credit
    pub labels: Vec<String>,
}

impl Release {
    /// Total number of tracks, preferring the reported count.
    pub fn total_tracks(&self) -> u32 {
        self.track_count
            .unwrap_or_else(|| self.media.iter().map(|m| m.track_count).sum())
    }
}

/// A specific audio performance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub length_ms: Option<u64>,
    /// Server relevance score normalized to 0.0-1.0
    pub score: f64,
    pub artists: Vec<ArtistCredit>,
    pub releases: Vec<Release>,
    /// Release groups reported without release detail (fingerprint lookups)
    pub release_groups: Vec<ReleaseGroupRef>,
}

/// Release group lookup with its releases
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseGroupDetail {
    pub group: ReleaseGroupRef,
    pub releases: Vec<Release>,
}

/// Cover image listed for a release group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverImage {
    pub url: String,
    pub thumbnail: Option<String>,
    pub front: bool,
}

/// Fingerprint lookup result: a recording with the server's confidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FingerprintMatch {
    /// Confidence score (0.0 to 1.0)
    pub score: f32,
    pub recording: Recording,
}

/// Audio fingerprint for a track
#[derive(Debug, Clone)]
pub struct AudioFingerprint {
    /// The fingerprint string (Chromaprint format)
    pub fingerprint: String,
    /// Duration of the audio in seconds (required by AcoustID)
    pub duration_secs: u32,
}

/// Release status filter applied to recording searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Official, Promotion and Bootleg releases only
    #[default]
    Official,
    Any,
}

/// Text search for recordings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingQuery {
    pub title: String,
    /// Artist constraint; empty means unconstrained
    pub artists: Vec<String>,
    pub album_hint: Option<String>,
    pub status: StatusFilter,
    pub limit: u32,
}

/// What to include when fetching a release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReleaseIncludes {
    pub tracklist: bool,
    pub relations: bool,
}

impl ReleaseIncludes {
    pub const FULL: Self = Self {
        tracklist: true,
        relations: true,
    };
}

/// Errors returned by catalog and fingerprint clients
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to generate fingerprint: {0}")]
    Fingerprint(String),

    #[error("API request failed ({code}): {message}")]
    Api { code: i32, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Request canceled")]
    Canceled,
}

impl CatalogError {
    pub fn api(code: i32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_display_joins_credits() {
        let credits = vec![
            ArtistCredit::new("Queen").with_join(" & "),
            ArtistCredit::new("David Bowie"),
        ];

        assert_eq!(
            ArtistCredit::display(&credits),
            Some("Queen & David Bowie".to_string())
        );
        assert_eq!(ArtistCredit::display(&[]), None);
    }

    #[test]
    fn test_primary_type_parse() {
        assert_eq!(PrimaryType::parse(Some("Album")), PrimaryType::Album);
        assert_eq!(PrimaryType::parse(Some("EP")), PrimaryType::Ep);
        assert_eq!(PrimaryType::parse(Some("single")), PrimaryType::Single);
        assert_eq!(PrimaryType::parse(Some("Broadcast")), PrimaryType::Other);
        assert_eq!(PrimaryType::parse(None), PrimaryType::Other);
    }

    #[test]
    fn test_release_total_tracks_falls_back_to_media() {
        let release = Release {
            media: vec![
                Medium {
                    track_count: 10,
                    ..Default::default()
                },
                Medium {
                    track_count: 4,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(release.total_tracks(), 14);

        let reported = Release {
            track_count: Some(12),
            ..release
        };
        assert_eq!(reported.total_tracks(), 12);
    }
}
