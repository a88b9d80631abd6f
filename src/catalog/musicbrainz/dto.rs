//! MusicBrainz web service response shapes.
//!
//! Only fields the matching pipeline reads are modeled; serde skips the
//! rest. `adapter.rs` is the only consumer.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! Search responses and lookups share most entity shapes. The notable
//! difference is that search results list a medium's tracks under `track`
//! while lookups use `tracks`; [`Medium`] accepts both.

use serde::Deserialize;

/// `/recording?query=` search response
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSearchResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// `/release?query=` search response
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSearchResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Recording (search hit or lookup)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    pub id: String,
    pub title: String,
    /// Search relevance (0-100), absent on lookups
    pub score: Option<u32>,
    /// Duration in milliseconds
    pub length: Option<u64>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    pub id: String,
    pub name: String,
}

/// Release (album/single/EP pressing)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    pub id: String,
    pub title: String,
    pub score: Option<u32>,
    /// Release status (Official, Promotion, Bootleg, Pseudo-Release)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    pub country: Option<String>,
    pub track_count: Option<u32>,
    pub release_group: Option<ReleaseGroup>,
    pub artist_credit: Option<Vec<ArtistCredit>>,
    #[serde(default)]
    pub media: Vec<Medium>,
    #[serde(default)]
    pub label_info: Vec<LabelInfo>,
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    pub id: String,
    pub title: String,
    pub primary_type: Option<String>,
    #[serde(default)]
    pub secondary_types: Vec<String>,
    pub first_release_date: Option<String>,
    pub artist_credit: Option<Vec<ArtistCredit>>,
    /// Present on release-group lookups with `inc=releases`
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    pub position: Option<u32>,
    pub format: Option<String>,
    pub track_count: Option<u32>,
    /// Zero-based offset of the first listed track (search results)
    pub track_offset: Option<u32>,
    #[serde(default, alias = "track")]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    pub id: Option<String>,
    /// Printed number (may be "A1" on vinyl)
    pub number: Option<String>,
    pub position: Option<u32>,
    pub title: Option<String>,
    pub length: Option<u64>,
    pub recording: Option<TrackRecording>,
    pub artist_credit: Option<Vec<ArtistCredit>>,
}

/// Recording embedded in a release tracklist
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRecording {
    pub id: String,
    pub title: Option<String>,
    pub length: Option<u64>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Relationship (artist credit, work link, ...)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: String,
    pub target_type: Option<String>,
    pub artist: Option<Artist>,
    pub label: Option<Label>,
    pub work: Option<Work>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Work linked from a recording
#[derive(Debug, Clone, Deserialize)]
pub struct Work {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelInfo {
    pub catalog_number: Option<String>,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: Option<String>,
    pub name: String,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_recording_search() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 1,
            "offset": 0,
            "recordings": [{
                "id": "rec-1",
                "score": 100,
                "title": "Nine",
                "length": 209500,
                "artist-credit": [{
                    "name": "Artist X",
                    "joinphrase": "",
                    "artist": {"id": "art-1", "name": "Artist X", "sort-name": "X, Artist"}
                }],
                "releases": [{
                    "id": "rel-1",
                    "title": "Numbers",
                    "status": "Official",
                    "date": "2001-05-14",
                    "country": "GB",
                    "track-count": 11,
                    "release-group": {
                        "id": "rg-1",
                        "title": "Numbers",
                        "primary-type": "Album",
                        "secondary-types": ["Live"]
                    },
                    "media": [{
                        "position": 1,
                        "format": "CD",
                        "track-count": 11,
                        "track-offset": 8,
                        "track": [{"id": "t-9", "number": "9", "title": "Nine", "length": 209000}]
                    }]
                }]
            }]
        }"#;

        let response: RecordingSearchResponse =
            serde_json::from_str(json).expect("Should parse recording search");

        assert_eq!(response.count, 1);
        let recording = &response.recordings[0];
        assert_eq!(recording.score, Some(100));
        assert_eq!(recording.artist_credit[0].artist.name, "Artist X");

        let release = &recording.releases[0];
        let rg = release.release_group.as_ref().unwrap();
        assert_eq!(rg.primary_type.as_deref(), Some("Album"));
        assert_eq!(rg.secondary_types, vec!["Live"]);

        let medium = &release.media[0];
        assert_eq!(medium.track_offset, Some(8));
        assert_eq!(medium.tracks[0].number.as_deref(), Some("9"));
    }

    #[test]
    fn test_parse_release_lookup_with_relations() {
        let json = r#"{
            "id": "rel-1",
            "title": "Numbers",
            "status": "Official",
            "date": "2001",
            "country": "XW",
            "release-group": {
                "id": "rg-1",
                "title": "Numbers",
                "primary-type": "Album",
                "secondary-types": [],
                "first-release-date": "2000-11-02"
            },
            "label-info": [{"catalog-number": "CAT1", "label": {"id": "lab-1", "name": "Label Co"}}],
            "media": [{
                "position": 1,
                "format": "12\" Vinyl",
                "track-count": 2,
                "tracks": [
                    {
                        "id": "t-1",
                        "number": "A1",
                        "position": 1,
                        "title": "One",
                        "length": 200000,
                        "recording": {
                            "id": "rec-a",
                            "title": "One",
                            "relations": [
                                {"type": "producer", "target-type": "artist", "artist": {"id": "p", "name": "Prod"}},
                                {"type": "performance", "target-type": "work", "work": {
                                    "id": "w-1",
                                    "title": "One",
                                    "relations": [
                                        {"type": "composer", "target-type": "artist", "artist": {"id": "c", "name": "Comp"}}
                                    ]
                                }}
                            ]
                        }
                    },
                    {"id": "t-2", "number": "B1", "position": 2, "title": "Two", "length": 180000}
                ]
            }]
        }"#;

        let release: Release = serde_json::from_str(json).expect("Should parse release lookup");

        assert_eq!(release.label_info[0].label.as_ref().unwrap().name, "Label Co");
        let tracks = &release.media[0].tracks;
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].number.as_deref(), Some("B1"));

        let recording = tracks[0].recording.as_ref().unwrap();
        assert_eq!(recording.relations.len(), 2);
        let work = recording.relations[1].work.as_ref().unwrap();
        assert_eq!(work.relations[0].relation_type, "composer");
    }

    #[test]
    fn test_parse_release_group_lookup() {
        let json = r#"{
            "id": "rg-1",
            "title": "Numbers",
            "primary-type": "Single",
            "secondary-types": ["Remix"],
            "first-release-date": "1999",
            "artist-credit": [{"name": "Various Artists", "artist": {"id": "89ad4ac3-39f7-470e-963a-56509c546377", "name": "Various Artists"}}],
            "releases": [
                {"id": "rel-1", "title": "Numbers", "status": "Official", "date": "1999-03"},
                {"id": "rel-2", "title": "Numbers", "status": "Promotion"}
            ]
        }"#;

        let rg: ReleaseGroup = serde_json::from_str(json).expect("Should parse release group");

        assert_eq!(rg.releases.len(), 2);
        assert_eq!(rg.first_release_date.as_deref(), Some("1999"));
        assert_eq!(rg.artist_credit.unwrap()[0].artist.name, "Various Artists");
    }

    #[test]
    fn test_parse_release_search_sparse() {
        let json = r#"{"count": 1, "releases": [{"id": "rel-9", "title": "Album", "score": 87}]}"#;

        let response: ReleaseSearchResponse =
            serde_json::from_str(json).expect("Should parse sparse release search");

        let release = &response.releases[0];
        assert_eq!(release.score, Some(87));
        assert!(release.media.is_empty());
        assert!(release.release_group.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": "Not Found",
            "help": "For usage, please see: https://musicbrainz.org/doc/MusicBrainz_API"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(error.error, "Not Found");
        assert!(error.help.is_some());
    }
}
