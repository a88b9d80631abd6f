//! Core data models for track resolution.
//!
//! Defines the pipeline's input ([`Track`]), its output ([`LocatedTrack`]),
//! the per-track [`AutoTagState`] machine and the stored catalog links.
//!
//! A [`Track`] is owned by the caller; the resolver only ever reads it and
//! hands back a new, updated copy built with [`LocatedTrack::apply_to`].

mod release;

pub use release::{Credits, ReleaseTrack, ResolvedMedium, ResolvedRelease, normalize_track_numbers};

use std::path::PathBuf;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A track to resolve, as described by its current tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    /// Absolute file path (unique identifier within a batch)
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub year: Option<u32>,
    /// Duration in milliseconds
    pub length_ms: Option<u64>,
    /// Catalog links stored by a previous run
    pub links: TrackLinks,
    pub state: AutoTagState,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_length_ms(mut self, length_ms: u64) -> Self {
        self.length_ms = Some(length_ms);
        self
    }

    pub fn with_number(mut self, disc: Option<u32>, track: u32) -> Self {
        self.disc_number = disc;
        self.track_number = Some(track);
        self
    }

    /// Title, or the file stem when the title tag is missing
    pub fn title_or_file_stem(&self) -> Option<String> {
        self.title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
    }

    /// Artist used for matching: track artist, else album artist
    pub fn probe_artist(&self) -> Option<&str> {
        self.artist
            .as_deref()
            .or(self.album_artist.as_deref())
            .filter(|a| !a.trim().is_empty())
    }
}

/// Kind of catalog entity a stored link points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkInfo {
    Release,
    ReleaseGroup,
    Recording,
}

/// One stored catalog link, as kept by the search manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLink {
    pub info: LinkInfo,
    pub link: String,
}

impl TrackLink {
    pub fn new(info: LinkInfo, link: impl Into<String>) -> Self {
        Self {
            info,
            link: link.into(),
        }
    }
}

/// Catalog links carried by a track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackLinks {
    pub recording: Option<String>,
    pub release: Option<String>,
    pub release_group: Option<String>,
}

impl TrackLinks {
    pub fn is_empty(&self) -> bool {
        self.recording.is_none() && self.release.is_none() && self.release_group.is_none()
    }

    pub fn from_links(links: &[TrackLink]) -> Self {
        let mut out = Self::default();
        for link in links {
            let slot = match link.info {
                LinkInfo::Release => &mut out.release,
                LinkInfo::ReleaseGroup => &mut out.release_group,
                LinkInfo::Recording => &mut out.recording,
            };
            *slot = Some(link.link.clone());
        }
        out
    }

    pub fn to_links(&self) -> Vec<TrackLink> {
        [
            (LinkInfo::Release, &self.release),
            (LinkInfo::ReleaseGroup, &self.release_group),
            (LinkInfo::Recording, &self.recording),
        ]
        .into_iter()
        .filter_map(|(info, id)| id.as_ref().map(|id| TrackLink::new(info, id.clone())))
        .collect()
    }

    /// Fill missing links from `other`
    pub fn merge(mut self, other: TrackLinks) -> Self {
        self.recording = self.recording.or(other.recording);
        self.release = self.release.or(other.release);
        self.release_group = self.release_group.or(other.release_group);
        self
    }
}

/// Per-track resolution state.
///
/// `InProcess -> Fingerprinting -> Processing -> {Located | Failed}
/// -> LoadingArtwork -> Done`, plus `Processing -> Fingerprinting` when a
/// declined title search escalates. Any state before `Located` may fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum AutoTagState {
    #[default]
    InProcess,
    Fingerprinting,
    Processing,
    Located,
    Failed,
    LoadingArtwork,
    Done,
}

impl AutoTagState {
    pub fn can_transition_to(self, next: AutoTagState) -> bool {
        use AutoTagState::*;
        matches!(
            (self, next),
            (InProcess, Fingerprinting)
                | (InProcess, Processing)
                | (InProcess, Failed)
                | (Fingerprinting, Processing)
                | (Fingerprinting, Failed)
                | (Processing, Fingerprinting)
                | (Processing, Located)
                | (Processing, Failed)
                | (Located, LoadingArtwork)
                | (Located, Done)
                | (LoadingArtwork, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AutoTagState::Failed | AutoTagState::Done)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AutoTagState::InProcess => "in process",
            AutoTagState::Fingerprinting => "fingerprinting",
            AutoTagState::Processing => "processing",
            AutoTagState::Located => "located",
            AutoTagState::Failed => "failed",
            AutoTagState::LoadingArtwork => "loading artwork",
            AutoTagState::Done => "done",
        }
    }
}

bitflags! {
    /// Track fields the caller wants overwritten with resolved values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TagFields: u32 {
        const TITLE = 1 << 0;
        const ARTIST = 1 << 1;
        const ALBUM_ARTIST = 1 << 2;
        const ALBUM = 1 << 3;
        const TRACK_NUMBER = 1 << 4;
        const DISC_NUMBER = 1 << 5;
        const YEAR = 1 << 6;
        /// Catalog links (always stored with the search manager)
        const LINKS = 1 << 7;
    }
}

impl Default for TagFields {
    fn default() -> Self {
        TagFields::all()
    }
}

/// Which strategy produced a located track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionSource {
    ExistingLink,
    TitleSearch,
    Fingerprint,
    AlbumBatch,
}

/// The resolved, catalog-backed metadata for one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedTrack {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album_artist: Option<String>,
    pub album: String,
    pub track_number: u32,
    pub track_total: Option<u32>,
    pub disc_number: u32,
    pub disc_total: Option<u32>,
    /// Release date as reported (YYYY, YYYY-MM or YYYY-MM-DD)
    pub date: Option<String>,
    /// First release date of the release group
    pub original_date: Option<String>,
    pub year: Option<u32>,
    /// Primary type of the release group ("Album", "Single", ...)
    pub album_type: Option<String>,
    pub country: Option<String>,
    pub length_ms: Option<u64>,
    pub recording_id: String,
    pub release_id: String,
    pub release_group_id: Option<String>,
    pub credits: Credits,
    pub source: ResolutionSource,
    /// Composite confidence 0-100
    pub score: u8,
}

impl LocatedTrack {
    pub fn links(&self) -> TrackLinks {
        TrackLinks {
            recording: Some(self.recording_id.clone()),
            release: Some(self.release_id.clone()),
            release_group: self.release_group_id.clone(),
        }
    }

    /// Overwrite the selected display fields of `track` with resolved values.
    pub fn apply_to(&self, track: &Track, fields: TagFields) -> Track {
        let mut out = track.clone();
        if fields.contains(TagFields::TITLE) {
            out.title = Some(self.title.clone());
        }
        if fields.contains(TagFields::ARTIST) {
            out.artist = Some(self.artist.clone());
        }
        if fields.contains(TagFields::ALBUM_ARTIST) && self.album_artist.is_some() {
            out.album_artist = self.album_artist.clone();
        }
        if fields.contains(TagFields::ALBUM) {
            out.album = Some(self.album.clone());
        }
        if fields.contains(TagFields::TRACK_NUMBER) {
            out.track_number = Some(self.track_number);
        }
        if fields.contains(TagFields::DISC_NUMBER) {
            out.disc_number = Some(self.disc_number);
        }
        if fields.contains(TagFields::YEAR) && self.year.is_some() {
            out.year = self.year;
        }
        if fields.contains(TagFields::LINKS) {
            out.links = self.links();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        use AutoTagState::*;
        assert!(InProcess.can_transition_to(Fingerprinting));
        assert!(Fingerprinting.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Fingerprinting));
        assert!(Processing.can_transition_to(Located));
        assert!(Located.can_transition_to(LoadingArtwork));
        assert!(LoadingArtwork.can_transition_to(Done));
        assert!(Fingerprinting.can_transition_to(Failed));
        assert!(InProcess.can_transition_to(Failed));

        assert!(!Failed.can_transition_to(Processing));
        assert!(!Done.can_transition_to(InProcess));
        assert!(!InProcess.can_transition_to(Located));
        assert!(Failed.is_terminal() && Done.is_terminal());
    }

    #[test]
    fn test_links_round_trip_through_manager_form() {
        let links = TrackLinks {
            recording: Some("rec".to_string()),
            release: Some("rel".to_string()),
            release_group: None,
        };

        let stored = links.to_links();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], TrackLink::new(LinkInfo::Release, "rel"));
        assert_eq!(TrackLinks::from_links(&stored), links);
    }

    #[test]
    fn test_links_merge_keeps_own_values() {
        let own = TrackLinks {
            release: Some("mine".to_string()),
            ..Default::default()
        };
        let other = TrackLinks {
            release: Some("theirs".to_string()),
            recording: Some("rec".to_string()),
            ..Default::default()
        };

        let merged = own.merge(other);

        assert_eq!(merged.release.as_deref(), Some("mine"));
        assert_eq!(merged.recording.as_deref(), Some("rec"));
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let track = Track::new("/music/Artist/09 - Nine.flac");
        assert_eq!(track.title_or_file_stem().as_deref(), Some("09 - Nine"));

        let tagged = track.with_title("Nine");
        assert_eq!(tagged.title_or_file_stem().as_deref(), Some("Nine"));
    }

    #[test]
    fn test_apply_to_respects_fields() {
        let track = Track::new("/music/a.mp3")
            .with_title("nine")
            .with_artist("artist x");
        let located = LocatedTrack {
            path: track.path.clone(),
            title: "Nine".to_string(),
            artist: "Artist X".to_string(),
            album_artist: None,
            album: "Numbers".to_string(),
            track_number: 9,
            track_total: Some(11),
            disc_number: 1,
            disc_total: Some(1),
            date: Some("2001-05-14".to_string()),
            original_date: Some("2001-05-14".to_string()),
            year: Some(2001),
            album_type: Some("Album".to_string()),
            country: Some("GB".to_string()),
            length_ms: Some(209_500),
            recording_id: "rec".to_string(),
            release_id: "rel".to_string(),
            release_group_id: Some("rg".to_string()),
            credits: Credits::default(),
            source: ResolutionSource::TitleSearch,
            score: 95,
        };

        let updated = located.apply_to(&track, TagFields::TITLE | TagFields::LINKS);

        assert_eq!(updated.title.as_deref(), Some("Nine"));
        assert_eq!(updated.artist.as_deref(), Some("artist x"));
        assert_eq!(updated.album, None);
        assert_eq!(updated.links.release.as_deref(), Some("rel"));
        assert_eq!(updated.links.release_group.as_deref(), Some("rg"));
    }
}
