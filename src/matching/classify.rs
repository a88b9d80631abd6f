//! Release group classification.

use super::dates::DatePadding;
use super::similarity::normalize;
use crate::catalog::domain::{ArtistCredit, PrimaryType, ReleaseGroupRef};

/// Reserved catalog id of the "Various Artists" credit
pub const VARIOUS_ARTISTS_ID: &str = "89ad4ac3-39f7-470e-963a-56509c546377";

const OFFICIAL_STATUSES: [&str; 3] = ["official", "promotion", "bootleg"];
const ACCEPTABLE_SECONDARY_TYPES: [&str; 2] = ["soundtrack", "remix"];

/// Classification of one release group (and the status of the release on it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_official_status: bool,
    pub is_acceptable_secondary_type: bool,
    pub is_single: bool,
    pub is_official_album: bool,
    pub is_compilation: bool,
}

impl Classification {
    /// Official album or single
    pub fn is_official(&self) -> bool {
        self.is_official_album || self.is_single
    }
}

pub fn is_official_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| OFFICIAL_STATUSES.contains(&s.trim().to_ascii_lowercase().as_str()))
}

/// Only no secondary type, Soundtrack or Remix is acceptable
pub fn is_acceptable_secondary_type(secondary_types: &[String]) -> bool {
    secondary_types
        .iter()
        .all(|t| ACCEPTABLE_SECONDARY_TYPES.contains(&t.trim().to_ascii_lowercase().as_str()))
}

pub fn is_various_artists(credits: &[ArtistCredit]) -> bool {
    credits.iter().any(|c| {
        c.id.as_deref() == Some(VARIOUS_ARTISTS_ID) || normalize(&c.name) == "various artists"
    })
}

/// Classify a release group for a release with the given status.
///
/// A missing release group classifies as nothing official.
pub fn classify_release_group(group: Option<&ReleaseGroupRef>, status: Option<&str>) -> Classification {
    let official_status = is_official_status(status);
    let Some(group) = group else {
        return Classification {
            is_official_status: official_status,
            ..Default::default()
        };
    };

    let acceptable = is_acceptable_secondary_type(&group.secondary_types);
    let various = is_various_artists(&group.artists);
    let compilation = various
        || group
            .secondary_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case("compilation"));

    Classification {
        is_official_status: official_status,
        is_acceptable_secondary_type: acceptable,
        is_single: official_status && group.primary_type == PrimaryType::Single && acceptable,
        is_official_album: official_status
            && matches!(group.primary_type, PrimaryType::Album | PrimaryType::Ep)
            && acceptable
            && !various,
        is_compilation: compilation,
    }
}

/// Year-only dates of albums, EPs and singles pad to January 1st
pub fn date_padding(group: Option<&ReleaseGroupRef>) -> DatePadding {
    match group.map(|g| g.primary_type) {
        Some(PrimaryType::Album | PrimaryType::Ep | PrimaryType::Single) => DatePadding::Earliest,
        _ => DatePadding::Latest,
    }
}
