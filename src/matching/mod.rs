//! Matching kernel - pure scoring and ordering over catalog data.
//!
//! Nothing in here performs I/O. The resolution strategies in
//! [`crate::resolve`] feed catalog responses through:
//! - [`candidate`] - recordings to [`Candidate`]s, deduplicated per release
//! - [`scorer`] - composite scores and the disambiguation policy
//! - [`compare`] - the date-window preference ordering
//! - [`pairing`] - album tracklist pairing for whole-album resolution

pub mod candidate;
pub mod classify;
pub mod compare;
pub mod dates;
pub mod pairing;
pub mod scorer;
pub mod similarity;
pub mod variants;

pub use candidate::{Candidate, CandidateRelease, Probe, build_candidates, dedupe_by_release};
pub use classify::{Classification, classify_release_group};
pub use compare::{compare_candidates, sort_by_preference, sort_candidates};
pub use dates::{DatePadding, date_distance_days, decode_date};
pub use pairing::{AlbumSlot, Pairing, build_slots, pair_release, score_pairing};
pub use scorer::{Decision, Scored, composite_score, disambiguate};
pub use similarity::{artists_match, split_artists, string_similarity, strip_brackets};
pub use variants::title_variants;

use crate::config::PreferencesConfig;

/// User preferences that steer ordering between plausible candidates
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub prefer_albums: bool,
    pub avoid_compilations: bool,
    pub preferred_countries: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::from(&PreferencesConfig::default())
    }
}

impl From<&PreferencesConfig> for Preferences {
    fn from(config: &PreferencesConfig) -> Self {
        Self {
            prefer_albums: config.prefer_albums,
            avoid_compilations: config.avoid_compilations,
            preferred_countries: config.preferred_countries.clone(),
        }
    }
}
