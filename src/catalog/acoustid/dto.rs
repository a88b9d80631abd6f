//! AcoustID lookup response shapes.
//!
//! Only the parts requested with `meta=recordings+releasegroups` are modeled.
//! These types stay inside the acoustid module; `adapter.rs` turns them into
//! domain recordings.
//!
//! API Reference: https://acoustid.org/webservice#lookup

use serde::Deserialize;

/// `/v2/lookup` response
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    /// "ok" or "error"
    pub status: String,
    #[serde(default)]
    pub results: Vec<LookupResult>,
    pub error: Option<LookupError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupError {
    pub code: i32,
    pub message: String,
}

/// One AcoustID track matching the fingerprint
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResult {
    pub id: String,
    /// 0.0 to 1.0
    pub score: f32,
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// MusicBrainz recording linked to an AcoustID track
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub id: String,
    pub title: Option<String>,
    /// Seconds, sent as a float
    pub duration: Option<f64>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub releasegroups: Vec<ReleaseGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub joinphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseGroup {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub release_type: Option<String>,
    #[serde(default)]
    pub secondarytypes: Vec<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

// ============================================================================
// CONTRACT TESTS
// Payloads as the lookup endpoint sends them.
// ============================================================================
