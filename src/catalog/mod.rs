//! Catalog module - talks to the external music catalog and fingerprint services.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types the matching pipeline works on
//! - **Traits** (`traits.rs`) - The catalog/fingerprint seams, with test mocks
//! - **API DTOs** (`acoustid/dto.rs`, `musicbrainz/dto.rs`, `coverart/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Fingerprint** - Audio fingerprint generation via fpcalc
//! - **Service** - The production catalog combining MusicBrainz and the Cover Art Archive
//!
//! # Usage
//!
//! ```ignore
//! use track_resolver::catalog::{CatalogApi, CatalogService, RecordingQuery};
//!
//! let catalog = CatalogService::default();
//! let hits = catalog.search_recordings(&RecordingQuery {
//!     title: "Nine".to_string(),
//!     artists: vec!["Artist X".to_string()],
//!     limit: 25,
//!     ..Default::default()
//! }).await?;
//! ```

pub mod acoustid;
pub mod coverart;
pub mod domain;
pub mod fingerprint;
pub mod musicbrainz;
pub mod service;
pub mod traits;

pub use domain::{
    ArtistCredit, AudioFingerprint, CatalogError, CoverImage, FingerprintMatch, Medium,
    MediumTrack, PrimaryType, Recording, RecordingQuery, Relation, Release, ReleaseGroupDetail,
    ReleaseGroupRef, ReleaseIncludes, StatusFilter,
};
pub use fingerprint::AcoustIdFingerprinter;
pub use service::{CatalogService, CatalogSettings};
pub use traits::{CatalogApi, FingerprintApi};
