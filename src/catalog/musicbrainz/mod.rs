//! MusicBrainz API integration
//!
//! Provides recording/release search and release, release-group and
//! recording lookups for the resolution pipeline.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

mod adapter;
mod client;
pub mod dto;

pub use adapter::{to_recording, to_release, to_release_group_detail};
pub use client::MusicBrainzClient;
