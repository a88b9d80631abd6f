//! Cover Art Archive integration
//!
//! Lists artwork from coverartarchive.org using MusicBrainz release group IDs.
//! No API key required.

pub mod dto;
mod client;

pub use client::CoverArtClient;
