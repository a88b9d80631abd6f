//! Track Resolver - locates music files in the MusicBrainz catalog.
//!
//! Given tracks described by their tags, the resolver finds the catalog
//! recording and release each one belongs to. It uses stored links, title
//! search, acoustic fingerprints, or whole-album tracklist pairing, and
//! returns the resolved metadata without touching the files.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod metadata;
pub mod model;
pub mod resolve;
#[cfg(test)]
pub mod test_utils;
