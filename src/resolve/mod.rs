//! Track resolution pipeline.
//!
//! # Architecture
//!
//! - **Orchestrator** (`orchestrator.rs`) - Drives each track through its
//!   [`AutoTagState`](crate::model::AutoTagState)s, owns cancellation and progress
//! - **Strategies** (`strategy.rs` and one file per strategy) - Existing link,
//!   title search, fingerprint search and whole-album batch
//! - **Session** (`session.rs`) - Cancellation-guarded catalog access shared by
//!   the strategies of one batch
//! - **Cache** (`cache.rs`) - Per-batch release and release group cache
//! - **Manager** (`manager.rs`) - The caller's side: progress, links, state
//!
//! # Usage
//!
//! ```ignore
//! let resolver = Resolver::new(Arc::new(CatalogService::default()), None, config);
//! let manager = BatchManager::new(&config.preferences);
//! let outcomes = resolver.resolve_tracks(tracks, &manager).await;
//! ```

mod album_batch;
mod assemble;
mod cache;
mod existing_link;
mod fingerprint_search;
mod manager;
mod orchestrator;
mod session;
mod strategy;
mod title_search;

pub use album_batch::AlbumBatch;
pub use assemble::{assemble, locate_track};
pub use cache::BatchCache;
pub use existing_link::ExistingLink;
pub use fingerprint_search::FingerprintSearch;
pub use manager::{BatchManager, SearchManager};
pub use orchestrator::{Resolver, TrackOutcome};
pub use session::Session;
pub use strategy::ResolutionStrategy;
pub use title_search::TitleSearch;

use crate::catalog::CatalogError;

/// Why a track was not located
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// Catalog or fingerprint service failure
    #[error("Service error: {0}")]
    Service(CatalogError),

    #[error("No matching recording found")]
    NotFound,

    /// Candidates exist but none was trusted
    #[error("Ambiguous match (best score {best_score})")]
    Ambiguous { best_score: u8 },

    /// The batch was canceled; not a failure
    #[error("Canceled")]
    Canceled,
}

impl ResolveError {
    /// Whether another strategy may still locate the track
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound | Self::Ambiguous { .. })
    }
}

impl From<CatalogError> for ResolveError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Canceled => Self::Canceled,
            CatalogError::NotFound => Self::NotFound,
            other => Self::Service(other),
        }
    }
}
