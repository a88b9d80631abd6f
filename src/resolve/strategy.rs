//! Per-track resolution strategies.

use async_trait::async_trait;

use super::ResolveError;
use super::session::Session;
use crate::model::{LocatedTrack, ResolutionSource, Track};

/// One way of locating a single track in the catalog.
///
/// `NotFound` and `Ambiguous` mean "no answer from this strategy" and let
/// the orchestrator try the next one; `Canceled` and `Service` end the track.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn source(&self) -> ResolutionSource;

    async fn resolve(&self, session: &Session<'_>, track: &Track) -> Result<LocatedTrack, ResolveError>;
}
