//! Library Service abstraction
//!
//! The operations the show processor needs from the media server. The Plex
//! HTTP client implements it for real runs; tests drive the processor with
//! an in-memory implementation.

use anyhow::Result;

use crate::models::{Episode, Part, Season, Show, StreamDescriptor};

/// Read and write access to a media library.
///
/// Implementations are shared by reference between concurrently processed
/// shows and must handle their own synchronization.
#[allow(async_fn_in_trait)]
pub trait LibraryService {
    /// List the seasons of a show in server order
    async fn seasons(&self, show: &Show) -> Result<Vec<Season>>;

    /// List the episodes of a season in server order
    async fn episodes(&self, season: &Season) -> Result<Vec<Episode>>;

    /// Fetch the current media/part/stream state of an episode
    async fn reload(&self, episode: &Episode) -> Result<Episode>;

    /// Make `stream` the active audio stream of `part`
    async fn select_audio_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()>;

    /// Make `stream` the active subtitle stream of `part`
    async fn select_subtitle_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()>;
}
