//! plexsubsync - preferred stream selection for Plex libraries
//!
//! Walks every episode of a Plex library and makes the preferred audio
//! language and the preferred non-forced subtitle language the active
//! streams, reporting per show what changed.
//!
//! # Modules
//!
//! - `models` - Shows, seasons, episodes and their streams
//! - `selection` - Pure stream selection decisions
//! - `library` - Library Service trait the processor runs against
//! - `processor` - Per-episode updates and per-show reports
//! - `driver` - Bounded concurrent run over all shows
//! - `report` - Report line formatting
//! - `api` - Plex HTTP client
//! - `config` / `cli` - Settings from file, environment and flags

pub mod api;
pub mod cli;
pub mod config;
pub mod driver;
pub mod library;
pub mod models;
pub mod processor;
pub mod report;
pub mod selection;

// Re-export commonly used types
pub use models::{Episode, LibrarySection, Media, Part, Season, Show, StreamDescriptor, StreamKind};

pub use api::{PlexClient, PlexError};
pub use config::{Config, ConfigError, Settings};
pub use driver::{run, RunSummary};
pub use library::LibraryService;
pub use processor::{process_show, update_episode, StreamPreferences};
pub use report::{EpisodeChange, ShowReport};
pub use selection::{decide_stream_update, Decision};
