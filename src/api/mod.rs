//! API clients for external services
//!
//! - Plex: library enumeration and stream selection write-back

pub mod plex;

pub use plex::{PlexClient, PlexError, ServerIdentity};
