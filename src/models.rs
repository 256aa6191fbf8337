//! Data structures for plexsubsync
//!
//! Library items as the Plex server hands them to us, reduced to what the
//! stream selection needs:
//! - **Library**: shows, seasons and episodes
//! - **Media**: media entries, parts and their audio/subtitle streams
//!
//! Everything here is transient. Items are fetched fresh on every run.

use std::fmt;

// =============================================================================
// Library Models
// =============================================================================

/// A library section (e.g. "Animes") on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySection {
    /// Section key used in `/library/sections/{key}/...`
    pub key: String,
    pub title: String,
}

/// A TV show in a library section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub rating_key: String,
    pub title: String,
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A season of a show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub rating_key: String,
    pub index: Option<u32>,
    pub title: String,
}

/// An episode with its media tree.
///
/// The media tree from an enumeration may be incomplete (Plex omits streams
/// in listings); reload the episode before inspecting streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub rating_key: String,
    /// Title of the show this episode belongs to
    pub show_title: String,
    pub season_index: Option<u32>,
    pub index: Option<u32>,
    pub media: Vec<Media>,
}

impl Episode {
    /// Iterate over every part of every media entry
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.media.iter().flat_map(|m| m.parts.iter())
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season_index, self.index) {
            (Some(s), Some(e)) => write!(f, "{} S{:02}E{:02}", self.show_title, s, e),
            _ => write!(f, "{} [{}]", self.show_title, self.rating_key),
        }
    }
}

// =============================================================================
// Media Models
// =============================================================================

/// One media entry (a version) of an episode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
    pub parts: Vec<Part>,
}

/// A file-level part carrying its own stream choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub id: u64,
    pub audio_streams: Vec<StreamDescriptor>,
    pub subtitle_streams: Vec<StreamDescriptor>,
}

/// Kind of a selectable stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Subtitle,
}

impl StreamKind {
    /// Plex `streamType` code (1 is video, which we never select)
    pub fn from_plex_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(StreamKind::Audio),
            3 => Some(StreamKind::Subtitle),
            _ => None,
        }
    }

    /// Query parameter used when writing the selection back to a part
    pub fn query_param(&self) -> &'static str {
        match self {
            StreamKind::Audio => "audioStreamID",
            StreamKind::Subtitle => "subtitleStreamID",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// An audio or subtitle stream of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub id: u64,
    pub kind: StreamKind,
    /// Display language, e.g. "Japanese" (absent for unknown tracks)
    pub language: Option<String>,
    /// Human readable title, e.g. "Français (Forced SRT)"
    pub extended_title: String,
    /// Whether the server currently plays this stream
    pub selected: bool,
}

impl StreamDescriptor {
    pub fn audio(id: u64, language: &str, selected: bool) -> Self {
        Self {
            id,
            kind: StreamKind::Audio,
            language: Some(language.to_string()),
            extended_title: language.to_string(),
            selected,
        }
    }

    pub fn subtitle(id: u64, language: &str, extended_title: &str, selected: bool) -> Self {
        Self {
            id,
            kind: StreamKind::Subtitle,
            language: Some(language.to_string()),
            extended_title: extended_title.to_string(),
            selected,
        }
    }

    /// Check the language against a wanted one (exact match)
    pub fn has_language(&self, language: &str) -> bool {
        self.language.as_deref() == Some(language)
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.selected { " *" } else { "" };
        write!(f, "#{} {} ({}){}", self.id, self.extended_title, self.kind, marker)
    }
}
