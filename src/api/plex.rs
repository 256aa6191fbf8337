//! Plex Media Server client
//!
//! Talks to the server's JSON API with a token header. Only the endpoints
//! needed to walk a TV library and change stream selections are covered.
//! API reference: https://plexapi.dev

use anyhow::Result;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::library::LibraryService;
use crate::models::{
    Episode, LibrarySection, Media, Part, Season, Show, StreamDescriptor, StreamKind,
};

/// Header carrying the Plex authentication token
const TOKEN_HEADER: &str = "X-Plex-Token";

/// Plex API error types
#[derive(Error, Debug)]
pub enum PlexError {
    #[error("Could not connect to {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("Unauthorized (401), check the Plex token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Name and version reported by the server root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub friendly_name: String,
    pub version: String,
}

/// Plex server client
pub struct PlexClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl PlexClient {
    /// Create a client without contacting the server
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client and check that the server accepts the token
    pub async fn connect(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<(Self, ServerIdentity), PlexError> {
        let client = Self::new(base_url, token);
        let identity = client.identity().await?;
        debug!(
            "Connected to {} ({}) at {}",
            identity.friendly_name, identity.version, client.base_url
        );
        Ok((client, identity))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the server root
    pub async fn identity(&self) -> Result<ServerIdentity, PlexError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .header(TOKEN_HEADER, &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PlexError::Connection {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let root: Envelope<RootContainer> = parse_json(check_status(response, "/")?).await?;
        Ok(ServerIdentity {
            friendly_name: root.container.friendly_name.unwrap_or_default(),
            version: root.container.version.unwrap_or_default(),
        })
    }

    /// Make an authenticated GET request and decode the MediaContainer
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, PlexError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let envelope: Envelope<T> = parse_json(check_status(response, endpoint)?).await?;
        Ok(envelope.container)
    }

    /// Look up a library section by its title
    pub async fn library_section(&self, name: &str) -> Result<LibrarySection, PlexError> {
        let sections: SectionsContainer = self.get("/library/sections").await?;
        sections
            .directories
            .into_iter()
            .find(|d| d.title == name)
            .map(|d| LibrarySection {
                key: d.key,
                title: d.title,
            })
            .ok_or_else(|| PlexError::NotFound(format!("library section '{}'", name)))
    }

    /// List every show of a section
    pub async fn all_shows(&self, section: &LibrarySection) -> Result<Vec<Show>, PlexError> {
        let endpoint = format!("/library/sections/{}/all", section.key);
        let container: MetadataContainer = self.get(&endpoint).await?;
        Ok(container
            .metadata
            .into_iter()
            .map(|m| Show {
                title: m.title.unwrap_or_default(),
                rating_key: m.rating_key,
            })
            .collect())
    }

    /// Select a stream of a part for every part of the item
    async fn select_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<(), PlexError> {
        let endpoint = format!("/library/parts/{}", part.id);
        debug!("PUT {} {}={}", endpoint, stream.kind.query_param(), stream.id);

        let response = self
            .client
            .put(format!("{}{}", self.base_url, endpoint))
            .header(TOKEN_HEADER, &self.token)
            .header("Accept", "application/json")
            .query(&[
                (stream.kind.query_param(), stream.id.to_string()),
                ("allParts", "1".to_string()),
            ])
            .send()
            .await?;

        check_status(response, &endpoint)?;
        Ok(())
    }
}

impl LibraryService for PlexClient {
    async fn seasons(&self, show: &Show) -> Result<Vec<Season>> {
        let endpoint = format!("/library/metadata/{}/children?excludeAllLeaves=1", show.rating_key);
        let container: MetadataContainer = self.get(&endpoint).await?;
        Ok(container
            .metadata
            .into_iter()
            .map(|m| Season {
                rating_key: m.rating_key,
                index: m.index,
                title: m.title.unwrap_or_default(),
            })
            .collect())
    }

    async fn episodes(&self, season: &Season) -> Result<Vec<Episode>> {
        let endpoint = format!("/library/metadata/{}/children", season.rating_key);
        let container: MetadataContainer = self.get(&endpoint).await?;
        let show_title = container.grandparent_title.clone().unwrap_or_default();
        Ok(container
            .metadata
            .into_iter()
            .map(|m| m.into_episode(&show_title))
            .collect())
    }

    async fn reload(&self, episode: &Episode) -> Result<Episode> {
        let endpoint = format!("/library/metadata/{}", episode.rating_key);
        let container: MetadataContainer = self.get(&endpoint).await?;
        let fresh = container
            .metadata
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::NotFound(format!("episode {}", episode.rating_key)))?;
        Ok(fresh.into_episode(&episode.show_title))
    }

    async fn select_audio_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()> {
        Ok(self.select_stream(part, stream).await?)
    }

    async fn select_subtitle_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()> {
        Ok(self.select_stream(part, stream).await?)
    }
}

/// Map HTTP status codes onto [`PlexError`]
fn check_status(response: Response, endpoint: &str) -> Result<Response, PlexError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(PlexError::Unauthorized),
        StatusCode::NOT_FOUND => Err(PlexError::NotFound(endpoint.to_string())),
        status => Err(PlexError::ServerError(status.as_u16())),
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, PlexError> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| PlexError::InvalidResponse(format!("JSON parse error: {}", e)))
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    container: T,
}

#[derive(Debug, Deserialize)]
struct RootContainer {
    #[serde(rename = "friendlyName")]
    friendly_name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<DirectoryRaw>,
}

#[derive(Debug, Deserialize)]
struct DirectoryRaw {
    key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct MetadataContainer {
    #[serde(rename = "grandparentTitle")]
    grandparent_title: Option<String>,
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataRaw>,
}

#[derive(Debug, Deserialize)]
struct MetadataRaw {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: Option<String>,
    index: Option<u32>,
    #[serde(rename = "parentIndex")]
    parent_index: Option<u32>,
    #[serde(rename = "grandparentTitle")]
    grandparent_title: Option<String>,
    #[serde(rename = "Media", default)]
    media: Vec<MediaRaw>,
}

impl MetadataRaw {
    fn into_episode(self, fallback_show_title: &str) -> Episode {
        Episode {
            rating_key: self.rating_key,
            show_title: self
                .grandparent_title
                .unwrap_or_else(|| fallback_show_title.to_string()),
            season_index: self.parent_index,
            index: self.index,
            media: self.media.into_iter().map(MediaRaw::into_media).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaRaw {
    #[serde(rename = "Part", default)]
    parts: Vec<PartRaw>,
}

impl MediaRaw {
    fn into_media(self) -> Media {
        Media {
            parts: self.parts.into_iter().map(PartRaw::into_part).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PartRaw {
    id: u64,
    #[serde(rename = "Stream", default)]
    streams: Vec<StreamRaw>,
}

impl PartRaw {
    fn into_part(self) -> Part {
        let mut part = Part {
            id: self.id,
            ..Default::default()
        };
        for stream in self.streams.into_iter().filter_map(StreamRaw::into_descriptor) {
            match stream.kind {
                StreamKind::Audio => part.audio_streams.push(stream),
                StreamKind::Subtitle => part.subtitle_streams.push(stream),
            }
        }
        part
    }
}

#[derive(Debug, Deserialize)]
struct StreamRaw {
    id: u64,
    #[serde(rename = "streamType")]
    stream_type: u8,
    language: Option<String>,
    #[serde(rename = "extendedDisplayTitle")]
    extended_display_title: Option<String>,
    #[serde(rename = "displayTitle")]
    display_title: Option<String>,
    #[serde(default)]
    selected: bool,
}

impl StreamRaw {
    /// Video and other stream types are dropped
    fn into_descriptor(self) -> Option<StreamDescriptor> {
        let kind = StreamKind::from_plex_code(self.stream_type)?;
        Some(StreamDescriptor {
            id: self.id,
            kind,
            language: self.language,
            extended_title: self
                .extended_display_title
                .or(self.display_title)
                .unwrap_or_default(),
            selected: self.selected,
        })
    }
}
