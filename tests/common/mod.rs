//! In-memory Library Service shared by the integration tests
//!
//! Episode listings are stale on purpose (no media), so anything that skips
//! the reload step sees no streams at all.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use plexsubsync::library::LibraryService;
use plexsubsync::models::{Episode, Media, Part, Season, Show, StreamDescriptor, StreamKind};
use plexsubsync::processor::StreamPreferences;

/// A write-back the service received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBack {
    pub part_id: u64,
    pub kind: StreamKind,
    pub stream_id: u64,
}

#[derive(Default)]
pub struct FakeLibrary {
    next_key: usize,
    seasons: HashMap<String, Vec<Season>>,
    listings: HashMap<String, Vec<Episode>>,
    state: Mutex<HashMap<String, Episode>>,
    writes: Mutex<Vec<WriteBack>>,
    season_failures: HashMap<String, String>,
    reload_failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    reloads: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&mut self, prefix: &str) -> String {
        self.next_key += 1;
        format!("{}-{}", prefix, self.next_key)
    }

    pub fn add_show(&mut self, title: &str) -> Show {
        let show = Show {
            rating_key: self.key("show"),
            title: title.to_string(),
        };
        self.seasons.insert(show.rating_key.clone(), Vec::new());
        show
    }

    pub fn add_season(&mut self, show: &Show, index: u32) -> Season {
        let season = Season {
            rating_key: self.key("season"),
            index: Some(index),
            title: format!("Season {}", index),
        };
        self.seasons
            .entry(show.rating_key.clone())
            .or_default()
            .push(season.clone());
        self.listings.insert(season.rating_key.clone(), Vec::new());
        season
    }

    /// Add an episode with one media entry holding `parts`
    pub fn add_episode(
        &mut self,
        show: &Show,
        season: &Season,
        index: u32,
        parts: Vec<Part>,
    ) -> Episode {
        let full = Episode {
            rating_key: self.key("episode"),
            show_title: show.title.clone(),
            season_index: season.index,
            index: Some(index),
            media: vec![Media { parts }],
        };
        let listed = Episode {
            media: Vec::new(),
            ..full.clone()
        };
        self.listings
            .entry(season.rating_key.clone())
            .or_default()
            .push(listed);
        self.state
            .lock()
            .unwrap()
            .insert(full.rating_key.clone(), full.clone());
        full
    }

    pub fn fail_seasons(&mut self, show: &Show, message: &str) {
        self.season_failures
            .insert(show.rating_key.clone(), message.to_string());
    }

    pub fn fail_reload(&mut self, episode: &Episode, message: &str) {
        self.reload_failures
            .insert(episode.rating_key.clone(), message.to_string());
    }

    /// Drop the episode index from the server-side state
    pub fn clear_index(&mut self, episode: &Episode) {
        if let Some(stored) = self.state.lock().unwrap().get_mut(&episode.rating_key) {
            stored.index = None;
        }
    }

    pub fn delay_show(&mut self, show: &Show, delay: Duration) {
        self.delays.insert(show.rating_key.clone(), delay);
    }

    pub fn writes(&self) -> Vec<WriteBack> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Highest number of shows seen in flight at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Current server-side state of an episode
    pub fn episode_state(&self, episode: &Episode) -> Episode {
        self.state.lock().unwrap()[&episode.rating_key].clone()
    }

    fn apply_write(&self, part_id: u64, stream: &StreamDescriptor) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let part = state
            .values_mut()
            .flat_map(|e| e.media.iter_mut())
            .flat_map(|m| m.parts.iter_mut())
            .find(|p| p.id == part_id)
            .ok_or_else(|| anyhow!("Not found: /library/parts/{}", part_id))?;

        let streams = match stream.kind {
            StreamKind::Audio => &mut part.audio_streams,
            StreamKind::Subtitle => &mut part.subtitle_streams,
        };
        for s in streams.iter_mut() {
            s.selected = s.id == stream.id;
        }

        self.writes.lock().unwrap().push(WriteBack {
            part_id,
            kind: stream.kind,
            stream_id: stream.id,
        });
        Ok(())
    }
}

impl LibraryService for FakeLibrary {
    async fn seasons(&self, show: &Show) -> Result<Vec<Season>> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&show.rating_key) {
            tokio::time::sleep(*delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.season_failures.get(&show.rating_key) {
            return Err(anyhow!("{}", message));
        }
        Ok(self
            .seasons
            .get(&show.rating_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn episodes(&self, season: &Season) -> Result<Vec<Episode>> {
        Ok(self
            .listings
            .get(&season.rating_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn reload(&self, episode: &Episode) -> Result<Episode> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.reload_failures.get(&episode.rating_key) {
            return Err(anyhow!("{}", message));
        }
        self.state
            .lock()
            .unwrap()
            .get(&episode.rating_key)
            .cloned()
            .ok_or_else(|| anyhow!("Not found: episode {}", episode.rating_key))
    }

    async fn select_audio_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()> {
        self.apply_write(part.id, stream)
    }

    async fn select_subtitle_stream(&self, part: &Part, stream: &StreamDescriptor) -> Result<()> {
        self.apply_write(part.id, stream)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn prefs() -> StreamPreferences {
    StreamPreferences {
        audio_language: "Japanese".to_string(),
        subtitle_language: "French".to_string(),
        forced_markers: vec!["forced".to_string(), "forcé".to_string()],
    }
}

pub fn part(id: u64, audio: Vec<StreamDescriptor>, subtitles: Vec<StreamDescriptor>) -> Part {
    Part {
        id,
        audio_streams: audio,
        subtitle_streams: subtitles,
    }
}

/// Part with Japanese audio and French subtitles already selected
pub fn settled_part(id: u64) -> Part {
    part(
        id,
        vec![
            StreamDescriptor::audio(id * 10 + 1, "English", false),
            StreamDescriptor::audio(id * 10 + 2, "Japanese", true),
        ],
        vec![StreamDescriptor::subtitle(id * 10 + 3, "French", "French (SRT)", true)],
    )
}

/// Part playing English audio with no subtitle
pub fn unsettled_part(id: u64) -> Part {
    part(
        id,
        vec![
            StreamDescriptor::audio(id * 10 + 1, "English", true),
            StreamDescriptor::audio(id * 10 + 2, "Japanese", false),
        ],
        vec![StreamDescriptor::subtitle(id * 10 + 3, "French", "French (SRT)", false)],
    )
}
