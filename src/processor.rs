//! Show processing
//!
//! Walks show → season → episode through a [`LibraryService`], applies the
//! selection decisions to every part and turns the outcome of a whole show
//! into a [`ShowReport`]. Errors stop the show they happen in and end up in
//! its report; they never escape [`process_show`].

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use tracing::debug;

use crate::library::LibraryService;
use crate::models::{Episode, Season, Show};
use crate::report::{EpisodeChange, ShowReport};
use crate::selection::{decide_stream_update, NO_EXCLUSIONS};

/// Languages to enforce and subtitle titles to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPreferences {
    pub audio_language: String,
    pub subtitle_language: String,
    /// Substrings marking forced subtitles
    pub forced_markers: Vec<String>,
}

/// Reload an episode and select the preferred streams on each of its parts.
///
/// Returns a change notice when at least one stream was switched.
pub async fn update_episode<S: LibraryService>(
    service: &S,
    episode: &Episode,
    prefs: &StreamPreferences,
) -> Result<Option<EpisodeChange>> {
    let episode = service
        .reload(episode)
        .await
        .with_context(|| format!("failed to reload {}", episode))?;

    let mut changed = false;

    for part in episode.parts() {
        if let Some(audio) =
            decide_stream_update(&part.audio_streams, &prefs.audio_language, NO_EXCLUSIONS)
        {
            debug!("{}: part {} -> audio {}", episode, part.id, audio);
            service.select_audio_stream(part, audio).await?;
            changed = true;
        }

        if let Some(subtitle) = decide_stream_update(
            &part.subtitle_streams,
            &prefs.subtitle_language,
            prefs.forced_markers.as_slice(),
        ) {
            debug!("{}: part {} -> subtitle {}", episode, part.id, subtitle);
            service.select_subtitle_stream(part, subtitle).await?;
            changed = true;
        }
    }

    if !changed {
        return Ok(None);
    }

    match (episode.season_index, episode.index) {
        (Some(season_index), Some(episode_index)) => Ok(Some(EpisodeChange {
            show_title: episode.show_title.clone(),
            season_index,
            episode_index,
            at: Local::now(),
        })),
        _ => Err(anyhow!(
            "episode {} has no season or episode index",
            episode.rating_key
        )),
    }
}

/// Update every episode of a season, in server order
pub async fn process_season<S: LibraryService>(
    service: &S,
    season: &Season,
    prefs: &StreamPreferences,
) -> Result<Vec<EpisodeChange>> {
    let episodes = service.episodes(season).await?;
    debug!("{}: {} episodes", season.title, episodes.len());

    let mut changes = Vec::new();
    for episode in episodes {
        if let Some(change) = update_episode(service, &episode, prefs).await? {
            changes.push(change);
        }
    }
    Ok(changes)
}

async fn collect_changes<S: LibraryService>(
    service: &S,
    show: &Show,
    prefs: &StreamPreferences,
) -> Result<Vec<EpisodeChange>> {
    let mut changes = Vec::new();
    for season in service.seasons(show).await? {
        changes.extend(process_season(service, &season, prefs).await?);
    }
    Ok(changes)
}

/// Process a whole show and report its outcome.
///
/// Never fails: an error anywhere in the show becomes [`ShowReport::Failed`]
/// and the remaining episodes of that show are skipped.
pub async fn process_show<S: LibraryService>(
    service: &S,
    show: &Show,
    prefs: &StreamPreferences,
) -> ShowReport {
    let title = show.title.clone();
    match collect_changes(service, show, prefs).await {
        Ok(changes) if changes.is_empty() => ShowReport::Unchanged {
            title,
            at: Local::now(),
        },
        Ok(changes) => ShowReport::Changed {
            title,
            changes,
            finished_at: Local::now(),
        },
        Err(e) => ShowReport::Failed {
            title,
            error: format!("{:#}", e),
            at: Local::now(),
        },
    }
}
