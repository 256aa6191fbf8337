//! Report lines printed to stdout
//!
//! Every outcome is a plain text line of the form
//! `<timestamp> [<SEVERITY>] - <message>`. Timestamps are taken when the
//! event happens, not when the line is printed.

use chrono::{DateTime, Local};
use std::fmt;

/// Timestamp format used on every report line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Message printed once every show has been processed
pub const COMPLETION_MESSAGE: &str = "Update completed for all shows!";

/// Severity tag embedded in a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Format one report line
pub fn log_line(at: &DateTime<Local>, severity: Severity, message: impl fmt::Display) -> String {
    format!("{} [{}] - {}", at.format(TIMESTAMP_FORMAT), severity, message)
}

/// Notice that an episode's stream selection was altered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeChange {
    pub show_title: String,
    pub season_index: u32,
    pub episode_index: u32,
    pub at: DateTime<Local>,
}

impl fmt::Display for EpisodeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = format!(
            "{} S{:02}E{:02} changed",
            self.show_title, self.season_index, self.episode_index
        );
        write!(f, "{}", log_line(&self.at, Severity::Info, message))
    }
}

/// Outcome of processing one show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowReport {
    /// At least one episode changed
    Changed {
        title: String,
        changes: Vec<EpisodeChange>,
        finished_at: DateTime<Local>,
    },
    /// Every episode already had the wanted streams
    Unchanged { title: String, at: DateTime<Local> },
    /// Processing stopped on an error
    Failed {
        title: String,
        error: String,
        at: DateTime<Local>,
    },
}

impl ShowReport {
    pub fn title(&self) -> &str {
        match self {
            ShowReport::Changed { title, .. }
            | ShowReport::Unchanged { title, .. }
            | ShowReport::Failed { title, .. } => title,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ShowReport::Failed { .. })
    }

    /// Number of changed episodes
    pub fn change_count(&self) -> usize {
        match self {
            ShowReport::Changed { changes, .. } => changes.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for ShowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowReport::Changed {
                title,
                changes,
                finished_at,
            } => {
                for change in changes {
                    writeln!(f, "{}", change)?;
                }
                write!(
                    f,
                    "{}",
                    log_line(finished_at, Severity::Info, format!("{} - DONE", title))
                )
            }
            ShowReport::Unchanged { title, at } => write!(
                f,
                "{}",
                log_line(at, Severity::Info, format!("{} - No changes", title))
            ),
            ShowReport::Failed { title, error, at } => write!(
                f,
                "{}",
                log_line(at, Severity::Error, format!("{} - {}", title, error))
            ),
        }
    }
}
