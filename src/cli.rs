//! CLI - Command Line Interface for plexsubsync
//!
//! A single pass over one library. Every flag is optional and overrides the
//! matching environment variable or config file entry.
//!
//! # Examples
//!
//! ```bash
//! # Use PLEX_URL / PLEX_TOKEN from the environment
//! plexsubsync
//!
//! # Another library and language pair
//! plexsubsync --library "TV Shows" --audio-lang English --sub-lang Spanish
//!
//! # More concurrent shows, with request logging
//! plexsubsync --max-workers 10 --verbose
//! ```

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::report::{ShowReport, COMPLETION_MESSAGE};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for the process (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run finished, including runs where some shows failed
    Success = 0,
    /// General error
    Error = 1,
    /// Missing or invalid configuration
    InvalidConfig = 2,
    /// Server unreachable, bad token or unknown library
    ConnectionError = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// plexsubsync - select preferred audio and subtitle streams on Plex
#[derive(Parser, Debug, Default)]
#[command(
    name = "plexsubsync",
    version,
    about = "Select preferred audio and subtitle streams across a Plex library",
    long_about = "Walks every episode of a Plex library and selects the preferred \
                  audio language and the preferred (non-forced) subtitle language \
                  when they are not already active.\n\n\
                  Settings come from a config file, then environment variables \
                  (PLEX_URL, PLEX_TOKEN, PLEX_LIBRARY, AUDIO_LANG, SUB_LANG, MAX_WORKERS), \
                  then these flags."
)]
pub struct Cli {
    /// Plex server URL (overrides PLEX_URL)
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Plex token (overrides PLEX_TOKEN)
    #[arg(long, short = 't')]
    pub token: Option<String>,

    /// Library section to scan (overrides PLEX_LIBRARY)
    #[arg(long, short = 'l')]
    pub library: Option<String>,

    /// Preferred audio language (overrides AUDIO_LANG)
    #[arg(long, short = 'a')]
    pub audio_lang: Option<String>,

    /// Preferred subtitle language (overrides SUB_LANG)
    #[arg(long, short = 's')]
    pub sub_lang: Option<String>,

    /// Number of shows processed concurrently (overrides MAX_WORKERS)
    #[arg(long, short = 'w')]
    pub max_workers: Option<usize>,

    /// Subtitle title marker for forced tracks (repeatable, replaces defaults)
    #[arg(long = "forced-marker", value_name = "TEXT")]
    pub forced_markers: Vec<String>,

    /// Path to config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log requests and decisions to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Do not print "No changes" lines
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Default tracing filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "plexsubsync=debug"
        } else {
            "warn"
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Writes show reports as they arrive, then the completion line
pub struct Output<W: Write> {
    writer: W,
    quiet: bool,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W, quiet: bool) -> Self {
        Self { writer, quiet }
    }

    /// Print one show report (unchanged shows are skipped in quiet mode)
    pub fn report(&mut self, report: &ShowReport) -> io::Result<()> {
        if self.quiet && matches!(report, ShowReport::Unchanged { .. }) {
            return Ok(());
        }
        writeln!(self.writer, "{}", report)?;
        self.writer.flush()
    }

    /// Print the final line once every show is done
    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", COMPLETION_MESSAGE)?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// =============================================================================
// Tests
// =============================================================================
