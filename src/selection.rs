//! Stream selection decisions
//!
//! Pure logic: given the streams of one part and a wanted language, decide
//! whether the server's selection has to change. No I/O happens here, the
//! caller performs the write-back.
//!
//! The first stream matching the wanted language wins. Once found, the search
//! stops, even if a later matching stream is the one currently selected.

use crate::models::StreamDescriptor;

/// Default substrings marking forced subtitle tracks
pub const DEFAULT_FORCED_MARKERS: &[&str] = &["forced", "forcé"];

/// Exclusion set for audio streams
pub const NO_EXCLUSIONS: &[&str] = &[];

/// Outcome of scanning a stream list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// The candidate is not selected yet and must be written back
    Select(&'a StreamDescriptor),
    /// The candidate is already the active stream
    AlreadySelected(&'a StreamDescriptor),
    /// No stream matches the wanted language
    NoMatch,
}

impl<'a> Decision<'a> {
    /// Stream to write back, if any
    pub fn into_update(self) -> Option<&'a StreamDescriptor> {
        match self {
            Decision::Select(stream) => Some(stream),
            Decision::AlreadySelected(_) | Decision::NoMatch => None,
        }
    }
}

/// Check whether a stream's title carries one of the excluded markers
pub fn is_excluded<S: AsRef<str>>(stream: &StreamDescriptor, exclude_substrings: &[S]) -> bool {
    exclude_substrings
        .iter()
        .any(|marker| stream.extended_title.contains(marker.as_ref()))
}

/// Scan streams in order and classify the first eligible one
pub fn find_candidate<'a, S: AsRef<str>>(
    streams: &'a [StreamDescriptor],
    want_language: &str,
    exclude_substrings: &[S],
) -> Decision<'a> {
    let candidate = streams
        .iter()
        .find(|s| s.has_language(want_language) && !is_excluded(s, exclude_substrings));

    match candidate {
        Some(stream) if stream.selected => Decision::AlreadySelected(stream),
        Some(stream) => Decision::Select(stream),
        None => Decision::NoMatch,
    }
}

/// Decide which stream, if any, has to be selected on the server.
///
/// Returns `None` both when nothing matches and when the matching stream is
/// already selected, so applying the result twice never writes twice.
pub fn decide_stream_update<'a, S: AsRef<str>>(
    streams: &'a [StreamDescriptor],
    want_language: &str,
    exclude_substrings: &[S],
) -> Option<&'a StreamDescriptor> {
    find_candidate(streams, want_language, exclude_substrings).into_update()
}
