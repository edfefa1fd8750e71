//! The caller-supplied data model: one subtitle utterance (`Chunk`) and an
//! ordered sequence of them (`Track`).
//!
//! Chunks are owned by the caller; the core only ever borrows them for the
//! duration of one [`crate::align`] call.

use serde::{Deserialize, Serialize};

/// One subtitle utterance: timing, opaque display text, and the phoneme
/// sequence a "wrangler" stage (out of scope here) has already produced for
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Start time in seconds, non-negative.
    pub start: f64,
    /// End time in seconds, `>= start`.
    pub end: f64,
    /// Display text. Ignored by the core; carried for diagnostics only.
    pub text: String,
    /// Ordered phoneme symbols (e.g. ARPABET without stress digits). An
    /// empty sequence marks the chunk as non-matchable: it can only be
    /// traversed as a gap.
    pub phonemes: Vec<String>,
    /// Opaque speaker identifier, if the wrangler supplied one.
    #[serde(default)]
    pub speaker: Option<String>,
}

impl Chunk {
    /// Convenience constructor for an unattributed chunk.
    pub fn new(start: f64, end: f64, text: impl Into<String>, phonemes: Vec<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            phonemes,
            speaker: None,
        }
    }

    /// Attaches a speaker identifier, builder-style.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// A chunk is matchable only if it carries at least one phoneme.
    pub fn is_matchable(&self) -> bool {
        !self.phonemes.is_empty()
    }

    /// Returns this chunk shifted in time by `delta_seconds`. Used by tests
    /// exercising the constant-shift-recoverability property, and available
    /// to hosts that want to preview a candidate offset.
    pub fn shifted(&self, delta_seconds: f64) -> Self {
        Self {
            start: self.start + delta_seconds,
            end: self.end + delta_seconds,
            ..self.clone()
        }
    }
}

/// An ordered sequence of chunks with non-decreasing `start` times.
///
/// `Track` does not enforce the invariant itself (validation happens once,
/// at the aligner facade boundary in [`crate::align`]) so that callers can
/// freely construct intermediate or exploratory tracks without going
/// through a fallible constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub chunks: Vec<Chunk>,
}

impl Track {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// True iff `start` is non-decreasing across the whole track.
    pub fn is_time_monotonic(&self) -> bool {
        self.chunks
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start)
    }

    /// True iff every chunk has a non-negative start and `end >= start`.
    pub fn has_valid_timestamps(&self) -> bool {
        self.chunks.iter().all(|c| c.start >= 0.0 && c.end >= c.start)
    }

    /// Returns a copy of this track with every chunk shifted by
    /// `delta_seconds`. Used to build constant-shift fixtures in tests.
    pub fn shifted(&self, delta_seconds: f64) -> Self {
        Self {
            chunks: self.chunks.iter().map(|c| c.shifted(delta_seconds)).collect(),
        }
    }

    /// Binary search for the first index whose `start >= target`, used by
    /// the anchor finder (C3) to window-query track2 by time in O(log N).
    pub fn lower_bound_by_start(&self, target: f64) -> usize {
        self.chunks.partition_point(|c| c.start < target)
    }
}

impl FromIterator<Chunk> for Track {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}
