//! C6: the aligner facade. Validates inputs, applies configuration
//! defaults, and composes anchor search (C3) → path walk (C4) → offset
//! estimation (C5) into a single [`align`] entry point.
//!
//! Grounded on `pronunciation::run_session`'s validate-then-compose shape
//! (`validate_config` followed by delegating to the runtime), generalized
//! from a session bootstrap to a synchronous, side-effect-free alignment.

pub mod anchor;
pub mod offset;
pub mod walker;

use tracing::{debug, info, warn};

use crate::chunk::Track;
use crate::config::AlignerConfig;
use crate::error::AlignError;
use crate::phoneme::SimilarityEngine;

/// How a [`MatchPoint`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A single track1 chunk matched a single track2 chunk directly.
    Direct,
    /// One track1 chunk matched a contiguous run of track2 chunks.
    Smear1ToN,
    /// A contiguous run of track1 chunks matched one track2 chunk.
    SmearNTo1,
}

/// One point on the alignment path.
///
/// For `Direct` and `Smear1ToN` matches, `i_start == i_end` (per §3, "the
/// range in track1 is a single index"); `Smear1ToN`/`SmearNTo1` differ in
/// which side carries the wider `[start, end]` span. `i_start`/`j_start`
/// are always the reference indices used for offset computation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPoint {
    pub i_start: usize,
    pub i_end: usize,
    pub j_start: usize,
    pub j_end: usize,
    pub score: f64,
    pub kind: MatchKind,
}

impl MatchPoint {
    fn direct(i: usize, j: usize, score: f64) -> Self {
        Self {
            i_start: i,
            i_end: i,
            j_start: j,
            j_end: j,
            score,
            kind: MatchKind::Direct,
        }
    }

    /// Reference index into track1 for offset computation.
    pub fn i_ref(&self) -> usize {
        self.i_start
    }

    /// Reference index into track2 for offset computation.
    pub fn j_ref(&self) -> usize {
        self.j_start
    }
}

/// Ordered sequence of match points satisfying the monotonicity invariants
/// described in §3.
pub type Path = Vec<MatchPoint>;

/// Successful alignment of `track2` onto `track1`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutcome {
    /// Seconds to add to track1 timestamps (or subtract from track2's) to
    /// bring the two tracks into alignment.
    pub offset_seconds: f64,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// The match path the estimate was derived from.
    pub path: Path,
}

/// Estimates the temporal offset between `track1` and `track2`.
///
/// This is the sole entry point of the core: it validates inputs, applies
/// `config`, and composes the anchor finder (C3), path walker (C4), and
/// offset estimator (C5). It never panics on well-typed input; malformed
/// input is reported as [`AlignError::InvalidInput`].
pub fn align(
    track1: &Track,
    track2: &Track,
    config: &AlignerConfig,
) -> Result<AlignmentOutcome, AlignError> {
    debug!(
        track1_len = track1.len(),
        track2_len = track2.len(),
        phonetic_similarity_threshold = config.phonetic_similarity_threshold,
        min_path_length = config.min_path_length,
        "aligning tracks"
    );

    validate(track1, track2, config)?;

    let engine = SimilarityEngine::new(track1, track2, config);

    let found = anchor::find_anchor(track1, track2, &engine, config).map_err(|err| {
        warn!(reason = %err.reason_code(), "anchor search failed");
        err
    })?;
    info!(i = found.i, j = found.j, score = found.score, "anchor found");

    let walked = walker::walk(track1, track2, found, &engine, config);
    debug!(
        path_len = walked.path.len(),
        gap_penalty_total = walked.gap_penalty_total,
        "walk terminated"
    );

    let outcome = offset::estimate(walked, track1, track2, config).map_err(|err| {
        warn!(reason = %err.reason_code(), "offset estimation failed");
        err
    })?;
    info!(
        offset_seconds = outcome.offset_seconds,
        confidence = outcome.confidence,
        path_len = outcome.path.len(),
        "alignment succeeded"
    );
    Ok(outcome)
}

fn validate(track1: &Track, track2: &Track, config: &AlignerConfig) -> Result<(), AlignError> {
    config.validate()?;
    if track1.is_empty() || track2.is_empty() {
        return Err(AlignError::InvalidInput(
            "both tracks must contain at least one chunk".to_string(),
        ));
    }
    if !track1.has_valid_timestamps() || !track2.has_valid_timestamps() {
        return Err(AlignError::InvalidInput(
            "chunk timestamps must be non-negative with end >= start".to_string(),
        ));
    }
    if !track1.is_time_monotonic() || !track2.is_time_monotonic() {
        return Err(AlignError::InvalidInput(
            "chunk start times must be non-decreasing within a track".to_string(),
        ));
    }
    Ok(())
}
