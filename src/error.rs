//! Typed failure modes for a single alignment call.
//!
//! Grounded on `A-U-Supply-glottisdale/crates/core`'s use of `thiserror` for
//! a non-panicking computational core, rather than the hand-rolled
//! `Display`-only error string the `flowalyzer` teacher uses for its
//! scaffolding-stage pronunciation module.

use thiserror::Error;

use crate::align::Path;

/// Failure returned by [`crate::align`] when an alignment cannot be produced.
///
/// Each variant corresponds to one of the `reason` values in the aligner's
/// external contract; [`AlignError::reason_code`] recovers that string for
/// hosts that still need to speak the `{reason}` vocabulary literally.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Either track was empty, timestamps were not non-decreasing, a
    /// timestamp was negative, or the configuration was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The anchor search (and its one widened retry) found no candidate
    /// pair meeting `phonetic_similarity_threshold`.
    #[error("no anchor found within the configured search window")]
    NoAnchorFound,

    /// The walker terminated but the resulting path is shorter than
    /// `min_path_length`. The incomplete path is retained for diagnostics.
    #[error("path too short: {} points, need at least {min_required}", path.len())]
    PathTooShort { path: Path, min_required: usize },

    /// The sample standard deviation of the (outlier-filtered) offsets
    /// exceeded `offset_consistency_threshold_sd`.
    #[error("offset inconsistent: sd {sd:.4} exceeds threshold {threshold:.4} (median {median:.4})")]
    OffsetInconsistent {
        median: f64,
        sd: f64,
        threshold: f64,
    },
}

impl AlignError {
    /// Recovers the `reason` string named in the aligner's external contract.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AlignError::InvalidInput(_) => "invalid_input",
            AlignError::NoAnchorFound => "no_anchor_found",
            AlignError::PathTooShort { .. } => "path_too_short",
            AlignError::OffsetInconsistent { .. } => "offset_inconsistent",
        }
    }
}
