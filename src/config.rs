//! Aligner configuration, mirroring the teacher's `SessionConfig` /
//! `AlignmentWeights` pattern: a `Default` carrying every numeric default
//! from the facade's contract, plus validating `with_*` builder setters.

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Tunable thresholds for one [`crate::align`] call.
///
/// A closed struct with no passthrough map: there is no key space for an
/// "unknown key" to occupy, which is how this crate satisfies the external
/// contract's requirement that unknown configuration keys be rejected.
/// `#[serde(deny_unknown_fields)]` still makes that rejection explicit for
/// hosts that deserialize a config from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AlignerConfig {
    /// Minimum similarity score for a direct match.
    pub phonetic_similarity_threshold: f64,
    /// Minimum similarity score for a smear candidate probe.
    pub smear_similarity_threshold: f64,
    /// Half-width of the anchor search window, in seconds.
    pub initial_search_window_seconds: f64,
    /// Minimum accepted path length.
    pub min_path_length: usize,
    /// Maximum consecutive non-appending gap advances.
    pub max_consecutive_gaps: usize,
    /// Score penalty subtracted from the running path score per gap step.
    pub gap_penalty: f64,
    /// Similarity penalty applied when both chunks have speakers that
    /// differ. Defaults to 0.5 when both tracks carry speaker metadata,
    /// else 0.0 -- see [`AlignerConfig::for_tracks`].
    pub speaker_mismatch_penalty: f64,
    /// Maximum tolerated sample standard deviation of retained offsets.
    pub offset_consistency_threshold_sd: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            phonetic_similarity_threshold: 0.7,
            smear_similarity_threshold: 0.5,
            initial_search_window_seconds: 120.0,
            min_path_length: 5,
            max_consecutive_gaps: 2,
            gap_penalty: 0.1,
            speaker_mismatch_penalty: 0.5,
            offset_consistency_threshold_sd: 0.5,
        }
    }
}

impl AlignerConfig {
    /// Builds a config whose `speaker_mismatch_penalty` follows §4.6: 0.5
    /// when both tracks carry at least one chunk with a speaker, else 0.0.
    pub fn for_tracks(track1_has_speakers: bool, track2_has_speakers: bool) -> Self {
        let mut config = Self::default();
        if !(track1_has_speakers && track2_has_speakers) {
            config.speaker_mismatch_penalty = 0.0;
        }
        config
    }

    pub fn with_phonetic_similarity_threshold(mut self, value: f64) -> Self {
        self.phonetic_similarity_threshold = value;
        self
    }

    pub fn with_smear_similarity_threshold(mut self, value: f64) -> Self {
        self.smear_similarity_threshold = value;
        self
    }

    pub fn with_initial_search_window_seconds(mut self, value: f64) -> Self {
        self.initial_search_window_seconds = value;
        self
    }

    pub fn with_min_path_length(mut self, value: usize) -> Self {
        self.min_path_length = value;
        self
    }

    pub fn with_max_consecutive_gaps(mut self, value: usize) -> Self {
        self.max_consecutive_gaps = value;
        self
    }

    pub fn with_gap_penalty(mut self, value: f64) -> Self {
        self.gap_penalty = value;
        self
    }

    pub fn with_speaker_mismatch_penalty(mut self, value: f64) -> Self {
        self.speaker_mismatch_penalty = value;
        self
    }

    pub fn with_offset_consistency_threshold_sd(mut self, value: f64) -> Self {
        self.offset_consistency_threshold_sd = value;
        self
    }

    /// Validates that every threshold is in a sane range. Called by the
    /// aligner facade before a walk is attempted.
    pub fn validate(&self) -> Result<(), AlignError> {
        let checks: &[(bool, &str)] = &[
            (
                (0.0..=1.0).contains(&self.phonetic_similarity_threshold),
                "phonetic_similarity_threshold must be in [0, 1]",
            ),
            (
                (0.0..=1.0).contains(&self.smear_similarity_threshold),
                "smear_similarity_threshold must be in [0, 1]",
            ),
            (
                self.smear_similarity_threshold <= self.phonetic_similarity_threshold,
                "smear_similarity_threshold must not exceed phonetic_similarity_threshold",
            ),
            (
                self.initial_search_window_seconds > 0.0,
                "initial_search_window_seconds must be positive",
            ),
            (self.min_path_length >= 1, "min_path_length must be at least 1"),
            (self.gap_penalty >= 0.0, "gap_penalty must be non-negative"),
            (
                (0.0..=1.0).contains(&self.speaker_mismatch_penalty),
                "speaker_mismatch_penalty must be in [0, 1]",
            ),
            (
                self.offset_consistency_threshold_sd > 0.0,
                "offset_consistency_threshold_sd must be positive",
            ),
        ];
        for (ok, message) in checks {
            if !ok {
                return Err(AlignError::InvalidInput(message.to_string()));
            }
        }
        Ok(())
    }
}
