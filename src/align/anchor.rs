//! C3: locates the highest-confidence initial match pair to seed the walk.

use crate::chunk::Track;
use crate::config::AlignerConfig;
use crate::error::AlignError;
use crate::phoneme::SimilarityEngine;

const MAX_ANCHOR_CANDIDATES: usize = 10;

/// The seed pair the path walker starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub i: usize,
    pub j: usize,
    pub score: f64,
}

/// Locates the best anchor per §4.3: scan the first `min(N1, 10)` matchable
/// track1 chunks, collect track2 candidates within the search window,
/// widen the window once if nothing clears the threshold, then fail.
pub fn find_anchor(
    track1: &Track,
    track2: &Track,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
) -> Result<Anchor, AlignError> {
    let k = track1.len().min(MAX_ANCHOR_CANDIDATES);
    let mut window = config.initial_search_window_seconds;

    for _attempt in 0..2 {
        if let Some(anchor) = best_within_window(track1, track2, engine, config, k, window) {
            return Ok(anchor);
        }
        window *= 2.0;
    }

    Err(AlignError::NoAnchorFound)
}

fn best_within_window(
    track1: &Track,
    track2: &Track,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
    k: usize,
    window: f64,
) -> Option<Anchor> {
    let mut best: Option<Anchor> = None;

    for i in 0..k {
        let chunk1 = &track1.chunks[i];
        if !chunk1.is_matchable() {
            continue;
        }
        let lo = chunk1.start - window;
        let hi = chunk1.start + window;
        let start_j = track2.lower_bound_by_start(lo);

        for j in start_j..track2.len() {
            let chunk2 = &track2.chunks[j];
            if chunk2.start > hi {
                break;
            }
            if !chunk2.is_matchable() {
                continue;
            }
            let score = engine.sim(i, j);
            if score < config.phonetic_similarity_threshold {
                continue;
            }
            let candidate = Anchor { i, j, score };
            best = Some(match best {
                None => candidate,
                Some(current) => pick_better(current, candidate, track1, track2),
            });
        }
    }

    best
}

/// Tie-break order from §4.3 step 5: higher score, then smaller `|Δ|`,
/// then smaller `i`, then smaller `j`.
fn pick_better(current: Anchor, candidate: Anchor, track1: &Track, track2: &Track) -> Anchor {
    if candidate.score > current.score {
        return candidate;
    }
    if candidate.score < current.score {
        return current;
    }

    let current_delta = delta(current, track1, track2).abs();
    let candidate_delta = delta(candidate, track1, track2).abs();
    if candidate_delta < current_delta {
        return candidate;
    }
    if candidate_delta > current_delta {
        return current;
    }

    if candidate.i < current.i {
        return candidate;
    }
    if candidate.i > current.i {
        return current;
    }

    if candidate.j < current.j {
        candidate
    } else {
        current
    }
}

fn delta(anchor: Anchor, track1: &Track, track2: &Track) -> f64 {
    track2.chunks[anchor.j].start - track1.chunks[anchor.i].start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn chunk(start: f64, phonemes: &str) -> Chunk {
        Chunk::new(start, start + 1.0, "", phonemes.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn finds_anchor_on_identical_tracks() {
        let track1 = Track::new(vec![
            chunk(0.0, "HH AH L OW"),
            chunk(2.0, "W ER L D"),
        ]);
        let track2 = track1.clone();
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&track1, &track2, &config);
        let anchor = find_anchor(&track1, &track2, &engine, &config).unwrap();
        assert_eq!(anchor.i, 0);
        assert_eq!(anchor.j, 0);
        assert_eq!(anchor.score, 1.0);
    }

    #[test]
    fn widens_window_once_before_failing() {
        let track1 = Track::new(vec![chunk(0.0, "HH AH L OW")]);
        let track2 = Track::new(vec![chunk(500.0, "HH AH L OW")]);
        let config = AlignerConfig::default().with_initial_search_window_seconds(10.0);
        let engine = SimilarityEngine::new(&track1, &track2, &config);
        // 500s is outside even the widened (20s) window.
        let err = find_anchor(&track1, &track2, &engine, &config).unwrap_err();
        assert_eq!(err.reason_code(), "no_anchor_found");
    }

    #[test]
    fn disjoint_phonemes_find_no_anchor() {
        let track1 = Track::new(vec![chunk(0.0, "AA"), chunk(1.0, "AA")]);
        let track2 = Track::new(vec![chunk(0.0, "IY"), chunk(1.0, "IY")]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&track1, &track2, &config);
        let err = find_anchor(&track1, &track2, &engine, &config).unwrap_err();
        assert_eq!(err.reason_code(), "no_anchor_found");
    }

    #[test]
    fn skips_non_matchable_chunks() {
        let track1 = Track::new(vec![
            Chunk::new(0.0, 1.0, "", vec![]),
            chunk(2.0, "HH AH L OW"),
        ]);
        let track2 = Track::new(vec![chunk(2.0, "HH AH L OW")]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&track1, &track2, &config);
        let anchor = find_anchor(&track1, &track2, &engine, &config).unwrap();
        assert_eq!(anchor.i, 1);
    }
}
