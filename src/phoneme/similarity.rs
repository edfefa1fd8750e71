//! C2: length-aware, speaker-penalized similarity kernel over two tracks,
//! memoized for the lifetime of a single alignment call.
//!
//! Grounded on `pronunciation::alignment::dtw::similarity_from_cost` for the
//! idea of deriving a bounded similarity from a distance metric, generalized
//! here to the length-normalization and speaker-penalty rules this spec
//! requires and to per-call memoization (the teacher has no cache; nothing
//! in its DTW table is recomputed across calls because each frame pair is
//! visited once).

use std::cell::RefCell;
use std::collections::HashMap;

use crate::chunk::Track;
use crate::config::AlignerConfig;
use crate::phoneme::distance::phoneme_distance;

/// Which side was merged to produce a smear candidate's phoneme sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeSide {
    /// Track1 chunk `i` against a merged run of track2 chunks `[j_a, j_b]`.
    Track2,
    /// A merged run of track1 chunks `[i_a, i_b]` against track2 chunk `j`.
    Track1,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Direct(usize, usize),
    Merged(usize, usize, usize, MergeSide),
}

/// Computes [0,1] similarity between chunks of `track1` and `track2`,
/// caching every result computed so far. Scoped to one alignment call.
pub struct SimilarityEngine<'a> {
    track1: &'a Track,
    track2: &'a Track,
    config: &'a AlignerConfig,
    cache: RefCell<HashMap<CacheKey, f64>>,
}

impl<'a> SimilarityEngine<'a> {
    pub fn new(track1: &'a Track, track2: &'a Track, config: &'a AlignerConfig) -> Self {
        Self {
            track1,
            track2,
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// `sim(i, j)` per §4.2: 0 if either side is empty-phoneme, else a
    /// length- and speaker-adjusted similarity in [0, 1].
    pub fn sim(&self, i: usize, j: usize) -> f64 {
        if let Some(&cached) = self.cache.borrow().get(&CacheKey::Direct(i, j)) {
            return cached;
        }
        let chunk1 = &self.track1.chunks[i];
        let chunk2 = &self.track2.chunks[j];
        let score = self.score_pair(&chunk1.phonemes, &chunk2.phonemes, &chunk1.speaker, &chunk2.speaker);
        self.cache.borrow_mut().insert(CacheKey::Direct(i, j), score);
        score
    }

    /// `sim_merged(i, [j_a..=j_b])`: track1 chunk `i` against the
    /// concatenated phoneme sequence of track2 chunks `j_a..=j_b`.
    pub fn sim_merged_track2(&self, i: usize, j_a: usize, j_b: usize) -> f64 {
        let key = CacheKey::Merged(i, j_a, j_b, MergeSide::Track2);
        if let Some(&cached) = self.cache.borrow().get(&key) {
            return cached;
        }
        let chunk1 = &self.track1.chunks[i];
        let merged_phonemes = self.concat_phonemes(self.track2, j_a, j_b);
        let merged_speaker = self.merged_speaker(self.track2, j_a, j_b);
        let score = self.score_pair(&chunk1.phonemes, &merged_phonemes, &chunk1.speaker, &merged_speaker);
        self.cache.borrow_mut().insert(key, score);
        score
    }

    /// Symmetric counterpart: merged track1 chunks `i_a..=i_b` against
    /// track2 chunk `j`.
    pub fn sim_merged_track1(&self, i_a: usize, i_b: usize, j: usize) -> f64 {
        let key = CacheKey::Merged(i_a, i_b, j, MergeSide::Track1);
        if let Some(&cached) = self.cache.borrow().get(&key) {
            return cached;
        }
        let chunk2 = &self.track2.chunks[j];
        let merged_phonemes = self.concat_phonemes(self.track1, i_a, i_b);
        let merged_speaker = self.merged_speaker(self.track1, i_a, i_b);
        let score = self.score_pair(&merged_phonemes, &chunk2.phonemes, &merged_speaker, &chunk2.speaker);
        self.cache.borrow_mut().insert(key, score);
        score
    }

    fn concat_phonemes(&self, track: &Track, a: usize, b: usize) -> Vec<String> {
        track.chunks[a..=b]
            .iter()
            .flat_map(|c| c.phonemes.iter().cloned())
            .collect()
    }

    /// A merged run's speaker is the first present speaker across it, if
    /// any -- speaker identity is opaque, so any one representative symbol
    /// is sufficient for the mismatch check.
    fn merged_speaker(&self, track: &Track, a: usize, b: usize) -> Option<String> {
        track.chunks[a..=b]
            .iter()
            .find_map(|c| c.speaker.clone())
    }

    fn score_pair(
        &self,
        p1: &[String],
        p2: &[String],
        speaker1: &Option<String>,
        speaker2: &Option<String>,
    ) -> f64 {
        if p1.is_empty() || p2.is_empty() {
            return 0.0;
        }

        let dist = phoneme_distance(p1, p2);
        let longer = p1.len().max(p2.len()) as f64;
        let shorter = p1.len().min(p2.len()) as f64;
        let base = 1.0 - dist / longer;

        let ratio = shorter / longer;
        let mut adjusted = base * (0.5 + 0.5 * ratio);

        if let (Some(s1), Some(s2)) = (speaker1, speaker2) {
            if s1 != s2 {
                adjusted -= self.config.speaker_mismatch_penalty;
            }
        }

        adjusted.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn track_of(phonemes: &[&str]) -> Track {
        Track::new(
            phonemes
                .iter()
                .map(|p| Chunk::new(0.0, 1.0, "", p.split_whitespace().map(str::to_string).collect()))
                .collect(),
        )
    }

    #[test]
    fn empty_phonemes_yield_zero_similarity() {
        let t1 = track_of(&[""]);
        let t2 = track_of(&["HH AH L OW"]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        assert_eq!(engine.sim(0, 0), 0.0);
    }

    #[test]
    fn identical_phonemes_yield_one() {
        let t1 = track_of(&["HH AH L OW"]);
        let t2 = track_of(&["HH AH L OW"]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        assert_eq!(engine.sim(0, 0), 1.0);
    }

    #[test]
    fn result_is_bounded_and_cached() {
        let t1 = track_of(&["HH AH L OW", "W ER L D"]);
        let t2 = track_of(&["HH AH L D"]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        let first = engine.sim(0, 0);
        assert!((0.0..=1.0).contains(&first));
        // second call hits the cache and must be identical.
        assert_eq!(engine.sim(0, 0), first);
        assert_eq!(engine.cache.borrow().len(), 1);
    }

    #[test]
    fn speaker_mismatch_reduces_score() {
        let mut t1 = track_of(&["HH AH L OW"]);
        let mut t2 = track_of(&["HH AH L OW"]);
        t1.chunks[0].speaker = Some("A".to_string());
        t2.chunks[0].speaker = Some("B".to_string());
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        assert!(engine.sim(0, 0) < 1.0);
    }

    #[test]
    fn missing_speaker_on_either_side_skips_penalty() {
        let mut t1 = track_of(&["HH AH L OW"]);
        let t2 = track_of(&["HH AH L OW"]);
        t1.chunks[0].speaker = Some("A".to_string());
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        assert_eq!(engine.sim(0, 0), 1.0);
    }

    #[test]
    fn merged_track2_concatenates_phonemes() {
        let t1 = track_of(&["W AH T D UW Y UW TH IH NG K"]);
        let t2 = track_of(&["W AH T D UW Y UW", "TH IH NG K"]);
        let config = AlignerConfig::default();
        let engine = SimilarityEngine::new(&t1, &t2, &config);
        let score = engine.sim_merged_track2(0, 0, 1);
        assert_eq!(score, 1.0);
    }
}
