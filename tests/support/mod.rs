//! Shared helpers for black-box scenario tests: terse tuple-to-`Track`
//! construction, mirroring the teacher's `FeatureFixture`-style test-only
//! conversion helpers in `tests/alignment.rs`.

#![allow(dead_code)]

use phonetic_walk::{Chunk, Track};

/// Routes the facade's `tracing` events to the test harness's captured
/// output instead of stdout, so `cargo test -- --nocapture` shows the
/// same `debug!`/`info!`/`warn!` trail a host would see in production.
/// Safe to call from every test: `try_init` is a no-op after the first.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Splits a space-separated ARPABET string into phoneme tokens.
pub fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// Builds an unattributed chunk from `(start, end, phonemes)`.
pub fn chunk(start: f64, end: f64, phonemes: &str) -> Chunk {
    Chunk::new(start, end, "", toks(phonemes))
}

/// Builds a track from a list of `(start, end, phonemes)` tuples.
pub fn track(spans: &[(f64, f64, &str)]) -> Track {
    Track::new(
        spans
            .iter()
            .map(|&(start, end, phonemes)| chunk(start, end, phonemes))
            .collect(),
    )
}
