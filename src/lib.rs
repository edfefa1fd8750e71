//! Phonetic Walk: estimates the temporal offset between two independently
//! produced subtitle tracks for the same audio.
//!
//! The crate accepts two [`Track`]s of phoneme-annotated [`Chunk`]s (a
//! "wrangler" stage that parses raw subtitle files and a grapheme-to-
//! phoneme conversion step are both out of scope; callers supply
//! already-phonemicized chunks) and returns a single scalar offset, a
//! confidence score, and the match path the estimate was derived from.
//!
//! ```
//! use phonetic_walk::{align, AlignerConfig, Chunk, Track};
//!
//! fn toks(s: &str) -> Vec<String> {
//!     s.split_whitespace().map(str::to_string).collect()
//! }
//!
//! let track1 = Track::new(vec![
//!     Chunk::new(0.0, 1.0, "hello", toks("HH AH L OW")),
//!     Chunk::new(2.0, 3.0, "world", toks("W ER L D")),
//!     Chunk::new(4.0, 5.0, "how are you", toks("HH AW AA R Y UW")),
//!     Chunk::new(6.0, 7.0, "fine", toks("F AY N")),
//!     Chunk::new(8.0, 9.0, "goodbye", toks("G UH D B AY")),
//! ]);
//! let track2 = track1.clone();
//!
//! let outcome = align(&track1, &track2, &AlignerConfig::default()).unwrap();
//! assert!(outcome.offset_seconds.abs() < 1e-9);
//! ```

pub mod align;
pub mod chunk;
pub mod config;
pub mod error;
pub mod phoneme;

pub use align::{align, AlignmentOutcome, MatchKind, MatchPoint, Path};
pub use chunk::{Chunk, Track};
pub use config::AlignerConfig;
pub use error::AlignError;
