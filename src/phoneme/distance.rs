//! C1: weighted edit distance over phoneme token sequences.
//!
//! Grounded on the teacher's DTW cost routine (`pronunciation::alignment::
//! dtw::segment_cost`), which also folds a secondary penalty into a primary
//! distance metric; here the base metric is Levenshtein over tokens rather
//! than a frame-wise MFCC distance, and the secondary signal is a phoneme
//! confusion table rather than an energy delta.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Unordered phoneme pairs that are acoustically close enough to warrant a
/// reduced substitution cost instead of the full unit cost.
const CONFUSION_PAIRS: &[(&str, &str, f64)] = &[
    ("P", "B", 0.3),
    ("T", "D", 0.3),
    ("K", "G", 0.3),
    ("S", "Z", 0.3),
    ("F", "V", 0.3),
    ("M", "N", 0.3),
    ("IH", "IY", 0.2),
    ("AE", "EH", 0.2),
];

fn confusion_table() -> &'static HashMap<(&'static str, &'static str), f64> {
    static TABLE: OnceLock<HashMap<(&'static str, &'static str), f64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::with_capacity(CONFUSION_PAIRS.len() * 2);
        for &(a, b, cost) in CONFUSION_PAIRS {
            table.insert((a, b), cost);
            table.insert((b, a), cost);
        }
        table
    })
}

/// Substitution cost between two phoneme tokens: 0 if identical, a reduced
/// cost in `[0.2, 0.4]` for a known confusable pair, else unit cost.
fn substitution_cost(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    confusion_table().get(&(a, b)).copied().unwrap_or(1.0)
}

/// Weighted edit distance between two phoneme token sequences.
///
/// Standard DP with unit insertion/deletion and [`substitution_cost`]
/// substitution, run in `O(min(len(a), len(b)))` space via a rolling
/// two-row table (the shorter sequence drives the row dimension).
pub fn phoneme_distance(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() {
        return b.len() as f64;
    }
    if b.is_empty() {
        return a.len() as f64;
    }

    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let width = short.len();

    let mut previous: Vec<f64> = (0..=width).map(|i| i as f64).collect();
    let mut current = vec![0.0; width + 1];

    for (i, long_tok) in long.iter().enumerate() {
        current[0] = (i + 1) as f64;
        for (j, short_tok) in short.iter().enumerate() {
            let deletion = previous[j + 1] + 1.0;
            let insertion = current[j] + 1.0;
            let substitution = previous[j] + substitution_cost(long_tok, short_tok);
            current[j + 1] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[width]
}
