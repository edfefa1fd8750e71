//! C4: the greedy local-neighborhood path walker, with gap tolerance and
//! one-to-many ("smear") detection in either direction.

use tracing::debug;

use crate::align::anchor::Anchor;
use crate::align::{MatchKind, MatchPoint, Path};
use crate::chunk::Track;
use crate::config::AlignerConfig;
use crate::phoneme::SimilarityEngine;

/// Maximum chunks on the merged side of a smear (§4.4 "bounded-smear
/// policy"); this walker's fixed 2-chunk merge sits comfortably under it.
const MAX_SMEAR_SPAN: usize = 3;
const SMEAR_MERGE_SPAN: usize = 2;

/// A candidate next cursor position, scored directly (never via a smear
/// merge -- smears are evaluated separately once a direct candidate fails
/// to clear the strong-match threshold).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    i: usize,
    j: usize,
    score: f64,
}

/// Outcome of a walk: the path built and the accumulated gap cost, used by
/// the offset estimator (C5) to discount the quality of a path that leaned
/// on gap advances rather than direct or smear matches.
#[derive(Debug, Clone)]
pub struct WalkResult {
    pub path: Path,
    /// Sum of `gap_penalty` over every non-appending gap advance taken
    /// during the walk (§4.4 step 4, "subtract `gap_penalty` from the
    /// running path score").
    pub gap_penalty_total: f64,
}

/// Runs the walk from `anchor` until termination, returning the path built
/// (the anchor itself is always the first point) and the accrued gap cost.
pub fn walk(
    track1: &Track,
    track2: &Track,
    anchor: Anchor,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
) -> WalkResult {
    let last_i = track1.len() - 1;
    let last_j = track2.len() - 1;
    let anchor_offset = track2.chunks[anchor.j].start - track1.chunks[anchor.i].start;

    let mut path: Path = vec![MatchPoint::direct(anchor.i, anchor.j, anchor.score)];
    let mut cur_i = anchor.i;
    let mut cur_j = anchor.j;
    let mut consecutive_gaps = 0usize;
    let mut gap_penalty_total = 0.0;

    loop {
        if cur_i >= last_i || cur_j >= last_j {
            debug!(cur_i, cur_j, "walk terminated: reached track end");
            break;
        }

        let candidates = generate_candidates(cur_i, cur_j, last_i, last_j, engine);
        if candidates.is_empty() {
            debug!(cur_i, cur_j, "walk terminated: no in-range candidates");
            break;
        }

        // How far an appended point is still allowed to move the cursor
        // this iteration without breaching the §3 step-size bound
        // (`last-used` to `first-used` index delta ≤ max_consecutive_gaps +
        // 1). `consecutive_gaps` already equals the cursor's distance from
        // the last appended point, since every gap step advances by
        // exactly 1 on both sides.
        let budget = config.max_consecutive_gaps + 1 - consecutive_gaps;
        let eligible: Vec<Candidate> = candidates
            .iter()
            .copied()
            .filter(|c| c.i - cur_i <= budget && c.j - cur_j <= budget)
            .collect();

        let reference_offset = if path.len() >= 3 {
            running_median_offset(&path, track1, track2)
        } else {
            anchor_offset
        };

        if !eligible.is_empty() {
            let best = pick_best(&eligible, cur_i, cur_j, reference_offset, track1, track2);
            if best.score >= config.phonetic_similarity_threshold {
                path.push(MatchPoint::direct(best.i, best.j, best.score));
                consecutive_gaps = 0;
                cur_i = best.i;
                cur_j = best.j;
                continue;
            }

            if let Some(point) = try_smear(cur_i, cur_j, last_i, last_j, engine, config, &eligible) {
                cur_i = point.i_end;
                cur_j = point.j_end;
                path.push(point);
                consecutive_gaps = 0;
                continue;
            }
        }

        if consecutive_gaps < config.max_consecutive_gaps {
            consecutive_gaps += 1;
            gap_penalty_total += config.gap_penalty;
            // A gap advances by a single index on each side, never by the
            // winning candidate's full (possibly 2-wide) step -- otherwise
            // a run of gaps could push the cursor past the §3 step-size
            // bound (max_consecutive_gaps + 1) before the next appended
            // point is even chosen.
            cur_i += 1;
            cur_j += 1;
            continue;
        }

        debug!(cur_i, cur_j, "walk terminated: gap budget exhausted");
        break;
    }

    WalkResult {
        path,
        gap_penalty_total,
    }
}

/// Enumerates the four `(di, dj) ∈ {1,2} × {1,2}` neighbors, pruning any
/// that fall outside either track.
fn generate_candidates(
    cur_i: usize,
    cur_j: usize,
    last_i: usize,
    last_j: usize,
    engine: &SimilarityEngine,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(4);
    for di in [1usize, 2] {
        for dj in [1usize, 2] {
            let i = cur_i + di;
            let j = cur_j + dj;
            if i > last_i || j > last_j {
                continue;
            }
            candidates.push(Candidate {
                i,
                j,
                score: engine.sim(i, j),
            });
        }
    }
    candidates
}

/// Picks the max-scoring candidate, tie-breaking per §4.4 step 3:
/// prefer `(di,dj)=(1,1)`, then smaller `di+dj`, then smaller
/// `|Δ_candidate - reference_offset|`.
fn pick_best(
    candidates: &[Candidate],
    cur_i: usize,
    cur_j: usize,
    reference_offset: f64,
    track1: &Track,
    track2: &Track,
) -> Candidate {
    let mut best = candidates[0];
    for &candidate in &candidates[1..] {
        if is_better(candidate, best, cur_i, cur_j, reference_offset, track1, track2) {
            best = candidate;
        }
    }
    best
}

fn is_better(
    candidate: Candidate,
    current: Candidate,
    cur_i: usize,
    cur_j: usize,
    reference_offset: f64,
    track1: &Track,
    track2: &Track,
) -> bool {
    if candidate.score != current.score {
        return candidate.score > current.score;
    }

    let candidate_is_diagonal = candidate.i == cur_i + 1 && candidate.j == cur_j + 1;
    let current_is_diagonal = current.i == cur_i + 1 && current.j == cur_j + 1;
    if candidate_is_diagonal != current_is_diagonal {
        return candidate_is_diagonal;
    }

    let candidate_step = (candidate.i - cur_i) + (candidate.j - cur_j);
    let current_step = (current.i - cur_i) + (current.j - cur_j);
    if candidate_step != current_step {
        return candidate_step < current_step;
    }

    let candidate_delta = (candidate_offset(candidate, track1, track2) - reference_offset).abs();
    let current_delta = (candidate_offset(current, track1, track2) - reference_offset).abs();
    candidate_delta < current_delta
}

fn candidate_offset(candidate: Candidate, track1: &Track, track2: &Track) -> f64 {
    track2.chunks[candidate.j].start - track1.chunks[candidate.i].start
}

fn running_median_offset(path: &Path, track1: &Track, track2: &Track) -> f64 {
    let mut offsets: Vec<f64> = path
        .iter()
        .map(|point| track2.chunks[point.j_ref()].start - track1.chunks[point.i_ref()].start)
        .collect();
    median(&mut offsets)
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Tries the one-to-many smear probe (§4.4 step 4, "Smear probe"), first in
/// the track1→track2 direction, then symmetrically in the other.
///
/// The probe requires both neighbor candidates to exist (i.e. not at a
/// track boundary) but only one of the two to individually clear
/// `smear_similarity_threshold` before the real gate -- the merged-phoneme
/// similarity against `phonetic_similarity_threshold` -- is even attempted.
/// A genuine one-to-many split is asymmetric by construction: the half
/// that starts at the original chunk's first phoneme scores reasonably
/// against the unsplit chunk, while the trailing half alone usually does
/// not (it is being compared against phonemes that precede it). Requiring
/// both probes to pass would make the cheap pre-filter stricter than the
/// merged check it exists to gate.
fn try_smear(
    cur_i: usize,
    cur_j: usize,
    last_i: usize,
    last_j: usize,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
    candidates: &[Candidate],
) -> Option<MatchPoint> {
    if let Some(point) = try_smear_1_to_n(cur_i, cur_j, last_j, engine, config, candidates) {
        return Some(point);
    }
    try_smear_n_to_1(cur_i, cur_j, last_i, engine, config, candidates)
}

fn try_smear_1_to_n(
    cur_i: usize,
    cur_j: usize,
    last_j: usize,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
    candidates: &[Candidate],
) -> Option<MatchPoint> {
    let probes = involving_next_i(candidates, cur_i);
    if probes.len() < 2 || !probes.iter().any(|c| c.score >= config.smear_similarity_threshold) {
        return None;
    }
    let j_a = cur_j + 1;
    let j_b = cur_j + SMEAR_MERGE_SPAN;
    if j_b > last_j || j_b - j_a + 1 > MAX_SMEAR_SPAN {
        return None;
    }
    let score = engine.sim_merged_track2(cur_i + 1, j_a, j_b);
    if score < config.phonetic_similarity_threshold {
        return None;
    }
    Some(MatchPoint {
        i_start: cur_i + 1,
        i_end: cur_i + 1,
        j_start: j_a,
        j_end: j_b,
        score,
        kind: MatchKind::Smear1ToN,
    })
}

fn try_smear_n_to_1(
    cur_i: usize,
    cur_j: usize,
    last_i: usize,
    engine: &SimilarityEngine,
    config: &AlignerConfig,
    candidates: &[Candidate],
) -> Option<MatchPoint> {
    let probes = involving_next_j(candidates, cur_j);
    if probes.len() < 2 || !probes.iter().any(|c| c.score >= config.smear_similarity_threshold) {
        return None;
    }
    let i_a = cur_i + 1;
    let i_b = cur_i + SMEAR_MERGE_SPAN;
    if i_b > last_i || i_b - i_a + 1 > MAX_SMEAR_SPAN {
        return None;
    }
    let score = engine.sim_merged_track1(i_a, i_b, cur_j + 1);
    if score < config.phonetic_similarity_threshold {
        return None;
    }
    Some(MatchPoint {
        i_start: i_a,
        i_end: i_b,
        j_start: cur_j + 1,
        j_end: cur_j + 1,
        score,
        kind: MatchKind::SmearNTo1,
    })
}

fn involving_next_i(candidates: &[Candidate], cur_i: usize) -> Vec<Candidate> {
    candidates.iter().copied().filter(|c| c.i == cur_i + 1).collect()
}

fn involving_next_j(candidates: &[Candidate], cur_j: usize) -> Vec<Candidate> {
    candidates.iter().copied().filter(|c| c.j == cur_j + 1).collect()
}
