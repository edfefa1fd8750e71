//! C5: robust offset estimation and confidence scoring from a completed
//! path, with MAD-based outlier rejection before the final consistency
//! check.

use crate::align::walker::WalkResult;
use crate::align::{AlignmentOutcome, Path};
use crate::chunk::Track;
use crate::config::AlignerConfig;
use crate::error::AlignError;

/// Minimum fraction of samples that must survive MAD-based filtering.
const MIN_RETAINED_FRACTION: f64 = 0.5;
/// MAD multiplier for the initial outlier cutoff.
const MAD_CUTOFF_MULTIPLIER: f64 = 3.0;

/// Turns a completed walk into an offset estimate, or a diagnostic
/// failure, per §4.5. The walk's accumulated gap penalty (§4.4 step 4's
/// "running path score") discounts the average-score confidence factor --
/// a path that leaned on gap advances to stay alive is less trustworthy
/// than one built entirely from direct and smear matches, even at an
/// identical mean per-point score.
pub fn estimate(
    walked: WalkResult,
    track1: &Track,
    track2: &Track,
    config: &AlignerConfig,
) -> Result<AlignmentOutcome, AlignError> {
    let WalkResult {
        path,
        gap_penalty_total,
    } = walked;

    if path.len() < config.min_path_length {
        return Err(AlignError::PathTooShort {
            min_required: config.min_path_length,
            path,
        });
    }

    let deltas: Vec<f64> = path
        .iter()
        .map(|point| track2.chunks[point.j_ref()].start - track1.chunks[point.i_ref()].start)
        .collect();

    let retained = retain_consistent(&deltas);
    let retained_deltas: Vec<f64> = retained.iter().map(|&idx| deltas[idx]).collect();

    let offset = median(&retained_deltas);
    let sd = sample_std_dev(&retained_deltas, offset);

    if sd > config.offset_consistency_threshold_sd {
        return Err(AlignError::OffsetInconsistent {
            median: offset,
            sd,
            threshold: config.offset_consistency_threshold_sd,
        });
    }

    let path_length_factor =
        (path.len() as f64 / (2.0 * config.min_path_length as f64)).min(1.0);
    let mean_score = path.iter().map(|point| point.score).sum::<f64>() / path.len() as f64;
    let average_score_factor =
        (mean_score - gap_penalty_total / path.len() as f64).max(0.0);
    let consistency_factor =
        1.0 - (sd / config.offset_consistency_threshold_sd).min(1.0);
    let confidence =
        (path_length_factor * average_score_factor * consistency_factor).clamp(0.0, 1.0);

    Ok(AlignmentOutcome {
        offset_seconds: offset,
        confidence,
        path,
    })
}

/// Filters outliers via `|Δ - median| > 3·MAD`, but never drops more than
/// half the samples: if the strict cutoff would, the cutoff is relaxed by
/// instead keeping the `ceil(n/2)` samples closest to the median.
fn retain_consistent(deltas: &[f64]) -> Vec<usize> {
    let n = deltas.len();
    let center = median(deltas);
    let deviations: Vec<f64> = deltas.iter().map(|d| (d - center).abs()).collect();
    let mad = median(&deviations);
    let min_retained = ((n as f64) * MIN_RETAINED_FRACTION).ceil() as usize;

    let cutoff = MAD_CUTOFF_MULTIPLIER * mad;
    let within_cutoff: Vec<usize> = (0..n).filter(|&idx| deviations[idx] <= cutoff).collect();

    if within_cutoff.len() >= min_retained {
        return within_cutoff;
    }

    let mut by_deviation: Vec<usize> = (0..n).collect();
    by_deviation.sort_by(|&a, &b| deviations[a].partial_cmp(&deviations[b]).unwrap());
    by_deviation.truncate(min_retained.max(1));
    by_deviation.sort_unstable();
    by_deviation
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn sample_std_dev(values: &[f64], mean_reference: f64) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean_reference).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::MatchKind;
    use crate::align::MatchPoint;
    use crate::chunk::Chunk;

    fn track_with_starts(starts: &[f64]) -> Track {
        Track::new(
            starts
                .iter()
                .map(|&s| Chunk::new(s, s + 1.0, "", vec!["AA".to_string()]))
                .collect(),
        )
    }

    fn direct_path(pairs: &[(usize, usize)], score: f64) -> Path {
        pairs
            .iter()
            .map(|&(i, j)| MatchPoint {
                i_start: i,
                i_end: i,
                j_start: j,
                j_end: j,
                score,
                kind: MatchKind::Direct,
            })
            .collect()
    }

    #[test]
    fn fails_when_path_shorter_than_minimum() {
        let track1 = track_with_starts(&[0.0, 1.0, 2.0]);
        let track2 = track_with_starts(&[0.0, 1.0, 2.0]);
        let path = direct_path(&[(0, 0), (1, 1), (2, 2)], 0.9);
        let config = AlignerConfig::default();
        let walked = WalkResult { path, gap_penalty_total: 0.0 };
        let err = estimate(walked, &track1, &track2, &config).unwrap_err();
        assert_eq!(err.reason_code(), "path_too_short");
    }

    #[test]
    fn consistent_zero_offset_succeeds_with_high_confidence() {
        let starts: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let track1 = track_with_starts(&starts);
        let track2 = track_with_starts(&starts);
        let pairs: Vec<(usize, usize)> = (0..6).map(|i| (i, i)).collect();
        let path = direct_path(&pairs, 1.0);
        let config = AlignerConfig::default();
        let walked = WalkResult { path, gap_penalty_total: 0.0 };
        let outcome = estimate(walked, &track1, &track2, &config).unwrap();
        assert!((outcome.offset_seconds - 0.0).abs() < 1e-9);
        assert!(outcome.confidence >= 0.9);
    }

    #[test]
    fn constant_shift_is_recovered() {
        let starts: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let track1 = track_with_starts(&starts);
        let track2 = track_with_starts(&starts.iter().map(|s| s + 12.5).collect::<Vec<_>>());
        let pairs: Vec<(usize, usize)> = (0..6).map(|i| (i, i)).collect();
        let path = direct_path(&pairs, 0.95);
        let config = AlignerConfig::default();
        let walked = WalkResult { path, gap_penalty_total: 0.0 };
        let outcome = estimate(walked, &track1, &track2, &config).unwrap();
        assert!((outcome.offset_seconds - 12.5).abs() < 1e-9);
    }

    #[test]
    fn inconsistent_ramp_fails_sd_check() {
        let n = 20;
        let starts: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let track1 = track_with_starts(&starts);
        let shifted: Vec<f64> = (0..n)
            .map(|i| starts[i as usize] + 1.0 + (i as f64 / (n - 1) as f64) * 19.0)
            .collect();
        let track2 = track_with_starts(&shifted);
        let pairs: Vec<(usize, usize)> = (0..n as usize).map(|i| (i, i)).collect();
        let path = direct_path(&pairs, 0.9);
        let config = AlignerConfig::default();
        let walked = WalkResult { path, gap_penalty_total: 0.0 };
        let err = estimate(walked, &track1, &track2, &config).unwrap_err();
        assert_eq!(err.reason_code(), "offset_inconsistent");
    }

    #[test]
    fn gap_penalty_lowers_confidence_at_equal_mean_score() {
        let starts: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let track1 = track_with_starts(&starts);
        let track2 = track_with_starts(&starts);
        let pairs: Vec<(usize, usize)> = (0..6).map(|i| (i, i)).collect();
        let config = AlignerConfig::default();

        let clean = estimate(
            WalkResult {
                path: direct_path(&pairs, 0.9),
                gap_penalty_total: 0.0,
            },
            &track1,
            &track2,
            &config,
        )
        .unwrap();
        let with_gaps = estimate(
            WalkResult {
                path: direct_path(&pairs, 0.9),
                gap_penalty_total: 0.2,
            },
            &track1,
            &track2,
            &config,
        )
        .unwrap();
        assert!(with_gaps.confidence < clean.confidence);
    }

    #[test]
    fn outlier_rejection_keeps_at_least_half() {
        // Nine consistent samples near 0, one wild outlier.
        let mut deltas = vec![0.0; 9];
        deltas.push(1000.0);
        let retained = retain_consistent(&deltas);
        assert!(retained.len() >= 5);
        assert!(!retained.contains(&9));
    }
}
