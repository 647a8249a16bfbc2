// SPDX-License-Identifier: Apache-2.0

/// Mid-rank percentile of `target` among `cohort`:
/// `(below + 0.5 * tied) / n * 100`.
///
/// A single peer gives the neutral 50; an empty cohort has no rank. The result
/// is polarity-agnostic: a high rank means a high raw value.
#[must_use]
pub fn percentile_rank(target: f64, cohort: &[f64]) -> Option<f64> {
    match cohort.len() {
        0 => None,
        1 => Some(50.0),
        n => {
            let (below, tied) = cohort.iter().fold((0_usize, 0_usize), |(below, tied), v| {
                if *v < target {
                    (below + 1, tied)
                } else if *v == target {
                    (below, tied + 1)
                } else {
                    (below, tied)
                }
            });
            let rank = (below as f64 + 0.5 * tied as f64) / n as f64 * 100.0;
            Some(rank.clamp(0.0, 100.0))
        }
    }
}

#[must_use]
pub fn peer_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
