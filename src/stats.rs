//! Per-run latency summaries.
//!
//! Condenses one channel's latency series into the figures logged after each
//! sweep step. Full analysis (histograms, scaling plots) stays outside the
//! benchmark; the written artifacts carry the raw series.

/// Summary figures of one latency series, nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    /// Number of samples summarized.
    pub count: usize,
    /// Smallest sample.
    pub min_ns: u64,
    /// Largest sample.
    pub max_ns: u64,
    /// Arithmetic mean.
    pub mean_ns: f64,
    /// Population standard deviation.
    pub std_ns: f64,
}

/// Summarize a latency series. Returns `None` for an empty series.
pub fn summarize(series: &[u64]) -> Option<LatencySummary> {
    if series.is_empty() {
        return None;
    }

    let mut min_ns = u64::MAX;
    let mut max_ns = 0u64;
    let mut sum = 0f64;
    for &sample in series {
        min_ns = min_ns.min(sample);
        max_ns = max_ns.max(sample);
        sum += sample as f64;
    }
    let mean_ns = sum / series.len() as f64;

    let variance = series
        .iter()
        .map(|&sample| {
            let delta = sample as f64 - mean_ns;
            delta * delta
        })
        .sum::<f64>()
        / series.len() as f64;

    Some(LatencySummary {
        count: series.len(),
        min_ns,
        max_ns,
        mean_ns,
        std_ns: variance.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_no_summary() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn single_sample_summary_is_degenerate() {
        let summary = summarize(&[1_000]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min_ns, 1_000);
        assert_eq!(summary.max_ns, 1_000);
        assert_eq!(summary.mean_ns, 1_000.0);
        assert_eq!(summary.std_ns, 0.0);
    }

    #[test]
    fn summary_matches_hand_computed_figures() {
        // mean 300, population variance 80000/3
        let summary = summarize(&[100, 300, 500]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_ns, 100);
        assert_eq!(summary.max_ns, 500);
        assert!((summary.mean_ns - 300.0).abs() < f64::EPSILON);
        assert!((summary.std_ns - (80_000.0_f64 / 3.0).sqrt()).abs() < 1e-9);
    }
}
