//! Shared descriptive-statistics and confidence-interval helpers used
//! by the performance analyzer and the KPI engine (spec §4.2.5, §4.2.6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Stats {
    pub fn zero() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            stddev: 0.0,
            min: 0.0,
            max: 0.0,
            p90: 0.0,
            p95: 0.0,
        }
    }
}

/// Computes descriptive stats over an unordered sample. Returns
/// [`Stats::zero`] for an empty sample.
pub fn compute(values: &[f64]) -> Stats {
    if values.is_empty() {
        return Stats::zero();
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    Stats {
        mean,
        median: percentile(&sorted, 50.0),
        stddev: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
    }
}

/// Linearly interpolated percentile over an already-sorted sample.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Ninety,
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    fn z(self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 1.645,
            ConfidenceLevel::NinetyFive => 1.96,
            ConfidenceLevel::NinetyNine => 2.576,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::Ninety => "90%",
            ConfidenceLevel::NinetyFive => "95%",
            ConfidenceLevel::NinetyNine => "99%",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: String,
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
}

/// Z-approximation confidence interval around `value` using `stddev`
/// over a sample of `count` observations (spec §4.2.6). `lower ≤
/// value ≤ upper` always holds since margin is non-negative.
pub fn confidence_interval(value: f64, stddev: f64, count: usize, level: ConfidenceLevel) -> ConfidenceInterval {
    let margin = if count == 0 {
        0.0
    } else {
        level.z() * stddev / (count as f64).sqrt()
    };
    ConfidenceInterval {
        level: level.label().to_string(),
        lower: value - margin,
        upper: value + margin,
        margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_single_value() {
        assert_eq!(percentile(&[5.0], 95.0), 5.0);
    }

    #[test]
    fn stats_of_empty_is_zero() {
        let s = compute(&[]);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.p95, 0.0);
    }

    #[test]
    fn confidence_interval_always_contains_value() {
        let ci = confidence_interval(10.0, 2.0, 25, ConfidenceLevel::NinetyFive);
        assert!(ci.lower <= 10.0 && 10.0 <= ci.upper);
    }

    #[test]
    fn confidence_interval_zero_count_has_zero_margin() {
        let ci = confidence_interval(10.0, 2.0, 0, ConfidenceLevel::Ninety);
        assert_eq!(ci.margin, 0.0);
        assert_eq!(ci.lower, 10.0);
    }
}
