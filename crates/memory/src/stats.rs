use serde::{Deserialize, Serialize};

/// Samples needed before confidence reaches one half.
const CONFIDENCE_PRIOR: f64 = 5.0;
const Z_95: f64 = 1.96;

/// Welford accumulator for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    samples: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.samples += 1;
        let delta = value - self.mean;
        self.mean += delta / self.samples as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn snapshot(&self) -> KeyStats {
        if self.samples == 0 {
            return KeyStats::default();
        }
        let n = self.samples as f64;
        let half_width = if self.samples > 1 {
            let variance = self.m2 / (n - 1.0);
            Z_95 * (variance / n).sqrt()
        } else {
            0.0
        };
        KeyStats {
            samples: self.samples,
            mean: self.mean,
            ci_low: self.mean - half_width,
            ci_high: self.mean + half_width,
            confidence: n / (n + CONFIDENCE_PRIOR),
        }
    }
}

/// What a query returns. All zero for keys never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStats {
    pub samples: u64,
    pub mean: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    /// Weight in `0.0..1.0` that grows with the sample count.
    pub confidence: f64,
}

/// Aggregate view of everything recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_sessions: u64,
    pub sessions_won: u64,
    pub win_rate: f64,
    pub total_rounds: u64,
    pub rounds_won: u64,
    pub tracked_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welford_matches_direct_formula() {
        let mut stats = RunningStats::default();
        for value in [1.0, 2.0, 3.0, 4.0] {
            stats.push(value);
        }
        let snap = stats.snapshot();
        assert_eq!(snap.samples, 4);
        assert!((snap.mean - 2.5).abs() < 1e-12);
        // sample variance 5/3, se = sqrt(5/12)
        let half = 1.96 * (5.0f64 / 12.0).sqrt();
        assert!((snap.ci_high - (2.5 + half)).abs() < 1e-9);
        assert!((snap.confidence - 4.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn single_sample_has_zero_width() {
        let mut stats = RunningStats::default();
        stats.push(0.7);
        let snap = stats.snapshot();
        assert_eq!(snap.ci_low, snap.ci_high);
        assert!((snap.confidence - 1.0 / 6.0).abs() < 1e-12);
    }
}
