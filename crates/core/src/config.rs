use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tuning knobs for the decision engine. Every field has a default so a
/// partial JSON file is enough.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    /// 0 plays safe, 1 takes every gamble.
    pub risk_tolerance: f64,
    pub seed: u64,
    pub max_play_candidates: usize,
    pub max_discard_candidates: usize,
    /// Monte Carlo draws per discard candidate.
    pub discard_samples: usize,
    pub max_discard_size: usize,
    pub history_weight: f64,
    pub memory_path: Option<PathBuf>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            risk_tolerance: 0.5,
            seed: 0xC0FFEE,
            max_play_candidates: 24,
            max_discard_candidates: 16,
            discard_samples: 48,
            max_discard_size: 5,
            history_weight: 1.0,
            memory_path: None,
        }
    }
}

impl StrategyConfig {
    /// Risk tolerance clamped to `0.0..=1.0`; NaN reads as the default.
    pub fn risk(&self) -> f64 {
        if self.risk_tolerance.is_nan() {
            return Self::default().risk_tolerance;
        }
        self.risk_tolerance.clamp(0.0, 1.0)
    }
}
