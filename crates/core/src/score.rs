use serde::{Deserialize, Serialize};

/// Running chips and multiplier while a hand is being scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Score {
    pub chips: i64,
    pub mult: f64,
}

impl Score {
    pub fn new(chips: i64, mult: f64) -> Self {
        Self { chips, mult }
    }

    pub fn total_raw(&self) -> f64 {
        self.chips as f64 * self.mult
    }

    /// Rounded half up and never negative.
    pub fn total(&self) -> i64 {
        round_half_up(self.total_raw())
    }

    pub fn apply(&mut self, effect: &RuleEffect) {
        match effect {
            RuleEffect::AddChips(value) => self.chips = self.chips.saturating_add(*value),
            RuleEffect::AddMult(value) => self.mult += value,
            RuleEffect::MultiplyMult(value) => self.mult *= value,
        }
    }
}

pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum RuleEffect {
    AddChips(i64),
    AddMult(f64),
    MultiplyMult(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreTraceStep {
    pub source: String,
    pub effect: RuleEffect,
    pub before: Score,
    pub after: Score,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-4.0), 0);
        assert_eq!(round_half_up(f64::NAN), 0);
    }

    #[test]
    fn additive_before_multiplicative_differs_from_reverse() {
        let mut add_first = Score::new(10, 2.0);
        add_first.apply(&RuleEffect::AddMult(4.0));
        add_first.apply(&RuleEffect::MultiplyMult(2.0));

        let mut mul_first = Score::new(10, 2.0);
        mul_first.apply(&RuleEffect::MultiplyMult(2.0));
        mul_first.apply(&RuleEffect::AddMult(4.0));

        assert_eq!(add_first.total(), 120);
        assert_eq!(mul_first.total(), 80);
    }
}
