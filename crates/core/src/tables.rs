use crate::{level_kind, HandKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base chips and mult of a hand category at level 1, and what each extra
/// level adds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HandRule {
    pub chips: i64,
    pub mult: f64,
    #[serde(default)]
    pub level_chips: i64,
    #[serde(default)]
    pub level_mult: f64,
}

impl HandRule {
    const fn new(chips: i64, mult: f64, level_chips: i64, level_mult: f64) -> Self {
        Self {
            chips,
            mult,
            level_chips,
            level_mult,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandTable {
    rules: HashMap<HandKind, HandRule>,
}

impl Default for HandTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl HandTable {
    pub fn standard() -> Self {
        let rules = HandKind::ALL
            .iter()
            .map(|kind| (*kind, default_rule(*kind)))
            .collect();
        Self { rules }
    }

    pub fn with_rule(mut self, kind: HandKind, rule: HandRule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    pub fn rule(&self, kind: HandKind) -> HandRule {
        self.rules
            .get(&level_kind(kind))
            .copied()
            .unwrap_or_else(|| default_rule(kind))
    }

    pub fn hand_base_for_level(&self, kind: HandKind, level: u32) -> (i64, f64) {
        let rule = self.rule(kind);
        if level <= 1 {
            return (rule.chips, rule.mult);
        }
        let extra = i64::from(level - 1);
        let chips = rule.chips.saturating_add(rule.level_chips.saturating_mul(extra));
        let mult = rule.mult + rule.level_mult * extra as f64;
        (chips, mult)
    }
}

fn default_rule(kind: HandKind) -> HandRule {
    match kind {
        HandKind::HighCard => HandRule::new(5, 1.0, 10, 1.0),
        HandKind::Pair => HandRule::new(10, 2.0, 15, 1.0),
        HandKind::TwoPair => HandRule::new(20, 2.0, 20, 1.0),
        HandKind::Trips => HandRule::new(30, 3.0, 20, 2.0),
        HandKind::Straight => HandRule::new(30, 4.0, 30, 3.0),
        HandKind::Flush => HandRule::new(35, 4.0, 15, 2.0),
        HandKind::FullHouse => HandRule::new(40, 4.0, 25, 2.0),
        HandKind::Quads => HandRule::new(60, 7.0, 30, 3.0),
        HandKind::StraightFlush | HandKind::RoyalFlush => HandRule::new(100, 8.0, 40, 4.0),
        HandKind::FiveOfAKind => HandRule::new(120, 12.0, 35, 3.0),
        HandKind::FlushHouse => HandRule::new(140, 14.0, 40, 4.0),
        HandKind::FlushFive => HandRule::new(160, 16.0, 50, 3.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_add_increments() {
        let table = HandTable::standard();
        assert_eq!(table.hand_base_for_level(HandKind::Flush, 1), (35, 4.0));
        assert_eq!(table.hand_base_for_level(HandKind::Flush, 3), (65, 8.0));
        assert_eq!(table.hand_base_for_level(HandKind::Pair, 0), (10, 2.0));
    }

    #[test]
    fn royal_flush_uses_straight_flush_row() {
        let table = HandTable::standard().with_rule(
            HandKind::StraightFlush,
            HandRule {
                chips: 1,
                mult: 1.0,
                level_chips: 0,
                level_mult: 0.0,
            },
        );
        assert_eq!(table.hand_base_for_level(HandKind::RoyalFlush, 1), (1, 1.0));
    }
}
