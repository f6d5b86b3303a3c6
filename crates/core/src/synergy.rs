use crate::{HandKind, JokerRarity, OfferKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairAffinity {
    pub first: String,
    pub second: String,
    pub bonus: f64,
}

/// Replaceable table the shop strategy reads item values from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynergyTable {
    /// Base value by item key, overriding the rarity and kind defaults.
    pub items: BTreeMap<String, f64>,
    pub rarity_defaults: HashMap<JokerRarity, f64>,
    pub kind_defaults: HashMap<OfferKind, f64>,
    pub pairs: Vec<PairAffinity>,
    /// Hand-type affinities by item key.
    pub hands: BTreeMap<String, BTreeMap<HandKind, f64>>,
    /// Added when an item matches the focus of the current ante plan.
    pub focus_bonus: f64,
    pub level_weight: f64,
    pub play_count_weight: f64,
}

impl Default for SynergyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SynergyTable {
    pub fn standard() -> Self {
        let rarity_defaults = HashMap::from([
            (JokerRarity::Common, 1.0),
            (JokerRarity::Uncommon, 1.5),
            (JokerRarity::Rare, 2.5),
            (JokerRarity::Legendary, 4.0),
        ]);
        let kind_defaults = HashMap::from([
            (OfferKind::Joker, 1.0),
            (OfferKind::Planet, 0.8),
            (OfferKind::Tarot, 0.4),
            (OfferKind::Spectral, 0.4),
            (OfferKind::Pack, 0.3),
            (OfferKind::Voucher, 0.6),
        ]);
        let pairs = [
            ("the_duo", "jolly_joker", 1.0),
            ("the_duo", "sly_joker", 0.6),
            ("the_tribe", "droll_joker", 1.0),
            ("four_fingers", "the_tribe", 0.8),
            ("four_fingers", "droll_joker", 0.6),
            ("shortcut", "the_order", 0.8),
            ("shortcut", "runner", 0.6),
            ("smeared_joker", "greedy_joker", 0.5),
            ("smeared_joker", "lusty_joker", 0.5),
            ("baron", "shoot_the_moon", 0.4),
            ("the_trio", "zany_joker", 1.0),
        ]
        .into_iter()
        .map(|(first, second, bonus)| PairAffinity {
            first: first.to_string(),
            second: second.to_string(),
            bonus,
        })
        .collect();

        Self {
            items: BTreeMap::new(),
            rarity_defaults,
            kind_defaults,
            pairs,
            hands: BTreeMap::new(),
            focus_bonus: 0.5,
            level_weight: 0.25,
            play_count_weight: 0.05,
        }
    }

    pub fn base_value(&self, key: &str, kind: OfferKind, rarity: Option<JokerRarity>) -> f64 {
        if let Some(value) = self.items.get(key) {
            return *value;
        }
        if let Some(value) = rarity.and_then(|rarity| self.rarity_defaults.get(&rarity)) {
            return *value;
        }
        self.kind_defaults.get(&kind).copied().unwrap_or(0.0)
    }

    /// Affinity between two items, in either order.
    pub fn pair_bonus(&self, a: &str, b: &str) -> f64 {
        self.pairs
            .iter()
            .filter(|pair| {
                (pair.first == a && pair.second == b) || (pair.first == b && pair.second == a)
            })
            .map(|pair| pair.bonus)
            .sum()
    }

    pub fn hand_affinities(&self, key: &str) -> Option<&BTreeMap<HandKind, f64>> {
        self.hands.get(key)
    }
}
