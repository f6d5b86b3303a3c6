use crate::{
    CardFilter, Condition, CounterSpec, CounterYield, Enhancement, HandEvalRules, HandKind,
    Joker, JokerEffect, JokerRarity, Rank, Suit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JokerDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_rarity")]
    pub rarity: JokerRarity,
    #[serde(default = "default_price")]
    pub price: i64,
    pub effect: JokerEffect,
    /// Evaluation rules granted while the joker is held.
    #[serde(default)]
    pub rules: HandEvalRules,
}

fn default_rarity() -> JokerRarity {
    JokerRarity::Common
}

fn default_price() -> i64 {
    4
}

impl JokerDef {
    pub fn new(id: &str, effect: JokerEffect) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            rarity: default_rarity(),
            price: default_price(),
            effect,
            rules: HandEvalRules::default(),
        }
    }

    fn named(mut self, name: &str, rarity: JokerRarity, price: i64) -> Self {
        self.name = name.to_string();
        self.rarity = rarity;
        self.price = price;
        self
    }

    fn granting(mut self, rules: HandEvalRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Joker effect descriptors and planet cards, keyed by catalog id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JokerCatalog {
    #[serde(default)]
    jokers: BTreeMap<String, JokerDef>,
    #[serde(default)]
    planets: BTreeMap<String, HandKind>,
}

impl JokerCatalog {
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        for def in standard_jokers() {
            catalog.insert(def);
        }
        for (key, kind) in PLANETS {
            catalog.planets.insert(key.to_string(), kind);
        }
        catalog
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, def: JokerDef) {
        self.jokers.insert(def.id.clone(), def);
    }

    pub fn joker(&self, id: &str) -> Option<&JokerDef> {
        self.jokers.get(id)
    }

    pub fn len(&self) -> usize {
        self.jokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jokers.is_empty()
    }

    /// Hand type upgraded by the planet card `key`.
    pub fn planet(&self, key: &str) -> Option<HandKind> {
        self.planets.get(key).copied()
    }

    pub fn rules_for(&self, jokers: &[Joker]) -> HandEvalRules {
        jokers
            .iter()
            .filter_map(|joker| self.joker(&joker.id))
            .fold(HandEvalRules::default(), |acc, def| acc.merge(def.rules))
    }
}

const PLANETS: [(&str, HandKind); 12] = [
    ("pluto", HandKind::HighCard),
    ("mercury", HandKind::Pair),
    ("uranus", HandKind::TwoPair),
    ("venus", HandKind::Trips),
    ("saturn", HandKind::Straight),
    ("jupiter", HandKind::Flush),
    ("earth", HandKind::FullHouse),
    ("mars", HandKind::Quads),
    ("neptune", HandKind::StraightFlush),
    ("planet_x", HandKind::FiveOfAKind),
    ("ceres", HandKind::FlushHouse),
    ("eris", HandKind::FlushFive),
];

fn contains_then(kind: HandKind, effect: JokerEffect) -> JokerEffect {
    JokerEffect::when(Condition::HandContains(kind), effect)
}

fn suit_mult(suit: Suit) -> JokerEffect {
    JokerEffect::per_scoring(CardFilter::Suit(suit), JokerEffect::AddMult(3.0))
}

fn standard_jokers() -> Vec<JokerDef> {
    use JokerRarity::{Common, Rare, Uncommon};
    vec![
        JokerDef::new("joker", JokerEffect::AddMult(4.0)).named("Joker", Common, 2),
        JokerDef::new("greedy_joker", suit_mult(Suit::Diamonds)).named("Greedy Joker", Common, 5),
        JokerDef::new("lusty_joker", suit_mult(Suit::Hearts)).named("Lusty Joker", Common, 5),
        JokerDef::new("wrathful_joker", suit_mult(Suit::Spades))
            .named("Wrathful Joker", Common, 5),
        JokerDef::new("gluttonous_joker", suit_mult(Suit::Clubs))
            .named("Gluttonous Joker", Common, 5),
        JokerDef::new("jolly_joker", contains_then(HandKind::Pair, JokerEffect::AddMult(8.0)))
            .named("Jolly Joker", Common, 3),
        JokerDef::new("zany_joker", contains_then(HandKind::Trips, JokerEffect::AddMult(12.0)))
            .named("Zany Joker", Common, 4),
        JokerDef::new("mad_joker", contains_then(HandKind::TwoPair, JokerEffect::AddMult(10.0)))
            .named("Mad Joker", Common, 4),
        JokerDef::new(
            "crazy_joker",
            contains_then(HandKind::Straight, JokerEffect::AddMult(12.0)),
        )
        .named("Crazy Joker", Common, 4),
        JokerDef::new("droll_joker", contains_then(HandKind::Flush, JokerEffect::AddMult(10.0)))
            .named("Droll Joker", Common, 4),
        JokerDef::new("sly_joker", contains_then(HandKind::Pair, JokerEffect::AddChips(50)))
            .named("Sly Joker", Common, 3),
        JokerDef::new("wily_joker", contains_then(HandKind::Trips, JokerEffect::AddChips(100)))
            .named("Wily Joker", Common, 4),
        JokerDef::new(
            "clever_joker",
            contains_then(HandKind::TwoPair, JokerEffect::AddChips(80)),
        )
        .named("Clever Joker", Common, 4),
        JokerDef::new(
            "devious_joker",
            contains_then(HandKind::Straight, JokerEffect::AddChips(100)),
        )
        .named("Devious Joker", Common, 4),
        JokerDef::new(
            "crafty_joker",
            contains_then(HandKind::Flush, JokerEffect::AddChips(80)),
        )
        .named("Crafty Joker", Common, 4),
        JokerDef::new(
            "half_joker",
            JokerEffect::when(Condition::PlayedAtMost(3), JokerEffect::AddMult(20.0)),
        )
        .named("Half Joker", Common, 5),
        JokerDef::new(
            "mystic_summit",
            JokerEffect::when(Condition::DiscardsLeft(0), JokerEffect::AddMult(15.0)),
        )
        .named("Mystic Summit", Common, 5),
        JokerDef::new(
            "scary_face",
            JokerEffect::per_scoring(CardFilter::Face, JokerEffect::AddChips(30)),
        )
        .named("Scary Face", Common, 4),
        JokerDef::new(
            "smiley_face",
            JokerEffect::per_scoring(CardFilter::Face, JokerEffect::AddMult(5.0)),
        )
        .named("Smiley Face", Common, 4),
        JokerDef::new(
            "even_steven",
            JokerEffect::per_scoring(CardFilter::Even, JokerEffect::AddMult(4.0)),
        )
        .named("Even Steven", Common, 4),
        JokerDef::new(
            "odd_todd",
            JokerEffect::per_scoring(CardFilter::Odd, JokerEffect::AddChips(31)),
        )
        .named("Odd Todd", Common, 4),
        JokerDef::new(
            "scholar",
            JokerEffect::per_scoring(
                CardFilter::Rank(Rank::Ace),
                JokerEffect::All(vec![JokerEffect::AddChips(20), JokerEffect::AddMult(4.0)]),
            ),
        )
        .named("Scholar", Common, 4),
        JokerDef::new(
            "walkie_talkie",
            JokerEffect::per_scoring(
                CardFilter::AnyOf(vec![CardFilter::Rank(Rank::Ten), CardFilter::Rank(Rank::Four)]),
                JokerEffect::All(vec![JokerEffect::AddChips(10), JokerEffect::AddMult(4.0)]),
            ),
        )
        .named("Walkie Talkie", Common, 4),
        JokerDef::new(
            "baron",
            JokerEffect::per_held(CardFilter::Rank(Rank::King), JokerEffect::MultiplyMult(1.5)),
        )
        .named("Baron", Rare, 8),
        JokerDef::new(
            "shoot_the_moon",
            JokerEffect::per_held(CardFilter::Rank(Rank::Queen), JokerEffect::AddMult(13.0)),
        )
        .named("Shoot the Moon", Common, 5),
        JokerDef::new("the_duo", contains_then(HandKind::Pair, JokerEffect::MultiplyMult(2.0)))
            .named("The Duo", Rare, 8),
        JokerDef::new("the_trio", contains_then(HandKind::Trips, JokerEffect::MultiplyMult(3.0)))
            .named("The Trio", Rare, 8),
        JokerDef::new(
            "the_family",
            contains_then(HandKind::Quads, JokerEffect::MultiplyMult(4.0)),
        )
        .named("The Family", Rare, 8),
        JokerDef::new(
            "the_order",
            contains_then(HandKind::Straight, JokerEffect::MultiplyMult(3.0)),
        )
        .named("The Order", Rare, 8),
        JokerDef::new(
            "the_tribe",
            contains_then(HandKind::Flush, JokerEffect::MultiplyMult(2.0)),
        )
        .named("The Tribe", Rare, 8),
        JokerDef::new("cavendish", JokerEffect::MultiplyMult(3.0)).named("Cavendish", Common, 4),
        JokerDef::new(
            "hit_the_road",
            JokerEffect::when(
                Condition::DiscardedAtLeast(CardFilter::Rank(Rank::Jack), 1),
                JokerEffect::MultiplyMult(1.5),
            ),
        )
        .named("Hit the Road", Rare, 8),
        JokerDef::new(
            "rough_gem",
            JokerEffect::per_scoring(CardFilter::Suit(Suit::Diamonds), JokerEffect::AddMoney(1)),
        )
        .named("Rough Gem", Uncommon, 7),
        JokerDef::new(
            "golden_ticket",
            JokerEffect::per_scoring(
                CardFilter::Enhancement(Enhancement::Gold),
                JokerEffect::AddMoney(4),
            ),
        )
        .named("Golden Ticket", Common, 5),
        JokerDef::new(
            "business_card",
            JokerEffect::per_scoring(CardFilter::Face, JokerEffect::AddMoney(1)),
        )
        .named("Business Card", Common, 4),
        JokerDef::new(
            "ride_the_bus",
            JokerEffect::Counter(
                CounterSpec::new("mult", 0.0, 1.0, CounterYield::Mult)
                    .grow_when(Condition::Not(Box::new(Condition::AnyScoring(CardFilter::Face))))
                    .reset_when(Condition::AnyScoring(CardFilter::Face)),
            ),
        )
        .named("Ride the Bus", Common, 6),
        JokerDef::new(
            "runner",
            JokerEffect::Counter(
                CounterSpec::new("chips", 0.0, 15.0, CounterYield::Chips)
                    .grow_when(Condition::HandContains(HandKind::Straight)),
            ),
        )
        .named("Runner", Common, 5),
        JokerDef::new(
            "square_joker",
            JokerEffect::Counter(
                CounterSpec::new("chips", 0.0, 4.0, CounterYield::Chips)
                    .grow_when(Condition::PlayedExactly(4)),
            ),
        )
        .named("Square Joker", Common, 4),
        JokerDef::new(
            "spare_trousers",
            JokerEffect::Counter(
                CounterSpec::new("mult", 0.0, 2.0, CounterYield::Mult)
                    .grow_when(Condition::HandContains(HandKind::TwoPair)),
            ),
        )
        .named("Spare Trousers", Uncommon, 6),
        JokerDef::new(
            "green_joker",
            JokerEffect::Counter(CounterSpec::new("mult", 0.0, 1.0, CounterYield::Mult)),
        )
        .named("Green Joker", Common, 4),
        JokerDef::new(
            "ice_cream",
            JokerEffect::Counter(
                CounterSpec::new("chips", 100.0, -5.0, CounterYield::Chips).after_yield(),
            ),
        )
        .named("Ice Cream", Common, 5),
        JokerDef::new(
            "hologram",
            JokerEffect::Counter(
                CounterSpec::new("xmult", 1.0, 0.0, CounterYield::XMult).after_yield(),
            ),
        )
        .named("Hologram", Uncommon, 7),
        JokerDef::new("four_fingers", JokerEffect::Passive)
            .named("Four Fingers", Uncommon, 7)
            .granting(HandEvalRules {
                four_fingers: true,
                ..HandEvalRules::default()
            }),
        JokerDef::new("shortcut", JokerEffect::Passive)
            .named("Shortcut", Uncommon, 7)
            .granting(HandEvalRules {
                shortcut: true,
                ..HandEvalRules::default()
            }),
        JokerDef::new("smeared_joker", JokerEffect::Passive)
            .named("Smeared Joker", Uncommon, 7)
            .granting(HandEvalRules {
                smeared_suits: true,
                ..HandEvalRules::default()
            }),
    ]
}
