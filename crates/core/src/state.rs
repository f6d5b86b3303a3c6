use crate::{standard_deck, Card, ConsumableKind, Edition, HandKind, Suit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Phase as reported by whoever reads the game screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GamePhase {
    BlindSelection,
    Playing,
    Shop,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlindKind {
    Small,
    Big,
    Boss,
}

/// Boss blind restrictions the evaluator and policy understand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BossRule {
    /// Cards of this suit are debuffed.
    DebuffSuit(Suit),
    DebuffFace,
    /// Base chips and mult are halved.
    HalveBase,
    /// Only five-card hands score.
    MustPlayFive,
    /// A hand type already played this round scores nothing.
    NoRepeatHand,
}

impl BossRule {
    pub fn debuffs(&self, card: &Card) -> bool {
        if card.is_stone() {
            return false;
        }
        match self {
            BossRule::DebuffSuit(suit) => card.has_suit(*suit),
            BossRule::DebuffFace => card.rank.is_face(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blind {
    pub id: String,
    pub kind: BlindKind,
    pub requirement: i64,
    #[serde(default)]
    pub boss_rule: Option<BossRule>,
}

/// A held joker. `vars` carries counters and other per-joker state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Joker {
    pub id: String,
    #[serde(default)]
    pub edition: Option<Edition>,
    #[serde(default)]
    pub vars: HashMap<String, f64>,
}

impl Joker {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = Some(edition);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayedHand {
    pub hand: HandKind,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consumable {
    /// Inventory id, used by `UseConsumable`.
    pub id: String,
    pub kind: ConsumableKind,
    /// Catalog key such as `jupiter`.
    pub key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OfferKind {
    Joker,
    Tarot,
    Planet,
    Spectral,
    Pack,
    Voucher,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopItem {
    pub id: String,
    pub kind: OfferKind,
    pub key: String,
    pub price: i64,
    #[serde(default)]
    pub edition: Option<Edition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopContents {
    #[serde(default)]
    pub items: Vec<ShopItem>,
    #[serde(default)]
    pub reroll_cost: i64,
}

fn default_joker_slots() -> usize {
    5
}

fn default_consumable_slots() -> usize {
    2
}

/// One observed snapshot of the game. Read-only input to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub phase: GamePhase,
    pub ante: u8,
    #[serde(default)]
    pub blind: Option<Blind>,
    /// Chips already scored against the current blind.
    #[serde(default)]
    pub round_score: i64,
    pub hands_left: u8,
    pub discards_left: u8,
    pub money: i64,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub played: Vec<PlayedHand>,
    #[serde(default)]
    pub discarded: Vec<Card>,
    #[serde(default)]
    pub jokers: Vec<Joker>,
    #[serde(default = "default_joker_slots")]
    pub joker_slots: usize,
    #[serde(default)]
    pub consumables: Vec<Consumable>,
    #[serde(default = "default_consumable_slots")]
    pub consumable_slots: usize,
    #[serde(default)]
    pub hand_levels: HashMap<HandKind, u32>,
    #[serde(default)]
    pub hand_play_counts: HashMap<HandKind, u32>,
    #[serde(default)]
    pub draw_pile: Option<Vec<Card>>,
    #[serde(default)]
    pub shop: Option<ShopContents>,
    /// Set with `GameOver` when the run was beaten rather than lost.
    #[serde(default)]
    pub run_won: bool,
}

impl GameState {
    /// An empty playing snapshot, mostly useful for tests and fixtures.
    pub fn new(ante: u8, blind: Blind, hand: Vec<Card>) -> Self {
        Self {
            phase: GamePhase::Playing,
            ante,
            blind: Some(blind),
            round_score: 0,
            hands_left: 4,
            discards_left: 3,
            money: 4,
            hand,
            played: Vec::new(),
            discarded: Vec::new(),
            jokers: Vec::new(),
            joker_slots: default_joker_slots(),
            consumables: Vec::new(),
            consumable_slots: default_consumable_slots(),
            hand_levels: HashMap::new(),
            hand_play_counts: HashMap::new(),
            draw_pile: None,
            shop: None,
            run_won: false,
        }
    }

    pub fn requirement(&self) -> i64 {
        self.blind.as_ref().map(|blind| blind.requirement).unwrap_or(0)
    }

    pub fn remaining_requirement(&self) -> i64 {
        (self.requirement() - self.round_score).max(0)
    }

    pub fn boss_rule(&self) -> Option<BossRule> {
        self.blind.as_ref().and_then(|blind| blind.boss_rule)
    }

    pub fn level(&self, kind: HandKind) -> u32 {
        self.hand_levels
            .get(&crate::level_kind(kind))
            .copied()
            .unwrap_or(1)
    }

    /// Negative jokers do not take a slot.
    pub fn joker_capacity(&self) -> usize {
        let negatives = self
            .jokers
            .iter()
            .filter(|joker| joker.edition == Some(Edition::Negative))
            .count();
        self.joker_slots + negatives
    }

    pub fn has_free_joker_slot(&self) -> bool {
        self.jokers.len() < self.joker_capacity()
    }

    pub fn has_free_consumable_slot(&self) -> bool {
        self.consumables.len() < self.consumable_slots
    }

    pub fn hand_played_this_round(&self, kind: HandKind) -> bool {
        self.played.iter().any(|played| played.hand == kind)
    }

    /// Cards that may still be drawn: the known draw pile, or a standard
    /// deck minus every card already seen this round.
    pub fn unseen_deck(&self) -> Vec<Card> {
        if let Some(pile) = &self.draw_pile {
            return pile.clone();
        }
        let mut deck = standard_deck();
        let seen = self
            .hand
            .iter()
            .chain(self.discarded.iter())
            .chain(self.played.iter().flat_map(|played| played.cards.iter()));
        for card in seen {
            if let Some(pos) = deck.iter().position(|candidate| candidate.same_face(card)) {
                deck.swap_remove(pos);
            }
        }
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rank;

    fn blind() -> Blind {
        Blind {
            id: "small".to_string(),
            kind: BlindKind::Small,
            requirement: 300,
            boss_rule: None,
        }
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let body = r#"{"phase":"Playing","ante":1,"hands_left":4,"discards_left":3,"money":4}"#;
        let state: GameState = serde_json::from_str(body).expect("parse");
        assert_eq!(state.joker_slots, 5);
        assert_eq!(state.consumable_slots, 2);
        assert!(state.hand.is_empty());
        assert_eq!(state.requirement(), 0);
    }

    #[test]
    fn unseen_deck_drops_seen_cards() {
        let hand = vec![
            Card::standard(Suit::Spades, Rank::Ace),
            Card::standard(Suit::Hearts, Rank::Two),
        ];
        let mut state = GameState::new(1, blind(), hand);
        state.discarded.push(Card::standard(Suit::Clubs, Rank::Nine));
        let deck = state.unseen_deck();
        assert_eq!(deck.len(), 49);
        assert!(!deck.iter().any(|card| card.same_face(&Card::standard(Suit::Spades, Rank::Ace))));
    }

    #[test]
    fn negative_jokers_extend_capacity() {
        let mut state = GameState::new(1, blind(), Vec::new());
        state.joker_slots = 1;
        state.jokers.push(Joker::new("joker").with_edition(Edition::Negative));
        assert!(state.has_free_joker_slot());
        state.jokers.push(Joker::new("jolly_joker"));
        assert!(!state.has_free_joker_slot());
        assert_eq!(state.remaining_requirement(), 300);
    }
}
