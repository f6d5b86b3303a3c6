use crate::{Card, Suit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandKind {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
    RoyalFlush,
    FiveOfAKind,
    FlushHouse,
    FlushFive,
}

impl HandKind {
    /// Every hand kind, weakest first.
    pub const ALL: [HandKind; 13] = [
        HandKind::HighCard,
        HandKind::Pair,
        HandKind::TwoPair,
        HandKind::Trips,
        HandKind::Straight,
        HandKind::Flush,
        HandKind::FullHouse,
        HandKind::Quads,
        HandKind::StraightFlush,
        HandKind::RoyalFlush,
        HandKind::FiveOfAKind,
        HandKind::FlushHouse,
        HandKind::FlushFive,
    ];

    pub fn id(self) -> &'static str {
        match self {
            HandKind::HighCard => "high_card",
            HandKind::Pair => "pair",
            HandKind::TwoPair => "two_pair",
            HandKind::Trips => "trips",
            HandKind::Straight => "straight",
            HandKind::Flush => "flush",
            HandKind::FullHouse => "full_house",
            HandKind::Quads => "quads",
            HandKind::StraightFlush => "straight_flush",
            HandKind::RoyalFlush => "royal_flush",
            HandKind::FiveOfAKind => "five_kind",
            HandKind::FlushHouse => "flush_house",
            HandKind::FlushFive => "flush_five",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            HandKind::HighCard => "High Card",
            HandKind::Pair => "Pair",
            HandKind::TwoPair => "Two Pair",
            HandKind::Trips => "Three of a Kind",
            HandKind::Straight => "Straight",
            HandKind::Flush => "Flush",
            HandKind::FullHouse => "Full House",
            HandKind::Quads => "Four of a Kind",
            HandKind::StraightFlush => "Straight Flush",
            HandKind::RoyalFlush => "Royal Flush",
            HandKind::FiveOfAKind => "Five of a Kind",
            HandKind::FlushHouse => "Flush House",
            HandKind::FlushFive => "Flush Five",
        }
    }

    /// Poker strength, 0 for High Card up to 12 for Flush Five.
    pub fn strength(self) -> u8 {
        HandKind::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default() as u8
    }

    /// Whether a hand resolved as `self` also contains `target`, e.g. a Full
    /// House contains a Pair.
    pub fn contains(self, target: HandKind) -> bool {
        use HandKind::*;
        if self == target || target == HighCard {
            return true;
        }
        match target {
            Pair => matches!(
                self,
                TwoPair | Trips | FullHouse | Quads | FiveOfAKind | FlushHouse | FlushFive
            ),
            TwoPair => matches!(self, FullHouse | FlushHouse),
            Trips => matches!(
                self,
                FullHouse | Quads | FiveOfAKind | FlushHouse | FlushFive
            ),
            Straight => matches!(self, StraightFlush | RoyalFlush),
            Flush => matches!(self, StraightFlush | RoyalFlush | FlushHouse | FlushFive),
            FullHouse => self == FlushHouse,
            Quads => matches!(self, FiveOfAKind | FlushFive),
            StraightFlush => self == RoyalFlush,
            FiveOfAKind => self == FlushFive,
            _ => false,
        }
    }
}

/// Royal flushes share the straight flush level.
pub fn level_kind(kind: HandKind) -> HandKind {
    match kind {
        HandKind::RoyalFlush => HandKind::StraightFlush,
        other => other,
    }
}

/// Classification rules granted by held jokers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEvalRules {
    #[serde(default)]
    pub smeared_suits: bool,
    #[serde(default)]
    pub four_fingers: bool,
    #[serde(default)]
    pub shortcut: bool,
}

impl HandEvalRules {
    pub fn merge(self, other: HandEvalRules) -> Self {
        Self {
            smeared_suits: self.smeared_suits || other.smeared_suits,
            four_fingers: self.four_fingers || other.four_fingers,
            shortcut: self.shortcut || other.shortcut,
        }
    }
}

/// The category a selection forms and the indices (into the selection) of
/// the cards that score for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: HandKind,
    pub scoring: Vec<usize>,
}

/// Classifies `cards` with every card's suit read from `suits` (same length).
/// Wild cards are resolved by the caller picking a concrete suit for them.
pub fn classify_with_suits(cards: &[Card], suits: &[Suit], rules: HandEvalRules) -> Classification {
    let live: Vec<usize> = (0..cards.len()).filter(|idx| !cards[*idx].is_stone()).collect();
    let (kind, mut scoring) = classify_live(cards, suits, &live, rules);
    scoring.extend((0..cards.len()).filter(|idx| cards[*idx].is_stone()));
    scoring.sort_unstable();
    scoring.dedup();
    Classification { kind, scoring }
}

/// Classifies using each card's printed suit.
pub fn classify(cards: &[Card], rules: HandEvalRules) -> Classification {
    let suits: Vec<Suit> = cards.iter().map(|card| card.suit).collect();
    classify_with_suits(cards, &suits, rules)
}

/// Suit assignments worth classifying when `cards` holds wild cards. Suits
/// only decide flushes, so it is enough to send every wild card to one suit
/// (the strongest flush for that suit) and to spread them over the thinnest
/// buckets (no flush whenever one can be avoided).
pub fn wild_suit_assignments(cards: &[Card], rules: HandEvalRules) -> Vec<Vec<Suit>> {
    let printed: Vec<Suit> = cards.iter().map(|card| card.suit).collect();
    if !cards.iter().any(Card::is_wild) {
        return vec![printed];
    }

    let mut out: Vec<Vec<Suit>> = Suit::ALL
        .iter()
        .map(|suit| {
            cards
                .iter()
                .map(|card| if card.is_wild() { *suit } else { card.suit })
                .collect()
        })
        .collect();

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for card in cards.iter().filter(|card| !card.is_wild() && !card.is_stone()) {
        *counts.entry(suit_bucket(card.suit, rules.smeared_suits)).or_default() += 1;
    }
    let mut spread = printed;
    for (idx, card) in cards.iter().enumerate() {
        if !card.is_wild() {
            continue;
        }
        let thinnest = Suit::ALL
            .iter()
            .copied()
            .min_by_key(|suit| {
                counts
                    .get(&suit_bucket(*suit, rules.smeared_suits))
                    .copied()
                    .unwrap_or(0)
            })
            .unwrap_or(card.suit);
        spread[idx] = thinnest;
        *counts
            .entry(suit_bucket(thinnest, rules.smeared_suits))
            .or_default() += 1;
    }
    if !out.contains(&spread) {
        out.push(spread);
    }
    out
}

fn classify_live(
    cards: &[Card],
    suits: &[Suit],
    live: &[usize],
    rules: HandEvalRules,
) -> (HandKind, Vec<usize>) {
    if live.is_empty() {
        return (HandKind::HighCard, Vec::new());
    }

    let groups = rank_groups(cards, live);
    let first = groups[0].len();
    let second = groups.get(1).map(Vec::len).unwrap_or(0);
    let flush = flush_cards(suits, live, rules);
    let full_flush = flush.as_ref().map(|f| f.len() == live.len()).unwrap_or(false);
    let straight = straight_cards(cards, live, rules);

    if first == 5 {
        let kind = if full_flush {
            HandKind::FlushFive
        } else {
            HandKind::FiveOfAKind
        };
        return (kind, live.to_vec());
    }
    if first == 3 && second == 2 && full_flush {
        return (HandKind::FlushHouse, live.to_vec());
    }
    if let (Some(flush), Some(straight)) = (flush.as_ref(), straight.as_ref()) {
        let kind = if is_royal(cards, straight) {
            HandKind::RoyalFlush
        } else {
            HandKind::StraightFlush
        };
        let mut scoring = flush.clone();
        scoring.extend(straight.iter().copied());
        return (kind, scoring);
    }
    if first == 4 {
        return (HandKind::Quads, groups[0].clone());
    }
    if first == 3 && second == 2 {
        return (HandKind::FullHouse, live.to_vec());
    }
    if let Some(flush) = flush {
        return (HandKind::Flush, flush);
    }
    if let Some(straight) = straight {
        return (HandKind::Straight, straight);
    }
    if first == 3 {
        return (HandKind::Trips, groups[0].clone());
    }
    if first == 2 && second == 2 {
        let mut scoring = groups[0].clone();
        scoring.extend(groups[1].iter().copied());
        return (HandKind::TwoPair, scoring);
    }
    if first == 2 {
        return (HandKind::Pair, groups[0].clone());
    }
    (HandKind::HighCard, vec![groups[0][0]])
}

/// Live card indices grouped by rank, largest group first, then highest rank.
fn rank_groups(cards: &[Card], live: &[usize]) -> Vec<Vec<usize>> {
    let mut by_rank: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for idx in live {
        by_rank.entry(cards[*idx].rank.value()).or_default().push(*idx);
    }
    let mut groups: Vec<(u8, Vec<usize>)> = by_rank.into_iter().collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| b.0.cmp(&a.0)));
    groups.into_iter().map(|(_, idx)| idx).collect()
}

fn suit_bucket(suit: Suit, smeared: bool) -> u8 {
    if smeared {
        u8::from(suit.is_red())
    } else {
        match suit {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Clubs => 2,
            Suit::Diamonds => 3,
        }
    }
}

fn flush_cards(suits: &[Suit], live: &[usize], rules: HandEvalRules) -> Option<Vec<usize>> {
    let required = if rules.four_fingers { 4 } else { 5 };
    if live.len() < required {
        return None;
    }
    let mut buckets: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for idx in live {
        buckets
            .entry(suit_bucket(suits[*idx], rules.smeared_suits))
            .or_default()
            .push(*idx);
    }
    buckets
        .into_values()
        .filter(|members| members.len() >= required)
        .max_by_key(Vec::len)
}

fn straight_cards(cards: &[Card], live: &[usize], rules: HandEvalRules) -> Option<Vec<usize>> {
    let required = if rules.four_fingers { 4 } else { 5 };
    if live.len() < required {
        return None;
    }
    let max_gap = if rules.shortcut { 2 } else { 1 };

    let mut values: Vec<u8> = live.iter().map(|idx| cards[*idx].rank.value()).collect();
    if values.contains(&14) {
        values.push(1);
    }
    values.sort_unstable();
    values.dedup();

    let mut best: Option<Vec<u8>> = None;
    let mut chain: Vec<u8> = Vec::new();
    for value in values {
        match chain.last() {
            Some(last) if value - last <= max_gap => chain.push(value),
            _ => chain = vec![value],
        }
        if chain.len() >= required {
            best = Some(chain.clone());
        }
    }

    let run = best?;
    let picked: Vec<usize> = live
        .iter()
        .copied()
        .filter(|idx| {
            let value = cards[*idx].rank.value();
            run.contains(&value) || (value == 14 && run.contains(&1))
        })
        .collect();
    Some(picked)
}

fn is_royal(cards: &[Card], straight: &[usize]) -> bool {
    let mut values: Vec<u8> = straight.iter().map(|idx| cards[*idx].rank.value()).collect();
    values.sort_unstable();
    values.dedup();
    values == [10, 11, 12, 13, 14]
}
