use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }
}

/// Card rank. Serialized as its numeric value, 2 through 14 with the Ace high.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Rank::ALL.iter().copied().find(|rank| rank.value() == value)
    }

    /// Chips a scoring card of this rank adds to the hand.
    pub fn chips(self) -> i64 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            other => i64::from(other.value()),
        }
    }

    pub fn is_face(self) -> bool {
        matches!(self, Rank::Jack | Rank::Queen | Rank::King)
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::from_value(value).ok_or_else(|| format!("rank {value} outside 2..=14"))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.value()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Enhancement {
    Bonus,
    Mult,
    Wild,
    Glass,
    Steel,
    Stone,
    Gold,
    Lucky,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Edition {
    Foil,
    Holographic,
    Polychrome,
    Negative,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Seal {
    Gold,
    Red,
    Blue,
    Purple,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    #[serde(default)]
    pub enhancement: Option<Enhancement>,
    #[serde(default)]
    pub edition: Option<Edition>,
    #[serde(default)]
    pub seal: Option<Seal>,
}

impl Card {
    pub fn standard(suit: Suit, rank: Rank) -> Self {
        Self {
            rank,
            suit,
            enhancement: None,
            edition: None,
            seal: None,
        }
    }

    pub fn with_enhancement(mut self, enhancement: Enhancement) -> Self {
        self.enhancement = Some(enhancement);
        self
    }

    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = Some(edition);
        self
    }

    pub fn with_seal(mut self, seal: Seal) -> Self {
        self.seal = Some(seal);
        self
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.enhancement, Some(Enhancement::Wild))
    }

    pub fn is_stone(&self) -> bool {
        matches!(self.enhancement, Some(Enhancement::Stone))
    }

    /// Whether the card counts as `suit`. Wild cards count as every suit,
    /// stone cards as none.
    pub fn has_suit(&self, suit: Suit) -> bool {
        if self.is_stone() {
            return false;
        }
        self.is_wild() || self.suit == suit
    }

    /// Same rank and suit, ignoring modifiers.
    pub fn same_face(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stone() {
            return write!(f, "Stone");
        }
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())?;
        if let Some(enhancement) = self.enhancement {
            write!(f, "[{enhancement:?}]")?;
        }
        if let Some(edition) = self.edition {
            write!(f, "<{edition:?}>")?;
        }
        Ok(())
    }
}

/// The 52 unmodified cards of a standard deck, suit-major.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::standard(suit, rank));
        }
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_serializes_as_number() {
        let card = Card::standard(Suit::Hearts, Rank::Ace);
        let json = serde_json::to_string(&card).expect("serialize");
        assert!(json.contains("\"rank\":14"));
        let back: Card = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, card);
    }

    #[test]
    fn rank_outside_range_is_rejected() {
        let body = r#"{"rank":15,"suit":"Spades"}"#;
        assert!(serde_json::from_str::<Card>(body).is_err());
    }

    #[test]
    fn wild_cards_match_every_suit_and_stone_matches_none() {
        let wild = Card::standard(Suit::Clubs, Rank::Two).with_enhancement(Enhancement::Wild);
        assert!(Suit::ALL.iter().all(|suit| wild.has_suit(*suit)));
        let stone = Card::standard(Suit::Clubs, Rank::Two).with_enhancement(Enhancement::Stone);
        assert!(Suit::ALL.iter().all(|suit| !stone.has_suit(*suit)));
    }

    #[test]
    fn face_cards_are_worth_ten_chips() {
        assert_eq!(Rank::King.chips(), 10);
        assert_eq!(Rank::Ace.chips(), 11);
        assert_eq!(Rank::Seven.chips(), 7);
        assert_eq!(standard_deck().len(), 52);
    }
}
