use crate::{Card, Enhancement, HandEvalRules, HandKind, Rank, Suit, TriggerContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JokerRarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConsumableKind {
    Tarot,
    Planet,
    Spectral,
}

/// What a joker does when a hand is scored. Closed set, dispatched by
/// [`crate::resolve_jokers`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JokerEffect {
    AddChips(i64),
    AddMult(f64),
    MultiplyMult(f64),
    AddMoney(i64),
    Conditional {
        when: Condition,
        then: Box<JokerEffect>,
    },
    PerScoringCard {
        filter: CardFilter,
        each: Box<JokerEffect>,
    },
    PerHeldCard {
        filter: CardFilter,
        each: Box<JokerEffect>,
    },
    Counter(CounterSpec),
    All(Vec<JokerEffect>),
    /// No scoring effect. Used by jokers that only grant evaluation rules.
    Passive,
}

impl JokerEffect {
    pub fn when(condition: Condition, then: JokerEffect) -> Self {
        JokerEffect::Conditional {
            when: condition,
            then: Box::new(then),
        }
    }

    pub fn per_scoring(filter: CardFilter, each: JokerEffect) -> Self {
        JokerEffect::PerScoringCard {
            filter,
            each: Box::new(each),
        }
    }

    pub fn per_held(filter: CardFilter, each: JokerEffect) -> Self {
        JokerEffect::PerHeldCard {
            filter,
            each: Box::new(each),
        }
    }

    pub fn has_money(&self) -> bool {
        self.any(&|effect| matches!(effect, JokerEffect::AddMoney(_)))
    }

    pub fn has_multiplier(&self) -> bool {
        self.any(&|effect| match effect {
            JokerEffect::MultiplyMult(_) => true,
            JokerEffect::Counter(spec) => spec.yields == CounterYield::XMult,
            _ => false,
        })
    }

    /// Hand types this effect is conditioned on.
    pub fn hand_focus(&self) -> Vec<HandKind> {
        let mut out = Vec::new();
        self.collect_hands(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_hands(&self, out: &mut Vec<HandKind>) {
        match self {
            JokerEffect::Conditional { when, then } => {
                when.collect_hands(out);
                then.collect_hands(out);
            }
            JokerEffect::PerScoringCard { each, .. } | JokerEffect::PerHeldCard { each, .. } => {
                each.collect_hands(out)
            }
            JokerEffect::Counter(spec) => {
                spec.grow_when.collect_hands(out);
            }
            JokerEffect::All(effects) => effects.iter().for_each(|e| e.collect_hands(out)),
            _ => {}
        }
    }

    fn any(&self, pred: &dyn Fn(&JokerEffect) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            JokerEffect::Conditional { then, .. } => then.any(pred),
            JokerEffect::PerScoringCard { each, .. } | JokerEffect::PerHeldCard { each, .. } => {
                each.any(pred)
            }
            JokerEffect::All(effects) => effects.iter().any(|effect| effect.any(pred)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Condition {
    #[default]
    Always,
    HandIs(HandKind),
    HandContains(HandKind),
    PlayedAtMost(usize),
    PlayedExactly(usize),
    DiscardsLeft(u8),
    HandsLeft(u8),
    MoneyAtLeast(i64),
    AnteAtLeast(u8),
    JokersAtMost(usize),
    /// At least `count` cards matching the filter were discarded this round.
    DiscardedAtLeast(CardFilter, usize),
    AnyScoring(CardFilter),
    AllScoring(CardFilter),
    AllPlayed(CardFilter),
    Not(Box<Condition>),
}

impl Condition {
    pub fn holds(&self, ctx: &TriggerContext<'_>) -> bool {
        match self {
            Condition::Always => true,
            Condition::HandIs(kind) => ctx.hand == *kind,
            Condition::HandContains(kind) => ctx.hand.contains(*kind),
            Condition::PlayedAtMost(count) => ctx.played.len() <= *count,
            Condition::PlayedExactly(count) => ctx.played.len() == *count,
            Condition::DiscardsLeft(count) => ctx.discards_left == *count,
            Condition::HandsLeft(count) => ctx.hands_left == *count,
            Condition::MoneyAtLeast(amount) => ctx.money >= *amount,
            Condition::AnteAtLeast(ante) => ctx.ante >= *ante,
            Condition::JokersAtMost(count) => ctx.joker_count <= *count,
            Condition::DiscardedAtLeast(filter, count) => {
                ctx.discarded
                    .iter()
                    .filter(|card| filter.matches(card, ctx.rules))
                    .count()
                    >= *count
            }
            Condition::AnyScoring(filter) => ctx
                .scoring
                .iter()
                .any(|card| filter.matches(card, ctx.rules)),
            Condition::AllScoring(filter) => {
                !ctx.scoring.is_empty()
                    && ctx
                        .scoring
                        .iter()
                        .all(|card| filter.matches(card, ctx.rules))
            }
            Condition::AllPlayed(filter) => {
                !ctx.played.is_empty()
                    && ctx.played.iter().all(|card| filter.matches(card, ctx.rules))
            }
            Condition::Not(inner) => !inner.holds(ctx),
        }
    }

    fn collect_hands(&self, out: &mut Vec<HandKind>) {
        match self {
            Condition::HandIs(kind) | Condition::HandContains(kind) => out.push(*kind),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CardFilter {
    Any,
    Suit(Suit),
    Rank(Rank),
    Face,
    /// 2, 4, 6, 8 and 10.
    Even,
    /// Ace, 3, 5, 7 and 9.
    Odd,
    Enhancement(Enhancement),
    AnyOf(Vec<CardFilter>),
}

impl CardFilter {
    pub fn matches(&self, card: &Card, rules: HandEvalRules) -> bool {
        match self {
            CardFilter::Any => true,
            CardFilter::Enhancement(enhancement) => card.enhancement == Some(*enhancement),
            CardFilter::AnyOf(filters) => filters.iter().any(|filter| filter.matches(card, rules)),
            _ if card.is_stone() => false,
            CardFilter::Suit(suit) => {
                card.has_suit(*suit) || (rules.smeared_suits && card.suit.is_red() == suit.is_red())
            }
            CardFilter::Rank(rank) => card.rank == *rank,
            CardFilter::Face => card.rank.is_face(),
            CardFilter::Even => card.rank.value() <= 10 && card.rank.value() % 2 == 0,
            CardFilter::Odd => {
                card.rank == Rank::Ace || (card.rank.value() <= 9 && card.rank.value() % 2 == 1)
            }
        }
    }
}

/// When a counter moves relative to the value it yields.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CounterTiming {
    #[default]
    BeforeYield,
    AfterYield,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CounterYield {
    Chips,
    Mult,
    XMult,
}

/// A stateful counter kept in the joker's `vars` under `key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CounterSpec {
    pub key: String,
    pub start: f64,
    pub step: f64,
    #[serde(default)]
    pub grow_when: Condition,
    #[serde(default)]
    pub reset_when: Option<Condition>,
    #[serde(default)]
    pub timing: CounterTiming,
    pub yields: CounterYield,
}

impl CounterSpec {
    pub fn new(key: &str, start: f64, step: f64, yields: CounterYield) -> Self {
        Self {
            key: key.to_string(),
            start,
            step,
            grow_when: Condition::Always,
            reset_when: None,
            timing: CounterTiming::BeforeYield,
            yields,
        }
    }

    pub fn grow_when(mut self, condition: Condition) -> Self {
        self.grow_when = condition;
        self
    }

    pub fn reset_when(mut self, condition: Condition) -> Self {
        self.reset_when = Some(condition);
        self
    }

    pub fn after_yield(mut self) -> Self {
        self.timing = CounterTiming::AfterYield;
        self
    }
}
