use crate::{
    classify_with_suits, wild_suit_assignments, BossRule, Card, Classification, Edition,
    Enhancement, EvalError, HandEvalRules, HandKind, HandSelection, HandTable, RuleEffect, Score,
    ScoreTraceStep, Seal,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BONUS_CHIPS: i64 = 30;
const STONE_CHIPS: i64 = 50;
const FOIL_CHIPS: i64 = 50;
const MULT_CARD_MULT: f64 = 4.0;
// 1 in 5 for +20 mult.
const LUCKY_EXPECTED_MULT: f64 = 4.0;
const HOLO_MULT: f64 = 10.0;
const GLASS_XMULT: f64 = 2.0;
const POLY_XMULT: f64 = 1.5;
const STEEL_XMULT: f64 = 1.5;
const GOLD_SEAL_MONEY: i64 = 3;

/// Everything the evaluator needs besides the cards themselves.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEnv<'a> {
    pub table: &'a HandTable,
    pub levels: &'a HashMap<HandKind, u32>,
    pub rules: HandEvalRules,
    pub boss_rule: Option<BossRule>,
}

impl<'a> ScoringEnv<'a> {
    pub fn new(table: &'a HandTable, levels: &'a HashMap<HandKind, u32>) -> Self {
        Self {
            table,
            levels,
            rules: HandEvalRules::default(),
            boss_rule: None,
        }
    }

    pub fn with_rules(mut self, rules: HandEvalRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_boss_rule(mut self, boss_rule: Option<BossRule>) -> Self {
        self.boss_rule = boss_rule;
        self
    }

    pub fn level(&self, kind: HandKind) -> u32 {
        self.levels
            .get(&crate::level_kind(kind))
            .copied()
            .unwrap_or(1)
    }

    fn debuffed(&self, card: &Card) -> bool {
        self.boss_rule
            .map(|rule| rule.debuffs(card))
            .unwrap_or(false)
    }
}

/// Result of scoring one selection. Jokers keep adding to it through
/// [`Evaluation::apply`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub hand: HandKind,
    pub level: u32,
    pub selection: HandSelection,
    /// Indices into the hand of the cards that scored.
    pub scoring_indices: Vec<usize>,
    /// Category chips plus the chips of scoring cards.
    pub base_chips: i64,
    /// Chips added after the card pass.
    pub chip_bonus: i64,
    pub mult: f64,
    pub money: i64,
    #[serde(default)]
    pub trace: Vec<ScoreTraceStep>,
}

impl Evaluation {
    pub fn chips(&self) -> i64 {
        self.base_chips.saturating_add(self.chip_bonus)
    }

    pub fn accumulator(&self) -> Score {
        Score::new(self.chips(), self.mult)
    }

    pub fn score(&self) -> i64 {
        self.accumulator().total()
    }

    pub fn apply(&mut self, source: &str, effect: RuleEffect) {
        let before = self.accumulator();
        match effect {
            RuleEffect::AddChips(value) => {
                self.chip_bonus = self.chip_bonus.saturating_add(value)
            }
            RuleEffect::AddMult(value) => self.mult += value,
            RuleEffect::MultiplyMult(value) => self.mult *= value,
        }
        self.trace.push(ScoreTraceStep {
            source: source.to_string(),
            effect,
            before,
            after: self.accumulator(),
        });
    }
}

/// Scores `selection` out of `hand`. Wild cards are tried as every suit and
/// the highest scoring category wins, stronger category on ties.
pub fn evaluate(
    hand: &[Card],
    selection: &HandSelection,
    env: &ScoringEnv<'_>,
) -> Result<Evaluation, EvalError> {
    let cards = selection.cards(hand)?;
    let held = selection.held(hand);

    let mut best: Option<Evaluation> = None;
    for classification in classifications(&cards, env.rules) {
        let candidate = card_pass(&cards, &held, selection, &classification, env);
        let better = match &best {
            None => true,
            Some(current) => {
                (candidate.score(), candidate.hand.strength())
                    > (current.score(), current.hand.strength())
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    // `classifications` always yields at least one entry for a valid selection.
    best.ok_or(EvalError::InvalidSelection(crate::SelectionFault::Empty))
}

/// Distinct classifications over the suit assignments that can matter.
fn classifications(cards: &[Card], rules: HandEvalRules) -> Vec<Classification> {
    let mut out: Vec<Classification> = Vec::new();
    for suits in wild_suit_assignments(cards, rules) {
        let found = classify_with_suits(cards, &suits, rules);
        if !out.contains(&found) {
            out.push(found);
        }
    }
    out
}

fn card_pass(
    cards: &[Card],
    held: &[Card],
    selection: &HandSelection,
    classification: &Classification,
    env: &ScoringEnv<'_>,
) -> Evaluation {
    let kind = classification.kind;
    let level = env.level(kind);
    let (mut chips, mut mult) = env.table.hand_base_for_level(kind, level);
    if env.boss_rule == Some(BossRule::HalveBase) {
        chips = crate::round_half_up(chips as f64 / 2.0);
        mult /= 2.0;
    }

    let mut score = Score::new(chips, mult);
    let mut trace = Vec::new();
    let mut money = 0;

    for pos in &classification.scoring {
        let card = &cards[*pos];
        if env.debuffed(card) {
            continue;
        }
        let source = card.to_string();
        for _ in 0..triggers(card) {
            for effect in scored_card_effects(card) {
                push_step(&mut score, &mut trace, &source, effect);
            }
            if card.seal == Some(Seal::Gold) {
                money += GOLD_SEAL_MONEY;
            }
        }
    }

    for card in held {
        if card.enhancement != Some(Enhancement::Steel) || env.debuffed(card) {
            continue;
        }
        let source = format!("{card} held");
        for _ in 0..triggers(card) {
            push_step(
                &mut score,
                &mut trace,
                &source,
                RuleEffect::MultiplyMult(STEEL_XMULT),
            );
        }
    }

    let scoring_indices = classification
        .scoring
        .iter()
        .map(|pos| selection.indices()[*pos])
        .collect();

    Evaluation {
        hand: kind,
        level,
        selection: selection.clone(),
        scoring_indices,
        base_chips: score.chips,
        chip_bonus: 0,
        mult: score.mult,
        money,
        trace,
    }
}

fn triggers(card: &Card) -> usize {
    if card.seal == Some(Seal::Red) {
        2
    } else {
        1
    }
}

/// Chip effects first, then additive mult, then multipliers.
fn scored_card_effects(card: &Card) -> Vec<RuleEffect> {
    let mut effects = Vec::new();
    if card.is_stone() {
        effects.push(RuleEffect::AddChips(STONE_CHIPS));
    } else {
        effects.push(RuleEffect::AddChips(card.rank.chips()));
    }
    match card.enhancement {
        Some(Enhancement::Bonus) => effects.push(RuleEffect::AddChips(BONUS_CHIPS)),
        Some(Enhancement::Mult) => effects.push(RuleEffect::AddMult(MULT_CARD_MULT)),
        Some(Enhancement::Lucky) => effects.push(RuleEffect::AddMult(LUCKY_EXPECTED_MULT)),
        _ => {}
    }
    match card.edition {
        Some(Edition::Foil) => effects.push(RuleEffect::AddChips(FOIL_CHIPS)),
        Some(Edition::Holographic) => effects.push(RuleEffect::AddMult(HOLO_MULT)),
        _ => {}
    }
    if card.enhancement == Some(Enhancement::Glass) {
        effects.push(RuleEffect::MultiplyMult(GLASS_XMULT));
    }
    if card.edition == Some(Edition::Polychrome) {
        effects.push(RuleEffect::MultiplyMult(POLY_XMULT));
    }
    effects
}

fn push_step(score: &mut Score, trace: &mut Vec<ScoreTraceStep>, source: &str, effect: RuleEffect) {
    let before = score.clone();
    score.apply(&effect);
    trace.push(ScoreTraceStep {
        source: source.to_string(),
        effect,
        before,
        after: score.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, SelectionFault, Suit};

    fn env_parts() -> (HandTable, HashMap<HandKind, u32>) {
        (HandTable::standard(), HashMap::new())
    }

    #[test]
    fn pair_of_kings_scores_base_plus_ranks() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels);
        let hand = vec![
            Card::standard(Suit::Spades, Rank::King),
            Card::standard(Suit::Hearts, Rank::King),
            Card::standard(Suit::Clubs, Rank::Two),
        ];
        let eval = evaluate(&hand, &HandSelection::new(vec![0, 1, 2]), &env).expect("eval");
        assert_eq!(eval.hand, HandKind::Pair);
        assert_eq!(eval.scoring_indices, vec![0, 1]);
        assert_eq!(eval.base_chips, 30);
        assert_eq!(eval.score(), 60);
    }

    #[test]
    fn wild_card_completes_a_flush() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels);
        let hand = vec![
            Card::standard(Suit::Hearts, Rank::Two),
            Card::standard(Suit::Hearts, Rank::Five),
            Card::standard(Suit::Hearts, Rank::Nine),
            Card::standard(Suit::Hearts, Rank::Jack),
            Card::standard(Suit::Spades, Rank::King).with_enhancement(Enhancement::Wild),
        ];
        let eval = evaluate(&hand, &HandSelection::new(vec![0, 1, 2, 3, 4]), &env).expect("eval");
        assert_eq!(eval.hand, HandKind::Flush);
        // 35 + 2 + 5 + 9 + 10 + 10
        assert_eq!(eval.base_chips, 71);
    }

    /// Best (score, hand) over all 4^k suit assignments of the wild cards.
    fn exhaustive_best(hand: &[Card], env: &ScoringEnv<'_>) -> (i64, HandKind) {
        let selection = HandSelection::new((0..hand.len()).collect());
        let wild: Vec<usize> = (0..hand.len()).filter(|idx| hand[*idx].is_wild()).collect();
        let mut suits: Vec<Suit> = hand.iter().map(|card| card.suit).collect();
        let mut best: Option<(i64, u8, HandKind)> = None;
        for code in 0..Suit::ALL.len().pow(wild.len() as u32) {
            let mut rest = code;
            for idx in &wild {
                suits[*idx] = Suit::ALL[rest % Suit::ALL.len()];
                rest /= Suit::ALL.len();
            }
            let classification = classify_with_suits(hand, &suits, env.rules);
            let eval = card_pass(hand, &[], &selection, &classification, env);
            let key = (eval.score(), eval.hand.strength(), eval.hand);
            let better = best
                .map(|current| (key.0, key.1) > (current.0, current.1))
                .unwrap_or(true);
            if better {
                best = Some(key);
            }
        }
        best.map(|(score, _, kind)| (score, kind))
            .unwrap_or((0, HandKind::HighCard))
    }

    #[test]
    fn wild_assignments_agree_with_exhaustive_search() {
        use Rank::*;
        let table = HandTable::standard();
        let plain = HashMap::new();
        // levels that make non-flush categories outscore their flush forms
        let levelled = HashMap::from([(HandKind::TwoPair, 15), (HandKind::Straight, 12)]);
        let patterns = [
            [Two, Two, Nine, Nine, King],
            [Five, Six, Seven, Eight, Nine],
            [Ten, Jack, Queen, King, Ace],
            [Four, Four, Four, Eight, Eight],
            [Two, Five, Seven, Jack, King],
        ];
        let printed = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds, Suit::Hearts];
        let smeared = HandEvalRules {
            smeared_suits: true,
            ..HandEvalRules::default()
        };
        let selection = HandSelection::new(vec![0, 1, 2, 3, 4]);

        for levels in [&plain, &levelled] {
            for rules in [HandEvalRules::default(), smeared] {
                let env = ScoringEnv::new(&table, levels).with_rules(rules);
                for ranks in &patterns {
                    for wilds in 1..=5 {
                        let hand: Vec<Card> = ranks
                            .iter()
                            .zip(printed)
                            .enumerate()
                            .map(|(idx, (rank, suit))| {
                                let card = Card::standard(suit, *rank);
                                if idx < wilds {
                                    card.with_enhancement(Enhancement::Wild)
                                } else {
                                    card
                                }
                            })
                            .collect();
                        let eval = evaluate(&hand, &selection, &env).expect("eval");
                        assert_eq!(
                            (eval.score(), eval.hand),
                            exhaustive_best(&hand, &env),
                            "{ranks:?} with {wilds} wild"
                        );
                        assert!(classifications(&hand, rules).len() <= Suit::ALL.len() + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn held_steel_and_glass_multiply() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels);
        let hand = vec![
            Card::standard(Suit::Spades, Rank::Ace).with_enhancement(Enhancement::Glass),
            Card::standard(Suit::Hearts, Rank::Two).with_enhancement(Enhancement::Steel),
        ];
        let eval = evaluate(&hand, &HandSelection::new(vec![0]), &env).expect("eval");
        assert_eq!(eval.hand, HandKind::HighCard);
        assert_eq!(eval.base_chips, 16);
        assert!((eval.mult - 3.0).abs() < 1e-9);
        assert_eq!(eval.score(), 48);
    }

    #[test]
    fn red_seal_retriggers_card() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels);
        let hand = vec![Card::standard(Suit::Spades, Rank::Ace).with_seal(Seal::Red)];
        let eval = evaluate(&hand, &HandSelection::new(vec![0]), &env).expect("eval");
        assert_eq!(eval.base_chips, 5 + 22);
    }

    #[test]
    fn debuffed_cards_add_nothing() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels)
            .with_boss_rule(Some(BossRule::DebuffSuit(Suit::Spades)));
        let hand = vec![
            Card::standard(Suit::Spades, Rank::Nine),
            Card::standard(Suit::Hearts, Rank::Nine),
        ];
        let eval = evaluate(&hand, &HandSelection::new(vec![0, 1]), &env).expect("eval");
        assert_eq!(eval.base_chips, 19);
    }

    #[test]
    fn invalid_selection_is_rejected() {
        let (table, levels) = env_parts();
        let env = ScoringEnv::new(&table, &levels);
        let hand = vec![Card::standard(Suit::Spades, Rank::Nine)];
        let err = evaluate(&hand, &HandSelection::new(vec![3]), &env).unwrap_err();
        assert_eq!(
            err,
            EvalError::InvalidSelection(SelectionFault::IndexOutOfRange {
                index: 3,
                hand_size: 1
            })
        );
    }
}
