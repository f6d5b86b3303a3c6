use crate::{Candidate, EngineError, HandScorer, Phase, RngState};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategist_core::{
    Card, Decision, Enhancement, GameState, HandKind, HandSelection, HandTable, JokerCatalog, Rank,
    StrategyConfig, Suit,
};
use strategist_memory::{MemoryKey, MemoryStore};
use tracing::{debug, warn};

/// Cards the pair-and-suit heuristic throws away at most.
const HEURISTIC_DISCARD_MAX: usize = 3;
/// Largest share by which hand history can raise the discard threshold.
const MAX_HISTORY_BIAS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    AwaitingAction,
    HandPlayed,
    RoundWon,
    RoundLost,
}

impl RoundState {
    pub fn of(state: &GameState) -> Self {
        let requirement = state.requirement();
        if requirement > 0 && state.round_score >= requirement {
            RoundState::RoundWon
        } else if state.hands_left == 0 {
            RoundState::RoundLost
        } else if state.played.is_empty() {
            RoundState::AwaitingAction
        } else {
            RoundState::HandPlayed
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::RoundWon | RoundState::RoundLost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyReason {
    /// The best play alone reaches the requirement.
    ClearsBlind,
    /// The best play plus a conservative estimate of the remaining hands does.
    ProjectedClear,
    /// A discard is expected to improve the best play by more than the
    /// threshold.
    DiscardForValue,
    BestAvailable,
    RoundOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardOption {
    pub selection: HandSelection,
    pub expected_best: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub decision: Option<Decision>,
    pub round: RoundState,
    pub reason: PolicyReason,
    pub remaining: i64,
    pub candidates: Vec<Candidate>,
    pub projection: f64,
    pub discard: Option<DiscardOption>,
    pub threshold: f64,
    /// Bias in `0.0..=0.5` taken from the best hand type's past results.
    pub history: f64,
    /// Set when the memory store could not be read this tick.
    pub history_unavailable: bool,
}

impl PolicyOutcome {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Play versus discard for one tick of the playing phase.
#[derive(Clone, Copy)]
pub struct DecisionPolicy<'a> {
    config: &'a StrategyConfig,
    catalog: &'a JokerCatalog,
    table: &'a HandTable,
    memory: Option<&'a dyn MemoryStore>,
}

impl<'a> DecisionPolicy<'a> {
    pub fn new(config: &'a StrategyConfig, catalog: &'a JokerCatalog, table: &'a HandTable) -> Self {
        Self {
            config,
            catalog,
            table,
            memory: None,
        }
    }

    /// Hand types that cleared blinds before make the policy keener to
    /// play them than to discard.
    pub fn with_memory(mut self, memory: Option<&'a dyn MemoryStore>) -> Self {
        self.memory = memory;
        self
    }

    pub fn decide(&self, state: &GameState, rng: &RngState) -> Result<PolicyOutcome, EngineError> {
        let round = RoundState::of(state);
        let remaining = state.remaining_requirement();
        if round.is_terminal() {
            return Ok(PolicyOutcome {
                decision: None,
                round,
                reason: PolicyReason::RoundOver,
                remaining,
                candidates: Vec::new(),
                projection: 0.0,
                discard: None,
                threshold: 0.0,
                history: 0.0,
                history_unavailable: false,
            });
        }
        if state.hand.is_empty() {
            return Err(EngineError::NoDecision {
                phase: Phase::Playing,
                detail: "hand is empty".to_string(),
            });
        }

        let scorer = HandScorer::new(state, self.catalog, self.table);
        let mut candidates = scorer.rank_all(&state.hand);
        let Some(best) = candidates.first().cloned() else {
            return Err(EngineError::NoDecision {
                phase: Phase::Playing,
                detail: "no playable selection".to_string(),
            });
        };

        let risk = self.config.risk();
        let hands = f64::from(state.hands_left);
        let best_score = best.score as f64;
        let projection = best_score + (hands - 1.0) * best_score * (0.5 + 0.4 * risk);
        let (history, history_unavailable) = self.hand_history(best.hand);
        let threshold = best_score * (1.0 - risk) * 0.5 * (1.0 + 1.0 / hands) * (1.0 + history);

        let mut outcome = PolicyOutcome {
            decision: Some(Decision::PlayCards(best.selection.clone())),
            round,
            reason: PolicyReason::BestAvailable,
            remaining,
            candidates: Vec::new(),
            projection,
            discard: None,
            threshold,
            history,
            history_unavailable,
        };

        if best.score >= remaining {
            outcome.reason = PolicyReason::ClearsBlind;
        } else if projection >= remaining as f64 {
            outcome.reason = PolicyReason::ProjectedClear;
        } else if state.discards_left > 0 {
            let options = self.discard_options(state, &candidates);
            let discard = self.best_discard(&scorer, state, options, rng);
            if let Some(discard) = discard {
                debug!(
                    selection = %discard.selection,
                    expected = discard.expected_best,
                    best = best.score,
                    threshold,
                    "discard estimate"
                );
                if discard.expected_best - best_score > threshold {
                    outcome.decision = Some(Decision::DiscardCards(discard.selection.clone()));
                    outcome.reason = PolicyReason::DiscardForValue;
                }
                outcome.discard = Some(discard);
            }
        }

        candidates.truncate(self.config.max_play_candidates.max(1));
        outcome.candidates = candidates;
        Ok(outcome)
    }

    /// Weighted past result of `hand`, clamped to `0.0..=MAX_HISTORY_BIAS`.
    /// A store failure counts as no history.
    fn hand_history(&self, hand: HandKind) -> (f64, bool) {
        let Some(memory) = self.memory else {
            return (0.0, false);
        };
        match memory.query(&MemoryKey::Hand(hand)) {
            Ok(stats) => {
                let bias = self.config.history_weight * stats.mean * stats.confidence;
                (bias.clamp(0.0, MAX_HISTORY_BIAS), false)
            }
            Err(err) => {
                warn!(error = %err, "memory store unavailable, ignoring history");
                (0.0, true)
            }
        }
    }

    /// Complements of the top plays, lowest value cards first, plus the
    /// "keep pairs and suit draws" set.
    pub fn discard_options(&self, state: &GameState, ranked: &[Candidate]) -> Vec<HandSelection> {
        let hand = &state.hand;
        let limit = self.config.max_discard_size.clamp(1, strategist_core::MAX_SELECTION);
        let cap = self.config.max_discard_candidates.max(1);
        let mut options: Vec<HandSelection> = Vec::new();
        let mut push = |mut indices: Vec<usize>| {
            if indices.is_empty() {
                return;
            }
            indices.sort_unstable();
            let selection = HandSelection::new(indices);
            if !options.contains(&selection) {
                options.push(selection);
            }
        };

        push(keep_pairs_and_draws(hand));
        for candidate in ranked.iter().take(cap) {
            let mut rest: Vec<usize> = (0..hand.len())
                .filter(|idx| !candidate.selection.contains(*idx))
                .collect();
            rest.sort_by_key(|idx| (card_value(&hand[*idx]), *idx));
            rest.truncate(limit);
            push(rest);
        }
        options.truncate(cap);
        options
    }

    fn best_discard(
        &self,
        scorer: &HandScorer<'_>,
        state: &GameState,
        options: Vec<HandSelection>,
        rng: &RngState,
    ) -> Option<DiscardOption> {
        let pool = state.unseen_deck();
        let samples = self.config.discard_samples.max(1);
        let scorer = scorer.after_discard();
        let mut estimates: Vec<DiscardOption> = options
            .into_par_iter()
            .enumerate()
            .map(|(stream, selection)| {
                let mut draws = rng.stream(stream as u64);
                let kept = selection.held(&state.hand);
                let mut total = 0.0;
                for _ in 0..samples {
                    let mut next = kept.clone();
                    next.extend(draws.draw(&pool, selection.len()));
                    total += scorer.best_score(&next) as f64;
                }
                DiscardOption {
                    selection,
                    expected_best: total / samples as f64,
                }
            })
            .collect();
        estimates.sort_by(|a, b| {
            b.expected_best
                .total_cmp(&a.expected_best)
                .then_with(|| a.selection.len().cmp(&b.selection.len()))
                .then_with(|| a.selection.indices().cmp(b.selection.indices()))
        });
        estimates.into_iter().next()
    }
}

/// Cards whose rank is unpaired and whose suit has fewer than three cards
/// in hand, cheapest first.
fn keep_pairs_and_draws(hand: &[Card]) -> Vec<usize> {
    let mut ranks: HashMap<Rank, usize> = HashMap::new();
    let mut suits: HashMap<Suit, usize> = HashMap::new();
    for card in hand.iter().filter(|card| !card.is_stone()) {
        *ranks.entry(card.rank).or_default() += 1;
        *suits.entry(card.suit).or_default() += 1;
    }
    let mut loose: Vec<usize> = (0..hand.len())
        .filter(|idx| {
            let card = &hand[*idx];
            !card.is_stone()
                && !card.is_wild()
                && ranks.get(&card.rank).copied().unwrap_or(0) == 1
                && suits.get(&card.suit).copied().unwrap_or(0) < 3
        })
        .collect();
    loose.sort_by_key(|idx| (card_value(&hand[*idx]), *idx));
    loose.truncate(HEURISTIC_DISCARD_MAX);
    loose
}

/// Rough worth of keeping a card: rank chips plus modifiers.
fn card_value(card: &Card) -> i64 {
    let mut value = if card.is_stone() { 50 } else { card.rank.chips() };
    value += match card.enhancement {
        Some(Enhancement::Bonus) => 30,
        Some(Enhancement::Mult) | Some(Enhancement::Lucky) => 20,
        Some(Enhancement::Glass) | Some(Enhancement::Steel) => 40,
        Some(Enhancement::Wild) => 15,
        _ => 0,
    };
    if card.edition.is_some() || card.seal.is_some() {
        value += 25;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategist_core::{Blind, BlindKind, Card};
    use strategist_memory::{
        HandOutcome, InMemoryStore, KeyStats, MemoryError, MemorySummary, Outcome, OutcomeScope,
    };

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::standard(suit, rank)
    }

    fn state(requirement: i64, hand: Vec<Card>) -> GameState {
        GameState::new(
            1,
            Blind {
                id: "small".to_string(),
                kind: BlindKind::Small,
                requirement,
                boss_rule: None,
            },
            hand,
        )
    }

    #[test]
    fn round_state_follows_score_and_hands() {
        let mut observed = state(300, vec![c(Suit::Spades, Rank::Two)]);
        assert_eq!(RoundState::of(&observed), RoundState::AwaitingAction);
        observed.round_score = 300;
        assert_eq!(RoundState::of(&observed), RoundState::RoundWon);
        observed.round_score = 10;
        observed.hands_left = 0;
        assert_eq!(RoundState::of(&observed), RoundState::RoundLost);
    }

    fn nines_and_junk() -> Vec<Card> {
        vec![
            c(Suit::Hearts, Rank::Nine),
            c(Suit::Spades, Rank::Nine),
            c(Suit::Hearts, Rank::Two),
            c(Suit::Diamonds, Rank::Five),
            c(Suit::Clubs, Rank::Three),
            c(Suit::Diamonds, Rank::King),
            c(Suit::Clubs, Rank::Seven),
            c(Suit::Spades, Rank::Jack),
        ]
    }

    struct OfflineStore;

    impl MemoryStore for OfflineStore {
        fn record(&self, _outcome: Outcome) -> Result<(), MemoryError> {
            Err(MemoryError::StoreUnavailable("offline".to_string()))
        }

        fn query(&self, _key: &MemoryKey) -> Result<KeyStats, MemoryError> {
            Err(MemoryError::StoreUnavailable("offline".to_string()))
        }

        fn summary(&self) -> Result<MemorySummary, MemoryError> {
            Err(MemoryError::StoreUnavailable("offline".to_string()))
        }
    }

    fn pair_rounds(count: usize, score: i64) -> InMemoryStore {
        let outcomes = (0..count)
            .map(|_| Outcome {
                session_id: "s1".to_string(),
                scope: OutcomeScope::Round,
                ante: 1,
                won: true,
                score,
                requirement: 300,
                jokers: Vec::new(),
                hands: vec![HandOutcome {
                    hand: HandKind::Pair,
                    score,
                }],
            })
            .collect();
        InMemoryStore::from_outcomes(outcomes)
    }

    #[test]
    fn last_hand_without_discards_plays_best() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let table = HandTable::standard();
        let policy = DecisionPolicy::new(&config, &catalog, &table);
        let mut observed = state(300, nines_and_junk());
        observed.hands_left = 1;
        observed.discards_left = 0;

        let outcome = policy.decide(&observed, &RngState::from_seed(7)).expect("decide");
        let best = outcome.best().expect("best").clone();
        assert!(best.score < 300);
        assert_eq!(best.hand, HandKind::Pair);
        assert_eq!(outcome.reason, PolicyReason::BestAvailable);
        assert_eq!(outcome.decision, Some(Decision::PlayCards(best.selection)));
        assert!(outcome.discard.is_none());
    }

    #[test]
    fn unreadable_memory_leaves_threshold_alone() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let table = HandTable::standard();
        let observed = state(300, nines_and_junk());
        let rng = RngState::from_seed(7);

        let plain = DecisionPolicy::new(&config, &catalog, &table)
            .decide(&observed, &rng)
            .expect("decide");
        let offline = OfflineStore;
        let outcome = DecisionPolicy::new(&config, &catalog, &table)
            .with_memory(Some(&offline))
            .decide(&observed, &rng)
            .expect("decide");
        assert!(outcome.history_unavailable);
        assert_eq!(outcome.history, 0.0);
        assert_eq!(outcome.threshold, plain.threshold);
        assert_eq!(outcome.decision, plain.decision);
    }

    #[test]
    fn winning_hand_history_raises_discard_threshold() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let table = HandTable::standard();
        let observed = state(300, nines_and_junk());
        let rng = RngState::from_seed(7);

        let plain = DecisionPolicy::new(&config, &catalog, &table)
            .decide(&observed, &rng)
            .expect("decide");
        assert_eq!(plain.history, 0.0);

        // one sample: 1.0 x 1/6
        let weak = pair_rounds(1, 300);
        let outcome = DecisionPolicy::new(&config, &catalog, &table)
            .with_memory(Some(&weak))
            .decide(&observed, &rng)
            .expect("decide");
        assert!(!outcome.history_unavailable);
        assert!((outcome.history - 1.0 / 6.0).abs() < 1e-9);
        assert!((outcome.threshold - plain.threshold * (1.0 + 1.0 / 6.0)).abs() < 1e-9);

        // capped however strong the record
        let strong = pair_rounds(20, 900);
        let outcome = DecisionPolicy::new(&config, &catalog, &table)
            .with_memory(Some(&strong))
            .decide(&observed, &rng)
            .expect("decide");
        assert_eq!(outcome.history, MAX_HISTORY_BIAS);
        assert!((outcome.threshold - plain.threshold * 1.5).abs() < 1e-9);
    }

    #[test]
    fn heuristic_keeps_pairs_and_suit_draws() {
        let hand = vec![
            c(Suit::Hearts, Rank::Nine),
            c(Suit::Spades, Rank::Nine),
            c(Suit::Hearts, Rank::Two),
            c(Suit::Hearts, Rank::Five),
            c(Suit::Clubs, Rank::Three),
            c(Suit::Diamonds, Rank::King),
            c(Suit::Clubs, Rank::Seven),
        ];
        // hearts have three cards; the nines pair
        assert_eq!(keep_pairs_and_draws(&hand), vec![4, 6, 5]);
    }

    #[test]
    fn discard_options_are_unique_and_bounded() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let table = HandTable::standard();
        let policy = DecisionPolicy::new(&config, &catalog, &table);
        let observed = state(
            300,
            vec![
                c(Suit::Hearts, Rank::Nine),
                c(Suit::Spades, Rank::Nine),
                c(Suit::Hearts, Rank::Two),
                c(Suit::Hearts, Rank::Five),
                c(Suit::Clubs, Rank::Three),
                c(Suit::Diamonds, Rank::King),
                c(Suit::Clubs, Rank::Seven),
                c(Suit::Spades, Rank::Jack),
            ],
        );
        let scorer = HandScorer::new(&observed, &catalog, &table);
        let ranked = scorer.rank_all(&observed.hand);
        let options = policy.discard_options(&observed, &ranked);
        assert!(!options.is_empty());
        assert!(options.len() <= config.max_discard_candidates);
        for (pos, option) in options.iter().enumerate() {
            assert!(option.len() <= 5);
            assert!(!options[..pos].contains(option));
        }
    }
}
