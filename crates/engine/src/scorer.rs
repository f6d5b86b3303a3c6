use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strategist_core::{
    enumerate_selections, evaluate, resolve_jokers, BossRule, Card, EvalError, GameState,
    HandEvalRules, HandKind, HandSelection, HandTable, JokerCatalog, Resolution, ScoringEnv,
    TriggerContext, MAX_SELECTION,
};

/// A scored play option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub selection: HandSelection,
    pub hand: HandKind,
    pub score: i64,
    pub money: i64,
}

/// Evaluates selections against one observed state: evaluator, then the
/// held jokers, then boss restrictions.
#[derive(Debug, Clone, Copy)]
pub struct HandScorer<'a> {
    state: &'a GameState,
    catalog: &'a JokerCatalog,
    table: &'a HandTable,
    rules: HandEvalRules,
    discards_left: u8,
}

impl<'a> HandScorer<'a> {
    pub fn new(state: &'a GameState, catalog: &'a JokerCatalog, table: &'a HandTable) -> Self {
        Self {
            state,
            catalog,
            table,
            rules: catalog.rules_for(&state.jokers),
            discards_left: state.discards_left,
        }
    }

    /// The same scorer as seen after one more discard has been spent.
    pub fn after_discard(mut self) -> Self {
        self.discards_left = self.discards_left.saturating_sub(1);
        self
    }

    pub fn resolve(&self, hand: &[Card], selection: &HandSelection) -> Result<Resolution, EvalError> {
        let env = ScoringEnv::new(self.table, &self.state.hand_levels)
            .with_rules(self.rules)
            .with_boss_rule(self.state.boss_rule());
        let evaluation = evaluate(hand, selection, &env)?;
        let played = selection.cards(hand)?;
        let scoring: Vec<Card> = evaluation
            .scoring_indices
            .iter()
            .map(|idx| hand[*idx])
            .collect();
        let held = selection.held(hand);
        let ctx = TriggerContext {
            hand: evaluation.hand,
            played: &played,
            scoring: &scoring,
            held: &held,
            discarded: &self.state.discarded,
            money: self.state.money,
            ante: self.state.ante,
            hands_left: self.state.hands_left,
            discards_left: self.discards_left,
            joker_count: self.state.jokers.len(),
            rules: self.rules,
            boss_rule: self.state.boss_rule(),
        };
        Ok(resolve_jokers(evaluation, &ctx, &self.state.jokers, self.catalog))
    }

    /// Scores a selection. Plays the boss blind would void score zero.
    pub fn candidate(&self, hand: &[Card], selection: &HandSelection) -> Result<Candidate, EvalError> {
        let resolution = self.resolve(hand, selection)?;
        let evaluation = &resolution.evaluation;
        let score = if self.allowed(hand.len(), selection, evaluation.hand) {
            evaluation.score()
        } else {
            0
        };
        Ok(Candidate {
            selection: selection.clone(),
            hand: evaluation.hand,
            score,
            money: evaluation.money,
        })
    }

    fn allowed(&self, hand_size: usize, selection: &HandSelection, kind: HandKind) -> bool {
        match self.state.boss_rule() {
            Some(BossRule::MustPlayFive) => selection.len() >= MAX_SELECTION.min(hand_size),
            Some(BossRule::NoRepeatHand) => !self.state.hand_played_this_round(kind),
            _ => true,
        }
    }

    /// Every selection of `hand`, best first.
    pub fn rank_all(&self, hand: &[Card]) -> Vec<Candidate> {
        let mut ranked: Vec<Candidate> = enumerate_selections(hand.len(), MAX_SELECTION)
            .par_iter()
            .filter_map(|selection| self.candidate(hand, selection).ok())
            .collect();
        sort_candidates(&mut ranked);
        ranked
    }

    /// Highest score any selection of `hand` reaches. Runs on the calling
    /// thread.
    pub fn best_score(&self, hand: &[Card]) -> i64 {
        enumerate_selections(hand.len(), MAX_SELECTION)
            .iter()
            .filter_map(|selection| self.candidate(hand, selection).ok())
            .map(|candidate| candidate.score)
            .max()
            .unwrap_or(0)
    }
}

/// Higher score first, then fewer cards, then the smaller index list.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.selection.len().cmp(&b.selection.len()))
            .then_with(|| a.selection.indices().cmp(b.selection.indices()))
    });
}
