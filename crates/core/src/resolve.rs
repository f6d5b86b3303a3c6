use crate::{
    BossRule, Card, CounterSpec, CounterTiming, CounterYield, Edition, Evaluation, HandEvalRules,
    HandKind, Joker, JokerCatalog, JokerEffect, RuleEffect,
};
use std::collections::HashMap;

const FOIL_CHIPS: i64 = 50;
const HOLO_MULT: f64 = 10.0;
const POLY_XMULT: f64 = 1.5;

/// What joker conditions can see about the hand being scored.
#[derive(Debug, Clone)]
pub struct TriggerContext<'a> {
    pub hand: HandKind,
    pub played: &'a [Card],
    pub scoring: &'a [Card],
    pub held: &'a [Card],
    pub discarded: &'a [Card],
    pub money: i64,
    pub ante: u8,
    pub hands_left: u8,
    pub discards_left: u8,
    pub joker_count: usize,
    pub rules: HandEvalRules,
    pub boss_rule: Option<BossRule>,
}

impl<'a> TriggerContext<'a> {
    pub fn played(
        hand: HandKind,
        played: &'a [Card],
        scoring: &'a [Card],
        held: &'a [Card],
    ) -> Self {
        Self {
            hand,
            played,
            scoring,
            held,
            discarded: &[],
            money: 0,
            ante: 1,
            hands_left: 1,
            discards_left: 0,
            joker_count: 0,
            rules: HandEvalRules::default(),
            boss_rule: None,
        }
    }

    fn debuffed(&self, card: &Card) -> bool {
        self.boss_rule
            .map(|rule| rule.debuffs(card))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub evaluation: Evaluation,
    /// One state bag per joker, in the order the jokers were given.
    pub joker_states: Vec<HashMap<String, f64>>,
}

/// Applies `jokers` left to right on top of `evaluation`. Each joker gets
/// its edition bonus, then its catalog effect, then Polychrome. Nothing
/// outside the returned value is touched.
pub fn resolve_jokers(
    mut evaluation: Evaluation,
    ctx: &TriggerContext<'_>,
    jokers: &[Joker],
    catalog: &JokerCatalog,
) -> Resolution {
    let mut joker_states = Vec::with_capacity(jokers.len());
    for joker in jokers {
        let mut vars = joker.vars.clone();
        let source = joker.id.as_str();
        match joker.edition {
            Some(Edition::Foil) => evaluation.apply(source, RuleEffect::AddChips(FOIL_CHIPS)),
            Some(Edition::Holographic) => evaluation.apply(source, RuleEffect::AddMult(HOLO_MULT)),
            _ => {}
        }
        if let Some(def) = catalog.joker(&joker.id) {
            apply_effect(&def.effect, ctx, &mut vars, &mut evaluation, source);
        }
        if joker.edition == Some(Edition::Polychrome) {
            evaluation.apply(source, RuleEffect::MultiplyMult(POLY_XMULT));
        }
        joker_states.push(vars);
    }
    Resolution {
        evaluation,
        joker_states,
    }
}

fn apply_effect(
    effect: &JokerEffect,
    ctx: &TriggerContext<'_>,
    vars: &mut HashMap<String, f64>,
    evaluation: &mut Evaluation,
    source: &str,
) {
    match effect {
        JokerEffect::AddChips(value) => evaluation.apply(source, RuleEffect::AddChips(*value)),
        JokerEffect::AddMult(value) => evaluation.apply(source, RuleEffect::AddMult(*value)),
        JokerEffect::MultiplyMult(value) => {
            evaluation.apply(source, RuleEffect::MultiplyMult(*value))
        }
        JokerEffect::AddMoney(value) => evaluation.money += value,
        JokerEffect::Conditional { when, then } => {
            if when.holds(ctx) {
                apply_effect(then, ctx, vars, evaluation, source);
            }
        }
        JokerEffect::PerScoringCard { filter, each } => {
            for card in ctx.scoring {
                if ctx.debuffed(card) || !filter.matches(card, ctx.rules) {
                    continue;
                }
                let repeats = if card.seal == Some(crate::Seal::Red) { 2 } else { 1 };
                for _ in 0..repeats {
                    apply_effect(each, ctx, vars, evaluation, source);
                }
            }
        }
        JokerEffect::PerHeldCard { filter, each } => {
            for card in ctx.held {
                if ctx.debuffed(card) || !filter.matches(card, ctx.rules) {
                    continue;
                }
                apply_effect(each, ctx, vars, evaluation, source);
            }
        }
        JokerEffect::Counter(spec) => apply_counter(spec, ctx, vars, evaluation, source),
        JokerEffect::All(effects) => {
            for inner in effects {
                apply_effect(inner, ctx, vars, evaluation, source);
            }
        }
        JokerEffect::Passive => {}
    }
}

fn apply_counter(
    spec: &CounterSpec,
    ctx: &TriggerContext<'_>,
    vars: &mut HashMap<String, f64>,
    evaluation: &mut Evaluation,
    source: &str,
) {
    let current = vars.get(&spec.key).copied().unwrap_or(spec.start);
    let reset = spec
        .reset_when
        .as_ref()
        .map(|condition| condition.holds(ctx))
        .unwrap_or(false);
    let next = if reset {
        spec.start
    } else if spec.grow_when.holds(ctx) {
        current + spec.step
    } else {
        current
    };
    let shown = match spec.timing {
        CounterTiming::BeforeYield => next,
        CounterTiming::AfterYield => current,
    };
    vars.insert(spec.key.clone(), next);

    if shown <= 0.0 {
        return;
    }
    let effect = match spec.yields {
        CounterYield::Chips => RuleEffect::AddChips(crate::round_half_up(shown)),
        CounterYield::Mult => RuleEffect::AddMult(shown),
        CounterYield::XMult => RuleEffect::MultiplyMult(shown),
    };
    evaluation.apply(source, effect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evaluate, CardFilter, Condition, HandSelection, HandTable, Rank, ScoringEnv, Suit};

    fn pair_of_kings() -> (Vec<Card>, Evaluation) {
        let hand = vec![
            Card::standard(Suit::Spades, Rank::King),
            Card::standard(Suit::Hearts, Rank::King),
            Card::standard(Suit::Clubs, Rank::Two),
        ];
        let table = HandTable::standard();
        let levels = HashMap::new();
        let env = ScoringEnv::new(&table, &levels);
        let eval = evaluate(&hand, &HandSelection::new(vec![0, 1]), &env).expect("eval");
        (hand, eval)
    }

    #[test]
    fn unknown_joker_contributes_only_its_edition() {
        let (hand, eval) = pair_of_kings();
        let ctx = TriggerContext::played(eval.hand, &hand[..2], &hand[..2], &hand[2..]);
        let catalog = JokerCatalog::default();
        let jokers = vec![Joker::new("mystery").with_edition(Edition::Foil)];
        let out = resolve_jokers(eval.clone(), &ctx, &jokers, &catalog);
        assert_eq!(out.evaluation.chips(), eval.chips() + 50);
        assert_eq!(out.joker_states.len(), 1);
    }

    #[test]
    fn unmet_condition_passes_through() {
        let (hand, eval) = pair_of_kings();
        let ctx = TriggerContext::played(eval.hand, &hand[..2], &hand[..2], &hand[2..]);
        let mut catalog = JokerCatalog::default();
        catalog.insert(crate::JokerDef::new(
            "flush_only",
            JokerEffect::when(Condition::HandContains(HandKind::Flush), JokerEffect::AddMult(8.0)),
        ));
        let out = resolve_jokers(eval.clone(), &ctx, &[Joker::new("flush_only")], &catalog);
        assert_eq!(out.evaluation.score(), eval.score());
    }

    #[test]
    fn discarded_jacks_wake_hit_the_road() {
        let (hand, eval) = pair_of_kings();
        let discarded = [Card::standard(Suit::Diamonds, Rank::Jack)];
        let mut ctx = TriggerContext::played(eval.hand, &hand[..2], &hand[..2], &hand[2..]);
        let catalog = JokerCatalog::standard();
        let jokers = [Joker::new("hit_the_road")];
        assert_eq!(resolve_jokers(eval.clone(), &ctx, &jokers, &catalog).evaluation.score(), 60);
        ctx.discarded = &discarded;
        assert_eq!(resolve_jokers(eval, &ctx, &jokers, &catalog).evaluation.score(), 90);
    }

    #[test]
    fn counter_grows_and_resets() {
        let (hand, eval) = pair_of_kings();
        let ctx = TriggerContext::played(eval.hand, &hand[..2], &hand[..2], &hand[2..]);
        let mut catalog = JokerCatalog::default();
        let spec = CounterSpec::new("streak", 0.0, 1.0, CounterYield::Mult)
            .grow_when(Condition::Not(Box::new(Condition::AnyScoring(CardFilter::Face))))
            .reset_when(Condition::AnyScoring(CardFilter::Face));
        catalog.insert(crate::JokerDef::new("bus", JokerEffect::Counter(spec)));

        let mut joker = Joker::new("bus");
        joker.vars.insert("streak".to_string(), 4.0);
        let out = resolve_jokers(eval.clone(), &ctx, &[joker], &catalog);
        assert_eq!(out.joker_states[0].get("streak"), Some(&0.0));
        assert_eq!(out.evaluation.score(), eval.score());
    }

    #[test]
    fn after_yield_counter_reports_previous_value() {
        let (hand, eval) = pair_of_kings();
        let ctx = TriggerContext::played(eval.hand, &hand[..2], &hand[..2], &hand[2..]);
        let mut catalog = JokerCatalog::default();
        let spec = CounterSpec::new("chips", 100.0, -5.0, CounterYield::Chips).after_yield();
        catalog.insert(crate::JokerDef::new("cream", JokerEffect::Counter(spec)));
        let out = resolve_jokers(eval.clone(), &ctx, &[Joker::new("cream")], &catalog);
        assert_eq!(out.evaluation.chips(), eval.chips() + 100);
        assert_eq!(out.joker_states[0].get("chips"), Some(&95.0));
    }
}
