use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategist_core::{
    ConsumableKind, Decision, GameState, HandKind, JokerCatalog, JokerDef, OfferKind, ShopItem,
    StrategyConfig, SynergyTable,
};
use strategist_memory::{MemoryKey, MemoryStore};
use tracing::warn;

/// What the current ante should spend money on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntePlan {
    /// Antes 1 to 3: money generation.
    Economy,
    /// Antes 4 to 6: multiplicative scaling.
    Scaling,
    /// Later antes: anything that helps.
    Survival,
}

impl AntePlan {
    pub fn for_ante(ante: u8) -> Self {
        match ante {
            0..=3 => AntePlan::Economy,
            4..=6 => AntePlan::Scaling,
            _ => AntePlan::Survival,
        }
    }

    /// Percentage of the money the shop may spend this ante.
    pub fn budget_percent(self) -> i64 {
        match self {
            AntePlan::Economy => 50,
            AntePlan::Scaling => 70,
            AntePlan::Survival => 90,
        }
    }

    pub fn budget(self, money: i64) -> i64 {
        money.max(0).saturating_mul(self.budget_percent()) / 100
    }

    fn favours(self, def: Option<&JokerDef>) -> bool {
        match self {
            AntePlan::Economy => def.map(|def| def.effect.has_money()).unwrap_or(false),
            AntePlan::Scaling => def.map(|def| def.effect.has_multiplier()).unwrap_or(false),
            AntePlan::Survival => def.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOffer {
    pub item_id: String,
    pub key: String,
    pub kind: OfferKind,
    pub price: i64,
    pub synergy: f64,
    pub history: f64,
    pub utility: f64,
    /// Utility discounted by price relative to money held.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopPlan {
    pub plan: AntePlan,
    pub favoured_hand: Option<HandKind>,
    pub offers: Vec<ScoredOffer>,
    /// Most the picks may spend together; the first pick only has to be
    /// affordable.
    pub budget: i64,
    /// Item ids in greedy purchase order.
    pub picks: Vec<String>,
    pub decision: Decision,
    /// Set when the memory store could not be read this tick.
    pub history_unavailable: bool,
}

pub struct ShopStrategy<'a> {
    config: &'a StrategyConfig,
    catalog: &'a JokerCatalog,
    synergy: &'a SynergyTable,
    memory: Option<&'a dyn MemoryStore>,
}

impl<'a> ShopStrategy<'a> {
    pub fn new(
        config: &'a StrategyConfig,
        catalog: &'a JokerCatalog,
        synergy: &'a SynergyTable,
        memory: Option<&'a dyn MemoryStore>,
    ) -> Self {
        Self {
            config,
            catalog,
            synergy,
            memory,
        }
    }

    pub fn plan(&self, state: &GameState) -> ShopPlan {
        let plan = AntePlan::for_ante(state.ante);
        let favoured_hand = favoured_hand(state);
        let items: Vec<ShopItem> = state
            .shop
            .as_ref()
            .map(|shop| shop.items.clone())
            .unwrap_or_default();
        let (history, history_unavailable) = self.load_history(&items);

        let offers: Vec<ScoredOffer> = items
            .par_iter()
            .map(|item| self.score_offer(state, plan, item, &history))
            .collect();

        let planet = state.consumables.iter().find(|consumable| {
            consumable.kind == ConsumableKind::Planet
                && favoured_hand.is_some()
                && self.catalog.planet(&consumable.key) == favoured_hand
        });
        let budget = plan.budget(state.money);
        let picks = greedy_picks(state, &offers, budget);
        let decision = if let Some(planet) = planet {
            Decision::UseConsumable {
                item: planet.id.clone(),
                target: None,
            }
        } else if let Some(first) = picks.first() {
            Decision::Purchase(first.clone())
        } else {
            Decision::SkipShop
        };

        ShopPlan {
            plan,
            favoured_hand,
            offers,
            budget,
            picks,
            decision,
            history_unavailable,
        }
    }

    fn score_offer(
        &self,
        state: &GameState,
        plan: AntePlan,
        item: &ShopItem,
        history: &HashMap<MemoryKey, f64>,
    ) -> ScoredOffer {
        let synergy = self.synergy_of(state, plan, item);
        let history = history_key(self.catalog, item)
            .and_then(|key| history.get(&key).copied())
            .unwrap_or(0.0);
        let utility = synergy + history;
        let value = discounted(utility, item.price, state.money, self.config.risk());
        ScoredOffer {
            item_id: item.id.clone(),
            key: item.key.clone(),
            kind: item.kind,
            price: item.price,
            synergy,
            history,
            utility,
            value,
        }
    }

    /// Base value, pair affinities with held jokers, hand-type affinities and
    /// the ante plan bonus.
    pub fn synergy_of(&self, state: &GameState, plan: AntePlan, item: &ShopItem) -> f64 {
        let def = match item.kind {
            OfferKind::Joker => self.catalog.joker(&item.key),
            _ => None,
        };
        let mut total = self
            .synergy
            .base_value(&item.key, item.kind, def.map(|def| def.rarity));

        if item.kind == OfferKind::Joker {
            total += state
                .jokers
                .iter()
                .map(|held| self.synergy.pair_bonus(&item.key, &held.id))
                .sum::<f64>();
        }

        for (kind, weight) in self.hand_affinities(item, def) {
            let level = f64::from(state.level(kind).saturating_sub(1));
            let plays = f64::from(state.hand_play_counts.get(&kind).copied().unwrap_or(0));
            total += weight
                * (self.synergy.level_weight * level + self.synergy.play_count_weight * plays);
        }

        if item.kind == OfferKind::Joker && plan.favours(def) {
            total += self.synergy.focus_bonus;
        }
        total
    }

    fn hand_affinities(&self, item: &ShopItem, def: Option<&JokerDef>) -> Vec<(HandKind, f64)> {
        if let Some(table) = self.synergy.hand_affinities(&item.key) {
            return table.iter().map(|(kind, weight)| (*kind, *weight)).collect();
        }
        if let Some(kind) = planet_hand(self.catalog, item) {
            return vec![(kind, 1.0)];
        }
        def.map(|def| {
            def.effect
                .hand_focus()
                .into_iter()
                .map(|kind| (kind, 1.0))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Weighted memory contribution per key. On a store failure the whole
    /// tick runs with no history.
    fn load_history(&self, items: &[ShopItem]) -> (HashMap<MemoryKey, f64>, bool) {
        let mut out = HashMap::new();
        let Some(memory) = self.memory else {
            return (out, false);
        };
        for key in items.iter().filter_map(|item| history_key(self.catalog, item)) {
            if out.contains_key(&key) {
                continue;
            }
            match memory.query(&key) {
                Ok(stats) => {
                    let weight = self.config.history_weight * stats.mean * stats.confidence;
                    out.insert(key, weight);
                }
                Err(err) => {
                    warn!(error = %err, "memory store unavailable, ignoring history");
                    return (HashMap::new(), true);
                }
            }
        }
        (out, false)
    }
}

fn planet_hand(catalog: &JokerCatalog, item: &ShopItem) -> Option<HandKind> {
    if item.kind == OfferKind::Planet {
        catalog.planet(&item.key)
    } else {
        None
    }
}

fn history_key(catalog: &JokerCatalog, item: &ShopItem) -> Option<MemoryKey> {
    match item.kind {
        OfferKind::Joker => Some(MemoryKey::Joker(item.key.clone())),
        OfferKind::Planet => planet_hand(catalog, item).map(MemoryKey::Hand),
        _ => None,
    }
}

/// `utility × (1 − (1 − risk) × 0.5 × price / money)`.
pub fn discounted(utility: f64, price: i64, money: i64, risk: f64) -> f64 {
    if price <= 0 {
        return utility;
    }
    if money <= 0 {
        return 0.0;
    }
    utility * (1.0 - (1.0 - risk) * 0.5 * price as f64 / money as f64)
}

/// Highest value affordable item first, spending down a copy of the money
/// and the free slots. Picks after the first stay within `budget`.
pub fn greedy_picks(state: &GameState, offers: &[ScoredOffer], budget: i64) -> Vec<String> {
    let mut money = state.money;
    let mut spent = 0;
    let mut joker_slots = state.joker_capacity().saturating_sub(state.jokers.len());
    let mut consumable_slots = state
        .consumable_slots
        .saturating_sub(state.consumables.len());
    let mut taken = vec![false; offers.len()];
    let mut picks = Vec::new();

    loop {
        let mut best: Option<usize> = None;
        for (idx, offer) in offers.iter().enumerate() {
            if taken[idx] || offer.value <= 0.0 || offer.price > money {
                continue;
            }
            if !picks.is_empty() && spent + offer.price > budget {
                continue;
            }
            let slot_free = match offer.kind {
                OfferKind::Joker => joker_slots > 0,
                OfferKind::Tarot | OfferKind::Planet | OfferKind::Spectral => consumable_slots > 0,
                OfferKind::Pack | OfferKind::Voucher => true,
            };
            if !slot_free {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    let current = &offers[current];
                    offer
                        .value
                        .total_cmp(&current.value)
                        .then_with(|| current.price.cmp(&offer.price))
                        .then_with(|| current.item_id.cmp(&offer.item_id))
                        .is_gt()
                }
            };
            if better {
                best = Some(idx);
            }
        }
        let Some(idx) = best else {
            break;
        };
        let offer = &offers[idx];
        taken[idx] = true;
        money -= offer.price;
        spent += offer.price;
        match offer.kind {
            OfferKind::Joker => joker_slots -= 1,
            OfferKind::Tarot | OfferKind::Planet | OfferKind::Spectral => consumable_slots -= 1,
            OfferKind::Pack | OfferKind::Voucher => {}
        }
        picks.push(offer.item_id.clone());
    }
    picks
}

/// The hand type the run leans on: most played, then highest level, then
/// stronger. `None` before anything was played or levelled.
pub fn favoured_hand(state: &GameState) -> Option<HandKind> {
    HandKind::ALL
        .iter()
        .copied()
        .map(|kind| {
            let plays = state.hand_play_counts.get(&kind).copied().unwrap_or(0);
            (plays, state.level(kind), kind)
        })
        .filter(|(plays, level, _)| *plays > 0 || *level > 1)
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)))
        .map(|(_, _, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(id: &str, kind: OfferKind, price: i64, value: f64) -> ScoredOffer {
        ScoredOffer {
            item_id: id.to_string(),
            key: id.to_string(),
            kind,
            price,
            synergy: value,
            history: 0.0,
            utility: value,
            value,
        }
    }

    fn state(money: i64) -> GameState {
        let mut state: GameState = serde_json::from_str(
            r#"{"phase":"Shop","ante":2,"hands_left":4,"discards_left":3,"money":0}"#,
        )
        .expect("state");
        state.money = money;
        state
    }

    #[test]
    fn discount_scales_with_price_share() {
        assert_eq!(discounted(2.0, 5, 10, 0.0), 1.5);
        assert_eq!(discounted(2.0, 5, 10, 1.0), 2.0);
        assert_eq!(discounted(2.0, 0, 0, 0.0), 2.0);
        assert_eq!(discounted(2.0, 3, 0, 0.5), 0.0);
    }

    #[test]
    fn greedy_spends_down_money() {
        let offers = vec![
            offer("a", OfferKind::Joker, 6, 3.0),
            offer("b", OfferKind::Joker, 5, 2.0),
            offer("c", OfferKind::Planet, 3, 1.0),
        ];
        // a (6) leaves 4: b unaffordable, c fits
        assert_eq!(greedy_picks(&state(10), &offers, 10), vec!["a", "c"]);
        assert!(greedy_picks(&state(2), &offers, 2).is_empty());
    }

    #[test]
    fn greedy_respects_slots_and_skips_worthless() {
        let mut observed = state(50);
        observed.joker_slots = 1;
        let offers = vec![
            offer("a", OfferKind::Joker, 4, 3.0),
            offer("b", OfferKind::Joker, 4, 2.0),
            offer("z", OfferKind::Voucher, 4, 0.0),
        ];
        assert_eq!(greedy_picks(&observed, &offers, 50), vec!["a"]);
    }

    #[test]
    fn budget_caps_spending_after_the_first_pick() {
        let offers = vec![
            offer("a", OfferKind::Joker, 6, 3.0),
            offer("b", OfferKind::Joker, 6, 2.0),
            offer("c", OfferKind::Joker, 6, 1.0),
        ];
        let mut observed = state(20);
        observed.joker_slots = 5;

        observed.ante = 1;
        let budget = AntePlan::for_ante(observed.ante).budget(observed.money);
        assert_eq!(budget, 10);
        assert_eq!(greedy_picks(&observed, &offers, budget), vec!["a"]);

        observed.ante = 5;
        let budget = AntePlan::for_ante(observed.ante).budget(observed.money);
        assert_eq!(budget, 14);
        assert_eq!(greedy_picks(&observed, &offers, budget), vec!["a", "b"]);

        observed.ante = 8;
        let budget = AntePlan::for_ante(observed.ante).budget(observed.money);
        assert_eq!(budget, 18);
        assert_eq!(greedy_picks(&observed, &offers, budget), vec!["a", "b", "c"]);
    }

    #[test]
    fn dearer_joker_wins_when_it_is_worth_more() {
        let risk = StrategyConfig::default().risk();
        let priced = |id: &str, price: i64, utility: f64, money: i64| ScoredOffer {
            value: discounted(utility, price, money, risk),
            ..offer(id, OfferKind::Joker, price, utility)
        };
        let observed = state(10);
        let offers = vec![priced("six", 6, 5.0, 10), priced("eight", 8, 9.0, 10)];
        let budget = AntePlan::for_ante(observed.ante).budget(observed.money);
        assert_eq!(greedy_picks(&observed, &offers, budget), vec!["eight"]);

        let observed = state(7);
        let offers = vec![priced("six", 6, 5.0, 7), priced("eight", 8, 9.0, 7)];
        let budget = AntePlan::for_ante(observed.ante).budget(observed.money);
        assert_eq!(greedy_picks(&observed, &offers, budget), vec!["six"]);
    }

    #[test]
    fn plan_reports_its_budget() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let synergy = SynergyTable::standard();
        let strategy = ShopStrategy::new(&config, &catalog, &synergy, None);
        let mut observed = state(15);
        observed.ante = 4;
        assert_eq!(strategy.plan(&observed).budget, 10);
    }

    #[test]
    fn favoured_hand_prefers_most_played() {
        let mut observed = state(0);
        assert_eq!(favoured_hand(&observed), None);
        observed.hand_play_counts.insert(HandKind::Pair, 3);
        observed.hand_play_counts.insert(HandKind::Flush, 2);
        observed.hand_levels.insert(HandKind::Flush, 4);
        assert_eq!(favoured_hand(&observed), Some(HandKind::Pair));
    }

    #[test]
    fn favoured_planet_is_used_before_buying() {
        let config = StrategyConfig::default();
        let catalog = JokerCatalog::standard();
        let synergy = SynergyTable::standard();
        let strategy = ShopStrategy::new(&config, &catalog, &synergy, None);

        let mut observed = state(20);
        observed.hand_play_counts.insert(HandKind::Pair, 2);
        observed.shop = Some(strategist_core::ShopContents {
            items: vec![ShopItem {
                id: "shop-0".to_string(),
                kind: OfferKind::Joker,
                key: "joker".to_string(),
                price: 2,
                edition: None,
            }],
            reroll_cost: 5,
        });
        observed.consumables.push(strategist_core::Consumable {
            id: "c-1".to_string(),
            kind: ConsumableKind::Planet,
            key: "jupiter".to_string(),
        });
        // wrong hand, so buy
        assert_eq!(
            strategy.plan(&observed).decision,
            Decision::Purchase("shop-0".to_string())
        );

        observed.consumables.push(strategist_core::Consumable {
            id: "c-2".to_string(),
            kind: ConsumableKind::Planet,
            key: "mercury".to_string(),
        });
        let plan = strategy.plan(&observed);
        assert_eq!(plan.favoured_hand, Some(HandKind::Pair));
        assert_eq!(
            plan.decision,
            Decision::UseConsumable {
                item: "c-2".to_string(),
                target: None,
            }
        );
        assert_eq!(plan.picks, vec!["shop-0".to_string()]);
    }

    #[test]
    fn ante_plan_bands() {
        assert_eq!(AntePlan::for_ante(1), AntePlan::Economy);
        assert_eq!(AntePlan::for_ante(4), AntePlan::Scaling);
        assert_eq!(AntePlan::for_ante(8), AntePlan::Survival);
        assert_eq!(AntePlan::Economy.budget(-4), 0);
        assert_eq!(AntePlan::Scaling.budget(9), 6);
    }
}
