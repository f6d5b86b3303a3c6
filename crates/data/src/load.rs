use crate::schema::{Assets, HandRuleEntry};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use strategist_core::{JokerDef, StrategyConfig, SynergyTable};

pub const STRATEGY_FILE: &str = "strategy.json";
pub const SYNERGY_FILE: &str = "synergy.json";
pub const JOKERS_FILE: &str = "jokers.json";
pub const HANDS_FILE: &str = "hands.json";

pub fn load_strategy_config(path: &Path) -> anyhow::Result<StrategyConfig> {
    let config: StrategyConfig = load_json(path)?;
    validate_config(&config).with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

pub fn load_synergy_table(path: &Path) -> anyhow::Result<SynergyTable> {
    let table: SynergyTable = load_json(path)?;
    validate_synergy(&table).with_context(|| format!("validate {}", path.display()))?;
    Ok(table)
}

pub fn load_joker_defs(path: &Path) -> anyhow::Result<Vec<JokerDef>> {
    let defs: Vec<JokerDef> = load_json(path)?;
    let mut seen = HashSet::new();
    for def in &defs {
        if def.id.is_empty() {
            bail!("{}: joker with empty id", path.display());
        }
        if !seen.insert(def.id.as_str()) {
            bail!("{}: duplicate joker id {}", path.display(), def.id);
        }
        if def.price < 0 {
            bail!("{}: joker {} has negative price", path.display(), def.id);
        }
    }
    Ok(defs)
}

pub fn load_hand_rules(path: &Path) -> anyhow::Result<Vec<HandRuleEntry>> {
    let entries: Vec<HandRuleEntry> = load_json(path)?;
    for entry in &entries {
        let rule = entry.rule;
        if rule.chips < 0 || rule.level_chips < 0 {
            bail!("{}: {:?} has negative chips", path.display(), entry.hand);
        }
        if !rule.mult.is_finite() || rule.mult < 0.0 || !rule.level_mult.is_finite() {
            bail!("{}: {:?} has an invalid mult", path.display(), entry.hand);
        }
    }
    Ok(entries)
}

/// Reads every known file under `dir`. Missing files keep the built-in
/// defaults; files that exist must parse. A relative `memory_path` is
/// resolved against `dir`.
pub fn load_assets(dir: &Path) -> anyhow::Result<Assets> {
    if !dir.is_dir() {
        bail!("assets directory {} not found", dir.display());
    }
    let mut assets = Assets::default();

    let strategy = dir.join(STRATEGY_FILE);
    if strategy.exists() {
        assets.config = load_strategy_config(&strategy)?;
    }
    if let Some(memory) = assets.config.memory_path.as_mut() {
        if memory.is_relative() {
            *memory = dir.join(&*memory);
        }
    }

    let synergy = dir.join(SYNERGY_FILE);
    if synergy.exists() {
        assets.synergy = load_synergy_table(&synergy)?;
    }

    let jokers = dir.join(JOKERS_FILE);
    if jokers.exists() {
        for def in load_joker_defs(&jokers)? {
            assets.catalog.insert(def);
        }
    }

    let hands = dir.join(HANDS_FILE);
    if hands.exists() {
        for entry in load_hand_rules(&hands)? {
            assets.table = assets.table.with_rule(entry.hand, entry.rule);
        }
    }
    Ok(assets)
}

fn validate_config(config: &StrategyConfig) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&config.risk_tolerance) {
        bail!("risk_tolerance {} outside 0..=1", config.risk_tolerance);
    }
    if config.max_play_candidates == 0 {
        bail!("max_play_candidates must be positive");
    }
    if config.discard_samples == 0 {
        bail!("discard_samples must be positive");
    }
    if config.max_discard_size == 0 {
        bail!("max_discard_size must be positive");
    }
    if !config.history_weight.is_finite() || config.history_weight < 0.0 {
        bail!("history_weight {} must be finite and non-negative", config.history_weight);
    }
    Ok(())
}

fn validate_synergy(table: &SynergyTable) -> anyhow::Result<()> {
    let weights = table
        .items
        .values()
        .chain(table.rarity_defaults.values())
        .chain(table.kind_defaults.values())
        .chain(table.pairs.iter().map(|pair| &pair.bonus))
        .chain(table.hands.values().flat_map(|hands| hands.values()))
        .chain([
            &table.focus_bonus,
            &table.level_weight,
            &table.play_count_weight,
        ]);
    for weight in weights {
        if !weight.is_finite() {
            bail!("synergy weight {weight} is not finite");
        }
    }
    for pair in &table.pairs {
        if pair.first.is_empty() || pair.second.is_empty() {
            bail!("pair affinity with empty key");
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
