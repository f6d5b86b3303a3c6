use serde::{Deserialize, Serialize};
use strategist_core::{HandKind, HandRule, HandTable, JokerCatalog, StrategyConfig, SynergyTable};

/// One entry of `hands.json`: a base rule replacing the built-in one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HandRuleEntry {
    pub hand: HandKind,
    #[serde(flatten)]
    pub rule: HandRule,
}

/// Everything the engine reads from an assets directory. Files that are
/// missing fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Assets {
    pub config: StrategyConfig,
    pub synergy: SynergyTable,
    pub catalog: JokerCatalog,
    pub table: HandTable,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            config: StrategyConfig::default(),
            synergy: SynergyTable::standard(),
            catalog: JokerCatalog::standard(),
            table: HandTable::standard(),
        }
    }
}
