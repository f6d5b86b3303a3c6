use crate::HandSelection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The action handed back to the executor for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "args")]
pub enum Decision {
    PlayCards(HandSelection),
    DiscardCards(HandSelection),
    SelectBlind(String),
    Purchase(String),
    SkipShop,
    UseConsumable {
        item: String,
        #[serde(default)]
        target: Option<HandSelection>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionKind {
    PlayCards,
    DiscardCards,
    SelectBlind,
    Purchase,
    SkipShop,
    UseConsumable,
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::PlayCards(_) => DecisionKind::PlayCards,
            Decision::DiscardCards(_) => DecisionKind::DiscardCards,
            Decision::SelectBlind(_) => DecisionKind::SelectBlind,
            Decision::Purchase(_) => DecisionKind::Purchase,
            Decision::SkipShop => DecisionKind::SkipShop,
            Decision::UseConsumable { .. } => DecisionKind::UseConsumable,
        }
    }

    pub fn short_label(&self) -> String {
        match self {
            Decision::PlayCards(selection) => format!("play {selection}"),
            Decision::DiscardCards(selection) => format!("discard {selection}"),
            Decision::SelectBlind(id) => format!("select blind {id}"),
            Decision::Purchase(id) => format!("buy {id}"),
            Decision::SkipShop => "skip shop".to_string(),
            Decision::UseConsumable { item, target } => match target {
                Some(selection) => format!("use {item} on {selection}"),
                None => format!("use {item}"),
            },
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DecisionKind::PlayCards => "PlayCards",
            DecisionKind::DiscardCards => "DiscardCards",
            DecisionKind::SelectBlind => "SelectBlind",
            DecisionKind::Purchase => "Purchase",
            DecisionKind::SkipShop => "SkipShop",
            DecisionKind::UseConsumable => "UseConsumable",
        };
        f.write_str(label)
    }
}
