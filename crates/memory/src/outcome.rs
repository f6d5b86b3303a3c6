use serde::{Deserialize, Serialize};
use std::fmt;
use strategist_core::HandKind;

/// Cap on a single contribution so one blowout round cannot dominate a mean.
const MAX_CONTRIBUTION: f64 = 3.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OutcomeScope {
    Round,
    Session,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandOutcome {
    pub hand: HandKind,
    pub score: i64,
}

/// A finished round or session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub session_id: String,
    pub scope: OutcomeScope,
    pub ante: u8,
    pub won: bool,
    pub score: i64,
    pub requirement: i64,
    #[serde(default)]
    pub jokers: Vec<String>,
    #[serde(default)]
    pub hands: Vec<HandOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryKey {
    Joker(String),
    Hand(HandKind),
}

impl fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryKey::Joker(id) => write!(f, "joker:{id}"),
            MemoryKey::Hand(kind) => write!(f, "hand:{}", kind.id()),
        }
    }
}

impl Outcome {
    /// Per-key samples this outcome adds. Only rounds contribute; sessions
    /// feed the summary.
    ///
    /// A joker's sample is the round's score over its requirement. A hand
    /// type's sample is each play's score over the requirement.
    pub fn contributions(&self) -> Vec<(MemoryKey, f64)> {
        if self.scope != OutcomeScope::Round {
            return Vec::new();
        }
        let ratio = |score: i64| -> f64 {
            if self.requirement <= 0 {
                return if score > 0 { MAX_CONTRIBUTION } else { 0.0 };
            }
            (score as f64 / self.requirement as f64).clamp(0.0, MAX_CONTRIBUTION)
        };

        let mut out = Vec::with_capacity(self.jokers.len() + self.hands.len());
        let round = ratio(self.score);
        let mut seen: Vec<&str> = Vec::new();
        for joker in &self.jokers {
            if seen.contains(&joker.as_str()) {
                continue;
            }
            seen.push(joker);
            out.push((MemoryKey::Joker(joker.clone()), round));
        }
        for hand in &self.hands {
            out.push((MemoryKey::Hand(hand.hand), ratio(hand.score)));
        }
        out
    }
}
