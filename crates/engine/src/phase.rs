use crate::{EngineError, RoundState};
use serde::{Deserialize, Serialize};
use strategist_core::{Decision, DecisionKind, GamePhase, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    BlindSelection,
    Playing,
    RoundWon,
    RoundLost,
    Shop,
    GameOver,
}

impl Phase {
    pub fn legal(self) -> &'static [DecisionKind] {
        match self {
            Phase::BlindSelection => &[DecisionKind::SelectBlind],
            Phase::Playing => &[
                DecisionKind::PlayCards,
                DecisionKind::DiscardCards,
                DecisionKind::UseConsumable,
            ],
            Phase::Shop => &[
                DecisionKind::Purchase,
                DecisionKind::SkipShop,
                DecisionKind::UseConsumable,
            ],
            Phase::RoundWon | Phase::RoundLost | Phase::GameOver => &[],
        }
    }

    pub fn check(self, decision: &Decision) -> Result<(), EngineError> {
        let kind = decision.kind();
        if self.legal().contains(&kind) {
            Ok(())
        } else {
            Err(EngineError::InvalidDecisionForPhase {
                phase: self,
                decision: kind,
            })
        }
    }

    /// The forward path from `self` to `target`, excluding `self`. `None`
    /// when getting there would skip a whole round of play.
    pub fn path_to(self, target: Phase) -> Option<Vec<Phase>> {
        let mut path = Vec::new();
        let mut current = self;
        while current != target {
            let next = match current {
                Phase::BlindSelection | Phase::RoundWon | Phase::Shop
                    if target == Phase::GameOver =>
                {
                    Phase::GameOver
                }
                Phase::BlindSelection => Phase::Playing,
                Phase::Playing if target == Phase::RoundLost || target == Phase::GameOver => {
                    Phase::RoundLost
                }
                Phase::Playing => Phase::RoundWon,
                Phase::RoundWon => Phase::Shop,
                Phase::RoundLost => Phase::GameOver,
                Phase::Shop => Phase::BlindSelection,
                Phase::GameOver => return None,
            };
            if next == Phase::Playing && target != Phase::Playing {
                return None;
            }
            path.push(next);
            current = next;
        }
        Some(path)
    }

    /// Phase implied by an observed state. A playing state whose round is
    /// decided maps to the round outcome.
    pub fn observe(state: &GameState) -> Phase {
        match state.phase {
            GamePhase::BlindSelection => Phase::BlindSelection,
            GamePhase::Shop => Phase::Shop,
            GamePhase::GameOver => Phase::GameOver,
            GamePhase::Playing => match RoundState::of(state) {
                RoundState::RoundWon => Phase::RoundWon,
                RoundState::RoundLost => Phase::RoundLost,
                RoundState::AwaitingAction | RoundState::HandPlayed => Phase::Playing,
            },
        }
    }
}
