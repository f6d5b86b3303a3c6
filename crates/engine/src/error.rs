use crate::Phase;
use strategist_core::{DecisionKind, EvalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("{decision} is not legal during {phase:?}")]
    InvalidDecisionForPhase { phase: Phase, decision: DecisionKind },
    #[error("run finished, start a new session")]
    RunFinished,
    #[error("nothing to decide during {phase:?}: {detail}")]
    NoDecision { phase: Phase, detail: String },
}
