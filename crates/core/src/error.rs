use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionFault {
    #[error("selection is empty")]
    Empty,
    #[error("selection has {0} cards, at most 5 may be played")]
    TooManyCards(usize),
    #[error("card index {0} selected twice")]
    DuplicateIndex(usize),
    #[error("card index {index} outside hand of {hand_size}")]
    IndexOutOfRange { index: usize, hand_size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionFault),
}
