use crate::{Card, SelectionFault};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SELECTION: usize = 5;

/// Ordered indices into the current hand. Serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandSelection(Vec<usize>);

impl HandSelection {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn validate(&self, hand_size: usize) -> Result<(), SelectionFault> {
        if self.0.is_empty() {
            return Err(SelectionFault::Empty);
        }
        if self.0.len() > MAX_SELECTION {
            return Err(SelectionFault::TooManyCards(self.0.len()));
        }
        for (pos, index) in self.0.iter().enumerate() {
            if *index >= hand_size {
                return Err(SelectionFault::IndexOutOfRange {
                    index: *index,
                    hand_size,
                });
            }
            if self.0[..pos].contains(index) {
                return Err(SelectionFault::DuplicateIndex(*index));
            }
        }
        Ok(())
    }

    /// Selected cards, copied out of `hand` in selection order.
    pub fn cards(&self, hand: &[Card]) -> Result<Vec<Card>, SelectionFault> {
        self.validate(hand.len())?;
        Ok(self.0.iter().map(|idx| hand[*idx]).collect())
    }

    /// Hand cards that are not part of the selection.
    pub fn held(&self, hand: &[Card]) -> Vec<Card> {
        hand.iter()
            .enumerate()
            .filter(|(idx, _)| !self.0.contains(idx))
            .map(|(_, card)| *card)
            .collect()
    }
}

impl From<Vec<usize>> for HandSelection {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for HandSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// Every selection of 1 to `max` cards from a hand of `hand_size`, as sorted
/// index lists.
pub fn enumerate_selections(hand_size: usize, max: usize) -> Vec<HandSelection> {
    let max = max.min(MAX_SELECTION).min(hand_size);
    let mut out = Vec::new();
    let mut current = Vec::new();
    for size in 1..=max {
        recurse_combinations(hand_size, size, 0, &mut current, &mut out);
    }
    out
}

fn recurse_combinations(
    total: usize,
    size: usize,
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<HandSelection>,
) {
    if current.len() == size {
        out.push(HandSelection(current.clone()));
        return;
    }
    for idx in start..total {
        current.push(idx);
        recurse_combinations(total, size, idx + 1, current, out);
        current.pop();
    }
}
