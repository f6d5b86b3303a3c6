use crate::{KeyStats, MemoryError, MemoryKey, MemorySummary, Outcome, OutcomeScope, RunningStats};
use dashmap::DashMap;
use std::sync::{Mutex, RwLock};

/// Where round and session outcomes are kept between games.
///
/// Implementations are shared behind an `Arc` and must never lose a record
/// under concurrent writers. Readers see every record that finished before
/// the read started.
pub trait MemoryStore: Send + Sync {
    fn record(&self, outcome: Outcome) -> Result<(), MemoryError>;

    fn query(&self, key: &MemoryKey) -> Result<KeyStats, MemoryError>;

    fn summary(&self) -> Result<MemorySummary, MemoryError>;
}

fn poisoned<T>(_: T) -> MemoryError {
    MemoryError::StoreUnavailable("lock poisoned".to_string())
}

/// Append-only log with a lazily maintained aggregate index.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    log: RwLock<Vec<Outcome>>,
    index: DashMap<MemoryKey, RunningStats>,
    // Number of log entries already folded into `index`.
    folded: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self {
            log: RwLock::new(outcomes),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Folds any records appended since the last read into the index.
    fn catch_up(&self) -> Result<(), MemoryError> {
        let mut folded = self.folded.lock().map_err(poisoned)?;
        let log = self.log.read().map_err(poisoned)?;
        if *folded >= log.len() {
            return Ok(());
        }
        for outcome in &log[*folded..] {
            for (key, sample) in outcome.contributions() {
                self.index.entry(key).or_default().push(sample);
            }
        }
        *folded = log.len();
        Ok(())
    }
}

impl MemoryStore for InMemoryStore {
    fn record(&self, outcome: Outcome) -> Result<(), MemoryError> {
        let mut log = self.log.write().map_err(poisoned)?;
        log.push(outcome);
        Ok(())
    }

    fn query(&self, key: &MemoryKey) -> Result<KeyStats, MemoryError> {
        self.catch_up()?;
        Ok(self
            .index
            .get(key)
            .map(|stats| stats.snapshot())
            .unwrap_or_default())
    }

    fn summary(&self) -> Result<MemorySummary, MemoryError> {
        self.catch_up()?;
        let log = self.log.read().map_err(poisoned)?;
        let mut summary = MemorySummary {
            tracked_keys: self.index.len(),
            ..MemorySummary::default()
        };
        for outcome in log.iter() {
            match outcome.scope {
                OutcomeScope::Session => {
                    summary.total_sessions += 1;
                    summary.sessions_won += u64::from(outcome.won);
                }
                OutcomeScope::Round => {
                    summary.total_rounds += 1;
                    summary.rounds_won += u64::from(outcome.won);
                }
            }
        }
        if summary.total_sessions > 0 {
            summary.win_rate = summary.sessions_won as f64 / summary.total_sessions as f64;
        }
        Ok(summary)
    }
}
