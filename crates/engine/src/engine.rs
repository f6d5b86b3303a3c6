use crate::{
    DecisionPolicy, DecisionTrace, EngineError, HandScorer, Phase, RngState, ShopStrategy,
};
use std::sync::Arc;
use strategist_core::{
    Decision, GamePhase, GameState, HandTable, JokerCatalog, StrategyConfig, SynergyTable,
};
use strategist_memory::{HandOutcome, MemoryStore, Outcome, OutcomeScope};
use tracing::{debug, info, warn};

/// What the current round looked like the last time it was observed.
#[derive(Debug, Clone)]
struct RoundLog {
    blind_id: Option<String>,
    ante: u8,
    score: i64,
    requirement: i64,
    jokers: Vec<String>,
    hands: Vec<HandOutcome>,
}

impl RoundLog {
    fn observe(state: &GameState) -> Self {
        Self {
            blind_id: state.blind.as_ref().map(|blind| blind.id.clone()),
            ante: state.ante,
            score: state.round_score,
            requirement: state.requirement(),
            jokers: state.jokers.iter().map(|joker| joker.id.clone()).collect(),
            hands: state
                .played
                .iter()
                .map(|played| HandOutcome {
                    hand: played.hand,
                    score: played.score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SessionLog {
    rounds: u32,
    rounds_won: u32,
    max_ante: u8,
    total_score: i64,
    jokers: Vec<String>,
}

/// Turns a stream of observed game states into decisions, one per tick.
///
/// The engine owns the phase machine: each observed state is reconciled
/// against the phase it expected, rounds are committed to memory when they
/// end, and the session is committed when the game ends.
pub struct Engine {
    config: StrategyConfig,
    catalog: Arc<JokerCatalog>,
    table: Arc<HandTable>,
    synergy: Arc<SynergyTable>,
    memory: Option<Arc<dyn MemoryStore>>,
    session_id: String,
    sessions: u32,
    phase: Option<Phase>,
    tick: u64,
    round: Option<RoundLog>,
    session: SessionLog,
    last_trace: Option<DecisionTrace>,
}

impl Engine {
    pub fn new(config: StrategyConfig) -> Self {
        let session_id = session_label(config.seed, 0);
        Self {
            config,
            catalog: Arc::new(JokerCatalog::standard()),
            table: Arc::new(HandTable::standard()),
            synergy: Arc::new(SynergyTable::standard()),
            memory: None,
            session_id,
            sessions: 0,
            phase: None,
            tick: 0,
            round: None,
            session: SessionLog::default(),
            last_trace: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<JokerCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_table(mut self, table: Arc<HandTable>) -> Self {
        self.table = table;
        self
    }

    pub fn with_synergy(mut self, synergy: Arc<SynergyTable>) -> Self {
        self.synergy = synergy;
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `None` until the first state is observed.
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn last_trace(&self) -> Option<&DecisionTrace> {
        self.last_trace.as_ref()
    }

    /// Drops the round in progress without recording it.
    pub fn abandon_round(&mut self) {
        if let Some(round) = self.round.take() {
            debug!(ante = round.ante, blind = ?round.blind_id, "round abandoned");
        }
    }

    /// Forgets the finished run and starts counting a fresh session.
    pub fn new_session(&mut self) {
        self.sessions += 1;
        self.session_id = session_label(self.config.seed, self.sessions);
        self.phase = None;
        self.round = None;
        self.session = SessionLog::default();
        self.last_trace = None;
        info!(session = %self.session_id, "new session");
    }

    /// One tick: reconcile the observed phase, then decide. Terminal round
    /// phases and game over yield `Ok(None)`. Ticks after game over fail
    /// with `RunFinished` until `new_session`.
    pub fn tick(&mut self, state: &GameState) -> Result<Option<Decision>, EngineError> {
        if self.phase == Some(Phase::GameOver) {
            return Err(EngineError::RunFinished);
        }
        self.tick += 1;
        let observed = Phase::observe(state);
        self.sync(observed, state);

        let mut trace = DecisionTrace::new(self.tick, observed, None);
        let decision = match observed {
            Phase::BlindSelection => {
                let Some(blind) = &state.blind else {
                    return Err(EngineError::NoDecision {
                        phase: observed,
                        detail: "no blind offered".to_string(),
                    });
                };
                Some(Decision::SelectBlind(blind.id.clone()))
            }
            Phase::Playing => self.decide_play(state, &mut trace)?,
            Phase::Shop => Some(self.decide_shop(state, &mut trace)),
            Phase::RoundWon | Phase::RoundLost | Phase::GameOver => None,
        };

        if let Some(decision) = &decision {
            observed.check(decision)?;
            info!(
                tick = self.tick,
                phase = ?observed,
                decision = %decision.short_label(),
                "decision"
            );
        } else {
            debug!(tick = self.tick, phase = ?observed, "nothing to decide");
        }
        trace.decision = decision.clone();
        self.last_trace = Some(trace);
        Ok(decision)
    }

    fn decide_play(
        &self,
        state: &GameState,
        trace: &mut DecisionTrace,
    ) -> Result<Option<Decision>, EngineError> {
        let rng = RngState::from_seed(self.config.seed).stream(self.tick);
        let policy = DecisionPolicy::new(&self.config, &self.catalog, &self.table)
            .with_memory(self.memory.as_deref());
        let outcome = policy.decide(state, &rng)?;
        if outcome.history_unavailable {
            debug!(tick = self.tick, "policy ran without hand history");
        }
        if let Some(Decision::PlayCards(selection)) = &outcome.decision {
            let scorer = HandScorer::new(state, &self.catalog, &self.table);
            trace.score_steps = scorer.resolve(&state.hand, selection)?.evaluation.trace;
        }
        trace.round = Some(outcome.round);
        trace.reason = Some(outcome.reason);
        trace.remaining = outcome.remaining;
        trace.projection = outcome.projection;
        trace.threshold = outcome.threshold;
        trace.history = outcome.history;
        trace.discard = outcome.discard;
        trace.candidates = outcome.candidates;
        Ok(outcome.decision)
    }

    fn decide_shop(&self, state: &GameState, trace: &mut DecisionTrace) -> Decision {
        let strategy = ShopStrategy::new(
            &self.config,
            &self.catalog,
            &self.synergy,
            self.memory.as_deref(),
        );
        let plan = strategy.plan(state);
        debug!(
            plan = ?plan.plan,
            budget = plan.budget,
            picks = ?plan.picks,
            history_unavailable = plan.history_unavailable,
            "shop plan"
        );
        trace.favoured_hand = plan.favoured_hand;
        trace.offers = plan.offers;
        plan.decision
    }

    /// Walks the phase machine from the expected phase to the observed one,
    /// committing outcomes at each boundary it crosses.
    fn sync(&mut self, observed: Phase, state: &GameState) {
        if state.phase == GamePhase::Playing {
            let blind_id = state.blind.as_ref().map(|blind| blind.id.clone());
            let stale = self.phase == Some(Phase::Playing)
                && self
                    .round
                    .as_ref()
                    .map(|round| round.blind_id != blind_id || round.ante != state.ante)
                    .unwrap_or(false);
            if stale {
                warn!(ante = state.ante, blind = ?blind_id, "round changed mid-play");
                self.abandon_round();
            }
            self.round = Some(RoundLog::observe(state));
        }

        let Some(expected) = self.phase else {
            debug!(phase = ?observed, "first observed phase");
            self.phase = Some(observed);
            return;
        };
        if expected == observed {
            return;
        }
        let Some(path) = expected.path_to(observed) else {
            warn!(from = ?expected, to = ?observed, "unreachable phase jump");
            self.abandon_round();
            self.phase = Some(observed);
            return;
        };
        for step in path {
            match step {
                Phase::RoundWon => self.commit_round(true),
                Phase::RoundLost => {
                    let won = observed == Phase::GameOver && state.run_won;
                    self.commit_round(won);
                }
                Phase::GameOver => self.commit_session(state),
                Phase::BlindSelection | Phase::Playing | Phase::Shop => {}
            }
            debug!(phase = ?step, "phase advanced");
            self.phase = Some(step);
        }
    }

    fn commit_round(&mut self, won: bool) {
        let Some(round) = self.round.take() else {
            debug!("round ended before it was observed");
            return;
        };
        // a round first seen already in the shop has no final score
        let score = if won {
            round.score.max(round.requirement)
        } else {
            round.score
        };
        self.session.rounds += 1;
        if won {
            self.session.rounds_won += 1;
        }
        self.session.max_ante = self.session.max_ante.max(round.ante);
        self.session.total_score += score;
        self.session.jokers = round.jokers.clone();
        info!(ante = round.ante, won, score, requirement = round.requirement, "round over");
        self.record(Outcome {
            session_id: self.session_id.clone(),
            scope: OutcomeScope::Round,
            ante: round.ante,
            won,
            score,
            requirement: round.requirement,
            jokers: round.jokers,
            hands: round.hands,
        });
    }

    fn commit_session(&mut self, state: &GameState) {
        let jokers = if state.jokers.is_empty() {
            self.session.jokers.clone()
        } else {
            state.jokers.iter().map(|joker| joker.id.clone()).collect()
        };
        let ante = self.session.max_ante.max(state.ante);
        info!(
            session = %self.session_id,
            ante,
            won = state.run_won,
            rounds = self.session.rounds,
            rounds_won = self.session.rounds_won,
            "session over"
        );
        self.record(Outcome {
            session_id: self.session_id.clone(),
            scope: OutcomeScope::Session,
            ante,
            won: state.run_won,
            score: self.session.total_score,
            requirement: 0,
            jokers,
            hands: Vec::new(),
        });
    }

    fn record(&self, outcome: Outcome) {
        let Some(memory) = &self.memory else {
            return;
        };
        if let Err(err) = memory.record(outcome) {
            warn!(error = %err, "memory store unavailable, outcome dropped");
        }
    }
}

fn session_label(seed: u64, index: u32) -> String {
    format!("session-{seed:x}-{index}")
}
