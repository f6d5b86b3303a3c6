use crate::{Candidate, DiscardOption, Phase, PolicyReason, RoundState, ScoredOffer};
use serde::{Deserialize, Serialize};
use strategist_core::{Decision, HandKind, ScoreTraceStep};

/// Why the engine picked what it picked on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub tick: u64,
    pub phase: Phase,
    pub decision: Option<Decision>,
    #[serde(default)]
    pub round: Option<RoundState>,
    #[serde(default)]
    pub reason: Option<PolicyReason>,
    #[serde(default)]
    pub remaining: i64,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub projection: f64,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub history: f64,
    #[serde(default)]
    pub discard: Option<DiscardOption>,
    #[serde(default)]
    pub favoured_hand: Option<HandKind>,
    #[serde(default)]
    pub offers: Vec<ScoredOffer>,
    #[serde(default)]
    pub score_steps: Vec<ScoreTraceStep>,
}

impl DecisionTrace {
    pub fn new(tick: u64, phase: Phase, decision: Option<Decision>) -> Self {
        Self {
            tick,
            phase,
            decision,
            round: None,
            reason: None,
            remaining: 0,
            candidates: Vec::new(),
            projection: 0.0,
            threshold: 0.0,
            history: 0.0,
            discard: None,
            favoured_hand: None,
            offers: Vec::new(),
            score_steps: Vec::new(),
        }
    }

    pub fn to_text_report(&self) -> String {
        let decision = self
            .decision
            .as_ref()
            .map(Decision::short_label)
            .unwrap_or_else(|| "(none)".to_string());
        let mut lines = vec![format!(
            "tick {:>4} | {:?} | {}",
            self.tick, self.phase, decision
        )];
        if let Some(reason) = self.reason {
            lines.push(format!(
                "  reason: {reason:?} remaining={} projection={:.1} threshold={:.1} history={:.2}",
                self.remaining, self.projection, self.threshold, self.history
            ));
        }
        if !self.candidates.is_empty() {
            lines.push("  plays:".to_string());
            for candidate in self.candidates.iter().take(5) {
                lines.push(format!(
                    "    {:<16} {:>8} {}",
                    candidate.hand.display_name(),
                    candidate.score,
                    candidate.selection
                ));
            }
        }
        if let Some(discard) = &self.discard {
            lines.push(format!(
                "  best discard: {} expected={:.1}",
                discard.selection, discard.expected_best
            ));
        }
        if let Some(hand) = self.favoured_hand {
            lines.push(format!("  favoured hand: {}", hand.display_name()));
        }
        if !self.offers.is_empty() {
            lines.push("  offers:".to_string());
            for offer in &self.offers {
                lines.push(format!(
                    "    {:<18} ${:<3} synergy={:.2} history={:.2} value={:.2}",
                    offer.key, offer.price, offer.synergy, offer.history, offer.value
                ));
            }
        }
        if !self.score_steps.is_empty() {
            lines.push("  scoring:".to_string());
            for step in &self.score_steps {
                lines.push(format!(
                    "    {:<18} {:?}: {}x{:.2} -> {}x{:.2}",
                    step.source,
                    step.effect,
                    step.before.chips,
                    step.before.mult,
                    step.after.chips,
                    step.after.mult
                ));
            }
        }
        lines.join("\n")
    }
}
