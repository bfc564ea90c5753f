use std::collections::BTreeMap;

use shared::{
    domain::{ExampleId, GateRule},
    protocol::ScoreSummary,
};
use tracing::debug;

/// First-attempt results over a fixed-size problem set.
///
/// Re-answering an already graded example (after seeking back to it) never
/// changes its recorded result.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    total: u32,
    results: BTreeMap<ExampleId, bool>,
}

impl ScoreBoard {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            results: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, id: &ExampleId, is_correct: bool) -> bool {
        if self.results.contains_key(id) {
            return false;
        }
        self.results.insert(id.clone(), is_correct);
        true
    }

    pub fn correct(&self) -> u32 {
        self.results.values().filter(|correct| **correct).count() as u32
    }

    pub fn attempted(&self) -> u32 {
        self.results.len() as u32
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.attempted() >= self.total
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            correct: self.correct(),
            attempted: self.attempted(),
            total: self.total,
        }
    }

    pub fn reset(&mut self) {
        self.results.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateContext {
    pub all_discovered: bool,
    pub score_correct: u32,
    pub problem_set_finished: bool,
    pub at_terminal_phase: bool,
    pub steps_exhausted: bool,
    pub answer_submitted: bool,
}

pub fn rule_holds(rule: &GateRule, ctx: &GateContext) -> bool {
    match rule {
        GateRule::AllDiscovered => ctx.all_discovered,
        GateRule::ScoreThreshold { required } => {
            ctx.problem_set_finished && ctx.score_correct >= *required
        }
        GateRule::TerminalPhase => ctx.at_terminal_phase,
        GateRule::AllStepsRevealed => ctx.steps_exhausted,
        GateRule::AnswerSubmitted => ctx.answer_submitted,
    }
}

pub fn unmet_rules(rules: &[GateRule], ctx: &GateContext) -> Vec<GateRule> {
    rules
        .iter()
        .filter(|rule| !rule_holds(rule, ctx))
        .copied()
        .collect()
}

/// AND over the screen's completion rules, latched once satisfied until reset.
#[derive(Debug, Clone)]
pub struct CompletionGate {
    rules: Vec<GateRule>,
    open: bool,
}

impl CompletionGate {
    pub fn new(rules: Vec<GateRule>) -> Self {
        let rules = if rules.is_empty() {
            vec![GateRule::TerminalPhase]
        } else {
            rules
        };
        Self { rules, open: false }
    }

    pub fn rules(&self) -> &[GateRule] {
        &self.rules
    }

    pub fn can_complete(&self) -> bool {
        self.open
    }

    /// Re-evaluates the rules. Returns `true` only on the call that opens the gate.
    pub fn refresh(&mut self, ctx: &GateContext) -> bool {
        if self.open {
            return false;
        }
        if self.rules.iter().all(|rule| rule_holds(rule, ctx)) {
            self.open = true;
            debug!(rules = ?self.rules, "completion gate opened");
            return true;
        }
        false
    }

    pub fn unmet(&self, ctx: &GateContext) -> Vec<GateRule> {
        if self.open {
            return Vec::new();
        }
        unmet_rules(&self.rules, ctx)
    }

    pub fn reset(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_with(correct: u32) -> GateContext {
        GateContext {
            score_correct: correct,
            problem_set_finished: true,
            ..GateContext::default()
        }
    }

    #[test]
    fn score_threshold_needs_a_finished_set() {
        let rule = GateRule::ScoreThreshold { required: 4 };
        let unfinished = GateContext {
            score_correct: 4,
            ..GateContext::default()
        };
        assert!(!rule_holds(&rule, &unfinished));
        assert!(rule_holds(&rule, &finished_with(4)));
        assert!(rule_holds(&rule, &finished_with(5)));
        assert!(!rule_holds(&rule, &finished_with(3)));
    }

    #[test]
    fn gate_opens_only_when_every_rule_holds() {
        let mut gate = CompletionGate::new(vec![
            GateRule::ScoreThreshold { required: 4 },
            GateRule::TerminalPhase,
        ]);

        assert!(!gate.refresh(&finished_with(4)));
        assert!(!gate.can_complete());
        assert_eq!(
            gate.unmet(&finished_with(4)),
            vec![GateRule::TerminalPhase]
        );

        let ctx = GateContext {
            at_terminal_phase: true,
            ..finished_with(4)
        };
        assert!(gate.refresh(&ctx));
        assert!(gate.can_complete());
    }

    #[test]
    fn gate_stays_open_until_reset() {
        let mut gate = CompletionGate::new(vec![GateRule::TerminalPhase]);
        gate.refresh(&GateContext {
            at_terminal_phase: true,
            ..GateContext::default()
        });

        assert!(!gate.refresh(&GateContext::default()));
        assert!(gate.can_complete());

        gate.reset();
        assert!(!gate.can_complete());
    }

    #[test]
    fn empty_rules_default_to_terminal_phase() {
        let gate = CompletionGate::new(Vec::new());
        assert_eq!(gate.rules(), &[GateRule::TerminalPhase]);
    }

    #[test]
    fn scoreboard_keeps_first_attempt() {
        let mut board = ScoreBoard::new(2);
        let a = ExampleId::from("a");
        assert!(board.record(&a, false));
        assert!(!board.record(&a, true));
        assert_eq!(board.correct(), 0);
        assert!(!board.is_finished());

        board.record(&ExampleId::from("b"), true);
        assert!(board.is_finished());
        assert_eq!(
            board.summary(),
            ScoreSummary {
                correct: 1,
                attempted: 2,
                total: 2
            }
        );
    }
}
