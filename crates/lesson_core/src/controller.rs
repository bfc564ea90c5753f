use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{Answer, Example, ExampleId, ExpectedAnswer, GateRule, Phase},
    error::LessonError,
    protocol::{Advance, AnswerState, LessonSnapshot, RevealProgress, Verdict},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    answer::AnswerEvaluator,
    config::LessonConfig,
    cursor::ExampleCursor,
    gate::{unmet_rules, CompletionGate, GateContext, ScoreBoard},
    options::OptionOrder,
    phase::{PhaseController, Transition},
    reveal::RevealSequencer,
};

pub struct LessonController<P, T> {
    mount_id: Uuid,
    title: String,
    phases: PhaseController<P>,
    exit_rules: HashMap<P, Vec<GateRule>>,
    cursor: ExampleCursor<T>,
    reveal: RevealSequencer,
    answer: AnswerEvaluator,
    score: ScoreBoard,
    gate: CompletionGate,
    option_orders: Vec<OptionOrder>,
    scoring: bool,
    discover_on_correct: bool,
}

impl<P: Phase, T> LessonController<P, T> {
    pub fn new(config: LessonConfig<P, T>) -> Result<Self, LessonError> {
        config.validate()?;

        let problem_count = config.problem_count() as u32;
        let LessonConfig {
            title,
            phases,
            examples,
            completion,
            scoring,
            discover_on_correct,
            shuffle_seed,
        } = config;

        let mut exit_rules = HashMap::new();
        let mut order = Vec::with_capacity(phases.len());
        for spec in phases {
            if !spec.exit.is_empty() {
                exit_rules.insert(spec.name.clone(), spec.exit);
            }
            order.push(spec.name);
        }

        let option_orders = examples
            .iter()
            .enumerate()
            .map(|(position, example)| {
                let len = example
                    .answer
                    .as_ref()
                    .map(ExpectedAnswer::option_count)
                    .unwrap_or(0);
                match shuffle_seed {
                    Some(seed) => OptionOrder::shuffled(len, seed.wrapping_add(position as u64)),
                    None => OptionOrder::identity(len),
                }
            })
            .collect();

        let examples: Arc<[Example<T>]> = examples.into();
        let first_steps = examples.first().map(|example| example.steps).unwrap_or(0);
        let mount_id = Uuid::new_v4();
        debug!(
            mount = %mount_id,
            title = %title,
            phases = order.len(),
            examples = examples.len(),
            "lesson mounted"
        );

        let mut controller = Self {
            mount_id,
            title,
            phases: PhaseController::new(order)?,
            exit_rules,
            cursor: ExampleCursor::new(examples),
            reveal: RevealSequencer::new(first_steps),
            answer: AnswerEvaluator::new(),
            score: ScoreBoard::new(if scoring { problem_count } else { 0 }),
            gate: CompletionGate::new(completion),
            option_orders,
            scoring,
            discover_on_correct,
        };
        controller.refresh_gate();
        Ok(controller)
    }

    pub fn mount_id(&self) -> Uuid {
        self.mount_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phases(&self) -> &PhaseController<P> {
        &self.phases
    }

    pub fn current_phase(&self) -> &P {
        self.phases.current()
    }

    pub fn cursor(&self) -> &ExampleCursor<T> {
        &self.cursor
    }

    pub fn current_example(&self) -> Result<&Example<T>, LessonError> {
        self.cursor.current_example()
    }

    pub fn reveal_progress(&self) -> RevealProgress {
        self.reveal.progress()
    }

    pub fn answer_state(&self) -> &AnswerState {
        self.answer.state()
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn is_scoring(&self) -> bool {
        self.scoring
    }

    pub fn option_order(&self) -> Option<&OptionOrder> {
        self.option_orders.get(self.cursor.index())
    }

    pub fn completion_rules(&self) -> &[GateRule] {
        self.gate.rules()
    }

    pub fn can_complete(&self) -> bool {
        self.gate.can_complete()
    }

    pub fn unmet_completion_rules(&self) -> Vec<GateRule> {
        self.gate.unmet(&self.gate_context())
    }

    pub fn unmet_exit_rules(&self) -> Vec<GateRule> {
        self.exit_rules
            .get(self.phases.current())
            .map(|rules| unmet_rules(rules, &self.gate_context()))
            .unwrap_or_default()
    }

    pub fn select(&mut self, value: Answer) -> bool {
        let accepted = self.answer.select(value);
        self.refresh_gate();
        accepted
    }

    pub fn submit(&mut self) -> Result<Option<Verdict>, LessonError> {
        let example = self.cursor.current_example()?;
        let Some(expected) = example.answer.as_ref() else {
            return Ok(None);
        };
        let id = example.id.clone();

        let Some(verdict) = self.answer.submit(expected) else {
            return Ok(None);
        };

        if verdict.newly_recorded {
            if self.scoring && self.score.record(&id, verdict.is_correct) {
                debug!(
                    mount = %self.mount_id,
                    example = %id,
                    correct = self.score.correct(),
                    attempted = self.score.attempted(),
                    "score updated"
                );
            }
            if verdict.is_correct && self.discover_on_correct {
                self.cursor.mark_discovered(&id)?;
            }
        }

        self.refresh_gate();
        Ok(Some(verdict))
    }

    pub fn reveal(&mut self) -> Result<RevealProgress, LessonError> {
        self.cursor.current_example()?;
        let progress = self.reveal.reveal();
        debug!(
            mount = %self.mount_id,
            count = progress.count,
            exhausted = progress.exhausted,
            "step revealed"
        );
        self.refresh_gate();
        Ok(progress)
    }

    pub fn mark_discovered(&mut self, id: &ExampleId) -> Result<bool, LessonError> {
        let inserted = self.cursor.mark_discovered(id)?;
        self.refresh_gate();
        Ok(inserted)
    }

    pub fn advance_example(&mut self) -> Result<Advance, LessonError> {
        let advance = self.cursor.advance()?;
        if !advance.done {
            self.on_example_changed();
        }
        self.refresh_gate();
        Ok(advance)
    }

    pub fn seek_example(&mut self, index: usize) -> Result<bool, LessonError> {
        let changed = self.cursor.seek(index)?;
        if changed {
            self.on_example_changed();
        }
        self.refresh_gate();
        Ok(changed)
    }

    /// Advances one phase. Leaving the frontier phase requires its exit rules to hold.
    pub fn next_phase(&mut self) -> Transition<P> {
        if self.phases.at_frontier() && !self.phases.is_terminal() {
            let unmet = self.unmet_exit_rules();
            if !unmet.is_empty() {
                let phase = self.phases.current().clone();
                debug!(mount = %self.mount_id, %phase, ?unmet, "phase exit blocked");
                return Transition::Blocked { phase, unmet };
            }
        }

        let transition = self.phases.next();
        self.refresh_gate();
        transition
    }

    /// Tab-style navigation. Revisits are free; unlocking the next phase is gated like `next_phase`.
    pub fn go_to_phase(&mut self, phase: &P) -> Result<Transition<P>, LessonError> {
        let target = self
            .phases
            .position(phase)
            .ok_or_else(|| LessonError::UnknownPhase {
                phase: phase.to_string(),
            })?;

        if target == self.phases.furthest() + 1 {
            let frontier = self.phases.phases()[self.phases.furthest()].clone();
            let unmet = self
                .exit_rules
                .get(&frontier)
                .map(|rules| unmet_rules(rules, &self.gate_context()))
                .unwrap_or_default();
            if !unmet.is_empty() {
                warn!(mount = %self.mount_id, target = %phase, %frontier, "phase jump blocked");
                return Ok(Transition::Blocked {
                    phase: frontier,
                    unmet,
                });
            }
        }

        let transition = self.phases.go_to(phase)?;
        self.refresh_gate();
        Ok(transition)
    }

    pub fn reset(&mut self) {
        self.phases.reset();
        self.cursor.reset();
        self.score.reset();
        self.gate.reset();
        self.on_example_changed();
        info!(mount = %self.mount_id, "lesson reset");
        self.refresh_gate();
    }

    pub fn snapshot(&self) -> LessonSnapshot {
        let example = self.cursor.current_example().ok();
        LessonSnapshot {
            mount_id: self.mount_id,
            title: self.title.clone(),
            phase: self.phases.current().to_string(),
            phase_index: self.phases.index(),
            furthest_phase_index: self.phases.furthest(),
            phase_count: self.phases.phases().len(),
            example_id: example.map(|example| example.id.clone()),
            example_index: self.cursor.index(),
            example_count: self.cursor.len(),
            reveal: self.reveal.progress(),
            answer: self.answer.state().clone(),
            score: self.score.summary(),
            discovered: self.cursor.discovered().cloned().collect(),
            can_complete: self.gate.can_complete(),
        }
    }

    fn on_example_changed(&mut self) {
        let steps = self
            .cursor
            .current_example()
            .map(|example| example.steps)
            .unwrap_or(0);
        self.reveal.reset_for_example(steps);
        self.answer.reset_attempt();
    }

    fn gate_context(&self) -> GateContext {
        GateContext {
            all_discovered: self.cursor.all_discovered(),
            score_correct: self.score.correct(),
            problem_set_finished: self.score.is_finished(),
            at_terminal_phase: self.phases.is_terminal(),
            steps_exhausted: !self.cursor.is_empty() && self.reveal.is_exhausted(),
            answer_submitted: self.answer.is_submitted(),
        }
    }

    fn refresh_gate(&mut self) {
        let ctx = self.gate_context();
        if self.gate.refresh(&ctx) {
            info!(mount = %self.mount_id, title = %self.title, "lesson step can complete");
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
