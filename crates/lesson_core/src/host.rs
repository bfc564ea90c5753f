use shared::{
    domain::{Answer, Phase},
    error::LessonError,
    protocol::{Advance, LessonEvent, LessonSnapshot, RevealProgress, Verdict},
};
use tracing::{debug, info};

use crate::{
    answer::parse_numeric_input, controller::LessonController, phase::Transition,
    schedule::StepSchedule,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome<P> {
    Selected { accepted: bool },
    InputRejected { reason: String },
    Submitted(Option<Verdict>),
    Revealed(RevealProgress),
    Discovered { newly: bool },
    ExampleAdvanced(Advance),
    ExampleSought { changed: bool },
    Phase(Transition<P>),
    Reset,
}

type CompletionCallback = Box<dyn FnOnce()>;

pub struct LessonHost<P, T> {
    controller: LessonController<P, T>,
    on_complete: Option<CompletionCallback>,
    completed: bool,
    schedule: Option<StepSchedule<LessonEvent>>,
}

impl<P: Phase, T> LessonHost<P, T> {
    pub fn new(controller: LessonController<P, T>) -> Self {
        Self {
            controller,
            on_complete: None,
            completed: false,
            schedule: None,
        }
    }

    /// Registers the completion callback. It runs at most once per mount, even across `reset`.
    pub fn with_on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self.poll_completion();
        self
    }

    pub fn controller(&self) -> &LessonController<P, T> {
        &self.controller
    }

    pub fn snapshot(&self) -> LessonSnapshot {
        self.controller.snapshot()
    }

    pub fn has_completed(&self) -> bool {
        self.completed
    }

    /// Delayed events owned by this mount. `Reset` cancels everything pending and
    /// dropping the host aborts the timers.
    pub fn schedule(&mut self) -> &mut StepSchedule<LessonEvent> {
        self.schedule.get_or_insert_with(StepSchedule::new)
    }

    pub fn cancel_scheduled(&mut self) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.cancel_all();
        }
    }

    /// Waits for the next scheduled event and applies it. `None` once nothing is pending.
    pub async fn next_scheduled(&mut self) -> Option<Result<EventOutcome<P>, LessonError>> {
        let event = self.schedule.as_mut()?.next_step().await?;
        Some(self.apply(event))
    }

    pub fn apply(&mut self, event: LessonEvent) -> Result<EventOutcome<P>, LessonError> {
        debug!(mount = %self.controller.mount_id(), ?event, "applying lesson event");
        let outcome = match event {
            LessonEvent::Select { answer } => EventOutcome::Selected {
                accepted: self.controller.select(answer),
            },
            LessonEvent::SelectText { text } => self.select_text(&text),
            LessonEvent::SelectOption { position } => self.select_option(position),
            LessonEvent::Submit => EventOutcome::Submitted(self.controller.submit()?),
            LessonEvent::Reveal => EventOutcome::Revealed(self.controller.reveal()?),
            LessonEvent::MarkDiscovered { example_id } => EventOutcome::Discovered {
                newly: self.controller.mark_discovered(&example_id)?,
            },
            LessonEvent::NextExample => {
                EventOutcome::ExampleAdvanced(self.controller.advance_example()?)
            }
            LessonEvent::SeekExample { index } => EventOutcome::ExampleSought {
                changed: self.controller.seek_example(index)?,
            },
            LessonEvent::NextPhase => EventOutcome::Phase(self.controller.next_phase()),
            LessonEvent::GoToPhase { phase } => {
                let target = self.resolve_phase(&phase)?;
                EventOutcome::Phase(self.controller.go_to_phase(&target)?)
            }
            LessonEvent::Reset => {
                self.cancel_scheduled();
                self.controller.reset();
                EventOutcome::Reset
            }
        };

        self.poll_completion();
        Ok(outcome)
    }

    fn select_text(&mut self, text: &str) -> EventOutcome<P> {
        let numeric = self
            .controller
            .current_example()
            .ok()
            .and_then(|example| example.answer.as_ref())
            .map(|answer| answer.is_numeric())
            .unwrap_or(false);

        let answer = if numeric {
            match parse_numeric_input(text) {
                Some(value) => Answer::Number(value),
                None => {
                    return EventOutcome::InputRejected {
                        reason: format!("'{}' is not a number", text.trim()),
                    };
                }
            }
        } else {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return EventOutcome::InputRejected {
                    reason: "empty answer".to_string(),
                };
            }
            Answer::Text(trimmed.to_string())
        };

        EventOutcome::Selected {
            accepted: self.controller.select(answer),
        }
    }

    fn select_option(&mut self, position: usize) -> EventOutcome<P> {
        let original = self
            .controller
            .option_order()
            .and_then(|order| order.original_index(position));
        match original {
            Some(index) => EventOutcome::Selected {
                accepted: self.controller.select(Answer::Choice(index)),
            },
            None => EventOutcome::InputRejected {
                reason: format!("no option at position {position}"),
            },
        }
    }

    fn resolve_phase(&self, label: &str) -> Result<P, LessonError> {
        self.controller
            .phases()
            .phases()
            .iter()
            .find(|phase| phase.to_string() == label)
            .cloned()
            .ok_or_else(|| LessonError::UnknownPhase {
                phase: label.to_string(),
            })
    }

    fn poll_completion(&mut self) {
        if self.completed || !self.controller.can_complete() {
            return;
        }
        if let Some(callback) = self.on_complete.take() {
            self.completed = true;
            info!(mount = %self.controller.mount_id(), "lesson step completed");
            callback();
        }
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
