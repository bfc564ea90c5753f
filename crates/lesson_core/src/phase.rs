use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{GateRule, Phase},
    error::LessonError,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<P> {
    Advanced { from: P, to: P },
    Revisited { from: P, to: P },
    /// Target equals the current phase.
    Stayed(P),
    /// `next` on the last phase; the host should offer completion instead.
    AtTerminal(P),
    /// The frontier phase's exit rules do not hold yet.
    Blocked { phase: P, unmet: Vec<GateRule> },
}

impl<P> Transition<P> {
    pub fn moved(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Revisited { .. })
    }
}

/// Tracks the current phase and the furthest phase reached.
///
/// Any phase up to the frontier may be revisited. Moving past the frontier is
/// one phase at a time; callers that enforce exit rules check them before
/// asking for that step.
#[derive(Debug, Clone)]
pub struct PhaseController<P> {
    phases: Arc<[P]>,
    index: usize,
    furthest: usize,
}

impl<P: Phase> PhaseController<P> {
    pub fn new(phases: Vec<P>) -> Result<Self, LessonError> {
        if phases.is_empty() {
            return Err(LessonError::invalid_config("phase list is empty"));
        }
        let mut seen = HashSet::new();
        for phase in &phases {
            if !seen.insert(phase) {
                return Err(LessonError::invalid_config(format!(
                    "phase '{phase}' is listed more than once"
                )));
            }
        }

        Ok(Self {
            phases: phases.into(),
            index: 0,
            furthest: 0,
        })
    }

    pub fn phases(&self) -> &[P] {
        &self.phases
    }

    pub fn current(&self) -> &P {
        &self.phases[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn furthest(&self) -> usize {
        self.furthest
    }

    pub fn last(&self) -> &P {
        &self.phases[self.phases.len() - 1]
    }

    pub fn is_terminal(&self) -> bool {
        self.index + 1 == self.phases.len()
    }

    pub fn at_frontier(&self) -> bool {
        self.index == self.furthest
    }

    pub fn position(&self, phase: &P) -> Option<usize> {
        self.phases.iter().position(|candidate| candidate == phase)
    }

    pub fn next(&mut self) -> Transition<P> {
        if self.is_terminal() {
            return Transition::AtTerminal(self.current().clone());
        }

        let from = self.current().clone();
        self.index += 1;
        self.furthest = self.furthest.max(self.index);
        let to = self.current().clone();
        debug!(%from, %to, "phase advanced");
        Transition::Advanced { from, to }
    }

    pub fn go_to(&mut self, phase: &P) -> Result<Transition<P>, LessonError> {
        let target = self
            .position(phase)
            .ok_or_else(|| LessonError::UnknownPhase {
                phase: phase.to_string(),
            })?;

        if target == self.index {
            return Ok(Transition::Stayed(phase.clone()));
        }
        if target > self.furthest + 1 {
            return Err(LessonError::PhaseLocked {
                phase: phase.to_string(),
                frontier: self.phases[self.furthest].to_string(),
            });
        }

        let from_index = self.index;
        let from = self.current().clone();
        self.index = target;
        self.furthest = self.furthest.max(target);
        let to = self.current().clone();

        if target > from_index {
            debug!(%from, %to, "phase advanced by jump");
            Ok(Transition::Advanced { from, to })
        } else {
            debug!(%from, %to, "phase revisited");
            Ok(Transition::Revisited { from, to })
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.furthest = 0;
    }
}

#[cfg(test)]
#[path = "tests/phase_tests.rs"]
mod tests;
