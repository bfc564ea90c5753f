use std::time::Duration;

use tokio::{
    sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::sleep,
};
use tracing::debug;

struct Scheduled<E> {
    generation: u64,
    step: E,
}

/// Owns every pending delayed step of one mounted screen.
///
/// Steps are delivered through [`StepSchedule::next_step`] and applied by the
/// host on its own task. `cancel_all` (or dropping the schedule) aborts pending
/// timers, and a step that fired before cancellation but was not yet consumed
/// is discarded by its stale generation.
pub struct StepSchedule<E> {
    tx: UnboundedSender<Scheduled<E>>,
    rx: UnboundedReceiver<Scheduled<E>>,
    handles: Vec<JoinHandle<()>>,
    generation: u64,
}

impl<E: Send + 'static> StepSchedule<E> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            handles: Vec::new(),
            generation: 0,
        }
    }

    /// Schedules `step` to fire after `delay`. Must be called within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, step: E) {
        let tx = self.tx.clone();
        let generation = self.generation;
        self.handles.push(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Scheduled { generation, step });
        }));
    }

    pub fn schedule_sequence(&mut self, interval: Duration, steps: impl IntoIterator<Item = E>) {
        let mut delay = Duration::ZERO;
        for step in steps {
            delay += interval;
            self.schedule(delay, step);
        }
    }

    pub fn pending(&mut self) -> usize {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.len()
    }

    pub fn cancel_all(&mut self) {
        let cancelled = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        self.generation += 1;
        debug!(cancelled, generation = self.generation, "scheduled steps cancelled");
    }

    /// Waits for the next live step. Returns `None` once nothing is pending.
    pub async fn next_step(&mut self) -> Option<E> {
        loop {
            match self.rx.try_recv() {
                Ok(scheduled) => {
                    if scheduled.generation == self.generation {
                        return Some(scheduled.step);
                    }
                    continue;
                }
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }

            if self.pending() == 0 {
                // A timer may have fired between the first poll and the retain above.
                match self.rx.try_recv() {
                    Ok(scheduled) if scheduled.generation == self.generation => {
                        return Some(scheduled.step);
                    }
                    Ok(_) => continue,
                    Err(_) => return None,
                }
            }

            let scheduled = self.rx.recv().await?;
            if scheduled.generation == self.generation {
                return Some(scheduled.step);
            }
        }
    }

    pub fn try_next_step(&mut self) -> Option<E> {
        while let Ok(scheduled) = self.rx.try_recv() {
            if scheduled.generation == self.generation {
                return Some(scheduled.step);
            }
        }
        None
    }
}

impl<E: Send + 'static> Default for StepSchedule<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for StepSchedule<E> {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod tests;
