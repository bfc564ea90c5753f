use std::{collections::BTreeSet, sync::Arc};

use shared::{
    domain::{Example, ExampleId},
    error::LessonError,
    protocol::Advance,
};
use tracing::debug;

pub struct ExampleCursor<T> {
    examples: Arc<[Example<T>]>,
    index: usize,
    discovered: BTreeSet<ExampleId>,
}

impl<T> ExampleCursor<T> {
    pub fn new(examples: Arc<[Example<T>]>) -> Self {
        Self {
            examples,
            index: 0,
            discovered: BTreeSet::new(),
        }
    }

    pub fn examples(&self) -> &[Example<T>] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_example(&self) -> Result<&Example<T>, LessonError> {
        self.examples
            .get(self.index)
            .ok_or(LessonError::EmptyExampleList)
    }

    pub fn is_last(&self) -> bool {
        !self.is_empty() && self.index + 1 == self.len()
    }

    pub fn advance(&mut self) -> Result<Advance, LessonError> {
        self.ensure_not_empty()?;

        if self.index + 1 < self.len() {
            self.index += 1;
            debug!(index = self.index, "advanced to next example");
            return Ok(Advance {
                done: false,
                index: self.index,
            });
        }

        Ok(Advance {
            done: true,
            index: self.index,
        })
    }

    pub fn seek(&mut self, index: usize) -> Result<bool, LessonError> {
        self.ensure_not_empty()?;
        if index >= self.len() {
            return Err(LessonError::ExampleOutOfRange {
                index,
                len: self.len(),
            });
        }

        let changed = index != self.index;
        self.index = index;
        Ok(changed)
    }

    pub fn seek_id(&mut self, id: &ExampleId) -> Result<bool, LessonError> {
        let index = self.position(id)?;
        self.seek(index)
    }

    pub fn mark_discovered(&mut self, id: &ExampleId) -> Result<bool, LessonError> {
        self.position(id)?;
        let inserted = self.discovered.insert(id.clone());
        if inserted {
            debug!(example = %id, discovered = self.discovered.len(), "example discovered");
        }
        Ok(inserted)
    }

    pub fn is_discovered(&self, id: &ExampleId) -> bool {
        self.discovered.contains(id)
    }

    pub fn discovered(&self) -> impl Iterator<Item = &ExampleId> {
        self.discovered.iter()
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn all_discovered(&self) -> bool {
        !self.is_empty() && self.discovered.len() == self.len()
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.discovered.clear();
    }

    fn position(&self, id: &ExampleId) -> Result<usize, LessonError> {
        self.examples
            .iter()
            .position(|example| &example.id == id)
            .ok_or_else(|| LessonError::UnknownExample { id: id.clone() })
    }

    fn ensure_not_empty(&self) -> Result<(), LessonError> {
        if self.is_empty() {
            Err(LessonError::EmptyExampleList)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "tests/cursor_tests.rs"]
mod tests;
