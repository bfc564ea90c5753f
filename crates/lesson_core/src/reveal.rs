use shared::protocol::RevealProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealSequencer {
    count: u32,
    cap: u32,
}

impl RevealSequencer {
    pub fn new(cap: u32) -> Self {
        Self { count: 0, cap }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.cap
    }

    pub fn progress(&self) -> RevealProgress {
        RevealProgress {
            count: self.count,
            exhausted: self.is_exhausted(),
        }
    }

    pub fn reveal(&mut self) -> RevealProgress {
        if self.count < self.cap {
            self.count += 1;
        }
        self.progress()
    }

    pub fn reset_for_example(&mut self, cap: u32) {
        self.count = 0;
        self.cap = cap;
    }
}
