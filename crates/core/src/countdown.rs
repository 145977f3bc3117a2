/// Default assessment time budget in seconds.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 30;

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running(u32),
    Expired,
}

/// Per-assessment countdown, decremented once per second while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
}

impl Countdown {
    /// A zero budget is bumped to one second so the clock always ticks at least once.
    #[must_use]
    pub fn new(budget: u32) -> Self {
        let budget = budget.max(1);
        Self {
            budget,
            remaining: budget,
        }
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset(&mut self) {
        self.remaining = self.budget;
    }

    /// Decrement by one second. Reaching zero yields `Expired` and rearms the full budget.
    pub fn tick(&mut self) -> CountdownTick {
        if self.remaining <= 1 {
            self.reset();
            return CountdownTick::Expired;
        }
        self.remaining -= 1;
        CountdownTick::Running(self.remaining)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_budget_ticks() {
        let mut c = Countdown::new(3);
        assert_eq!(c.tick(), CountdownTick::Running(2));
        assert_eq!(c.tick(), CountdownTick::Running(1));
        assert_eq!(c.tick(), CountdownTick::Expired);
        assert_eq!(c.remaining(), 3);
    }

    #[test]
    fn default_budget_is_thirty_seconds() {
        let c = Countdown::default();
        assert_eq!(c.budget(), 30);
        assert_eq!(c.remaining(), 30);
    }

    #[test]
    fn zero_budget_expires_on_first_tick() {
        let mut c = Countdown::new(0);
        assert_eq!(c.tick(), CountdownTick::Expired);
    }
}
