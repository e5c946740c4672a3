//! Simulation clock.
//!
//! The tick number is the only temporal state. Tick 0 is the freshly
//! constructed World; each completed tick advances the counter by one.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter for one World.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    tick: u64,
}

impl WorldClock {
    /// A clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the current tick closes a period of `period` ticks.
    ///
    /// Tick 0 never does, and a zero period never fires.
    pub fn on_period(&self, period: u64) -> bool {
        self.tick > 0 && self.tick.checked_rem(period).is_some_and(|r| r == 0)
    }
}
