//! Constant-growback resource patches.
//!
//! Each [`ResourcePatch`] holds a current `amount` and a `capacity`
//! ceiling. Every tick it regrows by a fixed increment clamped to the
//! ceiling; there is no randomness and no interaction between patches.
//! A forager landing on the cell harvests the entire stock.

use serde::{Deserialize, Serialize};
use sugarscape_types::Position;

use crate::error::WorldError;

/// Units regrown per tick under the constant-growback rule.
pub const GROWBACK_PER_TICK: u32 = 1;

/// Per-cell regrowing resource stock. Invariant: `amount <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePatch {
    position: Position,
    amount: u32,
    capacity: u32,
}

impl ResourcePatch {
    /// Create a patch that starts full.
    pub const fn full(position: Position, capacity: u32) -> Self {
        Self {
            position,
            amount: capacity,
            capacity,
        }
    }

    /// Create a patch with an explicit starting amount.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] if `amount > capacity`.
    pub fn with_amount(position: Position, amount: u32, capacity: u32) -> Result<Self, WorldError> {
        let patch = Self {
            position,
            amount,
            capacity,
        };
        patch.check()?;
        Ok(patch)
    }

    /// The cell this patch belongs to.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Resource currently standing on the patch.
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Ceiling the amount regrows to.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Apply one tick of regrowth, returning the units actually added.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] if the patch was already
    /// above capacity.
    pub fn regrow(&mut self, growth: u32) -> Result<u32, WorldError> {
        self.check()?;
        let headroom = self.capacity.saturating_sub(self.amount);
        let added = growth.min(headroom);
        self.amount = self
            .amount
            .checked_add(added)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(added)
    }

    /// Take the entire standing stock, leaving the patch empty.
    pub const fn harvest(&mut self) -> u32 {
        let taken = self.amount;
        self.amount = 0;
        taken
    }

    /// Verify `amount <= capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] when the bound is broken.
    pub fn check(&self) -> Result<(), WorldError> {
        if self.amount > self.capacity {
            return Err(WorldError::InvariantViolation {
                reason: format!(
                    "patch at {} holds {} above capacity {}",
                    self.position, self.amount, self.capacity
                ),
            });
        }
        Ok(())
    }
}
