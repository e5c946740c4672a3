//! Redistribution pool for solidarity among cooperating foragers.
//!
//! The pool is a single non-negative balance. Contributions only add to
//! it; withdrawals only take what is there. Both operations are immediate.
//!
//! The pool also keeps running totals of everything added and withdrawn so
//! its conservation law can be checked at any time:
//!
//! ```text
//! balance == total_added - total_withdrawn
//! total_withdrawn <= total_added
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::WorldError;

/// A shared, conserving, non-negative resource buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionPool {
    balance: u64,
    total_added: u64,
    total_withdrawn: u64,
}

impl RedistributionPool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self {
            balance: 0,
            total_added: 0,
            total_withdrawn: 0,
        }
    }

    /// Resource currently held.
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Everything ever contributed.
    pub const fn total_added(&self) -> u64 {
        self.total_added
    }

    /// Everything ever withdrawn.
    pub const fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    /// Contribute `amount` to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the balance or running
    /// total would overflow; the pool is unchanged in that case.
    pub fn add(&mut self, amount: u64) -> Result<(), WorldError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let total_added = self
            .total_added
            .checked_add(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        self.balance = balance;
        self.total_added = total_added;
        trace!(amount, balance, "Pool contribution");
        Ok(())
    }

    /// Withdraw up to `amount`, returning what was actually granted:
    /// `min(amount, balance)`. The balance never goes negative.
    pub const fn require(&mut self, amount: u64) -> u64 {
        let granted = if amount < self.balance {
            amount
        } else {
            self.balance
        };
        self.balance = self.balance.saturating_sub(granted);
        self.total_withdrawn = self.total_withdrawn.saturating_add(granted);
        granted
    }

    /// Verify the conservation law.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] if more has left the pool
    /// than ever entered it, or the balance disagrees with the totals.
    pub fn verify_conservation(&self) -> Result<(), WorldError> {
        let expected = self.total_added.checked_sub(self.total_withdrawn).ok_or_else(|| {
            WorldError::InvariantViolation {
                reason: format!(
                    "pool withdrew {} but only {} was ever added",
                    self.total_withdrawn, self.total_added
                ),
            }
        })?;
        if expected != self.balance {
            return Err(WorldError::InvariantViolation {
                reason: format!(
                    "pool balance {} disagrees with added {} - withdrawn {}",
                    self.balance, self.total_added, self.total_withdrawn
                ),
            });
        }
        Ok(())
    }
}
