//! Eating, metabolism and solidarity settlement.
//!
//! After harvesting, every forager burns its metabolism. An independent or
//! individualist forager simply keeps what it harvested:
//!
//! ```text
//! wealth += harvested - metabolism
//! ```
//!
//! A cooperative forager settles through the redistribution pool:
//!
//! 1. If wealth exceeds `reserve_multiplier * metabolism`, the surplus of
//!    the harvest over metabolism is set aside for the pool.
//! 2. The rest of the harvest is eaten. If that falls short of metabolism,
//!    the shortfall is requested from the pool (granted up to its balance).
//! 3. The set-aside surplus is contributed to the pool.
//! 4. `wealth += eaten - metabolism`.

use serde::{Deserialize, Serialize};
use sugarscape_world::RedistributionPool;
use tracing::trace;

use crate::config::ForagingRules;
use crate::error::AgentError;
use crate::forager::Forager;

/// How one activation's harvest was split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Units taken from the patch.
    pub harvested: u32,
    /// Units eaten, including anything drawn from the pool.
    pub eaten: u64,
    /// Units drawn from the pool.
    pub drawn: u64,
    /// Units contributed to the pool.
    pub contributed: u64,
    /// Wealth after metabolism.
    pub wealth_after: i64,
}

/// Settle one activation's harvest for `forager`.
///
/// Cooperative foragers only use the pool when `rules.solidarity` is set.
///
/// # Errors
///
/// Returns [`AgentError::ArithmeticOverflow`] if the wealth update
/// overflows, or [`AgentError::World`] if the pool contribution overflows.
pub fn settle(
    forager: &mut Forager,
    harvested: u32,
    pool: &mut RedistributionPool,
    rules: &ForagingRules,
) -> Result<Settlement, AgentError> {
    let metabolism = u64::from(forager.metabolism());
    let collected = u64::from(harvested);

    let (eaten, drawn, contributed) =
        if rules.solidarity && forager.disposition().is_cooperative() {
            let reserve = metabolism.saturating_mul(u64::from(rules.reserve_multiplier));
            let above_reserve = u64::try_from(forager.wealth()).is_ok_and(|w| w > reserve);
            let contributed = if above_reserve {
                collected.saturating_sub(metabolism)
            } else {
                0
            };
            let mut eaten = collected.saturating_sub(contributed);
            let mut drawn = 0;
            if eaten < metabolism {
                drawn = pool.require(metabolism.saturating_sub(eaten));
                eaten = eaten.saturating_add(drawn);
            }
            pool.add(contributed)?;
            (eaten, drawn, contributed)
        } else {
            (collected, 0, 0)
        };

    let delta = to_signed(eaten)?
        .checked_sub(to_signed(metabolism)?)
        .ok_or_else(|| overflow(forager))?;
    let wealth_after = forager.adjust_wealth(delta)?;

    trace!(
        agent_id = %forager.id(),
        harvested,
        eaten,
        drawn,
        contributed,
        wealth_after,
        "Harvest settled"
    );

    Ok(Settlement {
        harvested,
        eaten,
        drawn,
        contributed,
        wealth_after,
    })
}

fn to_signed(value: u64) -> Result<i64, AgentError> {
    i64::try_from(value).map_err(|_| AgentError::ArithmeticOverflow {
        context: format!("settlement amount {value} exceeds i64"),
    })
}

fn overflow(forager: &Forager) -> AgentError {
    AgentError::ArithmeticOverflow {
        context: format!("settlement delta for agent {}", forager.id()),
    }
}
