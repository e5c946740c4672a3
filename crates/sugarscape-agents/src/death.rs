//! Starvation records.
//!
//! A forager dies when its wealth is zero or below after settlement. The
//! record captures the attributes death accounting partitions on, taken
//! before the forager is dropped.

use serde::{Deserialize, Serialize};
use sugarscape_types::{AgentId, Disposition, Position, SensingBucket};

use crate::forager::Forager;

/// Data emitted when a forager starves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    /// The forager who died.
    pub agent_id: AgentId,
    /// Cell it died on (freed by the time the record is returned).
    pub position: Position,
    /// Wealth at death, zero or negative.
    pub final_wealth: i64,
    /// Sensing radius at death.
    pub sensing_radius: u32,
    /// Low/high sensing bucket.
    pub sensing_bucket: SensingBucket,
    /// Solidarity role.
    pub disposition: Disposition,
}

/// Build a death record if `forager` has starved.
pub const fn check_starvation(forager: &Forager, low_sensing_threshold: u32) -> Option<DeathRecord> {
    if forager.is_alive() {
        return None;
    }
    Some(DeathRecord {
        agent_id: forager.id(),
        position: forager.position(),
        final_wealth: forager.wealth(),
        sensing_radius: forager.sensing_radius(),
        sensing_bucket: forager.sensing_bucket(low_sensing_threshold),
        disposition: forager.disposition(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn living_forager_has_no_record() {
        let f = Forager::new(AgentId(1), Position::new(0, 0), 1, 1, 1, Disposition::Solidary)
            .unwrap();
        assert!(check_starvation(&f, 3).is_none());
    }

    #[test]
    fn starved_forager_is_classified() {
        let mut f = Forager::new(
            AgentId(2),
            Position::new(3, 4),
            1,
            2,
            2,
            Disposition::Individualist,
        )
        .unwrap();
        f.adjust_wealth(-1).unwrap();
        let record = check_starvation(&f, 3).unwrap();
        assert_eq!(record.agent_id, AgentId(2));
        assert_eq!(record.final_wealth, 0);
        assert_eq!(record.sensing_bucket, SensingBucket::Low);
        assert_eq!(record.disposition, Disposition::Individualist);
        assert_eq!(record.position, Position::new(3, 4));
    }
}
