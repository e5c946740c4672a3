//! Forager state.
//!
//! A forager owns its wealth and fixed endowment. Its position mirrors the
//! grid's occupancy record; the step transition keeps the two in sync.

use rand::Rng;
use sugarscape_types::{AgentId, Disposition, ForagerView, Position, SensingBucket};

use crate::config::EndowmentConfig;
use crate::error::AgentError;

/// A mobile agent that harvests, eats and may starve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forager {
    id: AgentId,
    position: Position,
    wealth: i64,
    metabolism: u32,
    sensing_radius: u32,
    disposition: Disposition,
}

impl Forager {
    /// Create a forager with explicit attributes.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidEndowment`] if `metabolism` is zero or
    /// `wealth` is not positive.
    pub fn new(
        id: AgentId,
        position: Position,
        wealth: i64,
        metabolism: u32,
        sensing_radius: u32,
        disposition: Disposition,
    ) -> Result<Self, AgentError> {
        if metabolism == 0 {
            return Err(AgentError::InvalidEndowment {
                reason: format!("agent {id} has zero metabolism"),
            });
        }
        if wealth <= 0 {
            return Err(AgentError::InvalidEndowment {
                reason: format!("agent {id} would be born dead with wealth {wealth}"),
            });
        }
        Ok(Self {
            id,
            position,
            wealth,
            metabolism,
            sensing_radius,
            disposition,
        })
    }

    /// Draw a newborn forager's endowment from `config`.
    ///
    /// Draw order is wealth, metabolism, sensing radius.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidEndowment`] if any range in `config`
    /// is empty or would produce an invalid forager.
    pub fn spawn<R: Rng + ?Sized>(
        id: AgentId,
        position: Position,
        disposition: Disposition,
        config: &EndowmentConfig,
        rng: &mut R,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let wealth = rng.random_range(config.wealth_min..config.wealth_max);
        let metabolism = rng.random_range(config.metabolism_min..config.metabolism_max);
        let sensing_radius = rng.random_range(config.sensing_min..config.sensing_max);
        Self::new(id, position, wealth, metabolism, sensing_radius, disposition)
    }

    /// The agent's identity.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current cell.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Accumulated resource.
    pub const fn wealth(&self) -> i64 {
        self.wealth
    }

    /// Resource burned per activation.
    pub const fn metabolism(&self) -> u32 {
        self.metabolism
    }

    /// How far the agent can see.
    pub const fn sensing_radius(&self) -> u32 {
        self.sensing_radius
    }

    /// Solidarity role.
    pub const fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Sensing bucket for death accounting.
    pub const fn sensing_bucket(&self, threshold: u32) -> SensingBucket {
        SensingBucket::classify(self.sensing_radius, threshold)
    }

    /// A forager is alive while its wealth is positive.
    pub const fn is_alive(&self) -> bool {
        self.wealth > 0
    }

    /// Read-only attributes for renderers and reports.
    pub const fn view(&self) -> ForagerView {
        let (cooperative, individualist) = ForagerView::flags(self.disposition);
        ForagerView {
            id: self.id,
            position: self.position,
            wealth: self.wealth,
            metabolism: self.metabolism,
            sensing_radius: self.sensing_radius,
            cooperative,
            individualist,
        }
    }

    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Apply a signed wealth change.
    pub(crate) fn adjust_wealth(&mut self, delta: i64) -> Result<i64, AgentError> {
        self.wealth = self
            .wealth
            .checked_add(delta)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("wealth of agent {} adjusted by {delta}", self.id),
            })?;
        Ok(self.wealth)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn spawn_draws_within_ranges() {
        let config = EndowmentConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for n in 0..200 {
            let forager = Forager::spawn(
                AgentId(n),
                Position::new(0, 0),
                Disposition::Independent,
                &config,
                &mut rng,
            )
            .unwrap();
            assert!((6..25).contains(&forager.wealth()));
            assert!((2..4).contains(&forager.metabolism()));
            assert!((1..6).contains(&forager.sensing_radius()));
            assert!(forager.is_alive());
        }
    }

    #[test]
    fn spawn_rejects_invalid_ranges() {
        let config = EndowmentConfig {
            wealth_min: 10,
            wealth_max: 10,
            ..EndowmentConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Forager::spawn(
            AgentId(0),
            Position::new(0, 0),
            Disposition::Solidary,
            &config,
            &mut rng,
        );
        assert!(matches!(result, Err(AgentError::InvalidEndowment { .. })));
    }

    #[test]
    fn zero_metabolism_is_rejected() {
        let result = Forager::new(
            AgentId(1),
            Position::new(0, 0),
            5,
            0,
            1,
            Disposition::Independent,
        );
        assert!(result.is_err());
    }

    #[test]
    fn view_exposes_flags() {
        let forager = Forager::new(
            AgentId(3),
            Position::new(2, 1),
            12,
            2,
            4,
            Disposition::Individualist,
        )
        .unwrap();
        let view = forager.view();
        assert_eq!(view.position, Position::new(2, 1));
        assert_eq!(view.wealth, 12);
        assert!(!view.cooperative);
        assert!(view.individualist);
        assert_eq!(forager.sensing_bucket(3), SensingBucket::High);
        assert_eq!(forager.sensing_bucket(5), SensingBucket::Low);
    }

    #[test]
    fn wealth_overflow_is_reported() {
        let mut forager = Forager::new(
            AgentId(4),
            Position::new(0, 0),
            i64::MAX,
            1,
            1,
            Disposition::Independent,
        )
        .unwrap();
        assert!(forager.adjust_wealth(1).is_err());
        assert_eq!(forager.wealth(), i64::MAX);
        assert_eq!(forager.adjust_wealth(-i64::MAX).unwrap(), 0);
        assert!(!forager.is_alive());
    }
}
