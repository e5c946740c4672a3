//! Endowment distributions and per-activation foraging rules.
//!
//! [`EndowmentConfig`] describes the uniform ranges a newborn forager's
//! attributes are drawn from. [`ForagingRules`] bundles the tunables the
//! step transition reads every activation. The simulation core builds both
//! from `sugarscape-config.yaml` and hands them to this crate.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Uniform ranges for a newborn forager's attributes.
///
/// Every range is half-open: `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndowmentConfig {
    /// Lowest starting wealth (default: 6).
    pub wealth_min: i64,
    /// One past the highest starting wealth (default: 25).
    pub wealth_max: i64,
    /// Lowest metabolism (default: 2).
    pub metabolism_min: u32,
    /// One past the highest metabolism (default: 4).
    pub metabolism_max: u32,
    /// Lowest sensing radius (default: 1).
    pub sensing_min: u32,
    /// One past the highest sensing radius (default: 6).
    pub sensing_max: u32,
}

impl Default for EndowmentConfig {
    fn default() -> Self {
        Self {
            wealth_min: 6,
            wealth_max: 25,
            metabolism_min: 2,
            metabolism_max: 4,
            sensing_min: 1,
            sensing_max: 6,
        }
    }
}

impl EndowmentConfig {
    /// Check that every range is non-empty and can only produce a living
    /// forager with a positive metabolism.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidEndowment`] naming the first bad range.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.wealth_min < 1 || self.wealth_min >= self.wealth_max {
            return Err(AgentError::InvalidEndowment {
                reason: format!(
                    "wealth range {}..{} must be non-empty and start at 1 or more",
                    self.wealth_min, self.wealth_max
                ),
            });
        }
        if self.metabolism_min < 1 || self.metabolism_min >= self.metabolism_max {
            return Err(AgentError::InvalidEndowment {
                reason: format!(
                    "metabolism range {}..{} must be non-empty and start at 1 or more",
                    self.metabolism_min, self.metabolism_max
                ),
            });
        }
        if self.sensing_min >= self.sensing_max {
            return Err(AgentError::InvalidEndowment {
                reason: format!(
                    "sensing range {}..{} must be non-empty",
                    self.sensing_min, self.sensing_max
                ),
            });
        }
        Ok(())
    }
}

/// Tunables read by every forager activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForagingRules {
    /// Whether cooperative foragers settle through the redistribution pool.
    pub solidarity: bool,

    /// A cooperative forager only contributes once its wealth exceeds
    /// `reserve_multiplier * metabolism` (default: 3).
    pub reserve_multiplier: u32,

    /// Sensing radii below this are classified as low for death
    /// accounting (default: 3).
    pub low_sensing_threshold: u32,
}

impl Default for ForagingRules {
    fn default() -> Self {
        Self {
            solidarity: false,
            reserve_multiplier: 3,
            low_sensing_threshold: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EndowmentConfig::default().validate().is_ok());
        let rules = ForagingRules::default();
        assert_eq!(rules.reserve_multiplier, 3);
        assert_eq!(rules.low_sensing_threshold, 3);
        assert!(!rules.solidarity);
    }

    #[test]
    fn empty_ranges_are_rejected() {
        let mut config = EndowmentConfig {
            metabolism_max: 2,
            ..EndowmentConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AgentError::InvalidEndowment { .. })
        ));

        config = EndowmentConfig {
            wealth_min: 0,
            ..EndowmentConfig::default()
        };
        assert!(config.validate().is_err());

        config = EndowmentConfig {
            sensing_min: 6,
            sensing_max: 6,
            ..EndowmentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sensing_radius_is_allowed() {
        let config = EndowmentConfig {
            sensing_min: 0,
            sensing_max: 1,
            ..EndowmentConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
