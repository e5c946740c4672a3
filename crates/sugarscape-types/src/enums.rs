//! Enumeration types for the Sugarscape simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Category of simulation entity, scheduled as a group.
///
/// Breeds are stepped in declaration order each tick: patches regrow
/// before foragers move, so agents always see this tick's growback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breed {
    /// Regrowing resource patches, one per cell.
    Patch,
    /// Mobile foraging agents.
    Forager,
}

impl Breed {
    /// All breeds in scheduling order.
    pub const ORDER: [Self; 2] = [Self::Patch, Self::Forager];
}

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

/// Neighbourhood shape used when enumerating cells around a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Cells within Manhattan distance `radius` (the four-way cross).
    #[default]
    VonNeumann,
    /// Cells within Chebyshev distance `radius` (the full square).
    Moore,
}

// ---------------------------------------------------------------------------
// Foraging policy
// ---------------------------------------------------------------------------

/// Target-selection policy applied by every forager in a World.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Greedy: richest visible cell, nearest first, then random.
    #[default]
    Direct,
    /// Step toward the best cell known to the shared knowledge store.
    KnowledgeGuided,
}

/// Which aggregate the shared knowledge store ranks cells by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeStrategy {
    /// Exponentially decayed recent observation per cell.
    #[default]
    RecentMax,
    /// Highest observation ever published per cell.
    AllTimeMax,
}

// ---------------------------------------------------------------------------
// Dispositions and death buckets
// ---------------------------------------------------------------------------

/// An agent's stance toward the redistribution pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Solidarity is enabled and the agent takes part in it.
    Solidary,
    /// Solidarity is enabled but the agent opted out.
    Individualist,
    /// Solidarity is disabled world-wide.
    Independent,
}

impl Disposition {
    /// Whether the agent contributes to and draws from the pool.
    pub const fn is_cooperative(self) -> bool {
        matches!(self, Self::Solidary)
    }

    /// Whether the agent is an individualist.
    pub const fn is_individualist(self) -> bool {
        matches!(self, Self::Individualist)
    }
}

impl core::fmt::Display for Disposition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Solidary => write!(f, "solidary"),
            Self::Individualist => write!(f, "individualist"),
            Self::Independent => write!(f, "independent"),
        }
    }
}

/// Sensing-radius death bucket, split at a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensingBucket {
    /// Radius strictly below the threshold.
    Low,
    /// Radius at or above the threshold.
    High,
}

impl SensingBucket {
    /// Classify a sensing radius against `threshold`.
    pub const fn classify(sensing_radius: u32, threshold: u32) -> Self {
        if sensing_radius < threshold {
            Self::Low
        } else {
            Self::High
        }
    }
}

impl core::fmt::Display for SensingBucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Low => write!(f, "low_sensing"),
            Self::High => write!(f, "high_sensing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breed_order_puts_patches_first() {
        assert_eq!(Breed::ORDER, [Breed::Patch, Breed::Forager]);
    }

    #[test]
    fn sensing_bucket_threshold_is_exclusive_low() {
        assert_eq!(SensingBucket::classify(2, 3), SensingBucket::Low);
        assert_eq!(SensingBucket::classify(3, 3), SensingBucket::High);
        assert_eq!(SensingBucket::classify(0, 3), SensingBucket::Low);
    }

    #[test]
    fn only_solidary_agents_cooperate() {
        assert!(Disposition::Solidary.is_cooperative());
        assert!(!Disposition::Individualist.is_cooperative());
        assert!(!Disposition::Independent.is_cooperative());
        assert!(Disposition::Individualist.is_individualist());
    }

    #[test]
    fn strategy_names_are_snake_case() {
        let json = serde_json::to_string(&KnowledgeStrategy::AllTimeMax).unwrap_or_default();
        assert_eq!(json, "\"all_time_max\"");
    }
}
