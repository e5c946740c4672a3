//! Core data structs shared across the workspace.
//!
//! [`MetricsSnapshot`] is the only contract with external reporters, and
//! [`ForagerView`] the only contract with external renderers. Both are
//! plain, serializable values with no behaviour.

use serde::{Deserialize, Serialize};

use crate::enums::Disposition;
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

/// A cell coordinate on the grid. `0 <= x < width`, `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Absolute per-axis offset between two positions.
    pub const fn offset_to(self, other: Self) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for Position {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// A non-owning reference to something living in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "breed", content = "handle", rename_all = "snake_case")]
pub enum EntityRef {
    /// The resource patch rooted at this position.
    Patch(Position),
    /// A forager agent, by identity.
    Forager(AgentId),
}

// ---------------------------------------------------------------------------
// Renderer view
// ---------------------------------------------------------------------------

/// Read-only visual attributes of a living forager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForagerView {
    /// The agent's identity.
    pub id: AgentId,
    /// Current cell.
    pub position: Position,
    /// Accumulated resource.
    pub wealth: i64,
    /// Resource burned per tick.
    pub metabolism: u32,
    /// How far the agent can see.
    pub sensing_radius: u32,
    /// Whether the agent takes part in solidarity.
    pub cooperative: bool,
    /// Whether the agent opted out of solidarity.
    pub individualist: bool,
}

impl ForagerView {
    /// Derive the two boolean flags from a disposition.
    pub const fn flags(disposition: Disposition) -> (bool, bool) {
        (disposition.is_cooperative(), disposition.is_individualist())
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Wealth statistics over the currently living foragers.
///
/// With no living agents every field is zero. Standard deviation is the
/// population form, so a single agent reports `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WealthStats {
    /// Number of agents the statistics were computed over.
    pub count: u64,
    /// Smallest wealth.
    pub min: i64,
    /// Largest wealth.
    pub max: i64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stdev: f64,
}

/// Aggregate metrics emitted once per tick for external reporters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Tick the snapshot was taken after (0 = initial state).
    pub tick: u64,
    /// Living foragers.
    pub living_agents: u64,
    /// Cumulative deaths.
    pub deaths: u64,
    /// Cumulative deaths with sensing radius below the threshold.
    pub deaths_low_sensing: u64,
    /// Cumulative deaths with sensing radius at or above the threshold.
    pub deaths_high_sensing: u64,
    /// Cumulative deaths of solidary agents.
    pub deaths_solidary: u64,
    /// Cumulative deaths of individualists.
    pub deaths_individualist: u64,
    /// Cumulative deaths while solidarity was disabled.
    pub deaths_independent: u64,
    /// `deaths / (deaths + living_agents)`, or 0 when both are 0.
    pub death_rate: f64,
    /// Share of deaths in the low-sensing bucket.
    pub death_rate_low_sensing: f64,
    /// Share of deaths in the high-sensing bucket.
    pub death_rate_high_sensing: f64,
    /// Share of deaths that were individualists.
    pub death_rate_individualist: f64,
    /// Wealth statistics over living foragers.
    pub wealth: WealthStats,
    /// Resource currently held by the redistribution pool.
    pub pool_balance: u64,
    /// Total resource standing on all patches.
    pub standing_resource: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_symmetric() {
        let a = Position::new(1, 7);
        let b = Position::new(4, 2);
        assert_eq!(a.offset_to(b), (3, 5));
        assert_eq!(b.offset_to(a), (3, 5));
    }

    #[test]
    fn entity_ref_is_tagged_by_breed() {
        let json = serde_json::to_string(&EntityRef::Forager(AgentId(3))).unwrap_or_default();
        assert_eq!(json, r#"{"breed":"forager","handle":3}"#);
    }

    #[test]
    fn empty_snapshot_has_zero_statistics() {
        let snap = MetricsSnapshot::default();
        assert_eq!(snap.wealth.count, 0);
        assert_eq!(snap.living_agents, 0);
    }

    #[test]
    fn view_flags_follow_disposition() {
        assert_eq!(ForagerView::flags(Disposition::Solidary), (true, false));
        assert_eq!(ForagerView::flags(Disposition::Individualist), (false, true));
        assert_eq!(ForagerView::flags(Disposition::Independent), (false, false));
    }
}
