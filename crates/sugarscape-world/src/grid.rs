//! The bounded resource grid.
//!
//! [`ResourceGrid`] is the spatial container of the simulation: a
//! `width x height` array of cells, each holding exactly one
//! [`ResourcePatch`] and at most one forager. The grid holds agents by
//! identity only; ownership of agent state lives with the scheduler.
//!
//! The grid is not toroidal. Neighbourhood queries are clipped at the
//! edges, and any position outside the extent is an
//! [`WorldError::OutOfBounds`] error.

use sugarscape_types::{AgentId, Connectivity, EntityRef, Position};
use tracing::debug;

use crate::capacity::CapacityMap;
use crate::error::WorldError;
use crate::patch::ResourcePatch;

/// Spatial container of patches and agent occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGrid {
    width: u32,
    height: u32,
    connectivity: Connectivity,
    /// One patch per cell, indexed `x * height + y`.
    patches: Vec<ResourcePatch>,
    /// Occupying agent per cell, same indexing as `patches`.
    occupants: Vec<Option<AgentId>>,
    occupied: usize,
}

impl ResourceGrid {
    /// Create a grid from a capacity map. Every patch starts full.
    pub fn new(capacity: &CapacityMap, connectivity: Connectivity) -> Self {
        let width = capacity.width();
        let height = capacity.height();
        let mut patches = Vec::new();
        for x in 0..width {
            for y in 0..height {
                let pos = Position::new(x, y);
                patches.push(ResourcePatch::full(pos, capacity.get(pos).unwrap_or(0)));
            }
        }
        let occupants = vec![None; patches.len()];
        debug!(width, height, ?connectivity, "Resource grid created");
        Self {
            width,
            height,
            connectivity,
            patches,
            occupants,
            occupied: 0,
        }
    }

    // -------------------------------------------------------------------
    // Extent
    // -------------------------------------------------------------------

    /// Grid width (`x` extent).
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (`y` extent).
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Neighbourhood shape used by [`neighborhood`](Self::neighborhood).
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.patches.len()
    }

    /// Number of cells currently holding an agent.
    pub const fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Whether `pos` lies inside the grid.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Result<usize, WorldError> {
        if !self.contains(pos) {
            return Err(WorldError::OutOfBounds {
                position: pos,
                width: self.width,
                height: self.height,
            });
        }
        let idx = u64::from(pos.x)
            .checked_mul(u64::from(self.height))
            .and_then(|v| v.checked_add(u64::from(pos.y)))
            .ok_or(WorldError::ArithmeticOverflow)?;
        usize::try_from(idx).map_err(|_err| WorldError::ArithmeticOverflow)
    }

    // -------------------------------------------------------------------
    // Patches
    // -------------------------------------------------------------------

    /// The patch rooted at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn patch(&self, pos: Position) -> Result<&ResourcePatch, WorldError> {
        let idx = self.index(pos)?;
        self.patches.get(idx).ok_or(WorldError::ArithmeticOverflow)
    }

    /// Mutable access to the patch rooted at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn patch_mut(&mut self, pos: Position) -> Result<&mut ResourcePatch, WorldError> {
        let idx = self.index(pos)?;
        self.patches.get_mut(idx).ok_or(WorldError::ArithmeticOverflow)
    }

    /// Resource currently standing at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn resource_at(&self, pos: Position) -> Result<u32, WorldError> {
        self.patch(pos).map(ResourcePatch::amount)
    }

    /// Iterate over all patches in cell order.
    pub fn patches(&self) -> impl Iterator<Item = &ResourcePatch> {
        self.patches.iter()
    }

    /// Positions of every patch, in cell order.
    pub fn patch_positions(&self) -> Vec<Position> {
        self.patches.iter().map(ResourcePatch::position).collect()
    }

    /// Total resource standing on all patches.
    pub fn standing_resource(&self) -> u64 {
        self.patches
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(u64::from(p.amount())))
    }

    // -------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------

    /// The agent at `pos`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn occupant(&self, pos: Position) -> Result<Option<AgentId>, WorldError> {
        let idx = self.index(pos)?;
        Ok(self.occupants.get(idx).copied().flatten())
    }

    /// Whether an agent currently resides at `pos`. A bare patch does not
    /// count as occupied.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn is_occupied(&self, pos: Position) -> Result<bool, WorldError> {
        self.occupant(pos).map(|o| o.is_some())
    }

    /// Everything living in the cell at `pos`: always its patch, plus the
    /// occupying agent if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid.
    pub fn contents(&self, pos: Position) -> Result<Vec<EntityRef>, WorldError> {
        let mut contents = vec![EntityRef::Patch(pos)];
        if let Some(agent) = self.occupant(pos)? {
            contents.push(EntityRef::Forager(agent));
        }
        Ok(contents)
    }

    /// Place `agent` on the empty cell `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid, or
    /// [`WorldError::CellOccupied`] if another agent is already there.
    pub fn place(&mut self, agent: AgentId, pos: Position) -> Result<(), WorldError> {
        let idx = self.index(pos)?;
        let slot = self
            .occupants
            .get_mut(idx)
            .ok_or(WorldError::ArithmeticOverflow)?;
        if let Some(occupant) = *slot {
            return Err(WorldError::CellOccupied {
                position: pos,
                occupant,
            });
        }
        *slot = Some(agent);
        self.occupied = self.occupied.saturating_add(1);
        Ok(())
    }

    /// Remove `agent` from `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the grid, or
    /// [`WorldError::AgentNotAtPosition`] if the cell holds someone else.
    pub fn remove(&mut self, agent: AgentId, pos: Position) -> Result<(), WorldError> {
        let idx = self.index(pos)?;
        let slot = self
            .occupants
            .get_mut(idx)
            .ok_or(WorldError::ArithmeticOverflow)?;
        if *slot != Some(agent) {
            return Err(WorldError::AgentNotAtPosition {
                agent,
                position: pos,
            });
        }
        *slot = None;
        self.occupied = self.occupied.saturating_sub(1);
        Ok(())
    }

    /// Relocate `agent` from `from` to `to` in one step.
    ///
    /// Moving onto the agent's own cell is a no-op. Moving onto a cell held
    /// by another agent is a contract breach; callers filter candidates
    /// through [`is_occupied`](Self::is_occupied) first.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`], [`WorldError::AgentNotAtPosition`]
    /// or [`WorldError::CellOccupied`]. On error the grid is unchanged.
    pub fn move_agent(
        &mut self,
        agent: AgentId,
        from: Position,
        to: Position,
    ) -> Result<(), WorldError> {
        if self.occupant(from)? != Some(agent) {
            return Err(WorldError::AgentNotAtPosition {
                agent,
                position: from,
            });
        }
        if from == to {
            return Ok(());
        }
        if let Some(occupant) = self.occupant(to)? {
            return Err(WorldError::CellOccupied {
                position: to,
                occupant,
            });
        }
        self.remove(agent, from)?;
        self.place(agent, to)
    }

    /// Positions with no agent, in cell order.
    pub fn unoccupied_cells(&self) -> Vec<Position> {
        self.patches
            .iter()
            .zip(&self.occupants)
            .filter(|(_, occupant)| occupant.is_none())
            .map(|(patch, _)| patch.position())
            .collect()
    }

    // -------------------------------------------------------------------
    // Neighbourhoods
    // -------------------------------------------------------------------

    /// Cells within `radius` of `pos` under the grid's connectivity,
    /// clipped at the edges, ordered by `x` then `y`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid.
    pub fn neighborhood(
        &self,
        pos: Position,
        radius: u32,
        include_center: bool,
    ) -> Result<Vec<Position>, WorldError> {
        self.index(pos)?;
        let max_x = self.width.saturating_sub(1);
        let max_y = self.height.saturating_sub(1);
        let x_range = pos.x.saturating_sub(radius)..=pos.x.saturating_add(radius).min(max_x);
        let y_lo = pos.y.saturating_sub(radius);
        let y_hi = pos.y.saturating_add(radius).min(max_y);

        let mut cells = Vec::new();
        for x in x_range {
            for y in y_lo..=y_hi {
                let candidate = Position::new(x, y);
                if candidate == pos && !include_center {
                    continue;
                }
                let (dx, dy) = pos.offset_to(candidate);
                let within = match self.connectivity {
                    Connectivity::VonNeumann => dx.saturating_add(dy) <= radius,
                    Connectivity::Moore => dx.max(dy) <= radius,
                };
                if within {
                    cells.push(candidate);
                }
            }
        }
        Ok(cells)
    }

    // -------------------------------------------------------------------
    // Integrity
    // -------------------------------------------------------------------

    /// Verify every patch respects its capacity and the occupancy counter
    /// matches the cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] on the first breach.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for patch in &self.patches {
            patch.check()?;
        }
        let counted = self.occupants.iter().filter(|o| o.is_some()).count();
        if counted != self.occupied {
            return Err(WorldError::InvariantViolation {
                reason: format!(
                    "occupancy counter {} disagrees with {counted} occupied cells",
                    self.occupied
                ),
            });
        }
        Ok(())
    }
}
