//! Type-safe identifiers for simulation entities.
//!
//! Agents receive a monotonically increasing integer identity from the
//! [`IdAllocator`] owned by their World. Identities are never reused: a
//! starved agent's number stays retired for the rest of the run.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a forager agent within one World.
    AgentId
}

/// Arena-style issuer of [`AgentId`] values.
///
/// Each World owns exactly one allocator, so identities are scoped to a run
/// and two Worlds built from the same seed issue the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator whose first issued identity is `0`.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// The identity [`issue`](Self::issue) would hand out next, without
    /// consuming it.
    pub fn peek(&self) -> Option<AgentId> {
        self.next.checked_add(1).map(|_| AgentId(self.next))
    }

    /// Issue the next identity, or `None` once the `u64` space is exhausted.
    pub fn issue(&mut self) -> Option<AgentId> {
        let id = AgentId(self.next);
        self.next = self.next.checked_add(1)?;
        Some(id)
    }
}
