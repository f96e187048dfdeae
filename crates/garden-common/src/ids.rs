//! ID types for plants and branches.

use serde::{Deserialize, Serialize};

/// Stable identifier of a branch within one plant's stem tree.
///
/// Assigned from a per-stem counter at creation time, so it survives cloning
/// and can key side tables such as flower state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BranchId(u32);

impl BranchId {
    /// The main stem of every plant.
    pub const ROOT: Self = Self(0);

    /// Creates a branch ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the ID following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Checks if this is the main stem.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// Identifier of a plant within a garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlantId(u64);

impl PlantId {
    /// Null/invalid plant ID.
    pub const NULL: Self = Self(0);

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid (non-null) plant ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Monotonic allocator for [`PlantId`]s. Starts after [`PlantId::NULL`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantIdAllocator {
    next: u64,
}

impl Default for PlantIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl PlantIdAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next unused ID.
    pub fn allocate(&mut self) -> PlantId {
        let id = PlantId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_id_sequence() {
        let root = BranchId::ROOT;
        assert!(root.is_root());
        assert_eq!(root.next(), BranchId::new(1));
        assert!(!root.next().is_root());
    }

    #[test]
    fn test_plant_id_allocation() {
        let mut ids = PlantIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(a.is_valid());
        assert_ne!(a, b);
        assert!(!PlantId::NULL.is_valid());
    }
}
