//! Multi-block group data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in group_operations.rs

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::physics::AABB;
use crate::world::{Direction, VoxelPos};

/// Index of a group in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Cell extent of a group relative to its origin, before rotation.
/// `max` is exclusive. Unrotated groups grow toward +z (south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupExtent {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

/// One logical structure spread over several cells
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBlockGroup {
    pub id: GroupId,
    /// Cell holding the structure's instance
    pub origin: VoxelPos,
    pub direction: Direction,
    pub extent: GroupExtent,
    /// Every claimed cell, origin included
    pub cells: Vec<VoxelPos>,
    /// World-space bounds of all cells
    pub bounds: AABB,
}

/// Claims index shared by every group in a world
#[derive(Debug, Default)]
pub struct MultiBlockRegistryData {
    pub groups: FxHashMap<GroupId, MultiBlockGroup>,
    /// Position to owning group, one entry per claimed cell
    pub claims: FxHashMap<VoxelPos, GroupId>,
    pub next_id: u32,
}
