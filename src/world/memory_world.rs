//! In-memory host world
//!
//! A small `HostWorld` backed by a hash map. It records every side effect the
//! door system asks for, which makes it the world used throughout the tests
//! and a reference for hosts wiring their own storage.

use rustc_hash::{FxHashMap, FxHashSet};

use super::core::{BlockFace, BlockId, BlockState, VoxelPos};
use super::interfaces::HostWorld;
use crate::physics::AABB;

/// Hash map backed world that records requested side effects
#[derive(Debug, Default)]
pub struct MemoryWorld {
    cells: FxHashMap<VoxelPos, BlockState>,
    /// Block types that never present a solid face (doors, hatches, ...)
    non_solid: FxHashSet<BlockId>,
    powered: FxHashSet<VoxelPos>,
    pub collision_updates: Vec<AABB>,
    pub scheduled_updates: Vec<(VoxelPos, u32)>,
    pub notified: Vec<VoxelPos>,
    pub sounds: Vec<(VoxelPos, String)>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World with a stone floor covering `-radius..=radius` on x and z at `y`
    pub fn with_floor(y: i32, radius: i32) -> Self {
        let mut world = Self::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                world.set_block(VoxelPos::new(x, y, z), BlockState::new(BlockId::STONE, 0));
            }
        }
        world
    }

    /// Mark a block type as never solid
    pub fn mark_non_solid(&mut self, id: BlockId) {
        self.non_solid.insert(id);
    }

    pub fn set_powered(&mut self, pos: VoxelPos, powered: bool) {
        if powered {
            self.powered.insert(pos);
        } else {
            self.powered.remove(&pos);
        }
    }

    /// Number of times `sound` was played anywhere
    pub fn sound_count(&self, sound: &str) -> usize {
        self.sounds.iter().filter(|(_, s)| s == sound).count()
    }

    /// Number of non-air cells
    pub fn block_count(&self) -> usize {
        self.cells.len()
    }

    pub fn clear_events(&mut self) {
        self.collision_updates.clear();
        self.scheduled_updates.clear();
        self.notified.clear();
        self.sounds.clear();
    }
}

impl HostWorld for MemoryWorld {
    fn block(&self, pos: VoxelPos) -> BlockState {
        self.cells.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn set_block(&mut self, pos: VoxelPos, state: BlockState) {
        if state.is_air() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, state);
        }
    }

    fn is_side_solid(&self, pos: VoxelPos, _face: BlockFace) -> bool {
        let state = self.block(pos);
        !state.is_air() && !self.non_solid.contains(&state.id)
    }

    fn receives_power(&self, pos: VoxelPos) -> bool {
        self.powered.contains(&pos)
    }

    fn recompute_collision(&mut self, region: AABB) {
        self.collision_updates.push(region);
    }

    fn schedule_update(&mut self, pos: VoxelPos, delay_ticks: u32) {
        self.scheduled_updates.push((pos, delay_ticks));
    }

    fn notify_neighbors(&mut self, pos: VoxelPos) {
        self.notified.push(pos);
    }

    fn play_sound(&mut self, pos: VoxelPos, sound: &str) {
        self.sounds.push((pos, sound.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_cells_are_not_stored() {
        let mut world = MemoryWorld::new();
        let pos = VoxelPos::new(1, 2, 3);
        world.set_block(pos, BlockState::new(BlockId::STONE, 0));
        assert_eq!(world.block_count(), 1);
        world.set_air(pos);
        assert_eq!(world.block_count(), 0);
        assert!(world.block(pos).is_air());
    }

    #[test]
    fn test_non_solid_blocks() {
        let mut world = MemoryWorld::with_floor(0, 1);
        let door = BlockId::new(BlockId::FIRST_DOOR_ID);
        world.mark_non_solid(door);
        world.set_block(VoxelPos::new(0, 1, 0), BlockState::new(door, 0));
        assert!(world.is_side_solid(VoxelPos::new(0, 0, 0), BlockFace::Up));
        assert!(!world.is_side_solid(VoxelPos::new(0, 1, 0), BlockFace::Up));
        assert!(!world.is_side_solid(VoxelPos::new(0, 2, 0), BlockFace::Up));
    }
}
