//! Interface to the host world
//!
//! Everything the door system needs from the game: cell storage, collision
//! refresh, deferred updates, neighbour notification, redstone-like power and
//! sound playback. The host owns the tick loop and calls back into
//! `DoorSystem`; the door system never holds on to the world between calls.

use crate::physics::AABB;
use crate::world::core::{BlockFace, BlockState, VoxelPos};

/// Services consumed from the host world
pub trait HostWorld {
    /// Block and metadata stored in a cell
    fn block(&self, pos: VoxelPos) -> BlockState;

    /// Overwrite a cell
    fn set_block(&mut self, pos: VoxelPos, state: BlockState);

    /// Clear a cell
    fn set_air(&mut self, pos: VoxelPos) {
        self.set_block(pos, BlockState::AIR);
    }

    /// Whether a placement may overwrite this cell
    fn is_replaceable(&self, pos: VoxelPos) -> bool {
        self.block(pos).is_air()
    }

    /// Whether the block at `pos` presents a solid `face`
    fn is_side_solid(&self, pos: VoxelPos, face: BlockFace) -> bool;

    /// Whether the cell receives a power signal from its neighbours
    fn receives_power(&self, pos: VoxelPos) -> bool;

    /// Recompute entity collision over a world-space region
    fn recompute_collision(&mut self, region: AABB);

    /// Ask for a deferred block update at `pos` in `delay_ticks` ticks
    fn schedule_update(&mut self, pos: VoxelPos, delay_ticks: u32);

    /// Tell the neighbours of `pos` that it changed
    fn notify_neighbors(&mut self, pos: VoxelPos);

    /// Play a named sound at `pos`
    fn play_sound(&mut self, pos: VoxelPos, sound: &str);
}
