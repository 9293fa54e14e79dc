//! World module - the host-facing side of the door system
//!
//! Core cell types, the `HostWorld` interface the game implements, and an
//! in-memory world used by tests.

pub mod core;
pub mod interfaces;
pub mod memory_world;

pub use self::core::{BlockFace, BlockId, BlockState, Direction, VoxelPos};
pub use interfaces::HostWorld;
pub use memory_world::MemoryWorld;
