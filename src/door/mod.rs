//! Door instances and the system driving them
//!
//! `door_data` holds the per-instance state, `door_operations` the state
//! machine over it, and `DoorSystem` ties instances to the host world.

pub mod door_data;
pub mod door_operations;
pub mod door_system;
mod placement;

pub use door_data::{DoorInstance, DoorState, ItemStack, PlacementError, PlacementResult, TickTimer};
pub use door_operations::{
    auto_close_due, begin_transition, completion_sound, create_door_instance, door_metadata, door_movement,
    is_operable, metadata_direction, metadata_is_top, powered_target, requires_external_trigger,
    settle_transition, toggle_target,
};
pub use door_system::DoorSystem;
