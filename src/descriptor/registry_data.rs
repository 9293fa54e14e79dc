//! Descriptor Registry Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in registry_operations.rs

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::descriptor_data::{DoorDescriptor, SoundProfile};
use crate::movement::DoorMovement;
use crate::world::BlockId;

/// Descriptor registration data
#[derive(Debug, Clone)]
pub struct DescriptorRegistration {
    pub id: BlockId,
    pub name: String,
}

/// Registry data that owns every door type for the lifetime of the game
pub struct DescriptorRegistryData {
    /// Map from BlockId to descriptor
    pub descriptors: FxHashMap<BlockId, Arc<DoorDescriptor>>,
    /// Map from name to BlockId
    pub name_to_id: FxHashMap<String, BlockId>,
    /// All registered descriptors, in registration order
    pub registrations: Vec<DescriptorRegistration>,
    /// Movement strategies by name
    pub movements: FxHashMap<String, Arc<dyn DoorMovement>>,
    /// Sound profiles by name
    pub sounds: FxHashMap<String, Arc<SoundProfile>>,
    pub next_id: u16,
}
