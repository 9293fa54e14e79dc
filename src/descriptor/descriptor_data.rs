//! Door descriptor data - Pure DOP
//!
//! Immutable per-block-type configuration shared by every placed instance.
//! Descriptors are only built by the registry, which resolves the movement
//! and sound references once.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::timing::DEFAULT_OPENING_TIME;
use crate::movement::DoorMovement;
use crate::world::BlockId;

/// Material class of a door block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Wood,
    Iron,
    Glass,
    Stone,
}

/// Sounds played when a transition completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundProfile {
    pub name: String,
    /// Played once the door settles open
    pub opened: Option<String>,
    /// Played once the door settles closed
    pub closed: Option<String>,
}

/// Immutable configuration for one door block type
pub struct DoorDescriptor {
    pub id: BlockId,
    pub name: String,
    pub material: Material,
    pub hardness: f32,
    /// Ticks an open or close transition lasts
    pub opening_time: u32,
    /// Ticks an opened door stays open before closing itself, 0 disables
    pub auto_close_time: u32,
    /// Only a power signal moves the door
    pub requires_external_trigger: bool,
    /// Adjacent leaves with mirrored hinges open together
    pub double_door: bool,
    pub movement: Option<Arc<dyn DoorMovement>>,
    pub sound: Option<Arc<SoundProfile>>,
}

impl fmt::Debug for DoorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoorDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("material", &self.material)
            .field("hardness", &self.hardness)
            .field("opening_time", &self.opening_time)
            .field("auto_close_time", &self.auto_close_time)
            .field("requires_external_trigger", &self.requires_external_trigger)
            .field("double_door", &self.double_door)
            .field("movement", &self.movement.as_ref().map(|m| m.name()))
            .field("sound", &self.sound.as_ref().map(|s| s.name.as_str()))
            .finish()
    }
}

/// Serializable description of a door type, as written in descriptor files.
/// Movement and sound are referenced by name and resolved at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDef {
    pub name: String,
    #[serde(default)]
    pub material: Material,
    #[serde(default = "default_hardness")]
    pub hardness: f32,
    #[serde(default = "default_opening_time")]
    pub opening_time: u32,
    #[serde(default)]
    pub auto_close_time: u32,
    #[serde(default)]
    pub requires_external_trigger: bool,
    #[serde(default)]
    pub double_door: bool,
    pub movement: String,
    #[serde(default = "default_sound")]
    pub sound: String,
}

/// Top-level layout of a descriptor TOML file (`[[door]]` tables)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorFile {
    #[serde(default)]
    pub door: Vec<DescriptorDef>,
}

fn default_hardness() -> f32 {
    3.0
}

fn default_opening_time() -> u32 {
    DEFAULT_OPENING_TIME
}

fn default_sound() -> String {
    "wood".to_string()
}
