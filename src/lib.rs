// Hearth Doors - movable blocks for voxel worlds
//
// Data-oriented layout, as in the rest of Hearth:
// - *_data modules hold plain data
// - *_operations modules hold pure functions over that data
// - DoorSystem owns the instances and applies side effects through HostWorld

pub mod animation;
pub mod constants;
pub mod descriptor;
pub mod door;
pub mod error;
pub mod movement;
pub mod multiblock;
pub mod persistence;
pub mod physics;
pub mod world;

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use animation::{AnimationTimeline, PartPoseUniform, Transformation};
pub use descriptor::{DescriptorDef, DoorDescriptor, Material, SoundProfile};
pub use door::{DoorInstance, DoorState, DoorSystem, ItemStack, PlacementError};
pub use error::{DoorError, DoorResult, ErrorContext, OptionExt};
pub use movement::{DoorMovement, MovementContext, StructureKind};
pub use multiblock::{GroupId, MultiBlockGroup};
pub use persistence::{DoorRecord, DoorSnapshot, PersistenceError, SnapshotFormat};
pub use physics::{BoundingBoxType, AABB};
pub use world::{BlockFace, BlockId, BlockState, Direction, HostWorld, MemoryWorld, VoxelPos};

/// Door system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorsConfig {
    /// Ticks each garage segment adds to the door's opening time
    pub garage_segment_ticks: u32,
    pub register_builtin_descriptors: bool,
    /// Extra `[[door]]` definitions loaded at startup
    pub descriptor_file: Option<PathBuf>,
}

impl Default for DoorsConfig {
    fn default() -> Self {
        Self {
            garage_segment_ticks: constants::timing::GARAGE_SEGMENT_TICKS,
            register_builtin_descriptors: true,
            descriptor_file: None,
        }
    }
}

impl DoorsConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = anyhow::Context::context(toml::from_str::<Self>(text), "DoorsConfig: invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.garage_segment_ticks == 0 {
            return Err(anyhow::anyhow!("DoorsConfig: garage_segment_ticks cannot be 0"));
        }

        if self.garage_segment_ticks > constants::timing::MAX_CONFIGURED_TICKS {
            return Err(anyhow::anyhow!(
                "DoorsConfig: garage_segment_ticks {} exceeds maximum of {}",
                self.garage_segment_ticks,
                constants::timing::MAX_CONFIGURED_TICKS
            ));
        }

        if let Some(path) = &self.descriptor_file {
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "DoorsConfig: descriptor_file {} does not exist",
                    path.display()
                ));
            }
        }

        log::info!(
            "[DoorsConfig] Validation: garage_segment_ticks={}, builtin_descriptors={}, descriptor_file={:?}",
            self.garage_segment_ticks,
            self.register_builtin_descriptors,
            self.descriptor_file
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DoorsConfig::default();
        assert_eq!(config.garage_segment_ticks, 10);
        assert!(config.register_builtin_descriptors);
        config.validate().expect("defaults validate");
    }

    #[test]
    fn test_config_from_toml() {
        let config = DoorsConfig::from_toml_str("garage_segment_ticks = 4\n").expect("valid config");
        assert_eq!(config.garage_segment_ticks, 4);
        assert!(config.register_builtin_descriptors);
        assert_eq!(config.descriptor_file, None);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(DoorsConfig::from_toml_str("garage_segment_ticks = 0").is_err());
        assert!(DoorsConfig::from_toml_str("garage_segment_ticks = 999999").is_err());
        assert!(DoorsConfig::from_toml_str("descriptor_file = \"/nonexistent/doors.toml\"").is_err());
        assert!(DoorsConfig::from_toml_str("garage_segment_ticks = \"ten\"").is_err());
    }

    #[test]
    fn test_descriptor_file_is_loaded_at_startup() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("doors.toml");
        std::fs::write(
            &path,
            r#"
                [[door]]
                name = "barn_door"
                movement = "sliding"
                opening_time = 12
            "#,
        )
        .expect("write descriptor file");

        let config = DoorsConfig {
            descriptor_file: Some(path),
            ..DoorsConfig::default()
        };
        let system = DoorSystem::new(config).expect("system starts");
        let barn = system.descriptor("barn_door").expect("loaded from file");
        assert_eq!(barn.opening_time, 12);
        assert!(system.descriptor("wood_door").is_some());
    }
}
