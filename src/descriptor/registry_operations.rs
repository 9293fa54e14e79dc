//! Descriptor Registry Operations - Pure DOP Functions
//!
//! Registration resolves movement and sound names exactly once. A descriptor
//! whose movement or sound cannot be resolved is still registered, but inert:
//! the door system treats it as a no-op and logs why.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rustc_hash::FxHashMap;

use super::descriptor_data::{DescriptorDef, DescriptorFile, DoorDescriptor, Material, SoundProfile};
use super::registry_data::{DescriptorRegistration, DescriptorRegistryData};
use crate::constants::timing::{
    CARRIAGE_OPENING_TIME, DEFAULT_OPENING_TIME, HATCH_OPENING_TIME, MAX_CONFIGURED_TICKS,
};
use crate::error::{DoorError, DoorResult};
use crate::movement::{builtin_movements, DoorMovement};
use crate::world::BlockId;

/// Create new registry data with the built-in movements and sound profiles
pub fn create_descriptor_registry() -> DescriptorRegistryData {
    let mut data = DescriptorRegistryData {
        descriptors: FxHashMap::default(),
        name_to_id: FxHashMap::default(),
        registrations: Vec::new(),
        movements: FxHashMap::default(),
        sounds: FxHashMap::default(),
        next_id: BlockId::FIRST_DOOR_ID,
    };

    for movement in builtin_movements() {
        register_movement(&mut data, movement);
    }
    for sound in builtin_sounds() {
        register_sound(&mut data, sound);
    }

    data
}

/// Register (or replace) a movement strategy under its name
pub fn register_movement(data: &mut DescriptorRegistryData, movement: Arc<dyn DoorMovement>) {
    log::debug!("[DescriptorRegistry] Registering movement '{}'", movement.name());
    data.movements.insert(movement.name().to_string(), movement);
}

/// Register (or replace) a sound profile under its name
pub fn register_sound(data: &mut DescriptorRegistryData, sound: SoundProfile) {
    log::debug!("[DescriptorRegistry] Registering sound profile '{}'", sound.name);
    data.sounds.insert(sound.name.clone(), Arc::new(sound));
}

/// Validate a definition without touching the registry
pub fn validate_descriptor_def(def: &DescriptorDef) -> DoorResult<()> {
    if def.name.is_empty() {
        return Err(DoorError::InvalidConfig {
            field: "name".to_string(),
            value: String::new(),
            reason: "descriptor name cannot be empty".to_string(),
        });
    }
    if def.opening_time == 0 || def.opening_time > MAX_CONFIGURED_TICKS {
        return Err(DoorError::InvalidConfig {
            field: format!("{}.opening_time", def.name),
            value: def.opening_time.to_string(),
            reason: format!("must be within 1..={}", MAX_CONFIGURED_TICKS),
        });
    }
    if def.auto_close_time > MAX_CONFIGURED_TICKS {
        return Err(DoorError::InvalidConfig {
            field: format!("{}.auto_close_time", def.name),
            value: def.auto_close_time.to_string(),
            reason: format!("must be at most {}", MAX_CONFIGURED_TICKS),
        });
    }
    if !(def.hardness >= 0.0) {
        return Err(DoorError::InvalidConfig {
            field: format!("{}.hardness", def.name),
            value: def.hardness.to_string(),
            reason: "must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

/// Register a new door type. The returned descriptor is shared by every
/// instance of the type and never changes afterwards.
pub fn register_descriptor(
    data: &mut DescriptorRegistryData,
    def: &DescriptorDef,
) -> DoorResult<Arc<DoorDescriptor>> {
    validate_descriptor_def(def)?;

    if data.name_to_id.contains_key(&def.name) {
        return Err(DoorError::DuplicateDescriptor {
            name: def.name.clone(),
        });
    }

    let movement = data.movements.get(&def.movement).cloned();
    if movement.is_none() {
        log::warn!(
            "[DescriptorRegistry] Descriptor '{}' references unknown movement '{}', doors of this type will be inert",
            def.name,
            def.movement
        );
    }

    let sound = data.sounds.get(&def.sound).cloned();
    if sound.is_none() {
        log::warn!(
            "[DescriptorRegistry] Descriptor '{}' references unknown sound profile '{}', doors of this type will be silent",
            def.name,
            def.sound
        );
    }

    let id = BlockId(data.next_id);
    data.next_id = data.next_id.checked_add(1).ok_or_else(|| DoorError::Internal {
        message: "door block ids exhausted".to_string(),
    })?;

    let descriptor = Arc::new(DoorDescriptor {
        id,
        name: def.name.clone(),
        material: def.material,
        hardness: def.hardness,
        opening_time: def.opening_time,
        auto_close_time: def.auto_close_time,
        requires_external_trigger: def.requires_external_trigger,
        double_door: def.double_door,
        movement,
        sound,
    });

    data.descriptors.insert(id, Arc::clone(&descriptor));
    data.name_to_id.insert(def.name.clone(), id);
    data.registrations.push(DescriptorRegistration {
        id,
        name: def.name.clone(),
    });

    log::info!("Registered door '{}' with ID {}", def.name, id.0);
    Ok(descriptor)
}

/// Get a descriptor by block id
pub fn get_descriptor(data: &DescriptorRegistryData, id: BlockId) -> Option<Arc<DoorDescriptor>> {
    data.descriptors.get(&id).cloned()
}

/// Get a descriptor by name
pub fn get_descriptor_by_name(data: &DescriptorRegistryData, name: &str) -> Option<Arc<DoorDescriptor>> {
    data.name_to_id
        .get(name)
        .and_then(|id| data.descriptors.get(id))
        .cloned()
}

/// Get all registered descriptors
pub fn get_registrations(data: &DescriptorRegistryData) -> &[DescriptorRegistration] {
    &data.registrations
}

/// Check if a block id belongs to a door type
pub fn is_registered(data: &DescriptorRegistryData, id: BlockId) -> bool {
    data.descriptors.contains_key(&id)
}

// ============================================================================
// BUILT-IN CONTENT
// ============================================================================

fn sound(name: &str, opened: Option<&str>, closed: Option<&str>) -> SoundProfile {
    SoundProfile {
        name: name.to_string(),
        opened: opened.map(str::to_string),
        closed: closed.map(str::to_string),
    }
}

/// Sound profiles shipped with the mod
pub fn builtin_sounds() -> Vec<SoundProfile> {
    vec![
        sound("wood", Some("door.wood.open"), Some("door.wood.close")),
        sound("iron", Some("door.iron.open"), Some("door.iron.close")),
        sound("jail", Some("door.jail.open"), Some("door.jail.close")),
        sound("rusty_hatch", Some("door.rusty_hatch.open"), Some("door.rusty_hatch.close")),
        sound("carriage_door", Some("door.carriage.open"), Some("door.carriage.close")),
        sound("silent", None, None),
    ]
}

fn def(
    name: &str,
    material: Material,
    hardness: f32,
    opening_time: u32,
    movement: &str,
    sound: &str,
) -> DescriptorDef {
    DescriptorDef {
        name: name.to_string(),
        material,
        hardness,
        opening_time,
        auto_close_time: 0,
        requires_external_trigger: false,
        double_door: false,
        movement: movement.to_string(),
        sound: sound.to_string(),
    }
}

/// Door types shipped with the mod
pub fn builtin_descriptor_defs() -> Vec<DescriptorDef> {
    vec![
        def("wood_door", Material::Wood, 3.0, DEFAULT_OPENING_TIME, "hinge", "wood"),
        DescriptorDef {
            requires_external_trigger: true,
            ..def("iron_door", Material::Iron, 5.0, DEFAULT_OPENING_TIME, "hinge", "iron")
        },
        def("jail_door", Material::Iron, 5.0, 10, "sliding", "jail"),
        DescriptorDef {
            double_door: true,
            ..def("laboratory_door", Material::Iron, 5.0, 10, "rotating_4_ways", "iron")
        },
        DescriptorDef {
            double_door: true,
            ..def("factory_door", Material::Iron, 5.0, 12, "vault", "iron")
        },
        def("wood_trapdoor", Material::Wood, 3.0, DEFAULT_OPENING_TIME, "trapdoor", "wood"),
        DescriptorDef {
            requires_external_trigger: true,
            ..def("iron_trapdoor", Material::Iron, 5.0, DEFAULT_OPENING_TIME, "trapdoor", "iron")
        },
        def("rusty_hatch", Material::Iron, 3.0, HATCH_OPENING_TIME, "rusty_hatch", "rusty_hatch"),
        DescriptorDef {
            requires_external_trigger: true,
            ..def("garage_door", Material::Iron, 5.0, DEFAULT_OPENING_TIME, "garage", "silent")
        },
        def("carriage_door", Material::Wood, 5.0, CARRIAGE_OPENING_TIME, "carriage", "carriage_door"),
    ]
}

/// Register every built-in door type
pub fn register_builtin_descriptors(data: &mut DescriptorRegistryData) -> DoorResult<()> {
    for def in builtin_descriptor_defs() {
        register_descriptor(data, &def)?;
    }
    Ok(())
}

// ============================================================================
// DESCRIPTOR FILES
// ============================================================================

/// Parse a descriptor TOML document (`[[door]]` tables)
pub fn parse_descriptor_file(text: &str) -> anyhow::Result<DescriptorFile> {
    let file: DescriptorFile = toml::from_str(text).context("parsing door descriptor file")?;
    for def in &file.door {
        validate_descriptor_def(def).map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    Ok(file)
}

/// Read a descriptor file and register every door it defines
pub fn load_descriptor_file(
    data: &mut DescriptorRegistryData,
    path: &Path,
) -> anyhow::Result<Vec<Arc<DoorDescriptor>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading door descriptors from {}", path.display()))?;
    let file = parse_descriptor_file(&text)?;

    let mut registered = Vec::with_capacity(file.door.len());
    for def in &file.door {
        let descriptor = register_descriptor(data, def)
            .map_err(|e| anyhow::anyhow!("registering '{}': {}", def.name, e))?;
        registered.push(descriptor);
    }

    log::info!(
        "[DescriptorRegistry] Loaded {} door types from {}",
        registered.len(),
        path.display()
    );
    Ok(registered)
}
