//! Door descriptors and their registry

pub mod descriptor_data;
pub mod registry_data;
pub mod registry_operations;

pub use descriptor_data::{DescriptorDef, DescriptorFile, DoorDescriptor, Material, SoundProfile};
pub use registry_data::{DescriptorRegistration, DescriptorRegistryData};
pub use registry_operations::{
    builtin_descriptor_defs, builtin_sounds, create_descriptor_registry, get_descriptor,
    get_descriptor_by_name, get_registrations, is_registered, load_descriptor_file,
    parse_descriptor_file, register_builtin_descriptors, register_descriptor, register_movement,
    register_sound, validate_descriptor_def,
};
