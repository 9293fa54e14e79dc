//! Multi-block group registry
//!
//! Tracks which cells belong to one logical structure and which of them is
//! the origin holding the structure's state.

pub mod group_data;
pub mod group_operations;

pub use group_data::{GroupExtent, GroupId, MultiBlockGroup, MultiBlockRegistryData};
pub use group_operations::{
    all_groups, cells_bounds, check_region, claim_group, create_multiblock_registry, destroy_group,
    extent_of_size, form_group, group_cells, is_origin, resolve_group,
};
