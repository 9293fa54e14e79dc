//! Physics Module - bounding boxes exchanged with the host world

pub mod aabb;

pub use aabb::AABB;

/// Which box the host is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundingBoxType {
    /// Blocks entity movement
    Collision,
    /// Outline drawn when the player looks at the block
    Selection,
    /// Box used for ray picking and block bounds
    Raytrace,
}
