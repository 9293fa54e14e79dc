/// Axis-Aligned Bounding Box helpers
///
/// Pure functions over box data, used for door collision, selection and
/// raytrace boxes and for multi-block bounds.

use cgmath::{Point3, Vector3};

use crate::world::VoxelPos;

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Create new AABB from min/max points
pub fn create_aabb(min: Point3<f32>, max: Point3<f32>) -> AABB {
    AABB { min, max }
}

/// Create AABB from raw coordinates, in the (x, y, z, X, Y, Z) order used by
/// the movement strategies
pub fn aabb_from_coords(x: f32, y: f32, z: f32, max_x: f32, max_y: f32, max_z: f32) -> AABB {
    AABB {
        min: Point3::new(x, y, z),
        max: Point3::new(max_x, max_y, max_z),
    }
}

/// Full unit block
pub fn aabb_identity() -> AABB {
    aabb_from_coords(0.0, 0.0, 0.0, 1.0, 1.0, 1.0)
}

/// Test if two AABBs share some volume. Boxes that only touch do not.
pub fn aabb_intersects(aabb1: &AABB, aabb2: &AABB) -> bool {
    aabb1.min.x < aabb2.max.x && aabb1.max.x > aabb2.min.x &&
    aabb1.min.y < aabb2.max.y && aabb1.max.y > aabb2.min.y &&
    aabb1.min.z < aabb2.max.z && aabb1.max.z > aabb2.min.z
}

/// Test if AABB contains a point
pub fn aabb_contains_point(aabb: &AABB, point: Point3<f32>) -> bool {
    point.x >= aabb.min.x && point.x <= aabb.max.x &&
    point.y >= aabb.min.y && point.y <= aabb.max.y &&
    point.z >= aabb.min.z && point.z <= aabb.max.z
}

/// Create translated copy of AABB
pub fn aabb_translated(aabb: &AABB, offset: Vector3<f32>) -> AABB {
    AABB {
        min: aabb.min + offset,
        max: aabb.max + offset,
    }
}

/// Move a block-local box into world space at `pos`
pub fn aabb_at(aabb: &AABB, pos: VoxelPos) -> AABB {
    aabb_translated(aabb, Vector3::new(pos.x as f32, pos.y as f32, pos.z as f32))
}

/// Move a world-space box into the block-local space of `pos`
pub fn aabb_local_to(aabb: &AABB, pos: VoxelPos) -> AABB {
    aabb_translated(aabb, Vector3::new(-pos.x as f32, -pos.y as f32, -pos.z as f32))
}

/// Smallest box enclosing both boxes
pub fn aabb_union(a: &AABB, b: &AABB) -> AABB {
    AABB {
        min: Point3::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y), a.min.z.min(b.min.z)),
        max: Point3::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y), a.max.z.max(b.max.z)),
    }
}

/// Grow the box by `amount` on every side
pub fn aabb_expanded(aabb: &AABB, amount: f32) -> AABB {
    AABB {
        min: aabb.min - Vector3::new(amount, amount, amount),
        max: aabb.max + Vector3::new(amount, amount, amount),
    }
}

/// Component-wise comparison with tolerance, for float boxes built from sums
pub fn aabb_approx_eq(a: &AABB, b: &AABB, epsilon: f32) -> bool {
    (a.min.x - b.min.x).abs() <= epsilon
        && (a.min.y - b.min.y).abs() <= epsilon
        && (a.min.z - b.min.z).abs() <= epsilon
        && (a.max.x - b.max.x).abs() <= epsilon
        && (a.max.y - b.max.y).abs() <= epsilon
        && (a.max.z - b.max.z).abs() <= epsilon
}
