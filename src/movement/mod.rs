//! Movement strategies
//!
//! One implementation per contraption family. A strategy turns the state of
//! a door instance into the boxes the host collides and selects against, and
//! into the part timelines the renderer plays. Strategies are stateless and
//! shared by every descriptor that names them.

pub mod carriage;
pub mod garage;
pub mod hinge;
pub mod rotating_4_ways;
pub mod rusty_hatch;
pub mod sliding;
pub mod trapdoor;
pub mod vault;

use std::sync::Arc;

use crate::animation::AnimationTimeline;
use crate::constants::geometry::DOOR_WIDTH;
use crate::door::DoorInstance;
use crate::physics::aabb::aabb_from_coords;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::{Direction, VoxelPos};

pub use carriage::CarriageMovement;
pub use garage::GarageMovement;
pub use hinge::HingeMovement;
pub use rotating_4_ways::Rotating4WaysMovement;
pub use rusty_hatch::RustyHatchMovement;
pub use sliding::SlidingMovement;
pub use trapdoor::TrapdoorMovement;
pub use vault::VaultMovement;

/// How the cells of one structure are laid out in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// Bottom cell plus the cell above it
    TwoHigh,
    /// One cell
    Single,
    /// A claimed multi-block region with an elected origin
    Group,
    /// Vertically stacked segments owned by the top one
    Stacked,
}

/// Position of a garage segment in its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackPosition {
    /// 0 for the top segment
    pub index_from_top: u32,
    pub count: u32,
}

/// Everything a strategy may read about the structure it shapes
#[derive(Debug, Clone, Copy)]
pub struct MovementContext<'a> {
    pub door: &'a DoorInstance,
    /// Cell being asked about
    pub cell: VoxelPos,
    /// Opening time of the whole structure
    pub opening_time: u32,
    /// World bounds of the multi-block group, if any
    pub group_bounds: Option<AABB>,
    pub stack: Option<StackPosition>,
    /// Time a single garage segment takes to roll up
    pub segment_ticks: u32,
}

impl<'a> MovementContext<'a> {
    pub fn new(door: &'a DoorInstance, cell: VoxelPos, opening_time: u32) -> Self {
        Self {
            door,
            cell,
            opening_time,
            group_bounds: None,
            stack: None,
            segment_ticks: 0,
        }
    }

    pub fn opened(&self) -> bool {
        self.door.state.is_opened()
    }

    pub fn animation_reversed(&self) -> bool {
        self.door.state.is_animation_reversed()
    }
}

/// Shape and motion of one contraption family
pub trait DoorMovement: Send + Sync {
    /// Name descriptors use to reference this strategy
    fn name(&self) -> &'static str;

    fn structure(&self) -> StructureKind;

    /// Block-local box of `ctx.cell`. `top_half` tells which cell of a two-high
    /// door is being asked about. `None` means the cell has no box of that kind.
    fn bounding_box(&self, ctx: &MovementContext, top_half: bool, kind: BoundingBoxType) -> Option<AABB>;

    /// Part timelines for the transition the door is in, anchored at its start
    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline;

    /// Whether entities can climb `ctx.cell`
    fn is_ladder(&self, _ctx: &MovementContext) -> bool {
        false
    }
}

/// Every strategy shipped with the mod
pub fn builtin_movements() -> Vec<Arc<dyn DoorMovement>> {
    vec![
        Arc::new(HingeMovement),
        Arc::new(Rotating4WaysMovement),
        Arc::new(VaultMovement),
        Arc::new(SlidingMovement),
        Arc::new(TrapdoorMovement),
        Arc::new(RustyHatchMovement),
        Arc::new(GarageMovement),
        Arc::new(CarriageMovement),
    ]
}

/// Block-local coordinates `(x, y, z, X, Y, Z)` of a box being shaped
pub(crate) type BoxCoords = [f32; 6];

/// Full-height panel against the `dir` face of the cell
pub(crate) fn closed_panel(dir: Direction) -> BoxCoords {
    let [mut x, y, mut z, mut max_x, max_y, mut max_z] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    match dir {
        Direction::North => max_z = DOOR_WIDTH,
        Direction::West => max_x = DOOR_WIDTH,
        Direction::East => x = 1.0 - DOOR_WIDTH,
        Direction::South => z = 1.0 - DOOR_WIDTH,
    }
    [x, y, z, max_x, max_y, max_z]
}

/// Stretch a closed two-high door's selection over the other half
pub(crate) fn extend_selection(coords: &mut BoxCoords, top_half: bool) {
    if top_half {
        coords[1] -= 1.0;
    } else {
        coords[4] += 1.0;
    }
}

pub(crate) fn to_aabb(c: BoxCoords) -> AABB {
    aabb_from_coords(c[0], c[1], c[2], c[3], c[4], c[5])
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let movements = builtin_movements();
        let mut names: Vec<_> = movements.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), movements.len());
    }

    #[test]
    fn test_closed_panel_hugs_facing_side() {
        assert_eq!(closed_panel(Direction::North), [0.0, 0.0, 0.0, 1.0, 1.0, DOOR_WIDTH]);
        assert_eq!(closed_panel(Direction::East)[0], 1.0 - DOOR_WIDTH);
    }
}
