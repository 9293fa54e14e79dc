//! Carriage door: a 4x5 gate whose two leaves swing inward around hinges at
//! the outer edges of the frame.

use crate::animation::{AnimationTimeline, Easing, Transformation};
use crate::constants::geometry::{CARRIAGE_SIZE, DOOR_WIDTH};
use crate::physics::aabb::aabb_local_to;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::{Direction, VoxelPos};

use super::{DoorMovement, MovementContext, StructureKind};

pub struct CarriageMovement;

impl CarriageMovement {
    /// World box of both closed leaves, against the facing side of the frame
    fn closed_bounds(mut aabb: AABB, dir: Direction) -> AABB {
        match dir {
            Direction::North => aabb.max.z = aabb.min.z + DOOR_WIDTH,
            Direction::South => aabb.min.z = aabb.max.z - DOOR_WIDTH,
            Direction::West => aabb.max.x = aabb.min.x + DOOR_WIDTH,
            Direction::East => aabb.min.x = aabb.max.x - DOOR_WIDTH,
        }
        aabb
    }

    /// World box of the opened leaf folded against the frame edge of `cell`.
    /// Cells away from both edges have nothing in them.
    fn opened_bounds(mut aabb: AABB, dir: Direction, cell: VoxelPos) -> Option<AABB> {
        let along_x = matches!(dir, Direction::North | Direction::South);
        let (min, max, c) = if along_x {
            (aabb.min.x, aabb.max.x, cell.x)
        } else {
            (aabb.min.z, aabb.max.z, cell.z)
        };

        let (lo, hi) = if c == min.round() as i32 {
            (min, min + DOOR_WIDTH)
        } else if c + 1 == max.round() as i32 {
            (max - DOOR_WIDTH, max)
        } else {
            return None;
        };

        if along_x {
            aabb.min.x = lo;
            aabb.max.x = hi;
        } else {
            aabb.min.z = lo;
            aabb.max.z = hi;
        }
        Some(aabb)
    }

    fn leaf(ctx: &MovementContext, left: bool) -> Transformation {
        let hinge_x = CARRIAGE_SIZE[0] as f32 / 2.0 - DOOR_WIDTH / 2.0;
        let (angle, offset_x) = if left { (-90.0, -hinge_x) } else { (90.0, hinge_x) };

        Transformation::rotation(angle)
            .offset(offset_x, 0.0, -0.5 + DOOR_WIDTH / 2.0)
            .movement(Easing::Sinusoidal)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0)
    }
}

impl DoorMovement for CarriageMovement {
    fn name(&self) -> &'static str {
        "carriage"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::Group
    }

    fn bounding_box(&self, ctx: &MovementContext, _top_half: bool, _kind: BoundingBoxType) -> Option<AABB> {
        let bounds = ctx.group_bounds?;
        let leaf = if ctx.opened() {
            Self::opened_bounds(bounds, ctx.door.direction, ctx.cell)?
        } else {
            Self::closed_bounds(bounds, ctx.door.direction)
        };
        Some(aabb_local_to(&leaf, ctx.cell))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        AnimationTimeline::new(ctx.door.timer.start_tick)
            .with_part("left", Self::leaf(ctx, true))
            .with_part("right", Self::leaf(ctx, false))
    }
}
