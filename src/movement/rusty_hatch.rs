//! Rusty hatch: a 2x3x2 multi-block whose wheel handle spins before the
//! plate swings open, and after it swings shut.

use crate::animation::{AnimationTimeline, Easing, Transformation};
use crate::constants::geometry::HATCH_WIDTH;
use crate::physics::aabb::{aabb_at, aabb_identity, aabb_intersects, aabb_local_to};
use crate::physics::{BoundingBoxType, AABB};
use crate::world::Direction;

use super::{DoorMovement, MovementContext, StructureKind};

pub struct RustyHatchMovement;

impl RustyHatchMovement {
    /// World-space box of the plate inside the group bounds
    fn plate_bounds(mut aabb: AABB, dir: Direction, opened: bool, placed_high: bool) -> AABB {
        let f = HATCH_WIDTH;

        if !opened {
            aabb.min.y += if placed_high { 1.0 - f } else { 2.0 };
            aabb.max.y = aabb.min.y + f;
            return aabb;
        }

        aabb.min.x += f;
        aabb.max.x -= f;
        aabb.min.z += f;
        aabb.max.z -= f;

        if placed_high {
            aabb.min.y += 1.0;
            aabb.max.y -= 2.0 * f;
        } else {
            aabb.min.y += 2.0 * f;
            aabb.max.y -= 1.0;
        }

        match dir {
            Direction::North => aabb.min.z = aabb.max.z - f,
            Direction::South => aabb.max.z = aabb.min.z + f,
            Direction::East => aabb.max.x = aabb.min.x + f,
            Direction::West => aabb.min.x = aabb.max.x - f,
        }
        aabb
    }

    fn plate_transformation(ctx: &MovementContext) -> Transformation {
        let f = -0.5 + HATCH_WIDTH;
        let (to_angle, offset_y) = if ctx.door.top_half { (90.0, f) } else { (-90.0, -0.5) };
        let t = ctx.opening_time / 2;
        let closing = ctx.animation_reversed();

        Transformation::rotation(to_angle)
            .around_axis(0.0, 0.0, 1.0)
            .offset(f, offset_y, 0.0)
            .movement(Easing::Sinusoidal)
            .reversed(closing)
            .for_ticks(t, if closing { 0 } else { t })
    }

    fn handle_spin(ctx: &MovementContext) -> Transformation {
        let t = ctx.opening_time / 2;
        let closing = ctx.animation_reversed();

        Transformation::rotation_between(0.0, 400.0)
            .offset(0.5, 0.0, 0.5)
            .movement(Easing::Sinusoidal)
            .reversed(closing)
            .for_ticks(t, if closing { t } else { 0 })
    }
}

impl DoorMovement for RustyHatchMovement {
    fn name(&self) -> &'static str {
        "rusty_hatch"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::Group
    }

    fn bounding_box(&self, ctx: &MovementContext, _top_half: bool, _kind: BoundingBoxType) -> Option<AABB> {
        let bounds = ctx.group_bounds?;
        let plate = Self::plate_bounds(bounds, ctx.door.direction, ctx.opened(), ctx.door.top_half);
        Some(aabb_local_to(&plate, ctx.cell))
    }

    /// Members behind the opened plate hold the ladder down the shaft
    fn is_ladder(&self, ctx: &MovementContext) -> bool {
        let Some(bounds) = ctx.group_bounds else {
            return false;
        };
        if !ctx.opened() || ctx.cell == ctx.door.pos {
            return false;
        }
        let plate = Self::plate_bounds(bounds, ctx.door.direction, true, ctx.door.top_half);
        aabb_intersects(&plate, &aabb_at(&aabb_identity(), ctx.cell))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        let plate = Self::plate_transformation(ctx);
        // The handle rides on the plate while spinning
        let handle = Transformation::parallel(vec![plate.clone(), Self::handle_spin(ctx)]);

        AnimationTimeline::new(ctx.door.timer.start_tick)
            .with_part("hatch", plate)
            .with_part("handle", handle)
    }
}
