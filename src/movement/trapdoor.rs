//! Single-cell trapdoor lying on the floor or ceiling of its cell and
//! flipping up against the wall it is hinged to

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::geometry::DOOR_WIDTH;
use crate::physics::{BoundingBoxType, AABB};

use super::{closed_panel, to_aabb, DoorMovement, MovementContext, StructureKind};

pub struct TrapdoorMovement;

impl DoorMovement for TrapdoorMovement {
    fn name(&self) -> &'static str {
        "trapdoor"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::Single
    }

    fn bounding_box(&self, ctx: &MovementContext, _top_half: bool, _kind: BoundingBoxType) -> Option<AABB> {
        if ctx.opened() {
            return Some(to_aabb(closed_panel(ctx.door.direction)));
        }
        let coords = if ctx.door.top_half {
            [0.0, 1.0 - DOOR_WIDTH, 0.0, 1.0, 1.0, 1.0]
        } else {
            [0.0, 0.0, 0.0, 1.0, DOOR_WIDTH, 1.0]
        };
        Some(to_aabb(coords))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        let hinge = -0.5 + DOOR_WIDTH / 2.0;
        let (angle, hinge_y) = if ctx.door.top_half { (-90.0, -hinge) } else { (90.0, hinge) };

        let flip = Transformation::rotation(angle)
            .around_axis(1.0, 0.0, 0.0)
            .offset(0.0, hinge_y, hinge)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0);

        AnimationTimeline::new(ctx.door.timer.start_tick).with_part("trapdoor", flip)
    }
}
