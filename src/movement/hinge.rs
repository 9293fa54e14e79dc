//! Vanilla-like two-high door swinging 90 degrees around a vertical hinge

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::geometry::DOOR_WIDTH;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::Direction;

use super::{closed_panel, extend_selection, to_aabb, BoxCoords, DoorMovement, MovementContext, StructureKind};

pub struct HingeMovement;

impl HingeMovement {
    fn coords(dir: Direction, opened: bool, reversed: bool) -> BoxCoords {
        if !opened {
            return closed_panel(dir);
        }
        // An opened leaf lies against the side wall chosen by the hinge
        let side = if reversed { dir.rotate_ccw() } else { dir.rotate_cw() };
        closed_panel(side)
    }

    fn transformation(ctx: &MovementContext) -> Transformation {
        let mut angle = 90.0;
        let mut hinge_x = -0.5 + DOOR_WIDTH / 2.0;
        let hinge_z = -0.5 + DOOR_WIDTH / 2.0;

        if ctx.door.reversed {
            hinge_x = -hinge_x;
            angle = -angle;
        }

        Transformation::rotation(angle)
            .offset(hinge_x, 0.0, hinge_z)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0)
    }
}

impl DoorMovement for HingeMovement {
    fn name(&self) -> &'static str {
        "hinge"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::TwoHigh
    }

    fn bounding_box(&self, ctx: &MovementContext, top_half: bool, kind: BoundingBoxType) -> Option<AABB> {
        let opened = ctx.opened();
        let mut coords = Self::coords(ctx.door.direction, opened, ctx.door.reversed);
        if kind == BoundingBoxType::Selection && !opened {
            extend_selection(&mut coords, top_half);
        }
        Some(to_aabb(coords))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        let transformation = Self::transformation(ctx);
        AnimationTimeline::new(ctx.door.timer.start_tick)
            .with_part("top", transformation.clone())
            .with_part("bottom", transformation)
    }
}
