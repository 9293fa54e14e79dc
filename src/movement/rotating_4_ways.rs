//! Two-high door whose halves fold apart like a book: one half swings up
//! around a horizontal hinge, the other sideways around a vertical one.

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::geometry::DOOR_WIDTH;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::Direction;

use super::{closed_panel, extend_selection, to_aabb, BoxCoords, DoorMovement, MovementContext, StructureKind};

pub struct Rotating4WaysMovement;

impl Rotating4WaysMovement {
    fn coords(dir: Direction, opened: bool, reversed: bool, top_half: bool, kind: BoundingBoxType) -> BoxCoords {
        if !opened {
            return closed_panel(dir);
        }

        let [mut x, mut y, mut z, mut max_x, mut max_y, mut max_z] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        if top_half == !reversed {
            // Half folded flat against the ceiling or the floor
            if top_half {
                y = 1.0 - DOOR_WIDTH;
            } else {
                max_y = if kind == BoundingBoxType::Selection { DOOR_WIDTH } else { 0.0 };
            }
        } else {
            use Direction::*;
            match (dir, reversed) {
                (North, false) | (South, true) => x = 1.0 - DOOR_WIDTH,
                (South, false) | (North, true) => max_x = DOOR_WIDTH,
                (East, false) | (West, true) => z = 1.0 - DOOR_WIDTH,
                (West, false) | (East, true) => max_z = DOOR_WIDTH,
            }
        }
        [x, y, z, max_x, max_y, max_z]
    }

    fn transformation(ctx: &MovementContext, top_half: bool) -> Transformation {
        let mut angle = 90.0;
        let mut hinge_x = 0.5 - DOOR_WIDTH / 2.0;
        let mut hinge_y = -0.5 + DOOR_WIDTH / 2.0;
        let hinge_z = -0.5 + DOOR_WIDTH / 2.0;

        if top_half {
            angle = -angle;
            hinge_y = 1.0 - hinge_y;
        }
        if ctx.door.reversed {
            hinge_x = -hinge_x;
        }

        let (axis_x, axis_y) = if top_half != ctx.door.reversed { (1.0, 0.0) } else { (0.0, 1.0) };

        Transformation::rotation(angle)
            .around_axis(axis_x, axis_y, 0.0)
            .offset(hinge_x, hinge_y, hinge_z)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0)
    }
}

impl DoorMovement for Rotating4WaysMovement {
    fn name(&self) -> &'static str {
        "rotating_4_ways"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::TwoHigh
    }

    fn bounding_box(&self, ctx: &MovementContext, top_half: bool, kind: BoundingBoxType) -> Option<AABB> {
        let opened = ctx.opened();
        let mut coords = Self::coords(ctx.door.direction, opened, ctx.door.reversed, top_half, kind);
        if kind == BoundingBoxType::Selection && !opened {
            extend_selection(&mut coords, top_half);
        }
        Some(to_aabb(coords))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        AnimationTimeline::new(ctx.door.timer.start_tick)
            .with_part("top", Self::transformation(ctx, true))
            .with_part("bottom", Self::transformation(ctx, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TransformKind;
    use crate::door::DoorState;
    use crate::movement::test_support::door;
    use crate::physics::aabb::{aabb_approx_eq, aabb_from_coords};

    fn boxes(state: DoorState, reversed: bool, top: bool) -> (AABB, AABB) {
        let d = door(Direction::North, state, reversed);
        let ctx = MovementContext::new(&d, d.pos, 10);
        let m = Rotating4WaysMovement;
        (
            m.bounding_box(&ctx, top, BoundingBoxType::Collision).expect("collision box"),
            m.bounding_box(&ctx, top, BoundingBoxType::Selection).expect("selection box"),
        )
    }

    #[test]
    fn test_closed_selection_differs_only_by_extension() {
        let (collision, selection) = boxes(DoorState::Closed, false, false);
        assert!(aabb_approx_eq(&collision, &aabb_from_coords(0.0, 0.0, 0.0, 1.0, 1.0, DOOR_WIDTH), 1e-6));
        assert!(aabb_approx_eq(&selection, &aabb_from_coords(0.0, 0.0, 0.0, 1.0, 2.0, DOOR_WIDTH), 1e-6));

        let (collision, selection) = boxes(DoorState::Closed, false, true);
        assert_eq!(collision.max, selection.max);
        assert!((selection.min.y - (collision.min.y - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_opened_halves_fold_apart() {
        // Not reversed: top folds up to the ceiling, bottom swings aside
        let (top, _) = boxes(DoorState::Opened, false, true);
        assert!((top.min.y - (1.0 - DOOR_WIDTH)).abs() < 1e-6);
        let (bottom, _) = boxes(DoorState::Opened, false, false);
        assert!((bottom.min.x - (1.0 - DOOR_WIDTH)).abs() < 1e-6);

        // Reversed: bottom folds flat on the floor and has no collision height
        let (bottom, selection) = boxes(DoorState::Opened, true, false);
        assert_eq!(bottom.max.y, 0.0);
        assert!((selection.max.y - DOOR_WIDTH).abs() < 1e-6);
    }

    #[test]
    fn test_halves_rotate_oppositely() {
        let d = door(Direction::East, DoorState::Opening, false);
        let timeline = Rotating4WaysMovement.describe_animation(&MovementContext::new(&d, d.pos, 10));

        let angle_and_axis = |part: &str| match &timeline.part(part).expect("part exists").kind {
            TransformKind::Rotation { to_angle, axis, offset, .. } => (*to_angle, *axis, *offset),
            other => panic!("unexpected transformation {:?}", other),
        };
        let (top_angle, top_axis, top_offset) = angle_and_axis("top");
        let (bottom_angle, bottom_axis, bottom_offset) = angle_and_axis("bottom");

        assert_eq!(top_angle, -bottom_angle);
        assert_eq!(top_axis.x, 1.0);
        assert_eq!(bottom_axis.y, 1.0);
        assert!((top_offset.y - (1.5 - DOOR_WIDTH / 2.0)).abs() < 1e-6);
        // Hinges mirror around the seam between the halves
        assert!((top_offset.y + bottom_offset.y - 1.0).abs() < 1e-6);
        assert_eq!((top_offset.x, top_offset.z), (bottom_offset.x, bottom_offset.z));
        assert!(!timeline.part("top").expect("top").timing.reversed);
    }

    #[test]
    fn test_reversed_mirrors_hinge() {
        let d = door(Direction::East, DoorState::Closed, true);
        let timeline = Rotating4WaysMovement.describe_animation(&MovementContext::new(&d, d.pos, 10));
        match &timeline.part("top").expect("top part").kind {
            TransformKind::Rotation { axis, offset, .. } => {
                assert_eq!(axis.y, 1.0);
                assert!(offset.x < 0.0);
            }
            other => panic!("unexpected transformation {:?}", other),
        }
        assert!(timeline.part("bottom").expect("bottom").timing.reversed);
    }
}
