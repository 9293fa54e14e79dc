//! Two-high door sliding sideways into the neighbouring wall

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::geometry::DOOR_WIDTH;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::Direction;

use super::{closed_panel, extend_selection, to_aabb, DoorMovement, MovementContext, StructureKind};

pub struct SlidingMovement;

impl SlidingMovement {
    /// Block-local (dx, dz) an opened panel is shifted by
    fn slide(dir: Direction, reversed: bool) -> (f32, f32) {
        let left = -1.0 + DOOR_WIDTH;
        let right = 1.0 - DOOR_WIDTH;
        match dir {
            Direction::North => (if reversed { left } else { right }, 0.0),
            Direction::South => (if reversed { right } else { left }, 0.0),
            Direction::West => (0.0, if reversed { right } else { left }),
            Direction::East => (0.0, if reversed { left } else { right }),
        }
    }
}

impl DoorMovement for SlidingMovement {
    fn name(&self) -> &'static str {
        "sliding"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::TwoHigh
    }

    fn bounding_box(&self, ctx: &MovementContext, top_half: bool, kind: BoundingBoxType) -> Option<AABB> {
        let mut coords = closed_panel(ctx.door.direction);
        if ctx.opened() {
            let (dx, dz) = Self::slide(ctx.door.direction, ctx.door.reversed);
            coords[0] += dx;
            coords[3] += dx;
            coords[2] += dz;
            coords[5] += dz;
        } else if kind == BoundingBoxType::Selection {
            extend_selection(&mut coords, top_half);
        }
        Some(to_aabb(coords))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        // Model space has the panel along x whatever the facing
        let distance = if ctx.door.reversed { -(1.0 - DOOR_WIDTH) } else { 1.0 - DOOR_WIDTH };
        let transformation = Transformation::translation(distance, 0.0, 0.0)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0);

        AnimationTimeline::new(ctx.door.timer.start_tick)
            .with_part("top", transformation.clone())
            .with_part("bottom", transformation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::evaluate;
    use crate::door::DoorState;
    use crate::movement::test_support::door;

    #[test]
    fn test_opened_panel_moves_along_wall() {
        let d = door(Direction::South, DoorState::Opened, false);
        let ctx = MovementContext::new(&d, d.pos, 10);
        let open = SlidingMovement
            .bounding_box(&ctx, false, BoundingBoxType::Collision)
            .expect("sliding doors always have a box");
        assert!((open.min.x - (-1.0 + DOOR_WIDTH)).abs() < 1e-6);
        assert!((open.min.z - (1.0 - DOOR_WIDTH)).abs() < 1e-6);

        let selection = SlidingMovement.bounding_box(&ctx, false, BoundingBoxType::Selection);
        assert_eq!(Some(open), selection);
    }

    #[test]
    fn test_slide_animation_ends_one_panel_over() {
        let d = door(Direction::North, DoorState::Opening, true);
        let timeline = SlidingMovement.describe_animation(&MovementContext::new(&d, d.pos, 10));
        let bottom = timeline.part("bottom").expect("bottom part");
        let end = evaluate(bottom, 10.0);
        assert!((end.w.x + (1.0 - DOOR_WIDTH)).abs() < 1e-6);
    }
}
