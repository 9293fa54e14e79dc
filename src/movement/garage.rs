//! Garage door made of stacked one-cell segments. Opening rolls every
//! segment up to the top of the column, tips it over and slides it back under
//! the ceiling. Poses are relative to the top segment's cell.

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::timing::GARAGE_SEGMENT_TICKS;
use crate::physics::{BoundingBoxType, AABB};

use super::{closed_panel, to_aabb, DoorMovement, MovementContext, StackPosition, StructureKind};

pub struct GarageMovement;

impl GarageMovement {
    /// Motion of segment `index` (0 = top) out of `count`, `t` ticks per segment
    pub fn segment_transformation(index: u32, count: u32, t: u32, reversed: bool) -> Transformation {
        let below = count.saturating_sub(index + 1);
        let drop = index as f32;

        let lift = Transformation::translation_between([0.0, -drop, 0.0], [0.0; 3]).for_ticks(t * index, 0);
        let tip_over = Transformation::parallel(vec![
            Transformation::translation(0.0, 1.0, 0.0).for_ticks(t, 0),
            Transformation::rotation(-90.0)
                .around_axis(0.0, 0.0, 1.0)
                .offset(-0.5, -0.5, 0.0)
                .for_ticks(t, 0),
        ]);
        let slide = Transformation::translation(0.0, below as f32, 0.0).for_ticks(t * below, 0);

        Transformation::chained(vec![lift, tip_over, slide]).reversed(reversed)
    }
}

impl DoorMovement for GarageMovement {
    fn name(&self) -> &'static str {
        "garage"
    }

    fn structure(&self) -> StructureKind {
        StructureKind::Stacked
    }

    fn bounding_box(&self, ctx: &MovementContext, _top_half: bool, kind: BoundingBoxType) -> Option<AABB> {
        // Rolled up segments leave the doorway free
        if ctx.opened() && kind == BoundingBoxType::Collision {
            return None;
        }
        Some(to_aabb(closed_panel(ctx.door.direction)))
    }

    fn describe_animation(&self, ctx: &MovementContext) -> AnimationTimeline {
        let t = if ctx.segment_ticks == 0 { GARAGE_SEGMENT_TICKS } else { ctx.segment_ticks };
        let StackPosition { count, .. } = ctx.stack.unwrap_or(StackPosition {
            index_from_top: 0,
            count: 1,
        });
        let reversed = ctx.animation_reversed();

        (0..count).fold(AnimationTimeline::new(ctx.door.timer.start_tick), |timeline, index| {
            timeline.with_part(
                format!("segment_{}", index),
                Self::segment_transformation(index, count, t, reversed),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{evaluate, transform_point};
    use crate::door::DoorState;
    use crate::movement::test_support::door;
    use crate::world::Direction;
    use cgmath::Point3;

    #[test]
    fn test_every_segment_spans_whole_opening() {
        let d = door(Direction::North, DoorState::Opening, false);
        let mut ctx = MovementContext::new(&d, d.pos, 30);
        ctx.segment_ticks = 10;
        ctx.stack = Some(StackPosition { index_from_top: 0, count: 3 });

        let timeline = GarageMovement.describe_animation(&ctx);
        assert_eq!(timeline.parts.len(), 3);
        for part in &timeline.parts {
            assert_eq!(crate::animation::total_span(&part.transformation), 30);
        }
    }

    #[test]
    fn test_bottom_segment_starts_in_its_own_cell() {
        let segment = GarageMovement::segment_transformation(2, 3, 10, false);
        let start = transform_point(&evaluate(&segment, 0.0), Point3::new(0.0, 0.0, 0.0));
        assert!((start.y + 2.0).abs() < 1e-5);

        // Lifted to the top cell after two segment times
        let lifted = transform_point(&evaluate(&segment, 20.0), Point3::new(0.0, 0.0, 0.0));
        assert!(lifted.y.abs() < 1e-5);
    }

    #[test]
    fn test_closing_replays_backward() {
        let opening = GarageMovement::segment_transformation(1, 3, 10, false);
        let closing = GarageMovement::segment_transformation(1, 3, 10, true);
        let a = evaluate(&opening, 30.0);
        let b = evaluate(&closing, 0.0);
        for (ca, cb) in [(a.x, b.x), (a.y, b.y), (a.z, b.z), (a.w, b.w)] {
            assert!((ca.x - cb.x).abs() < 1e-5 && (ca.y - cb.y).abs() < 1e-5 && (ca.z - cb.z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_opened_garage_has_no_collision() {
        let d = door(Direction::North, DoorState::Opened, false);
        let ctx = MovementContext::new(&d, d.pos, 10);
        assert!(GarageMovement
            .bounding_box(&ctx, false, BoundingBoxType::Collision)
            .is_none());
        assert!(GarageMovement
            .bounding_box(&ctx, false, BoundingBoxType::Selection)
            .is_some());
    }
}
