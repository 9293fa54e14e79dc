//! Two-high vault door: both halves pivot around the axis through the door
//! plane, one half sliding into the wall beside the frame and the other into
//! the wall above or below it.

use crate::animation::{AnimationTimeline, Transformation};
use crate::constants::geometry::DOOR_WIDTH;
use crate::physics::{BoundingBoxType, AABB};
use crate::world::Direction;

use super::{extend_selection, to_aabb, BoxCoords, DoorMovement, MovementContext, StructureKind};

pub struct VaultMovement;

impl VaultMovement {
    fn coords(dir: Direction, opened: bool, reversed: bool, top_half: bool, kind: BoundingBoxType) -> BoxCoords {
        let left = -1.0 + DOOR_WIDTH;
        let right = 1.0 - DOOR_WIDTH;
        let [mut x, mut y, mut z, mut max_x, mut max_y, mut max_z] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let sideways = opened && top_half == reversed;

        match dir {
            Direction::North => {
                max_z = DOOR_WIDTH;
                if sideways {
                    let shift = if reversed { left } else { right };
                    x += shift;
                    max_x += shift;
                }
            }
            Direction::South => {
                z = 1.0 - DOOR_WIDTH;
                if sideways {
                    let shift = if reversed { right } else { left };
                    x += shift;
                    max_x += shift;
                }
            }
            Direction::West => {
                max_x = DOOR_WIDTH;
                if sideways {
                    let shift = if reversed { right } else { left };
                    z += shift;
                    max_z += shift;
                }
            }
            Direction::East => {
                x = 1.0 - DOOR_WIDTH;
                if sideways {
                    let shift = if reversed { left } else { right };
                    z += shift;
                    max_z += shift;
                }
            }
        }

        if opened && top_half == !reversed {
            let shift = if reversed { left } else { right };
            y += shift;
            if top_half || kind == BoundingBoxType::Selection {
                max_y += shift;
            } else {
                max_y = 0.0;
            }
        }

        [x, y, z, max_x, max_y, max_z]
    }

    fn transformation(ctx: &MovementContext, top_half: bool) -> Transformation {
        let hinge = -0.5 + DOOR_WIDTH / 2.0;
        let mut offset_x = hinge;
        let mut offset_y = hinge;

        if top_half {
            offset_y = 1.0 - offset_y;
        }
        if !ctx.door.reversed {
            offset_x = -offset_x;
        }

        Transformation::rotation(-90.0)
            .around_axis(0.0, 0.0, 1.0)
            .offset(offset_x, offset_y, 0.0)
            .reversed(ctx.animation_reversed())
            .for_ticks(ctx.opening_time, 0)
    }
}

impl DoorMovement for VaultMovement {
    fn name(&self) -> &'static str {
        "vault"
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
