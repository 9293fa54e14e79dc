//! Door state machine operations - Pure DOP functions
//!
//! Transitions on a single instance. Nothing here touches the host world;
//! DoorSystem applies the side effects.

use std::sync::Arc;

use super::door_data::{DoorInstance, DoorState, TickTimer};
use crate::constants::metadata::{DIRECTION_MASK, FLAG_OPENED, FLAG_POWERED, FLAG_REVERSED, FLAG_TOPBLOCK};
use crate::descriptor::DoorDescriptor;
use crate::movement::DoorMovement;
use crate::world::{Direction, VoxelPos};

/// Create a closed instance
pub fn create_door_instance(
    pos: VoxelPos,
    descriptor: Option<Arc<DoorDescriptor>>,
    direction: Direction,
    reversed: bool,
    top_half: bool,
) -> DoorInstance {
    DoorInstance {
        pos,
        descriptor,
        direction,
        state: DoorState::Closed,
        reversed,
        top_half,
        powered: false,
        timer: TickTimer::default(),
        auto_close_tick: None,
    }
}

/// Movement strategy, if the descriptor resolved one
pub fn door_movement(door: &DoorInstance) -> Option<&Arc<dyn DoorMovement>> {
    door.descriptor.as_ref().and_then(|d| d.movement.as_ref())
}

/// Descriptor and movement are both present
pub fn is_operable(door: &DoorInstance) -> bool {
    door_movement(door).is_some()
}

pub fn requires_external_trigger(door: &DoorInstance) -> bool {
    door.descriptor
        .as_ref()
        .map_or(false, |d| d.requires_external_trigger)
}

/// State a user toggle leads to
pub fn toggle_target(state: DoorState) -> DoorState {
    match state {
        DoorState::Closed | DoorState::Closing => DoorState::Opening,
        DoorState::Opened | DoorState::Opening => DoorState::Closing,
    }
}

/// State a power signal drives toward
pub fn powered_target(powered: bool) -> DoorState {
    if powered {
        DoorState::Opening
    } else {
        DoorState::Closing
    }
}

/// Enter `target` (OPENING or CLOSING) at tick `now`. Reversing a transition
/// in progress mirrors its elapsed time so the motion stays continuous.
/// Returns false when nothing changed.
pub fn begin_transition(door: &mut DoorInstance, target: DoorState, now: u64, opening_time: u32) -> bool {
    if door.state == target || !target.is_moving() {
        return false;
    }
    // Heading there already, or settled there
    if door.state.is_heading_open() == target.is_heading_open() {
        return false;
    }

    let start = if door.state.is_moving() {
        let elapsed = door.timer.elapsed(now).min(opening_time as u64);
        now as i64 - (opening_time as u64 - elapsed) as i64
    } else {
        now as i64
    };

    door.state = target;
    door.timer = TickTimer::started_at(start);
    door.auto_close_tick = None;
    true
}

/// Settle a finished transition. Returns the state entered, if any.
pub fn settle_transition(door: &mut DoorInstance, now: u64, opening_time: u32) -> Option<DoorState> {
    if !door.state.is_moving() || door.timer.elapsed(now) < opening_time as u64 {
        return None;
    }

    door.state = match door.state {
        DoorState::Opening => DoorState::Opened,
        _ => DoorState::Closed,
    };

    door.auto_close_tick = match (&door.descriptor, door.state) {
        (Some(d), DoorState::Opened) if d.auto_close_time > 0 && !d.requires_external_trigger => {
            let due = door.timer.start_tick + opening_time as i64 + d.auto_close_time as i64;
            Some(due.max(0) as u64)
        }
        _ => None,
    };
    Some(door.state)
}

/// An opened door whose auto-close time has come
pub fn auto_close_due(door: &DoorInstance, now: u64) -> bool {
    door.state == DoorState::Opened && door.auto_close_tick.map_or(false, |due| now >= due)
}

/// Sound to play for a completed transition
pub fn completion_sound(door: &DoorInstance) -> Option<&str> {
    let profile = door.descriptor.as_ref()?.sound.as_ref()?;
    match door.state {
        DoorState::Opened => profile.opened.as_deref(),
        DoorState::Closed => profile.closed.as_deref(),
        _ => None,
    }
}

/// Metadata byte describing a cell of the structure
pub fn door_metadata(door: &DoorInstance, top_cell: bool) -> u8 {
    let mut meta = door.direction.index() & DIRECTION_MASK;
    if door.state.is_opened() {
        meta |= FLAG_OPENED;
    }
    if top_cell || door.top_half {
        meta |= FLAG_TOPBLOCK;
    }
    if door.reversed {
        meta |= FLAG_REVERSED;
    }
    if door.powered {
        meta |= FLAG_POWERED;
    }
    meta
}

pub fn metadata_direction(meta: u8) -> Direction {
    Direction::from_index(meta & DIRECTION_MASK)
}

pub fn metadata_is_top(meta: u8) -> bool {
    meta & FLAG_TOPBLOCK != 0
}
