//! Door instance data - Pure DOP
//!
//! NO METHODS beyond trivial queries. All transitions happen in
//! door_operations.rs

use std::sync::Arc;

use crate::descriptor::DoorDescriptor;
use crate::world::{BlockFace, Direction, VoxelPos};

/// Open/close lifecycle of a movable block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Opened,
    Closing,
}

impl DoorState {
    /// A transition is in progress
    pub fn is_moving(self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }

    /// Boxes use the opened shape only once fully open
    pub fn is_opened(self) -> bool {
        self == DoorState::Opened
    }

    /// Timelines play backward while closing or closed
    pub fn is_animation_reversed(self) -> bool {
        matches!(self, DoorState::Closing | DoorState::Closed)
    }

    /// Heading toward the opened state
    pub fn is_heading_open(self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Opened)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DoorState::Closed => "closed",
            DoorState::Opening => "opening",
            DoorState::Opened => "opened",
            DoorState::Closing => "closing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "closed" => Some(DoorState::Closed),
            "opening" => Some(DoorState::Opening),
            "opened" => Some(DoorState::Opened),
            "closing" => Some(DoorState::Closing),
            _ => None,
        }
    }
}

/// Tick the current transition started at, compared against the system tick.
/// Signed so a mirrored reversal shortly after tick 0 keeps its exact offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimer {
    pub start_tick: i64,
}

impl Default for TickTimer {
    /// A door that never moved reads as long settled
    fn default() -> Self {
        Self {
            start_tick: Self::SETTLED_START,
        }
    }
}

impl TickTimer {
    pub const SETTLED_START: i64 = i64::MIN / 4;

    pub fn started_at(start_tick: i64) -> Self {
        Self { start_tick }
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        (now as i64 - self.start_tick).max(0) as u64
    }
}

/// Runtime state of one placed structure. Two-high doors keep a single
/// instance at the bottom cell; groups keep theirs at the origin; every
/// garage segment has its own.
#[derive(Debug, Clone)]
pub struct DoorInstance {
    pub pos: VoxelPos,
    pub descriptor: Option<Arc<DoorDescriptor>>,
    pub direction: Direction,
    pub state: DoorState,
    /// Hinge on the other side
    pub reversed: bool,
    /// Trapdoors and hatches placed against the upper half of a cell
    pub top_half: bool,
    pub powered: bool,
    pub timer: TickTimer,
    /// Tick at which an opened door closes itself
    pub auto_close_tick: Option<u64>,
}

/// Items handed to placement and returned by breaking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Descriptor name of the door item
    pub item: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Why a placement was refused. The item stack is never consumed then.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("Cell {0} is already claimed")]
    Conflict(VoxelPos),
    #[error("Cell {0} is obstructed")]
    Obstructed(VoxelPos),
    #[error("Cannot place against face {0:?}")]
    UnsupportedFace(BlockFace),
    #[error("No solid support for {0}")]
    NoSupport(VoxelPos),
    #[error("Item '{found}' cannot place '{expected}'")]
    WrongItem { expected: String, found: String },
    #[error("Item stack is empty")]
    EmptyStack,
    #[error("Door type '{0}' cannot be placed this way")]
    Incompatible(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
