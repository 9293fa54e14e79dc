//! Persisted records - Pure DOP
//!
//! NO METHODS. Just data.
//! Records are flat so hosts can store them as key/value tags next to the
//! block. Only what is needed to resume an animation is kept; timelines are
//! rebuilt after loading.

use serde::{Deserialize, Serialize};

/// Saved state of one door instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorRecord {
    pub version: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Descriptor name
    pub descriptor: String,
    pub direction: u8,
    pub state: String,
    pub reversed: bool,
    pub top_half: bool,
    pub powered: bool,
    /// Ticks since the current transition started, at save time
    pub elapsed_ticks: u64,
    /// Ticks left before an opened door closes itself
    pub auto_close_in: Option<u64>,
    /// Group this instance is the origin of. Only filled in per-block
    /// records; snapshots list their groups separately.
    #[serde(default)]
    pub group: Option<GroupRecord>,
}

/// Saved multi-block group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub version: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub origin_z: i32,
    pub direction: u8,
    pub min: [i32; 3],
    pub max: [i32; 3],
}

/// Every record of one door system
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorSnapshot {
    pub version: u32,
    /// Tick counter at save time
    pub tick: u64,
    pub doors: Vec<DoorRecord>,
    pub groups: Vec<GroupRecord>,
}

/// On-disk encoding of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Human readable, one flat object per record
    Json,
    /// Compact bincode blob
    Binary,
}
