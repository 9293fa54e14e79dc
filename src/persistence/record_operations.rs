//! Record operations - Pure DOP functions
//!
//! Conversion between live instances and saved records, plus snapshot
//! encoding and file IO. A transition in progress is saved as the ticks it
//! has run; restoring rebuilds its start against the restoring system's
//! clock so it completes at the same relative tick.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::record_data::{DoorRecord, DoorSnapshot, GroupRecord, SnapshotFormat};
use super::{PersistenceError, PersistenceResult};
use crate::constants::persistence::RECORD_VERSION;
use crate::descriptor::{get_descriptor_by_name, DescriptorRegistryData};
use crate::door::{DoorInstance, DoorState, DoorSystem, TickTimer};
use crate::error::{DoorError, DoorResult, OptionExt};
use crate::movement::StructureKind;
use crate::multiblock::{
    all_groups, claim_group, create_multiblock_registry, destroy_group, is_origin, resolve_group, GroupExtent,
    GroupId, MultiBlockGroup, MultiBlockRegistryData,
};
use crate::world::{Direction, VoxelPos};

fn check_version(found: u32) -> PersistenceResult<()> {
    if found != RECORD_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: RECORD_VERSION,
            found,
        });
    }
    Ok(())
}

fn parse_direction(key: &str, value: u8) -> PersistenceResult<Direction> {
    if value > 3 {
        return Err(PersistenceError::InvalidField {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(Direction::from_index(value))
}

/// Record of `door` as seen at tick `now`
pub fn door_record(door: &DoorInstance, now: u64) -> DoorRecord {
    DoorRecord {
        version: RECORD_VERSION,
        x: door.pos.x,
        y: door.pos.y,
        z: door.pos.z,
        descriptor: door
            .descriptor
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_default(),
        direction: door.direction.index(),
        state: door.state.as_str().to_string(),
        reversed: door.reversed,
        top_half: door.top_half,
        powered: door.powered,
        elapsed_ticks: door.timer.elapsed(now),
        auto_close_in: door.auto_close_tick.map(|due| due.saturating_sub(now)),
        group: None,
    }
}

/// Rebuild an instance from its record, resolving the descriptor by name.
/// The transition timer restarts so that `elapsed_ticks` have already run at
/// tick `now`.
pub fn restore_door(
    record: &DoorRecord,
    registry: &DescriptorRegistryData,
    now: u64,
) -> PersistenceResult<DoorInstance> {
    check_version(record.version)?;
    let descriptor = get_descriptor_by_name(registry, &record.descriptor)
        .ok_or_else(|| PersistenceError::UnknownDescriptor(record.descriptor.clone()))?;
    let state = DoorState::from_name(&record.state).ok_or_else(|| PersistenceError::InvalidField {
        key: "state".to_string(),
        value: record.state.clone(),
    })?;
    let direction = parse_direction("direction", record.direction)?;

    Ok(DoorInstance {
        pos: VoxelPos::new(record.x, record.y, record.z),
        descriptor: Some(Arc::clone(&descriptor)),
        direction,
        state,
        reversed: record.reversed,
        top_half: record.top_half,
        powered: record.powered,
        timer: TickTimer::started_at(now as i64 - record.elapsed_ticks as i64),
        auto_close_tick: record
            .auto_close_in
            .filter(|_| state == DoorState::Opened)
            .map(|remaining| now.saturating_add(remaining)),
    })
}

/// Claim the region a group record describes
fn restore_group(groups: &mut MultiBlockRegistryData, record: &GroupRecord) -> PersistenceResult<GroupId> {
    check_version(record.version)?;
    let origin = VoxelPos::new(record.origin_x, record.origin_y, record.origin_z);
    let direction = parse_direction("group.direction", record.direction)?;
    let extent = GroupExtent {
        min: record.min,
        max: record.max,
    };
    claim_group(groups, origin, direction, extent).map_err(|e| PersistenceError::InvalidField {
        key: "group".to_string(),
        value: e.to_string(),
    })
}

fn invalid_group(key: &str, pos: VoxelPos) -> PersistenceError {
    PersistenceError::InvalidField {
        key: key.to_string(),
        value: pos.to_string(),
    }
}

pub fn group_record(group: &MultiBlockGroup) -> GroupRecord {
    GroupRecord {
        version: RECORD_VERSION,
        origin_x: group.origin.x,
        origin_y: group.origin.y,
        origin_z: group.origin.z,
        direction: group.direction.index(),
        min: group.extent.min,
        max: group.extent.max,
    }
}

/// Every instance and group of `system`, doors sorted by position
pub fn snapshot_system(system: &DoorSystem) -> DoorSnapshot {
    let now = system.current_tick;
    let mut doors: Vec<&DoorInstance> = system.doors.values().collect();
    doors.sort_unstable_by_key(|d| d.pos);

    DoorSnapshot {
        version: RECORD_VERSION,
        tick: now,
        doors: doors.into_iter().map(|d| door_record(d, now)).collect(),
        groups: all_groups(&system.groups).into_iter().map(group_record).collect(),
    }
}

/// Replace the instances and groups of `system` with the snapshot's. Every
/// record is checked before anything changes; on error the system is left
/// as it was. Returns the number of restored instances.
pub fn restore_system(system: &mut DoorSystem, snapshot: &DoorSnapshot) -> PersistenceResult<usize> {
    check_version(snapshot.version)?;
    let now = system.current_tick;

    let mut doors = FxHashMap::default();
    for record in &snapshot.doors {
        let door = restore_door(record, &system.registry, now)?;
        if doors.insert(door.pos, door).is_some() {
            return Err(PersistenceError::InvalidField {
                key: "position".to_string(),
                value: format!("({}, {}, {})", record.x, record.y, record.z),
            });
        }
    }

    let mut groups = create_multiblock_registry();
    for record in &snapshot.groups {
        restore_group(&mut groups, record)?;
    }

    // Every group needs its origin instance and every group instance its group
    for group in all_groups(&groups) {
        let has_owner = doors
            .get(&group.origin)
            .map_or(false, |d| DoorSystem::structure_of(d) == Some(StructureKind::Group));
        if !has_owner {
            return Err(invalid_group("group.origin", group.origin));
        }
    }
    for door in doors.values() {
        if DoorSystem::structure_of(door) == Some(StructureKind::Group)
            && !is_origin(&groups, door.pos)
        {
            return Err(invalid_group("position", door.pos));
        }
    }

    let count = doors.len();
    system.doors = doors;
    system.groups = groups;
    log::info!(
        "[Persistence::restore_system] Restored {} doors and {} groups at tick {}",
        count,
        snapshot.groups.len(),
        now
    );
    Ok(count)
}

pub fn encode_snapshot(snapshot: &DoorSnapshot, format: SnapshotFormat) -> PersistenceResult<Vec<u8>> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::to_vec_pretty(snapshot)?),
        SnapshotFormat::Binary => Ok(bincode::serialize(snapshot)?),
    }
}

pub fn decode_snapshot(bytes: &[u8], format: SnapshotFormat) -> PersistenceResult<DoorSnapshot> {
    let snapshot: DoorSnapshot = match format {
        SnapshotFormat::Json => serde_json::from_slice(bytes)?,
        SnapshotFormat::Binary => bincode::deserialize(bytes)?,
    };
    check_version(snapshot.version)?;
    Ok(snapshot)
}

/// Write a snapshot next to `path` first, then move it into place
pub fn save_snapshot(path: &Path, snapshot: &DoorSnapshot, format: SnapshotFormat) -> PersistenceResult<()> {
    let bytes = encode_snapshot(snapshot, format)?;
    let temp = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(File::create(&temp)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    fs::rename(&temp, path)?;

    log::debug!(
        "[Persistence::save_snapshot] Wrote {} doors to {} ({} bytes)",
        snapshot.doors.len(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

pub fn load_snapshot(path: &Path, format: SnapshotFormat) -> PersistenceResult<DoorSnapshot> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_snapshot(&bytes, format)
}

fn with_path(path: &Path, err: PersistenceError, writing: bool) -> DoorError {
    match err {
        PersistenceError::Io(e) => DoorError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        },
        PersistenceError::Json(e) if writing => DoorError::SerializationError {
            context: path.display().to_string(),
            error: e.to_string(),
        },
        PersistenceError::Binary(e) if writing => DoorError::SerializationError {
            context: path.display().to_string(),
            error: e.to_string(),
        },
        other => other.into(),
    }
}

/// Save every door of `system` to `path`
pub fn save_system(system: &DoorSystem, path: &Path, format: SnapshotFormat) -> DoorResult<()> {
    let snapshot = snapshot_system(system);
    save_snapshot(path, &snapshot, format).map_err(|e| with_path(path, e, true))
}

/// Load `path` into `system`, replacing its doors
pub fn load_system(system: &mut DoorSystem, path: &Path, format: SnapshotFormat) -> DoorResult<usize> {
    let snapshot = load_snapshot(path, format).map_err(|e| with_path(path, e, false))?;
    Ok(restore_system(system, &snapshot)?)
}

/// Record of the instance governing `pos`, for hosts storing one record per
/// block
pub fn record_at(system: &DoorSystem, pos: VoxelPos) -> DoorResult<DoorRecord> {
    let door = system.instance(pos).ok_or_door(|| DoorError::NoDoorAt { pos })?;
    let mut record = door_record(door, system.current_tick);
    record.group = resolve_group(&system.groups, door.pos)
        .filter(|g| g.origin == door.pos)
        .map(group_record);
    Ok(record)
}

/// Load one per-block record into `system`, replacing any instance at its
/// position
pub fn restore_record(system: &mut DoorSystem, record: &DoorRecord) -> DoorResult<VoxelPos> {
    let door = restore_door(record, &system.registry, system.current_tick)?;
    let pos = door.pos;

    if let Some(group) = &record.group {
        let origin = VoxelPos::new(group.origin_x, group.origin_y, group.origin_z);
        if origin != pos {
            return Err(invalid_group("group.origin", origin).into());
        }
        // A reloaded block replaces the group it used to own
        if is_origin(&system.groups, pos) {
            destroy_group(&mut system.groups, pos);
        }
        restore_group(&mut system.groups, group)?;
    }
    system.doors.insert(pos, door);
    log::debug!("[Persistence::restore_record] Restored '{}' at {}", record.descriptor, pos);
    Ok(pos)
}
