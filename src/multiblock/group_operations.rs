//! Multi-block group operations - Pure DOP functions
//!
//! A group claims every cell of its region or nothing. Membership is an index
//! from position to group id, so any member resolves the same group.

use cgmath::Point3;

use super::group_data::{GroupExtent, GroupId, MultiBlockGroup, MultiBlockRegistryData};
use crate::door::{PlacementError, PlacementResult};
use crate::physics::aabb::create_aabb;
use crate::physics::AABB;
use crate::world::{Direction, HostWorld, VoxelPos};

/// Create an empty registry
pub fn create_multiblock_registry() -> MultiBlockRegistryData {
    MultiBlockRegistryData::default()
}

/// Extent of a `size` box anchored at the origin
pub fn extent_of_size(size: [i32; 3], y_offset: i32) -> GroupExtent {
    GroupExtent {
        min: [0, y_offset, 0],
        max: [size[0], size[1] + y_offset, size[2]],
    }
}

/// Quarter turns clockwise from the unrotated (south facing) layout
fn quarter_turns(direction: Direction) -> u8 {
    (direction.index() + 1) % 4
}

fn rotate_offset(dx: i32, dz: i32, turns: u8) -> (i32, i32) {
    (0..turns).fold((dx, dz), |(x, z), _| (-z, x))
}

/// World cells covered by an extent placed at `origin` facing `direction`
pub fn group_cells(origin: VoxelPos, direction: Direction, extent: &GroupExtent) -> Vec<VoxelPos> {
    let turns = quarter_turns(direction);
    let mut cells = Vec::new();
    for dy in extent.min[1]..extent.max[1] {
        for dx in extent.min[0]..extent.max[0] {
            for dz in extent.min[2]..extent.max[2] {
                let (rx, rz) = rotate_offset(dx, dz, turns);
                cells.push(origin.offset(rx, dy, rz));
            }
        }
    }
    cells
}

/// World bounds enclosing `cells`
pub fn cells_bounds(cells: &[VoxelPos]) -> Option<AABB> {
    let first = cells.first()?;
    let (mut min, mut max) = (*first, *first);
    for c in cells {
        min = VoxelPos::new(min.x.min(c.x), min.y.min(c.y), min.z.min(c.z));
        max = VoxelPos::new(max.x.max(c.x), max.y.max(c.y), max.z.max(c.z));
    }
    Some(create_aabb(
        Point3::new(min.x as f32, min.y as f32, min.z as f32),
        Point3::new((max.x + 1) as f32, (max.y + 1) as f32, (max.z + 1) as f32),
    ))
}

/// Check that every cell of a prospective group is free, both in the claims
/// index and in the host world
pub fn check_region<W: HostWorld + ?Sized>(
    data: &MultiBlockRegistryData,
    world: &W,
    cells: &[VoxelPos],
) -> PlacementResult<()> {
    for &cell in cells {
        if data.claims.contains_key(&cell) {
            return Err(PlacementError::Conflict(cell));
        }
        if !world.is_replaceable(cell) {
            return Err(PlacementError::Obstructed(cell));
        }
    }
    Ok(())
}

/// Claim the region for a new group. Fails without side effects when any
/// cell is claimed or occupied.
pub fn form_group<W: HostWorld + ?Sized>(
    data: &mut MultiBlockRegistryData,
    world: &W,
    origin: VoxelPos,
    direction: Direction,
    extent: GroupExtent,
) -> PlacementResult<GroupId> {
    let cells = group_cells(origin, direction, &extent);
    if let Err(e) = check_region(data, world, &cells) {
        log::debug!("[MultiBlock::form_group] Refused group at {}: {}", origin, e);
        return Err(e);
    }
    claim_group(data, origin, direction, extent)
}

/// Claim a region without consulting the host, as done when restoring saved
/// groups. Still refuses to overlap existing claims.
pub fn claim_group(
    data: &mut MultiBlockRegistryData,
    origin: VoxelPos,
    direction: Direction,
    extent: GroupExtent,
) -> PlacementResult<GroupId> {
    let cells = group_cells(origin, direction, &extent);
    if let Some(&taken) = cells.iter().find(|c| data.claims.contains_key(c)) {
        return Err(PlacementError::Conflict(taken));
    }
    let bounds = cells_bounds(&cells).ok_or(PlacementError::Obstructed(origin))?;

    let id = GroupId(data.next_id);
    data.next_id += 1;
    for &cell in &cells {
        data.claims.insert(cell, id);
    }
    data.groups.insert(
        id,
        MultiBlockGroup {
            id,
            origin,
            direction,
            extent,
            cells,
            bounds,
        },
    );

    log::debug!("[MultiBlock::claim_group] Group {} formed at {}", id.0, origin);
    Ok(id)
}

/// Group owning `pos`, from any member
pub fn resolve_group(data: &MultiBlockRegistryData, pos: VoxelPos) -> Option<&MultiBlockGroup> {
    data.claims.get(&pos).and_then(|id| data.groups.get(id))
}

pub fn is_origin(data: &MultiBlockRegistryData, pos: VoxelPos) -> bool {
    resolve_group(data, pos).map_or(false, |g| g.origin == pos)
}

/// Release every cell of the group containing `pos`. The caller clears the
/// cells in the world.
pub fn destroy_group(data: &mut MultiBlockRegistryData, pos: VoxelPos) -> Option<MultiBlockGroup> {
    let id = *data.claims.get(&pos)?;
    let group = data.groups.remove(&id)?;
    for cell in &group.cells {
        data.claims.remove(cell);
    }
    log::debug!("[MultiBlock::destroy_group] Group {} at {} released", id.0, group.origin);
    Some(group)
}

/// Every group, ordered by id
pub fn all_groups(data: &MultiBlockRegistryData) -> Vec<&MultiBlockGroup> {
    let mut groups: Vec<_> = data.groups.values().collect();
    groups.sort_by_key(|g| g.id);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::geometry::HATCH_SIZE;
    use crate::world::{BlockId, BlockState, MemoryWorld};

    fn hatch_extent() -> GroupExtent {
        extent_of_size(HATCH_SIZE, 0)
    }

    #[test]
    fn test_form_group_claims_every_cell() {
        let world = MemoryWorld::new();
        let mut data = create_multiblock_registry();
        let origin = VoxelPos::new(0, 10, 0);

        let id = form_group(&mut data, &world, origin, Direction::South, hatch_extent()).expect("region is free");
        let group = resolve_group(&data, origin).expect("origin resolves");
        assert_eq!(group.id, id);
        assert_eq!(group.cells.len(), 12);
        for cell in &group.cells {
            assert_eq!(resolve_group(&data, *cell).map(|g| g.id), Some(id));
        }
        assert!(is_origin(&data, origin));
        assert!(!is_origin(&data, origin.up()));
    }

    #[test]
    fn test_rotation_keeps_origin_and_grows_toward_facing() {
        let origin = VoxelPos::new(5, 0, 5);
        let cells = group_cells(origin, Direction::North, &hatch_extent());
        assert!(cells.contains(&origin));
        assert!(cells.iter().all(|c| c.z <= origin.z && c.x <= origin.x));

        let bounds = cells_bounds(&cells).expect("non empty");
        assert_eq!(bounds.min, Point3::new(4.0, 0.0, 4.0));
        assert_eq!(bounds.max, Point3::new(6.0, 3.0, 6.0));
    }

    #[test]
    fn test_overlapping_group_rejected_without_side_effects() {
        let world = MemoryWorld::new();
        let mut data = create_multiblock_registry();
        form_group(&mut data, &world, VoxelPos::new(0, 0, 0), Direction::South, hatch_extent()).expect("first group");

        let claims_before = data.claims.len();
        let err = form_group(&mut data, &world, VoxelPos::new(1, 1, 1), Direction::South, hatch_extent())
            .expect_err("overlap refused");
        assert!(matches!(err, PlacementError::Conflict(_)));
        assert_eq!(data.groups.len(), 1);
        assert_eq!(data.claims.len(), claims_before);
    }

    #[test]
    fn test_occupied_cell_obstructs() {
        let mut world = MemoryWorld::new();
        world.set_block(VoxelPos::new(1, 2, 1), BlockState::new(BlockId::STONE, 0));
        let mut data = create_multiblock_registry();
        let err = form_group(&mut data, &world, VoxelPos::new(0, 0, 0), Direction::South, hatch_extent())
            .expect_err("stone in the way");
        assert_eq!(err, PlacementError::Obstructed(VoxelPos::new(1, 2, 1)));
        assert!(data.claims.is_empty());
    }

    #[test]
    fn test_destroy_from_any_member_releases_all() {
        let world = MemoryWorld::new();
        let mut data = create_multiblock_registry();
        let origin = VoxelPos::new(0, 0, 0);
        form_group(&mut data, &world, origin, Direction::East, hatch_extent()).expect("group forms");
        let member = resolve_group(&data, origin)
            .and_then(|g| g.cells.last().copied())
            .expect("has members");

        let group = destroy_group(&mut data, member).expect("group destroyed");
        assert_eq!(group.origin, origin);
        assert!(data.claims.is_empty());
        assert!(resolve_group(&data, origin).is_none());
        assert!(destroy_group(&mut data, origin).is_none());
    }
}
