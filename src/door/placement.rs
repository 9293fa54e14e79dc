//! Placement, breaking and neighbour callbacks
//!
//! Placement validates everything before writing a single cell, so a refused
//! placement leaves the world, the claims and the item stack untouched.

use std::sync::Arc;

use super::door_data::{DoorInstance, ItemStack, PlacementError, PlacementResult};
use super::door_operations::{create_door_instance, door_metadata, metadata_is_top};
use super::door_system::DoorSystem;
use crate::constants::geometry::{CARRIAGE_SIZE, HATCH_SIZE};
use crate::descriptor::{get_descriptor, DoorDescriptor};
use crate::movement::StructureKind;
use crate::multiblock::{destroy_group, extent_of_size, form_group, resolve_group, GroupExtent};
use crate::world::{BlockFace, BlockState, Direction, HostWorld, VoxelPos};

impl DoorSystem {
    fn check_item(descriptor: &DoorDescriptor, stack: &ItemStack, structure: StructureKind) -> PlacementResult<()> {
        if stack.is_empty() {
            return Err(PlacementError::EmptyStack);
        }
        if stack.item != descriptor.name {
            return Err(PlacementError::WrongItem {
                expected: descriptor.name.clone(),
                found: stack.item.clone(),
            });
        }
        match descriptor.movement.as_ref().map(|m| m.structure()) {
            Some(s) if s == structure => Ok(()),
            _ => Err(PlacementError::Incompatible(descriptor.name.clone())),
        }
    }

    fn ensure_free<W: HostWorld + ?Sized>(&self, world: &W, pos: VoxelPos) -> PlacementResult<()> {
        if self.doors.contains_key(&pos) || self.groups.claims.contains_key(&pos) {
            return Err(PlacementError::Conflict(pos));
        }
        if !world.is_replaceable(pos) {
            return Err(PlacementError::Obstructed(pos));
        }
        Ok(())
    }

    /// Leaf of the same type and facing next to `pos` whose hinge is not
    /// mirrored yet: placing beside it completes a double door
    fn detect_reversed(&self, pos: VoxelPos, facing: Direction, descriptor: &DoorDescriptor) -> bool {
        self.doors
            .get(&pos.towards(facing.rotate_cw()))
            .map_or(false, |neighbor| {
                !neighbor.reversed
                    && neighbor.direction == facing
                    && neighbor.descriptor.as_ref().map(|d| d.id) == Some(descriptor.id)
            })
    }

    /// Place a two-high door with its bottom at `pos`
    pub fn place_door<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        facing: Direction,
        descriptor: &Arc<DoorDescriptor>,
        stack: &mut ItemStack,
    ) -> PlacementResult<()> {
        Self::check_item(descriptor, stack, StructureKind::TwoHigh)?;
        self.ensure_free(world, pos)?;
        self.ensure_free(world, pos.up())?;
        if !world.is_side_solid(pos.down(), BlockFace::Up) {
            return Err(PlacementError::NoSupport(pos.down()));
        }

        let reversed = self.detect_reversed(pos, facing, descriptor);
        let door = create_door_instance(pos, Some(Arc::clone(descriptor)), facing, reversed, false);
        world.set_block(pos, BlockState::new(descriptor.id, door_metadata(&door, false)));
        world.set_block(pos.up(), BlockState::new(descriptor.id, door_metadata(&door, true)));
        self.doors.insert(pos, door);
        stack.count -= 1;

        world.notify_neighbors(pos);
        world.notify_neighbors(pos.up());
        log::debug!(
            "[DoorSystem::place_door] Placed '{}' at {} facing {:?} (reversed: {})",
            descriptor.name,
            pos,
            facing,
            reversed
        );
        Ok(())
    }

    /// Place a one-cell trapdoor hinged against the `facing` side of `pos`
    pub fn place_trapdoor<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        facing: Direction,
        top_half: bool,
        descriptor: &Arc<DoorDescriptor>,
        stack: &mut ItemStack,
    ) -> PlacementResult<()> {
        Self::check_item(descriptor, stack, StructureKind::Single)?;
        self.ensure_free(world, pos)?;
        let wall = pos.towards(facing);
        if !world.is_side_solid(wall, facing.opposite().to_face()) {
            return Err(PlacementError::NoSupport(wall));
        }

        let door = create_door_instance(pos, Some(Arc::clone(descriptor)), facing, false, top_half);
        world.set_block(pos, BlockState::new(descriptor.id, door_metadata(&door, false)));
        self.doors.insert(pos, door);
        stack.count -= 1;

        world.notify_neighbors(pos);
        log::debug!("[DoorSystem::place_trapdoor] Placed '{}' at {}", descriptor.name, pos);
        Ok(())
    }

    /// Place a rusty hatch against the `face` of a wall, `hit_y` being the
    /// height within the clicked face. The hatch claims a 2x3x2 region that
    /// hangs two cells lower when placed on the lower half.
    pub fn place_hatch<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        face: BlockFace,
        hit_y: f32,
        descriptor: &Arc<DoorDescriptor>,
        stack: &mut ItemStack,
    ) -> PlacementResult<()> {
        Self::check_item(descriptor, stack, StructureKind::Group)?;
        let direction = face.horizontal().ok_or(PlacementError::UnsupportedFace(face))?;
        let wall = pos.across(face.opposite());
        if !world.is_side_solid(wall, face) {
            return Err(PlacementError::NoSupport(wall));
        }

        let top_half = hit_y > 0.5;
        let extent = extent_of_size(HATCH_SIZE, if top_half { 0 } else { -2 });
        let door = create_door_instance(pos, Some(Arc::clone(descriptor)), direction, false, top_half);
        let cells = self.place_group(world, door, extent, descriptor, stack)?;
        log::debug!(
            "[DoorSystem::place_hatch] Placed '{}' at {} facing {:?} ({} cells)",
            descriptor.name,
            pos,
            direction,
            cells
        );
        Ok(())
    }

    /// Place a carriage door standing on the floor at `pos`. The gate claims
    /// a 4x5x1 region starting at `pos`.
    pub fn place_carriage_door<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        facing: Direction,
        descriptor: &Arc<DoorDescriptor>,
        stack: &mut ItemStack,
    ) -> PlacementResult<()> {
        Self::check_item(descriptor, stack, StructureKind::Group)?;
        if !world.is_side_solid(pos.down(), BlockFace::Up) {
            return Err(PlacementError::NoSupport(pos.down()));
        }

        let extent = extent_of_size(CARRIAGE_SIZE, 0);
        let door = create_door_instance(pos, Some(Arc::clone(descriptor)), facing, false, false);
        let cells = self.place_group(world, door, extent, descriptor, stack)?;
        log::debug!(
            "[DoorSystem::place_carriage_door] Placed '{}' at {} facing {:?} ({} cells)",
            descriptor.name,
            pos,
            facing,
            cells
        );
        Ok(())
    }

    /// Claim the region of a group door and write every member cell.
    /// Returns the number of cells written.
    fn place_group<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        door: DoorInstance,
        extent: GroupExtent,
        descriptor: &DoorDescriptor,
        stack: &mut ItemStack,
    ) -> PlacementResult<usize> {
        let (pos, direction) = (door.pos, door.direction);
        form_group(&mut self.groups, &*world, pos, direction, extent)?;

        let cells = self.structure_cells_of_group(pos);
        for cell in &cells {
            let meta = if *cell == pos { door_metadata(&door, false) } else { direction.index() };
            world.set_block(*cell, BlockState::new(descriptor.id, meta));
        }
        self.doors.insert(pos, door);
        stack.count -= 1;

        for cell in &cells {
            world.notify_neighbors(*cell);
        }
        Ok(cells.len())
    }

    fn structure_cells_of_group(&self, origin: VoxelPos) -> Vec<VoxelPos> {
        resolve_group(&self.groups, origin)
            .map(|g| g.cells.clone())
            .unwrap_or_else(|| vec![origin])
    }

    /// Place one garage door segment. Segments stacked with the same facing
    /// form one door.
    pub fn place_garage_segment<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        facing: Direction,
        descriptor: &Arc<DoorDescriptor>,
        stack: &mut ItemStack,
    ) -> PlacementResult<()> {
        Self::check_item(descriptor, stack, StructureKind::Stacked)?;
        self.ensure_free(world, pos)?;

        let door = create_door_instance(pos, Some(Arc::clone(descriptor)), facing, false, false);
        world.set_block(pos, BlockState::new(descriptor.id, door_metadata(&door, false)));
        self.doors.insert(pos, door);
        stack.count -= 1;

        world.notify_neighbors(pos);
        log::debug!("[DoorSystem::place_garage_segment] Placed segment at {}", pos);
        Ok(())
    }

    /// Remove the structure owning `pos`. Doors lose both halves, groups every
    /// member, garage doors only the broken segment. Returns the item to drop.
    pub fn break_block<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos) -> Option<ItemStack> {
        let inst = self.instance_pos(pos)?;
        let structure = self.doors.get(&inst).and_then(Self::structure_of);
        let region = self.collision_region(inst);

        let cells = match structure {
            Some(StructureKind::Group) => destroy_group(&mut self.groups, inst)
                .map(|g| g.cells)
                .unwrap_or_else(|| vec![inst]),
            Some(StructureKind::TwoHigh) => vec![inst, inst.up()],
            _ => vec![inst],
        };
        let door = self.doors.remove(&inst)?;

        for cell in &cells {
            world.set_air(*cell);
        }
        for cell in &cells {
            world.notify_neighbors(*cell);
        }
        if let Some(region) = region {
            world.recompute_collision(region);
        }

        log::debug!("[DoorSystem::break_block] Removed structure at {} ({} cells)", inst, cells.len());
        door.descriptor.map(|d| ItemStack::new(d.name.clone(), 1))
    }

    /// React to a change next to `pos`: heal orphaned halves and forward
    /// power changes. Returns the item to drop when the door broke.
    pub fn on_neighbor_changed<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos) -> Option<ItemStack> {
        // A group member cleared by the host takes the whole group with it
        if let Some(origin) = resolve_group(&self.groups, pos).map(|g| g.origin) {
            return self.heal_group(world, origin);
        }

        let cell = world.block(pos);
        if cell.is_air() {
            return None;
        }

        let Some(inst) = self.instance_pos(pos) else {
            // A top half whose bottom is gone
            let orphan_top = get_descriptor(&self.registry, cell.id)
                .and_then(|d| d.movement.as_ref().map(|m| m.structure()))
                == Some(StructureKind::TwoHigh)
                && metadata_is_top(cell.metadata);
            if orphan_top {
                log::info!("[DoorSystem::on_neighbor_changed] Removing orphaned top half at {}", pos);
                world.set_air(pos);
                world.notify_neighbors(pos);
            }
            return None;
        };

        let door = self.doors.get(&inst)?;
        if Self::structure_of(door) == Some(StructureKind::Group) {
            return self.heal_group(world, inst);
        }
        if Self::structure_of(door) == Some(StructureKind::TwoHigh) {
            let id = door.descriptor.as_ref().map(|d| d.id);
            let bottom_ok = Some(world.block(inst).id) == id;
            let top_ok = Some(world.block(inst.up()).id) == id;
            let ground_ok = world.is_side_solid(inst.down(), BlockFace::Up);

            if !(bottom_ok && top_ok && ground_ok) {
                log::info!(
                    "[DoorSystem::on_neighbor_changed] Door at {} lost its {}, removing it",
                    inst,
                    if !ground_ok { "support" } else { "other half" }
                );
                let drop = door.descriptor.as_ref().map(|d| ItemStack::new(d.name.clone(), 1));
                let region = self.collision_region(inst);
                for cell in [inst, inst.up()] {
                    if Some(world.block(cell).id) == id {
                        world.set_air(cell);
                    }
                    world.notify_neighbors(cell);
                }
                self.doors.remove(&inst);
                if let Some(region) = region {
                    world.recompute_collision(region);
                }
                return drop;
            }
        }

        let was_powered = door.powered;
        let powered = self.structure_cells(inst).iter().any(|c| world.receives_power(*c));
        if powered != was_powered {
            self.set_powered(world, inst, powered);
        }
        None
    }

    /// Remove a group one of whose cells no longer holds its block. Returns
    /// the item to drop when the group broke.
    fn heal_group<W: HostWorld + ?Sized>(&mut self, world: &mut W, origin: VoxelPos) -> Option<ItemStack> {
        let id = self.doors.get(&origin).and_then(|d| d.descriptor.as_ref()).map(|d| d.id);
        let intact = match (resolve_group(&self.groups, origin), id) {
            (Some(group), Some(id)) => group.cells.iter().all(|c| world.block(*c).id == id),
            _ => false,
        };
        if intact {
            let powered = self.structure_cells(origin).iter().any(|c| world.receives_power(*c));
            if self.doors.get(&origin).map_or(false, |d| d.powered != powered) {
                self.set_powered(world, origin, powered);
            }
            return None;
        }

        let region = self.collision_region(origin);
        let cells = destroy_group(&mut self.groups, origin)
            .map(|g| g.cells)
            .unwrap_or_else(|| vec![origin]);
        for cell in &cells {
            if id.map_or(false, |id| world.block(*cell).id == id) {
                world.set_air(*cell);
            }
        }
        for cell in &cells {
            world.notify_neighbors(*cell);
        }
        if let Some(region) = region {
            world.recompute_collision(region);
        }

        let door = self.doors.remove(&origin);
        log::info!(
            "[DoorSystem::on_neighbor_changed] Group at {} lost a member, removing {} cells",
            origin,
            cells.len()
        );
        door.and_then(|d| d.descriptor).map(|d| ItemStack::new(d.name.clone(), 1))
    }
}
