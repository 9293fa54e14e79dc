//! Door system
//!
//! Owns every door instance of a world together with the descriptor registry
//! and the multi-block claims. The host drives it: `tick` once per world
//! tick, `toggle`/`set_powered`/`ai_activate` from interaction handlers, and
//! the placement and topology callbacks in placement.rs. Per-tick operations
//! never fail; unknown positions and inert doors are logged no-ops.

use std::sync::Arc;

use cgmath::Matrix4;
use rustc_hash::{FxHashMap, FxHashSet};

use super::door_data::{DoorInstance, DoorState};
use super::door_operations::{
    auto_close_due, begin_transition, completion_sound, door_metadata, door_movement, is_operable,
    powered_target, requires_external_trigger, settle_transition, toggle_target,
};
use crate::animation::AnimationTimeline;
use crate::descriptor::{
    create_descriptor_registry, get_descriptor_by_name, load_descriptor_file, register_builtin_descriptors,
    register_descriptor, DescriptorDef, DescriptorRegistryData, DoorDescriptor,
};
use crate::error::DoorResult;
use crate::movement::{MovementContext, StackPosition, StructureKind};
use crate::multiblock::{create_multiblock_registry, resolve_group, MultiBlockRegistryData};
use crate::physics::aabb::{aabb_at, aabb_expanded, aabb_identity, aabb_union};
use crate::physics::{BoundingBoxType, AABB};
use crate::world::{BlockState, Direction, HostWorld, VoxelPos};
use crate::DoorsConfig;

/// Every movable block of one world
pub struct DoorSystem {
    pub(crate) registry: DescriptorRegistryData,
    pub(crate) doors: FxHashMap<VoxelPos, DoorInstance>,
    pub(crate) groups: MultiBlockRegistryData,
    pub(crate) current_tick: u64,
    pub(crate) config: DoorsConfig,
}

impl DoorSystem {
    /// Build a system from a validated configuration, registering the
    /// built-in door types and the configured descriptor file
    pub fn new(config: DoorsConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let mut registry = create_descriptor_registry();
        if config.register_builtin_descriptors {
            register_builtin_descriptors(&mut registry)?;
        }
        if let Some(path) = &config.descriptor_file {
            load_descriptor_file(&mut registry, path)?;
        }

        log::info!(
            "[DoorSystem] Initialized with {} door types",
            registry.registrations.len()
        );

        Ok(Self {
            registry,
            doors: FxHashMap::default(),
            groups: create_multiblock_registry(),
            current_tick: 0,
            config,
        })
    }

    pub fn config(&self) -> &DoorsConfig {
        &self.config
    }

    pub fn registry(&self) -> &DescriptorRegistryData {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DescriptorRegistryData {
        &mut self.registry
    }

    pub fn groups(&self) -> &MultiBlockRegistryData {
        &self.groups
    }

    /// Register an additional door type
    pub fn register_descriptor(&mut self, def: &DescriptorDef) -> DoorResult<Arc<DoorDescriptor>> {
        register_descriptor(&mut self.registry, def)
    }

    pub fn descriptor(&self, name: &str) -> Option<Arc<DoorDescriptor>> {
        get_descriptor_by_name(&self.registry, name)
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Align the internal tick counter with the host's
    pub fn set_current_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    pub fn instance_count(&self) -> usize {
        self.doors.len()
    }

    /// Instance governing the cell at `pos`, from any cell of its structure
    pub fn instance(&self, pos: VoxelPos) -> Option<&DoorInstance> {
        self.instance_pos(pos).and_then(|p| self.doors.get(&p))
    }

    // ========================================================================
    // STRUCTURE RESOLUTION
    // ========================================================================

    pub(crate) fn structure_of(door: &DoorInstance) -> Option<StructureKind> {
        door_movement(door).map(|m| m.structure())
    }

    /// Position of the instance owning the cell at `pos`
    pub fn instance_pos(&self, pos: VoxelPos) -> Option<VoxelPos> {
        if self.doors.contains_key(&pos) {
            return Some(pos);
        }
        if let Some(group) = resolve_group(&self.groups, pos) {
            return self.doors.contains_key(&group.origin).then_some(group.origin);
        }
        let below = pos.down();
        self.doors
            .get(&below)
            .filter(|d| Self::structure_of(d) == Some(StructureKind::TwoHigh))
            .map(|_| below)
    }

    fn same_column(&self, a: VoxelPos, b: VoxelPos) -> bool {
        match (self.doors.get(&a), self.doors.get(&b)) {
            (Some(x), Some(y)) => {
                Self::structure_of(x) == Some(StructureKind::Stacked)
                    && x.descriptor.as_ref().map(|d| d.id) == y.descriptor.as_ref().map(|d| d.id)
                    && x.direction == y.direction
                    && x.state == y.state
            }
            _ => false,
        }
    }

    /// Elected owner of a structure. Garage segments walk up to the top
    /// segment of their column; every other structure owns itself.
    pub fn owner(&self, pos: VoxelPos) -> Option<VoxelPos> {
        let inst = self.instance_pos(pos)?;
        let mut top = inst;
        while self.same_column(top, top.up()) {
            top = top.up();
        }
        Some(top)
    }

    /// Garage column from its top segment down
    pub(crate) fn garage_column(&self, owner: VoxelPos) -> Vec<VoxelPos> {
        let mut column = vec![owner];
        let mut cur = owner;
        while self.same_column(cur, cur.down()) {
            cur = cur.down();
            column.push(cur);
        }
        column
    }

    /// Instances that change state together, leader first
    fn members(&self, inst: VoxelPos) -> Vec<VoxelPos> {
        match self.doors.get(&inst).and_then(Self::structure_of) {
            Some(StructureKind::Stacked) => self.garage_column(self.owner(inst).unwrap_or(inst)),
            _ => vec![inst],
        }
    }

    /// World cells occupied by the structure of `inst`
    pub(crate) fn structure_cells(&self, inst: VoxelPos) -> Vec<VoxelPos> {
        match self.doors.get(&inst).and_then(Self::structure_of) {
            Some(StructureKind::TwoHigh) => vec![inst, inst.up()],
            Some(StructureKind::Group) => resolve_group(&self.groups, inst)
                .map(|g| g.cells.clone())
                .unwrap_or_else(|| vec![inst]),
            Some(StructureKind::Stacked) => self.members(inst),
            _ => vec![inst],
        }
    }

    /// Adjacent leaf of a double door, mirrored hinge and same facing
    pub(crate) fn partner(&self, inst: VoxelPos) -> Option<VoxelPos> {
        let door = self.doors.get(&inst)?;
        let descriptor = door.descriptor.as_ref()?;
        if !descriptor.double_door {
            return None;
        }
        let side = if door.reversed {
            door.direction.rotate_cw()
        } else {
            door.direction.rotate_ccw()
        };
        let candidate = inst.towards(side);
        self.doors
            .get(&candidate)
            .filter(|other| {
                other.direction == door.direction
                    && other.reversed != door.reversed
                    && other.descriptor.as_ref().map(|d| d.id) == Some(descriptor.id)
            })
            .map(|_| candidate)
    }

    /// Ticks a transition of this structure lasts
    pub(crate) fn opening_time_at(&self, inst: VoxelPos) -> u32 {
        let Some(door) = self.doors.get(&inst) else {
            return 0;
        };
        match Self::structure_of(door) {
            Some(StructureKind::Stacked) => {
                let owner = self.owner(inst).unwrap_or(inst);
                self.garage_column(owner).len() as u32 * self.config.garage_segment_ticks
            }
            _ => door.descriptor.as_ref().map_or(0, |d| d.opening_time),
        }
    }

    fn context_for(&self, inst: VoxelPos, cell: VoxelPos) -> Option<MovementContext<'_>> {
        let door = self.doors.get(&inst)?;
        let mut ctx = MovementContext::new(door, cell, self.opening_time_at(inst));
        ctx.segment_ticks = self.config.garage_segment_ticks;
        match Self::structure_of(door)? {
            StructureKind::Group => {
                ctx.group_bounds = resolve_group(&self.groups, inst).map(|g| g.bounds);
            }
            StructureKind::Stacked => {
                let owner = self.owner(inst)?;
                let count = self.garage_column(owner).len() as u32;
                ctx.stack = Some(StackPosition {
                    index_from_top: (owner.y - cell.y).max(0) as u32,
                    count,
                });
            }
            StructureKind::TwoHigh | StructureKind::Single => {}
        }
        Some(ctx)
    }

    // ========================================================================
    // GAME LOGIC
    // ========================================================================

    /// User activation. Ignored for doors that need an external trigger.
    /// Double doors toggle both leaves.
    pub fn toggle<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos) -> bool {
        let Some(inst) = self.instance_pos(pos) else {
            log::debug!("[DoorSystem::toggle] No door at {}", pos);
            return false;
        };
        let Some(door) = self.doors.get(&inst) else {
            return false;
        };
        if !is_operable(door) {
            log::warn!("[DoorSystem::toggle] Door at {} has no movement, ignoring", inst);
            return false;
        }
        if requires_external_trigger(door) {
            log::debug!("[DoorSystem::toggle] Door at {} only reacts to power", inst);
            return false;
        }

        let target = toggle_target(door.state);
        let partner = self.partner(inst);
        let changed = self.drive(world, inst, target);
        if changed {
            if let Some(p) = partner {
                self.mirror_onto(world, inst, p);
            }
        }
        changed
    }

    /// External power signal. Drives doors that require a trigger toward
    /// opened (powered) or closed (unpowered); idempotent.
    pub fn set_powered<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos, powered: bool) -> bool {
        let Some(inst) = self.instance_pos(pos) else {
            log::debug!("[DoorSystem::set_powered] No door at {}", pos);
            return false;
        };
        let Some(door) = self.doors.get(&inst) else {
            return false;
        };
        if !is_operable(door) {
            log::warn!("[DoorSystem::set_powered] Door at {} has no movement, ignoring", inst);
            return false;
        }

        if Self::structure_of(door) == Some(StructureKind::Stacked) {
            let mut visited = FxHashSet::default();
            return self.power_garage(world, inst, powered, &mut visited);
        }

        let trigger = requires_external_trigger(door);
        if let Some(door) = self.doors.get_mut(&inst) {
            door.powered = powered;
        }
        if !trigger {
            self.sync_metadata(world, inst);
            return false;
        }

        let partner = self.partner(inst);
        let changed = self.drive(world, inst, powered_target(powered));
        if changed {
            if let Some(p) = partner {
                if let Some(other) = self.doors.get_mut(&p) {
                    other.powered = powered;
                }
                self.mirror_onto(world, inst, p);
            }
        }
        changed
    }

    fn power_garage<W: HostWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: VoxelPos,
        powered: bool,
        visited: &mut FxHashSet<VoxelPos>,
    ) -> bool {
        let Some(owner) = self.owner(pos) else {
            return false;
        };
        if !visited.insert(owner) {
            return false;
        }

        for member in self.garage_column(owner) {
            if let Some(segment) = self.doors.get_mut(&member) {
                segment.powered = powered;
            }
        }
        let changed = self.drive(world, owner, powered_target(powered));
        if !changed {
            self.sync_metadata(world, owner);
            return false;
        }

        // The signal spreads to neighbouring columns facing the same way
        let Some(direction) = self.doors.get(&owner).map(|d| d.direction) else {
            return true;
        };
        for side in [direction.rotate_cw(), direction.rotate_ccw()] {
            let neighbor = owner.towards(side);
            let joins = self.doors.get(&neighbor).map_or(false, |n| {
                n.direction == direction && Self::structure_of(n) == Some(StructureKind::Stacked)
            });
            if joins {
                self.power_garage(world, neighbor, powered, visited);
            }
        }
        true
    }

    /// Activation by a mob. Ignored for triggered doors and when asked to
    /// open an already opened door.
    pub fn ai_activate<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos, opening: bool) -> bool {
        let Some(door) = self.instance(pos) else {
            return false;
        };
        if requires_external_trigger(door) || (opening && door.state.is_opened()) {
            return false;
        }
        self.toggle(world, pos)
    }

    /// Advance one world tick and update every structure
    pub fn tick<W: HostWorld + ?Sized>(&mut self, world: &mut W) {
        self.current_tick += 1;

        let mut positions: Vec<VoxelPos> = self.doors.keys().copied().collect();
        positions.sort_unstable();
        for pos in positions {
            if self.owner(pos) == Some(pos) {
                self.update_instance(world, pos);
            }
        }
    }

    /// Update the structure at `pos` for the current tick
    pub fn update<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos) {
        if let Some(owner) = self.owner(pos) {
            self.update_instance(world, owner);
        }
    }

    /// Deferred update requested through `HostWorld::schedule_update`
    pub fn scheduled_update<W: HostWorld + ?Sized>(&mut self, world: &mut W, pos: VoxelPos) {
        self.update(world, pos);
    }

    fn update_instance<W: HostWorld + ?Sized>(&mut self, world: &mut W, leader: VoxelPos) {
        let now = self.current_tick;
        let Some(door) = self.doors.get(&leader) else {
            return;
        };
        if !is_operable(door) {
            return;
        }

        if auto_close_due(door, now) && !requires_external_trigger(door) {
            log::debug!("[DoorSystem::update] Auto-closing door at {}", leader);
            let partner = self.partner(leader);
            if self.drive(world, leader, DoorState::Closing) {
                if let Some(p) = partner {
                    self.mirror_onto(world, leader, p);
                }
            }
            return;
        }
        if !door.state.is_moving() {
            return;
        }

        let opening_time = self.opening_time_at(leader);
        let members = self.members(leader);
        let region_before = self.collision_region(leader);

        let Some(door) = self.doors.get_mut(&leader) else {
            return;
        };
        let Some(settled) = settle_transition(door, now, opening_time) else {
            return;
        };
        let snapshot = door.clone();
        self.copy_state(&snapshot, &members);

        log::debug!(
            "[DoorSystem::update] Door at {} is now {} (tick {})",
            leader,
            settled.as_str(),
            now
        );

        if let Some(sound) = completion_sound(&snapshot) {
            world.play_sound(leader, sound);
        }
        if let (Some(due), Some(descriptor)) = (snapshot.auto_close_tick, &snapshot.descriptor) {
            log::debug!(
                "[DoorSystem::update] Door at {} closes itself after {} ticks",
                leader,
                descriptor.auto_close_time
            );
            world.schedule_update(leader, due.saturating_sub(now) as u32);
        }
        self.after_state_change(world, leader, region_before);
    }

    /// Enter `target` on the whole structure of `inst`
    fn drive<W: HostWorld + ?Sized>(&mut self, world: &mut W, inst: VoxelPos, target: DoorState) -> bool {
        let members = self.members(inst);
        let leader = members[0];
        let opening_time = self.opening_time_at(leader);
        let region_before = self.collision_region(leader);
        let now = self.current_tick;

        let Some(door) = self.doors.get_mut(&leader) else {
            return false;
        };
        if !begin_transition(door, target, now, opening_time) {
            return false;
        }
        let snapshot = door.clone();
        self.copy_state(&snapshot, &members);

        log::debug!(
            "[DoorSystem::drive] Door at {} is now {} (tick {})",
            leader,
            target.as_str(),
            now
        );
        self.after_state_change(world, leader, region_before);
        true
    }

    /// Give `to` the exact state and timer of `from`
    fn mirror_onto<W: HostWorld + ?Sized>(&mut self, world: &mut W, from: VoxelPos, to: VoxelPos) {
        let Some(source) = self.doors.get(&from).cloned() else {
            return;
        };
        let region_before = self.collision_region(to);
        if let Some(door) = self.doors.get_mut(&to) {
            door.state = source.state;
            door.timer = source.timer;
            door.auto_close_tick = source.auto_close_tick;
        }
        self.after_state_change(world, to, region_before);
    }

    fn copy_state(&mut self, source: &DoorInstance, members: &[VoxelPos]) {
        for member in members.iter().skip(1) {
            if let Some(door) = self.doors.get_mut(member) {
                door.state = source.state;
                door.timer = source.timer;
                door.auto_close_tick = source.auto_close_tick;
            }
        }
    }

    fn after_state_change<W: HostWorld + ?Sized>(&mut self, world: &mut W, inst: VoxelPos, before: Option<AABB>) {
        for member in self.members(inst) {
            self.sync_metadata(world, member);
        }
        let after = self.collision_region(inst);
        let region = match (before, after) {
            (Some(a), Some(b)) => Some(aabb_union(&a, &b)),
            (a, b) => a.or(b),
        };
        if let Some(region) = region {
            world.recompute_collision(region);
        }
    }

    /// Write the instance's flags into the metadata of its cells
    pub(crate) fn sync_metadata<W: HostWorld + ?Sized>(&self, world: &mut W, inst: VoxelPos) {
        let Some(door) = self.doors.get(&inst) else {
            return;
        };
        let Some(id) = door.descriptor.as_ref().map(|d| d.id) else {
            return;
        };
        let mut cells = vec![(inst, false)];
        if Self::structure_of(door) == Some(StructureKind::TwoHigh) {
            cells.push((inst.up(), true));
        }
        for (cell, top) in cells {
            if world.block(cell).id == id {
                world.set_block(cell, BlockState::new(id, door_metadata(door, top)));
            }
        }
    }

    /// World-space union of every cell and box of the structure
    pub(crate) fn collision_region(&self, inst: VoxelPos) -> Option<AABB> {
        let cells = self.structure_cells(inst);
        let mut region: Option<AABB> = None;
        for cell in cells {
            let mut boxes = vec![aabb_at(&aabb_identity(), cell)];
            for kind in [BoundingBoxType::Collision, BoundingBoxType::Selection] {
                if let Some(b) = self.bounding_box(cell, kind) {
                    boxes.push(aabb_at(&b, cell));
                }
            }
            for b in boxes {
                region = Some(match region {
                    Some(r) => aabb_union(&r, &b),
                    None => b,
                });
            }
        }
        region
    }

    // ========================================================================
    // RENDERER QUERIES (read only)
    // ========================================================================

    /// Block-local box of the cell at `pos`
    pub fn bounding_box(&self, pos: VoxelPos, kind: BoundingBoxType) -> Option<AABB> {
        let inst = self.instance_pos(pos)?;
        let door = self.doors.get(&inst)?;
        let movement = door_movement(door)?;
        let ctx = self.context_for(inst, pos)?;
        let top_half = movement.structure() == StructureKind::TwoHigh && pos != inst;
        movement.bounding_box(&ctx, top_half, kind)
    }

    /// Timelines of the structure at `pos`. Garage columns are described
    /// from their top segment.
    pub fn describe_animation(&self, pos: VoxelPos) -> Option<AnimationTimeline> {
        let owner = self.owner(pos)?;
        let door = self.doors.get(&owner)?;
        let movement = door_movement(door)?;
        let ctx = self.context_for(owner, owner)?;
        Some(movement.describe_animation(&ctx))
    }

    /// Part poses for the frame at `partial_tick` past the current tick
    pub fn sample_poses(&self, pos: VoxelPos, partial_tick: f32) -> Vec<(String, Matrix4<f32>)> {
        self.describe_animation(pos)
            .map(|timeline| timeline.sample(self.current_tick as f32 + partial_tick))
            .unwrap_or_default()
    }

    /// World box the renderer must consider for the whole structure
    pub fn render_bounds(&self, pos: VoxelPos) -> Option<AABB> {
        let owner = self.owner(pos)?;
        let door = self.doors.get(&owner)?;
        if Self::structure_of(door) == Some(StructureKind::Stacked) {
            let count = self.garage_column(owner).len() as f32;
            return Some(aabb_expanded(&aabb_at(&aabb_identity(), owner), count));
        }
        self.collision_region(owner)
    }

    /// Whether entities can climb the cell at `pos`
    pub fn is_ladder(&self, pos: VoxelPos) -> bool {
        let Some(inst) = self.instance_pos(pos) else {
            return false;
        };
        let (Some(door), Some(ctx)) = (self.doors.get(&inst), self.context_for(inst, pos)) else {
            return false;
        };
        door_movement(door).map_or(false, |m| m.is_ladder(&ctx))
    }

    pub fn state(&self, pos: VoxelPos) -> Option<DoorState> {
        self.instance(pos).map(|d| d.state)
    }

    pub fn direction(&self, pos: VoxelPos) -> Option<Direction> {
        self.instance(pos).map(|d| d.direction)
    }

    pub fn is_reversed(&self, pos: VoxelPos) -> Option<bool> {
        self.instance(pos).map(|d| d.reversed)
    }

    pub fn is_powered(&self, pos: VoxelPos) -> Option<bool> {
        self.instance(pos).map(|d| d.powered)
    }

    /// Tick the current transition of the structure started at
    pub fn transition_start_tick(&self, pos: VoxelPos) -> Option<i64> {
        self.instance(pos).map(|d| d.timer.start_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::ItemStack;
    use crate::physics::aabb::aabb_contains_point;
    use crate::world::MemoryWorld;
    use crate::DoorsConfig;
    use cgmath::{Point3, SquareMatrix};

    fn system() -> DoorSystem {
        let _ = env_logger::builder().is_test(true).try_init();
        DoorSystem::new(DoorsConfig::default()).expect("default config is valid")
    }

    fn place(sys: &mut DoorSystem, world: &mut MemoryWorld, name: &str, pos: VoxelPos) {
        let descriptor = sys.descriptor(name).expect("registered descriptor");
        let mut stack = ItemStack::new(name, 1);
        sys.place_door(world, pos, Direction::North, &descriptor, &mut stack)
            .expect("placement succeeds");
    }

    fn place_garage_column(sys: &mut DoorSystem, world: &mut MemoryWorld, x: i32, height: i32) {
        let garage = sys.descriptor("garage_door").expect("built-in");
        let mut stack = ItemStack::new("garage_door", height as u32);
        for y in 1..=height {
            sys.place_garage_segment(world, VoxelPos::new(x, y, 0), Direction::North, &garage, &mut stack)
                .expect("segment fits");
        }
    }

    fn is_identity(pose: &Matrix4<f32>) -> bool {
        let identity = Matrix4::<f32>::identity();
        (0..4).all(|c| (0..4).all(|r| (pose[c][r] - identity[c][r]).abs() < 1e-5))
    }

    fn run_ticks(sys: &mut DoorSystem, world: &mut MemoryWorld, ticks: u32) {
        for _ in 0..ticks {
            sys.tick(world);
        }
    }

    #[test]
    fn test_toggle_opens_after_opening_time() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);
        world.clear_events();

        assert!(sys.toggle(&mut world, pos));
        assert_eq!(sys.state(pos), Some(DoorState::Opening));
        assert_eq!(sys.transition_start_tick(pos), Some(0));
        assert!(!world.collision_updates.is_empty());

        for tick in 1..=5 {
            sys.tick(&mut world);
            assert_eq!(sys.state(pos), Some(DoorState::Opening), "tick {}", tick);
        }
        sys.tick(&mut world);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));
        assert_eq!(world.sound_count("door.wood.open"), 1);
        assert_eq!(world.sounds[0].0, pos);

        run_ticks(&mut sys, &mut world, 10);
        assert_eq!(world.sound_count("door.wood.open"), 1);
    }

    #[test]
    fn test_toggle_from_top_half_drives_door() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);

        assert!(sys.toggle(&mut world, pos.up()));
        assert_eq!(sys.state(pos), Some(DoorState::Opening));
        assert!(!sys.toggle(&mut world, VoxelPos::new(3, 1, 3)));
    }

    #[test]
    fn test_triggered_door_ignores_toggle_and_follows_power() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "iron_door", pos);

        assert!(!sys.toggle(&mut world, pos));
        assert_eq!(sys.state(pos), Some(DoorState::Closed));

        assert!(sys.set_powered(&mut world, pos, true));
        assert_eq!(sys.state(pos), Some(DoorState::Opening));
        assert_eq!(sys.is_powered(pos), Some(true));
        run_ticks(&mut sys, &mut world, 6);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));

        // Repeated signal changes nothing
        assert!(!sys.set_powered(&mut world, pos, true));
        run_ticks(&mut sys, &mut world, 6);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));
        assert_eq!(world.sound_count("door.iron.open"), 1);

        assert!(sys.set_powered(&mut world, pos, false));
        assert_eq!(sys.state(pos), Some(DoorState::Closing));
        run_ticks(&mut sys, &mut world, 6);
        assert_eq!(sys.state(pos), Some(DoorState::Closed));
        assert_eq!(world.sound_count("door.iron.close"), 1);
    }

    #[test]
    fn test_power_on_untriggered_door_only_records_flag() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);

        assert!(!sys.set_powered(&mut world, pos, true));
        assert_eq!(sys.state(pos), Some(DoorState::Closed));
        assert_eq!(sys.is_powered(pos), Some(true));
    }

    #[test]
    fn test_double_door_leaves_move_together() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let left = VoxelPos::new(0, 1, 0);
        let right = left.towards(Direction::West);
        place(&mut sys, &mut world, "laboratory_door", left);
        place(&mut sys, &mut world, "laboratory_door", right);

        assert!(sys.toggle(&mut world, right));
        assert_eq!(sys.state(left), Some(DoorState::Opening));
        assert_eq!(sys.state(right), Some(DoorState::Opening));
        assert_eq!(sys.transition_start_tick(left), sys.transition_start_tick(right));

        run_ticks(&mut sys, &mut world, 10);
        assert_eq!(sys.state(left), Some(DoorState::Opened));
        assert_eq!(sys.state(right), Some(DoorState::Opened));

        assert!(sys.toggle(&mut world, left));
        assert_eq!(sys.state(right), Some(DoorState::Closing));
    }

    #[test]
    fn test_reversal_mid_transition_is_continuous() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);

        sys.toggle(&mut world, pos);
        run_ticks(&mut sys, &mut world, 2);
        assert!(sys.toggle(&mut world, pos));
        assert_eq!(sys.state(pos), Some(DoorState::Closing));
        assert_eq!(sys.transition_start_tick(pos), Some(-2));

        sys.tick(&mut world);
        assert_eq!(sys.state(pos), Some(DoorState::Closing));
        sys.tick(&mut world);
        assert_eq!(sys.state(pos), Some(DoorState::Closed));
        assert_eq!(world.sound_count("door.wood.open"), 0);
        assert_eq!(world.sound_count("door.wood.close"), 1);
    }

    #[test]
    fn test_state_cycle_never_skips_a_state() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "jail_door", pos);

        let mut seen = vec![DoorState::Closed];
        sys.toggle(&mut world, pos);
        for _ in 0..40 {
            if sys.state(pos) == Some(DoorState::Opened) {
                sys.toggle(&mut world, pos);
            }
            sys.tick(&mut world);
            let state = sys.state(pos).expect("door exists");
            if seen.last() != Some(&state) {
                seen.push(state);
            }
        }
        for pair in seen.windows(2) {
            let expected = match pair[0] {
                DoorState::Closed => DoorState::Opening,
                DoorState::Opening => DoorState::Opened,
                DoorState::Opened => DoorState::Closing,
                DoorState::Closing => DoorState::Closed,
            };
            assert_eq!(pair[1], expected, "sequence {:?}", seen);
        }
    }

    #[test]
    fn test_auto_close_schedules_and_closes() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let def: DescriptorDef = toml::from_str(
            r#"
                name = "swing_door"
                movement = "hinge"
                auto_close_time = 20
            "#,
        )
        .expect("valid toml");
        sys.register_descriptor(&def).expect("valid descriptor");
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "swing_door", pos);

        sys.toggle(&mut world, pos);
        run_ticks(&mut sys, &mut world, 6);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));
        assert_eq!(world.scheduled_updates, vec![(pos, 20)]);

        run_ticks(&mut sys, &mut world, 19);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));
        sys.scheduled_update(&mut world, pos);
        assert_eq!(sys.state(pos), Some(DoorState::Opened));
        sys.tick(&mut world);
        assert_eq!(sys.state(pos), Some(DoorState::Closing));
        run_ticks(&mut sys, &mut world, 6);
        assert_eq!(sys.state(pos), Some(DoorState::Closed));
    }

    #[test]
    fn test_ai_activation_rules() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let wood = VoxelPos::new(0, 1, 0);
        let iron = VoxelPos::new(2, 1, 0);
        place(&mut sys, &mut world, "wood_door", wood);
        place(&mut sys, &mut world, "iron_door", iron);

        assert!(!sys.ai_activate(&mut world, iron, true));
        assert!(sys.ai_activate(&mut world, wood, true));
        run_ticks(&mut sys, &mut world, 6);
        assert!(!sys.ai_activate(&mut world, wood, true));
        assert!(sys.ai_activate(&mut world, wood, false));
        assert_eq!(sys.state(wood), Some(DoorState::Closing));
    }

    #[test]
    fn test_inert_descriptor_is_a_no_op() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let def: DescriptorDef = toml::from_str(
            r#"
                name = "broken_door"
                movement = "teleport"
            "#,
        )
        .expect("valid toml");
        let broken = sys.register_descriptor(&def).expect("registers without movement");
        assert!(broken.movement.is_none());

        let pos = VoxelPos::new(0, 1, 0);
        let door = crate::door::create_door_instance(pos, Some(broken), Direction::North, false, false);
        sys.doors.insert(pos, door);

        assert!(!sys.toggle(&mut world, pos));
        assert!(!sys.set_powered(&mut world, pos, true));
        sys.tick(&mut world);
        assert_eq!(sys.state(pos), Some(DoorState::Closed));
        assert!(sys.bounding_box(pos, BoundingBoxType::Collision).is_none());
        assert!(sys.sample_poses(pos, 0.5).is_empty());
    }

    #[test]
    fn test_garage_column_opens_together_and_spreads() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        place_garage_column(&mut sys, &mut world, 0, 3);
        place_garage_column(&mut sys, &mut world, 1, 3);

        assert_eq!(sys.owner(VoxelPos::new(0, 1, 0)), Some(VoxelPos::new(0, 3, 0)));
        assert_eq!(sys.opening_time_at(VoxelPos::new(0, 2, 0)), 30);

        assert!(sys.set_powered(&mut world, VoxelPos::new(0, 1, 0), true));
        for x in 0..2 {
            for y in 1..=3 {
                assert_eq!(sys.state(VoxelPos::new(x, y, 0)), Some(DoorState::Opening));
            }
        }

        run_ticks(&mut sys, &mut world, 29);
        assert_eq!(sys.state(VoxelPos::new(1, 1, 0)), Some(DoorState::Opening));
        sys.tick(&mut world);
        for x in 0..2 {
            for y in 1..=3 {
                assert_eq!(sys.state(VoxelPos::new(x, y, 0)), Some(DoorState::Opened));
            }
        }
        assert!(world.sounds.is_empty());
        assert!(sys.bounding_box(VoxelPos::new(0, 2, 0), BoundingBoxType::Collision).is_none());
        assert!(sys.bounding_box(VoxelPos::new(0, 2, 0), BoundingBoxType::Selection).is_some());
    }

    #[test]
    fn test_garage_animation_is_described_from_top() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        place_garage_column(&mut sys, &mut world, 0, 3);

        let timeline = sys
            .describe_animation(VoxelPos::new(0, 1, 0))
            .expect("garage timeline");
        let parts: Vec<&str> = timeline.parts.iter().map(|p| p.part.as_str()).collect();
        assert_eq!(parts, vec!["segment_0", "segment_1", "segment_2"]);

        let bounds = sys.render_bounds(VoxelPos::new(0, 1, 0)).expect("garage bounds");
        assert!(aabb_contains_point(&bounds, Point3::new(0.5, 1.5, 0.5)));
        assert!(aabb_contains_point(&bounds, Point3::new(0.5, 3.5, 0.5)));
    }

    #[test]
    fn test_sample_poses_follow_state() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);

        let closed = sys.sample_poses(pos, 0.0);
        assert_eq!(closed.len(), 2);
        assert!(closed.iter().all(|(_, pose)| is_identity(pose)));

        sys.toggle(&mut world, pos);
        run_ticks(&mut sys, &mut world, 6);
        let opened = sys.sample_poses(pos, 0.0);
        assert!(opened.iter().all(|(_, pose)| !is_identity(pose)));
        assert!(opened.iter().any(|(part, _)| part == "top"));
    }

    fn place_carriage(sys: &mut DoorSystem, world: &mut MemoryWorld, origin: VoxelPos) {
        let carriage = sys.descriptor("carriage_door").expect("built-in");
        let mut stack = ItemStack::new("carriage_door", 1);
        sys.place_carriage_door(world, origin, Direction::North, &carriage, &mut stack)
            .expect("gate fits");
    }

    #[test]
    fn test_carriage_door_opens_as_one_gate() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let origin = VoxelPos::new(0, 1, 0);
        place_carriage(&mut sys, &mut world, origin);
        world.clear_events();

        let corner = origin.offset(-3, 4, 0);
        assert_eq!(sys.instance_pos(corner), Some(origin));
        assert!(sys.toggle(&mut world, corner));
        run_ticks(&mut sys, &mut world, 19);
        assert_eq!(sys.state(origin), Some(DoorState::Opening));
        sys.tick(&mut world);
        assert_eq!(sys.state(origin), Some(DoorState::Opened));
        assert_eq!(world.sound_count("door.carriage.open"), 1);

        // Only the edge columns keep a leaf once open
        let middle = origin.offset(-1, 2, 0);
        assert!(sys.bounding_box(middle, BoundingBoxType::Collision).is_none());
        assert!(sys.bounding_box(corner, BoundingBoxType::Collision).is_some());

        let timeline = sys.describe_animation(middle).expect("gate timeline");
        assert_eq!(timeline.duration(), 20);
    }

    #[test]
    fn test_carriage_render_bounds_cover_whole_gate() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let origin = VoxelPos::new(0, 1, 0);
        place_carriage(&mut sys, &mut world, origin);

        let expected = crate::physics::aabb::aabb_from_coords(-3.0, 1.0, 0.0, 1.0, 6.0, 1.0);
        for cell in [origin, origin.offset(-3, 4, 0), origin.offset(-2, 2, 0)] {
            let bounds = sys.render_bounds(cell).expect("gate bounds");
            assert!(crate::physics::aabb::aabb_approx_eq(&bounds, &expected, 1e-5), "{:?}", bounds);
        }
    }

    #[test]
    fn test_opened_hatch_is_climbable_along_the_wall() {
        let mut world = MemoryWorld::new();
        world.set_block(VoxelPos::new(0, 10, 1), BlockState::new(crate::world::BlockId::STONE, 0));
        let mut sys = system();
        let hatch = sys.descriptor("rusty_hatch").expect("built-in");
        let mut stack = ItemStack::new("rusty_hatch", 1);
        let origin = VoxelPos::new(0, 10, 0);
        sys.place_hatch(&mut world, origin, crate::world::BlockFace::North, 0.2, &hatch, &mut stack)
            .expect("hatch fits");

        let shaft = [origin.offset(0, -1, 0), origin.offset(-1, -2, 0)];
        assert!(shaft.iter().all(|c| !sys.is_ladder(*c)));

        sys.toggle(&mut world, origin);
        run_ticks(&mut sys, &mut world, 20);
        assert_eq!(sys.state(origin), Some(DoorState::Opened));

        assert!(shaft.iter().all(|c| sys.is_ladder(*c)));
        // The origin holds the frame, the far row and the top row stay open
        assert!(!sys.is_ladder(origin));
        assert!(!sys.is_ladder(origin.offset(-1, 0, 0)));
        assert!(!sys.is_ladder(origin.offset(0, -1, -1)));
        assert!(!sys.is_ladder(VoxelPos::new(5, 5, 5)));
    }

    #[test]
    fn test_doors_are_not_ladders() {
        let mut world = MemoryWorld::with_floor(0, 4);
        let mut sys = system();
        let pos = VoxelPos::new(0, 1, 0);
        place(&mut sys, &mut world, "wood_door", pos);
        sys.toggle(&mut world, pos);
        run_ticks(&mut sys, &mut world, 6);
        assert!(!sys.is_ladder(pos.up()));
    }
}
