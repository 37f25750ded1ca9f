//! Room state store
//!
//! Owns the room being edited and is the only place that mutates it.
//! Every mutation stamps the room's modification time and marks it dirty
//! until the next save.

use tracing::{debug, warn};

use super::placement::{place_ceiling, place_on_floor, SnapSettings};
use crate::viewport::Vec3;
use crate::world::{
    Ceiling, DimensionIssue, Entity, EntityId, EntityKind, EntityMut, Euler, FloorPoint,
    Furniture, FurnitureKind, IdAllocator, Opening, OpeningKind, PanelSize, Room,
    RoomDimensions, SequentialIds, Wall, MAX_ROOM_HEIGHT, MAX_ROOM_SPAN,
};

/// Smallest allowed furniture scale component
pub const MIN_SCALE: f32 = 0.1;
/// Smallest allowed wall width/height
pub const MIN_WALL_EXTENT: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid room dimensions: {}", join_issues(.0))]
    InvalidDimensions(Vec<DimensionIssue>),
    #[error("no furniture with id {0}")]
    NotFurniture(EntityId),
}

fn join_issues(issues: &[DimensionIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Partial dimension change; absent fields are left as they are
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionPatch {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
}

/// Partial entity update. Fields that do not apply to the target kind are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPatch {
    /// Furniture: full position. Walls: x and z.
    pub position: Option<Vec3>,
    /// Furniture: full rotation. Walls: the y angle.
    pub rotation: Option<Euler>,
    pub scale: Option<Vec3>,
    pub dimensions: Option<DimensionPatch>,
    /// Ceiling height
    pub height: Option<f32>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub texture: Option<String>,
    pub openings: Option<Vec<Opening>>,
}

impl EntityPatch {
    pub fn position(position: Vec3) -> Self {
        Self { position: Some(position), ..Default::default() }
    }

    pub fn rotation(rotation: Euler) -> Self {
        Self { rotation: Some(rotation), ..Default::default() }
    }

    pub fn scale(scale: Vec3) -> Self {
        Self { scale: Some(scale), ..Default::default() }
    }

    pub fn height(height: f32) -> Self {
        Self { height: Some(height), ..Default::default() }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self { color: Some(color.into()), ..Default::default() }
    }
}

/// Clamp a wall extent, treating garbage as the minimum
fn clamp_extent(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return MIN_WALL_EXTENT;
    }
    value.clamp(MIN_WALL_EXTENT, max)
}

fn floor_scale(v: f32) -> f32 {
    if v.is_nan() { MIN_SCALE } else { v.max(MIN_SCALE) }
}

/// Mutable room state with an injected id allocator
pub struct RoomStore<A: IdAllocator = SequentialIds> {
    room: Room,
    ids: A,
    snap: SnapSettings,
    dirty: bool,
}

impl RoomStore<SequentialIds> {
    /// Store over `room`, allocating ids after the highest one already in use
    pub fn new(room: Room) -> Self {
        let ids = SequentialIds::starting_after(room.max_entity_id());
        Self::with_allocator(room, ids)
    }
}

impl<A: IdAllocator> RoomStore<A> {
    pub fn with_allocator(room: Room, mut ids: A) -> Self {
        ids.observe(EntityId(room.max_entity_id()));
        Self { room, ids, snap: SnapSettings::default(), dirty: false }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn snap(&self) -> SnapSettings {
        self.snap
    }

    pub fn set_snap(&mut self, snap: SnapSettings) {
        self.snap = snap;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the current state as persisted, adopting the saved record's id
    pub fn mark_saved(&mut self, saved: &Room) {
        self.room.id = saved.id;
        self.room.last_modified = saved.last_modified.clone();
        self.dirty = false;
    }

    /// The stored copy was deleted; the open room becomes unsaved
    pub fn forget_saved_id(&mut self) {
        self.room.id = None;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Swap in another room (load/import). Ids keep increasing across rooms.
    pub fn replace_room(&mut self, mut room: Room) {
        room.sanitize();
        self.ids.observe(EntityId(room.max_entity_id()));
        self.room = room;
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.room.touch();
        self.dirty = true;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Adding entities
    // ─────────────────────────────────────────────────────────────────────

    /// New furniture at the origin with catalog defaults
    pub fn add_furniture(&mut self, kind: FurnitureKind) -> EntityId {
        let id = self.ids.next_id();
        debug!(%id, kind = kind.name(), "adding furniture");
        self.room.furniture.push(Furniture::new(id, kind));
        self.touch();
        id
    }

    fn push_wall(&mut self, opening: Option<OpeningKind>) -> EntityId {
        let id = self.ids.next_id();
        let mut wall = Wall::new(id);
        wall.openings.extend(opening.map(Opening::new));
        self.room.walls.push(wall);
        self.touch();
        debug!(%id, ?opening, "added wall");
        id
    }

    pub fn add_wall(&mut self) -> EntityId {
        self.push_wall(None)
    }

    pub fn add_door(&mut self) -> EntityId {
        self.push_wall(Some(OpeningKind::Door))
    }

    pub fn add_window(&mut self) -> EntityId {
        self.push_wall(Some(OpeningKind::Window))
    }

    /// Add a ceiling at the room height, replacing any existing one
    pub fn add_ceiling(&mut self) -> EntityId {
        let id = self.ids.next_id();
        self.room.ceiling = Some(Ceiling::new(id, self.room.dimensions.height));
        self.touch();
        debug!(%id, "added ceiling");
        id
    }

    // ─────────────────────────────────────────────────────────────────────
    // Updating entities
    // ─────────────────────────────────────────────────────────────────────

    /// Apply a validated partial update.
    ///
    /// A zero id or one no collection holds is logged and ignored; the room is
    /// left untouched. Returns whether the update was applied.
    pub fn update_entity(&mut self, id: EntityId, patch: &EntityPatch) -> bool {
        if !id.is_valid() {
            warn!(%id, "ignoring update for invalid entity id");
            return false;
        }

        let dims = self.room.dimensions;
        let snap = self.snap;
        match self.room.entity_mut(id) {
            Some(EntityMut::Furniture(f)) => apply_furniture_patch(f, patch, &dims, snap),
            Some(EntityMut::Wall(w)) => apply_wall_patch(w, patch, &dims, snap),
            Some(EntityMut::Ceiling(c)) => apply_ceiling_patch(c, patch, snap),
            None => {
                warn!(%id, "ignoring update for unknown entity");
                return false;
            }
        }
        self.touch();
        true
    }

    /// Run a drag candidate through the placement pipeline and apply it.
    ///
    /// For a ceiling the candidate's y is the requested height. Returns the
    /// position that was stored.
    pub fn move_entity(&mut self, id: EntityId, candidate: Vec3) -> Option<Vec3> {
        let patch = match self.room.kind_of(id)? {
            EntityKind::Ceiling => EntityPatch::height(candidate.y),
            EntityKind::Furniture | EntityKind::Wall => EntityPatch::position(candidate),
        };
        if !self.update_entity(id, &patch) {
            return None;
        }
        self.entity_position(id)
    }

    /// Put an entity back at a previously stored position, bypassing placement
    pub fn restore_position(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.room.entity_mut(id) {
            Some(EntityMut::Furniture(f)) => f.position = position,
            Some(EntityMut::Wall(w)) => w.position = FloorPoint::new(position.x, position.z),
            Some(EntityMut::Ceiling(c)) => c.height = position.y,
            None => return false,
        }
        self.touch();
        true
    }

    /// Reference point of an entity: furniture position, wall center on the
    /// floor, or (0, height, 0) for the ceiling
    pub fn entity_position(&self, id: EntityId) -> Option<Vec3> {
        self.room.entity(id).map(|e| match e {
            Entity::Furniture(f) => f.position,
            Entity::Wall(w) => w.position.to_vec3(),
            Entity::Ceiling(c) => Vec3::new(0.0, c.height, 0.0),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Removing / copying
    // ─────────────────────────────────────────────────────────────────────

    /// Remove an entity from whichever collection holds it.
    ///
    /// Like `update_entity`, an invalid or unknown id is logged and ignored.
    pub fn delete_entity(&mut self, id: EntityId) -> Option<EntityKind> {
        if !id.is_valid() {
            warn!(%id, "ignoring delete for invalid entity id");
            return None;
        }
        let Some(kind) = self.room.kind_of(id) else {
            warn!(%id, "ignoring delete for unknown entity");
            return None;
        };
        match kind {
            EntityKind::Furniture => self.room.furniture.retain(|f| f.id != id),
            EntityKind::Wall => self.room.walls.retain(|w| w.id != id),
            EntityKind::Ceiling => self.room.ceiling = None,
        }
        self.touch();
        debug!(%id, kind = kind.label(), "deleted entity");
        Some(kind)
    }

    /// Copy a furniture item one meter along +X under a new id
    pub fn duplicate_furniture(&mut self, id: EntityId) -> Result<EntityId, StoreError> {
        let source = self
            .room
            .furniture
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(StoreError::NotFurniture(id))?;

        let new_id = self.ids.next_id();
        let mut copy = source;
        copy.id = new_id;
        copy.position.x += 1.0;
        self.room.furniture.push(copy);
        self.touch();
        Ok(new_id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Room-level edits
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the room dimensions. Existing entities are not re-constrained.
    pub fn resize_room(&mut self, dimensions: RoomDimensions) -> Result<(), StoreError> {
        dimensions.validate().map_err(StoreError::InvalidDimensions)?;
        self.room.dimensions = dimensions;
        self.touch();
        Ok(())
    }

    pub fn clear_furniture(&mut self) {
        self.room.furniture.clear();
        self.touch();
    }

    /// Back to an empty 10×10×3 room (name and id are kept)
    pub fn reset_room(&mut self) {
        self.room.dimensions = RoomDimensions::DEFAULT;
        self.room.walls.clear();
        self.room.furniture.clear();
        self.room.ceiling = None;
        self.touch();
    }
}

fn apply_furniture_patch(f: &mut Furniture, patch: &EntityPatch, room: &RoomDimensions, snap: SnapSettings) {
    if let Some(d) = patch.dimensions {
        f.dimensions.width = d.width.unwrap_or(f.dimensions.width);
        f.dimensions.height = d.height.unwrap_or(f.dimensions.height);
        f.dimensions.depth = d.depth.unwrap_or(f.dimensions.depth);
    }
    if let Some(scale) = patch.scale {
        f.scale = Vec3::new(floor_scale(scale.x), floor_scale(scale.y), floor_scale(scale.z));
    }
    if let Some(rotation) = patch.rotation {
        f.rotation = rotation;
    }
    if let Some(position) = patch.position {
        f.position = place_on_floor(position, room, f.footprint(), snap);
    }
    if let Some(color) = &patch.color {
        f.color = color.clone();
    }
    if let Some(material) = &patch.material {
        f.material = material.clone();
    }
}

fn apply_wall_patch(w: &mut Wall, patch: &EntityPatch, room: &RoomDimensions, snap: SnapSettings) {
    if let Some(d) = patch.dimensions {
        w.dimensions = PanelSize::new(
            clamp_extent(d.width.unwrap_or(w.dimensions.width), MAX_ROOM_SPAN),
            clamp_extent(d.height.unwrap_or(w.dimensions.height), MAX_ROOM_HEIGHT),
        );
    }
    if let Some(rotation) = patch.rotation {
        w.rotation = rotation.y;
    }
    if let Some(position) = patch.position {
        let placed = place_on_floor(position.horizontal(), room, w.footprint(), snap);
        w.position = FloorPoint::new(placed.x, placed.z);
    }
    if let Some(color) = &patch.color {
        w.color = color.clone();
    }
    if let Some(openings) = &patch.openings {
        w.openings = openings.clone();
    }
}

fn apply_ceiling_patch(c: &mut Ceiling, patch: &EntityPatch, snap: SnapSettings) {
    if let Some(height) = patch.height {
        c.height = place_ceiling(height, snap);
    }
    if let Some(color) = &patch.color {
        c.color = color.clone();
    }
    if let Some(material) = &patch.material {
        c.material = material.clone();
    }
    if let Some(texture) = &patch.texture {
        c.texture = texture.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BoxSize, RoomId};

    fn store() -> RoomStore {
        RoomStore::new(Room::new("Test Room"))
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut s = store();
        let a = s.add_furniture(FurnitureKind::Sofa);
        let b = s.add_wall();
        let c = s.add_door();
        let d = s.add_ceiling();
        assert!(a < b && b < c && c < d);
        assert!(a.is_valid());
        assert_eq!(s.room().entity_count(), 4);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut s = store();
        let a = s.add_furniture(FurnitureKind::Chair);
        s.delete_entity(a);
        let b = s.add_furniture(FurnitureKind::Chair);
        assert!(b > a);
    }

    #[test]
    fn test_store_continues_after_loaded_ids() {
        let mut room = Room::new("Loaded");
        room.furniture.push(Furniture::new(EntityId(40), FurnitureKind::Bed));
        let mut s = RoomStore::new(room);
        assert_eq!(s.add_wall(), EntityId(41));
    }

    #[test]
    fn test_new_entities_use_defaults() {
        let mut s = store();
        let door = s.add_door();
        let window = s.add_window();
        let ceiling = s.add_ceiling();
        let room = s.room();

        let door = room.walls.iter().find(|w| w.id == door).unwrap();
        assert_eq!(door.dimensions, PanelSize::new(5.0, 3.0));
        assert_eq!(door.color, "#ffffff");
        assert_eq!(door.openings[0].kind, OpeningKind::Door);
        assert_eq!(door.openings[0].dimensions, PanelSize::new(0.8, 2.0));

        let window = room.walls.iter().find(|w| w.id == window).unwrap();
        assert_eq!(window.openings[0].dimensions, PanelSize::new(1.2, 1.0));

        let ceiling_ref = room.ceiling.as_ref().unwrap();
        assert_eq!(ceiling_ref.id, ceiling);
        assert!((ceiling_ref.height - 3.0).abs() < 0.001);
        assert_eq!(ceiling_ref.material, "plaster");
    }

    #[test]
    fn test_second_ceiling_replaces_first() {
        let mut s = store();
        s.add_ceiling();
        let second = s.add_ceiling();
        assert_eq!(s.room().ceiling.as_ref().map(|c| c.id), Some(second));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut s = store();
        s.add_furniture(FurnitureKind::Table);
        let before = s.room().clone();

        assert!(!s.update_entity(EntityId(0), &EntityPatch::position(Vec3::new(1.0, 0.0, 1.0))));
        assert!(!s.update_entity(EntityId(999), &EntityPatch::color("#000000")));
        assert_eq!(s.room(), &before);
    }

    #[test]
    fn test_furniture_position_is_constrained_and_snapped() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Table);
        assert!(s.update_entity(id, &EntityPatch::position(Vec3::new(7.0, 0.0, 1.2))));
        let pos = s.entity_position(id).unwrap();
        assert!((pos.x - 4.5).abs() < 0.001);
        assert!((pos.z - 1.0).abs() < 0.001);

        s.set_snap(SnapSettings::disabled());
        s.update_entity(id, &EntityPatch::position(Vec3::new(7.0, 0.0, 1.2)));
        let pos = s.entity_position(id).unwrap();
        assert!((pos.x - 4.25).abs() < 0.001);
        assert!((pos.z - 1.2).abs() < 0.001);
    }

    #[test]
    fn test_furniture_scale_is_floored() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Desk);
        s.update_entity(id, &EntityPatch::scale(Vec3::new(0.0, -2.0, 1.5)));
        let f = &s.room().furniture[0];
        assert_eq!(f.scale, Vec3::new(MIN_SCALE, MIN_SCALE, 1.5));
    }

    #[test]
    fn test_wall_patch_clamps_dimensions() {
        let mut s = store();
        let id = s.add_wall();
        let patch = EntityPatch {
            dimensions: Some(DimensionPatch { width: Some(80.0), height: Some(0.0), depth: None }),
            rotation: Some(Euler::yaw(0.5)),
            ..Default::default()
        };
        s.update_entity(id, &patch);
        let w = &s.room().walls[0];
        assert!((w.dimensions.width - 50.0).abs() < 0.001);
        assert!((w.dimensions.height - MIN_WALL_EXTENT).abs() < 0.001);
        assert!((w.rotation - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_wall_position_stays_in_room() {
        let mut s = store();
        let id = s.add_wall();
        s.set_snap(SnapSettings::disabled());
        s.update_entity(id, &EntityPatch::position(Vec3::new(20.0, 3.0, -20.0)));
        let w = &s.room().walls[0];
        // 5m wall along X: x limited to 5 - 2.5, z to 5 - 0.05
        assert!((w.position.x - 2.5).abs() < 0.001);
        assert!((w.position.z + 4.95).abs() < 0.001);
    }

    #[test]
    fn test_ceiling_height_clamped() {
        let mut s = store();
        let id = s.add_ceiling();
        s.update_entity(id, &EntityPatch::height(25.0));
        assert!((s.room().ceiling.as_ref().unwrap().height - 10.0).abs() < 0.001);
        s.update_entity(id, &EntityPatch::height(0.5));
        assert!((s.room().ceiling.as_ref().unwrap().height - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_move_entity_ceiling_uses_height() {
        let mut s = store();
        let id = s.add_ceiling();
        let pos = s.move_entity(id, Vec3::new(3.0, 4.2, 1.0)).unwrap();
        assert!((pos.y - 4.0).abs() < 0.001);
        assert!(s.move_entity(EntityId(77), Vec3::ZERO).is_none());
    }

    #[test]
    fn test_restore_position_bypasses_placement() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Chair);
        assert!(s.restore_position(id, Vec3::new(1.23, 0.0, -0.77)));
        assert_eq!(s.entity_position(id), Some(Vec3::new(1.23, 0.0, -0.77)));
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut s = store();
        s.add_furniture(FurnitureKind::Chair);
        let saved = s.room().clone();
        s.mark_saved(&saved);
        let before = s.room().clone();

        assert_eq!(s.delete_entity(EntityId(999)), None);
        assert_eq!(s.delete_entity(EntityId(0)), None);
        assert_eq!(s.room(), &before);
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_delete_entity() {
        let mut s = store();
        let wall = s.add_wall();
        let chair = s.add_furniture(FurnitureKind::Chair);
        let ceiling = s.add_ceiling();

        assert_eq!(s.delete_entity(wall), Some(EntityKind::Wall));
        assert_eq!(s.delete_entity(ceiling), Some(EntityKind::Ceiling));
        assert_eq!(s.delete_entity(wall), None);
        assert!(s.room().walls.is_empty());
        assert!(s.room().ceiling.is_none());
        assert_eq!(s.room().furniture[0].id, chair);
    }

    #[test]
    fn test_duplicate_furniture() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Bed);
        s.update_entity(id, &EntityPatch::position(Vec3::new(1.0, 0.0, 1.0)));
        let copy = s.duplicate_furniture(id).unwrap();
        assert_ne!(copy, id);
        let copied = s.room().furniture.iter().find(|f| f.id == copy).unwrap();
        assert!((copied.position.x - 2.0).abs() < 0.001);
        assert_eq!(copied.kind, FurnitureKind::Bed);

        let wall = s.add_wall();
        assert_eq!(s.duplicate_furniture(wall), Err(StoreError::NotFurniture(wall)));
    }

    #[test]
    fn test_resize_room_keeps_entities_where_they_are() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Table);
        s.update_entity(id, &EntityPatch::position(Vec3::new(4.0, 0.0, 0.0)));
        s.resize_room(RoomDimensions::new(4.0, 4.0, 2.5)).unwrap();
        assert_eq!(s.room().dimensions, RoomDimensions::new(4.0, 4.0, 2.5));
        assert!((s.entity_position(id).unwrap().x - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_resize_room_rejects_invalid() {
        let mut s = store();
        let err = s.resize_room(RoomDimensions::new(60.0, 5.0, 3.0)).unwrap_err();
        assert_eq!(err.to_string(), "invalid room dimensions: Width cannot exceed 50 meters");
        assert_eq!(s.room().dimensions, RoomDimensions::DEFAULT);
    }

    #[test]
    fn test_clear_and_reset() {
        let mut s = store();
        s.add_furniture(FurnitureKind::Sofa);
        s.add_wall();
        s.clear_furniture();
        assert!(s.room().furniture.is_empty());
        assert_eq!(s.room().walls.len(), 1);

        s.resize_room(RoomDimensions::new(6.0, 4.0, 2.5)).unwrap();
        s.add_ceiling();
        s.reset_room();
        assert_eq!(s.room().dimensions, RoomDimensions::DEFAULT);
        assert_eq!(s.room().entity_count(), 0);
    }

    #[test]
    fn test_mutations_mark_dirty_and_stamp() {
        let mut room = Room::new("Stamp");
        room.last_modified = String::new();
        let mut s = RoomStore::new(room);
        assert!(!s.is_dirty());
        s.add_wall();
        assert!(s.is_dirty());
        assert!(!s.room().last_modified.is_empty());
    }

    #[test]
    fn test_furniture_dimensions_patch() {
        let mut s = store();
        let id = s.add_furniture(FurnitureKind::Table);
        let patch = EntityPatch {
            dimensions: Some(DimensionPatch { width: Some(2.0), height: None, depth: None }),
            ..Default::default()
        };
        s.update_entity(id, &patch);
        assert_eq!(s.room().furniture[0].dimensions, BoxSize::new(2.0, 0.8, 1.0));
    }

    #[test]
    fn test_forget_saved_id() {
        let mut room = Room::new("Saved");
        room.id = Some(RoomId(4));
        let mut s = RoomStore::new(room);
        s.forget_saved_id();
        assert_eq!(s.room().id, None);
        assert!(s.is_dirty());
    }
}
