//! Room data model
//!
//! A room is the top-level design document: its dimensions plus every
//! placed wall, furniture item and the optional ceiling. Entities are owned
//! by value and referenced by integer id only.
//!
//! Coordinates: the floor is the plane y=0, centered on the origin, spanning
//! `[-width/2, width/2]` on X and `[-length/2, length/2]` on Z.

mod catalog;
mod ids;
pub mod room_io;
mod seed;

pub use catalog::*;
pub use ids::*;
pub use room_io::{RoomExport, RoomIoError, export_room_json, import_room_json};
pub use seed::seed_rooms;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

use crate::viewport::Vec3;

/// Largest allowed room width/length (meters)
pub const MAX_ROOM_SPAN: f32 = 50.0;
/// Largest allowed room height (meters)
pub const MAX_ROOM_HEIGHT: f32 = 10.0;
/// Wall slab thickness used for rendering, picking and footprints
pub const WALL_THICKNESS: f32 = 0.1;
/// Ceiling height limits
pub const MIN_CEILING_HEIGHT: f32 = 2.0;
pub const MAX_CEILING_HEIGHT: f32 = 10.0;

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Entity identifier. Zero is never allocated and is always invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persisted room identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current time as an RFC 3339 timestamp
pub fn now_timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry value types
// ─────────────────────────────────────────────────────────────────────────────

/// Room volume in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width: f32,
    pub length: f32,
    pub height: f32,
}

/// A single broken room-dimension rule
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DimensionIssue {
    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),
    #[error("{axis} cannot exceed {max} meters")]
    TooLarge { axis: &'static str, max: f32 },
}

impl RoomDimensions {
    pub const DEFAULT: RoomDimensions = RoomDimensions { width: 10.0, length: 10.0, height: 3.0 };

    pub fn new(width: f32, length: f32, height: f32) -> Self {
        Self { width, length, height }
    }

    /// Check the room invariant, listing every broken rule
    pub fn validate(&self) -> Result<(), Vec<DimensionIssue>> {
        let mut issues = Vec::new();
        for (axis, value, max) in [
            ("Width", self.width, MAX_ROOM_SPAN),
            ("Length", self.length, MAX_ROOM_SPAN),
            ("Height", self.height, MAX_ROOM_HEIGHT),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                issues.push(DimensionIssue::NotPositive(axis));
            } else if value > max {
                issues.push(DimensionIssue::TooLarge { axis, max });
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    pub fn floor_area(&self) -> f32 {
        self.width * self.length
    }

    pub fn volume(&self) -> f32 {
        self.width * self.length * self.height
    }
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Horizontal extent of an entity, used for bound constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint { width: 1.0, depth: 1.0 };

    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// Replace unusable extents with 1 meter
    pub fn or_unit(self) -> Self {
        let fix = |v: f32| if v > 0.0 && v.is_finite() { v } else { 1.0 };
        Self { width: fix(self.width), depth: fix(self.depth) }
    }
}

/// Point on the floor plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPoint {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub z: f32,
}

impl FloorPoint {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }
}

/// Point in wall-local coordinates (x along the wall, y up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WallPoint {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Width × height of a flat rectangle (walls, openings)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    #[serde(default = "one")]
    pub width: f32,
    #[serde(default = "one")]
    pub height: f32,
}

impl PanelSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Width × height × depth of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    #[serde(default = "one")]
    pub width: f32,
    #[serde(default = "one")]
    pub height: f32,
    #[serde(default = "one")]
    pub depth: f32,
}

impl BoxSize {
    pub const UNIT: BoxSize = BoxSize { width: 1.0, height: 1.0, depth: 1.0 };

    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    pub fn is_usable(&self) -> bool {
        [self.width, self.height, self.depth].iter().all(|v| *v > 0.0 && v.is_finite())
    }
}

impl Default for BoxSize {
    fn default() -> Self {
        Self::UNIT
    }
}

fn one() -> f32 {
    1.0
}

fn unit_scale() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

/// Euler rotation in radians.
///
/// Furniture rotation is always stored as a full `{x, y, z}`. Older records
/// carry a bare number meaning a rotation around Y; those are read through
/// this type too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn yaw(y: f32) -> Self {
        Self { x: 0.0, y, z: 0.0 }
    }
}

impl<'de> Deserialize<'de> for Euler {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Full {
            #[serde(default)]
            x: f32,
            #[serde(default)]
            y: f32,
            #[serde(default)]
            z: f32,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Yaw(f32),
            Full(Full),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Yaw(y) => Euler::yaw(y),
            Repr::Full(f) => Euler::new(f.x, f.y, f.z),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// Door or window cut into a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    pub fn default_size(self) -> PanelSize {
        match self {
            OpeningKind::Door => PanelSize::new(0.8, 2.0),
            OpeningKind::Window => PanelSize::new(1.2, 1.0),
        }
    }
}

/// Sub-rectangle of a wall, positioned in wall-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    #[serde(rename = "type")]
    pub kind: OpeningKind,
    #[serde(default)]
    pub position: WallPoint,
    /// Missing sizes load as 0x0 and are replaced by the kind's default
    #[serde(default = "unset_panel")]
    pub dimensions: PanelSize,
}

fn unset_panel() -> PanelSize {
    PanelSize::new(0.0, 0.0)
}

impl Opening {
    pub fn new(kind: OpeningKind) -> Self {
        Self { kind, position: WallPoint::default(), dimensions: kind.default_size() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub position: FloorPoint,
    /// Rotation around +Y in radians
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub dimensions: PanelSize,
    #[serde(default = "default_wall_color")]
    pub color: String,
    #[serde(default)]
    pub openings: Vec<Opening>,
}

fn default_wall_color() -> String {
    "#ffffff".to_string()
}

impl Wall {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: FloorPoint::default(),
            rotation: 0.0,
            dimensions: PanelSize::new(5.0, 3.0),
            color: default_wall_color(),
            openings: Vec::new(),
        }
    }

    /// Axis-aligned extent of the rotated wall slab
    pub fn footprint(&self) -> Footprint {
        let (sin, cos) = self.rotation.sin_cos();
        let w = self.dimensions.width;
        let t = WALL_THICKNESS;
        Footprint::new(
            (w * cos).abs() + (t * sin).abs(),
            (w * sin).abs() + (t * cos).abs(),
        )
    }

    /// Center, half extents and yaw of the wall slab
    pub fn render_box(&self) -> Option<(Vec3, Vec3, f32)> {
        let PanelSize { width, height } = self.dimensions;
        let center = Vec3::new(self.position.x, height / 2.0, self.position.z);
        let half = Vec3::new(width / 2.0, height / 2.0, WALL_THICKNESS / 2.0);
        let ok = width > 0.0 && height > 0.0 && center.is_finite() && half.is_finite() && self.rotation.is_finite();
        ok.then_some((center, half, self.rotation))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    #[serde(default)]
    pub id: EntityId,
    #[serde(rename = "type", default)]
    pub kind: FurnitureKind,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Euler,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub dimensions: BoxSize,
    /// Empty when missing; filled from the catalog on load
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub material: String,
}

impl Furniture {
    /// New furniture at the origin with the catalog defaults for `kind`
    pub fn new(id: EntityId, kind: FurnitureKind) -> Self {
        let defaults = kind.defaults();
        Self {
            id,
            kind,
            position: Vec3::ZERO,
            rotation: Euler::default(),
            scale: unit_scale(),
            dimensions: defaults.dimensions,
            color: defaults.color.to_string(),
            material: defaults.material.to_string(),
        }
    }

    /// Scaled horizontal extent (rotation is not taken into account)
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.dimensions.width * self.scale.x, self.dimensions.depth * self.scale.z)
    }

    /// Center, half extents and yaw of the scaled box, resting on `position`
    pub fn render_box(&self) -> Option<(Vec3, Vec3, f32)> {
        let size = Vec3::new(
            self.dimensions.width * self.scale.x,
            self.dimensions.height * self.scale.y,
            self.dimensions.depth * self.scale.z,
        );
        let center = self.position + Vec3::new(0.0, size.y / 2.0, 0.0);
        let half = size * 0.5;
        let ok = half.x > 0.0 && half.y > 0.0 && half.z > 0.0
            && center.is_finite() && half.is_finite() && self.rotation.y.is_finite();
        ok.then_some((center, half, self.rotation.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ceiling {
    #[serde(default)]
    pub id: EntityId,
    /// Zero when missing; replaced by the room height on load
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_ceiling_color")]
    pub color: String,
    #[serde(default = "default_ceiling_material")]
    pub material: String,
    #[serde(default = "default_ceiling_texture")]
    pub texture: String,
}

fn default_ceiling_color() -> String {
    "#f8f9fa".to_string()
}

fn default_ceiling_material() -> String {
    "plaster".to_string()
}

fn default_ceiling_texture() -> String {
    "smooth".to_string()
}

impl Ceiling {
    pub fn new(id: EntityId, height: f32) -> Self {
        Self {
            id,
            height,
            color: default_ceiling_color(),
            material: default_ceiling_material(),
            texture: default_ceiling_texture(),
        }
    }
}

/// Discriminant of the entity union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Wall,
    Furniture,
    Ceiling,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Wall => "Wall",
            EntityKind::Furniture => "Furniture",
            EntityKind::Ceiling => "Ceiling",
        }
    }
}

/// Any placed object in a room
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Wall(Wall),
    Furniture(Furniture),
    Ceiling(Ceiling),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Wall(w) => w.id,
            Entity::Furniture(f) => f.id,
            Entity::Ceiling(c) => c.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Wall(_) => EntityKind::Wall,
            Entity::Furniture(_) => EntityKind::Furniture,
            Entity::Ceiling(_) => EntityKind::Ceiling,
        }
    }
}

/// Mutable borrow of one entity inside a room
pub enum EntityMut<'a> {
    Wall(&'a mut Wall),
    Furniture(&'a mut Furniture),
    Ceiling(&'a mut Ceiling),
}

// ─────────────────────────────────────────────────────────────────────────────
// Room
// ─────────────────────────────────────────────────────────────────────────────

/// Name given to rooms created or stored without one
pub const DEFAULT_ROOM_NAME: &str = "New Room";

fn default_room_name() -> String {
    DEFAULT_ROOM_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Absent until the room is saved for the first time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoomId>,
    #[serde(default = "default_room_name")]
    pub name: String,
    #[serde(default)]
    pub dimensions: RoomDimensions,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub furniture: Vec<Furniture>,
    #[serde(default)]
    pub ceiling: Option<Ceiling>,
    #[serde(default)]
    pub last_modified: String,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_dimensions(name, RoomDimensions::DEFAULT)
    }

    pub fn with_dimensions(name: impl Into<String>, dimensions: RoomDimensions) -> Self {
        Self {
            id: None,
            name: name.into(),
            dimensions,
            walls: Vec::new(),
            furniture: Vec::new(),
            ceiling: None,
            last_modified: now_timestamp(),
        }
    }

    /// Stamp the modification time
    pub fn touch(&mut self) {
        self.last_modified = now_timestamp();
    }

    /// Clone out the entity with `id`
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        if let Some(f) = self.furniture.iter().find(|f| f.id == id) {
            return Some(Entity::Furniture(f.clone()));
        }
        if let Some(w) = self.walls.iter().find(|w| w.id == id) {
            return Some(Entity::Wall(w.clone()));
        }
        match &self.ceiling {
            Some(c) if c.id == id => Some(Entity::Ceiling(c.clone())),
            _ => None,
        }
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        if let Some(f) = self.furniture.iter_mut().find(|f| f.id == id) {
            return Some(EntityMut::Furniture(f));
        }
        if let Some(w) = self.walls.iter_mut().find(|w| w.id == id) {
            return Some(EntityMut::Wall(w));
        }
        match &mut self.ceiling {
            Some(c) if c.id == id => Some(EntityMut::Ceiling(c)),
            _ => None,
        }
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.furniture.iter().any(|f| f.id == id) {
            Some(EntityKind::Furniture)
        } else if self.walls.iter().any(|w| w.id == id) {
            Some(EntityKind::Wall)
        } else if self.ceiling.as_ref().is_some_and(|c| c.id == id) {
            Some(EntityKind::Ceiling)
        } else {
            None
        }
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.walls
            .iter()
            .map(|w| w.id)
            .chain(self.furniture.iter().map(|f| f.id))
            .chain(self.ceiling.iter().map(|c| c.id))
    }

    /// Highest entity id in the room (0 when empty)
    pub fn max_entity_id(&self) -> u32 {
        self.entity_ids().map(|id| id.0).max().unwrap_or(0)
    }

    pub fn entity_count(&self) -> usize {
        self.walls.len() + self.furniture.len() + usize::from(self.ceiling.is_some())
    }

    /// Replace unusable geometry with safe defaults.
    ///
    /// Returns how many fields were repaired.
    pub fn sanitize(&mut self) -> usize {
        let mut repaired = 0;

        if self.name.trim().is_empty() {
            self.name = default_room_name();
            repaired += 1;
        }

        // Records written without ids get fresh ones above the highest in use
        let mut last_id = self.max_entity_id();
        let mut fresh_id = |id: &mut EntityId| {
            if !id.is_valid() {
                last_id += 1;
                *id = EntityId(last_id);
                warn!(%id, "entity without id, assigned a new one");
                return 1;
            }
            0
        };
        for w in &mut self.walls {
            repaired += fresh_id(&mut w.id);
        }
        for f in &mut self.furniture {
            repaired += fresh_id(&mut f.id);
        }
        if let Some(c) = &mut self.ceiling {
            repaired += fresh_id(&mut c.id);
        }

        if self.dimensions.validate().is_err() {
            warn!(room = %self.name, dimensions = ?self.dimensions, "invalid room dimensions, using defaults");
            self.dimensions = RoomDimensions::DEFAULT;
            repaired += 1;
        }

        for f in &mut self.furniture {
            let defaults = f.kind.defaults();
            if f.color.trim().is_empty() {
                f.color = defaults.color.to_string();
                repaired += 1;
            }
            if f.material.trim().is_empty() {
                f.material = defaults.material.to_string();
                repaired += 1;
            }
            if !f.dimensions.is_usable() {
                warn!(id = %f.id, dimensions = ?f.dimensions, "invalid furniture dimensions, using 1x1x1");
                f.dimensions = BoxSize::UNIT;
                repaired += 1;
            }
            if !f.position.is_finite() {
                warn!(id = %f.id, "invalid furniture position, moving to origin");
                f.position = Vec3::ZERO;
                repaired += 1;
            }
            if !f.scale.is_finite() || f.scale.x <= 0.0 || f.scale.y <= 0.0 || f.scale.z <= 0.0 {
                warn!(id = %f.id, scale = ?f.scale, "invalid furniture scale, resetting");
                f.scale = unit_scale();
                repaired += 1;
            }
        }

        for w in &mut self.walls {
            let d = w.dimensions;
            if !(d.width > 0.0 && d.height > 0.0 && d.width.is_finite() && d.height.is_finite()) {
                warn!(id = %w.id, dimensions = ?d, "invalid wall dimensions, using 1x1");
                w.dimensions = PanelSize::default();
                repaired += 1;
            }
            if !(w.position.x.is_finite() && w.position.z.is_finite()) {
                warn!(id = %w.id, "invalid wall position, moving to origin");
                w.position = FloorPoint::default();
                repaired += 1;
            }
            for o in &mut w.openings {
                let d = o.dimensions;
                if !(d.width > 0.0 && d.height > 0.0 && d.width.is_finite() && d.height.is_finite()) {
                    o.dimensions = o.kind.default_size();
                    repaired += 1;
                }
            }
        }

        if let Some(c) = &mut self.ceiling {
            if !(c.height.is_finite() && c.height > 0.0) {
                warn!(id = %c.id, height = c.height, "invalid ceiling height, using room height");
                c.height = self.dimensions.height;
                repaired += 1;
            }
        }

        repaired
    }
}
