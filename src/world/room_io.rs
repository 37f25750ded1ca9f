//! Room import and export
//!
//! Rooms travel as pretty-printed JSON documents carrying the room geometry
//! plus an export timestamp and format version. Imported documents are
//! validated against resource limits before they reach the editor.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{Ceiling, Furniture, Room, RoomDimensions, Wall, now_timestamp};

/// Format version written into every export
pub const EXPORT_VERSION: &str = "1.0";
/// Name given to imported rooms that carry none
pub const IMPORTED_ROOM_NAME: &str = "Imported Room";

/// Validation limits to prevent resource exhaustion from hostile files
pub mod limits {
    /// Maximum walls in one room
    pub const MAX_WALLS: usize = 512;
    /// Maximum furniture items in one room
    pub const MAX_FURNITURE: usize = 2048;
    /// Maximum openings on a single wall
    pub const MAX_OPENINGS_PER_WALL: usize = 32;
    /// Maximum length of names, colors and material strings
    pub const MAX_STRING_LEN: usize = 256;
    /// Maximum absolute coordinate value
    pub const MAX_COORD: f32 = 1_000.0;
}

#[derive(Debug, thiserror::Error)]
pub enum RoomIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to import room: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to import room: Invalid room data format")]
    MissingField(&'static str),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Exported room document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomExport {
    pub name: String,
    pub dimensions: RoomDimensions,
    pub walls: Vec<Wall>,
    pub furniture: Vec<Furniture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<Ceiling>,
    pub export_date: String,
    pub version: String,
}

impl RoomExport {
    pub fn from_room(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            dimensions: room.dimensions,
            walls: room.walls.clone(),
            furniture: room.furniture.clone(),
            ceiling: room.ceiling.clone(),
            export_date: now_timestamp(),
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Import shape: every section optional so missing ones are reported precisely
#[derive(Deserialize)]
struct ImportDocument {
    name: Option<String>,
    dimensions: Option<RoomDimensions>,
    walls: Option<Vec<Wall>>,
    furniture: Option<Vec<Furniture>>,
    #[serde(default)]
    ceiling: Option<Ceiling>,
}

pub fn export_room_json(room: &Room) -> Result<String, RoomIoError> {
    Ok(serde_json::to_string_pretty(&RoomExport::from_room(room))?)
}

/// Parse an exported room document.
///
/// The result has no persisted id (it gets one when saved) and a fresh
/// modification time.
pub fn import_room_json(json: &str) -> Result<Room, RoomIoError> {
    let doc: ImportDocument = serde_json::from_str(json)?;

    let dimensions = doc.dimensions.ok_or(RoomIoError::MissingField("dimensions"))?;
    let walls = doc.walls.ok_or(RoomIoError::MissingField("walls"))?;
    let furniture = doc.furniture.ok_or(RoomIoError::MissingField("furniture"))?;

    let room = Room {
        id: None,
        name: doc.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| IMPORTED_ROOM_NAME.to_string()),
        dimensions,
        walls,
        furniture,
        ceiling: doc.ceiling,
        last_modified: now_timestamp(),
    };

    validate_room(&room).map_err(RoomIoError::Validation)?;
    Ok(room)
}

pub fn export_room_to_file<P: AsRef<Path>>(room: &Room, path: P) -> Result<(), RoomIoError> {
    fs::write(path, export_room_json(room)?)?;
    Ok(())
}

pub fn import_room_from_file<P: AsRef<Path>>(path: P) -> Result<Room, RoomIoError> {
    import_room_json(&fs::read_to_string(path)?)
}

/// Check if a float is valid (not NaN or Inf, within coordinate limits)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn check_len(value: &str, context: &str) -> Result<(), String> {
    if value.len() > limits::MAX_STRING_LEN {
        return Err(format!("{}: string too long ({} > {})", context, value.len(), limits::MAX_STRING_LEN));
    }
    Ok(())
}

/// Validate an imported room against the room invariant and resource limits
pub fn validate_room(room: &Room) -> Result<(), String> {
    if let Err(issues) = room.dimensions.validate() {
        let list: Vec<String> = issues.iter().map(ToString::to_string).collect();
        return Err(format!("dimensions: {}", list.join(", ")));
    }
    check_len(&room.name, "name")?;

    if room.walls.len() > limits::MAX_WALLS {
        return Err(format!("too many walls ({} > {})", room.walls.len(), limits::MAX_WALLS));
    }
    if room.furniture.len() > limits::MAX_FURNITURE {
        return Err(format!("too many furniture items ({} > {})", room.furniture.len(), limits::MAX_FURNITURE));
    }

    for (i, wall) in room.walls.iter().enumerate() {
        let context = format!("walls[{}]", i);
        if !wall.id.is_valid() {
            return Err(format!("{}: invalid id", context));
        }
        if !is_valid_float(wall.position.x) || !is_valid_float(wall.position.z) || !is_valid_float(wall.rotation) {
            return Err(format!("{}: invalid placement", context));
        }
        if !is_valid_float(wall.dimensions.width) || !is_valid_float(wall.dimensions.height) {
            return Err(format!("{}: invalid dimensions", context));
        }
        if wall.openings.len() > limits::MAX_OPENINGS_PER_WALL {
            return Err(format!("{}: too many openings ({} > {})",
                context, wall.openings.len(), limits::MAX_OPENINGS_PER_WALL));
        }
        check_len(&wall.color, &context)?;
    }

    for (i, item) in room.furniture.iter().enumerate() {
        let context = format!("furniture[{}]", i);
        if !item.id.is_valid() {
            return Err(format!("{}: invalid id", context));
        }
        let p = item.position;
        let r = item.rotation;
        if ![p.x, p.y, p.z, r.x, r.y, r.z].iter().all(|v| is_valid_float(*v)) {
            return Err(format!("{}: invalid placement", context));
        }
        check_len(&item.color, &context)?;
        check_len(&item.material, &context)?;
    }

    // Ids are unique across every entity kind. Missing ids (0) are assigned on load.
    let mut ids: Vec<u32> = room.entity_ids().filter(|id| id.is_valid()).map(|id| id.0).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != total {
        return Err("duplicate entity ids".to_string());
    }

    Ok(())
}
