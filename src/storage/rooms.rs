//! Saved-room collection
//!
//! The whole collection lives in memory and is written back to a single key
//! after every mutation. Storage failures are logged; the editor keeps
//! working from the in-memory copy.
//!
//! Records are read one at a time. A record that still fails to parse is
//! kept verbatim and written back untouched, so one bad entry never costs
//! the rest of the collection.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{KeyValueStore, StorageError};
use crate::world::{
    now_timestamp, seed_rooms, Ceiling, Furniture, Room, RoomDimensions, RoomId, Wall, DEFAULT_ROOM_NAME,
};

/// Storage key holding the room collection
pub const ROOMS_KEY: &str = "roomcraft_rooms";

/// Partial room change for `update_room`; absent fields are kept
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub dimensions: Option<RoomDimensions>,
    pub walls: Option<Vec<Wall>>,
    pub furniture: Option<Vec<Furniture>>,
    /// `Some(None)` removes the ceiling
    pub ceiling: Option<Option<Ceiling>>,
}

pub struct RoomService {
    store: Box<dyn KeyValueStore>,
    rooms: Vec<Room>,
    /// Stored records that could not be read as rooms
    unreadable: Vec<Value>,
}

/// Split a stored collection into rooms and records that are not rooms
fn parse_records(records: Vec<Value>) -> (Vec<Room>, Vec<Value>) {
    let mut rooms = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for record in records {
        match Room::deserialize(&record) {
            Ok(mut room) => {
                room.sanitize();
                rooms.push(room);
            }
            Err(e) => {
                warn!(id = ?record.get("id"), "keeping unreadable saved room as is: {}", e);
                unreadable.push(record);
            }
        }
    }
    (rooms, unreadable)
}

impl RoomService {
    /// Load the collection from `store`, falling back to `seed` when nothing
    /// usable is stored
    pub fn open(store: Box<dyn KeyValueStore>, seed: Vec<Room>) -> Self {
        let (rooms, unreadable) = match store.get(ROOMS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Value>>(&json) {
                Ok(records) => {
                    let (rooms, unreadable) = parse_records(records);
                    info!(
                        count = rooms.len(),
                        unreadable = unreadable.len(),
                        location = %store.describe(),
                        "loaded saved rooms"
                    );
                    (rooms, unreadable)
                }
                Err(e) => {
                    warn!("saved rooms are unreadable, using sample rooms: {}", e);
                    (seed, Vec::new())
                }
            },
            Ok(None) => (seed, Vec::new()),
            Err(e) => {
                warn!("failed to load rooms from storage: {}", e);
                (seed, Vec::new())
            }
        };
        Self { store, rooms, unreadable }
    }

    /// Open with the bundled sample rooms as fallback
    pub fn open_default(store: Box<dyn KeyValueStore>) -> Self {
        Self::open(store, seed_rooms())
    }

    fn persist(&mut self) {
        let result = self
            .rooms
            .iter()
            .map(serde_json::to_value)
            .chain(self.unreadable.iter().cloned().map(Ok))
            .collect::<Result<Vec<Value>, _>>()
            .and_then(|records| serde_json::to_string(&records))
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(ROOMS_KEY, &json));
        if let Err(e) = result {
            warn!("failed to save rooms to storage: {}", e);
        }
    }

    /// Next free id: one past the highest in use (unreadable records
    /// included), 1 when empty
    pub fn next_id(&self) -> RoomId {
        let readable = self.rooms.iter().filter_map(|r| r.id).map(|id| id.0);
        let unreadable = self
            .unreadable
            .iter()
            .filter_map(|record| record.get("id")?.as_u64())
            .filter_map(|id| u32::try_from(id).ok());
        RoomId(readable.chain(unreadable).max().unwrap_or(0) + 1)
    }

    fn index_of(&self, id: RoomId) -> Result<usize, StorageError> {
        self.rooms
            .iter()
            .position(|r| r.id == Some(id))
            .ok_or_else(StorageError::room_not_found)
    }

    pub fn get_all_rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn get_room(&self, id: RoomId) -> Result<Room, StorageError> {
        Ok(self.rooms[self.index_of(id)?].clone())
    }

    /// Add `template` as a new record under a fresh id
    pub fn create_room(&mut self, template: Room) -> Room {
        let mut room = template;
        room.id = Some(self.next_id());
        if room.name.trim().is_empty() {
            room.name = DEFAULT_ROOM_NAME.to_string();
        }
        room.last_modified = now_timestamp();
        self.rooms.push(room.clone());
        self.persist();
        room
    }

    /// Insert or replace by id. A room without id gets a fresh one.
    pub fn save_room(&mut self, room: Room) -> Room {
        let mut saved = room;
        if saved.id.is_none() {
            saved.id = Some(self.next_id());
        }
        saved.last_modified = now_timestamp();

        match self.rooms.iter().position(|r| r.id == saved.id) {
            Some(i) => self.rooms[i] = saved.clone(),
            None => self.rooms.push(saved.clone()),
        }
        self.persist();
        saved
    }

    pub fn update_room(&mut self, id: RoomId, update: RoomUpdate) -> Result<Room, StorageError> {
        let i = self.index_of(id)?;
        let room = &mut self.rooms[i];
        if let Some(name) = update.name {
            room.name = name;
        }
        if let Some(dimensions) = update.dimensions {
            room.dimensions = dimensions;
        }
        if let Some(walls) = update.walls {
            room.walls = walls;
        }
        if let Some(furniture) = update.furniture {
            room.furniture = furniture;
        }
        if let Some(ceiling) = update.ceiling {
            room.ceiling = ceiling;
        }
        room.last_modified = now_timestamp();
        let updated = room.clone();
        self.persist();
        Ok(updated)
    }

    pub fn delete_room(&mut self, id: RoomId) -> Result<(), StorageError> {
        let i = self.index_of(id)?;
        self.rooms.remove(i);
        self.persist();
        Ok(())
    }

    /// Id of the room stored after `current`, wrapping around
    pub fn next_room_after(&self, current: Option<RoomId>) -> Option<RoomId> {
        let ids: Vec<RoomId> = self.rooms.iter().filter_map(|r| r.id).collect();
        let pos = current.and_then(|c| ids.iter().position(|id| *id == c));
        match pos {
            Some(p) => ids.get((p + 1) % ids.len()).copied(),
            None => ids.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStorage, MemoryStorage};
    use crate::world::EntityId;
    use tempfile::TempDir;

    fn empty_service() -> RoomService {
        RoomService::open(Box::new(MemoryStorage::new()), Vec::new())
    }

    #[test]
    fn test_save_without_id_allocates_sequentially() {
        let mut service = empty_service();
        let first = service.save_room(Room::new("First"));
        let second = service.save_room(Room::new("Second"));
        assert_eq!(first.id, Some(RoomId(1)));
        assert_eq!(second.id, Some(RoomId(2)));
        assert_eq!(service.get_all_rooms().len(), 2);
    }

    #[test]
    fn test_save_upserts_by_id() {
        let mut service = empty_service();
        let mut room = service.save_room(Room::new("Draft"));
        room.name = "Final".to_string();
        service.save_room(room);
        assert_eq!(service.get_all_rooms().len(), 1);
        assert_eq!(service.get_room(RoomId(1)).unwrap().name, "Final");
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let mut service = empty_service();
        service.save_room(Room::new("Only"));
        let err = service.delete_room(RoomId(999)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Room not found");
        assert_eq!(service.get_all_rooms().len(), 1);
    }

    #[test]
    fn test_get_and_update_unknown_are_not_found() {
        let mut service = empty_service();
        assert!(service.get_room(RoomId(3)).unwrap_err().is_not_found());
        assert!(service.update_room(RoomId(3), RoomUpdate::default()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_room_defaults_name() {
        let mut service = empty_service();
        let room = service.create_room(Room::new(""));
        assert_eq!(room.name, DEFAULT_ROOM_NAME);
        assert_eq!(room.id, Some(RoomId(1)));
    }

    #[test]
    fn test_update_room_merges_fields() {
        let mut service = empty_service();
        let mut room = Room::new("Bedroom");
        room.ceiling = Some(Ceiling::new(EntityId(1), 3.0));
        let id = service.save_room(room).id.unwrap();

        let updated = service
            .update_room(id, RoomUpdate {
                name: Some("Guest Room".to_string()),
                ceiling: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.name, "Guest Room");
        assert!(updated.ceiling.is_none());
        assert_eq!(updated.dimensions, RoomDimensions::DEFAULT);
    }

    #[test]
    fn test_next_id_after_delete_uses_max() {
        let mut service = empty_service();
        for name in ["a", "b", "c"] {
            service.save_room(Room::new(name));
        }
        service.delete_room(RoomId(2)).unwrap();
        assert_eq!(service.next_id(), RoomId(4));
        service.delete_room(RoomId(3)).unwrap();
        assert_eq!(service.next_id(), RoomId(2));
    }

    #[test]
    fn test_falls_back_to_seed() {
        let service = RoomService::open_default(Box::new(MemoryStorage::new()));
        assert!(!service.get_all_rooms().is_empty());

        let mut broken = MemoryStorage::new();
        broken.set(ROOMS_KEY, "{ not json").unwrap();
        let service = RoomService::open(Box::new(broken), vec![Room::new("Seed")]);
        assert_eq!(service.get_all_rooms()[0].name, "Seed");
    }

    #[test]
    fn test_partial_record_loads_with_its_neighbours() {
        let mut stored = MemoryStorage::new();
        stored
            .set(
                ROOMS_KEY,
                r#"[
                    {"id": 1, "name": "Mine", "furniture": [{"id": 2, "type": "chair", "material": "wood"}]},
                    {"id": 2, "name": "Other"}
                ]"#,
            )
            .unwrap();
        let mut service = RoomService::open(Box::new(stored), vec![Room::new("Seed")]);

        let names: Vec<&str> = service.get_all_rooms().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Mine", "Other"]);
        let chair = &service.get_room(RoomId(1)).unwrap().furniture[0];
        assert_eq!(chair.color, "#10b981");
        assert_eq!(chair.material, "wood");

        // A save writes both rooms back rather than the sample set
        service.save_room(Room::new("Third"));
        let json = service.store.get(ROOMS_KEY).unwrap().unwrap();
        let mut copy = MemoryStorage::new();
        copy.set(ROOMS_KEY, &json).unwrap();
        let reopened = RoomService::open(Box::new(copy), Vec::new());
        assert_eq!(reopened.get_all_rooms().len(), 3);
        assert_eq!(reopened.get_room(RoomId(1)).unwrap().furniture[0].color, "#10b981");
    }

    #[test]
    fn test_unreadable_record_is_kept_on_save() {
        let mut stored = MemoryStorage::new();
        stored
            .set(ROOMS_KEY, r#"[{"id": 1, "name": "Good"}, {"id": 5, "dimensions": "huge"}]"#)
            .unwrap();
        let mut service = RoomService::open(Box::new(stored), vec![Room::new("Seed")]);
        assert_eq!(service.get_all_rooms().len(), 1);
        assert_eq!(service.get_all_rooms()[0].name, "Good");

        // Ids of unreadable records stay reserved
        assert_eq!(service.save_room(Room::new("New")).id, Some(RoomId(6)));

        let json = service.store.get(ROOMS_KEY).unwrap().unwrap();
        let records: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().any(|r| r["dimensions"] == "huge"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut service = RoomService::open(Box::new(LocalStorage::with_base_dir(dir.path())), Vec::new());
            service.save_room(Room::new("Kept"));
        }
        let service = RoomService::open(Box::new(LocalStorage::with_base_dir(dir.path())), vec![Room::new("Seed")]);
        assert_eq!(service.get_all_rooms().len(), 1);
        assert_eq!(service.get_room(RoomId(1)).unwrap().name, "Kept");
    }

    #[test]
    fn test_next_room_after_wraps() {
        let mut service = empty_service();
        assert_eq!(service.next_room_after(None), None);
        service.save_room(Room::new("a"));
        service.save_room(Room::new("b"));
        assert_eq!(service.next_room_after(None), Some(RoomId(1)));
        assert_eq!(service.next_room_after(Some(RoomId(1))), Some(RoomId(2)));
        assert_eq!(service.next_room_after(Some(RoomId(2))), Some(RoomId(1)));
    }
}
