//! Bundled sample rooms, used when nothing has been persisted yet

use tracing::warn;
use super::Room;

const SEED_ROOMS: &str = include_str!("../../assets/seed/rooms.json");

/// Parse the bundled sample rooms. A broken bundle yields no rooms.
pub fn seed_rooms() -> Vec<Room> {
    match serde_json::from_str::<Vec<Room>>(SEED_ROOMS) {
        Ok(mut rooms) => {
            for room in &mut rooms {
                room.sanitize();
            }
            rooms
        }
        Err(e) => {
            warn!("bundled seed rooms failed to parse: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::room_io::validate_room;

    #[test]
    fn test_seed_rooms_parse_and_validate() {
        let rooms = seed_rooms();
        assert_eq!(rooms.len(), 2);
        for room in &rooms {
            assert!(room.id.is_some());
            validate_room(room).unwrap();
        }
        // Scalar rotation in the seed is read as a yaw
        assert_eq!(rooms[0].furniture[1].rotation.y, 0.0);
        assert!((rooms[1].furniture[1].rotation.y - std::f32::consts::PI).abs() < 0.001);
    }
}
