//! Entity picking
//!
//! Casts the pointer ray against every entity's box and reports the nearest
//! hit. The ceiling spans the whole room and would shadow everything when
//! seen from above, so it only wins when nothing else is hit.

use crate::viewport::{ray_box_intersection, Ray, Vec3};
use crate::world::{EntityId, EntityKind, Room};

/// Half thickness of the ceiling slab used for picking
const CEILING_HALF_THICKNESS: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub kind: EntityKind,
    /// Distance along the ray
    pub distance: f32,
}

pub fn pick_entity(ray: &Ray, room: &Room) -> Option<PickHit> {
    let walls = room.walls.iter().filter_map(|w| {
        let (center, half, yaw) = w.render_box()?;
        let distance = ray_box_intersection(ray, center, half, yaw)?;
        Some(PickHit { entity: w.id, kind: EntityKind::Wall, distance })
    });
    let furniture = room.furniture.iter().filter_map(|f| {
        let (center, half, yaw) = f.render_box()?;
        let distance = ray_box_intersection(ray, center, half, yaw)?;
        Some(PickHit { entity: f.id, kind: EntityKind::Furniture, distance })
    });

    let nearest = walls
        .chain(furniture)
        .min_by(|a, b| a.distance.total_cmp(&b.distance));
    if nearest.is_some() {
        return nearest;
    }

    let ceiling = room.ceiling.as_ref()?;
    let center = Vec3::new(0.0, ceiling.height, 0.0);
    let half = Vec3::new(room.dimensions.width / 2.0, CEILING_HALF_THICKNESS, room.dimensions.length / 2.0);
    let distance = ray_box_intersection(ray, center, half, 0.0)?;
    Some(PickHit { entity: ceiling.id, kind: EntityKind::Ceiling, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Ceiling, Furniture, FurnitureKind, Wall};

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 20.0, z), Vec3::new(0.0, -1.0, 0.0))
    }

    fn room() -> Room {
        let mut room = Room::new("Pick");
        let mut sofa = Furniture::new(EntityId(1), FurnitureKind::Sofa);
        sofa.position = Vec3::new(2.0, 0.0, 2.0);
        room.furniture.push(sofa);
        let mut wall = Wall::new(EntityId(2));
        wall.position.z = -4.0;
        room.walls.push(wall);
        room
    }

    #[test]
    fn test_pick_furniture_and_wall() {
        let room = room();
        assert_eq!(pick_entity(&down_at(2.0, 2.0), &room).map(|h| h.entity), Some(EntityId(1)));
        assert_eq!(pick_entity(&down_at(0.0, -4.0), &room).map(|h| h.kind), Some(EntityKind::Wall));
        assert!(pick_entity(&down_at(-3.0, 1.0), &room).is_none());
    }

    #[test]
    fn test_nearest_hit_wins() {
        let mut room = room();
        let mut wardrobe = Furniture::new(EntityId(3), FurnitureKind::Wardrobe);
        wardrobe.position = Vec3::new(2.0, 0.0, 2.0);
        room.furniture.push(wardrobe);
        // The taller wardrobe is hit before the sofa when looking down
        assert_eq!(pick_entity(&down_at(2.0, 2.0), &room).map(|h| h.entity), Some(EntityId(3)));
    }

    #[test]
    fn test_ceiling_only_when_nothing_else() {
        let mut room = room();
        room.ceiling = Some(Ceiling::new(EntityId(9), 3.0));
        assert_eq!(pick_entity(&down_at(2.0, 2.0), &room).map(|h| h.entity), Some(EntityId(1)));
        assert_eq!(pick_entity(&down_at(-3.0, 1.0), &room).map(|h| h.kind), Some(EntityKind::Ceiling));
    }
}
