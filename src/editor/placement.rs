//! Placement constraints
//!
//! Every candidate position produced by a drag or a property edit goes
//! through two stages, in order:
//! 1. Bounds: keep the entity footprint inside the room floor
//! 2. Grid snap: round each constrained axis to the grid
//!
//! Constrain-then-snap can land half a grid cell outside the strict bound.
//! All functions are pure.

use crate::viewport::Vec3;
use crate::world::{Footprint, RoomDimensions, MAX_CEILING_HEIGHT, MIN_CEILING_HEIGHT};

/// Default grid cell in meters
pub const DEFAULT_GRID_SIZE: f32 = 0.5;

/// Grid snapping settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub enabled: bool,
    pub grid_size: f32,
}

impl SnapSettings {
    pub fn new(enabled: bool, grid_size: f32) -> Self {
        Self { enabled, grid_size }
    }

    pub fn disabled() -> Self {
        Self { enabled: false, grid_size: DEFAULT_GRID_SIZE }
    }

    /// Snap `value` if snapping is on
    pub fn apply(&self, value: f32) -> f32 {
        if self.enabled { snap_value(value, self.grid_size) } else { value }
    }
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self { enabled: true, grid_size: DEFAULT_GRID_SIZE }
    }
}

/// Snap a single value to grid
pub fn snap_value(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap the floor axes (x, z) of a position; y passes through
pub fn snap_floor_position(position: Vec3, grid_size: f32) -> Vec3 {
    Vec3::new(
        snap_value(position.x, grid_size),
        position.y,
        snap_value(position.z, grid_size),
    )
}

/// Snap an angle to increments (in radians)
pub fn snap_angle(angle: f32, step: f32) -> f32 {
    snap_value(angle, step)
}

/// Clamp `value` into `[-half_room + half_item, half_room - half_item]`.
///
/// An item wider than the room is centered.
fn clamp_axis(value: f32, room_extent: f32, item_extent: f32) -> f32 {
    let limit = room_extent / 2.0 - item_extent / 2.0;
    if !(limit >= 0.0) {
        return 0.0;
    }
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-limit, limit)
}

/// Keep a footprint centered at `position` inside the room floor.
///
/// Unknown or non-positive footprint extents count as 1 meter.
pub fn constrain_to_room(position: Vec3, room: &RoomDimensions, footprint: Footprint) -> Vec3 {
    let footprint = footprint.or_unit();
    Vec3::new(
        clamp_axis(position.x, room.width, footprint.width),
        position.y,
        clamp_axis(position.z, room.length, footprint.depth),
    )
}

pub fn clamp_ceiling_height(height: f32) -> f32 {
    if height.is_nan() {
        return MIN_CEILING_HEIGHT;
    }
    height.clamp(MIN_CEILING_HEIGHT, MAX_CEILING_HEIGHT)
}

/// Full pipeline for a floor position: bounds first, then grid snap
pub fn place_on_floor(position: Vec3, room: &RoomDimensions, footprint: Footprint, snap: SnapSettings) -> Vec3 {
    let constrained = constrain_to_room(position, room, footprint);
    if snap.enabled {
        snap_floor_position(constrained, snap.grid_size)
    } else {
        constrained
    }
}

/// Full pipeline for a ceiling height: clamp first, then grid snap
pub fn place_ceiling(height: f32, snap: SnapSettings) -> f32 {
    snap.apply(clamp_ceiling_height(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FurnitureKind;

    const ROOM: RoomDimensions = RoomDimensions { width: 10.0, length: 10.0, height: 3.0 };

    fn table_footprint() -> Footprint {
        let d = FurnitureKind::Table.defaults().dimensions;
        Footprint::new(d.width, d.depth)
    }

    #[test]
    fn test_snap_value() {
        assert!((snap_value(1.26, 0.5) - 1.5).abs() < 0.0001);
        assert!((snap_value(-0.74, 0.5) + 0.5).abs() < 0.0001);
        assert!((snap_value(3.3, 0.0) - 3.3).abs() < 0.0001);
    }

    #[test]
    fn test_snap_is_idempotent() {
        for grid in [0.1, 0.25, 0.5, 1.0, 2.0] {
            let mut v = -13.7_f32;
            while v < 13.7 {
                let once = snap_value(v, grid);
                let twice = snap_value(once, grid);
                assert!((once - twice).abs() < 1.0e-4, "grid {} value {}", grid, v);
                v += 0.37;
            }
        }
    }

    #[test]
    fn test_snap_leaves_height_alone() {
        let p = snap_floor_position(Vec3::new(1.2, 0.73, -2.6), 0.5);
        assert!((p.x - 1.0).abs() < 0.0001);
        assert!((p.y - 0.73).abs() < 0.0001);
        assert!((p.z + 2.5).abs() < 0.0001);
    }

    #[test]
    fn test_bounds_contain_far_inputs() {
        let footprint = Footprint::new(2.0, 1.0);
        for (x, z) in [(1.0e6, -1.0e6), (-500.0, 500.0), (f32::INFINITY, f32::NEG_INFINITY), (3.0, 0.5)] {
            let p = constrain_to_room(Vec3::new(x, 0.0, z), &ROOM, footprint);
            assert!(p.x >= -4.0 && p.x <= 4.0, "x = {}", p.x);
            assert!(p.z >= -4.5 && p.z <= 4.5, "z = {}", p.z);
        }
    }

    #[test]
    fn test_bounds_pass_height_through() {
        let p = constrain_to_room(Vec3::new(0.0, 1.25, 0.0), &ROOM, Footprint::UNIT);
        assert!((p.y - 1.25).abs() < 0.0001);
    }

    #[test]
    fn test_unknown_footprint_counts_as_one_meter() {
        let p = constrain_to_room(Vec3::new(100.0, 0.0, 100.0), &ROOM, Footprint::new(0.0, -1.0));
        assert!((p.x - 4.5).abs() < 0.0001);
        assert!((p.z - 4.5).abs() < 0.0001);
    }

    #[test]
    fn test_oversized_footprint_is_centered() {
        let p = constrain_to_room(Vec3::new(3.0, 0.0, 3.0), &ROOM, Footprint::new(12.0, 1.0));
        assert_eq!(p.x, 0.0);
        assert!((p.z - 3.0).abs() < 0.0001);
    }

    #[test]
    fn test_table_clamps_then_snaps() {
        // 10x10 room, 1.5m table: strict bound is 5 - 0.75 = 4.25
        let candidate = Vec3::new(7.0, 0.0, 0.0);
        let clamped = constrain_to_room(candidate, &ROOM, table_footprint());
        assert!((clamped.x - 4.25).abs() < 0.0001);

        let unsnapped = place_on_floor(candidate, &ROOM, table_footprint(), SnapSettings::disabled());
        assert!((unsnapped.x - 4.25).abs() < 0.0001);

        // 4.25 / 0.5 = 8.5 rounds away from zero to 9, half a cell past the bound
        let snapped = place_on_floor(candidate, &ROOM, table_footprint(), SnapSettings::default());
        assert!((snapped.x - 4.5).abs() < 0.0001);
        assert!(snapped.x - 4.25 <= DEFAULT_GRID_SIZE / 2.0 + 0.0001);
    }

    #[test]
    fn test_ceiling_height_clamp() {
        assert!((clamp_ceiling_height(1.0) - 2.0).abs() < 0.0001);
        assert!((clamp_ceiling_height(12.0) - 10.0).abs() < 0.0001);
        assert!((clamp_ceiling_height(f32::NAN) - 2.0).abs() < 0.0001);
        assert!((place_ceiling(2.8, SnapSettings::default()) - 3.0).abs() < 0.0001);
        assert!((place_ceiling(2.8, SnapSettings::disabled()) - 2.8).abs() < 0.0001);
    }

    #[test]
    fn test_snap_angle() {
        let step = std::f32::consts::FRAC_PI_4;
        assert!((snap_angle(0.7, step) - step).abs() < 0.0001);
    }
}
