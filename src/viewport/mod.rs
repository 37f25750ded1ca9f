//! Viewport geometry: vectors, the orbit camera and pointer ray casting
//!
//! - `math` - Vec3 and render-surface size
//! - `camera` - Orbit camera and view presets
//! - `ray` - Pointer → ray → floor-plane mapping, ray/box picking

pub mod camera;
pub mod math;
pub mod ray;

pub use camera::{CameraPreset, OrbitCamera};
pub use math::{SurfaceSize, Vec3};
pub use ray::{
    Ray, screen_to_ray, screen_to_world, pick_plane_point,
    ray_plane_intersection, ray_box_intersection,
};
