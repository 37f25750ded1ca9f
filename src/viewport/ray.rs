//! Ray casting utilities for picking and drag operations
//!
//! Converts pointer coordinates into world-space rays through the orbit
//! camera, and intersects those rays with planes and boxes.

use super::camera::OrbitCamera;
use super::math::{SurfaceSize, Vec3};

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,  // Normalized
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize()
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Normalize pointer coordinates to device coordinates in [-1, 1].
///
/// Screen Y grows downward, NDC Y grows upward.
pub fn pointer_to_ndc(pointer: (f32, f32), surface: SurfaceSize) -> (f32, f32) {
    (
        (pointer.0 / surface.width) * 2.0 - 1.0,
        -(pointer.1 / surface.height) * 2.0 + 1.0,
    )
}

/// Generate a ray from pointer coordinates through a perspective camera.
pub fn screen_to_ray(pointer: (f32, f32), surface: SurfaceSize, camera: &OrbitCamera) -> Ray {
    let (ndc_x, ndc_y) = pointer_to_ndc(pointer, surface);
    let half_h = (camera.fov_y * 0.5).tan();
    let half_w = half_h * surface.aspect();

    let direction = camera.forward
        + camera.right * (ndc_x * half_w)
        + camera.up * (ndc_y * half_h);

    Ray::new(camera.position, direction)
}

/// Find the intersection of a ray with a plane.
///
/// Returns the distance along the ray to the intersection point,
/// or None if the ray is parallel to the plane or intersection is behind ray origin.
pub fn ray_plane_intersection(
    ray: &Ray,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < 0.0001 {
        return None;  // Ray parallel to plane
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;  // Intersection behind ray origin
    }

    Some(t)
}

/// Map a pointer position onto the floor plane (y = 0).
///
/// Returns None when the camera or render surface is not available yet, or
/// when the pointer ray never reaches the floor. Callers treat None as
/// "no movement this frame".
pub fn screen_to_world(
    pointer: (f32, f32),
    camera: Option<&OrbitCamera>,
    surface: Option<SurfaceSize>,
) -> Option<Vec3> {
    let camera = camera?;
    let surface = surface.filter(SurfaceSize::is_usable)?;
    let ray = screen_to_ray(pointer, surface, camera);
    pick_plane_point(&ray, Vec3::ZERO, Vec3::UP)
}

/// Intersection point of a ray with an arbitrary plane
pub fn pick_plane_point(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let t = ray_plane_intersection(ray, plane_point, plane_normal)?;
    let hit = ray.at(t);
    hit.is_finite().then_some(hit)
}

/// Ray vs. a box rotated around +Y (slab test in the box's local frame).
///
/// `center` is the box center, `half_extents` are local half sizes and `yaw`
/// the rotation around +Y. Returns the entry distance along the ray.
pub fn ray_box_intersection(ray: &Ray, center: Vec3, half_extents: Vec3, yaw: f32) -> Option<f32> {
    // Bring the ray into box space
    let origin = (ray.origin - center).rotate_y(-yaw);
    let dir = ray.direction.rotate_y(-yaw);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for (o, d, h) in [
        (origin.x, dir.x, half_extents.x),
        (origin.y, dir.y, half_extents.y),
        (origin.z, dir.z, half_extents.z),
    ] {
        if d.abs() < 1.0e-6 {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;  // Box is behind the ray
    }
    Some(t_min.max(0.0))
}
