//! Orbit camera for the room viewport
//!
//! The camera circles a target point. Position and basis are derived from
//! (target, distance, azimuth, elevation) and recomputed on every change.

use serde::{Deserialize, Serialize};
use super::math::Vec3;

/// Elevation limit just short of straight up/down so the basis stays defined
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 80.0;

/// Named camera placements offered by the view menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPreset {
    #[default]
    Perspective,
    Top,
    Front,
    Side,
    Isometric,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 5] = [
        CameraPreset::Perspective,
        CameraPreset::Top,
        CameraPreset::Front,
        CameraPreset::Side,
        CameraPreset::Isometric,
    ];

    /// Eye position for this preset; every preset looks at the origin
    pub fn eye(self) -> Vec3 {
        match self {
            CameraPreset::Perspective => Vec3::new(5.0, 5.0, 5.0),
            CameraPreset::Top => Vec3::new(0.0, 20.0, 0.0),
            CameraPreset::Front => Vec3::new(0.0, 5.0, 15.0),
            CameraPreset::Side => Vec3::new(15.0, 5.0, 0.0),
            CameraPreset::Isometric => Vec3::new(10.0, 10.0, 10.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraPreset::Perspective => "Perspective",
            CameraPreset::Top => "Top",
            CameraPreset::Front => "Front",
            CameraPreset::Side => "Side",
            CameraPreset::Isometric => "Isometric",
        }
    }
}

/// Perspective camera orbiting a target point
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Horizontal angle around +Y (radians), 0 = camera on +Z looking toward -Z
    pub azimuth: f32,
    /// Vertical angle above the floor plane (radians)
    pub elevation: f32,
    /// Vertical field of view (radians)
    pub fov_y: f32,

    // Computed
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::looking_from(CameraPreset::Perspective.eye(), Vec3::ZERO)
    }

    /// Camera at `eye` looking at `target`
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let mut cam = Self {
            target,
            distance: 1.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov_y: 75f32.to_radians(),
            position: eye,
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::UP,
        };
        cam.set_eye(eye);
        cam
    }

    pub fn from_preset(preset: CameraPreset) -> Self {
        Self::looking_from(preset.eye(), Vec3::ZERO)
    }

    pub fn apply_preset(&mut self, preset: CameraPreset) {
        self.target = Vec3::ZERO;
        self.set_eye(preset.eye());
    }

    /// Re-derive orbit parameters so the camera sits at `eye`
    pub fn set_eye(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        let distance = offset.len().max(MIN_DISTANCE);
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        self.distance = distance;
        self.elevation = offset.y.atan2(horizontal).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.azimuth = if horizontal > 0.0001 { offset.x.atan2(offset.z) } else { 0.0 };
        self.update_basis();
    }

    pub fn update_basis(&mut self) {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();

        // Unit vector from target to eye
        let back = Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az);
        self.position = self.target + back * self.distance;
        self.forward = -back;
        self.right = self.forward.cross(Vec3::UP).normalize();
        self.up = self.right.cross(self.forward);
    }

    /// Orbit around the target by pointer deltas (radians)
    pub fn rotate(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth += d_azimuth;
        self.elevation = (self.elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.update_basis();
    }

    /// Slide the target in the camera's right/up plane
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let speed = self.distance * 0.002;
        self.target = self.target - self.right * (dx * speed) + self.up * (dy * speed);
        self.update_basis();
    }

    /// Multiply distance by `factor` (< 1 zooms in)
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_basis();
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.forward.is_finite() && self.fov_y.is_finite()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 0.01
    }

    #[test]
    fn test_presets_reproduce_eye_position() {
        for preset in CameraPreset::ALL {
            let cam = OrbitCamera::from_preset(preset);
            if preset == CameraPreset::Top {
                // Elevation is clamped short of vertical, so the eye drifts slightly
                assert!((cam.position.y - 20.0).abs() < 0.01);
                assert!(cam.position.horizontal().len() < 0.5);
            } else {
                assert!(approx(cam.position, preset.eye()), "{:?}: {:?}", preset, cam.position);
            }
        }
    }

    #[test]
    fn test_forward_points_at_target() {
        let cam = OrbitCamera::looking_from(Vec3::new(0.0, 5.0, 15.0), Vec3::ZERO);
        let to_target = (cam.target - cam.position).normalize();
        assert!(cam.forward.dot(to_target) > 0.999);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cam = OrbitCamera::from_preset(CameraPreset::Isometric);
        assert!(cam.forward.dot(cam.right).abs() < 0.001);
        assert!(cam.forward.dot(cam.up).abs() < 0.001);
        assert!(cam.right.dot(cam.up).abs() < 0.001);
        assert!(cam.up.y > 0.0, "up should point upward, got {:?}", cam.up);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = OrbitCamera::new();
        cam.zoom(0.0001);
        assert!((cam.distance - MIN_DISTANCE).abs() < 0.001);
        cam.zoom(1.0e6);
        assert!((cam.distance - MAX_DISTANCE).abs() < 0.001);
    }

    #[test]
    fn test_rotate_clamps_elevation() {
        let mut cam = OrbitCamera::new();
        cam.rotate(0.0, 10.0);
        assert!(cam.elevation <= MAX_ELEVATION);
        assert!(cam.is_finite());
    }
}
