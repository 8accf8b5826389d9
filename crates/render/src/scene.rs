//! Fixed layout of the Earth scene.

use glam::{Vec3, Vec4};

/// Scene rotation advance in degrees per second.
pub const ROTATION_RATE: f64 = 3.0;

pub const CLEAR_COLOR: Vec4 = Vec4::ONE;

/// Half the edge length of the starfield cube.
pub const STARFIELD_HALF_EXTENT: f32 = 2000.0;
pub const STARFIELD_AXIS: Vec3 = Vec3::new(0.2, 0.7, 0.4);
/// The starfield turns at this fraction of the scene rotation.
pub const STARFIELD_DIVISOR: f32 = 5.0;

/// Distance from the camera origin to the planet center along -Z.
pub const PLANET_DISTANCE: f32 = 20.0;
pub const AXIAL_TILT: f32 = 23.44;
/// Turns the sphere's pole onto the tilted spin axis.
pub const POLE_CORRECTION: f32 = 90.0;

pub const SURFACE_RADIUS: f32 = 5.0;
pub const SURFACE_SEGMENTS: u32 = 100;
pub const GRID_RADIUS_SCALE: f32 = 1.02;
pub const GRID_SEGMENTS: u32 = 50;
pub const CLOUD_RADIUS_SCALE: f32 = 1.08;
pub const CLOUD_SEGMENTS: u32 = 120;
pub const CLOUD_AXIS: Vec3 = Vec3::new(0.3, 0.6, 0.4);
/// The cloud shell turns at this fraction of the scene rotation.
pub const CLOUD_DIVISOR: f32 = 2.0;

/// The rotation axis line extends this far from the planet center each way.
pub const AXIS_HALF_LENGTH: f32 = 10.0;

/// Ambient light applied to every lit surface regardless of the light source.
pub const GLOBAL_AMBIENT: f32 = 0.2;

/// Image files per layer, best first. Later entries are smaller fallbacks
/// for when the first is missing or too large for the device.
pub const STARFIELD_TEXTURES: &[&str] = &["starmap_4k.jpg", "starmap_1k.jpg"];
pub const SURFACE_TEXTURES: &[&str] = &["earthmap4k.jpg", "earthmap1k.jpg"];
pub const CLOUD_TEXTURES: &[&str] = &["earth_clouds_4k.jpg", "earth_clouds_1k.jpg"];

/// Accumulated spin angle of the scene, in degrees.
///
/// Unbounded; consumers only feed it to rotations, which are periodic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneRotation {
    degrees: f64,
}

impl SceneRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Planet spin.
    pub fn planet_angle(&self) -> f32 {
        self.degrees as f32
    }

    pub fn starfield_angle(&self) -> f32 {
        self.planet_angle() / STARFIELD_DIVISOR
    }

    pub fn cloud_angle(&self) -> f32 {
        self.planet_angle() / CLOUD_DIVISOR
    }

    pub fn advance(&mut self, elapsed: f64) {
        self.degrees += ROTATION_RATE * elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_time_proportional() {
        let mut coarse = SceneRotation::new();
        for _ in 0..10 {
            coarse.advance(1.0);
        }
        let mut fine = SceneRotation::new();
        for _ in 0..10_000 {
            fine.advance(0.001);
        }
        assert!((coarse.degrees() - 30.0).abs() < 1e-9);
        assert!((fine.degrees() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn layers_turn_slower() {
        let mut rotation = SceneRotation::new();
        rotation.advance(20.0);
        assert_eq!(rotation.planet_angle(), 60.0);
        assert_eq!(rotation.starfield_angle(), 12.0);
        assert_eq!(rotation.cloud_angle(), 30.0);
    }

    #[test]
    fn radii_derive_from_surface() {
        assert!((SURFACE_RADIUS * GRID_RADIUS_SCALE - 5.1).abs() < 1e-5);
        assert!((SURFACE_RADIUS * CLOUD_RADIUS_SCALE - 5.4).abs() < 1e-5);
    }
}
