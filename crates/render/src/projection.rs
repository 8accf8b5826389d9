use glam::Mat4;

/// Perspective projection matching the window's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            aspect: 4.0 / 3.0,
            near: 1.0,
            far: 4000.0,
        }
    }
}

impl Projection {
    pub fn for_size(width: u32, height: u32) -> Self {
        let mut projection = Self::default();
        projection.resize(width, height);
        projection
    }

    /// Zero height is treated as one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn aspect_from_size() {
        let p = Projection::for_size(1024, 768);
        assert!((p.aspect - 4.0 / 3.0).abs() < 1e-6);
        let p = Projection::for_size(640, 0);
        assert_eq!(p.aspect, 640.0);
    }

    #[test]
    fn starfield_corners_fit_depth_range() {
        let p = Projection::default();
        let corner = Vec3::splat(-2000.0);
        let clip = p.matrix().project_point3(corner);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
