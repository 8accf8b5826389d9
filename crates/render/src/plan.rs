use crate::material::{Light, Shading};
use crate::scene;
use glam::{Mat4, Vec3, Vec4};
use nutshell_assets::TextureId;

/// One layer of the scene, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawStep {
    Starfield,
    Surface,
    SurfaceGrid,
    Axis,
    CloudShell,
}

impl DrawStep {
    pub const ALL: [DrawStep; 5] = [
        DrawStep::Starfield,
        DrawStep::Surface,
        DrawStep::SurfaceGrid,
        DrawStep::Axis,
        DrawStep::CloudShell,
    ];

    pub fn geometry(self) -> Geometry {
        match self {
            DrawStep::Starfield => Geometry::Cube {
                half_extent: scene::STARFIELD_HALF_EXTENT,
            },
            DrawStep::Surface => Geometry::Sphere {
                radius: scene::SURFACE_RADIUS,
                segments: scene::SURFACE_SEGMENTS,
                wireframe: false,
            },
            DrawStep::SurfaceGrid => Geometry::Sphere {
                radius: scene::SURFACE_RADIUS * scene::GRID_RADIUS_SCALE,
                segments: scene::GRID_SEGMENTS,
                wireframe: true,
            },
            DrawStep::Axis => Geometry::Line {
                from: Vec3::new(0.0, 0.0, -scene::AXIS_HALF_LENGTH),
                to: Vec3::new(0.0, 0.0, scene::AXIS_HALF_LENGTH),
            },
            DrawStep::CloudShell => Geometry::Sphere {
                radius: scene::SURFACE_RADIUS * scene::CLOUD_RADIUS_SCALE,
                segments: scene::CLOUD_SEGMENTS,
                wireframe: false,
            },
        }
    }
}

/// Shape drawn by a step, in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Cube centered at the origin, textured on its inward faces.
    Cube { half_extent: f32 },
    /// Sphere with its poles on the Z axis, `segments` slices and stacks.
    Sphere {
        radius: f32,
        segments: u32,
        wireframe: bool,
    },
    Line { from: Vec3, to: Vec3 },
}

/// A single draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub step: DrawStep,
    pub geometry: Geometry,
    /// Model to view transform.
    pub model_view: Mat4,
    pub shading: Shading,
    /// `None` draws the geometry untextured.
    pub texture: Option<TextureId>,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: Vec4,
    pub view: Mat4,
    /// Scene light, already in view space.
    pub light: Light,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// Empty frame with an identity view.
    pub fn new(clear_color: Vec4) -> Self {
        Self {
            clear_color,
            view: Mat4::IDENTITY,
            light: Light::sun(),
            draws: Vec::with_capacity(DrawStep::ALL.len()),
        }
    }

    pub fn push(&mut self, draw: DrawCall) {
        self.draws.push(draw);
    }

    pub fn draw(&self, step: DrawStep) -> Option<&DrawCall> {
        self.draws.iter().find(|d| d.step == step)
    }

    pub fn steps(&self) -> impl Iterator<Item = DrawStep> + '_ {
        self.draws.iter().map(|d| d.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered() {
        let mut sorted = DrawStep::ALL;
        sorted.sort();
        assert_eq!(sorted, DrawStep::ALL);
    }

    #[test]
    fn only_grid_is_wireframe() {
        for step in DrawStep::ALL {
            let wire = matches!(
                step.geometry(),
                Geometry::Sphere {
                    wireframe: true,
                    ..
                }
            );
            assert_eq!(wire, step == DrawStep::SurfaceGrid);
        }
    }

    #[test]
    fn new_plan_is_identity() {
        let plan = FramePlan::new(Vec4::ONE);
        assert_eq!(plan.view, Mat4::IDENTITY);
        assert!(plan.draws.is_empty());
        assert!(plan.draw(DrawStep::Axis).is_none());
    }
}
