use crate::material::Shading;
use crate::plan::{FramePlan, Geometry};
use std::fmt::Write;

/// Backend interface. All renderers implement this trait.
///
/// A renderer executes a frame plan; it never changes camera or scene state.
pub trait Renderer {
    /// Draw one frame. Returns `false` when the backend hit a failure it
    /// cannot recover from and the render loop has to stop.
    fn render(&mut self, plan: &FramePlan) -> bool;

    /// Show the frame drawn by the last [`Renderer::render`] call.
    fn present(&mut self) {}
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of each frame plan. Useful for CLI
/// output, logging, and testing the render loop without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    last: String,
    rendered: u64,
    presented: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Description of the most recent frame.
    pub fn last_output(&self) -> &str {
        &self.last
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    pub fn describe(plan: &FramePlan) -> String {
        let mut out = String::new();
        let eye = plan.view.inverse().transform_point3(glam::Vec3::ZERO);
        let _ = writeln!(
            out,
            "=== Frame (draws={}) eye=({:.2}, {:.2}, {:.2}) ===",
            plan.draws.len(),
            eye.x,
            eye.y,
            eye.z
        );
        for draw in &plan.draws {
            let origin = draw.model_view.transform_point3(glam::Vec3::ZERO);
            let shape = match draw.geometry {
                Geometry::Cube { half_extent } => format!("cube half_extent={half_extent:.1}"),
                Geometry::Sphere {
                    radius,
                    segments,
                    wireframe,
                } => format!(
                    "{} r={radius:.2} segments={segments}",
                    if wireframe { "wire-sphere" } else { "sphere" }
                ),
                Geometry::Line { from, to } => format!("line {:.1}..{:.1}", from.z, to.z),
            };
            let shading = match draw.shading {
                Shading::Unlit { .. } => "unlit",
                Shading::Lit(_) => "lit",
            };
            let texture = match draw.texture {
                Some(id) => format!("tex#{}", id.0),
                None => "untextured".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:?}: {shape} {shading} alpha={:.2} {texture} at=({:.2}, {:.2}, {:.2})",
                draw.step,
                draw.shading.alpha(),
                origin.x,
                origin.y,
                origin.z
            );
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    fn render(&mut self, plan: &FramePlan) -> bool {
        self.last = Self::describe(plan);
        self.rendered += 1;
        true
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameRenderer, SceneTextures};
    use nutshell_assets::TextureId;
    use nutshell_common::CameraState;

    #[test]
    fn debug_renderer_describes_every_draw() {
        let mut frames = FrameRenderer::new(SceneTextures {
            surface: Some(TextureId(4)),
            ..SceneTextures::default()
        });
        let mut cam = CameraState::new();
        let mut renderer = DebugTextRenderer::new();
        assert!(frames.render_frame(&mut cam, 0.0, &mut renderer));

        let output = renderer.last_output();
        assert!(output.contains("draws=5"));
        assert!(output.contains("Starfield: cube"));
        assert!(output.contains("Surface: sphere r=5.00 segments=100 lit alpha=1.00 tex#4"));
        assert!(output.contains("SurfaceGrid: wire-sphere r=5.10"));
        assert!(output.contains("CloudShell: sphere r=5.40"));
        assert!(output.contains("at=(0.00, 0.00, -20.00)"));
    }

    #[test]
    fn present_is_counted_separately() {
        let mut renderer = DebugTextRenderer::new();
        let plan = FramePlan::new(glam::Vec4::ONE);
        renderer.render(&plan);
        assert_eq!(renderer.frames_rendered(), 1);
        assert_eq!(renderer.frames_presented(), 0);
        renderer.present();
        assert_eq!(renderer.frames_presented(), 1);
    }
}
