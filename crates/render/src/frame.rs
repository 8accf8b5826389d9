use crate::material::{Light, Material, Shading};
use crate::plan::{DrawCall, DrawStep, FramePlan};
use crate::renderer::Renderer;
use crate::scene::{self, SceneRotation};
use glam::{Mat4, Vec3, Vec4};
use nutshell_assets::TextureId;
use nutshell_common::CameraState;

/// Textures bound by the scene layers. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneTextures {
    pub starfield: Option<TextureId>,
    pub surface: Option<TextureId>,
    pub clouds: Option<TextureId>,
}

/// Builds the draw sequence of the Earth scene and owns its rotation.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    rotation: SceneRotation,
    textures: SceneTextures,
}

impl FrameRenderer {
    pub fn new(textures: SceneTextures) -> Self {
        Self {
            rotation: SceneRotation::new(),
            textures,
        }
    }

    pub fn rotation(&self) -> SceneRotation {
        self.rotation
    }

    pub fn textures(&self) -> SceneTextures {
        self.textures
    }

    pub fn set_textures(&mut self, textures: SceneTextures) {
        tracing::debug!(?textures, "scene textures bound");
        self.textures = textures;
    }

    /// Draw one frame through `renderer`.
    ///
    /// Returns `false` only when the renderer reports it cannot continue.
    pub fn render_frame<R>(&mut self, camera: &mut CameraState, elapsed: f64, renderer: &mut R) -> bool
    where
        R: Renderer + ?Sized,
    {
        let plan = self.plan_frame(camera, elapsed);
        renderer.render(&plan)
    }

    /// Move the camera by its held intents, lay out the scene for the
    /// resulting view and advance the scene rotation.
    pub fn plan_frame(&mut self, camera: &mut CameraState, elapsed: f64) -> FramePlan {
        let mut plan = FramePlan::new(scene::CLEAR_COLOR);

        camera.integrate(elapsed);
        let view = camera.view_matrix();
        plan.view = view;
        plan.light = Light::sun().in_view(view);

        let starfield = view
            * Mat4::from_axis_angle(
                scene::STARFIELD_AXIS.normalize(),
                self.rotation.starfield_angle().to_radians(),
            );
        plan.push(self.draw(
            DrawStep::Starfield,
            starfield,
            Shading::Unlit { color: Vec4::ONE },
            self.textures.starfield,
        ));

        let planet = view
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -scene::PLANET_DISTANCE))
            * Mat4::from_rotation_y(self.rotation.planet_angle().to_radians())
            * Mat4::from_rotation_z(scene::AXIAL_TILT.to_radians())
            * Mat4::from_rotation_x(scene::POLE_CORRECTION.to_radians());

        plan.push(self.draw(
            DrawStep::Surface,
            planet,
            Shading::Lit(Material::surface()),
            self.textures.surface,
        ));
        plan.push(self.draw(
            DrawStep::SurfaceGrid,
            planet,
            Shading::Lit(Material::grid()),
            None,
        ));
        plan.push(self.draw(
            DrawStep::Axis,
            planet,
            Shading::Unlit {
                color: Vec4::new(1.0, 1.0, 0.0, 1.0),
            },
            None,
        ));

        let clouds = planet
            * Mat4::from_axis_angle(
                scene::CLOUD_AXIS.normalize(),
                self.rotation.cloud_angle().to_radians(),
            );
        plan.push(self.draw(
            DrawStep::CloudShell,
            clouds,
            Shading::Lit(Material::clouds()),
            self.textures.clouds,
        ));

        self.rotation.advance(elapsed);
        tracing::trace!(
            elapsed,
            rotation = self.rotation.degrees(),
            "frame planned"
        );
        plan
    }

    fn draw(
        &self,
        step: DrawStep,
        model_view: Mat4,
        shading: Shading,
        texture: Option<TextureId>,
    ) -> DrawCall {
        DrawCall {
            step,
            geometry: step.geometry(),
            model_view,
            shading,
            texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DebugTextRenderer;
    use nutshell_common::Intent;

    const EPS: f32 = 1e-3;

    fn textured() -> SceneTextures {
        SceneTextures {
            starfield: Some(TextureId(0)),
            surface: Some(TextureId(1)),
            clouds: Some(TextureId(2)),
        }
    }

    #[test]
    fn plan_has_every_step_in_order() {
        let mut frames = FrameRenderer::new(textured());
        let mut cam = CameraState::new();
        let plan = frames.plan_frame(&mut cam, 0.016);
        assert_eq!(plan.steps().collect::<Vec<_>>(), DrawStep::ALL.to_vec());
        assert_eq!(plan.draw(DrawStep::Surface).unwrap().texture, Some(TextureId(1)));
        assert_eq!(plan.draw(DrawStep::SurfaceGrid).unwrap().texture, None);
        assert_eq!(plan.draw(DrawStep::Axis).unwrap().texture, None);
    }

    #[test]
    fn missing_textures_still_draw_everything() {
        let mut frames = FrameRenderer::new(SceneTextures::default());
        let mut cam = CameraState::new();
        let mut renderer = DebugTextRenderer::new();
        for _ in 0..2 {
            assert!(frames.render_frame(&mut cam, 0.5, &mut renderer));
        }
        assert_eq!(renderer.frames_rendered(), 2);
        let plan = frames.plan_frame(&mut cam, 0.0);
        assert_eq!(plan.draws.len(), DrawStep::ALL.len());
        assert!(plan.draws.iter().all(|d| d.texture.is_none()));
        assert!((frames.rotation().degrees() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_advances_after_drawing() {
        let mut frames = FrameRenderer::default();
        let mut cam = CameraState::new();
        let first = frames.plan_frame(&mut cam, 2.0);
        // the first frame is drawn at angle zero
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0))
            * Mat4::from_rotation_z(23.44_f32.to_radians())
            * Mat4::from_rotation_x(90.0_f32.to_radians());
        let surface = first.draw(DrawStep::Surface).unwrap();
        assert!(surface.model_view.abs_diff_eq(expected, EPS));
        assert!((frames.rotation().degrees() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn camera_moves_before_view_is_built() {
        let mut frames = FrameRenderer::default();
        let mut cam = CameraState::new();
        cam.set_intent(Intent::Forward, true);
        let plan = frames.plan_frame(&mut cam, 1.0);
        assert!((cam.translation.z - 16.0).abs() < EPS);
        assert!(plan.view.abs_diff_eq(cam.view_matrix(), EPS));
    }

    #[test]
    fn planet_sits_in_front_of_camera() {
        let mut frames = FrameRenderer::default();
        let mut cam = CameraState::new();
        let plan = frames.plan_frame(&mut cam, 0.0);
        let center = plan
            .draw(DrawStep::Surface)
            .unwrap()
            .model_view
            .transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 0.0, -20.0)).length() < EPS);
    }

    #[test]
    fn clouds_counter_rotate_slower() {
        let mut frames = FrameRenderer::default();
        let mut cam = CameraState::new();
        frames.plan_frame(&mut cam, 10.0);
        let plan = frames.plan_frame(&mut cam, 0.0);
        let surface = plan.draw(DrawStep::Surface).unwrap().model_view;
        let clouds = plan.draw(DrawStep::CloudShell).unwrap().model_view;
        let relative = surface.inverse() * clouds;
        let expected = Mat4::from_axis_angle(Vec3::new(0.3, 0.6, 0.4).normalize(), 15.0_f32.to_radians());
        assert!(relative.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn light_is_in_view_space() {
        let mut frames = FrameRenderer::default();
        let mut cam = CameraState::new();
        cam.translation = Vec3::new(1.0, 2.0, 3.0);
        let plan = frames.plan_frame(&mut cam, 0.0);
        assert_eq!(plan.light.position, Vec4::new(21.0, 22.0, 3.0, 1.0));
    }
}
