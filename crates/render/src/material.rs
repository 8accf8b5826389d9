use glam::{Mat4, Vec4};

/// Surface response to the scene light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub emissive: Vec4,
    pub shininess: f32,
}

impl Material {
    /// Shared base of every lit layer.
    pub fn base() -> Self {
        Self {
            ambient: Vec4::new(0.55, 0.55, 0.55, 0.7),
            diffuse: Vec4::new(1.0, 1.0, 1.0, 0.6),
            specular: Vec4::new(1.0, 1.0, 0.9, 0.3),
            emissive: Vec4::new(0.0, 0.0, 0.0, 0.3),
            shininess: 100.0,
        }
    }

    /// Opaque planet surface.
    pub fn surface() -> Self {
        Self::base().with_alpha(1.0)
    }

    /// Translucent latitude/longitude grid.
    pub fn grid() -> Self {
        Self::base().with_alpha(0.3)
    }

    /// Translucent cloud shell with an emissive boost.
    pub fn clouds() -> Self {
        let mut material = Self::base().with_alpha(0.3);
        material.emissive = Vec4::new(0.7, 0.7, 0.7, 0.3);
        material
    }

    /// Same colors, every alpha set to `alpha`.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.ambient.w = alpha;
        self.diffuse.w = alpha;
        self.specular.w = alpha;
        self.emissive.w = alpha;
        self
    }

    /// Lit fragments take their alpha from the diffuse term.
    pub fn alpha(&self) -> f32 {
        self.diffuse.w
    }
}

/// How a draw call is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Flat color, no lighting.
    Unlit { color: Vec4 },
    Lit(Material),
}

impl Shading {
    pub fn alpha(&self) -> f32 {
        match self {
            Shading::Unlit { color } => color.w,
            Shading::Lit(material) => material.alpha(),
        }
    }
}

/// A positional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Homogeneous position; `w = 1` for a point light.
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

impl Light {
    /// The warm light illuminating the planet, in scene coordinates.
    pub fn sun() -> Self {
        Self {
            position: Vec4::new(20.0, 20.0, 0.0, 1.0),
            ambient: Vec4::new(0.18, 0.18, 0.1, 1.0),
            diffuse: Vec4::new(1.0, 1.0, 0.7, 1.0),
            specular: Vec4::new(1.0, 1.0, 0.7, 1.0),
        }
    }

    /// The light with its position carried into view space.
    pub fn in_view(mut self, view: Mat4) -> Self {
        self.position = view * self.position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layer_alphas() {
        assert_eq!(Material::surface().alpha(), 1.0);
        assert_eq!(Material::grid().alpha(), 0.3);
        assert_eq!(Material::clouds().alpha(), 0.3);
        assert_eq!(Material::clouds().emissive.x, 0.7);
        assert_eq!(Material::surface().emissive.x, 0.0);
    }

    #[test]
    fn light_follows_view() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let light = Light::sun().in_view(view);
        assert_eq!(light.position, Vec4::new(20.0, 20.0, -5.0, 1.0));
    }
}
