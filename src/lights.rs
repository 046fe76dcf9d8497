//! Scene light state and its GPU uniform layout.
//!
//! The frame pipeline owns one [`LightState`]; the lighting pass reads it as
//! a single uniform buffer. Up to [`MAX_LIGHTS`] lights per category are
//! stored in fixed arrays, with an active count per category so the shader
//! skips unused slots. Every struct here is laid out in 16-byte rows to match
//! the WGSL uniform address space, hence the explicit padding fields.

use bytemuck::{Pod, Zeroable};

/// Fixed capacity per light category.
pub const MAX_LIGHTS: usize = 32;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    _p0: f32,
    pub ambient: [f32; 3],
    _p1: f32,
    pub diffuse: [f32; 3],
    _p2: f32,
    pub specular: [f32; 3],
    _p3: f32,
}

impl DirectionalLight {
    pub fn new(direction: [f32; 3]) -> Self {
        Self {
            direction,
            ..Zeroable::zeroed()
        }
        .with_colors([0.2; 3], [0.8; 3], [1.0; 3])
    }

    pub fn with_colors(mut self, ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new([50.0_f32.to_radians(), -30.0_f32.to_radians(), 0.0])
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    _p0: f32,
}

impl PointLight {
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            constant: 1.0,
            linear: 0.14,
            quadratic: 0.0007,
            ambient: [0.2; 3],
            diffuse: [0.8; 3],
            specular: [1.0; 3],
            _p0: 0.0,
        }
    }

    pub fn with_colors(mut self, ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SpotLight {
    pub direction: [f32; 3],
    pub constant: f32,
    pub position: [f32; 3],
    pub linear: f32,
    pub ambient: [f32; 3],
    pub quadratic: f32,
    pub diffuse: [f32; 3],
    pub inner_cutoff_cos: f32,
    pub specular: [f32; 3],
    pub outer_cutoff_cos: f32,
}

impl SpotLight {
    pub fn new(position: [f32; 3], direction: [f32; 3]) -> Self {
        Self {
            direction,
            constant: 1.0,
            position,
            linear: 0.14,
            ambient: [0.2; 3],
            quadratic: 0.0007,
            diffuse: [0.8; 3],
            inner_cutoff_cos: 10.0_f32.to_radians().cos(),
            specular: [1.0; 3],
            outer_cutoff_cos: 15.0_f32.to_radians().cos(),
        }
    }

    pub fn with_cone(mut self, inner_deg: f32, outer_deg: f32) -> Self {
        self.inner_cutoff_cos = inner_deg.to_radians().cos();
        self.outer_cutoff_cos = outer_deg.to_radians().cos();
        self
    }

    pub fn with_colors(mut self, ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new([0.0; 3], [0.0, 90.0_f32.to_radians(), 0.0])
    }
}

/// The uniform block read by the lighting shader. Field order mirrors the
/// WGSL `Lights` struct exactly.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightsUniform {
    pub dir_lights: [DirectionalLight; MAX_LIGHTS],
    pub point_lights: [PointLight; MAX_LIGHTS],
    pub spot_lights: [SpotLight; MAX_LIGHTS],
    pub view_position: [f32; 3],
    _p0: f32,
    pub active_dir_lights: u32,
    pub active_point_lights: u32,
    pub active_spot_lights: u32,
    _p1: u32,
}

/// Light state owned by the frame pipeline. Mutation goes through the
/// setters only, so the lighting pass stays a pure function of
/// (G-Buffer, `LightsUniform`).
#[derive(Debug)]
pub struct LightState {
    uniform: LightsUniform,
}

impl LightState {
    /// Starts with every category empty.
    pub fn new() -> Self {
        Self {
            uniform: Zeroable::zeroed(),
        }
    }

    /// Replaces the directional lights; slots past `lights.len()` keep their
    /// previous contents but are ignored by the shader.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_LIGHTS`] lights are passed.
    pub fn set_directional(&mut self, lights: &[DirectionalLight]) {
        assert!(
            lights.len() <= MAX_LIGHTS,
            "at most {MAX_LIGHTS} directional lights are supported"
        );
        self.uniform.dir_lights[..lights.len()].copy_from_slice(lights);
        self.uniform.active_dir_lights = lights.len() as u32;
    }

    pub fn set_point(&mut self, lights: &[PointLight]) {
        assert!(
            lights.len() <= MAX_LIGHTS,
            "at most {MAX_LIGHTS} point lights are supported"
        );
        self.uniform.point_lights[..lights.len()].copy_from_slice(lights);
        self.uniform.active_point_lights = lights.len() as u32;
    }

    pub fn set_spot(&mut self, lights: &[SpotLight]) {
        assert!(
            lights.len() <= MAX_LIGHTS,
            "at most {MAX_LIGHTS} spot lights are supported"
        );
        self.uniform.spot_lights[..lights.len()].copy_from_slice(lights);
        self.uniform.active_spot_lights = lights.len() as u32;
    }

    /// Camera world position, consumed by the specular term.
    pub fn set_view_position(&mut self, position: [f32; 3]) {
        self.uniform.view_position = position;
    }

    pub fn uniform(&self) -> &LightsUniform {
        &self.uniform
    }

    /// Active point lights, used by the forward pass to place proxies.
    pub fn point_lights(&self) -> &[PointLight] {
        &self.uniform.point_lights[..self.uniform.active_point_lights as usize]
    }

    /// Active spot lights, used by the forward pass to place proxies.
    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.uniform.spot_lights[..self.uniform.active_spot_lights as usize]
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}
