//! The fixed demo scene: materials, drawables and the light rig.
//!
//! Geometry and textures are generated in code, so the renderer runs without
//! asset files. Every drawable owns its object uniform buffer and bind group;
//! uniforms are rewritten each frame before the G-Buffer pass encodes.

use anyhow::Result;
use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::Instance,
        mesh::{self, Mesh},
        texture::Texture,
    },
    lights::{DirectionalLight, LightState, PointLight, SpotLight},
    pipelines::geometry::ObjectUniform,
    registry::ResourceRegistry,
};

/// A material: diffuse and specular map bound together with their samplers.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub diffuse: Texture,
    pub specular: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse: Texture,
        specular: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let diffuse_sampler = diffuse
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let specular_sampler = specular
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular_sampler),
                },
            ],
            label: Some(&format!("{name}_material_bind_group")),
        });
        Self {
            name: name.to_owned(),
            diffuse,
            specular,
            bind_group,
        }
    }
}

/// One object the geometry pass draws: mesh, transform, material parameters
/// and the GPU-side uniform that carries them.
#[derive(Debug)]
pub struct Drawable {
    pub mesh: Mesh,
    pub instance: Instance,
    pub material: usize,
    pub diffuse_tint: [f32; 3],
    pub specular_tint: [f32; 3],
    pub tiling: [f32; 2],
    pub shininess: f32,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Drawable {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        mesh: Mesh,
        instance: Instance,
        material: usize,
        diffuse_tint: [f32; 3],
        specular_tint: [f32; 3],
        tiling: [f32; 2],
        shininess: f32,
        object_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = ObjectUniform::new(
            instance.to_matrix(),
            diffuse_tint,
            specular_tint,
            tiling,
            shininess,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Object Uniform", mesh.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some(&format!("{}_object_bind_group", mesh.name)),
        });
        Self {
            mesh,
            instance,
            material,
            diffuse_tint,
            specular_tint,
            tiling,
            shininess,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn uniform(&self) -> ObjectUniform {
        ObjectUniform::new(
            self.instance.to_matrix(),
            self.diffuse_tint,
            self.specular_tint,
            self.tiling,
            self.shininess,
        )
    }
}

#[derive(Debug)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub drawables: Vec<Drawable>,
}

impl Scene {
    /// Builds the fixed scene: a checkerboard floor plane and a handful of
    /// cubes. Uses the `object` and `material` bind group layouts from the
    /// registry.
    pub fn fixed(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        registry: &ResourceRegistry,
    ) -> Result<Self> {
        let object_layout = registry.get::<wgpu::BindGroupLayout>("object");
        let material_layout = registry.get::<wgpu::BindGroupLayout>("material");

        let floor_diffuse = Texture::checkerboard(
            device,
            queue,
            256,
            8,
            [200, 200, 200, 255],
            [40, 40, 40, 255],
            "floor_diffuse",
        )?;
        let floor_specular = Texture::solid_color(device, queue, [60, 60, 60, 255], "floor_specular")?;
        let cube_diffuse = Texture::checkerboard(
            device,
            queue,
            128,
            4,
            [220, 120, 60, 255],
            [180, 80, 40, 255],
            "cube_diffuse",
        )?;
        let cube_specular =
            Texture::solid_color(device, queue, [200, 200, 200, 255], "cube_specular")?;

        let materials = vec![
            Material::new(device, "floor", floor_diffuse, floor_specular, material_layout),
            Material::new(device, "cube", cube_diffuse, cube_specular, material_layout),
        ];

        let mut drawables = Vec::new();

        drawables.push(Drawable::new(
            device,
            mesh::plane(device, "floor", 40.0),
            Instance::new(),
            0,
            [1.0; 3],
            [1.0; 3],
            [8.0, 8.0],
            16.0,
            object_layout,
        ));

        // (position, uniform scale, yaw)
        let cubes: [([f32; 3], f32, f32); 5] = [
            ([0.0, 1.0, 0.0], 2.0, 0.0),
            ([-4.5, 0.75, 3.0], 1.5, 30.0),
            ([4.0, 0.5, -2.5], 1.0, -20.0),
            ([2.5, 0.5, 4.5], 1.0, 55.0),
            ([-3.0, 0.35, -4.0], 0.7, 10.0),
        ];
        for (i, (position, scale, yaw)) in cubes.into_iter().enumerate() {
            let instance = Instance {
                position: Vector3::from(position),
                rotation: Quaternion::from_angle_y(Deg(yaw)),
                scale: Vector3::new(scale, scale, scale),
            };
            drawables.push(Drawable::new(
                device,
                mesh::cube(device, &format!("cube_{i}")),
                instance,
                1,
                [1.0; 3],
                [1.0; 3],
                [1.0, 1.0],
                64.0,
                object_layout,
            ));
        }

        log::info!(
            "fixed scene: {} drawables, {} materials",
            drawables.len(),
            materials.len()
        );
        Ok(Self {
            materials,
            drawables,
        })
    }

    /// Rewrites every drawable's object uniform from its current transform
    /// and material parameters.
    pub fn upload(&self, queue: &wgpu::Queue) {
        for drawable in &self.drawables {
            queue.write_buffer(
                &drawable.uniform_buffer,
                0,
                bytemuck::cast_slice(&[drawable.uniform()]),
            );
        }
    }
}

/// Default light rig: one directional key light, four coloured point lights
/// around the scene, one spot light aimed at the centre cube.
pub fn default_light_rig(state: &mut LightState) {
    state.set_directional(&[DirectionalLight::new([-0.4, -1.0, -0.3])
        .with_colors([0.08; 3], [0.35; 3], [0.4; 3])]);

    state.set_point(&[
        PointLight::new([5.0, 3.0, 5.0]).with_colors([0.02; 3], [0.8, 0.2, 0.2], [1.0; 3]),
        PointLight::new([-5.0, 3.0, 5.0]).with_colors([0.02; 3], [0.2, 0.8, 0.2], [1.0; 3]),
        PointLight::new([-5.0, 3.0, -5.0]).with_colors([0.02; 3], [0.2, 0.2, 0.8], [1.0; 3]),
        PointLight::new([5.0, 3.0, -5.0]).with_colors([0.02; 3], [0.8, 0.8, 0.2], [1.0; 3]),
    ]);

    state.set_spot(&[SpotLight::new([0.0, 8.0, 0.0], [0.0, -1.0, 0.0])
        .with_cone(12.5, 17.5)
        .with_colors([0.0; 3], [0.9; 3], [1.0; 3])]);
}
