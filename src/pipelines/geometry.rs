//! G-Buffer geometry pass pipeline.
//!
//! Binding contract: group 0 = camera view-projection, group 1 = per-drawable
//! object uniform, group 2 = material textures (diffuse + specular with their
//! samplers). Colour targets are the five G-Buffer slots in table order; no
//! blending, because the 32-bit float targets do not support it.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::{
    data_structures::{mesh::MeshVertex, mesh::Vertex, texture::Texture},
    gbuffer,
    pipelines::{depth_write_state, mk_render_pipeline},
};

/// Per-drawable constant buffer: transform plus material parameters.
/// Uploaded immediately before each draw, never persisted across frames.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub world: [[f32; 4]; 4],
    /// Inverse-transpose of `world`, for normals under non-uniform scale.
    pub normal: [[f32; 4]; 4],
    pub diffuse_tint: [f32; 4],
    pub specular_tint: [f32; 4],
    /// xy = uv tiling, z = shininess exponent, w unused.
    pub tiling_shininess: [f32; 4],
}

impl ObjectUniform {
    pub fn new(
        world: Matrix4<f32>,
        diffuse_tint: [f32; 3],
        specular_tint: [f32; 3],
        tiling: [f32; 2],
        shininess: f32,
    ) -> Self {
        let normal = world
            .invert()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            world: world.into(),
            normal: normal.into(),
            diffuse_tint: [diffuse_tint[0], diffuse_tint[1], diffuse_tint[2], 1.0],
            specular_tint: [specular_tint[0], specular_tint[1], specular_tint[2], 1.0],
            tiling_shininess: [tiling[0], tiling[1], shininess, 0.0],
        }
    }
}

pub fn mk_object_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("object_bind_group_layout"),
    })
}

/// Diffuse and specular map with one sampler each.
pub fn mk_material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

pub fn mk_geometry_pipeline(
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    object_bind_group_layout: &wgpu::BindGroupLayout,
    material_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Geometry Pipeline Layout"),
        bind_group_layouts: &[
            camera_bind_group_layout,
            object_bind_group_layout,
            material_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    let targets: Vec<Option<wgpu::ColorTargetState>> = gbuffer::SLOTS
        .iter()
        .map(|slot| {
            Some(wgpu::ColorTargetState {
                format: slot.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        })
        .collect();

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Geometry Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("geometry.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "Geometry Pipeline",
        &layout,
        &targets,
        Some(depth_write_state(Texture::DEPTH_FORMAT)),
        &[MeshVertex::desc()],
        shader,
    )
}
