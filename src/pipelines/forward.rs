//! Forward pass pipeline for light-source proxies.
//!
//! Draws a small unlit cube per active point/spot light, instanced, tested
//! against the depth buffer the geometry pass wrote. The pass loads both the
//! colour and the depth attachment, so deferred-shaded geometry correctly
//! occludes the proxies (and vice versa).

use crate::{
    data_structures::{
        instance::ProxyInstanceRaw,
        mesh::{MeshVertex, Vertex},
        texture::Texture,
    },
    pipelines::{depth_write_state, mk_render_pipeline},
};

pub fn mk_forward_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Forward Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Forward Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("forward.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "Forward Pipeline",
        &layout,
        &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState {
                alpha: wgpu::BlendComponent::REPLACE,
                color: wgpu::BlendComponent::REPLACE,
            }),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        Some(depth_write_state(Texture::DEPTH_FORMAT)),
        &[MeshVertex::desc(), ProxyInstanceRaw::desc()],
        shader,
    )
}
