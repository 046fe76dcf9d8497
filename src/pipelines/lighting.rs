//! Full-screen deferred lighting pass pipeline.
//!
//! Binding contract: group 0 = the five G-Buffer views in slot order plus
//! one nearest/clamp sampler, group 1 = the lights uniform buffer. The
//! 32-bit float targets are non-filterable, so every texture entry is
//! declared unfilterable and the sampler non-filtering. A full-screen pass
//! reads texel-aligned anyway.

use crate::{
    data_structures::mesh::{QuadVertex, Vertex},
    gbuffer,
    pipelines::mk_render_pipeline,
    registry::ResourceRegistry,
};

/// Nearest-neighbour, clamp-to-edge sampler for reading the G-Buffer.
pub fn mk_g_buffer_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("g_buffer_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Layout of the G-Buffer read bind group: bindings 0..4 are the slot views
/// in table order, binding 5 the sampler.
pub fn mk_g_buffer_read_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..gbuffer::SLOT_COUNT as u32)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: gbuffer::SLOT_COUNT as u32,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
        count: None,
    });
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("g_buffer_read_layout"),
    })
}

/// Builds the G-Buffer read bind group from the current registry entries.
/// Recreated by the resize coordinator whenever the slot views are replaced.
pub fn mk_g_buffer_read_bind_group(
    device: &wgpu::Device,
    registry: &ResourceRegistry,
) -> wgpu::BindGroup {
    let views: Vec<&wgpu::TextureView> = gbuffer::SLOTS
        .iter()
        .map(|slot| registry.get::<wgpu::TextureView>(&gbuffer::entry_name(slot.semantic)))
        .collect();
    let mut entries: Vec<wgpu::BindGroupEntry> = views
        .iter()
        .enumerate()
        .map(|(i, view)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: gbuffer::SLOT_COUNT as u32,
        resource: wgpu::BindingResource::Sampler(
            registry.get::<wgpu::Sampler>("g_buffer_sampler"),
        ),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: registry.get::<wgpu::BindGroupLayout>("g_buffer_read"),
        entries: &entries,
        label: Some("g_buffer_read_bind_group"),
    })
}

pub fn mk_lights_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("lights_bind_group_layout"),
    })
}

/// The lighting pipeline renders the screen quad with no depth attachment;
/// its single colour target is the surface.
pub fn mk_lighting_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    g_buffer_read_layout: &wgpu::BindGroupLayout,
    lights_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lighting Pipeline Layout"),
        bind_group_layouts: &[g_buffer_read_layout, lights_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Lighting Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("lighting.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "Lighting Pipeline",
        &layout,
        &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState {
                alpha: wgpu::BlendComponent::REPLACE,
                color: wgpu::BlendComponent::REPLACE,
            }),
            write_mask: wgpu::ColorWrites::ALL,
        })],
        None,
        &[QuadVertex::desc()],
        shader,
    )
}
