//! Per-frame orchestration: resize application, uniform uploads and the
//! three render passes.
//!
//! Frame order is fixed: apply a pending resize, upload camera/light/object
//! uniforms, then encode the G-Buffer pass (geometry into the five targets,
//! depth cleared), the lighting pass (full-screen quad onto the surface, no
//! depth) and the forward pass (light proxies, colour and depth both loaded).
//! One submit, one present.

use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        instance::{Instance, ProxyInstanceRaw},
        mesh::{self, Mesh},
    },
    gbuffer,
    lights::{LightState, LightsUniform, MAX_LIGHTS},
    pipelines::{forward, geometry, lighting},
    registry::ResourceRegistry,
    resize::{self, ResizeCoordinator},
    scene::{self, Scene},
};

/// Why a frame could not be presented.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The device is gone (out of memory or an internal error). Not
    /// recoverable; the application should shut down.
    #[error("graphics device lost: {0}")]
    DeviceLost(wgpu::SurfaceError),
    /// The surface no longer matches the window. Recoverable: reconfigure
    /// at the current size and skip this frame.
    #[error("surface outdated: {0}")]
    SurfaceOutdated(wgpu::SurfaceError),
}

fn map_surface_error(error: wgpu::SurfaceError) -> FrameError {
    match error {
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => {
            FrameError::SurfaceOutdated(error)
        }
        wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => {
            FrameError::DeviceLost(error)
        }
    }
}

/// Hook for drawing on top of the finished frame (debug overlays and the
/// like). Runs after the forward pass, into the same surface view.
pub type OverlayFn = Box<dyn FnMut(&wgpu::Device, &mut wgpu::CommandEncoder, &wgpu::TextureView)>;

/// Owns everything the render loop needs besides the [`Context`]: the scene,
/// the lights, the resize flag and the frame-local GPU buffers. Pipelines,
/// layouts and size-dependent targets live in the registry.
pub struct FramePipeline {
    pub resize: ResizeCoordinator,
    pub lights: LightState,
    pub scene: Scene,
    quad: Mesh,
    proxy_mesh: Mesh,
    proxy_instance_buffer: wgpu::Buffer,
    overlay: Option<OverlayFn>,
}

impl FramePipeline {
    /// Registers every size-independent resource (layouts, pipelines, the
    /// G-Buffer sampler, the lights buffer), installs the size-dependent set
    /// at the current surface size and builds the fixed scene.
    pub fn new(ctx: &Context, registry: &mut ResourceRegistry) -> anyhow::Result<Self> {
        let device = &ctx.device;

        registry.add("object", geometry::mk_object_bind_group_layout(device));
        registry.add("material", geometry::mk_material_bind_group_layout(device));
        registry.add("g_buffer_read", lighting::mk_g_buffer_read_layout(device));
        registry.add("lights", lighting::mk_lights_bind_group_layout(device));
        registry.add("g_buffer_sampler", lighting::mk_g_buffer_sampler(device));

        let mut lights = LightState::new();
        scene::default_light_rig(&mut lights);
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[*lights.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: registry.get::<wgpu::BindGroupLayout>("lights"),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            }],
            label: Some("lights_bind_group"),
        });
        registry.add("lights", lights_buffer);
        registry.add("lights", lights_bind_group);

        registry.add(
            "geometry",
            geometry::mk_geometry_pipeline(
                device,
                &ctx.camera.bind_group_layout,
                registry.get::<wgpu::BindGroupLayout>("object"),
                registry.get::<wgpu::BindGroupLayout>("material"),
            ),
        );
        registry.add(
            "lighting",
            lighting::mk_lighting_pipeline(
                device,
                ctx.config.format,
                registry.get::<wgpu::BindGroupLayout>("g_buffer_read"),
                registry.get::<wgpu::BindGroupLayout>("lights"),
            ),
        );
        registry.add(
            "forward",
            forward::mk_forward_pipeline(device, ctx.config.format, &ctx.camera.bind_group_layout),
        );

        resize::install_size_dependent(device, registry, ctx.config.width, ctx.config.height);

        let scene = Scene::fixed(device, &ctx.queue, registry)?;

        let (quad_vertices, quad_indices) = mesh::screen_quad_data();
        let quad = Mesh::new(device, "screen_quad", &quad_vertices, &quad_indices);
        let proxy_mesh = mesh::cube(device, "light_proxy");
        // Worst case: every point and spot slot active.
        let proxy_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Proxy Instance Buffer"),
            size: (2 * MAX_LIGHTS * std::mem::size_of::<ProxyInstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            resize: ResizeCoordinator::new(),
            lights,
            scene,
            quad,
            proxy_mesh,
            proxy_instance_buffer,
            overlay: None,
        })
    }

    pub fn set_overlay(&mut self, overlay: OverlayFn) {
        self.overlay = Some(overlay);
    }

    /// One small unlit cube per active point and spot light, tinted with the
    /// light's diffuse colour.
    fn proxy_instances(&self) -> Vec<ProxyInstanceRaw> {
        let proxy = |position: [f32; 3], colour: [f32; 3]| {
            let instance = Instance {
                position: position.into(),
                scale: cgmath::Vector3::new(0.25, 0.25, 0.25),
                ..Default::default()
            };
            ProxyInstanceRaw::new(&instance, colour)
        };
        self.lights
            .point_lights()
            .iter()
            .map(|l| proxy(l.position, l.diffuse))
            .chain(
                self.lights
                    .spot_lights()
                    .iter()
                    .map(|l| proxy(l.position, l.diffuse)),
            )
            .collect()
    }

    /// Renders and presents one frame.
    pub fn render(
        &mut self,
        ctx: &mut Context,
        registry: &mut ResourceRegistry,
    ) -> Result<(), FrameError> {
        if let Some((width, height)) = self.resize.take() {
            resize::apply(ctx, registry, width, height);
        }

        // All uploads happen before any pass encodes; write_buffer takes
        // effect at submit, so nothing may be rewritten between draws.
        ctx.upload_camera();
        let eye = ctx.camera.camera.position();
        self.lights.set_view_position([eye.x, eye.y, eye.z]);
        ctx.queue.write_buffer(
            registry.get::<wgpu::Buffer>("lights"),
            0,
            bytemuck::cast_slice::<LightsUniform, u8>(&[*self.lights.uniform()]),
        );
        self.scene.upload(&ctx.queue);
        let proxies = self.proxy_instances();
        ctx.queue.write_buffer(
            &self.proxy_instance_buffer,
            0,
            bytemuck::cast_slice(&proxies),
        );

        let frame = ctx.surface.get_current_texture().map_err(map_surface_error)?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.encode_g_buffer_pass(&mut encoder, ctx, registry);
        self.encode_lighting_pass(&mut encoder, ctx, registry, &surface_view);
        self.encode_forward_pass(&mut encoder, ctx, registry, &surface_view, proxies.len() as u32);

        if let Some(overlay) = &mut self.overlay {
            overlay(&ctx.device, &mut encoder, &surface_view);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Geometry into the five G-Buffer targets. Colour targets clear to
    /// zero (the `position.w == 0` background marker), depth clears to 1.
    fn encode_g_buffer_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &Context,
        registry: &ResourceRegistry,
    ) {
        let colour_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = gbuffer::SLOTS
            .iter()
            .map(|slot| {
                Some(wgpu::RenderPassColorAttachment {
                    view: registry.get::<wgpu::TextureView>(&gbuffer::entry_name(slot.semantic)),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })
            })
            .collect();

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("G-Buffer Pass"),
            color_attachments: &colour_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: registry.get::<wgpu::TextureView>("main_depth"),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(registry.get::<wgpu::RenderPipeline>("geometry"));
        pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        for drawable in &self.scene.drawables {
            pass.set_bind_group(1, &drawable.bind_group, &[]);
            pass.set_bind_group(2, &self.scene.materials[drawable.material].bind_group, &[]);
            pass.set_vertex_buffer(0, drawable.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(drawable.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..drawable.mesh.num_elements, 0, 0..1);
        }
    }

    /// Full-screen quad shading the G-Buffer onto the surface. No depth
    /// attachment; the clear colour is the ambient background.
    fn encode_lighting_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &Context,
        registry: &ResourceRegistry,
        surface_view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lighting Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(registry.get::<wgpu::RenderPipeline>("lighting"));
        pass.set_bind_group(0, registry.get::<wgpu::BindGroup>("g_buffer_read"), &[]);
        pass.set_bind_group(1, registry.get::<wgpu::BindGroup>("lights"), &[]);
        pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
        pass.set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.quad.num_elements, 0, 0..1);
    }

    /// Instanced light proxies on top of the lit image. Colour and depth
    /// both load; the depth buffer still holds the geometry pass result, so
    /// scene geometry occludes the proxies.
    fn encode_forward_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &Context,
        registry: &ResourceRegistry,
        surface_view: &wgpu::TextureView,
        instance_count: u32,
    ) {
        if instance_count == 0 {
            return;
        }
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: registry.get::<wgpu::TextureView>("main_depth"),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(registry.get::<wgpu::RenderPipeline>("forward"));
        pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        pass.set_vertex_buffer(0, self.proxy_mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.proxy_instance_buffer.slice(..));
        pass.set_index_buffer(
            self.proxy_mesh.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..self.proxy_mesh.num_elements, 0, 0..instance_count);
    }
}
