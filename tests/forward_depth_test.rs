//! The forward pass loads the geometry-pass depth buffer instead of clearing
//! it, so deferred-shaded geometry must occlude light proxies. Both tests run
//! all three passes headless against a cube centred on the view ray and read
//! back the centre pixel before and after the forward pass.

#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod three_pass {
    use instant::Duration;
    use shade_ngin::{
        camera::{CameraUniform, OrbitCamera, mk_camera_bind_group_layout},
        data_structures::{
            instance::{Instance, ProxyInstanceRaw},
            mesh::{self, Mesh},
            texture::Texture,
        },
        gbuffer,
        lights::LightState,
        pipelines::{forward, geometry, lighting},
        resize,
        scene::{self, Drawable, Material},
    };
    use wgpu::util::DeviceExt;

    pub(crate) const SIZE: u32 = 64;
    pub(crate) const PROXY_TINT: [f32; 3] = [1.0, 0.0, 1.0];
    pub(crate) const CLEAR_PIXEL: [u8; 4] = [0, 0, 255, 255];

    /// Renders the full frame sequence with one cube at the origin and one
    /// proxy at `proxy_position`, and returns the centre pixel after the
    /// lighting pass and after the forward pass.
    pub(crate) fn render_with_proxy(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        proxy_position: [f32; 3],
    ) -> ([u8; 4], [u8; 4]) {
        let mut registry = crate::common::test_utils::mk_registry_with_g_buffer_prereqs(device);
        registry.add("lights", lighting::mk_lights_bind_group_layout(device));
        registry.add("object", geometry::mk_object_bind_group_layout(device));
        registry.add("material", geometry::mk_material_bind_group_layout(device));
        resize::install_size_dependent(device, &mut registry, SIZE, SIZE);

        let camera_layout = mk_camera_bind_group_layout(device);
        let camera = OrbitCamera::new(SIZE, SIZE);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let mut lights = LightState::new();
        scene::default_light_rig(&mut lights);
        let eye = camera.position();
        lights.set_view_position([eye.x, eye.y, eye.z]);
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[*lights.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: registry.get::<wgpu::BindGroupLayout>("lights"),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            }],
            label: Some("lights_bind_group"),
        });

        let target_format = wgpu::TextureFormat::Rgba8Unorm;
        let geometry_pipeline = geometry::mk_geometry_pipeline(
            device,
            &camera_layout,
            registry.get::<wgpu::BindGroupLayout>("object"),
            registry.get::<wgpu::BindGroupLayout>("material"),
        );
        let lighting_pipeline = lighting::mk_lighting_pipeline(
            device,
            target_format,
            registry.get::<wgpu::BindGroupLayout>("g_buffer_read"),
            registry.get::<wgpu::BindGroupLayout>("lights"),
        );
        let forward_pipeline = forward::mk_forward_pipeline(device, target_format, &camera_layout);

        let material = Material::new(
            device,
            "flat",
            Texture::solid_color(device, queue, [255, 255, 255, 255], "flat_diffuse").unwrap(),
            Texture::solid_color(device, queue, [128, 128, 128, 255], "flat_specular").unwrap(),
            registry.get::<wgpu::BindGroupLayout>("material"),
        );
        // Cube centred on the orbit camera's view ray, big enough to cover
        // the centre pixel at the default distance.
        let cube = Drawable::new(
            device,
            mesh::cube(device, "cube"),
            Instance {
                scale: cgmath::Vector3::new(2.0, 2.0, 2.0),
                ..Default::default()
            },
            0,
            [1.0; 3],
            [1.0; 3],
            [1.0, 1.0],
            32.0,
            registry.get::<wgpu::BindGroupLayout>("object"),
        );

        let proxy_mesh = mesh::cube(device, "light_proxy");
        let proxy = ProxyInstanceRaw::new(
            &Instance {
                position: proxy_position.into(),
                scale: cgmath::Vector3::new(0.5, 0.5, 0.5),
                ..Default::default()
            },
            PROXY_TINT,
        );
        let proxy_instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Proxy Instance Buffer"),
            contents: bytemuck::cast_slice(&[proxy]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (quad_vertices, quad_indices) = mesh::screen_quad_data();
        let quad = Mesh::new(device, "screen_quad", &quad_vertices, &quad_indices);

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Forward Test Target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });

        {
            let colour_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = gbuffer::SLOTS
                .iter()
                .map(|slot| {
                    Some(wgpu::RenderPassColorAttachment {
                        view: registry
                            .get::<wgpu::TextureView>(&gbuffer::entry_name(slot.semantic)),
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
            pass.set_pipeline(&geometry_pipeline);
            pass.set_bind_group(0, &camera_bind_group, &[]);
            pass.set_bind_group(1, &cube.bind_group, &[]);
            pass.set_bind_group(2, &material.bind_group, &[]);
            pass.set_vertex_buffer(0, cube.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(cube.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..cube.mesh.num_elements, 0, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lighting Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLUE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&lighting_pipeline);
            pass.set_bind_group(0, registry.get::<wgpu::BindGroup>("g_buffer_read"), &[]);
            pass.set_bind_group(1, &lights_bind_group, &[]);
            pass.set_vertex_buffer(0, quad.vertex_buffer.slice(..));
            pass.set_index_buffer(quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..quad.num_elements, 0, 0..1);
        }

        let after_lighting = mk_readback_buffer(device);
        copy_target(&mut encoder, &target, &after_lighting);

        // Forward pass: colour and depth both load; nothing is cleared.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
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
            pass.set_pipeline(&forward_pipeline);
            pass.set_bind_group(0, &camera_bind_group, &[]);
            pass.set_vertex_buffer(0, proxy_mesh.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, proxy_instance_buffer.slice(..));
            pass.set_index_buffer(proxy_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..proxy_mesh.num_elements, 0, 0..1);
        }

        let after_forward = mk_readback_buffer(device);
        copy_target(&mut encoder, &target, &after_forward);

        queue.submit(std::iter::once(encoder.finish()));

        let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        runtime.block_on(async {
            let (tx_a, rx_a) = futures_intrusive::channel::shared::oneshot_channel();
            let (tx_b, rx_b) = futures_intrusive::channel::shared::oneshot_channel();
            let slice_a = after_lighting.slice(..);
            let slice_b = after_forward.slice(..);
            slice_a.map_async(wgpu::MapMode::Read, move |result| {
                tx_a.send(result).unwrap();
            });
            slice_b.map_async(wgpu::MapMode::Read, move |result| {
                tx_b.send(result).unwrap();
            });
            device
                .poll(wgpu::PollType::Wait {
                    submission_index: None,
                    timeout: Some(Duration::from_secs(3)),
                })
                .unwrap();
            rx_a.receive().await.unwrap().unwrap();
            rx_b.receive().await.unwrap().unwrap();
            (
                centre_pixel(&slice_a.get_mapped_range()),
                centre_pixel(&slice_b.get_mapped_range()),
            )
        })
    }

    fn mk_readback_buffer(device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (4 * SIZE * SIZE) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    }

    fn copy_target(
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::Texture,
        buffer: &wgpu::Buffer,
    ) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * SIZE),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
        );
    }

    fn centre_pixel(data: &[u8]) -> [u8; 4] {
        let offset = ((SIZE / 2) * SIZE + SIZE / 2) as usize * 4;
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn proxy_behind_geometry_is_occluded() {
    use three_pass::{CLEAR_PIXEL, PROXY_TINT, render_with_proxy};

    let (device, queue) = common::test_utils::mk_test_device();
    // On the view ray, past the cube: the geometry-pass depth must reject
    // every proxy fragment.
    let (lit, after_forward) = render_with_proxy(&device, &queue, [0.0, -2.11, -4.53]);

    assert_ne!(lit, CLEAR_PIXEL, "cube should cover the centre pixel");
    assert_eq!(
        after_forward, lit,
        "occluded proxy must leave the lit pixel untouched"
    );
    let tint = [
        (PROXY_TINT[0] * 255.0) as u8,
        (PROXY_TINT[1] * 255.0) as u8,
        (PROXY_TINT[2] * 255.0) as u8,
        255,
    ];
    assert_ne!(after_forward, tint);
}

#[test]
#[cfg(feature = "integration-tests")]
fn proxy_in_front_of_geometry_is_drawn() {
    use three_pass::render_with_proxy;

    let (device, queue) = common::test_utils::mk_test_device();
    // Same ray, between the camera and the cube: the proxy passes the depth
    // test and its tint replaces the lit colour.
    let (lit, after_forward) = render_with_proxy(&device, &queue, [0.0, 2.11, 4.53]);

    assert_ne!(after_forward, lit);
    assert_eq!(after_forward, [255, 0, 255, 255]);
}
