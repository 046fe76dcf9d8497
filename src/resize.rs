//! Resize coordination.
//!
//! The windowing callback must never reallocate directly; the GPU or the
//! present call may still be using the current-size resources. It only calls
//! [`ResizeCoordinator::request`]; the frame pipeline applies the pending
//! size at the top of the next frame, before the G-Buffer pass encodes.
//!
//! The apply sequence is release-before-resize: the old "main" depth and
//! G-Buffer entries leave the registry first, then the surface is
//! reconfigured, then everything size-dependent is recreated under the same
//! names. Identity changes, semantic role does not.

use crate::{
    context::Context,
    data_structures::texture::Texture,
    gbuffer,
    pipelines::lighting,
    registry::ResourceRegistry,
};

/// Pending-size flag set by the resize event and consumed by the frame
/// pipeline. Consecutive requests coalesce; only the last size matters.
#[derive(Debug, Default)]
pub struct ResizeCoordinator {
    pending: Option<(u32, u32)>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a surface-size change. Zero sizes (minimized window) are
    /// ignored.
    pub fn request(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.pending = Some((width, height));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending size, clearing the flag.
    pub fn take(&mut self) -> Option<(u32, u32)> {
        self.pending.take()
    }
}

/// Creates the size-dependent registry entries at `width`x`height`: the
/// "main" depth texture/view, the five G-Buffer targets and the G-Buffer
/// read bind group. Expects the (size-independent) `g_buffer_sampler` and
/// `g_buffer_read` layout to be registered already.
pub fn install_size_dependent(
    device: &wgpu::Device,
    registry: &mut ResourceRegistry,
    width: u32,
    height: u32,
) {
    let depth = Texture::create_depth_texture(device, [width, height], "main_depth");
    registry.add("main_depth", depth.texture);
    registry.add("main_depth", depth.view);

    gbuffer::create(device, width, height, registry);
    let read = lighting::mk_g_buffer_read_bind_group(device, registry);
    registry.add("g_buffer_read", read);
}

/// Removes every entry [`install_size_dependent`] created. Must run before
/// the surface is reconfigured.
pub fn release_size_dependent(registry: &mut ResourceRegistry) {
    registry.remove::<wgpu::BindGroup>("g_buffer_read");
    gbuffer::release(registry);
    registry.remove::<wgpu::TextureView>("main_depth");
    registry.remove::<wgpu::Texture>("main_depth");
}

/// Release-then-recreate at a new size, without touching the surface.
/// The headless half of [`apply`], usable without a window.
pub fn rebuild_size_dependent(
    device: &wgpu::Device,
    registry: &mut ResourceRegistry,
    width: u32,
    height: u32,
) {
    release_size_dependent(registry);
    install_size_dependent(device, registry, width, height);
}

/// Applies a pending resize: releases the size-dependent entries,
/// reconfigures the surface (the swap-chain resize; this also sets the
/// viewport, which wgpu derives from the attachment size), recreates the
/// entries and updates the camera aspect ratio.
pub fn apply(ctx: &mut Context, registry: &mut ResourceRegistry, width: u32, height: u32) {
    log::debug!("applying resize to {width}x{height}");

    release_size_dependent(registry);

    ctx.config.width = width;
    ctx.config.height = height;
    ctx.surface.configure(&ctx.device, &ctx.config);

    install_size_dependent(&ctx.device, registry, width, height);

    ctx.camera.camera.set_aspect(width as f32, height as f32);
    ctx.camera
        .controller
        .set_viewport(width as f32, height as f32);
}
