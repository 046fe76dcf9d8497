//! The G-Buffer: five size-tracking render targets.
//!
//! Slot count, order and formats are fixed; the lighting shader binds the
//! targets positionally by semantic, so this table must never be reordered.
//! The textures and views live in the [`ResourceRegistry`] under
//! `g_buffer_<semantic>` and are replaced (removed, then re-added) whenever
//! the output surface changes size.

use crate::registry::ResourceRegistry;

/// One G-Buffer slot: semantic name and texel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub semantic: &'static str,
    pub format: wgpu::TextureFormat,
}

pub const SLOT_COUNT: usize = 5;

/// The slot table. Order is the attachment order of the geometry pass and
/// the binding order of the lighting pass.
pub const SLOTS: [Slot; SLOT_COUNT] = [
    Slot {
        semantic: "position",
        format: wgpu::TextureFormat::Rgba32Float,
    },
    Slot {
        semantic: "normal",
        format: wgpu::TextureFormat::Rgba32Float,
    },
    Slot {
        semantic: "diffuse",
        format: wgpu::TextureFormat::Rgba8Unorm,
    },
    Slot {
        semantic: "specular",
        format: wgpu::TextureFormat::Rgba8Unorm,
    },
    Slot {
        semantic: "shininess",
        format: wgpu::TextureFormat::R32Float,
    },
];

/// Registry name of a slot's texture and view.
pub fn entry_name(semantic: &str) -> String {
    format!("g_buffer_{semantic}")
}

/// Creates the five targets at `width`x`height` and registers texture and
/// view for each slot. Panics (via the registry) if entries already exist;
/// callers must [`release`] first.
pub fn create(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    registry: &mut ResourceRegistry,
) {
    for slot in SLOTS {
        let name = entry_name(slot.semantic);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&name),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: slot.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        registry.add(&name, texture);
        registry.add(&name, view);
    }
    log::debug!("created {SLOT_COUNT} G-Buffer targets at {width}x{height}");
}

/// Removes all five texture and view entries from the registry.
pub fn release(registry: &mut ResourceRegistry) {
    for slot in SLOTS {
        let name = entry_name(slot.semantic);
        registry.remove::<wgpu::TextureView>(&name);
        registry.remove::<wgpu::Texture>(&name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_table_is_the_contract() {
        // The lighting pass binds positionally; any change here breaks it.
        assert_eq!(SLOTS.len(), 5);
        let semantics: Vec<_> = SLOTS.iter().map(|s| s.semantic).collect();
        assert_eq!(
            semantics,
            ["position", "normal", "diffuse", "specular", "shininess"]
        );
        assert_eq!(SLOTS[0].format, wgpu::TextureFormat::Rgba32Float);
        assert_eq!(SLOTS[1].format, wgpu::TextureFormat::Rgba32Float);
        assert_eq!(SLOTS[2].format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(SLOTS[3].format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(SLOTS[4].format, wgpu::TextureFormat::R32Float);
    }

    #[test]
    fn entry_names_are_prefixed_semantics() {
        assert_eq!(entry_name("position"), "g_buffer_position");
        assert_eq!(entry_name("shininess"), "g_buffer_shininess");
    }
}
