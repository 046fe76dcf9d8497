#[cfg(feature = "integration-tests")]
use shade_ngin::{pipelines::lighting, registry::ResourceRegistry};
#[cfg(feature = "integration-tests")]
use tokio::runtime::Runtime;

/// Headless device for GPU tests: no window, no surface.
#[cfg(feature = "integration-tests")]
pub(crate) fn mk_test_device() -> (wgpu::Device, wgpu::Queue) {
    let runtime = Runtime::new().expect("tokio runtime");
    runtime.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no graphics adapter available for integration tests");
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Test Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await
            .expect("device request failed")
    })
}

/// Registry preloaded with the size-independent prerequisites of the
/// size-dependent install: the G-Buffer sampler and read layout.
#[cfg(feature = "integration-tests")]
pub(crate) fn mk_registry_with_g_buffer_prereqs(device: &wgpu::Device) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry.add("g_buffer_sampler", lighting::mk_g_buffer_sampler(device));
    registry.add("g_buffer_read", lighting::mk_g_buffer_read_layout(device));
    registry
}
