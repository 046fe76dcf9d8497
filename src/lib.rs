//! shade-ngin
//!
//! A small deferred-shading 3D render engine built on wgpu. Every frame runs
//! three passes: a geometry pass writing scene attributes into a five-target
//! G-Buffer, a full-screen lighting pass shading each pixel from those
//! targets, and a forward pass drawing unlit light proxies against the
//! surviving depth buffer. Long-lived GPU objects are owned by a named
//! resource registry so passes share them by name instead of by reference.
//!
//! High-level modules
//! - `app`: window creation and the winit event loop
//! - `camera`: orbit camera, mouse controller and view/projection uniforms
//! - `context`: central GPU and window context that owns device/queue/surface
//! - `data_structures`: meshes, textures and instance data
//! - `frame`: per-frame orchestration of the three passes
//! - `gbuffer`: the G-Buffer slot table and target management
//! - `lights`: light categories and their GPU uniform layout
//! - `pipelines`: the geometry, lighting and forward pipelines with shaders
//! - `registry`: the named GPU resource registry
//! - `resize`: resize coordination and size-dependent resource rebuild
//! - `scene`: the fixed demo scene, materials and drawables
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod frame;
pub mod gbuffer;
pub mod lights;
pub mod pipelines;
pub mod registry;
pub mod resize;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
