//! Application shell: window creation and the winit event loop.
//!
//! Wires the pieces together: a window, the GPU [`Context`], the
//! [`ResourceRegistry`] and the [`FramePipeline`]. Input events go to the
//! camera controller, resize events to the resize coordinator, and every
//! redraw renders one frame and immediately requests the next; presentation
//! is vsync-locked, so the present call paces the loop.

use std::sync::Arc;

use instant::Instant;
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::Context,
    frame::{FrameError, FramePipeline},
    registry::ResourceRegistry,
};

struct AppState {
    ctx: Context,
    registry: ResourceRegistry,
    frame: FramePipeline,
}

pub struct App {
    // Context creation is async (adapter and device requests); the event
    // loop is not, so initialization blocks on a runtime.
    async_runtime: Runtime,
    state: Option<AppState>,
    last_frame: Instant,
}

impl App {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: Runtime::new()?,
            state: None,
            last_frame: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("shade-ngin")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create the window: {e}");
                event_loop.exit();
                return;
            }
        };

        let ctx = match self.async_runtime.block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            Err(e) => {
                log::error!("cannot create the graphics context: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut registry = ResourceRegistry::new();
        let frame = match FramePipeline::new(&ctx, &mut registry) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("cannot build the frame pipeline: {e}");
                event_loop.exit();
                return;
            }
        };

        ctx.window.request_redraw();
        self.state = Some(AppState {
            ctx,
            registry,
            frame,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.frame.resize.request(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_frame.elapsed();
                self.last_frame = Instant::now();
                log::trace!("frame dt {:?}", dt);

                match state.frame.render(&mut state.ctx, &mut state.registry) {
                    Ok(()) => {}
                    Err(FrameError::SurfaceOutdated(e)) => {
                        // Skip this frame; the next one applies the resize.
                        log::debug!("surface outdated ({e}), reconfiguring");
                        let size = state.ctx.window.inner_size();
                        state.frame.resize.request(size.width, size.height);
                    }
                    Err(e @ FrameError::DeviceLost(_)) => {
                        log::error!("{e}");
                        event_loop.exit();
                        return;
                    }
                }
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
