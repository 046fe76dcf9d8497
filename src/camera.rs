//! Orbiting camera, mouse controller and view/projection uniforms.
//!
//! The camera orbits a focal point at a given distance, steered by yaw and
//! pitch. The controller maps mouse input onto it: left-drag rotates,
//! right-drag pans the focal point, the wheel zooms. Pan and zoom speeds
//! scale with the viewport size and the current distance so the feel stays
//! constant at any zoom level.

use cgmath::{Angle, Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu expects 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_DISTANCE: f32 = 0.5;
// Keep the pitch away from the poles so the up vector never degenerates.
const MAX_PITCH: Rad<f32> = Rad(1.54);

/// Camera orbiting a focal point.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub focal_point: Point3<f32>,
    pub distance: f32,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            focal_point: Point3::new(0.0, 0.0, 0.0),
            distance: 12.0,
            yaw: Deg(-90.0).into(),
            pitch: Deg(-25.0).into(),
            fovy: Deg(45.0).into(),
            aspect: width as f32 / height as f32,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Unit vector from the camera towards the focal point.
    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(Vector3::unit_y()).normalize()
    }

    /// World position, derived from focal point, orientation and distance.
    pub fn position(&self) -> Point3<f32> {
        self.focal_point - self.forward() * self.distance
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.focal_point, Vector3::unit_y())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Called by the resize coordinator; the only way the output surface
    /// feeds back into the camera.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }
}

/// Layout of the camera uniform bind group, shared by the geometry and
/// forward pipelines.
pub fn mk_camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("camera_bind_group_layout"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Maps winit mouse events onto an [`OrbitCamera`].
#[derive(Debug)]
pub struct CameraController {
    viewport: (f32, f32),
    drag: DragMode,
    last_cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: (width, height),
            drag: DragMode::None,
            last_cursor: None,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn handle_window_events(&mut self, camera: &mut OrbitCamera, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => self.drag = DragMode::Rotate,
                (MouseButton::Right, ElementState::Pressed) => self.drag = DragMode::Pan,
                (_, ElementState::Released) => self.drag = DragMode::None,
                _ => (),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((lx, ly)) = self.last_cursor {
                    let dx = (position.x - lx) as f32;
                    let dy = (position.y - ly) as f32;
                    match self.drag {
                        DragMode::Rotate => self.rotate(camera, dx, dy),
                        DragMode::Pan => self.pan(camera, dx, dy),
                        DragMode::None => (),
                    }
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.zoom(camera, scroll);
            }
            _ => (),
        }
    }

    fn rotate(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        let speed = self.rotation_speed();
        camera.yaw += Rad(dx * speed);
        camera.pitch = Rad((camera.pitch.0 - dy * speed).clamp(-MAX_PITCH.0, MAX_PITCH.0));
    }

    fn pan(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        let (sx, sy) = self.pan_speed(camera.distance);
        let right = camera.right();
        let up = right.cross(camera.forward()).normalize();
        camera.focal_point += -right * dx * sx + up * dy * sy;
    }

    fn zoom(&self, camera: &mut OrbitCamera, delta: f32) {
        camera.distance = (camera.distance - delta * self.zoom_speed(camera.distance))
            .max(MIN_DISTANCE);
    }

    fn rotation_speed(&self) -> f32 {
        0.004
    }

    fn pan_speed(&self, distance: f32) -> (f32, f32) {
        let (w, h) = self.viewport;
        (2.0 * distance / w.max(1.0), 2.0 * distance / h.max(1.0))
    }

    fn zoom_speed(&self, distance: f32) -> f32 {
        (distance * 0.2).max(0.1)
    }
}

/// GPU-side camera state, uploaded once per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            view_position: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera) {
        let position = camera.position();
        self.view_position = [position.x, position.y, position.z, 1.0];
        self.view_proj = (camera.projection_matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state together with its GPU resources, held by the context.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    /// Routes an input event to the controller. Split out so callers don't
    /// have to borrow camera and controller separately.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        self.controller.handle_window_events(&mut self.camera, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_aspect_tracks_surface_size() {
        let mut camera = OrbitCamera::new(1280, 720);
        assert_eq!(camera.aspect, 1280.0 / 720.0);
        camera.set_aspect(1920.0, 1080.0);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn position_sits_at_distance_from_focal_point() {
        let camera = OrbitCamera::new(1280, 720);
        let offset = camera.position() - camera.focal_point;
        assert!((offset.magnitude() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn zoom_never_crosses_the_focal_point() {
        let mut camera = OrbitCamera::new(1280, 720);
        let controller = CameraController::new(1280.0, 720.0);
        for _ in 0..100 {
            controller.zoom(&mut camera, 5.0);
        }
        assert!(camera.distance >= MIN_DISTANCE);
    }

    #[test]
    fn rotate_clamps_pitch() {
        let mut camera = OrbitCamera::new(1280, 720);
        let controller = CameraController::new(1280.0, 720.0);
        controller.rotate(&mut camera, 0.0, -100_000.0);
        assert!(camera.pitch.0 <= MAX_PITCH.0);
        controller.rotate(&mut camera, 0.0, 100_000.0);
        assert!(camera.pitch.0 >= -MAX_PITCH.0);
    }
}
