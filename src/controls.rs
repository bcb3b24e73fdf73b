//! Keyboard and mouse controls.
//!
//! `P` toggles pause, `R` asks the render loop to reset every body, dragging
//! with the right mouse button orbits the camera and scrolling zooms.

use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::Camera;

/// Pixel-precise scroll deltas (touchpads) are scaled down to roughly one line per notch.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Default)]
pub struct Controls {
    paused: bool,
    reset_requested: bool,
    right_mouse_down: bool,
    last_cursor: Option<(f64, f64)>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Returns `true` exactly once per reset request.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    /// Simulated time for this frame: the real elapsed time, or nothing while paused.
    pub fn frame_time(&self, dt: Duration) -> Duration {
        if self.paused { Duration::ZERO } else { dt }
    }

    pub fn set_right_mouse(&mut self, pressed: bool) {
        self.right_mouse_down = pressed;
    }

    /// Track the cursor and, while the right button is held, turn the camera by the travelled distance.
    pub fn cursor_moved(&mut self, x: f64, y: f64, camera: &mut Camera) {
        if let (true, Some((old_x, old_y))) = (self.right_mouse_down, self.last_cursor) {
            camera.increment_theta((y - old_y) as f32);
            camera.increment_phi((x - old_x) as f32);
        }
        self.last_cursor = Some((x, y));
    }

    pub fn scroll(&mut self, lines: f32, camera: &mut Camera) {
        camera.increment_radius(lines);
    }

    /// Feed a winit window event through the controls.
    pub fn handle_window_event(&mut self, event: &WindowEvent, camera: &mut Camera) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::KeyP => self.toggle_pause(),
                KeyCode::KeyR => self.request_reset(),
                _ => (),
            },
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => self.set_right_mouse(state.is_pressed()),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y, camera)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.scroll(lines, camera);
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_toggles_and_freezes_time() {
        let mut controls = Controls::new();
        let dt = Duration::from_millis(250);
        assert_eq!(controls.frame_time(dt), dt);
        controls.toggle_pause();
        assert!(controls.is_paused());
        assert_eq!(controls.frame_time(dt), Duration::ZERO);
        controls.toggle_pause();
        assert_eq!(controls.frame_time(dt), dt);
    }

    #[test]
    fn reset_is_consumed_once() {
        let mut controls = Controls::new();
        assert!(!controls.take_reset());
        controls.request_reset();
        controls.request_reset();
        assert!(controls.take_reset());
        assert!(!controls.take_reset());
    }

    #[test]
    fn drag_turns_camera_only_with_right_button() {
        let mut controls = Controls::new();
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        controls.cursor_moved(100.0, 100.0, &mut camera);
        controls.cursor_moved(150.0, 120.0, &mut camera);
        assert_eq!(camera, Camera::new(0.0, 0.0, 2.0));

        controls.set_right_mouse(true);
        controls.cursor_moved(160.0, 140.0, &mut camera);
        assert!((camera.theta() - 0.2).abs() < 1e-6);
        assert!((camera.phi() - (std::f32::consts::TAU - 0.1)).abs() < 1e-5);

        controls.set_right_mouse(false);
        let before = camera;
        controls.cursor_moved(0.0, 0.0, &mut camera);
        assert_eq!(camera, before);
    }

    #[test]
    fn first_drag_sample_does_not_jump() {
        let mut controls = Controls::new();
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        controls.set_right_mouse(true);
        controls.cursor_moved(500.0, 500.0, &mut camera);
        assert_eq!(camera, Camera::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn scroll_zooms() {
        let mut controls = Controls::new();
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        controls.scroll(1.0, &mut camera);
        assert!((camera.radius() - 1.0).abs() < 1e-6);
    }
}
