use cgmath::Deg;
use winit::{
    event::{DeviceEvent, ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use super::basic_camera::BasicCamera;

const SPEED_STEP: f32 = 0.1;

/// Translates keyboard and mouse input into [`BasicCamera`] movement.
///
/// WASD moves in the view plane, PageUp/PageDown move vertically, `+`/`-`
/// change the speed, and dragging with the left mouse button turns the view.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
        }
    }

    /// Returns `true` if the key moved or reconfigured the camera.
    pub fn process_key(&mut self, key: KeyCode, camera: &mut BasicCamera) -> bool {
        let speed = camera.speed();

        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => camera.move_forward(speed),
            KeyCode::KeyS | KeyCode::ArrowDown => camera.move_forward(-speed),
            KeyCode::KeyA | KeyCode::ArrowLeft => camera.move_right(-speed),
            KeyCode::KeyD | KeyCode::ArrowRight => camera.move_right(speed),
            KeyCode::PageUp => camera.move_up(speed),
            KeyCode::PageDown => camera.move_up(-speed),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                camera.set_speed(speed + SPEED_STEP);
                log::info!("Camera speed changed to {:.2}", camera.speed());
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                camera.set_speed(speed - SPEED_STEP);
                log::info!("Camera speed changed to {:.2}", camera.speed());
            }
            _ => return false,
        }

        true
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut BasicCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 * 0.1,
                };
                camera.move_forward(scroll_amount * self.zoom_speed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    camera.rotate(
                        Deg(-delta.0 as f32 * self.rotate_speed),
                        Deg(-delta.1 as f32 * self.rotate_speed),
                    );
                }
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::PersProjInfo;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn camera() -> BasicCamera {
        BasicCamera::new(
            PersProjInfo {
                fov_degrees: 45.0,
                width: 100.0,
                height: 100.0,
                z_near: 1.0,
                z_far: 100.0,
            },
            Vector3::zero(),
            Vector3::unit_z(),
            Vector3::unit_y(),
        )
    }

    #[test]
    fn test_keys_move_camera() {
        let mut controller = CameraController::new(0.1, 1.0);
        let mut camera = camera();

        assert!(controller.process_key(KeyCode::KeyW, &mut camera));
        assert!((camera.position().z - camera.speed()).abs() < 1e-6);

        assert!(controller.process_key(KeyCode::PageUp, &mut camera));
        assert!(camera.position().y > 0.0);

        assert!(!controller.process_key(KeyCode::KeyZ, &mut camera));
    }

    #[test]
    fn test_strafe_is_perpendicular_to_view() {
        let mut controller = CameraController::new(0.1, 1.0);
        let mut camera = camera();
        controller.process_key(KeyCode::KeyD, &mut camera);
        assert!(camera.position().dot(camera.target()).abs() < 1e-6);
        assert!(camera.position().magnitude() > 0.0);
    }

    #[test]
    fn test_speed_keys() {
        let mut controller = CameraController::new(0.1, 1.0);
        let mut camera = camera();
        let before = camera.speed();
        controller.process_key(KeyCode::Equal, &mut camera);
        assert!(camera.speed() > before);
    }
}
