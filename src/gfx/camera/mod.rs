pub mod basic_camera;
pub mod camera_controller;
pub mod camera_utils;

// Re-export main types
pub use basic_camera::{BasicCamera, PersProjInfo};
pub use camera_controller::CameraController;
pub use camera_utils::Camera;
