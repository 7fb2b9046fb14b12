//! # Graphics Module
//!
//! Everything between a model file on disk and pixels on screen.
//!
//! - **Models** ([`model`]) - OBJ and glTF import into flat vertex arrays
//! - **Scene** ([`scene`]) - placed objects, the render list, lights and the camera
//! - **Lighting** ([`lighting`]) - Phong light types and per-object uniforms
//! - **Rendering** ([`rendering`]) - the wgpu engine and forward renderer
//! - **Sprites** ([`sprite`]) and **Water** ([`water`]) - the extra passes
//!
//! ```no_run
//! use lantern::gfx::{lighting::PhongRenderer, scene::Scene};
//!
//! let mut scene = Scene::new(1280, 720, true);
//! scene.initialize_default()?;
//! let mut phong = PhongRenderer::new();
//! # let _ = &mut phong;
//! # Ok::<(), lantern::LanternError>(())
//! ```

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod model;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod sprite;
pub mod transform;
pub mod water;

pub use camera::{BasicCamera, CameraController};
pub use rendering::RenderEngine;
pub use scene::Scene;
