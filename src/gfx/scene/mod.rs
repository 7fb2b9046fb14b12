//! # Scene Management
//!
//! The [`Scene`] owns a library of loaded models, a fixed-capacity pool of
//! [`SceneObject`]s placed in the world, scene-level lights and the camera.
//! Only objects on the render list are drawn, in the order they were added.
//!
//! ```no_run
//! use lantern::gfx::scene::Scene;
//!
//! let mut scene = Scene::new(1280, 720, true);
//! let cube = scene.create_scene_object_from_shape("cube")?;
//! scene.object_mut(cube)?.set_position(0.0, 0.0, 5.0);
//! scene.add_to_render_list(cube);
//! # Ok::<(), lantern::LanternError>(())
//! ```

pub mod scene;
pub mod scene_object;
pub mod vertex;

pub use scene::{Scene, SceneStatistics, MAX_SCENE_OBJECTS};
pub use scene_object::{SceneObject, SceneObjectId};
pub use vertex::Vertex3D;
